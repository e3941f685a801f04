//! Cameras and projection.
//!
//! Matrices are built with cgmath's OpenGL conventions (right-handed,
//! clip depth in [-1, 1]); [`OPENGL_TO_WGPU_MATRIX`] is applied once when
//! the matrices are uploaded.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub trait Camera {
    fn view_matrix(&self) -> Matrix4<f32>;
    fn position(&self) -> Point3<f32>;
}

/// Free camera described by a position and yaw/pitch angles.
///
/// With zero yaw and pitch it looks down -Z with +Y up. Pitch rotates about
/// the camera's X axis, yaw about the world Y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct YawPitchCamera {
    pub position: Point3<f32>,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
}

impl YawPitchCamera {
    pub fn new<P: Into<Point3<f32>>>(position: P) -> Self {
        Self {
            position: position.into(),
            yaw: Rad(0.0),
            pitch: Rad(0.0),
        }
    }

    pub fn set_yaw_and_pitch<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(&mut self, yaw: Y, pitch: P) {
        self.yaw = yaw.into();
        self.pitch = pitch.into();
    }

    pub fn yaw(&self) -> Rad<f32> {
        self.yaw
    }

    pub fn pitch(&self) -> Rad<f32> {
        self.pitch
    }
}

impl Camera for YawPitchCamera {
    fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(self.pitch)
            * Matrix4::from_angle_y(self.yaw)
            * Matrix4::from_translation(-self.position.to_vec())
    }

    fn position(&self) -> Point3<f32> {
        self.position
    }
}

/// Camera circling a target on a sphere.
///
/// `elevation` is the polar angle from +Y, `azimuth` is measured from +X
/// towards +Z.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub azimuth: Rad<f32>,
    pub distance: f32,
    pub elevation: Rad<f32>,
}

impl OrbitCamera {
    pub fn new<P: Into<Point3<f32>>, A: Into<Rad<f32>>, E: Into<Rad<f32>>>(
        target: P,
        azimuth: A,
        distance: f32,
        elevation: E,
    ) -> Self {
        Self {
            target: target.into(),
            azimuth: azimuth.into(),
            distance,
            elevation: elevation.into(),
        }
    }
}

impl Camera for OrbitCamera {
    fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }

    fn position(&self) -> Point3<f32> {
        let (sin_e, cos_e) = self.elevation.0.sin_cos();
        let (sin_a, cos_a) = self.azimuth.0.sin_cos();
        let offset = Vector3::new(sin_e * cos_a, cos_e, sin_e * sin_a).normalize() * self.distance;
        self.target + offset
    }
}

/// Perspective projection tied to the surface size.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Zero sizes count as one pixel so the aspect ratio stays positive.
fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
