//! Placement of a renderable in world space.

use cgmath::{Matrix, One, SquareMatrix};

/// Location, rotation (as quaternion) and per-axis scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub location: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            location: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.location)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Inverse transpose of the model matrix without its translation.
    ///
    /// Keeps normals perpendicular to their surface under non-uniform scale.
    /// A degenerate (zero) scale yields the identity.
    pub fn normal_matrix(&self) -> cgmath::Matrix4<f32> {
        let mut model = self.to_matrix();
        model.w = cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(cgmath::Matrix4::identity)
    }
}
