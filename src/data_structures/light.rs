//! Lights, their optional shadow maps, and the renderer's active light slots.
//!
//! Everything here is plain data; the GPU side (shadow map texture layers,
//! uniform buffers) is owned by [`crate::renderer::ForwardRenderer`].

use cgmath::{EuclideanSpace, InnerSpace, SquareMatrix, Zero};

use crate::camera::OPENGL_TO_WGPU_MATRIX;

/// Number of light slots a forward pass shades against.
pub const MAX_FORWARD_LIGHTS: usize = 4;

/// Vertical field of view of point-light shadow frusta.
pub const SHADOW_FOV_DEGREES: f32 = 90.0;

/// Depth offset subtracted before the shadow comparison.
const SHADOW_BIAS: f32 = 0.0025;

/// Depth render target settings and projection of a shadow-casting light.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowMap {
    /// Requested edge length of the square depth texture in texels.
    pub size: u32,
    pub near: f32,
    pub far: f32,
    /// Direction the shadow frustum looks at from the light.
    pub direction: cgmath::Vector3<f32>,
    pub projection: cgmath::Matrix4<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub position: cgmath::Vector3<f32>,
    /// A non-zero direction turns this into a directional light.
    pub direction: cgmath::Vector3<f32>,
    pub diffuse_color: cgmath::Vector4<f32>,
    pub diffuse_intensity: f32,
    pub ambient_intensity: f32,
    pub specular_intensity: f32,
    pub attenuation: f32,
    pub shadow_map: Option<ShadowMap>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: cgmath::Vector3::zero(),
            direction: cgmath::Vector3::zero(),
            diffuse_color: cgmath::Vector4::new(1.0, 1.0, 1.0, 1.0),
            diffuse_intensity: 1.0,
            ambient_intensity: 0.0,
            specular_intensity: 1.0,
            attenuation: 1.0,
            shadow_map: None,
        }
    }
}

impl Light {
    pub fn is_directional(&self) -> bool {
        self.direction.magnitude2() > f32::EPSILON
    }

    /// Attach a shadow map to the light.
    ///
    /// Point lights get a perspective frustum at their position looking along
    /// `direction`. Directional lights get an orthographic box of `far`
    /// units around the origin, looking along the light direction.
    pub fn create_shadow_map(
        &mut self,
        size: u32,
        near: f32,
        far: f32,
        direction: cgmath::Vector3<f32>,
    ) {
        let projection = if self.is_directional() {
            let half = far * 0.5;
            cgmath::ortho(-half, half, -half, half, near, far)
        } else {
            cgmath::perspective(cgmath::Deg(SHADOW_FOV_DEGREES), 1.0, near, far)
        };
        self.shadow_map = Some(ShadowMap {
            size,
            near,
            far,
            direction,
            projection,
        });
    }

    /// View matrix of the shadow frustum, `None` without a shadow map.
    pub fn shadow_view(&self) -> Option<cgmath::Matrix4<f32>> {
        let shadow = self.shadow_map.as_ref()?;
        let look = if shadow.direction.magnitude2() > f32::EPSILON {
            shadow.direction.normalize()
        } else if self.is_directional() {
            self.direction.normalize()
        } else {
            -cgmath::Vector3::unit_z()
        };
        let eye = if self.is_directional() {
            -look * (shadow.far * 0.5)
        } else {
            self.position
        };
        let up = if look.y.abs() > 0.99 {
            cgmath::Vector3::unit_x()
        } else {
            cgmath::Vector3::unit_y()
        };
        let eye = cgmath::Point3::from_vec(eye);
        Some(cgmath::Matrix4::look_at_rh(eye, eye + look, up))
    }

    /// Clip-space (wgpu depth range) transform of the shadow frustum.
    pub fn shadow_view_projection(&self) -> Option<cgmath::Matrix4<f32>> {
        let view = self.shadow_view()?;
        let projection = self.shadow_map.as_ref()?.projection;
        Some(OPENGL_TO_WGPU_MATRIX * projection * view)
    }

    /// Pack the light for the lights uniform. `shadow_layer` is the slot of
    /// this light's map in the shadow array, if it casts shadows this frame.
    pub fn to_raw(&self, shadow_layer: Option<u32>) -> LightRaw {
        let (position, direction) = if self.is_directional() {
            let direction = self.direction.normalize();
            ([0.0; 4], [direction.x, direction.y, direction.z, 0.0])
        } else {
            (
                [self.position.x, self.position.y, self.position.z, 1.0],
                [0.0; 4],
            )
        };
        let (shadow_view_proj, layer): ([[f32; 4]; 4], f32) =
            match (shadow_layer, self.shadow_view_projection()) {
                (Some(layer), Some(matrix)) => (matrix.into(), layer as f32),
                _ => (cgmath::Matrix4::identity().into(), -1.0),
            };
        LightRaw {
            position,
            direction,
            diffuse_color: self.diffuse_color.into(),
            intensities: [
                self.diffuse_intensity,
                self.ambient_intensity,
                self.specular_intensity,
                self.attenuation,
            ],
            shadow_view_proj,
            shadow: [layer, SHADOW_BIAS, 0.0, 0.0],
        }
    }
}

/// The renderer's active lights, addressed by slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightSet {
    slots: [Option<Light>; MAX_FORWARD_LIGHTS],
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `light` into `slot`, returning the light it replaced.
    ///
    /// # Panics
    ///
    /// If `slot >= MAX_FORWARD_LIGHTS`.
    pub fn set(&mut self, slot: usize, light: Light) -> Option<Light> {
        self.slots[slot].replace(light)
    }

    pub fn clear(&mut self, slot: usize) -> Option<Light> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn get(&self, slot: usize) -> Option<&Light> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Light> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Light)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, light)| light.as_ref().map(|light| (slot, light)))
    }

    /// Active lights that own a shadow map, in slot order. Each yields
    /// exactly one shadow pass per frame.
    pub fn shadow_casters(&self) -> impl Iterator<Item = (usize, &Light)> {
        self.iter().filter(|(_, light)| light.shadow_map.is_some())
    }

    /// Map each slot to its layer in the shadow array (casters get
    /// consecutive layers in slot order).
    pub fn shadow_layers(&self) -> [Option<u32>; MAX_FORWARD_LIGHTS] {
        let mut layers = [None; MAX_FORWARD_LIGHTS];
        for (layer, (slot, _)) in self.shadow_casters().enumerate() {
            layers[slot] = Some(layer as u32);
        }
        layers
    }

    /// Largest requested shadow map edge among casters, `None` when nothing
    /// casts shadows.
    pub fn max_shadow_size(&self) -> Option<u32> {
        self.shadow_casters()
            .filter_map(|(_, light)| light.shadow_map.as_ref().map(|shadow| shadow.size))
            .max()
    }

    pub fn to_uniform(&self) -> LightsUniform {
        let layers = self.shadow_layers();
        let mut uniform = <LightsUniform as bytemuck::Zeroable>::zeroed();
        let mut count = 0;
        for (slot, light) in self.iter() {
            uniform.lights[count] = light.to_raw(layers[slot]);
            count += 1;
        }
        uniform.count = [count as u32, 0, 0, 0];
        uniform
    }
}

/// One light as laid out in the `Lights` uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    /// w = 1 for point lights, 0 for directional lights
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub diffuse_color: [f32; 4],
    /// diffuse, ambient, specular, attenuation
    pub intensities: [f32; 4],
    pub shadow_view_proj: [[f32; 4]; 4],
    /// x: shadow layer or -1, y: depth bias
    pub shadow: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub lights: [LightRaw; MAX_FORWARD_LIGHTS],
    /// x: number of packed lights
    pub count: [u32; 4],
}
