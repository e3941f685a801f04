//! Drawable objects: a shared mesh, a material and a transform.

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use crate::{
    data_structures::{model::Mesh, texture::Texture, transform::Transform},
    resources::shader::ShaderProgram,
};

static NEXT_RENDERABLE_ID: AtomicU32 = AtomicU32::new(1);

/// Surface properties of a renderable.
///
/// Textures and the shader are shared handles, so a material can never
/// outlive what it references.
#[derive(Clone, Debug)]
pub struct Material {
    pub diffuse_color: cgmath::Vector4<f32>,
    pub specular_color: cgmath::Vector4<f32>,
    pub shininess: f32,
    /// Diffuse colour map. White is bound when absent.
    pub tex0: Option<Arc<Texture>>,
    /// Tangent-space normal map. A flat normal map is bound when absent.
    pub tex1: Option<Arc<Texture>>,
    pub shader: Option<Arc<ShaderProgram>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_color: cgmath::Vector4::new(1.0, 1.0, 1.0, 1.0),
            specular_color: cgmath::Vector4::new(1.0, 1.0, 1.0, 1.0),
            shininess: 0.01,
            tex0: None,
            tex1: None,
            shader: None,
        }
    }
}

#[derive(Debug)]
pub struct Renderable {
    id: u32,
    pub mesh: Arc<Mesh>,
    pub material: Material,
    pub transform: Transform,
}

impl Renderable {
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self {
            id: NEXT_RENDERABLE_ID.fetch_add(1, Ordering::Relaxed),
            mesh,
            material: Material::default(),
            transform: Transform::new(),
        }
    }

    /// Process-unique; keys the renderer's per-object GPU state.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn to_uniform(&self) -> ObjectUniform {
        ObjectUniform::new(&self.transform, &self.material)
    }
}

/// Per-object shader data, bound at group 1 binding 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub diffuse_color: [f32; 4],
    pub specular_color: [f32; 4],
    /// x: shininess, y: 1.0 when a normal map is bound by the material
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(transform: &Transform, material: &Material) -> Self {
        Self {
            model: transform.to_matrix().into(),
            normal: transform.normal_matrix().into(),
            diffuse_color: material.diffuse_color.into(),
            specular_color: material.specular_color.into(),
            params: [
                material.shininess,
                if material.tex1.is_some() { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}
