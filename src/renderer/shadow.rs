use crate::data_structures::{light::LightSet, texture::Texture};

/// Edge length and layer count of the shadow map array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasShape {
    pub size: u32,
    pub layers: u32,
}

impl AtlasShape {
    /// Bound while nothing casts shadows, so the scene pass always has a
    /// depth array to sample.
    pub const PLACEHOLDER: AtlasShape = AtlasShape { size: 1, layers: 1 };

    /// One layer per shadow caster, sized for the largest requested map and
    /// clamped to what the device supports.
    pub fn for_lights(lights: &LightSet, enabled: bool, max_dimension: u32) -> Self {
        if !enabled {
            return Self::PLACEHOLDER;
        }
        match lights.max_shadow_size() {
            Some(size) => Self {
                size: size.clamp(1, max_dimension.max(1)),
                layers: lights.shadow_casters().count() as u32,
            },
            None => Self::PLACEHOLDER,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ShadowAtlas {
    pub shape: AtlasShape,
    pub texture: Texture,
}

impl ShadowAtlas {
    pub fn new(device: &wgpu::Device, shape: AtlasShape) -> Self {
        if shape != AtlasShape::PLACEHOLDER {
            log::info!(
                "Allocating {} shadow map layer(s) of {}x{}",
                shape.layers,
                shape.size,
                shape.size
            );
        }
        Self {
            shape,
            texture: Texture::create_shadow_map_array(device, shape.size, shape.layers),
        }
    }
}
