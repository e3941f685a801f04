use crate::{
    data_structures::{
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::mk_render_pipeline,
    resources::shader::ShaderProgram,
};

pub fn mk_shadow_layout(
    device: &wgpu::Device,
    shadow_pass_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Shadow Pipeline Layout"),
        bind_group_layouts: &[shadow_pass_layout, object_layout],
        immediate_size: 0,
    })
}

/// Depth-only pipeline rendering into one layer of the shadow map array.
///
/// The slope-scaled bias pushes occluder depth back to keep lit surfaces
/// from shadowing themselves.
pub fn mk_shadow_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &ShaderProgram,
) -> wgpu::RenderPipeline {
    mk_render_pipeline(
        device,
        &format!("Shadow Pipeline ({})", shader.name()),
        layout,
        &shader.module,
        None,
        wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            },
        },
        &[ModelVertex::desc()],
    )
}
