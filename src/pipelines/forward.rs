use crate::{
    data_structures::{
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::{ColorTarget, mk_render_pipeline},
    resources::shader::ShaderProgram,
};

pub fn mk_forward_layout(
    device: &wgpu::Device,
    frame_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Forward Pipeline Layout"),
        bind_group_layouts: &[frame_layout, object_layout],
        immediate_size: 0,
    })
}

/// Scene pass pipeline for `shader`, depth tested and back-face culled.
pub fn mk_forward_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &ShaderProgram,
    color_format: wgpu::TextureFormat,
    alpha_blending: bool,
) -> wgpu::RenderPipeline {
    let blend = if alpha_blending {
        wgpu::BlendState::ALPHA_BLENDING
    } else {
        wgpu::BlendState::REPLACE
    };
    mk_render_pipeline(
        device,
        &format!("Forward Pipeline ({})", shader.name()),
        layout,
        &shader.module,
        Some(ColorTarget {
            format: color_format,
            blend: Some(blend),
        }),
        wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        },
        &[ModelVertex::desc()],
    )
}
