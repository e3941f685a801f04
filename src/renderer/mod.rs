//! A minimal forward renderer.
//!
//! A frame goes through up to two kinds of passes, all recorded into the
//! [`Frame`]'s command encoder:
//!
//! 1. one depth-only shadow pass per shadow-casting light, each into its own
//!    layer of a shared shadow map array ([`ForwardRenderer::render_shadow_maps`])
//! 2. the scene pass, which clears colour and depth and draws every
//!    renderable with its material's shader against all active lights
//!    ([`ForwardRenderer::render_scene`])
//!
//! [`Frame::present`] submits the commands and presents the image.

mod forward;
mod objects;
mod shadow;

use std::iter;

use crate::{
    camera::{Camera, OPENGL_TO_WGPU_MATRIX, Projection},
    context::Context,
};

pub use forward::ForwardRenderer;
pub use objects::OBJECT_RETENTION_FRAMES;
pub use shadow::AtlasShape;

/// Camera data of one pass, bound at group 0 binding 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    /// Already converted to wgpu's clip depth range.
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl GlobalsUniform {
    /// `projection` uses the OpenGL depth convention, as produced by
    /// [`Projection::calc_matrix`].
    pub fn new(
        projection: cgmath::Matrix4<f32>,
        view: cgmath::Matrix4<f32>,
        eye: cgmath::Point3<f32>,
    ) -> Self {
        Self {
            projection: (OPENGL_TO_WGPU_MATRIX * projection).into(),
            view: view.into(),
            eye: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}

/// Per-frame parameters of the scene pass.
#[derive(Debug, Clone, Copy)]
pub struct ScenePass {
    pub clear_colour: wgpu::Color,
    pub projection: cgmath::Matrix4<f32>,
    pub view: cgmath::Matrix4<f32>,
    pub eye: cgmath::Point3<f32>,
}

impl ScenePass {
    pub fn new(clear_colour: wgpu::Color, camera: &impl Camera, projection: &Projection) -> Self {
        Self {
            clear_colour,
            projection: projection.calc_matrix(),
            view: camera.view_matrix(),
            eye: camera.position(),
        }
    }

    pub(crate) fn to_uniform(&self) -> GlobalsUniform {
        GlobalsUniform::new(self.projection, self.view, self.eye)
    }
}

/// The colour and depth targets of one frame and the encoder recording it.
///
/// Frames from [`ForwardRenderer::begin_frame`] draw into the next
/// swap-chain image. [`ForwardRenderer::begin_offscreen_frame`] draws into
/// caller-owned textures instead.
pub struct Frame {
    output: Option<wgpu::SurfaceTexture>,
    pub view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl Frame {
    pub(crate) fn begin(ctx: &Context) -> Result<Self, wgpu::SurfaceError> {
        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            view,
            depth_view: ctx.depth_view().clone(),
            encoder: create_encoder(&ctx.device),
            output: Some(output),
        })
    }

    pub(crate) fn offscreen(
        device: &wgpu::Device,
        view: wgpu::TextureView,
        depth_view: wgpu::TextureView,
    ) -> Self {
        Self {
            output: None,
            view,
            depth_view,
            encoder: create_encoder(device),
        }
    }

    /// Submit everything recorded this frame without presenting.
    pub fn submit(self, queue: &wgpu::Queue) -> wgpu::SubmissionIndex {
        queue.submit(iter::once(self.encoder.finish()))
    }

    /// Submit everything recorded this frame and present the image.
    ///
    /// Offscreen frames are only submitted.
    pub fn present(self, ctx: &Context) {
        ctx.queue.submit(iter::once(self.encoder.finish()));
        if let Some(output) = self.output {
            output.present();
        }
    }
}

fn create_encoder(device: &wgpu::Device) -> wgpu::CommandEncoder {
    device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Render Encoder"),
    })
}
