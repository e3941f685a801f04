#![cfg(feature = "integration-tests")]

use std::time::Duration;

use flow_forward::{
    config::AssetRoot, context::InitContext, data_structures::texture::Texture,
};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 64;

/// A device without a window, for tests that only need GPU resources.
///
/// Returns `None` when the machine has no usable adapter.
pub async fn headless_context() -> Option<InitContext> {
    let _ = env_logger::builder().is_test(true).try_init();

    let instance = wgpu::Instance::default();
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok()?;
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("test device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            ..Default::default()
        })
        .await
        .ok()?;

    Some(InitContext {
        device,
        queue,
        config: wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            width: WIDTH,
            height: HEIGHT,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        },
        assets: AssetRoot::discover(),
    })
}

/// Colour target the size of the test surface, readable with [`read_pixels`].
pub fn colour_target(ctx: &InitContext) -> wgpu::Texture {
    ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test colour target"),
        size: extent(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: ctx.config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

pub fn depth_target(ctx: &InitContext) -> Texture {
    Texture::create_depth_texture(&ctx.device, [WIDTH, HEIGHT], "test depth target")
}

/// Copy `texture` back to the CPU once all submitted work has finished.
pub async fn read_pixels(ctx: &InitContext, texture: &wgpu::Texture) -> image::RgbaImage {
    let bytes_per_row = 4 * WIDTH;
    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("test readback buffer"),
        size: (bytes_per_row * HEIGHT) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test readback encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(HEIGHT),
            },
        },
        extent(),
    );
    ctx.queue.submit(std::iter::once(encoder.finish()));

    let (tx, rx) = futures::channel::oneshot::channel();
    let slice = buffer.slice(..);
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    ctx.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .unwrap();
    rx.await.unwrap().unwrap();
    let data = slice.get_mapped_range().to_vec();
    image::RgbaImage::from_raw(WIDTH, HEIGHT, data).unwrap()
}

fn extent() -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: WIDTH,
        height: HEIGHT,
        depth_or_array_layers: 1,
    }
}
