use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::{
    config::RendererSettings,
    context::{Context, InitContext},
    data_structures::{
        light::{Light, LightSet, MAX_FORWARD_LIGHTS},
        model::DrawMesh,
        renderable::Renderable,
        texture::create_shadow_sampler,
    },
    pipelines::{
        forward::{mk_forward_layout, mk_forward_pipeline},
        frame_layout, object_layout, shadow_pass_layout,
        shadow::{mk_shadow_layout, mk_shadow_pipeline},
    },
    render::Render,
    renderer::{
        Frame, GlobalsUniform, ScenePass,
        objects::{Fallbacks, ObjectCache, ReportedObjects},
        shadow::{AtlasShape, ShadowAtlas},
    },
    resources::shader::ShaderProgram,
};

struct ShadowPassBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws renderables with their own shaders against a fixed set of light
/// slots, with optional shadow maps.
///
/// Pipelines are built lazily per shader and cached for the renderer's
/// lifetime. Per-object uniforms and bind groups are cached by renderable
/// id and released once an object has gone undrawn for
/// [`OBJECT_RETENTION_FRAMES`](crate::renderer::OBJECT_RETENTION_FRAMES).
pub struct ForwardRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    settings: RendererSettings,
    color_format: wgpu::TextureFormat,
    resolution: (u32, u32),
    /// The active lights every scene pass is shaded against.
    pub lights: LightSet,
    shadows_enabled: bool,
    frame_index: u64,

    frame_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    forward_layout: wgpu::PipelineLayout,
    shadow_layout: wgpu::PipelineLayout,
    forward_pipelines: HashMap<u32, wgpu::RenderPipeline>,
    shadow_pipelines: HashMap<u32, wgpu::RenderPipeline>,

    globals_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    shadow_sampler: wgpu::Sampler,
    shadow_atlas: ShadowAtlas,
    frame_bind_group: wgpu::BindGroup,
    shadow_passes: Vec<ShadowPassBinding>,

    fallbacks: Fallbacks,
    objects: ObjectCache,
    unshaded: ReportedObjects,
}

impl ForwardRenderer {
    pub fn new(ctx: &InitContext, settings: RendererSettings) -> Self {
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();

        let frame_layout = frame_layout(&device);
        let object_layout = object_layout(&device);
        let shadow_pass_layout = shadow_pass_layout(&device);
        let forward_layout = mk_forward_layout(&device, &frame_layout, &object_layout);
        let shadow_layout = mk_shadow_layout(&device, &shadow_pass_layout, &object_layout);

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::cast_slice(&[<GlobalsUniform as bytemuck::Zeroable>::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lights = LightSet::new();
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::cast_slice(&[lights.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Each caster renders with its own camera, and all writes land before
        // the frame is submitted, so every layer needs its own buffer.
        let shadow_passes = (0..MAX_FORWARD_LIGHTS)
            .map(|layer| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Shadow Pass {layer} Globals Buffer")),
                    contents: bytemuck::cast_slice(&[
                        <GlobalsUniform as bytemuck::Zeroable>::zeroed(),
                    ]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &shadow_pass_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                    label: Some(&format!("Shadow Pass {layer} Bind Group")),
                });
                ShadowPassBinding { buffer, bind_group }
            })
            .collect();

        let shadow_sampler = create_shadow_sampler(&device);
        let shadow_atlas = ShadowAtlas::new(&device, AtlasShape::PLACEHOLDER);
        let frame_bind_group = create_frame_bind_group(
            &device,
            &frame_layout,
            &globals_buffer,
            &lights_buffer,
            &shadow_atlas,
            &shadow_sampler,
        );
        let fallbacks = Fallbacks::new(&device, &queue);

        Self {
            settings,
            color_format: ctx.config.format,
            resolution: (ctx.config.width, ctx.config.height),
            lights,
            shadows_enabled: false,
            frame_index: 0,
            frame_layout,
            object_layout,
            forward_layout,
            shadow_layout,
            forward_pipelines: HashMap::new(),
            shadow_pipelines: HashMap::new(),
            globals_buffer,
            lights_buffer,
            shadow_sampler,
            shadow_atlas,
            frame_bind_group,
            shadow_passes,
            fallbacks,
            objects: ObjectCache::default(),
            unshaded: ReportedObjects::default(),
            device,
            queue,
        }
    }

    /// A light with the renderer's defaults: white, full diffuse and
    /// specular intensity, no ambient term, unit attenuation, no shadows.
    pub fn new_light(&self) -> Light {
        Light::default()
    }

    /// Enable the shadow pass. Until this is called
    /// [`render_shadow_maps`](Self::render_shadow_maps) does nothing and no
    /// light is shaded with shadows.
    pub fn setup_shadow_map_rendering(&mut self) {
        self.shadows_enabled = true;
    }

    pub fn shadows_enabled(&self) -> bool {
        self.shadows_enabled
    }

    pub fn settings(&self) -> RendererSettings {
        self.settings
    }

    /// Zero sizes (minimised windows) are ignored.
    pub fn change_resolution(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring a {width}x{height} resolution");
            return;
        }
        self.resolution = (width, height);
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// Width over height of the current resolution.
    pub fn aspect(&self) -> f32 {
        self.resolution.0 as f32 / self.resolution.1.max(1) as f32
    }

    /// Acquire the next swap-chain image and start recording a frame.
    pub fn begin_frame(&mut self, ctx: &Context) -> Result<Frame, wgpu::SurfaceError> {
        self.next_frame();
        Frame::begin(ctx)
    }

    /// Start recording a frame into `view`, with `depth_view` as the scene
    /// pass depth buffer. Both must match the renderer's colour format and
    /// [`Texture::DEPTH_FORMAT`](crate::data_structures::texture::Texture::DEPTH_FORMAT).
    pub fn begin_offscreen_frame(
        &mut self,
        view: wgpu::TextureView,
        depth_view: wgpu::TextureView,
    ) -> Frame {
        self.next_frame();
        Frame::offscreen(&self.device, view, depth_view)
    }

    /// Render one depth pass per shadow caster into its layer of the shadow
    /// map array, returning the number of passes recorded.
    ///
    /// `shader` must provide `vs_main`; a fragment stage is not used.
    pub fn render_shadow_maps(
        &mut self,
        frame: &mut Frame,
        shader: &ShaderProgram,
        render: &Render,
    ) -> usize {
        if !self.shadows_enabled {
            return 0;
        }
        self.sync_lights();
        let casters: Vec<_> = self
            .lights
            .shadow_casters()
            .filter_map(|(slot, light)| {
                let view = light.shadow_view()?;
                let projection = light.shadow_map.as_ref()?.projection;
                let eye = cgmath::Point3::new(light.position.x, light.position.y, light.position.z);
                Some((slot, GlobalsUniform::new(projection, view, eye)))
            })
            .collect();
        if casters.is_empty() {
            return 0;
        }

        let renderables = render.flatten();
        for renderable in &renderables {
            self.prepare_object(renderable);
        }
        let pipeline = self
            .shadow_pipelines
            .entry(shader.id())
            .or_insert_with(|| {
                log::debug!("Building the shadow pipeline for {}", shader.name());
                mk_shadow_pipeline(&self.device, &self.shadow_layout, shader)
            });

        for (layer, (slot, globals)) in casters.iter().enumerate() {
            let binding = &self.shadow_passes[layer];
            self.queue
                .write_buffer(&binding.buffer, 0, bytemuck::cast_slice(&[*globals]));
            let target = self.shadow_atlas.texture.layer_view(layer as u32);
            let mut pass = frame
                .encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some(&format!("Shadow Pass (light {slot})")),
                    color_attachments: &[],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &target,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &binding.bind_group, &[]);
            for renderable in &renderables {
                if let Some(bind_group) = self.objects.bind_group(renderable.id()) {
                    pass.draw_mesh(&renderable.mesh, bind_group);
                }
            }
        }
        log::trace!("Rendered {} shadow map(s)", casters.len());
        casters.len()
    }

    /// Clear the frame and draw every renderable with its material's shader.
    ///
    /// Renderables without a shader, or whose shader has no fragment stage,
    /// are skipped. Camera data is uploaded once per call, so a frame holds
    /// at most one scene pass.
    pub fn render_scene(
        &mut self,
        frame: &mut Frame,
        scene: &ScenePass,
        render: &Render,
    ) {
        self.sync_lights();
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&[scene.to_uniform()]),
        );

        let mut draws: Vec<(&Renderable, u32)> = Vec::new();
        for renderable in render.flatten() {
            let Some(shader) = renderable
                .material
                .shader
                .as_ref()
                .filter(|shader| shader.has_fragment())
            else {
                if self.unshaded.first_sighting(renderable.id(), self.frame_index) {
                    log::warn!(
                        "Skipping renderable {} ({}): its material has no colour shader",
                        renderable.id(),
                        renderable.mesh.name
                    );
                }
                continue;
            };
            if !self.forward_pipelines.contains_key(&shader.id()) {
                log::debug!("Building the forward pipeline for {}", shader.name());
                let pipeline = mk_forward_pipeline(
                    &self.device,
                    &self.forward_layout,
                    shader,
                    self.color_format,
                    self.settings.alpha_blending,
                );
                self.forward_pipelines.insert(shader.id(), pipeline);
            }
            self.prepare_object(renderable);
            draws.push((renderable, shader.id()));
        }

        let mut pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &frame.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for (renderable, shader_id) in draws {
            let (Some(pipeline), Some(bind_group)) = (
                self.forward_pipelines.get(&shader_id),
                self.objects.bind_group(renderable.id()),
            ) else {
                continue;
            };
            pass.set_pipeline(pipeline);
            pass.draw_mesh(&renderable.mesh, bind_group);
        }
    }

    /// Number of objects currently holding GPU state.
    pub fn cached_objects(&self) -> usize {
        self.objects.len()
    }

    fn next_frame(&mut self) {
        self.frame_index += 1;
        self.objects.evict_stale(self.frame_index);
        self.unshaded.evict_stale(self.frame_index);
    }

    fn prepare_object(&mut self, renderable: &Renderable) {
        self.objects.prepare(
            &self.device,
            &self.queue,
            &self.object_layout,
            &self.fallbacks,
            renderable,
            self.frame_index,
        );
    }

    /// Upload the light slots and resize the shadow map array when the set
    /// of casters changed.
    fn sync_lights(&mut self) {
        let shape = AtlasShape::for_lights(
            &self.lights,
            self.shadows_enabled,
            self.device.limits().max_texture_dimension_2d,
        );
        if shape != self.shadow_atlas.shape {
            self.shadow_atlas = ShadowAtlas::new(&self.device, shape);
            self.frame_bind_group = create_frame_bind_group(
                &self.device,
                &self.frame_layout,
                &self.globals_buffer,
                &self.lights_buffer,
                &self.shadow_atlas,
                &self.shadow_sampler,
            );
        }

        let mut uniform = self.lights.to_uniform();
        if !self.shadows_enabled {
            // No shadow pass ran, so no layer holds valid depth.
            for light in uniform.lights.iter_mut() {
                light.shadow[0] = -1.0;
            }
        }
        self.queue
            .write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

fn create_frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    globals: &wgpu::Buffer,
    lights: &wgpu::Buffer,
    shadow_atlas: &ShadowAtlas,
    shadow_sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: globals.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: lights.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&shadow_atlas.texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(shadow_sampler),
            },
        ],
        label: Some("frame_bind_group"),
    })
}
