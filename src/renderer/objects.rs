use std::{collections::HashMap, sync::Arc};

use wgpu::util::DeviceExt;

use crate::data_structures::{
    renderable::Renderable,
    texture::{Texture, create_default_sampler},
};

/// Frames an object may go undrawn before its GPU state is released.
pub const OBJECT_RETENTION_FRAMES: u64 = 120;

pub(crate) fn is_stale(last_used_frame: u64, current_frame: u64) -> bool {
    current_frame.saturating_sub(last_used_frame) > OBJECT_RETENTION_FRAMES
}

/// Textures bound when a material leaves `tex0` or `tex1` empty.
#[derive(Debug)]
pub(crate) struct Fallbacks {
    pub diffuse: Texture,
    pub normal: Texture,
    pub sampler: wgpu::Sampler,
}

impl Fallbacks {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            diffuse: Texture::create_default_diffuse(device, queue),
            normal: Texture::create_default_normal_map(device, queue),
            sampler: create_default_sampler(device),
        }
    }
}

#[derive(Debug)]
struct ObjectResources {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    tex0: Option<Arc<Texture>>,
    tex1: Option<Arc<Texture>>,
    last_used_frame: u64,
}

impl ObjectResources {
    fn binds(&self, renderable: &Renderable) -> bool {
        let same = |a: &Option<Arc<Texture>>, b: &Option<Arc<Texture>>| match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        same(&self.tex0, &renderable.material.tex0) && same(&self.tex1, &renderable.material.tex1)
    }
}

/// Uniform buffer and group 1 bind group of every renderable drawn
/// recently, keyed by renderable id.
#[derive(Debug, Default)]
pub(crate) struct ObjectCache {
    entries: HashMap<u32, ObjectResources>,
}

impl ObjectCache {
    /// Upload the current transform and material of `renderable`, creating
    /// or rebinding its GPU state when needed.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        fallbacks: &Fallbacks,
        renderable: &Renderable,
        frame: u64,
    ) {
        let uniform = renderable.to_uniform();
        match self.entries.get_mut(&renderable.id()) {
            Some(entry) if entry.binds(renderable) => {
                queue.write_buffer(&entry.buffer, 0, bytemuck::cast_slice(&[uniform]));
                entry.last_used_frame = frame;
            }
            Some(entry) => {
                queue.write_buffer(&entry.buffer, 0, bytemuck::cast_slice(&[uniform]));
                entry.bind_group =
                    create_bind_group(device, layout, fallbacks, &entry.buffer, renderable);
                entry.tex0 = renderable.material.tex0.clone();
                entry.tex1 = renderable.material.tex1.clone();
                entry.last_used_frame = frame;
            }
            None => {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Object {} Uniform Buffer", renderable.id())),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = create_bind_group(device, layout, fallbacks, &buffer, renderable);
                self.entries.insert(
                    renderable.id(),
                    ObjectResources {
                        buffer,
                        bind_group,
                        tex0: renderable.material.tex0.clone(),
                        tex1: renderable.material.tex1.clone(),
                        last_used_frame: frame,
                    },
                );
            }
        }
    }

    pub fn bind_group(&self, id: u32) -> Option<&wgpu::BindGroup> {
        self.entries.get(&id).map(|entry| &entry.bind_group)
    }

    /// Drop the GPU state of objects that were not drawn for a while.
    pub fn evict_stale(&mut self, frame: u64) {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !is_stale(entry.last_used_frame, frame));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("Released the GPU state of {evicted} undrawn objects");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Ids of renderables already reported as undrawable.
///
/// An id is forgotten once it has not shown up for
/// [`OBJECT_RETENTION_FRAMES`], like the GPU state in [`ObjectCache`].
#[derive(Debug, Default)]
pub(crate) struct ReportedObjects {
    last_seen: HashMap<u32, u64>,
}

impl ReportedObjects {
    /// Record `id` as seen in `frame`, true if it was not reported yet.
    pub fn first_sighting(&mut self, id: u32, frame: u64) -> bool {
        self.last_seen.insert(id, frame).is_none()
    }

    pub fn evict_stale(&mut self, frame: u64) {
        self.last_seen.retain(|_, last| !is_stale(*last, frame));
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    fallbacks: &Fallbacks,
    buffer: &wgpu::Buffer,
    renderable: &Renderable,
) -> wgpu::BindGroup {
    let tex0 = renderable
        .material
        .tex0
        .as_deref()
        .unwrap_or(&fallbacks.diffuse);
    let tex1 = renderable
        .material
        .tex1
        .as_deref()
        .unwrap_or(&fallbacks.normal);
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&tex0.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(
                    tex0.sampler.as_ref().unwrap_or(&fallbacks.sampler),
                ),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&tex1.view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(
                    tex1.sampler.as_ref().unwrap_or(&fallbacks.sampler),
                ),
            },
        ],
        label: Some(&format!("Object {} Bind Group", renderable.id())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_drawn_recently_are_kept() {
        assert!(!is_stale(10, 10));
        assert!(!is_stale(10, 10 + OBJECT_RETENTION_FRAMES));
    }

    #[test]
    fn objects_left_undrawn_are_released() {
        assert!(is_stale(10, 11 + OBJECT_RETENTION_FRAMES));
    }

    #[test]
    fn frame_counter_behind_last_use_is_not_stale() {
        assert!(!is_stale(5, 3));
    }

    #[test]
    fn undrawable_objects_are_reported_once() {
        let mut reported = ReportedObjects::default();
        assert!(reported.first_sighting(7, 1));
        assert!(!reported.first_sighting(7, 2));
        assert!(reported.first_sighting(8, 2));
        assert_eq!(reported.len(), 2);
    }

    #[test]
    fn reported_objects_are_forgotten_once_gone() {
        let mut reported = ReportedObjects::default();
        reported.first_sighting(7, 1);
        reported.first_sighting(8, 1);
        // 8 keeps showing up
        reported.first_sighting(8, 1 + OBJECT_RETENTION_FRAMES);

        reported.evict_stale(2 + OBJECT_RETENTION_FRAMES);
        assert_eq!(reported.len(), 1);
        assert!(!reported.first_sighting(8, 2 + OBJECT_RETENTION_FRAMES));
        assert!(reported.first_sighting(7, 2 + OBJECT_RETENTION_FRAMES));
    }
}
