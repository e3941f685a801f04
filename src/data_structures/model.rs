//! Meshes and the procedural primitives the demos are built from.
//!
//! [`Geometry`] is the CPU-side vertex/index data; [`Mesh`] is the same data
//! uploaded to the GPU. Keeping the two apart lets primitives be generated
//! and inspected without a device.

use wgpu::util::DeviceExt;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Indexed triangle list in host memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// A quad in the XY plane at z = 0 facing +Z.
    ///
    /// The corners may be passed in any order (e.g. top-left then
    /// bottom-right); the quad always spans the rectangle between them.
    pub fn plane_xy(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let (min_x, max_x) = (x0.min(x1), x0.max(x1));
        let (min_y, max_y) = (y0.min(y1), y0.max(y1));
        let mut geometry = Self::default();
        geometry.push_quad(
            [
                [min_x, min_y, 0.0],
                [max_x, min_y, 0.0],
                [max_x, max_y, 0.0],
                [min_x, max_y, 0.0],
            ],
            [0.0, 0.0, 1.0],
        );
        geometry.compute_tangents();
        geometry
    }

    /// An axis-aligned box with 4 unshared vertices per face so every face
    /// gets flat normals and its own full UV square.
    pub fn cube(min: [f32; 3], max: [f32; 3]) -> Self {
        let [x0, y0, z0] = [min[0].min(max[0]), min[1].min(max[1]), min[2].min(max[2])];
        let [x1, y1, z1] = [min[0].max(max[0]), min[1].max(max[1]), min[2].max(max[2])];
        let mut geometry = Self::default();
        // +Z
        geometry.push_quad(
            [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
            [0.0, 0.0, 1.0],
        );
        // -Z
        geometry.push_quad(
            [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]],
            [0.0, 0.0, -1.0],
        );
        // +X
        geometry.push_quad(
            [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]],
            [1.0, 0.0, 0.0],
        );
        // -X
        geometry.push_quad(
            [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]],
            [-1.0, 0.0, 0.0],
        );
        // +Y
        geometry.push_quad(
            [[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]],
            [0.0, 1.0, 0.0],
        );
        // -Y
        geometry.push_quad(
            [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
            [0.0, -1.0, 0.0],
        );
        geometry.compute_tangents();
        geometry
    }

    /// Corners are expected counter-clockwise when seen from the side the
    /// normal points to. UVs follow wgpu's convention (v grows downwards).
    fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3]) {
        const UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        let base = self.vertices.len() as u32;
        for (position, tex_coords) in corners.into_iter().zip(UVS) {
            self.vertices.push(ModelVertex {
                position,
                tex_coords,
                normal,
                tangent: [0.0; 3],
                bitangent: [0.0; 3],
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Calculate per-vertex tangents and bitangents for normal mapping by
    /// averaging the tangent frame of every triangle a vertex belongs to.
    pub fn compute_tangents(&mut self) {
        let vertices = &mut self.vertices;
        for v in vertices.iter_mut() {
            v.tangent = [0.0; 3];
            v.bitangent = [0.0; 3];
        }
        let mut triangles_included = vec![0u32; vertices.len()];

        for c in self.indices.chunks(3) {
            if c.len() < 3 {
                continue;
            }
            let v0 = vertices[c[0] as usize];
            let v1 = vertices[c[1] as usize];
            let v2 = vertices[c[2] as usize];

            let pos0: cgmath::Vector3<_> = v0.position.into();
            let pos1: cgmath::Vector3<_> = v1.position.into();
            let pos2: cgmath::Vector3<_> = v2.position.into();

            let uv0: cgmath::Vector2<_> = v0.tex_coords.into();
            let uv1: cgmath::Vector2<_> = v1.tex_coords.into();
            let uv2: cgmath::Vector2<_> = v2.tex_coords.into();

            let delta_pos1 = pos1 - pos0;
            let delta_pos2 = pos2 - pos0;
            let delta_uv1 = uv1 - uv0;
            let delta_uv2 = uv2 - uv0;

            // delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
            // delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
            let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
            // flipped so right-handed normal maps work with wgpu's v-down UVs
            let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

            for &i in c {
                let v = &mut vertices[i as usize];
                v.tangent = (tangent + cgmath::Vector3::from(v.tangent)).into();
                v.bitangent = (bitangent + cgmath::Vector3::from(v.bitangent)).into();
                triangles_included[i as usize] += 1;
            }
        }

        for (i, n) in triangles_included.into_iter().enumerate() {
            if n == 0 {
                continue;
            }
            let denom = 1.0 / n as f32;
            let v = &mut vertices[i];
            v.tangent = (cgmath::Vector3::from(v.tangent) * denom).into();
            v.bitangent = (cgmath::Vector3::from(v.bitangent) * denom).into();
        }
    }
}

/// Geometry living in GPU buffers.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl Mesh {
    pub fn from_geometry(device: &wgpu::Device, name: &str, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
        }
    }

    pub fn plane_xy(device: &wgpu::Device, name: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::from_geometry(device, name, &Geometry::plane_xy(x0, y0, x1, y1))
    }

    pub fn cube(device: &wgpu::Device, name: &str, min: [f32; 3], max: [f32; 3]) -> Self {
        Self::from_geometry(device, name, &Geometry::cube(min, max))
    }
}

pub trait DrawMesh {
    fn draw_mesh(&mut self, mesh: &Mesh, object_bind_group: &wgpu::BindGroup);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh, object_bind_group: &wgpu::BindGroup) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(1, object_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }
}
