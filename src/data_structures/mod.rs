//! Engine data structures: meshes, textures, transforms, renderables and lights.
//!
//! - `model` holds the vertex layout, CPU-side geometry builders and GPU meshes
//! - `texture` is the GPU texture wrapper and creation utilities
//! - `transform` is an object's location, rotation and scale
//! - `renderable` pairs a mesh with a material and a transform
//! - `light` holds lights, their shadow maps and the active light slots

pub mod light;
pub mod model;
pub mod renderable;
pub mod texture;
pub mod transform;
