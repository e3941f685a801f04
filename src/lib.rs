//! flow-forward
//!
//! A minimal forward renderer on wgpu and winit: static meshes, textured
//! and normal-mapped materials, up to four lights with shadow maps, and a
//! small application loop to drive it. The crate exposes just what its
//! demo programs need and is not meant to grow into a general engine.
//!
//! High-level modules
//! - `config`: command line flags, window and renderer settings, asset root
//! - `context`: the window with its wgpu surface, device, queue and depth buffer
//! - `flow`: the application loop driving one [`flow::GraphicsFlow`]
//! - `input`: keyboard triggers mapping keys to actions
//! - `camera`: yaw/pitch and orbit cameras, perspective projection
//! - `data_structures`: meshes, textures, transforms, renderables and lights
//! - `resources`: asset IO, WGSL shader programs and the texture manager
//! - `pipelines`: bind group interface and render pipeline construction
//! - `render`: composition of renderables submitted to a pass
//! - `renderer`: the forward renderer with its shadow and scene passes
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod renderer;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use instant::Duration;
pub use wgpu::{Color, SurfaceError};
pub use winit::event::{ElementState, WindowEvent};
pub use winit::keyboard::KeyCode;
