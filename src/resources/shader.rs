//! WGSL shader programs.
//!
//! A program is one `.wgsl` file exposing `vs_main` and (except for depth
//! only programs) `fs_main`. Every program is written against the shared
//! bind group interface documented in [`crate::pipelines`]. Sources are
//! validated before they reach the device so a broken shader fails start-up
//! with a readable diagnostic instead of a device error later.

use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, bail};

use crate::{config::AssetRoot, resources::load_string};

static NEXT_SHADER_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug)]
pub struct ShaderProgram {
    id: u32,
    name: String,
    has_fragment: bool,
    pub module: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Load `<base_path>.wgsl` relative to the asset root.
    pub async fn from_file(
        device: &wgpu::Device,
        assets: &AssetRoot,
        base_path: &str,
    ) -> anyhow::Result<Self> {
        let file_name = format!("{base_path}.wgsl");
        let source = load_string(assets, &file_name).await?;
        let program = Self::from_source(device, base_path, &source)
            .with_context(|| format!("Failed to compile and link the shader program {file_name}"))?;
        log::info!("Loaded shader program {}", file_name);
        Ok(program)
    }

    pub fn from_source(device: &wgpu::Device, name: &str, source: &str) -> anyhow::Result<Self> {
        let has_fragment = validate_wgsl(source)?;
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        Ok(Self {
            id: NEXT_SHADER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            has_fragment,
            module,
        })
    }

    /// Process-unique; keys the renderer's pipeline caches.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the program defines `fs_main`.
    pub fn has_fragment(&self) -> bool {
        self.has_fragment
    }
}

/// Parse and validate WGSL, returning whether it has a `fs_main` entry point.
///
/// Errors carry naga's rendered diagnostic.
pub fn validate_wgsl(source: &str) -> anyhow::Result<bool> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| anyhow::anyhow!(e.emit_to_string(source)))?;
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| anyhow::anyhow!(e.emit_to_string(source)))?;

    let has_entry = |name: &str, stage: naga::ShaderStage| {
        module
            .entry_points
            .iter()
            .any(|entry| entry.name == name && entry.stage == stage)
    };
    if !has_entry("vs_main", naga::ShaderStage::Vertex) {
        bail!("shader has no `vs_main` vertex entry point");
    }
    Ok(has_entry("fs_main", naga::ShaderStage::Fragment))
}
