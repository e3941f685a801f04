use std::{collections::HashMap, sync::Arc};

use anyhow::Context;

use crate::{config::AssetRoot, data_structures::texture::Texture, resources::load_binary};

#[derive(Debug, Clone, Copy)]
pub struct TextureRequest<'a> {
    pub key: &'a str,
    pub file_name: &'a str,
    pub is_normal_map: bool,
}

/// Keyed cache of loaded textures.
///
/// Handles are `Arc`s: destroying a key only drops the manager's handle,
/// materials still referencing the texture keep it alive.
#[derive(Debug)]
pub struct TextureManager {
    assets: AssetRoot,
    textures: HashMap<String, Arc<Texture>>,
}

impl TextureManager {
    pub fn new(assets: AssetRoot) -> Self {
        Self {
            assets,
            textures: HashMap::new(),
        }
    }

    /// Load `file_name` (relative to the asset root) and store it under `key`.
    ///
    /// Loading into an existing key replaces the previous texture.
    /// `is_normal_map` keeps the data linear instead of sRGB.
    pub async fn load_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        key: &str,
        file_name: &str,
        is_normal_map: bool,
    ) -> anyhow::Result<Arc<Texture>> {
        let data = load_binary(&self.assets, file_name).await?;
        self.insert(device, queue, key, file_name, &data, is_normal_map)
    }

    /// Read several textures concurrently, then upload them in request order.
    /// Fails on the first file that cannot be read or decoded.
    pub async fn load_textures(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        requests: &[TextureRequest<'_>],
    ) -> anyhow::Result<Vec<Arc<Texture>>> {
        let assets = &self.assets;
        let blobs = futures::future::try_join_all(
            requests
                .iter()
                .map(|request| load_binary(assets, request.file_name)),
        )
        .await?;
        requests
            .iter()
            .zip(blobs)
            .map(|(request, data)| {
                self.insert(
                    device,
                    queue,
                    request.key,
                    request.file_name,
                    &data,
                    request.is_normal_map,
                )
            })
            .collect()
    }

    fn insert(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        key: &str,
        file_name: &str,
        data: &[u8],
        is_normal_map: bool,
    ) -> anyhow::Result<Arc<Texture>> {
        let texture = Texture::from_bytes(device, queue, data, file_name, is_normal_map)
            .with_context(|| format!("Failed to load the texture at {file_name}"))?;
        let texture = Arc::new(texture);
        if self
            .textures
            .insert(key.to_string(), texture.clone())
            .is_some()
        {
            log::warn!("Texture key {key:?} was loaded twice, replacing it with {file_name}");
        }
        log::info!("Loaded texture {key:?} from {file_name}");
        Ok(texture)
    }

    pub fn get(&self, key: &str) -> Option<Arc<Texture>> {
        self.textures.get(key).cloned()
    }

    pub fn destroy(&mut self, key: &str) -> bool {
        self.textures.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
