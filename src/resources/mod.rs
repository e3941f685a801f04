//! Loading shaders and textures from the asset directory.

use anyhow::Context;

use crate::config::AssetRoot;

pub mod shader;
pub mod texture;

pub async fn load_string(assets: &AssetRoot, file_name: &str) -> anyhow::Result<String> {
    let path = assets.resolve(file_name);
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

pub async fn load_binary(assets: &AssetRoot, file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = assets.resolve(file_name);
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
