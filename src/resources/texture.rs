use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::resources::AssetStore;

/// File name of a texture's description document.
pub fn description_file_name(texture_id: &str) -> String {
    format!("texture.description.{texture_id}")
}

/// File name of one mip's compressed payload.
pub fn payload_file_name(texture_id: &str, mip: usize) -> String {
    format!("texture.payload.mip{mip}.{texture_id}")
}

pub fn load_string(path: &Path) -> anyhow::Result<String> {
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(txt)
}

pub fn load_binary(path: &Path) -> anyhow::Result<Vec<u8>> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(data)
}

/// Texture files laid out flat in one directory:
/// `texture.description.<id>` and `texture.payload.mip<i>.<id>`.
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for DirStore {
    fn load_description(&self, texture_id: &str) -> anyhow::Result<String> {
        load_string(&self.root.join(description_file_name(texture_id)))
    }

    fn load_payload(&self, texture_id: &str, mip: usize) -> anyhow::Result<Vec<u8>> {
        load_binary(&self.root.join(payload_file_name(texture_id, mip)))
    }
}
