use std::collections::HashMap;

use anyhow::anyhow;

/**
 * This module contains the storage side of texture loading: where description documents
 * and compressed mip payloads come from.
 */
pub mod texture;

pub use texture::DirStore;

/// Byte source for textures, keyed by texture id and mip index.
pub trait AssetStore {
    /// The raw JSON description document.
    fn load_description(&self, texture_id: &str) -> anyhow::Result<String>;

    /// The compressed payload of mip `mip`.
    fn load_payload(&self, texture_id: &str, mip: usize) -> anyhow::Result<Vec<u8>>;
}

impl<S: AssetStore + ?Sized> AssetStore for &S {
    fn load_description(&self, texture_id: &str) -> anyhow::Result<String> {
        (**self).load_description(texture_id)
    }

    fn load_payload(&self, texture_id: &str, mip: usize) -> anyhow::Result<Vec<u8>> {
        (**self).load_payload(texture_id, mip)
    }
}

/// In-memory store, mostly for tests and generated assets.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    descriptions: HashMap<String, String>,
    payloads: HashMap<(String, usize), Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_description(&mut self, texture_id: &str, document: impl Into<String>) {
        self.descriptions
            .insert(texture_id.to_string(), document.into());
    }

    pub fn insert_payload(&mut self, texture_id: &str, mip: usize, bytes: Vec<u8>) {
        self.payloads.insert((texture_id.to_string(), mip), bytes);
    }
}

impl AssetStore for MemoryStore {
    fn load_description(&self, texture_id: &str) -> anyhow::Result<String> {
        self.descriptions
            .get(texture_id)
            .cloned()
            .ok_or_else(|| anyhow!("no description for texture {texture_id}"))
    }

    fn load_payload(&self, texture_id: &str, mip: usize) -> anyhow::Result<Vec<u8>> {
        self.payloads
            .get(&(texture_id.to_string(), mip))
            .cloned()
            .ok_or_else(|| anyhow!("no payload for mip {mip} of texture {texture_id}"))
    }
}
