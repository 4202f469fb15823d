//! Storage layout configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where uploads, shared folders and chunk staging areas live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all stored data.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    /// Upload area for root-scoped users, relative to `data_root`.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Parent of all shared folders, relative to `data_root`.
    #[serde(default = "default_sharing_dir")]
    pub sharing_dir: String,
    /// Name of the per-destination staging directory for chunks.
    #[serde(default = "default_chunks_dir")]
    pub chunks_dir: String,
    /// Largest accepted single chunk in bytes.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size_bytes: usize,
}

impl StorageConfig {
    pub fn upload_root(&self) -> PathBuf {
        self.data_root.join(&self.upload_dir)
    }

    pub fn sharing_root(&self) -> PathBuf {
        self.data_root.join(&self.sharing_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            upload_dir: default_upload_dir(),
            sharing_dir: default_sharing_dir(),
            chunks_dir: default_chunks_dir(),
            max_chunk_size_bytes: default_max_chunk_size(),
        }
    }
}

fn default_data_root() -> PathBuf {
    PathBuf::from("./data")
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_sharing_dir() -> String {
    "temp".to_string()
}

fn default_chunks_dir() -> String {
    "chunks".to_string()
}

fn default_max_chunk_size() -> usize {
    32 * 1024 * 1024
}
