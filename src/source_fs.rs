//! Filesystem chunk source.
//!
//! Reads JSON documents from an export tree on disk (the sanitizer's
//! `clean_data/` layout: `index.json` at the root, chunk files under
//! `datasets/<key>/`). Relative paths resolve against the configured
//! data root; a path that already starts with the root's directory name
//! is tolerated without double-joining.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::source::ChunkSource;

pub struct FsChunkSource {
    root: PathBuf,
}

impl FsChunkSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a declared file path against the data root.
    fn resolve(&self, file: &str) -> PathBuf {
        let rel = Path::new(file);
        if rel.is_absolute() {
            return rel.to_path_buf();
        }
        // Tolerate callers that prefixed the root directory themselves
        // ("clean_data/datasets/..." against root "./clean_data").
        if let Some(root_name) = self.root.file_name() {
            let mut components = rel.components();
            if components.next().map(|c| c.as_os_str()) == Some(root_name) {
                return self.root.join(components.as_path());
            }
        }
        self.root.join(rel)
    }
}

#[async_trait]
impl ChunkSource for FsChunkSource {
    async fn fetch(&self, file: &str) -> Result<Value> {
        let path = self.resolve(file);
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn describe(&self) -> String {
        format!("filesystem root {}", self.root.display())
    }
}
