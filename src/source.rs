//! Chunk source abstraction.
//!
//! The merge engine is agnostic about where chunk documents live: a
//! local export tree or a static-hosted site. Both are reached through
//! the object-safe [`ChunkSource`] trait; the engine only ever asks for
//! a file by the path the index document declares.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::source_fs::FsChunkSource;
use crate::source_http::HttpChunkSource;

/// Abstract fetch-and-parse backend for index, presenter, and chunk
/// documents.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    /// Fetch one JSON document by its index-declared path. The path may
    /// be absolute (carries a URL scheme) or relative to the data root.
    async fn fetch(&self, file: &str) -> Result<Value>;

    /// Where this source reads from, for diagnostics.
    fn describe(&self) -> String;
}

/// True when `file` carries a URL scheme (`https://...`).
pub fn has_scheme(file: &str) -> bool {
    match file.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Pick the chunk source matching the configured data root: an
/// `http(s)` root selects the HTTP source, anything else the filesystem
/// source.
pub fn source_for(config: &Config) -> Arc<dyn ChunkSource> {
    let root = config.data.root.as_str();
    if root.starts_with("http://") || root.starts_with("https://") {
        Arc::new(HttpChunkSource::new(root))
    } else {
        Arc::new(FsChunkSource::new(root.into()))
    }
}
