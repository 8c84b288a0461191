//! HTTP chunk source.
//!
//! Fetches JSON documents from a static-hosted export tree (the same
//! layout GitHub Pages serves). Paths with a URL scheme are fetched
//! as-is; relative paths are joined to the configured base URL.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::source::{has_scheme, ChunkSource};

pub struct HttpChunkSource {
    client: reqwest::Client,
    base: String,
}

impl HttpChunkSource {
    pub fn new(base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, file: &str) -> String {
        if has_scheme(file) {
            file.to_string()
        } else {
            format!("{}/{}", self.base, file.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl ChunkSource for HttpChunkSource {
    async fn fetch(&self, file: &str) -> Result<Value> {
        let url = self.url_for(file);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("bad status: {}", url))?;
        response
            .json::<Value>()
            .await
            .with_context(|| format!("failed to parse {}", url))
    }

    fn describe(&self) -> String {
        format!("http base {}", self.base)
    }
}
