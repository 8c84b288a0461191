//! TOML configuration parsing and validation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Directory holding the export tree, or an `http(s)` base URL.
    pub root: String,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Presenters document path. The file may be absent at runtime;
    /// the engine then falls back to built-in adapters.
    #[serde(default = "default_presenters_file")]
    pub presenters_file: String,
}

fn default_index_file() -> String {
    "index.json".to_string()
}
fn default_presenters_file() -> String {
    "presenters.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Display cap for CLI/server result lists. The engine always
    /// computes the full match list and total.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.data.root.trim().is_empty() {
        anyhow::bail!("data.root must not be empty");
    }
    if config.search.max_results < 1 {
        anyhow::bail!("search.max_results must be >= 1");
    }

    Ok(config)
}
