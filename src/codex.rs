//! Dataset merge engine and engine handle.
//!
//! [`Codex`] owns the write-once index metadata, the optional presenters
//! document, the chunk source, and the per-key dataset cache. Loading a
//! dataset fetches its declared chunks concurrently, merges their
//! records into one table (last-merged chunk wins on duplicate ids),
//! records per-chunk failures without aborting the rest, and attaches
//! the resolved presenter/adapter configuration.
//!
//! Concurrency discipline: at most one in-flight load per dataset key.
//! Concurrent requests for the same key share a single fetch sequence
//! through a per-key `OnceCell` slot; requests for different keys never
//! block each other. Once cached, a dataset's record table never
//! changes — there is no eviction short of dropping the whole engine.
//!
//! Chunk completion order is not guaranteed, so duplicate-id resolution
//! is order-dependent across runs. That nondeterminism is inherited
//! from the exporter contract and deliberately not papered over with a
//! declaration-order tie-break.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::OnceCell;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::adapter;
use crate::error::CodexError;
use crate::get;
use crate::inspect;
use crate::models::{
    ChunkDoc, CodexIndex, Dataset, DatasetMeta, InspectorReport, RecordView, ResultEntry,
};
use crate::presenter::PresenterConfig;
use crate::search;
use crate::source::ChunkSource;

/// Fields that can carry a record's identifier, tried in order.
/// A record carrying none of them is dropped from the merge.
const ID_FIELDS: [&str; 6] = ["id", "ID", "key", "Key", "name", "Name"];

type DatasetSlot = Arc<OnceCell<Arc<Dataset>>>;

/// The engine handle: index metadata, presenters, chunk source, and the
/// single-flight dataset cache.
pub struct Codex {
    index: CodexIndex,
    presenters: Option<PresenterConfig>,
    source: Arc<dyn ChunkSource>,
    datasets: Mutex<HashMap<String, DatasetSlot>>,
}

impl std::fmt::Debug for Codex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codex")
            .field("index", &self.index)
            .field("presenters", &self.presenters)
            .field("datasets", &self.datasets)
            .finish_non_exhaustive()
    }
}

impl Codex {
    /// Load the index document (fatal when missing or malformed) and the
    /// optional presenters document (absence degrades to built-in
    /// adapters), then return a ready engine.
    pub async fn bootstrap(
        source: Arc<dyn ChunkSource>,
        index_file: &str,
        presenters_file: Option<&str>,
    ) -> Result<Self, CodexError> {
        let raw = source.fetch(index_file).await.map_err(|err| {
            CodexError::Config(format!("failed to load index {}: {}", index_file, err))
        })?;
        let index: CodexIndex = serde_json::from_value(raw)
            .map_err(|err| CodexError::Config(format!("malformed index document: {}", err)))?;

        let presenters = match presenters_file {
            Some(file) => match source.fetch(file).await {
                Ok(doc) if doc.is_object() => Some(PresenterConfig::new(doc)),
                Ok(_) => {
                    return Err(CodexError::Config(format!(
                        "malformed presenters document {}: expected an object",
                        file
                    )))
                }
                Err(err) => {
                    debug!(file, error = %err, "no presenters document, using built-in adapters");
                    None
                }
            },
            None => None,
        };

        info!(
            datasets = index.datasets.len(),
            source = %source.describe(),
            "codex ready"
        );
        Ok(Self {
            index,
            presenters,
            source,
            datasets: Mutex::new(HashMap::new()),
        })
    }

    pub fn index(&self) -> &CodexIndex {
        &self.index
    }

    /// All dataset keys declared by the index, sorted.
    pub fn dataset_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.index.datasets.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Load (or return the cached) merged dataset for `key`.
    pub async fn load_dataset(&self, key: &str) -> Result<Arc<Dataset>, CodexError> {
        let meta = self
            .index
            .datasets
            .get(key)
            .ok_or_else(|| CodexError::DatasetNotFound(key.to_string()))?
            .clone();

        let slot = {
            let mut slots = self.datasets.lock().unwrap();
            slots.entry(key.to_string()).or_default().clone()
        };
        if let Some(ready) = slot.get() {
            debug!(dataset = key, "dataset cache hit");
            return Ok(ready.clone());
        }

        let dataset = slot
            .get_or_init(|| self.merge_dataset(key.to_string(), meta))
            .await;
        Ok(dataset.clone())
    }

    /// Token-AND search over one dataset, sorted by label. The full
    /// match list is returned; display caps are the caller's concern.
    pub async fn search(&self, key: &str, query: &str) -> Result<Vec<ResultEntry>, CodexError> {
        let dataset = self.load_dataset(key).await?;
        Ok(search::query(&dataset, query))
    }

    /// Structured view of one record.
    pub async fn record_view(
        &self,
        key: &str,
        id: &str,
        show_hidden: bool,
    ) -> Result<RecordView, CodexError> {
        let dataset = self.load_dataset(key).await?;
        get::record_view(&dataset, id, show_hidden)
    }

    /// Cached analytics over one dataset.
    pub async fn inspect_dataset(&self, key: &str) -> Result<Arc<InspectorReport>, CodexError> {
        let dataset = self.load_dataset(key).await?;
        Ok(inspect::inspect(&dataset))
    }

    /// Fetch all chunks concurrently and merge in completion order.
    /// Never fails: per-chunk failures land in `load_errors` and the
    /// remaining chunks still contribute their records.
    async fn merge_dataset(&self, key: String, meta: DatasetMeta) -> Arc<Dataset> {
        let presenter = self.presenters.as_ref().map(|p| p.resolve(&key));
        let adapter = adapter::adapter_for(&key);

        // A dataset with no declared chunks is a valid terminal state.
        if meta.chunks.is_empty() {
            return Arc::new(Dataset::new(
                key,
                meta,
                HashMap::new(),
                Vec::new(),
                presenter,
                adapter,
            ));
        }

        let mut tasks: JoinSet<(String, anyhow::Result<ChunkDoc>)> = JoinSet::new();
        for chunk in &meta.chunks {
            let source = self.source.clone();
            let file = chunk.file.clone();
            tasks.spawn(async move {
                let outcome = match source.fetch(&file).await {
                    Ok(raw) => serde_json::from_value::<ChunkDoc>(raw).map_err(Into::into),
                    Err(err) => Err(err),
                };
                (file, outcome)
            });
        }

        let mut records: HashMap<String, Value> = HashMap::new();
        let mut load_errors: Vec<String> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(doc))) => {
                    for record in doc.records {
                        if let Some((id, payload)) = split_record(record) {
                            // Last-merged chunk wins on duplicate ids.
                            records.insert(id, payload);
                        }
                    }
                }
                Ok((file, Err(err))) => {
                    warn!(dataset = %key, file = %file, error = %err, "chunk failed, continuing");
                    load_errors.push(format!("{}: {}", file, err));
                }
                Err(join_err) => {
                    warn!(dataset = %key, error = %join_err, "chunk task aborted");
                    load_errors.push(format!("chunk task aborted: {}", join_err));
                }
            }
        }

        debug!(
            dataset = %key,
            records = records.len(),
            errors = load_errors.len(),
            "dataset merged"
        );
        Arc::new(Dataset::new(
            key,
            meta,
            records,
            load_errors,
            presenter,
            adapter,
        ))
    }
}

/// Split one raw chunk record into `(id, payload)`. The id comes from
/// the first recognized id field; a `data`-wrapped payload is unwrapped.
fn split_record(record: Value) -> Option<(String, Value)> {
    let map = record.as_object()?;
    let id = ID_FIELDS.iter().find_map(|field| id_text(map.get(*field)?))?;
    let payload = match map.get("data") {
        Some(data) => data.clone(),
        None => record.clone(),
    };
    Some((id, payload))
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// CLI entry point: print every dataset declared by the index.
pub fn run_datasets(codex: &Codex) {
    let index = codex.index();
    println!(
        "  {:<28} {:>10} {:>8}   {}",
        "DATASET", "RECORDS", "CHUNKS", "KIND"
    );
    println!("  {}", "-".repeat(60));
    for key in codex.dataset_keys() {
        let meta = &index.datasets[&key];
        let records = meta
            .records_total
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<28} {:>10} {:>8}   {}",
            key,
            records,
            meta.chunks.len(),
            meta.source_kind.as_deref().unwrap_or("-")
        );
    }
    println!();
    println!("  {} datasets", index.datasets.len());
}
