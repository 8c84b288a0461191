//! Core data models for the codex engine.
//!
//! These types represent the index document, chunk documents, merged
//! datasets, and the result/report shapes that flow out of the search
//! and inspection paths.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::Adapter;
use crate::presenter::Presenter;

/// The index document loaded once at startup, immutable for the process
/// lifetime. Only `datasets` (and each chunk's `file`) is load-bearing;
/// the remaining fields are exporter metadata carried for display.
#[derive(Debug, Clone, Deserialize)]
pub struct CodexIndex {
    pub datasets: HashMap<String, DatasetMeta>,
    #[serde(default)]
    pub schema_version: Option<u64>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub chunk_cap_mib: Option<u64>,
}

/// Per-dataset entry in the index document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatasetMeta {
    #[serde(default)]
    pub chunks: Vec<ChunkRef>,
    #[serde(default)]
    pub records_total: Option<u64>,
    #[serde(default)]
    pub files_total: Option<u64>,
    #[serde(default)]
    pub source_kind: Option<String>,
}

/// One chunk file reference inside a dataset's index entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkRef {
    pub file: String,
    #[serde(default)]
    pub records: Option<u64>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub chunk: Option<u64>,
}

/// One fetched chunk document. Unknown fields (`dataset`, `chunk`) are
/// ignored; only the record list matters to the merge.
#[derive(Debug, Default, Deserialize)]
pub struct ChunkDoc {
    #[serde(default)]
    pub records: Vec<Value>,
}

/// A merged dataset: the record table plus per-dataset configuration and
/// lazily populated derived caches.
///
/// Once a `Dataset` is in the engine's cache its `records` table never
/// changes; a reload builds a fresh `Dataset` with fresh caches. The
/// caches are only ever populated, never mutated in place.
#[derive(Debug)]
pub struct Dataset {
    pub key: String,
    pub meta: DatasetMeta,
    pub records: HashMap<String, Value>,
    /// Non-fatal per-chunk failures, in merge order (`file: message`).
    pub load_errors: Vec<String>,
    /// Resolved external presenter, if a presenters document was loaded.
    pub presenter: Option<Presenter>,
    /// Built-in fallback for the dataset's group.
    pub adapter: Option<&'static Adapter>,
    pub(crate) labels: RwLock<HashMap<String, String>>,
    pub(crate) haystacks: RwLock<HashMap<String, String>>,
    pub(crate) report: RwLock<Option<Arc<InspectorReport>>>,
}

impl Dataset {
    pub fn new(
        key: String,
        meta: DatasetMeta,
        records: HashMap<String, Value>,
        load_errors: Vec<String>,
        presenter: Option<Presenter>,
        adapter: Option<&'static Adapter>,
    ) -> Self {
        Self {
            key,
            meta,
            records,
            load_errors,
            presenter,
            adapter,
            labels: RwLock::new(HashMap::new()),
            haystacks: RwLock::new(HashMap::new()),
            report: RwLock::new(None),
        }
    }

    pub fn record(&self, id: &str) -> Option<&Value> {
        self.records.get(id)
    }
}

/// One search result row, recomputed per query.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    pub id: String,
    pub label: String,
    pub stats_summary: String,
}

/// Structured view of a single record, assembled on demand.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub id: String,
    pub label: String,
    /// Display-normalized form of the whole record.
    pub normalized: Value,
    /// Presenter/adapter field groups with rendered values.
    pub sections: Vec<SectionView>,
    /// Rendered top-level fields, after the hidden-key filter.
    pub fields: Vec<FieldView>,
    /// The record exactly as merged.
    pub raw: Value,
}

/// A titled group of rendered fields in a [`RecordView`].
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub title: String,
    pub fields: Vec<FieldView>,
}

/// One rendered `name: value` pair.
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: String,
    pub value: String,
}

/// Read-only analytics over a merged dataset, cached per dataset.
#[derive(Debug, Clone, Serialize)]
pub struct InspectorReport {
    pub dataset_key: String,
    pub total_records: usize,
    /// Percentage (one decimal) of records with a non-empty generic
    /// name field.
    pub name_field_coverage_pct: f64,
    /// Top keys by frequency across top-level object records.
    pub top_keys: Vec<KeyCount>,
    /// Per-key value-type counts.
    pub type_histogram: HashMap<String, TypeCounts>,
}

/// One key-frequency row in an [`InspectorReport`].
#[derive(Debug, Clone, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: usize,
}

/// Value-type histogram for one key.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeCounts {
    pub string: usize,
    pub number: usize,
    pub boolean: usize,
    pub object: usize,
    pub array: usize,
    pub null: usize,
    pub other: usize,
}
