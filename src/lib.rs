//! # Codex Harness
//!
//! **A local-first dataset ingestion and inspection harness for chunked
//! game-data exports.**
//!
//! Codex Harness reads the chunked JSON trees produced by game-data
//! export sanitizers (an `index.json` describing datasets, plus capped
//! chunk files of records), merges each dataset into an in-memory
//! record table, and lets callers search, view, and inspect arbitrary
//! semi-structured records without any schema declared up front.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ ChunkSource  │──▶│  Merge Engine  │──▶│ Dataset cache  │
//! │  FS / HTTP   │   │ fetch + merge │   │ records+caches │
//! └──────────────┘   └───────────────┘   └──────┬────────┘
//!                                               │
//!                           ┌───────────────────┤
//!                           ▼                   ▼
//!                     ┌──────────┐        ┌──────────┐
//!                     │   CLI    │        │   HTTP   │
//!                     │  (cdx)   │        │  (axum)  │
//!                     └──────────┘        └──────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. [`Codex::bootstrap`](codex::Codex::bootstrap) loads the index
//!    document and the optional presenters document through a
//!    [`source::ChunkSource`].
//! 2. On first touch of a dataset key, the **merge engine** ([`codex`])
//!    fetches all declared chunks concurrently, merges their records
//!    into one table (last-merged chunk wins on duplicate ids), and
//!    records per-chunk failures without aborting the load.
//! 3. The **value normalizer** ([`normalize`]) canonicalizes free-form
//!    exporter values (localized-text macros, wrapper objects, tag and
//!    path handles) into renderable shapes.
//! 4. The **field extractor** ([`extract`]) resolves each record's
//!    label and stats through presenter → adapter → generic heuristics,
//!    configured per dataset by the **presenter resolver**
//!    ([`presenter`]) and the built-in **adapters** ([`adapter`]).
//! 5. The **search index** ([`search`]) answers token-AND substring
//!    queries over lazily cached per-record haystacks; the
//!    **inspector** ([`inspect`]) reports key/type statistics.
//! 6. Results surface through the **CLI** (`cdx`) and the **HTTP
//!    server** ([`server`]).
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`error`] | `CodexError` taxonomy (config / not-found / chunk-fetch) |
//! | [`models`] | Index, chunk, dataset, result, and report types |
//! | [`normalize`] | Value canonicalization and display formatting |
//! | [`presenter`] | External presenters with layered default/wildcard/exact resolution |
//! | [`adapter`] | Built-in fallback presenters keyed by dataset group |
//! | [`extract`] | Label and stats extraction with the precedence chain |
//! | [`source`] | `ChunkSource` trait and source selection |
//! | [`source_fs`] | Filesystem chunk source |
//! | [`source_http`] | HTTP chunk source |
//! | [`codex`] | Merge engine: single-flight loads, concurrent chunk fetch |
//! | [`search`] | Token-AND substring search over merged records |
//! | [`inspect`] | Dataset analytics (key frequency, types, name coverage) |
//! | [`get`] | Record view assembly |
//! | [`server`] | JSON HTTP API (axum) with CORS |

pub mod adapter;
pub mod codex;
pub mod config;
pub mod error;
pub mod extract;
pub mod get;
pub mod inspect;
pub mod models;
pub mod normalize;
pub mod presenter;
pub mod search;
pub mod server;
pub mod source;
pub mod source_fs;
pub mod source_http;

pub use codex::Codex;
pub use config::{load_config, Config};
pub use error::CodexError;
pub use models::{Dataset, InspectorReport, RecordView, ResultEntry};
pub use presenter::{Presenter, PresenterConfig};
pub use source::{source_for, ChunkSource};
pub use source_fs::FsChunkSource;
pub use source_http::HttpChunkSource;
