//! Presenter configuration and layered resolution.
//!
//! A presenters document is an external JSON object mapping dataset keys
//! (or wildcard prefixes like `"weapons_*"`, or the literal `"default"`)
//! to field-selection rules: which fields count as a title, which as
//! summary stats, and how to group fields into sections.
//!
//! Resolution is a precedence-ordered override chain, not inheritance:
//! `default` merges first, then every matching wildcard entry sorted so
//! the longest (most specific) prefix merges last, then the exact-key
//! entry. For the list-valued fields (`titleFields`, `statsFields`,
//! `sections`) an override replaces the accumulated list wholesale only
//! when it actually is an array; any other shape keeps the prior layer's
//! list. All other fields shallow-replace.

use serde::Serialize;
use serde_json::{Map, Value};

/// Entry key marking the base layer of a presenters document.
const DEFAULT_KEY: &str = "default";

/// Suffix marking a wildcard-prefix entry.
const WILDCARD: char = '*';

/// List-valued fields with replace-only-if-array merge semantics.
const LIST_FIELDS: [&str; 3] = ["titleFields", "statsFields", "sections"];

/// Resolved field-selection rules for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Presenter {
    /// Candidate title fields, most preferred first.
    pub title_fields: Vec<String>,
    /// Candidate summary-stat fields, most preferred first.
    pub stats_fields: Vec<String>,
    /// Field groups for the record view.
    pub sections: Vec<PresenterSection>,
}

/// One titled group of fields in a record view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PresenterSection {
    pub title: String,
    pub fields: Vec<String>,
}

/// The raw presenters document, kept as JSON so the layered merge works
/// over arbitrary shapes without failing on malformed entries.
#[derive(Debug, Clone, Default)]
pub struct PresenterConfig {
    entries: Map<String, Value>,
}

impl PresenterConfig {
    /// Wrap a parsed presenters document. Non-object documents resolve
    /// as if empty.
    pub fn new(doc: Value) -> Self {
        match doc {
            Value::Object(entries) => Self { entries },
            _ => Self::default(),
        }
    }

    /// Resolve the presenter for `dataset_key` by merging the default,
    /// wildcard, and exact layers in precedence order.
    pub fn resolve(&self, dataset_key: &str) -> Presenter {
        let mut acc = match self.entries.get(DEFAULT_KEY) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        // Matching wildcard entries, shortest prefix first so the most
        // specific one merges last and wins.
        let mut wildcards: Vec<(&str, &Map<String, Value>)> = self
            .entries
            .iter()
            .filter_map(|(key, value)| {
                let prefix = key.strip_suffix(WILDCARD)?;
                if key == DEFAULT_KEY || !dataset_key.starts_with(prefix) {
                    return None;
                }
                value.as_object().map(|map| (prefix, map))
            })
            .collect();
        wildcards.sort_by_key(|(prefix, _)| prefix.len());

        for (_, layer) in wildcards {
            merge_layer(&mut acc, layer);
        }

        if let Some(Value::Object(exact)) = self.entries.get(dataset_key) {
            merge_layer(&mut acc, exact);
        }

        presenter_from_map(&acc)
    }
}

/// Merge one override layer into the accumulator. List fields replace
/// wholesale when the override holds an array; other fields
/// shallow-replace.
fn merge_layer(acc: &mut Map<String, Value>, layer: &Map<String, Value>) {
    for (key, value) in layer {
        if LIST_FIELDS.contains(&key.as_str()) && !value.is_array() {
            continue;
        }
        acc.insert(key.clone(), value.clone());
    }
}

/// Lenient conversion from the merged accumulator to the typed form.
/// Non-string field names and malformed sections are skipped.
fn presenter_from_map(map: &Map<String, Value>) -> Presenter {
    Presenter {
        title_fields: string_list(map.get("titleFields")),
        stats_fields: string_list(map.get("statsFields")),
        sections: map
            .get("sections")
            .and_then(Value::as_array)
            .map(|sections| sections.iter().filter_map(section_from_value).collect())
            .unwrap_or_default(),
    }
}

fn section_from_value(value: &Value) -> Option<PresenterSection> {
    let map = value.as_object()?;
    let fields = string_list(map.get("fields"));
    if fields.is_empty() {
        return None;
    }
    Some(PresenterSection {
        title: map
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Details")
            .to_string(),
        fields,
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
