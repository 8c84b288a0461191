//! Field extraction: labels and summary stats for arbitrary records.
//!
//! A record has no declared schema, so its display label and summary
//! stats are resolved through a precedence chain: external presenter
//! first, then the dataset's built-in adapter, then generic heuristics,
//! and finally (for labels) the record id itself. Layers never
//! hard-block each other — a layer that yields no usable value falls
//! through to the next.
//!
//! Labels are cached in the owning dataset for its lifetime; a reload
//! builds a fresh dataset and therefore a fresh cache.

use serde_json::{Map, Value};

use crate::models::Dataset;
use crate::normalize::{format_value, normalize_value};

/// Generic name fields, tried in order when no presenter/adapter title
/// applies.
pub const GENERIC_NAME_FIELDS: [&str; 7] = [
    "Name",
    "Title",
    "DisplayName",
    "Display_Name",
    "UIName",
    "Display",
    "ItemName",
];

/// Generic stat fields, tried when no presenter/adapter stats apply.
const GENERIC_STAT_FIELDS: [&str; 5] = ["Damage", "Armor", "Durability", "Weight", "Value"];

/// Sub-containers searched one level deep when a stat field is not a
/// direct member of the record.
const STAT_CONTAINERS: [&str; 5] = ["Stats", "Attributes", "ItemStats", "Data", "Config"];

/// Labels longer than this are cut and marked with an ellipsis.
const MAX_LABEL_CHARS: usize = 140;

/// At most this many stat entries make it into a summary.
const MAX_STATS_ENTRIES: usize = 2;

/// Case-insensitive field lookup, shared by every extraction path.
pub fn find_field<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Resolve the display label for a record, cached per `(dataset, id)`.
///
/// Never empty and never panics, whatever shape the record has: a
/// record with no usable title field (including primitives and arrays)
/// falls back to its id.
pub fn label(dataset: &Dataset, id: &str, record: &Value) -> String {
    if let Some(cached) = dataset.labels.read().unwrap().get(id) {
        return cached.clone();
    }

    let text = title_text(dataset, record).unwrap_or_else(|| id.to_string());
    let text = if text.trim().is_empty() {
        id.to_string()
    } else {
        text
    };
    let clamped = clamp_label(&text);

    dataset
        .labels
        .write()
        .unwrap()
        .insert(id.to_string(), clamped.clone());
    clamped
}

fn title_text(dataset: &Dataset, record: &Value) -> Option<String> {
    let map = record.as_object()?;

    if let Some(presenter) = &dataset.presenter {
        if let Some(text) = first_field_text(map, &presenter.title_fields) {
            return Some(text);
        }
    }
    if let Some(adapter) = dataset.adapter {
        if let Some(text) = first_field_text(map, adapter.title_fields) {
            return Some(text);
        }
    }
    first_field_text(map, &GENERIC_NAME_FIELDS)
}

/// Resolve the short stats summary for a record.
///
/// Each layer extracts up to the first two non-empty fields, rendered
/// `"Field: value"` and joined with `" • "`. A layer producing nothing
/// falls through to the next; the result may be empty.
pub fn stats_summary(dataset: &Dataset, record: &Value) -> String {
    let Some(map) = record.as_object() else {
        return String::new();
    };

    if let Some(presenter) = &dataset.presenter {
        let entries = collect_stats(map, &presenter.stats_fields);
        if !entries.is_empty() {
            return entries.join(" • ");
        }
    }
    if let Some(adapter) = dataset.adapter {
        let entries = collect_stats(map, adapter.stats_fields);
        if !entries.is_empty() {
            return entries.join(" • ");
        }
    }
    collect_stats(map, &GENERIC_STAT_FIELDS).join(" • ")
}

/// True when the generic name-field lookup yields a non-empty value.
/// Used by the inspector's coverage statistic.
pub fn has_generic_name(map: &Map<String, Value>) -> bool {
    first_field_text(map, &GENERIC_NAME_FIELDS).is_some()
}

fn first_field_text<S: AsRef<str>>(map: &Map<String, Value>, names: &[S]) -> Option<String> {
    names.iter().find_map(|name| {
        let value = find_field(map, name.as_ref())?;
        let text = format_value(&normalize_value(value));
        (!text.trim().is_empty()).then_some(text)
    })
}

fn collect_stats<S: AsRef<str>>(map: &Map<String, Value>, fields: &[S]) -> Vec<String> {
    let mut entries = Vec::new();
    for field in fields {
        if entries.len() == MAX_STATS_ENTRIES {
            break;
        }
        let name = field.as_ref();
        let Some(value) = stat_field(map, name) else {
            continue;
        };
        let text = format_value(&normalize_value(value));
        if !text.trim().is_empty() {
            entries.push(format!("{}: {}", name, text));
        }
    }
    entries
}

/// Direct member lookup, then one level inside the known containers.
fn stat_field<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    if let Some(value) = find_field(map, name) {
        return Some(value);
    }
    STAT_CONTAINERS.iter().find_map(|container| {
        let inner = find_field(map, container)?.as_object()?;
        find_field(inner, name)
    })
}

fn clamp_label(text: &str) -> String {
    let mut chars = text.chars();
    let mut out: String = chars.by_ref().take(MAX_LABEL_CHARS).collect();
    if chars.next().is_some() {
        out.push('…');
    }
    out
}
