//! Read-only dataset analytics.
//!
//! Computes key frequency, per-key value-type histograms, and generic
//! name-field coverage over a merged dataset. The report is cached on
//! the dataset and recomputed only when the dataset itself is rebuilt
//! by a reload. Only top-level object records contribute to the key and
//! type statistics; primitives and arrays still count toward the total.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use crate::codex::Codex;
use crate::extract;
use crate::models::{Dataset, InspectorReport, KeyCount, TypeCounts};

/// How many keys the frequency table keeps.
const TOP_KEYS: usize = 30;

/// Compute (or return the cached) report for a dataset.
pub fn inspect(dataset: &Dataset) -> Arc<InspectorReport> {
    if let Some(report) = dataset.report.read().unwrap().as_ref() {
        return report.clone();
    }
    let report = Arc::new(build_report(dataset));
    *dataset.report.write().unwrap() = Some(report.clone());
    report
}

fn build_report(dataset: &Dataset) -> InspectorReport {
    let total = dataset.records.len();
    let mut named = 0usize;
    let mut key_counts: HashMap<String, usize> = HashMap::new();
    let mut histogram: HashMap<String, TypeCounts> = HashMap::new();

    for record in dataset.records.values() {
        let Some(map) = record.as_object() else {
            continue;
        };
        if extract::has_generic_name(map) {
            named += 1;
        }
        for (key, value) in map {
            *key_counts.entry(key.clone()).or_default() += 1;
            bump_type(histogram.entry(key.clone()).or_default(), value);
        }
    }

    let mut top_keys: Vec<KeyCount> = key_counts
        .into_iter()
        .map(|(key, count)| KeyCount { key, count })
        .collect();
    top_keys.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    top_keys.truncate(TOP_KEYS);

    InspectorReport {
        dataset_key: dataset.key.clone(),
        total_records: total,
        name_field_coverage_pct: percentage(named, total),
        top_keys,
        type_histogram: histogram,
    }
}

fn bump_type(counts: &mut TypeCounts, value: &Value) {
    match value {
        Value::String(_) => counts.string += 1,
        Value::Number(_) => counts.number += 1,
        Value::Bool(_) => counts.boolean += 1,
        Value::Object(_) => counts.object += 1,
        Value::Array(_) => counts.array += 1,
        Value::Null => counts.null += 1,
    }
}

/// Percentage with one decimal place.
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}

/// CLI entry point: print the report for one dataset.
pub async fn run_inspect(codex: &Codex, dataset_key: &str) -> Result<()> {
    let report = codex.inspect_dataset(dataset_key).await?;

    println!("Dataset: {}", report.dataset_key);
    println!("  records:        {}", report.total_records);
    println!("  name coverage:  {:.1}%", report.name_field_coverage_pct);
    println!();
    println!("  {:<32} {:>8}   {}", "KEY", "COUNT", "TYPES");
    println!("  {}", "-".repeat(72));
    for entry in &report.top_keys {
        let types = report
            .type_histogram
            .get(&entry.key)
            .map(describe_types)
            .unwrap_or_default();
        println!("  {:<32} {:>8}   {}", entry.key, entry.count, types);
    }
    Ok(())
}

fn describe_types(counts: &TypeCounts) -> String {
    let mut parts = Vec::new();
    for (name, count) in [
        ("string", counts.string),
        ("number", counts.number),
        ("boolean", counts.boolean),
        ("object", counts.object),
        ("array", counts.array),
        ("null", counts.null),
        ("other", counts.other),
    ] {
        if count > 0 {
            parts.push(format!("{} {}", name, count));
        }
    }
    parts.join(", ")
}
