//! Token-AND substring search over merged records.
//!
//! Each record gets a lazily cached lowercase haystack (`label + " " +
//! id`). A query is lowercased and stripped to letters, digits, spaces,
//! `_`, and `-`; every resulting token must be a substring of the
//! haystack for the record to match. No fuzzy matching, no ranking —
//! results are sorted ascending by label (case-folded, id tie-break).
//!
//! The full match list is always computed; display caps are applied by
//! the CLI/server presentation layer alongside the total count.

use anyhow::Result;

use crate::codex::Codex;
use crate::extract;
use crate::models::{Dataset, ResultEntry};

/// Lowercase, strip punctuation to spaces, split. An empty token list
/// means match-all.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// The cached search string for one record.
pub fn haystack(dataset: &Dataset, id: &str, record: &serde_json::Value) -> String {
    if let Some(cached) = dataset.haystacks.read().unwrap().get(id) {
        return cached.clone();
    }
    let built = format!("{} {}", extract::label(dataset, id, record), id).to_lowercase();
    dataset
        .haystacks
        .write()
        .unwrap()
        .insert(id.to_string(), built.clone());
    built
}

/// Run one query against a merged dataset. Every token must appear in a
/// record's haystack (logical AND, order-independent).
pub fn query(dataset: &Dataset, raw_query: &str) -> Vec<ResultEntry> {
    let tokens = tokenize(raw_query);

    let mut entries: Vec<ResultEntry> = dataset
        .records
        .iter()
        .filter_map(|(id, record)| {
            let hay = haystack(dataset, id, record);
            tokens
                .iter()
                .all(|token| hay.contains(token.as_str()))
                .then(|| ResultEntry {
                    id: id.clone(),
                    label: extract::label(dataset, id, record),
                    stats_summary: extract::stats_summary(dataset, record),
                })
        })
        .collect();

    entries.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    entries
}

/// CLI entry point: run a query and print a result table.
pub async fn run_search(
    codex: &Codex,
    dataset_key: &str,
    raw_query: &str,
    limit: usize,
) -> Result<()> {
    let dataset = codex.load_dataset(dataset_key).await?;
    let entries = query(&dataset, raw_query);
    let total = entries.len();

    if !dataset.load_errors.is_empty() {
        eprintln!(
            "warning: {} chunk(s) failed to load for {}",
            dataset.load_errors.len(),
            dataset_key
        );
    }

    println!("  {:<40} {:<34} {}", "LABEL", "ID", "STATS");
    println!("  {}", "-".repeat(96));
    for entry in entries.iter().take(limit) {
        println!(
            "  {:<40} {:<34} {}",
            entry.label, entry.id, entry.stats_summary
        );
    }
    println!();
    if total > limit {
        println!("  showing {} of {} matches", limit, total);
    } else {
        println!("  {} matches", total);
    }
    Ok(())
}
