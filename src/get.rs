//! Record retrieval and view assembly.
//!
//! Builds the structured view of a single record: resolved label, the
//! display-normalized value, presenter/adapter sections with rendered
//! fields, and the raw record. Used by both the `cdx show` CLI command
//! and the `/datasets/{key}/records/{id}` HTTP endpoint.

use anyhow::Result;

use crate::codex::Codex;
use crate::error::CodexError;
use crate::extract::{self, find_field};
use crate::models::{Dataset, FieldView, RecordView, SectionView};
use crate::normalize::{format_display_value, normalize_value_for_display};
use crate::presenter::PresenterSection;

/// Exporter noise hidden from the rendered field list unless the caller
/// asks for hidden fields. Keys starting with `_` are hidden too.
const HIDDEN_KEYS: [&str; 6] = [
    "ExportPath",
    "UberGraphFrame",
    "Cooked",
    "ExternalData",
    "AssetImportData",
    "SoftObjectPath",
];

/// Assemble the view for one record.
///
/// `show_hidden` only widens the rendered top-level field list; the
/// normalized and raw forms always carry the full record. The flag is
/// passed per call — the engine owns no display preference state.
pub fn record_view(
    dataset: &Dataset,
    id: &str,
    show_hidden: bool,
) -> Result<RecordView, CodexError> {
    let record = dataset
        .record(id)
        .ok_or_else(|| CodexError::RecordNotFound {
            dataset: dataset.key.clone(),
            id: id.to_string(),
        })?;

    Ok(RecordView {
        id: id.to_string(),
        label: extract::label(dataset, id, record),
        normalized: normalize_value_for_display(record, 0),
        sections: build_sections(dataset, record),
        fields: top_fields(record, show_hidden),
        raw: record.clone(),
    })
}

/// Presenter sections win; an adapter's sections apply only when the
/// presenter defines none. Fields that render empty are skipped, and a
/// section with no surviving fields is dropped.
fn build_sections(dataset: &Dataset, record: &serde_json::Value) -> Vec<SectionView> {
    let sections: Vec<PresenterSection> = match &dataset.presenter {
        Some(presenter) if !presenter.sections.is_empty() => presenter.sections.clone(),
        _ => dataset
            .adapter
            .map(|adapter| adapter.as_presenter().sections)
            .unwrap_or_default(),
    };

    let Some(map) = record.as_object() else {
        return Vec::new();
    };

    sections
        .iter()
        .filter_map(|section| {
            let fields: Vec<FieldView> = section
                .fields
                .iter()
                .filter_map(|name| {
                    let value = find_field(map, name)?;
                    let text = format_display_value(&normalize_value_for_display(value, 0));
                    (!text.trim().is_empty()).then(|| FieldView {
                        name: name.clone(),
                        value: text,
                    })
                })
                .collect();
            (!fields.is_empty()).then(|| SectionView {
                title: section.title.clone(),
                fields,
            })
        })
        .collect()
}

fn top_fields(record: &serde_json::Value, show_hidden: bool) -> Vec<FieldView> {
    let Some(map) = record.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter(|(key, _)| show_hidden || !is_hidden(key))
        .filter_map(|(key, value)| {
            let text = format_display_value(&normalize_value_for_display(value, 0));
            (!text.trim().is_empty()).then(|| FieldView {
                name: key.clone(),
                value: text,
            })
        })
        .collect()
}

fn is_hidden(key: &str) -> bool {
    key.starts_with('_') || HIDDEN_KEYS.iter().any(|h| h.eq_ignore_ascii_case(key))
}

/// CLI entry point: print one record as labelled blocks, or as JSON.
pub async fn run_show(
    codex: &Codex,
    dataset_key: &str,
    id: &str,
    show_hidden: bool,
    as_json: bool,
) -> Result<()> {
    let view = codex.record_view(dataset_key, id, show_hidden).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("--- Record ---");
    println!("dataset: {}", dataset_key);
    println!("id:      {}", view.id);
    println!("label:   {}", view.label);
    println!();

    for section in &view.sections {
        println!("--- {} ---", section.title);
        for field in &section.fields {
            println!("{:<24} {}", field.name, field.value);
        }
        println!();
    }

    println!("--- Fields ---");
    for field in &view.fields {
        println!("{:<24} {}", field.name, field.value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::adapter_for;
    use crate::models::DatasetMeta;
    use crate::presenter::Presenter;
    use serde_json::json;

    fn dataset(
        key: &str,
        presenter: Option<Presenter>,
        records: Vec<(&str, serde_json::Value)>,
    ) -> Dataset {
        Dataset::new(
            key.to_string(),
            DatasetMeta::default(),
            records
                .into_iter()
                .map(|(id, v)| (id.to_string(), v))
                .collect(),
            Vec::new(),
            presenter,
            adapter_for(key),
        )
    }

    #[test]
    fn test_missing_record_is_not_found() {
        let ds = dataset("items_cdo", None, vec![]);
        let err = record_view(&ds, "nope", false).unwrap_err();
        assert!(matches!(err, CodexError::RecordNotFound { .. }));
    }

    #[test]
    fn test_view_carries_label_sections_and_raw() {
        let ds = dataset(
            "weapons_cdo",
            None,
            vec![(
                "pike",
                json!({"WeaponName": "Pike", "Damage": 12, "Weight": 4}),
            )],
        );
        let view = record_view(&ds, "pike", false).unwrap();

        assert_eq!(view.label, "Pike");
        assert_eq!(view.raw["Damage"], json!(12));
        // Adapter sections: Combat carries Damage, Handling carries Weight.
        let combat = view.sections.iter().find(|s| s.title == "Combat").unwrap();
        assert_eq!(combat.fields[0].name, "Damage");
        assert_eq!(combat.fields[0].value, "12");
        assert!(view.sections.iter().any(|s| s.title == "Handling"));
    }

    #[test]
    fn test_presenter_sections_override_adapter() {
        let presenter = Presenter {
            title_fields: Vec::new(),
            stats_fields: Vec::new(),
            sections: vec![PresenterSection {
                title: "Custom".to_string(),
                fields: vec!["Damage".to_string()],
            }],
        };
        let ds = dataset(
            "weapons_cdo",
            Some(presenter),
            vec![("pike", json!({"Damage": 12}))],
        );
        let view = record_view(&ds, "pike", false).unwrap();
        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.sections[0].title, "Custom");
    }

    #[test]
    fn test_empty_sections_dropped() {
        let ds = dataset("weapons_cdo", None, vec![("bare", json!({"Other": 1}))]);
        let view = record_view(&ds, "bare", false).unwrap();
        assert!(view.sections.is_empty());
    }

    #[test]
    fn test_hidden_fields_filtered_unless_requested() {
        let ds = dataset(
            "items_cdo",
            None,
            vec![(
                "r",
                json!({"Name": "Axe", "ExportPath": "/Game/X", "_internal": 1}),
            )],
        );

        let view = record_view(&ds, "r", false).unwrap();
        let names: Vec<&str> = view.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Name"]);

        let view = record_view(&ds, "r", true).unwrap();
        assert_eq!(view.fields.len(), 3);
    }

    #[test]
    fn test_primitive_record_view_never_panics() {
        let ds = dataset("misc", None, vec![("p", json!(42))]);
        let view = record_view(&ds, "p", false).unwrap();
        assert_eq!(view.label, "p");
        assert!(view.sections.is_empty());
        assert!(view.fields.is_empty());
        assert_eq!(view.raw, json!(42));
    }
}
