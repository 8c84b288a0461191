use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use codex_harness::{Codex, CodexError, FsChunkSource};

fn cdx_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("cdx");
    path
}

/// Build a sanitizer-shaped export tree: index.json + presenters.json at
/// the root, chunk files under datasets/<key>/.
fn setup_export_tree() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("clean_data");
    fs::create_dir_all(root.join("datasets/items_cdo")).unwrap();
    fs::create_dir_all(root.join("datasets/weapons_assets")).unwrap();

    let index = json!({
        "schema_version": 1,
        "generated_at": "2025-11-02T10:00:00+00:00",
        "chunk_cap_mib": 20,
        "datasets": {
            "items_cdo": {
                "chunks": [
                    {"file": "datasets/items_cdo/items_cdo_000.json", "records": 2, "chunk": 0},
                    {"file": "datasets/items_cdo/items_cdo_001.json", "records": 1, "chunk": 1}
                ],
                "records_total": 3,
                "files_total": 2,
                "source_kind": "cdo"
            },
            "weapons_assets": {
                "chunks": [
                    {"file": "datasets/weapons_assets/weapons_assets_000.json"}
                ],
                "records_total": 2,
                "source_kind": "assets"
            },
            "empty_set": { "chunks": [], "records_total": 0 }
        }
    });
    fs::write(
        root.join("index.json"),
        serde_json::to_string_pretty(&index).unwrap(),
    )
    .unwrap();

    let presenters = json!({
        "default": {"titleFields": ["Name", "DisplayName"]},
        "weapons_*": {
            "titleFields": ["WeaponName"],
            "statsFields": ["Damage", "Durability"],
            "sections": [
                {"title": "Combat", "fields": ["Damage", "AttackSpeed"]}
            ]
        }
    });
    fs::write(
        root.join("presenters.json"),
        serde_json::to_string(&presenters).unwrap(),
    )
    .unwrap();

    let items_0 = json!({
        "dataset": "items_cdo",
        "chunk": 0,
        "records": [
            {"id": "04_items_all/iron_ingot", "src": "04_items_all/cdo/iron_ingot.t3d",
             "data": {"Name": "NSLOCTEXT(\"Items\",\"iron_ingot\",\"Iron Ingot\")", "Weight": 0.5, "Value": 12}},
            {"id": "04_items_all/rope", "src": "04_items_all/cdo/rope.t3d",
             "data": {"Name": "Rope", "Weight": 0.2, "ExportPath": "/Game/Items/Rope"}}
        ]
    });
    fs::write(
        root.join("datasets/items_cdo/items_cdo_000.json"),
        serde_json::to_string(&items_0).unwrap(),
    )
    .unwrap();

    let items_1 = json!({
        "records": [
            {"id": "04_items_all/linen", "data": {"Name": "Linen", "Weight": 0.1}}
        ]
    });
    fs::write(
        root.join("datasets/items_cdo/items_cdo_001.json"),
        serde_json::to_string(&items_1).unwrap(),
    )
    .unwrap();

    let weapons_0 = json!({
        "records": [
            {"id": "05_weapons/iron_sword",
             "data": {"WeaponName": "Iron Sword", "Damage": 14, "AttackSpeed": 1.1}},
            {"id": "05_weapons/iron_shield",
             "data": {"WeaponName": "Iron Shield", "Damage": 2, "Durability": 90}}
        ]
    });
    fs::write(
        root.join("datasets/weapons_assets/weapons_assets_000.json"),
        serde_json::to_string(&weapons_0).unwrap(),
    )
    .unwrap();

    (tmp, root)
}

fn write_config(dir: &Path, root: &Path) -> PathBuf {
    let path = dir.join("cdx.toml");
    fs::write(
        &path,
        format!(
            "[data]\nroot = \"{}\"\n\n[search]\nmax_results = 25\n",
            root.display()
        ),
    )
    .unwrap();
    path
}

async fn bootstrap(root: &Path) -> Codex {
    let source = Arc::new(FsChunkSource::new(root.to_path_buf()));
    Codex::bootstrap(source, "index.json", Some("presenters.json"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_flow_over_export_tree() {
    let (_tmp, root) = setup_export_tree();
    let codex = bootstrap(&root).await;

    assert_eq!(
        codex.dataset_keys(),
        vec!["empty_set", "items_cdo", "weapons_assets"]
    );

    // Merge across chunks, localized names unwrapped for labels.
    let items = codex.load_dataset("items_cdo").await.unwrap();
    assert_eq!(items.records.len(), 3);
    assert!(items.load_errors.is_empty());

    let hits = codex.search("items_cdo", "iron ingot").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].label, "Iron Ingot");

    // Wildcard presenter applies to weapons: title + stats + sorting.
    let hits = codex.search("weapons_assets", "iron").await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].label, "Iron Shield");
    assert_eq!(hits[1].label, "Iron Sword");
    assert_eq!(hits[1].stats_summary, "Damage: 14");

    // Empty query matches everything.
    let all = codex.search("items_cdo", "").await.unwrap();
    assert_eq!(all.len(), 3);

    // Empty dataset is queryable and empty.
    assert!(codex.search("empty_set", "x").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_record_view_sections_and_hidden_fields() {
    let (_tmp, root) = setup_export_tree();
    let codex = bootstrap(&root).await;

    let view = codex
        .record_view("weapons_assets", "05_weapons/iron_sword", false)
        .await
        .unwrap();
    assert_eq!(view.label, "Iron Sword");
    assert_eq!(view.sections.len(), 1);
    assert_eq!(view.sections[0].title, "Combat");
    assert_eq!(view.sections[0].fields[0].name, "Damage");

    // The exporter-noise key is hidden by default and shown on demand.
    let view = codex
        .record_view("items_cdo", "04_items_all/rope", false)
        .await
        .unwrap();
    assert!(!view.fields.iter().any(|f| f.name == "ExportPath"));
    let view = codex
        .record_view("items_cdo", "04_items_all/rope", true)
        .await
        .unwrap();
    assert!(view.fields.iter().any(|f| f.name == "ExportPath"));

    let err = codex
        .record_view("items_cdo", "no_such_record", false)
        .await
        .unwrap_err();
    assert!(matches!(err, CodexError::RecordNotFound { .. }));
    let err = codex.record_view("no_such_set", "x", false).await.unwrap_err();
    assert!(matches!(err, CodexError::DatasetNotFound(_)));
}

#[tokio::test]
async fn test_inspect_report() {
    let (_tmp, root) = setup_export_tree();
    let codex = bootstrap(&root).await;

    let report = codex.inspect_dataset("items_cdo").await.unwrap();
    assert_eq!(report.total_records, 3);
    // Every item record carries a Name field.
    assert_eq!(report.name_field_coverage_pct, 100.0);
    let weight = report.top_keys.iter().find(|k| k.key == "Weight").unwrap();
    assert_eq!(weight.count, 3);
    assert_eq!(report.type_histogram["Name"].string, 3);
}

#[tokio::test]
async fn test_partial_chunk_failure_is_tolerated() {
    let (_tmp, root) = setup_export_tree();

    // Declare a third chunk that does not exist on disk.
    let index_path = root.join("index.json");
    let mut index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&index_path).unwrap()).unwrap();
    index["datasets"]["items_cdo"]["chunks"]
        .as_array_mut()
        .unwrap()
        .push(json!({"file": "datasets/items_cdo/items_cdo_002.json"}));
    fs::write(&index_path, serde_json::to_string(&index).unwrap()).unwrap();

    let codex = bootstrap(&root).await;
    let items = codex.load_dataset("items_cdo").await.unwrap();

    assert_eq!(items.records.len(), 3);
    assert_eq!(items.load_errors.len(), 1);
    assert!(items.load_errors[0].contains("items_cdo_002.json"));

    // The partial dataset stays fully queryable.
    assert_eq!(codex.search("items_cdo", "rope").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_presenters_degrades_to_adapters() {
    let (_tmp, root) = setup_export_tree();
    fs::remove_file(root.join("presenters.json")).unwrap();

    let codex = bootstrap(&root).await;
    // The weapons adapter still resolves titles.
    let hits = codex.search("weapons_assets", "sword").await.unwrap();
    assert_eq!(hits[0].label, "Iron Sword");
}

#[tokio::test]
async fn test_malformed_index_fails_bootstrap() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("clean_data");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("index.json"), r#"{"no_datasets_here": true}"#).unwrap();

    let source = Arc::new(FsChunkSource::new(root));
    let err = Codex::bootstrap(source, "index.json", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CodexError::Config(_)));
}

#[test]
fn test_cli_datasets_and_search() {
    let (tmp, root) = setup_export_tree();
    let config_path = write_config(tmp.path(), &root);

    let output = Command::new(cdx_binary())
        .args(["--config", config_path.to_str().unwrap(), "datasets"])
        .output()
        .expect("failed to run cdx");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("items_cdo"));
    assert!(stdout.contains("weapons_assets"));
    assert!(stdout.contains("3 datasets"));

    let output = Command::new(cdx_binary())
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "search",
            "weapons_assets",
            "iron shield",
        ])
        .output()
        .expect("failed to run cdx");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Iron Shield"));
    assert!(stdout.contains("1 matches"));
}

#[test]
fn test_cli_unknown_dataset_fails() {
    let (tmp, root) = setup_export_tree();
    let config_path = write_config(tmp.path(), &root);

    let output = Command::new(cdx_binary())
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "inspect",
            "no_such_dataset",
        ])
        .output()
        .expect("failed to run cdx");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dataset not found"));
}
