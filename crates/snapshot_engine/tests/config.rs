use std::fs;

use pretty_assertions::assert_eq;
use snapshot_engine::{
    load_environment, load_manifest, load_placeholders, ConfigError, ExtractionLayout,
};
use tempfile::TempDir;

const CONFIG: &str = r#"{
  "stg": {
    "project_id": "proj-stg",
    "region": "us-central1",
    "namespace_overrides": { "fluentd": "kube-system" },
    "cluster_patterns": { "edge": ["edge-", "gke"] }
  },
  "prod-eu": { "project_id": "proj-eu" },
  "prod-us": { "project_id": "", "region": "us-east1" },
  "broken": { "project_id": 5, "region": "x" }
}"#;

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, CONFIG).unwrap();
    path
}

#[test]
fn loads_environment_with_overrides_and_builtin_patterns() {
    let temp = TempDir::new().unwrap();
    let env = load_environment(&write_config(&temp), "stg").unwrap();

    assert_eq!(env.project_id, "proj-stg");
    assert_eq!(env.region, "us-central1");
    assert_eq!(env.namespace_override("fluentd"), Some("kube-system"));
    assert_eq!(env.namespace_override("broker"), None);
    assert_eq!(
        env.cluster_patterns("edge"),
        Some(&["edge-".to_string(), "gke".to_string()][..])
    );
    assert_eq!(
        env.cluster_patterns("rai"),
        Some(&["-sa-".to_string(), "gke".to_string()][..])
    );
    assert!(env.cluster_patterns("unknown").is_none());
}

#[test]
fn missing_environment_and_fields_are_config_errors() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp);

    assert!(matches!(
        load_environment(&path, "dev"),
        Err(ConfigError::UnknownEnvironment(env)) if env == "dev"
    ));
    assert!(matches!(
        load_environment(&path, "prod-eu"),
        Err(ConfigError::MissingField { field: "region", .. })
    ));
    assert!(matches!(
        load_environment(&path, "prod-us"),
        Err(ConfigError::MissingField { field: "project_id", .. })
    ));
    assert!(matches!(
        load_environment(&path, "broken"),
        Err(ConfigError::Parse { .. })
    ));
    assert!(matches!(
        load_environment(&temp.path().join("nope.json"), "stg"),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn layout_builds_group_paths() {
    let layout = ExtractionLayout::new("/cfg", "/out");
    assert_eq!(layout.config_file(), std::path::PathBuf::from("/cfg/config.json"));
    assert_eq!(
        layout.manifest_file("druid"),
        std::path::PathBuf::from("/cfg/druid-resources.yaml")
    );
    assert_eq!(
        layout.placeholder_file("druid"),
        std::path::PathBuf::from("/cfg/druid-resources-placeholders.yaml")
    );
    assert_eq!(
        layout.output_file("stg", "rai", "druid"),
        std::path::PathBuf::from("/out/stg/rai-druid-resources.yaml")
    );
}

#[test]
fn manifest_missing_or_empty_is_fatal() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("kafka-resources.yaml");
    assert!(matches!(load_manifest(&path), Err(ConfigError::ManifestMissing(_))));

    fs::write(&path, "").unwrap();
    assert!(matches!(load_manifest(&path), Err(ConfigError::ManifestInvalid { .. })));

    fs::write(&path, "Namespaces: [unterminated").unwrap();
    assert!(matches!(load_manifest(&path), Err(ConfigError::ManifestInvalid { .. })));
}

#[test]
fn manifest_yaml_keeps_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("kafka-resources.yaml");
    fs::write(
        &path,
        "Namespaces:\n  - kafka\nStatefulSets:\n  - broker\n  - zookeeper\nServices: broker\nConfigMaps:\n  - broker-config\n",
    )
    .unwrap();

    let manifest = load_manifest(&path).unwrap();
    let kinds: Vec<&str> = manifest.entries().iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["Namespaces", "StatefulSets", "ConfigMaps"]);
    assert_eq!(manifest.skipped_kinds(), &["Services".to_string()]);
}

#[test]
fn placeholder_file_degrades_to_empty() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("druid-resources-placeholders.yaml");
    assert!(load_placeholders(&path).is_empty());

    fs::write(&path, "ConfigMaps: [unterminated").unwrap();
    assert!(load_placeholders(&path).is_empty());

    fs::write(
        &path,
        "ConfigMaps:\n  - druid-config:\n      - data|LOG_DIR: DRUID_LOG_DIR\nSearch_and_Replace:\n  - 10.0.0.1: CLUSTER_IP\n  - 8080: PORT\n  - true: FLAG\n  - '8081': QUOTED_PORT\n",
    )
    .unwrap();
    let rules = load_placeholders(&path);
    assert_eq!(rules.rules_for("ConfigMaps", "druid-config").unwrap().len(), 1);
    let searches: Vec<&str> = rules
        .search_and_replace()
        .iter()
        .map(|r| r.search.as_str())
        .collect();
    // Only needles written as YAML strings count; bare numbers and booleans
    // would match inside unrelated values.
    assert_eq!(searches, vec!["10.0.0.1", "8081"]);
}
