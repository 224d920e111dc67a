use pretty_assertions::assert_eq;
use serde_json::json;
use snapshot_core::{ManifestEntry, ManifestShapeError, ResourceManifest, RunPhase, RunState};

#[test]
fn manifest_keeps_declared_order_and_skips_bad_entries() {
    let manifest = ResourceManifest::from_record(&json!({
        "Namespaces": ["ns-1"],
        "Deployments": [" broker ", "", 7, "coordinator"],
        "Broken": "not-a-list",
        "ConfigMaps": ["cfg-a"]
    }))
    .unwrap();

    assert_eq!(
        manifest.entries(),
        &[
            ManifestEntry { kind: "Namespaces".into(), names: vec!["ns-1".into()] },
            ManifestEntry {
                kind: "Deployments".into(),
                names: vec!["broker".into(), "coordinator".into()],
            },
            ManifestEntry { kind: "ConfigMaps".into(), names: vec!["cfg-a".into()] },
        ]
    );
    assert_eq!(manifest.skipped_kinds(), &["Broken".to_string()]);
    assert_eq!(manifest.resource_count(), 4);
    assert_eq!(
        manifest.pairs().collect::<Vec<_>>(),
        vec![
            ("Namespaces", "ns-1"),
            ("Deployments", "broker"),
            ("Deployments", "coordinator"),
            ("ConfigMaps", "cfg-a"),
        ]
    );
}

#[test]
fn manifest_rejects_empty_and_non_mapping() {
    assert_eq!(ResourceManifest::from_record(&json!(null)), Err(ManifestShapeError::Empty));
    assert_eq!(ResourceManifest::from_record(&json!({})), Err(ManifestShapeError::Empty));
    assert_eq!(
        ResourceManifest::from_record(&json!(["a"])),
        Err(ManifestShapeError::NotAMapping)
    );
}

#[test]
fn phases_only_advance_one_step() {
    let mut state = RunState::new();
    assert_eq!(state.phase(), RunPhase::Init);
    assert!(!state.advance(RunPhase::ContextResolved));
    assert!(state.advance(RunPhase::ConfigLoaded));
    assert!(state.advance(RunPhase::ContextResolved));
    assert!(state.advance(RunPhase::PerResourceLoop));
    assert!(!state.advance(RunPhase::PerResourceLoop));
    assert!(state.advance(RunPhase::Finalized));
    assert_eq!(RunPhase::Finalized.next(), None);
}

#[test]
fn first_namespace_is_captured_and_kept() {
    let mut state = RunState::new();
    assert_eq!(state.begin_resource("ConfigMaps", "early"), 1);
    assert_eq!(state.namespace(), None);

    state.begin_resource("Namespaces", "ns-1");
    state.begin_resource("Namespaces", "ns-2");
    assert_eq!(state.namespace(), Some("ns-1"));

    state.record_written();
    state.record_missing("ConfigMaps", "early");
    assert_eq!(state.attempted(), 3);
    assert_eq!(state.written(), 1);
    assert_eq!(state.missing(), &[("ConfigMaps".to_string(), "early".to_string())]);
}
