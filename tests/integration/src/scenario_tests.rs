//! Behavioural scenarios run through the public `Project` API.

mod registry;

use plugmerge_core::{Error, FailurePolicy, PluginStatus, ResolvedPlugin};
use plugmerge_fs::checksum::compute_dir_checksum;
use plugmerge_test_utils::archive::plugin_archive;
use plugmerge_test_utils::project::TestProject;
use pretty_assertions::assert_eq;
use registry::{MemoryRegistry, project};

fn summary(plugins: &[ResolvedPlugin]) -> Vec<(String, String, String)> {
    plugins
        .iter()
        .map(|p| (p.key().to_string(), p.source.clone(), p.version.clone()))
        .collect()
}

fn triple(key: &str, source: &str, version: &str) -> (String, String, String) {
    (key.to_string(), source.to_string(), version.to_string())
}

#[test]
fn test_installed_requirement_is_discovered_in_order() {
    let test = TestProject::new();
    test.write_layer("baseline/plugins.json", &[("v1", "p1", "1.0.0")]);
    test.write_layer("custom/plugins.json", &[]);
    test.install_plugin("v1", "p1", r#"{"requirements": ["host/v2/plugin-p2"]}"#, &[]);

    let resolution = project(test.root(), &MemoryRegistry::default())
        .resolve(false)
        .unwrap();

    assert_eq!(
        summary(&resolution.plugins),
        vec![
            triple("v1/p1", "baseline", "1.0.0"),
            triple("v2/p2", "v1/p1", "latest"),
        ]
    );
}

#[test]
fn test_duplicate_keys_across_layers_and_requirements() {
    let test = TestProject::new();
    test.write_layer("baseline/plugins.json", &[("acme", "shared", "1.0.0"), ("acme", "a", "1.0.0")]);
    test.write_layer("custom/plugins.json", &[("acme", "shared", "2.0.0")]);
    test.write_layer("storefront/plugins.json", &[("acme", "shared", "3.0.0")]);
    test.install_plugin("acme", "a", r#"{"requirements": ["h/acme/plugin-shared"]}"#, &[]);

    let resolution = project(test.root(), &MemoryRegistry::default())
        .resolve(false)
        .unwrap();

    assert_eq!(
        summary(&resolution.plugins),
        vec![
            triple("acme/shared", "baseline", "1.0.0"),
            triple("acme/a", "baseline", "1.0.0"),
        ]
    );
}

#[test]
fn test_mutual_requirements_terminate() {
    let test = TestProject::new();
    test.write_layer("baseline/plugins.json", &[("acme", "a", "1.0.0")]);
    test.write_layer("custom/plugins.json", &[]);
    test.install_plugin("acme", "a", r#"{"requirements": ["h/acme/plugin-b"]}"#, &[]);
    test.install_plugin("acme", "b", r#"{"requirements": ["h/acme/plugin-a"]}"#, &[]);

    let resolution = project(test.root(), &MemoryRegistry::default())
        .resolve(false)
        .unwrap();

    assert_eq!(
        summary(&resolution.plugins),
        vec![triple("acme/a", "baseline", "1.0.0"), triple("acme/b", "acme/a", "latest")]
    );
}

#[test]
fn test_bad_requirement_is_a_warning() {
    let test = TestProject::new();
    test.write_layer("baseline/plugins.json", &[("acme", "a", "1.0.0")]);
    test.write_layer("custom/plugins.json", &[]);
    test.install_plugin("acme", "a", r#"{"requirements": ["not-a-reference"]}"#, &[]);

    let resolution = project(test.root(), &MemoryRegistry::default())
        .resolve(false)
        .unwrap();

    assert_eq!(resolution.plugins.len(), 1);
    assert_eq!(resolution.warnings.len(), 1);
}

#[test]
fn test_content_revision_tracks_file_changes() {
    let test = TestProject::new();
    let dir = test.install_plugin("acme", "a", "{}", &[("pages/a.vue", "a"), ("utils/b.ts", "b")]);

    let original = compute_dir_checksum(&dir).unwrap();
    assert_eq!(compute_dir_checksum(&dir).unwrap(), original);

    test.write_file(".plugins/repos/acme/a/pages/a.vue", "A");
    let edited = compute_dir_checksum(&dir).unwrap();
    assert_ne!(edited, original);

    test.write_file(".plugins/repos/acme/a/utils/c.ts", "c");
    assert_ne!(compute_dir_checksum(&dir).unwrap(), edited);
}

#[test]
fn test_priority_beats_installed_set_order() {
    let test = TestProject::new();
    // Discovery order puts the high priority plugin first
    test.install_plugin("aaa", "high", r#"{"prio": 5}"#, &[("layouts/default.vue", "high")]);
    test.install_plugin("zzz", "low", r#"{"prio": 1}"#, &[("layouts/default.vue", "low")]);

    let merged = project(test.root(), &MemoryRegistry::default()).merge().unwrap();

    assert_eq!(merged.plugins.clean(), 2);
    assert_eq!(test.read("storefront/app/layouts/default.vue"), "high");
}

#[test]
fn test_flat_and_vendored_layouts_merge_together() {
    let test = TestProject::new();
    test.install_flat_plugin("legacy", r#"{"prio": 2}"#, &[("utils/legacy.ts", "legacy")]);
    test.install_plugin("acme", "modern", "{}", &[("public/logo.svg", "<svg/>")]);

    let merged = project(test.root(), &MemoryRegistry::default()).merge().unwrap();

    assert_eq!(merged.plugins.discovered(), 2);
    assert_eq!(test.read("storefront/app/utils/legacy.ts"), "legacy");
    assert_eq!(test.read("storefront/public/logo.svg"), "<svg/>");
}

#[test]
fn test_merge_with_nothing_installed() {
    let test = TestProject::new();
    let merged = project(test.root(), &MemoryRegistry::default()).merge().unwrap();

    assert_eq!(merged.plugins.discovered(), 0);
    test.assert_file_not_exists(".data/schema.json");
}

#[test]
fn test_malformed_layer_stops_before_any_request() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    test.write_file("baseline/plugins.json", r#"[{"vendor": "acme"}]"#);
    test.write_layer("custom/plugins.json", &[]);

    let err = project(test.root(), &registry)
        .sync(true, FailurePolicy::Isolate, |_| {})
        .unwrap_err();

    assert!(matches!(err, Error::ManifestParse { .. }));
    assert!(registry.requests().is_empty());
    test.assert_file_not_exists(".plugins/installed.json");
}

#[test]
fn test_status_after_sync() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    registry.publish(
        "acme",
        "a",
        "1.0.0",
        plugin_archive("a", Some(r#"{"revision": "r1"}"#), &[("pages/a.vue", "a")]),
    );
    test.write_layer("baseline/plugins.json", &[("acme", "a", "1.0.0")]);
    test.write_layer("custom/plugins.json", &[]);
    let project = project(test.root(), &registry);

    project.sync(false, FailurePolicy::Isolate, |_| {}).unwrap();
    let status: Vec<PluginStatus> = project.status().unwrap();

    assert_eq!(status.len(), 1);
    assert_eq!(status[0].plugin.revision.as_deref(), Some("r1"));
    assert_eq!(status[0].current_revision.as_deref(), Some("r1"));
    assert!(!status[0].is_drifted());
}
