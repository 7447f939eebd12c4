//! End-to-end tests for the resolve -> install -> merge pipeline
//!
//! Every test runs a [`Project`](plugmerge_core::Project) against an
//! in-memory registry and inspects the resulting filesystem state.

mod registry;

use plugmerge_core::{Error, FailurePolicy, ResolvedPlugin};
use plugmerge_test_utils::archive::plugin_archive;
use plugmerge_test_utils::project::TestProject;
use pretty_assertions::assert_eq;
use registry::{MemoryRegistry, project};

fn installed_set(test: &TestProject) -> Vec<ResolvedPlugin> {
    serde_json::from_str(&test.read(".plugins/installed.json")).unwrap()
}

/// `v1/p1` (prio 1) requires `v2/p2` (prio 5); both ship `pages/index.vue`.
fn publish_pair(registry: &MemoryRegistry) {
    registry.publish(
        "v1",
        "p1",
        "1.0.0",
        plugin_archive(
            "p1-main",
            Some(r#"{"prio": 1, "requirements": ["github.com/v2/plugin-p2"]}"#),
            &[
                ("pages/index.vue", "p1"),
                ("components/P1.vue", "p1"),
                ("schema.json", r#"[{"type": "p1"}]"#),
            ],
        ),
    );
    registry.publish(
        "v2",
        "p2",
        "latest",
        plugin_archive(
            "p2-main",
            Some(r#"{"prio": 5, "version": "2.3.0", "revision": "rev-p2"}"#),
            &[("pages/index.vue", "p2"), ("schema.json", r#"[{"type": "p2"}]"#)],
        ),
    );
}

fn declare_p1(test: &TestProject) {
    test.write_layer("baseline/plugins.json", &[("v1", "p1", "1.0.0")]);
    test.write_layer("custom/plugins.json", &[]);
}

#[test]
fn test_deep_sync_installs_transitive_requirements() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    publish_pair(&registry);
    declare_p1(&test);

    let summary = project(test.root(), &registry)
        .sync(true, FailurePolicy::Isolate, |_| {})
        .unwrap();

    assert!(summary.install.is_success());
    let keys: Vec<String> = summary.resolution.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["v1/p1", "v2/p2"]);

    let saved = installed_set(&test);
    assert_eq!(saved[1].source, "v1/p1");
    assert_eq!(saved[1].version, "2.3.0");
    assert_eq!(saved[1].prio, 5);
    assert_eq!(saved[1].revision.as_deref(), Some("rev-p2"));
    assert!(saved[0].revision.as_deref().unwrap().starts_with("sha256:"));

    // p2 has the higher priority and owns the shared page
    assert_eq!(test.read("storefront/app/pages/index.vue"), "p2");
    assert_eq!(test.read("storefront/app/components/P1.vue"), "p1");

    let schema: serde_json::Value = serde_json::from_str(&test.read(".data/schema.json")).unwrap();
    assert_eq!(schema, serde_json::json!([{"type": "p1"}, {"type": "p2"}]));
}

#[test]
fn test_shallow_resolve_expands_requirements_once_installed() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    publish_pair(&registry);
    declare_p1(&test);
    let project = project(test.root(), &registry);

    let first = project.resolve(false).unwrap();
    assert_eq!(first.plugins.len(), 1);
    project.install(FailurePolicy::Isolate, |_| {}).unwrap();
    assert_eq!(registry.requests().len(), 1);

    let second = project.resolve(false).unwrap();
    assert_eq!(second.plugins.len(), 2);
    let report = project.install(FailurePolicy::Isolate, |_| {}).unwrap();
    assert_eq!(report.installed.len(), 2);
    test.assert_file_exists(".plugins/repos/v2/p2/plugin.json");
    test.assert_file_exists(".plugins/cache/v2-p2-latest.zip");
}

#[test]
fn test_custom_overrides_apply_after_plugins() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    publish_pair(&registry);
    declare_p1(&test);
    test.write_file("custom/pages/index.vue", "custom");
    test.write_file("custom/pocketstore.json", r#"{"shop": "demo"}"#);

    project(test.root(), &registry)
        .sync(true, FailurePolicy::Isolate, |_| {})
        .unwrap();

    assert_eq!(test.read("storefront/app/pages/index.vue"), "custom");
    assert_eq!(test.read("storefront/app/pocketstore.json"), r#"{"shop": "demo"}"#);
}

#[test]
fn test_isolate_policy_merges_what_installed() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    publish_pair(&registry);
    test.write_layer(
        "baseline/plugins.json",
        &[("v1", "p1", "1.0.0"), ("v9", "missing", "1.0.0")],
    );
    test.write_layer("custom/plugins.json", &[]);

    let summary = project(test.root(), &registry)
        .sync(false, FailurePolicy::Isolate, |_| {})
        .unwrap();

    assert_eq!(summary.install.failure_messages().len(), 1);
    assert!(summary.install.failure_messages()[0].starts_with("v9/missing: "));
    assert_eq!(test.read("storefront/app/pages/index.vue"), "p1");
    test.assert_file_not_exists(".plugins/repos/v9/missing");
    test.assert_file_not_exists(".plugins/cache/v9-missing-1.0.0.zip");
}

#[test]
fn test_abort_policy_persists_partial_progress() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    publish_pair(&registry);
    test.write_layer(
        "baseline/plugins.json",
        &[("v1", "p1", "1.0.0"), ("v9", "missing", "1.0.0"), ("v2", "p2", "latest")],
    );
    test.write_layer("custom/plugins.json", &[]);

    let err = project(test.root(), &registry)
        .sync(false, FailurePolicy::Abort, |_| {})
        .unwrap_err();

    assert!(matches!(err, Error::FetchFailed { ref failures } if failures.len() == 1));
    let saved = installed_set(&test);
    assert!(saved[0].revision.is_some());
    assert!(saved[1].revision.is_none());
    assert!(saved[2].revision.is_none());
    assert_eq!(registry.downloads("v2", "p2", "latest"), 0);
    test.assert_file_not_exists("storefront");
}

#[test]
fn test_version_aliases_download_latest() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    registry.publish("acme", "a", "latest", plugin_archive("a", Some("{}"), &[]));
    registry.publish("acme", "b", "latest", plugin_archive("b", Some("{}"), &[]));
    test.write_layer(
        "baseline/plugins.json",
        &[("acme", "a", "V-LATEST"), ("acme", "b", "0.0.1.3")],
    );
    test.write_layer("custom/plugins.json", &[]);
    let project = project(test.root(), &registry);

    project.resolve(false).unwrap();
    let report = project.install(FailurePolicy::Isolate, |_| {}).unwrap();

    assert!(report.is_success());
    assert_eq!(registry.downloads("acme", "a", "latest"), 1);
    assert_eq!(registry.downloads("acme", "b", "latest"), 1);
    let versions: Vec<String> = installed_set(&test).into_iter().map(|p| p.version).collect();
    assert_eq!(versions, vec!["latest", "latest"]);
}

#[test]
fn test_shipped_git_head_becomes_revision() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    let sha = "89abcdef0123456789abcdef0123456789abcdef";
    registry.publish(
        "acme",
        "tracked",
        "1.0.0",
        plugin_archive(
            "tracked-main",
            Some(r#"{"prio": 2}"#),
            &[
                (".git/HEAD", "ref: refs/heads/main\n"),
                (".git/refs/heads/main", &format!("{sha}\n")),
            ],
        ),
    );
    test.write_layer("baseline/plugins.json", &[("acme", "tracked", "1.0.0")]);
    test.write_layer("custom/plugins.json", &[]);
    let project = project(test.root(), &registry);

    project.resolve(false).unwrap();
    project.install(FailurePolicy::Isolate, |_| {}).unwrap();

    assert_eq!(installed_set(&test)[0].revision.as_deref(), Some(sha));
}

#[test]
fn test_reinstall_yields_same_content_revision() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    registry.publish(
        "acme",
        "plain",
        "1.0.0",
        plugin_archive("plain", Some("{}"), &[("utils/a.ts", "export const a = 1")]),
    );
    test.write_layer("baseline/plugins.json", &[("acme", "plain", "1.0.0")]);
    test.write_layer("custom/plugins.json", &[]);
    let project = project(test.root(), &registry);

    project.resolve(false).unwrap();
    project.install(FailurePolicy::Isolate, |_| {}).unwrap();
    let first = installed_set(&test)[0].revision.clone();
    project.install(FailurePolicy::Isolate, |_| {}).unwrap();
    let second = installed_set(&test)[0].revision.clone();

    assert!(first.is_some());
    assert_eq!(first, second);
    assert!(project.status().unwrap().iter().all(|s| s.installed && !s.is_drifted()));
}

#[test]
fn test_failed_reinstall_keeps_working_plugin_in_merge() {
    let test = TestProject::new();
    let registry = MemoryRegistry::default();
    test.write_layer("baseline/plugins.json", &[("acme", "kept", "1.0.0")]);
    test.write_layer("custom/plugins.json", &[]);
    test.install_plugin("acme", "kept", r#"{"prio": 1}"#, &[("pages/kept.vue", "kept")]);

    let summary = project(test.root(), &registry)
        .sync(false, FailurePolicy::Isolate, |_| {})
        .unwrap();

    assert_eq!(summary.install.failures.len(), 1);
    assert_eq!(summary.merge.plugins.clean(), 1);
    assert_eq!(test.read("storefront/app/pages/kept.vue"), "kept");
    test.assert_file_exists(".plugins/repos/acme/kept/plugin.json");
}
