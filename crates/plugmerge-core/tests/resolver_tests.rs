use std::collections::{HashMap, HashSet};

use plugmerge_core::{MetadataSource, PluginKey, PluginMetadata, PluginRef, ResolvedPlugin, Result, resolve};
use proptest::prelude::*;

/// Random requirement graph over a small key space.
struct Graph(HashMap<PluginKey, Vec<String>>);

impl MetadataSource for Graph {
    fn metadata(&mut self, plugin: &ResolvedPlugin) -> Result<Option<PluginMetadata>> {
        Ok(self.0.get(&plugin.key()).map(|requirements| PluginMetadata {
            requirements: requirements.clone(),
            ..Default::default()
        }))
    }
}

fn key(i: usize) -> PluginKey {
    PluginKey::new(format!("v{}", i % 3), format!("p{i}"))
}

fn requirement(i: usize) -> String {
    format!("github.com/v{}/plugin-p{i}", i % 3)
}

proptest! {
    /// Any layered declarations plus any requirement graph, cycles
    /// included, resolve to each reachable key exactly once.
    #[test]
    fn test_each_key_resolved_once(
        layers in proptest::collection::vec(proptest::collection::vec(0usize..8, 0..5), 1..4),
        edges in proptest::collection::vec((0usize..8, 0usize..8), 0..20),
    ) {
        let mut graph = HashMap::new();
        for (from, to) in &edges {
            graph.entry(key(*from)).or_insert_with(Vec::new).push(requirement(*to));
        }

        let declared: Vec<(String, Vec<PluginRef>)> = layers
            .iter()
            .enumerate()
            .map(|(n, ids)| {
                let refs = ids
                    .iter()
                    .map(|i| {
                        let k = key(*i);
                        PluginRef::new(k.vendor, k.name, format!("{n}.0.0"))
                    })
                    .collect();
                (format!("layer{n}"), refs)
            })
            .collect();

        let resolution = resolve(&declared, &mut Graph(graph)).unwrap();

        let keys: Vec<PluginKey> = resolution.keys().collect();
        let unique: HashSet<&PluginKey> = keys.iter().collect();
        prop_assert_eq!(keys.len(), unique.len());

        // Every declared key is present, with the version of its first layer
        for (n, ids) in layers.iter().enumerate() {
            for i in ids {
                let plugin = resolution.get(&key(*i)).unwrap();
                let first = layers.iter().position(|l| l.contains(i)).unwrap();
                prop_assert!(first <= n);
                prop_assert_eq!(&plugin.version, &format!("{first}.0.0"));
            }
        }

        // Every requirement of a resolved plugin is resolved too
        for plugin in &resolution.plugins {
            for required in resolution.dependencies_of(&plugin.key()) {
                prop_assert!(unique.contains(required));
            }
        }
    }
}

#[test]
fn test_transitive_only_plugin_is_latest() {
    let mut graph = Graph(HashMap::from([(key(0), vec![requirement(1)])]));
    let layers = vec![("custom".to_string(), vec![PluginRef::new("v0", "p0", "3.1.0")])];

    let resolution = resolve(&layers, &mut graph).unwrap();

    let transitive = resolution.get(&key(1)).unwrap();
    assert_eq!(transitive.version, "latest");
    assert_eq!(transitive.source, "v0/p0");
}
