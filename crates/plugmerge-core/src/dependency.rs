//! Breadth-first resolution of layered declarations and transitive
//! requirements into one deduplicated install set.
//!
//! Layers are seeded in precedence order. The first declaration of a key
//! wins; later duplicates, from any layer or from a requirement, are
//! ignored. Each dequeued plugin's descriptor is asked for through a
//! [`MetadataSource`]; when it is not available the plugin's requirements
//! are not expanded in this pass.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Write as _;

use crate::error::Result;
use crate::manifest::{MetadataSource, PluginKey, PluginRef, ResolvedPlugin};
use crate::requirement::parse_requirement;

/// Output of a resolver run.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Install set in discovery order.
    pub plugins: Vec<ResolvedPlugin>,
    /// `requiring -> required` edges, in requirement order.
    pub edges: HashMap<PluginKey, Vec<PluginKey>>,
    /// Keys declared by each layer, in layer order.
    pub roots: Vec<(String, Vec<PluginKey>)>,
    /// Non-fatal problems met during traversal.
    pub warnings: Vec<String>,
}

impl Resolution {
    pub fn keys(&self) -> impl Iterator<Item = PluginKey> + '_ {
        self.plugins.iter().map(ResolvedPlugin::key)
    }

    pub fn get(&self, key: &PluginKey) -> Option<&ResolvedPlugin> {
        self.plugins.iter().find(|p| &p.key() == key)
    }

    /// Direct requirements of `key`.
    pub fn dependencies_of(&self, key: &PluginKey) -> &[PluginKey] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Render the dependency tree, one section per non-empty layer.
    ///
    /// ```text
    /// FROM custom:
    ///   v1/p1
    ///       └── v2/p2 (required by: v1/p1)
    /// ```
    pub fn render_tree(&self) -> String {
        let layer_names: HashSet<&str> = self.roots.iter().map(|(name, _)| name.as_str()).collect();
        let sources: HashMap<PluginKey, &str> = self
            .plugins
            .iter()
            .map(|p| (p.key(), p.source.as_str()))
            .collect();

        let mut printer = TreePrinter {
            edges: &self.edges,
            sources,
            layer_names,
            expanded: HashSet::new(),
            out: String::new(),
        };

        for (layer, keys) in &self.roots {
            if keys.is_empty() {
                continue;
            }
            if !printer.out.is_empty() {
                printer.out.push('\n');
            }
            let _ = writeln!(printer.out, "FROM {layer}:");
            for key in keys {
                printer.node(key, "  ", true, true);
            }
        }

        printer.out
    }
}

struct TreePrinter<'a> {
    edges: &'a HashMap<PluginKey, Vec<PluginKey>>,
    sources: HashMap<PluginKey, &'a str>,
    layer_names: HashSet<&'a str>,
    expanded: HashSet<PluginKey>,
    out: String,
}

impl TreePrinter<'_> {
    fn node(&mut self, key: &PluginKey, prefix: &str, is_last: bool, is_root: bool) {
        if is_root {
            let _ = writeln!(self.out, "{prefix}{key}");
        } else {
            let marker = if is_last { "└──" } else { "├──" };
            let label = match self.sources.get(key) {
                Some(source) if !source.is_empty() && !self.layer_names.contains(source) => {
                    format!(" (required by: {source})")
                }
                _ => String::new(),
            };
            let _ = writeln!(self.out, "{prefix}{marker} {key}{label}");
        }

        let edges = self.edges;
        let Some(children) = edges.get(key).filter(|c| !c.is_empty()) else {
            return;
        };
        // Cycles and diamonds: expand each node once
        if !self.expanded.insert(key.clone()) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        for (i, child) in children.iter().enumerate() {
            self.node(child, &child_prefix, i + 1 == children.len(), false);
        }
    }
}

/// Traversal state for one resolution.
pub struct Resolver<'a, S: MetadataSource> {
    source: &'a mut S,
    seen: HashSet<PluginKey>,
    queue: VecDeque<ResolvedPlugin>,
    edges: HashMap<PluginKey, Vec<PluginKey>>,
    roots: Vec<(String, Vec<PluginKey>)>,
    warnings: Vec<String>,
}

impl<'a, S: MetadataSource> Resolver<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        Self {
            source,
            seen: HashSet::new(),
            queue: VecDeque::new(),
            edges: HashMap::new(),
            roots: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Enqueue one layer's declarations. Call in precedence order.
    pub fn seed(&mut self, layer: &str, refs: &[PluginRef]) {
        let mut declared = Vec::with_capacity(refs.len());
        for plugin in refs {
            let key = plugin.key();
            declared.push(key.clone());
            if self.seen.insert(key.clone()) {
                self.queue.push_back(ResolvedPlugin::declared(plugin, layer));
            } else {
                tracing::debug!(layer, plugin = %key, "duplicate declaration ignored");
            }
        }
        self.roots.push((layer.to_string(), declared));
    }

    /// Drain the queue, expanding requirements of every plugin whose
    /// descriptor is available.
    pub fn run(mut self) -> Result<Resolution> {
        let mut plugins = Vec::new();

        while let Some(mut plugin) = self.queue.pop_front() {
            let key = plugin.key();

            match self.source.metadata(&plugin) {
                Ok(Some(meta)) => {
                    plugin.prio = meta.priority();
                    for requirement in &meta.requirements {
                        self.expand(&key, requirement);
                    }
                }
                Ok(None) => {
                    tracing::debug!(plugin = %key, "descriptor not available, requirements not expanded");
                }
                Err(e) => {
                    tracing::warn!(plugin = %key, error = %e, "could not read descriptor");
                    self.warnings.push(format!("{key}: {e}"));
                }
            }

            plugins.push(plugin);
        }

        tracing::info!(count = plugins.len(), "resolved install set");
        Ok(Resolution {
            plugins,
            edges: self.edges,
            roots: self.roots,
            warnings: self.warnings,
        })
    }

    fn expand(&mut self, parent: &PluginKey, requirement: &str) {
        let required = match parse_requirement(requirement) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(plugin = %parent, error = %e, "skipping requirement");
                self.warnings.push(format!("{parent}: {e}"));
                return;
            }
        };

        let children = self.edges.entry(parent.clone()).or_default();
        if !children.contains(&required) {
            children.push(required.clone());
        }

        if self.seen.insert(required.clone()) {
            tracing::info!(plugin = %parent, requires = %required, "new transitive requirement");
            self.queue.push_back(ResolvedPlugin::transitive(&required, parent));
        }
    }
}

/// Resolve `layers` (in precedence order) against `source`.
pub fn resolve<S: MetadataSource>(
    layers: &[(String, Vec<PluginRef>)],
    source: &mut S,
) -> Result<Resolution> {
    let mut resolver = Resolver::new(source);
    for (layer, refs) in layers {
        resolver.seed(layer, refs);
    }
    resolver.run()
}
