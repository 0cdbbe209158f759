//! Turning specifiers into depends-on edges.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;

use crate::error::{AnalysisError, Result};
use crate::graph::BuildGraph;
use crate::node::NodeId;

/// Module id to node lookup over every entry point of a graph.
#[derive(Debug, Clone, Default)]
pub struct EntryPointIndex {
    by_module_id: FxHashMap<String, NodeId>,
}

impl EntryPointIndex {
    /// Done entry points are indexed too: a built sibling is still a dependency.
    pub fn new(graph: &BuildGraph) -> Self {
        let by_module_id = graph
            .iter()
            .filter_map(|(id, node)| node.module_id().map(|module_id| (module_id.to_string(), id)))
            .collect();
        Self { by_module_id }
    }

    pub fn get(&self, module_id: &str) -> Option<NodeId> {
        self.by_module_id.get(module_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_module_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_module_id.is_empty()
    }
}

/// Add an edge from `current` to every entry point named in `specifiers`.
///
/// Specifiers that name no entry point are external packages and are
/// ignored. A specifier naming `current` itself fails the whole call before
/// any edge is added. Returns the number of new edges.
pub fn link_dependencies(
    graph: &mut BuildGraph,
    index: &EntryPointIndex,
    current: NodeId,
    specifiers: &IndexSet<String>,
) -> Result<usize> {
    let Some(module_id) = graph.get(current).and_then(|node| node.module_id()) else {
        return Ok(0);
    };
    let module_id = module_id.to_string();

    if specifiers.contains(&module_id) {
        return Err(AnalysisError::CircularDependency { module_id });
    }

    let targets: Vec<(&str, NodeId)> = specifiers
        .iter()
        .filter_map(|specifier| index.get(specifier).map(|id| (specifier.as_str(), id)))
        .collect();

    let Some(node) = graph.get_mut(current) else {
        return Ok(0);
    };

    let mut added = 0;
    for (specifier, target) in targets {
        tracing::debug!("Found entry point dependency: {} -> {}", module_id, specifier);
        if node.depends_on(target) {
            added += 1;
        }
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{EntryPoint, Node};
    use pkgr_config::{CompilerOptions, TsConfig};

    fn graph() -> (BuildGraph, NodeId, NodeId, NodeId) {
        let mut graph = BuildGraph::new();
        let mut add = |id: &str| {
            graph.put(Node::entry_point(
                EntryPoint::new(id),
                TsConfig::new(Vec::new(), CompilerOptions::default()),
            ))
        };
        let (a, b, c) = (add("A"), add("B"), add("C"));
        graph.put(Node::other("file:///styles.css"));
        (graph, a, b, c)
    }

    fn set(items: &[&str]) -> IndexSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn index_covers_entry_points_only() {
        let (graph, a, _, c) = graph();
        let index = EntryPointIndex::new(&graph);
        assert_eq!(index.len(), 3);
        assert_eq!(index.get("A"), Some(a));
        assert_eq!(index.get("C"), Some(c));
        assert_eq!(index.get("file:///styles.css"), None);
    }

    #[test]
    fn links_known_entry_points_and_ignores_the_rest() {
        let (mut graph, a, b, c) = graph();
        let index = EntryPointIndex::new(&graph);

        let added = link_dependencies(&mut graph, &index, a, &set(&["rxjs", "C", "B"])).unwrap();
        assert_eq!(added, 2);
        assert_eq!(graph.get(a).unwrap().dependencies().collect::<Vec<_>>(), vec![c, b]);

        let added = link_dependencies(&mut graph, &index, a, &set(&["B"])).unwrap();
        assert_eq!(added, 0);
        assert_eq!(graph.get(a).unwrap().dependencies().len(), 2);
    }

    #[test]
    fn self_reference_fails_without_adding_edges() {
        let (mut graph, a, _, _) = graph();
        let index = EntryPointIndex::new(&graph);

        let err = link_dependencies(&mut graph, &index, a, &set(&["B", "A"])).unwrap_err();
        assert!(matches!(err, AnalysisError::CircularDependency { ref module_id } if module_id == "A"));
        assert_eq!(graph.get(a).unwrap().dependencies().len(), 0);
    }
}
