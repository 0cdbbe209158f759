//! The build graph and its scheduler view.
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]; edges are stored on
//! the dependent node. Ordering queries hand the edge set to `petgraph` only
//! for strongly connected components, everything else walks the vector.

use std::collections::BTreeSet;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::error::{AnalysisError, Result};
use crate::node::{Node, NodeId};

/// Ordered collection of build nodes with unique URLs.
#[derive(Debug, Default)]
pub struct BuildGraph {
    nodes: Vec<Node>,
    by_url: FxHashMap<String, NodeId>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or replace the node already registered under its URL.
    ///
    /// A replaced node keeps its id so existing edges stay valid.
    pub fn put(&mut self, node: Node) -> NodeId {
        if let Some(&id) = self.by_url.get(&node.url) {
            self.nodes[id.0] = node;
            return id;
        }

        let id = NodeId(self.nodes.len());
        self.by_url.insert(node.url.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn find(&self, url: &str) -> Option<NodeId> {
        self.by_url.get(url).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Entry point node ids in insertion order.
    pub fn entry_points(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|(_, node)| node.is_entry_point())
            .map(|(id, _)| id)
    }

    /// Nodes that depend on `id`, in insertion order.
    pub fn dependents(&self, id: NodeId) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.has_dependency(id))
            .map(|(dependent, _)| dependent)
            .collect()
    }

    /// Node ids with every node placed after all of its dependencies.
    ///
    /// Among nodes that are ready at the same time, the earlier inserted one
    /// comes first. Edges to ids from another graph are ignored. Fails with
    /// [`AnalysisError::DependencyCycle`] when the graph is not acyclic.
    pub fn build_order(&self) -> Result<Vec<NodeId>> {
        let len = self.nodes.len();
        // Edges to ids outside this graph never become ready, so they are not counted.
        let mut pending: Vec<usize> = self
            .nodes
            .iter()
            .map(|n| n.dependencies().filter(|target| target.0 < len).count())
            .collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (id, node) in self.iter() {
            for target in node.dependencies() {
                if let Some(list) = dependents.get_mut(target.0) {
                    list.push(id.0);
                }
            }
        }

        let mut ready: BTreeSet<usize> = pending
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(i, _)| i)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(next) = ready.pop_first() {
            order.push(NodeId(next));
            for &dependent in &dependents[next] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() == self.nodes.len() {
            return Ok(order);
        }

        self.check_acyclic()?;
        // A stalled sort implies a cycle among the remaining nodes.
        let remaining = (0..len)
            .filter(|i| !order.contains(&NodeId(*i)))
            .map(|i| self.nodes[i].label().to_string())
            .collect();
        Err(AnalysisError::DependencyCycle { cycle: remaining })
    }

    /// Fail with [`AnalysisError::DependencyCycle`] naming one cycle, if any.
    pub fn check_acyclic(&self) -> Result<()> {
        match self.find_cycles().first() {
            Some(component) => Err(AnalysisError::DependencyCycle {
                cycle: self.cycle_path(component),
            }),
            None => Ok(()),
        }
    }

    /// Groups of nodes that depend on each other, each sorted by id.
    ///
    /// Components of a single node are reported only when the node depends on
    /// itself.
    pub fn find_cycles(&self) -> Vec<Vec<NodeId>> {
        let mut graph: DiGraph<NodeId, ()> = DiGraph::with_capacity(self.nodes.len(), 0);
        let indices: Vec<NodeIndex> = self.iter().map(|(id, _)| graph.add_node(id)).collect();
        for (id, node) in self.iter() {
            for target in node.dependencies() {
                if let Some(&to) = indices.get(target.0) {
                    graph.add_edge(indices[id.0], to, ());
                }
            }
        }

        let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(&graph)
            .into_iter()
            .map(|component| {
                let mut ids: Vec<NodeId> = component.into_iter().map(|ix| graph[ix]).collect();
                ids.sort();
                ids
            })
            .filter(|ids| match ids.as_slice() {
                [single] => self.nodes[single.0].has_dependency(*single),
                _ => true,
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Labels along one cycle through `component`, first label repeated at the end.
    fn cycle_path(&self, component: &[NodeId]) -> Vec<String> {
        let Some(&start) = component.first() else {
            return Vec::new();
        };

        let mut path = vec![start];
        let mut current = start;
        loop {
            let Some(next) = self.nodes[current.0]
                .dependencies()
                .find(|target| component.contains(target))
            else {
                break;
            };
            if let Some(pos) = path.iter().position(|id| *id == next) {
                path.drain(..pos);
                path.push(next);
                break;
            }
            path.push(next);
            current = next;
        }

        path.into_iter()
            .map(|id| self.nodes[id.0].label().to_string())
            .collect()
    }
}
