//! Graph nodes.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use path_clean::PathClean;
use pkgr_config::TsConfig;
use serde::{Deserialize, Serialize};

use crate::cache::EntryPointCache;

/// URL scheme of entry point nodes.
pub const ENTRY_POINT_SCHEME: &str = "entry://";

/// Index of a node inside its [`BuildGraph`](crate::BuildGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    #[default]
    Pending,
    Processing,
    Done,
    Error,
}

/// Publishable unit as described by its package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    /// Public import name, e.g. `@lib/core/testing`.
    pub module_id: String,
    /// Source entry file, e.g. `src/public-api.ts`.
    pub entry_file: Option<PathBuf>,
    /// Built typings, e.g. `dist/testing/index.d.ts`.
    pub declarations_file: Option<PathBuf>,
}

impl EntryPoint {
    pub fn new(module_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            entry_file: None,
            declarations_file: None,
        }
    }

    pub fn with_entry_file(mut self, entry_file: impl Into<PathBuf>) -> Self {
        self.entry_file = Some(entry_file.into());
        self
    }

    pub fn with_declarations_file(mut self, declarations_file: impl Into<PathBuf>) -> Self {
        self.declarations_file = Some(declarations_file.into());
        self
    }

    /// Copy with relative entry and declarations files joined onto `base`.
    pub fn resolved_against(&self, base: &Path) -> Self {
        let resolve = |path: Option<&Path>| {
            path.map(|path| {
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    base.join(path).clean()
                }
            })
        };
        Self {
            module_id: self.module_id.clone(),
            entry_file: resolve(self.entry_file.as_deref()),
            declarations_file: resolve(self.declarations_file.as_deref()),
        }
    }

    /// Directory holding the entry file.
    pub fn source_root(&self) -> Option<&Path> {
        self.entry_file.as_deref().and_then(Path::parent)
    }

    pub fn url(&self) -> String {
        format!("{}{}", ENTRY_POINT_SCHEME, self.module_id)
    }
}

/// Everything an entry point node carries.
#[derive(Debug)]
pub struct EntryPointData {
    pub entry_point: EntryPoint,
    pub ts_config: TsConfig,
    pub cache: EntryPointCache,
}

impl EntryPointData {
    pub fn new(entry_point: EntryPoint, ts_config: TsConfig) -> Self {
        Self {
            entry_point,
            ts_config,
            cache: EntryPointCache::new(),
        }
    }

    pub fn module_id(&self) -> &str {
        &self.entry_point.module_id
    }
}

#[derive(Debug)]
pub enum NodeKind {
    EntryPoint(Box<EntryPointData>),
    /// Any other build artifact tracked in the graph.
    Other,
}

/// Graph vertex.
#[derive(Debug)]
pub struct Node {
    pub url: String,
    pub state: NodeState,
    pub kind: NodeKind,
    depends_on: IndexSet<NodeId>,
}

impl Node {
    pub fn entry_point(entry_point: EntryPoint, ts_config: TsConfig) -> Self {
        Self {
            url: entry_point.url(),
            state: NodeState::Pending,
            kind: NodeKind::EntryPoint(Box::new(EntryPointData::new(entry_point, ts_config))),
            depends_on: IndexSet::new(),
        }
    }

    pub fn other(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: NodeState::Pending,
            kind: NodeKind::Other,
            depends_on: IndexSet::new(),
        }
    }

    pub fn is_entry_point(&self) -> bool {
        matches!(self.kind, NodeKind::EntryPoint(_))
    }

    pub fn entry_point_data(&self) -> Option<&EntryPointData> {
        match &self.kind {
            NodeKind::EntryPoint(data) => Some(data),
            NodeKind::Other => None,
        }
    }

    pub fn entry_point_data_mut(&mut self) -> Option<&mut EntryPointData> {
        match &mut self.kind {
            NodeKind::EntryPoint(data) => Some(data),
            NodeKind::Other => None,
        }
    }

    pub fn module_id(&self) -> Option<&str> {
        self.entry_point_data().map(EntryPointData::module_id)
    }

    /// Module id for entry points, URL otherwise.
    pub fn label(&self) -> &str {
        self.module_id().unwrap_or(&self.url)
    }

    /// Record that this node must be built after `target`.
    ///
    /// Returns `false` when the edge already existed.
    pub fn depends_on(&mut self, target: NodeId) -> bool {
        self.depends_on.insert(target)
    }

    /// Outgoing edges in insertion order.
    pub fn dependencies(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.depends_on.iter().copied()
    }

    pub fn has_dependency(&self, target: NodeId) -> bool {
        self.depends_on.contains(&target)
    }

    pub fn is_done(&self) -> bool {
        self.state == NodeState::Done
    }
}
