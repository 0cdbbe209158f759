//! # pkgr-graph
//!
//! Entry point dependency analysis for multi entry point library packages.
//!
//! A package publishes several entry points (`@lib/core`, `@lib/core/testing`,
//! ...), each compiled on its own with its own `tsconfig`. Before anything is
//! compiled, this crate finds out which entry points import which others by
//! reading their sources, records those relations as edges of a
//! [`BuildGraph`], and gives a scheduler a dependency-first build order.
//!
//! ## Pipeline
//!
//! ```text
//! SourceAnalyzer::analyse
//!   for each entry point not done:
//!     set_dependencies_ts_config_paths   siblings resolve to their sources
//!     CompilerService::create_program    NoResourceHost(CachedCompilerHost)
//!     Program::semantic_diagnostics      any diagnostic aborts the pass
//!     ImportExtractor::extract           non-relative specifiers
//!     link_dependencies                  edges to known entry points
//! BuildGraph::build_order                topological order for the build
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pkgr_config::TsConfig;
//! use pkgr_graph::{BuildGraph, EntryPoint, Node, OxcCompilerService, SourceAnalyzer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = BuildGraph::new();
//! graph.put(Node::entry_point(
//!     EntryPoint::new("@lib/core").with_entry_file("/repo/core/src/public-api.ts"),
//!     TsConfig::from_file("/repo/core/tsconfig.lib.json")?,
//! ));
//! graph.put(Node::entry_point(
//!     EntryPoint::new("@lib/core/testing").with_entry_file("/repo/core/testing/src/public-api.ts"),
//!     TsConfig::from_file("/repo/core/testing/tsconfig.lib.json")?,
//! ));
//!
//! let stats = SourceAnalyzer::new(OxcCompilerService::new()).analyse(&mut graph)?;
//! println!("{} dependencies found", stats.edges_added);
//!
//! for id in graph.build_order()? {
//!     println!("build {}", graph.get(id).map(|n| n.label()).unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events only. Enable the `logging` feature for
//! [`logging::init_logging`].

pub mod analyse;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod extract;
pub mod graph;
pub mod link;
pub mod node;
pub mod path_mapping;
pub mod runtime;

#[cfg(feature = "logging")]
pub mod logging;

pub use analyse::{AnalysisStats, SourceAnalyzer, analyse_sources};
pub use cache::{CacheStats, EntryPointCache, ModuleResolutionCache, SourcesFileCache};
pub use compiler::{
    CachedCompilerHost, CompilerHost, CompilerService, CreateProgram, Diagnostic,
    DiagnosticCategory, NoResourceHost, OxcCompilerService, OxcProgram, Program, SourceFile,
};
pub use error::{AnalysisError, Result};
pub use extract::{ExtractedImports, ImportExtractor};
pub use graph::BuildGraph;
pub use link::{EntryPointIndex, link_dependencies};
pub use node::{EntryPoint, EntryPointData, Node, NodeId, NodeKind, NodeState};
pub use path_mapping::set_dependencies_ts_config_paths;
pub use runtime::native::NativeRuntime;
pub use runtime::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::test_utils::TestRuntime;

// Re-export the config crate for convenience
pub use pkgr_config;
