//! The source analysis pass.
//!
//! For every entry point that is not done yet: overlay `paths` so sibling
//! entry points resolve to their sources, build a program with resource
//! loading disabled, fail on any diagnostic, then link the non-relative
//! specifiers of the program's own files to other entry points.

use std::sync::Arc;

use pkgr_config::AnalysisSettings;

use crate::cache::CacheStats;
use crate::compiler::{CachedCompilerHost, CompilerService, CreateProgram, NoResourceHost, Program};
use crate::error::{AnalysisError, Result};
use crate::extract::ImportExtractor;
use crate::graph::BuildGraph;
use crate::link::{EntryPointIndex, link_dependencies};
use crate::node::{EntryPoint, NodeId};
use crate::path_mapping::set_dependencies_ts_config_paths;
use crate::runtime::Runtime;

/// Counters of one analysis pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub entry_points_analysed: usize,
    /// Entry points already done before the pass.
    pub entry_points_skipped: usize,
    pub edges_added: usize,
    pub files_scanned: usize,
    /// Source and resolution cache counters of the analysed entry points.
    pub cache: CacheStats,
}

/// Drives the analysis of a [`BuildGraph`].
pub struct SourceAnalyzer<S> {
    compiler: S,
    runtime: Option<Arc<dyn Runtime>>,
    settings: AnalysisSettings,
}

impl<S: CompilerService> SourceAnalyzer<S> {
    pub fn new(compiler: S) -> Self {
        Self {
            compiler,
            runtime: None,
            settings: AnalysisSettings::default(),
        }
    }

    /// Set the runtime for filesystem operations.
    ///
    /// Defaults to [`NativeRuntime`](crate::runtime::native::NativeRuntime).
    pub fn runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn settings(mut self, settings: AnalysisSettings) -> Self {
        self.settings = settings;
        self
    }

    fn get_runtime(&self) -> Arc<dyn Runtime> {
        match &self.runtime {
            Some(runtime) => Arc::clone(runtime),
            None => Arc::new(crate::runtime::native::NativeRuntime),
        }
    }

    /// Analyse every entry point not yet done, in graph order.
    ///
    /// The first failing entry point aborts the pass. Edges added for entry
    /// points analysed before the failure are kept.
    pub fn analyse(&self, graph: &mut BuildGraph) -> Result<AnalysisStats> {
        let runtime = self.get_runtime();
        let extractor = ImportExtractor::new(&self.settings)?;
        // Done entry points stay linkable and mapped: a built sibling is
        // still a dependency and still resolves to its sources.
        let index = EntryPointIndex::new(graph);

        let cwd = runtime.get_cwd()?;
        let entry_points: Vec<EntryPoint> = graph
            .iter()
            .filter_map(|(_, node)| node.entry_point_data())
            .map(|data| data.entry_point.resolved_against(&cwd))
            .collect();
        let pending: Vec<NodeId> = graph
            .entry_points()
            .filter(|id| graph.get(*id).is_some_and(|node| !node.is_done()))
            .collect();

        let mut stats = AnalysisStats {
            entry_points_skipped: entry_points.len() - pending.len(),
            ..AnalysisStats::default()
        };

        for id in pending {
            self.analyse_entry_point(
                graph,
                id,
                &entry_points,
                &index,
                &extractor,
                &*runtime,
                &mut stats,
            )?;
        }

        if self.settings.reject_cycles {
            graph.check_acyclic()?;
        }

        tracing::debug!(
            "Analysed {} entry points ({} skipped), {} dependencies found",
            stats.entry_points_analysed,
            stats.entry_points_skipped,
            stats.edges_added
        );

        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    fn analyse_entry_point(
        &self,
        graph: &mut BuildGraph,
        id: NodeId,
        entry_points: &[EntryPoint],
        index: &EntryPointIndex,
        extractor: &ImportExtractor,
        runtime: &dyn Runtime,
        stats: &mut AnalysisStats,
    ) -> Result<()> {
        let Some(data) = graph.get_mut(id).and_then(|node| node.entry_point_data_mut()) else {
            return Ok(());
        };
        let module_id = data.module_id().to_string();

        tracing::debug!("Analysing sources for {}", module_id);

        let ts_config = set_dependencies_ts_config_paths(
            &data.ts_config,
            entry_points,
            self.settings.resolve_to_source,
        );

        let cache_before = data.cache.stats();
        let program = {
            let mut host =
                NoResourceHost::new(CachedCompilerHost::new(&ts_config, &mut data.cache, runtime));
            self.compiler.create_program(CreateProgram {
                root_names: &ts_config.root_names,
                options: &ts_config.options,
                host: &mut host,
            })?
        };
        stats.cache += data.cache.stats() - cache_before;

        let diagnostics = program.semantic_diagnostics();
        if !diagnostics.is_empty() {
            let message = self.compiler.format_diagnostics(&diagnostics);
            return Err(AnalysisError::semantic(module_id, message, diagnostics));
        }

        let extracted = extractor.extract(program.source_files());
        stats.files_scanned += extracted.files_scanned;
        stats.edges_added += link_dependencies(graph, index, id, &extracted.specifiers)?;
        stats.entry_points_analysed += 1;

        Ok(())
    }
}

/// Analyse `graph` with the given compiler, runtime and settings.
pub fn analyse_sources<S: CompilerService>(
    graph: &mut BuildGraph,
    compiler: S,
    runtime: Arc<dyn Runtime>,
    settings: AnalysisSettings,
) -> Result<AnalysisStats> {
    SourceAnalyzer::new(compiler)
        .runtime(runtime)
        .settings(settings)
        .analyse(graph)
}
