//! Split modules into multiple chunks
//!
//! After chunk optimization, modules matched by a cache group are moved out
//! of the chunks the default grouping chose:
//!
//! 1. every module is matched against the cache groups (first match wins)
//! 2. a matched module is planned into the group's explicit chunks, or into
//!    the chunks of the modules that depend on it
//! 3. planned modules are disconnected from their chunks and connected to
//!    their targets
//! 4. chunks left without modules are dropped
//!
//! Planning is finished before any edge changes, and pruning only starts
//! once every move is applied.

mod cache_group;
mod matcher;
mod mutator;
mod planner;

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::bundler::{ChunkId, Compilation, GraphError, ModuleId};
use crate::plugins::{CompilationHooks, Plugin};

pub use cache_group::{CacheGroup, CacheGroups, ChunkSelector};
pub use matcher::Test;
pub use mutator::{apply_plan, prune_empty_chunks};
pub use planner::{find_chunks, referenced_module, PlacementPlan, PlacementPlanner, PlannedMove};

/// Outcome of one run of the pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub moves: Vec<PlannedMove>,
    pub removed_chunks: Vec<ChunkId>,
}

/// Why a module is (or is not) going to move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub module: ModuleId,
    pub identifier: String,
    pub cache_group: Option<String>,
    pub targets: Vec<String>,
}

/// The split pass, configured with its cache groups
#[derive(Debug, Clone, Default)]
pub struct SplitModuleChunks {
    cache_groups: Arc<CacheGroups>,
    /// Only the latest run is kept; taking it leaves the slot empty
    last_report: Arc<Mutex<Option<SplitReport>>>,
}

impl SplitModuleChunks {
    pub fn new(cache_groups: CacheGroups) -> Self {
        Self {
            cache_groups: Arc::new(cache_groups),
            last_report: Arc::default(),
        }
    }

    pub fn cache_groups(&self) -> &CacheGroups {
        &self.cache_groups
    }

    /// Compute target chunks without touching the graph
    pub fn plan(&self, compilation: &Compilation) -> PlacementPlan {
        PlacementPlanner::new(compilation, &self.cache_groups).plan()
    }

    /// Plan, move modules and drop emptied chunks
    pub fn run(&self, compilation: &mut Compilation) -> Result<SplitReport, GraphError> {
        let plan = self.plan(compilation);
        apply_plan(compilation, &plan)?;
        let removed_chunks = prune_empty_chunks(compilation);

        info!(
            "Moved {} module(s), removed {} empty chunk(s)",
            plan.len(),
            removed_chunks.len()
        );

        Ok(SplitReport {
            moves: plan.into_iter().collect(),
            removed_chunks,
        })
    }

    /// Matched cache group and planned chunks for every module
    pub fn explain(&self, compilation: &Compilation) -> Vec<Explanation> {
        let plan = self.plan(compilation);

        compilation
            .modules()
            .map(|(id, module)| Explanation {
                module: id,
                identifier: module.identifier.clone(),
                cache_group: self
                    .cache_groups
                    .resolve(compilation, id)
                    .map(|(_, group)| group.name.clone()),
                targets: plan
                    .targets_of(id)
                    .unwrap_or_default()
                    .iter()
                    .map(|&chunk| compilation.chunk_label(chunk))
                    .collect(),
            })
            .collect()
    }

    /// Report of the most recent hook-driven run, if it has not been taken yet
    pub fn take_report(&self) -> Option<SplitReport> {
        self.last_report.lock().take()
    }
}

impl Plugin for SplitModuleChunks {
    fn name(&self) -> &str {
        "split-module-chunks"
    }

    fn this_compilation(&self) -> Option<Box<dyn CompilationHooks>> {
        Some(Box::new(SplitPass::new(self.clone())))
    }
}

/// Run guard of one compilation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PassState {
    #[default]
    Idle,
    Ran,
}

/// Hooks attached to a single compilation
#[derive(Debug)]
pub struct SplitPass {
    splitter: SplitModuleChunks,
    state: PassState,
}

impl SplitPass {
    pub fn new(splitter: SplitModuleChunks) -> Self {
        Self {
            splitter,
            state: PassState::Idle,
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }
}

impl CompilationHooks for SplitPass {
    fn unseal(&mut self, _compilation: &mut Compilation) {
        self.state = PassState::Idle;
    }

    fn after_optimize_chunks(&mut self, compilation: &mut Compilation) -> Result<()> {
        if self.state == PassState::Ran {
            debug!("Split already ran for this compilation, skipping");
            return Ok(());
        }
        if compilation.chunk_count() < 2 {
            debug!("Only {} chunk(s), nothing to split", compilation.chunk_count());
            return Ok(());
        }

        self.state = PassState::Ran;
        let report = self.splitter.run(compilation)?;
        *self.splitter.last_report.lock() = Some(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{Chunk, Dependency, Module};
    use crate::plugins::PluginManager;
    use pretty_assertions::assert_eq;

    struct Graph {
        compilation: Compilation,
        a: ChunkId,
        b: ChunkId,
        c: ChunkId,
        owner_a: ModuleId,
        owner_c: ModuleId,
        shared: ModuleId,
    }

    /// Chunks A, B and C in one group; X (`src/shared.js`) is alone in B and
    /// strongly imported from modules in A and C.
    fn graph() -> Graph {
        let mut compilation = Compilation::new();
        let owner_a = compilation.add_module(Module::new("src/a.js"));
        let owner_c = compilation.add_module(Module::new("src/c.js"));
        let shared = compilation.add_module(Module::new("src/shared.js"));
        compilation.add_dependency(owner_a, Dependency::strong("./shared", shared)).unwrap();
        compilation.add_dependency(owner_c, Dependency::strong("./shared", shared)).unwrap();

        let a = compilation.add_chunk(Chunk::named("A"));
        let b = compilation.add_chunk(Chunk::named("B"));
        let c = compilation.add_chunk(Chunk::named("C"));
        compilation.add_chunk_group(Some("main".to_string()), &[a, b, c]).unwrap();
        compilation.connect_chunk_and_module(a, owner_a).unwrap();
        compilation.connect_chunk_and_module(b, shared).unwrap();
        compilation.connect_chunk_and_module(c, owner_c).unwrap();

        Graph { compilation, a, b, c, owner_a, owner_c, shared }
    }

    fn splitter(groups: Vec<CacheGroup>) -> SplitModuleChunks {
        SplitModuleChunks::new(CacheGroups::new(groups))
    }

    #[test]
    fn test_end_to_end_pulls_module_into_dependent_chunks() {
        let mut g = graph();
        let splitter = splitter(vec![CacheGroup::new("shared").with_test(Test::pattern("shared"))]);
        let mut pass = SplitPass::new(splitter.clone());

        pass.after_optimize_chunks(&mut g.compilation).unwrap();

        assert_eq!(pass.state(), PassState::Ran);
        assert_eq!(g.compilation.module(g.shared).unwrap().chunks(), &[g.a, g.c]);
        assert_eq!(g.compilation.chunk_ids(), &[g.a, g.c]);
        let (_, group) = g.compilation.chunk_groups().next().unwrap();
        assert_eq!(group.chunks(), &[g.a, g.c]);

        let report = splitter.take_report().unwrap();
        assert_eq!(report.removed_chunks, vec![g.b]);
        assert_eq!(report.moves[0].targets, vec![g.a, g.c]);
        assert_eq!(splitter.take_report(), None);
    }

    #[test]
    fn test_explicit_chunks_override() {
        let mut g = graph();
        let splitter = splitter(vec![CacheGroup::new("vendor")
            .with_test(Test::prefix("src/shared"))
            .with_chunks(ChunkSelector::Names(vec!["C".to_string()]))]);

        splitter.run(&mut g.compilation).unwrap();

        assert_eq!(g.compilation.module(g.shared).unwrap().chunks(), &[g.c]);
        assert_eq!(g.compilation.chunk(g.c).unwrap().modules(), &[g.owner_c, g.shared]);
        assert_eq!(g.compilation.chunk_ids(), &[g.a, g.c]);
    }

    #[test]
    fn test_first_match_decides_placement() {
        let mut g = graph();
        let splitter = splitter(vec![
            CacheGroup::new("first")
                .with_test(Test::pattern("shared"))
                .with_chunks(ChunkSelector::Name("A".to_string())),
            CacheGroup::new("second")
                .with_test(Test::prefix("src/shared"))
                .with_chunks(ChunkSelector::Name("C".to_string())),
        ]);

        let report = splitter.run(&mut g.compilation).unwrap();

        assert_eq!(g.compilation.module(g.shared).unwrap().chunks(), &[g.a]);
        assert_eq!(report.moves[0].cache_group, "first");
    }

    #[test]
    fn test_weak_edge_owner_contributes_nothing() {
        let mut g = graph();
        let weak_owner = g.compilation.add_module(Module::new("src/lazy.js"));
        g.compilation
            .add_dependency(weak_owner, Dependency::weak("./shared", g.shared))
            .unwrap();
        let lazy = g.compilation.add_chunk(Chunk::named("lazy"));
        g.compilation.connect_chunk_and_module(lazy, weak_owner).unwrap();

        let splitter = splitter(vec![CacheGroup::new("shared").with_test(Test::pattern("shared"))]);
        splitter.run(&mut g.compilation).unwrap();

        assert_eq!(g.compilation.module(g.shared).unwrap().chunks(), &[g.a, g.c]);
        assert!(g.compilation.chunk_ids().contains(&lazy));
    }

    #[test]
    fn test_chunks_keeping_modules_are_never_removed() {
        let mut g = graph();
        let extra = g.compilation.add_module(Module::new("src/b-only.js"));
        g.compilation.connect_chunk_and_module(g.b, extra).unwrap();

        let splitter = splitter(vec![CacheGroup::new("shared").with_test(Test::pattern("shared"))]);
        let report = splitter.run(&mut g.compilation).unwrap();

        assert!(report.removed_chunks.is_empty());
        assert_eq!(g.compilation.chunk_ids(), &[g.a, g.b, g.c]);
        assert_eq!(g.compilation.chunk(g.b).unwrap().modules(), &[extra]);
    }

    #[test]
    fn test_unmatched_modules_stay_put() {
        let mut g = graph();
        let splitter = splitter(vec![CacheGroup::new("none").with_test(Test::Bool(false))]);
        let report = splitter.run(&mut g.compilation).unwrap();

        assert_eq!(report, SplitReport::default());
        assert_eq!(g.compilation.module(g.owner_a).unwrap().chunks(), &[g.a]);
        assert_eq!(g.compilation.module(g.shared).unwrap().chunks(), &[g.b]);
    }

    #[test]
    fn test_runs_once_per_cycle_and_rearms_on_unseal() {
        let g = graph();
        let splitter = splitter(vec![CacheGroup::new("shared").with_test(Test::pattern("shared"))]);
        let mut manager = PluginManager::new();
        manager.register(Arc::new(splitter.clone()));

        let mut session = manager.compilation(g.compilation);
        session.after_optimize_chunks().unwrap();

        // A second shared module parked in C only shows up after re-arming
        let late = session.compilation_mut().add_module(Module::new("src/shared-late.js"));
        session
            .compilation_mut()
            .add_dependency(g.owner_a, Dependency::strong("./shared-late", late))
            .unwrap();
        session.compilation_mut().connect_chunk_and_module(g.c, late).unwrap();

        session.after_optimize_chunks().unwrap();
        assert_eq!(session.compilation().module(late).unwrap().chunks(), &[g.c]);
        assert_eq!(splitter.take_report().unwrap().moves.len(), 1);

        session.unseal();
        session.after_optimize_chunks().unwrap();
        assert_eq!(session.compilation().module(late).unwrap().chunks(), &[g.a, g.c]);
        assert!(splitter.take_report().is_some());
    }

    #[test]
    fn test_only_the_latest_report_is_kept() {
        let splitter = splitter(vec![CacheGroup::new("shared").with_test(Test::pattern("shared"))]);
        let mut manager = PluginManager::new();
        manager.register(Arc::new(splitter.clone()));

        for _ in 0..3 {
            let mut session = manager.compilation(graph().compilation);
            session.after_optimize_chunks().unwrap();
        }
        let mut untouched = manager.compilation(graph().compilation);
        untouched.unseal();

        let report = splitter.take_report().unwrap();
        assert_eq!(report.moves.len(), 1);
        assert_eq!(report.removed_chunks.len(), 1);
        assert_eq!(splitter.take_report(), None);
    }

    #[test]
    fn test_single_chunk_is_left_alone() {
        let mut compilation = Compilation::new();
        let owner = compilation.add_module(Module::new("src/main.js"));
        let shared = compilation.add_module(Module::new("src/shared.js"));
        compilation.add_dependency(owner, Dependency::strong("./shared", shared)).unwrap();
        let main = compilation.add_chunk(Chunk::named("main"));
        compilation.connect_chunk_and_module(main, owner).unwrap();

        let splitter = splitter(vec![CacheGroup::new("shared").with_test(Test::pattern("shared"))]);
        let mut pass = SplitPass::new(splitter.clone());
        pass.after_optimize_chunks(&mut compilation).unwrap();

        assert_eq!(pass.state(), PassState::Idle);
        assert!(compilation.module(shared).unwrap().chunks().is_empty());
        assert_eq!(splitter.take_report(), None);
    }

    #[test]
    fn test_explain() {
        let g = graph();
        let splitter = splitter(vec![CacheGroup::new("shared").with_test(Test::pattern("shared"))]);
        let explained = splitter.explain(&g.compilation);

        assert_eq!(explained.len(), 3);
        assert_eq!(explained[0].cache_group, None);
        assert_eq!(
            explained[2],
            Explanation {
                module: g.shared,
                identifier: "src/shared.js".to_string(),
                cache_group: Some("shared".to_string()),
                targets: vec!["A".to_string(), "C".to_string()],
            }
        );
        // Explaining never mutates
        assert_eq!(g.compilation.chunk_count(), 3);
    }
}
