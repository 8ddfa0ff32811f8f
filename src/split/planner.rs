//! Placement planning
//!
//! A module matched by a cache group is pulled into the chunks its dependents
//! already live in, unless the group names its destination chunks.

use std::collections::HashMap;

use tracing::debug;

use crate::bundler::{ChunkId, Compilation, ModuleId};

use super::cache_group::{CacheGroup, CacheGroups, ChunkSelector};

/// Planned destination of one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub module: ModuleId,
    /// Name of the cache group that matched the module
    pub cache_group: String,
    /// Chunks the module should end up in, in discovery order
    pub targets: Vec<ChunkId>,
}

/// Target chunks for every module that should move, in module order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementPlan {
    moves: Vec<PlannedMove>,
}

impl PlacementPlan {
    pub fn moves(&self) -> &[PlannedMove] {
        &self.moves
    }

    pub fn targets_of(&self, module: ModuleId) -> Option<&[ChunkId]> {
        self.moves
            .iter()
            .find(|m| m.module == module)
            .map(|m| m.targets.as_slice())
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl IntoIterator for PlacementPlan {
    type Item = PlannedMove;
    type IntoIter = std::vec::IntoIter<PlannedMove>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter()
    }
}

/// Module an edge points at, skipping unresolved and weak edges
pub fn referenced_module(compilation: &Compilation, owner: ModuleId, dependency: usize) -> Option<ModuleId> {
    let reference = compilation.dependency_reference(owner, dependency)?;
    if reference.weak {
        return None;
    }
    reference.module
}

/// Live chunks whose name is selected
pub fn find_chunks(compilation: &Compilation, selector: &ChunkSelector) -> Vec<ChunkId> {
    compilation
        .chunks()
        .filter(|(_, chunk)| chunk.condition_name().is_some_and(|name| selector.contains(name)))
        .map(|(id, _)| id)
        .collect()
}

fn extend_unique(targets: &mut Vec<ChunkId>, chunks: impl IntoIterator<Item = ChunkId>) {
    for chunk in chunks {
        if !targets.contains(&chunk) {
            targets.push(chunk);
        }
    }
}

/// Computes a [`PlacementPlan`] for one compilation
///
/// The destination of a cache group only depends on the group and the
/// graph, so the whole-graph scan runs once per matched group.
pub struct PlacementPlanner<'a> {
    compilation: &'a Compilation,
    cache_groups: &'a CacheGroups,
    scanned: HashMap<usize, Vec<ChunkId>>,
}

impl<'a> PlacementPlanner<'a> {
    pub fn new(compilation: &'a Compilation, cache_groups: &'a CacheGroups) -> Self {
        Self {
            compilation,
            cache_groups,
            scanned: HashMap::new(),
        }
    }

    pub fn plan(mut self) -> PlacementPlan {
        let compilation = self.compilation;
        let cache_groups = self.cache_groups;
        let mut plan = PlacementPlan::default();

        for (module, _) in compilation.modules() {
            let Some((index, group)) = cache_groups.resolve(compilation, module) else {
                continue;
            };

            let targets = self.targets(index, group);
            if targets.is_empty() {
                debug!(
                    "Module {} matched '{}' but no target chunk was found",
                    module, group.name
                );
                continue;
            }

            plan.moves.push(PlannedMove {
                module,
                cache_group: group.name.clone(),
                targets,
            });
        }

        plan
    }

    fn targets(&mut self, index: usize, group: &CacheGroup) -> Vec<ChunkId> {
        if let Some(targets) = self.scanned.get(&index) {
            return targets.clone();
        }
        let targets = self.scan(group);
        self.scanned.insert(index, targets.clone());
        targets
    }

    /// Walk every dependency edge of the graph looking for edges into `group`
    fn scan(&self, group: &CacheGroup) -> Vec<ChunkId> {
        let compilation = self.compilation;
        let mut targets = Vec::new();

        for (owner, module) in compilation.modules() {
            for dependency in 0..module.dependencies.len() {
                let Some(target) = referenced_module(compilation, owner, dependency) else {
                    continue;
                };
                if !group.test.matches(compilation, target) {
                    continue;
                }

                match &group.chunks {
                    Some(selector) => extend_unique(&mut targets, find_chunks(compilation, selector)),
                    None if group.test.matches(compilation, owner) => {
                        // Owner matches the same group (e.g. an index file re-exporting
                        // its siblings). Placement for this edge is left undecided.
                    }
                    None => extend_unique(&mut targets, module.chunks().iter().copied()),
                }
            }
        }

        targets
    }
}
