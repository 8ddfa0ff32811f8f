//! Rewiring module/chunk edges and dropping emptied chunks

use tracing::debug;

use crate::bundler::{ChunkId, Compilation, GraphError};

use super::planner::PlacementPlan;

/// Move every planned module out of its current chunks and into its targets
///
/// Emptied chunks are kept; removing them is [`prune_empty_chunks`]'s job.
pub fn apply_plan(compilation: &mut Compilation, plan: &PlacementPlan) -> Result<(), GraphError> {
    for planned in plan.moves() {
        let current: Vec<ChunkId> = compilation
            .module(planned.module)
            .ok_or(GraphError::ModuleOutOfRange(planned.module))?
            .chunks()
            .to_vec();

        for chunk in current {
            compilation.disconnect_chunk_and_module(chunk, planned.module)?;
        }
        for &chunk in &planned.targets {
            compilation.connect_chunk_and_module(chunk, planned.module)?;
        }

        debug!(
            "Moved module {} into [{}]",
            planned.module,
            planned
                .targets
                .iter()
                .map(|&id| compilation.chunk_label(id))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}

/// Remove chunks without modules from every chunk group and from the build
///
/// Returns the removed chunk IDs in chunk order.
pub fn prune_empty_chunks(compilation: &mut Compilation) -> Vec<ChunkId> {
    let empty: Vec<ChunkId> = compilation
        .chunks()
        .filter(|(_, chunk)| chunk.is_empty())
        .map(|(id, _)| id)
        .collect();

    if empty.is_empty() {
        return empty;
    }

    let groups: Vec<_> = compilation.chunk_groups().map(|(id, _)| id).collect();
    for &chunk in &empty {
        for &group in &groups {
            compilation.remove_chunk_from_group(group, chunk);
        }
        debug!("Removing empty chunk {}", compilation.chunk_label(chunk));
    }
    compilation.remove_chunks(&empty);

    empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{Chunk, Module};
    use crate::split::{CacheGroup, CacheGroups, PlacementPlanner, Test};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_replaces_membership() {
        let mut compilation = Compilation::new();
        let owner = compilation.add_module(Module::new("src/main.js"));
        let util = compilation.add_module(Module::new("src/util.js"));
        compilation
            .add_dependency(owner, crate::bundler::Dependency::strong("./util", util))
            .unwrap();

        let main = compilation.add_chunk(Chunk::named("main"));
        let old = compilation.add_chunk(Chunk::named("old"));
        let stale = compilation.add_chunk(Chunk::named("stale"));
        compilation.connect_chunk_and_module(main, owner).unwrap();
        compilation.connect_chunk_and_module(old, util).unwrap();
        compilation.connect_chunk_and_module(stale, util).unwrap();

        let groups = CacheGroups::new(vec![CacheGroup::new("util").with_test(Test::prefix("src/util"))]);
        let plan = PlacementPlanner::new(&compilation, &groups).plan();
        apply_plan(&mut compilation, &plan).unwrap();

        assert_eq!(compilation.module(util).unwrap().chunks(), &[main]);
        assert_eq!(compilation.chunk(main).unwrap().modules(), &[owner, util]);
        // Emptied chunks survive until pruning
        assert_eq!(compilation.chunk_count(), 3);
        assert!(compilation.chunk(old).unwrap().is_empty());
    }

    #[test]
    fn test_apply_module_without_chunks() {
        let mut compilation = Compilation::new();
        let owner = compilation.add_module(Module::new("src/main.js"));
        let orphan = compilation.add_module(Module::new("src/orphan.js"));
        compilation
            .add_dependency(owner, crate::bundler::Dependency::strong("./orphan", orphan))
            .unwrap();
        let main = compilation.add_chunk(Chunk::named("main"));
        compilation.connect_chunk_and_module(main, owner).unwrap();

        let groups = CacheGroups::new(vec![CacheGroup::new("orphan").with_test(Test::prefix("src/orphan"))]);
        let plan = PlacementPlanner::new(&compilation, &groups).plan();
        apply_plan(&mut compilation, &plan).unwrap();

        assert_eq!(compilation.module(orphan).unwrap().chunks(), &[main]);
    }

    #[test]
    fn test_prune_only_empty_chunks() {
        let mut compilation = Compilation::new();
        let module = compilation.add_module(Module::new("src/main.js"));
        let main = compilation.add_chunk(Chunk::named("main"));
        let empty = compilation.add_chunk(Chunk::named("empty"));
        let group = compilation
            .add_chunk_group(Some("main".to_string()), &[main, empty])
            .unwrap();
        let other_group = compilation
            .add_chunk_group(Some("other".to_string()), &[empty])
            .unwrap();
        compilation.connect_chunk_and_module(main, module).unwrap();

        assert_eq!(prune_empty_chunks(&mut compilation), vec![empty]);
        assert_eq!(compilation.chunk_ids(), &[main]);

        let groups: Vec<_> = compilation.chunk_groups().collect();
        assert_eq!(groups[group].1.chunks(), &[main]);
        assert!(groups[other_group].1.chunks().is_empty());
        assert!(compilation.chunk(empty).unwrap().groups().is_empty());
    }

    #[test]
    fn test_prune_without_chunk_groups() {
        let mut compilation = Compilation::new();
        let empty = compilation.add_chunk(Chunk::named("empty"));
        let kept = compilation.add_chunk(Chunk::named("kept"));
        let module = compilation.add_module(Module::new("src/main.js"));
        compilation.connect_chunk_and_module(kept, module).unwrap();

        assert_eq!(prune_empty_chunks(&mut compilation), vec![empty]);
        assert_eq!(compilation.chunk_ids(), &[kept]);
        assert!(prune_empty_chunks(&mut compilation).is_empty());
    }
}
