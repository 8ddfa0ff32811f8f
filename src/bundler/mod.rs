//! Host build graph
//!
//! Holds modules, chunks and chunk groups of one compilation along with the
//! module/chunk membership edges that optimization passes rewire.

mod chunk;
mod graph;
mod snapshot;

pub use chunk::{Chunk, ChunkGroup, ChunkGroupId, ChunkId};
pub use graph::{Compilation, Dependency, DependencyReference, GraphError, Module, ModuleId};
pub use snapshot::{ChunkGroupSnapshot, ChunkSnapshot, DependencySnapshot, GraphSnapshot, ModuleSnapshot};
