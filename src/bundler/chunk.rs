//! Chunks and chunk groups

use super::ModuleId;

/// Unique identifier for a chunk
pub type ChunkId = usize;

/// Unique identifier for a chunk group
pub type ChunkGroupId = usize;

/// A chunk is a group of modules that will be bundled together
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk name (used for output filename and name-based rules)
    pub name: Option<String>,

    /// Module IDs included in this chunk, in connection order
    pub(crate) modules: Vec<ModuleId>,

    /// Chunk groups listing this chunk
    pub(crate) groups: Vec<ChunkGroupId>,
}

impl Chunk {
    /// Create a new chunk without modules
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            modules: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Create a new named chunk
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(Some(name.into()))
    }

    /// Module IDs in this chunk
    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    /// Chunk groups this chunk belongs to
    pub fn groups(&self) -> &[ChunkGroupId] {
        &self.groups
    }

    /// Name seen by rules and lookups; an empty name counts as no name
    pub fn condition_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Whether the chunk name starts with `prefix`
    pub fn name_starts_with(&self, prefix: &str) -> bool {
        self.condition_name().is_some_and(|name| name.starts_with(prefix))
    }

    /// Check if chunk is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Number of modules in chunk
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub(crate) fn add_module(&mut self, module: ModuleId) -> bool {
        if self.modules.contains(&module) {
            return false;
        }
        self.modules.push(module);
        true
    }

    pub(crate) fn remove_module(&mut self, module: ModuleId) -> bool {
        let before = self.modules.len();
        self.modules.retain(|&id| id != module);
        before != self.modules.len()
    }

    pub(crate) fn add_group(&mut self, group: ChunkGroupId) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    pub(crate) fn remove_group(&mut self, group: ChunkGroupId) {
        self.groups.retain(|&id| id != group);
    }
}

/// A set of chunks forming one output target
#[derive(Debug, Clone, Default)]
pub struct ChunkGroup {
    /// Group name (usually the entrypoint name)
    pub name: Option<String>,

    pub(crate) chunks: Vec<ChunkId>,
}

impl ChunkGroup {
    /// Create an empty chunk group
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            chunks: Vec::new(),
        }
    }

    /// Chunks in this group
    pub fn chunks(&self) -> &[ChunkId] {
        &self.chunks
    }

    pub(crate) fn push_chunk(&mut self, chunk: ChunkId) -> bool {
        if self.chunks.contains(&chunk) {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    pub(crate) fn remove_chunk(&mut self, chunk: ChunkId) -> bool {
        let before = self.chunks.len();
        self.chunks.retain(|&id| id != chunk);
        before != self.chunks.len()
    }
}
