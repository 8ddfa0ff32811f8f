//! Module graph data structures

use thiserror::Error;

use super::chunk::{Chunk, ChunkGroup, ChunkGroupId, ChunkId};

/// Unique identifier for a module
pub type ModuleId = usize;

/// Errors raised while assembling a compilation graph
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("module '{0}' is declared more than once")]
    DuplicateModule(String),

    #[error("chunk '{chunk}' references unknown module '{module}'")]
    UnknownModule { chunk: String, module: String },

    #[error("chunk group '{group}' references chunk #{index}, but only {count} chunk(s) exist")]
    UnknownChunk {
        group: String,
        index: usize,
        count: usize,
    },

    #[error("module id {0} is out of range")]
    ModuleOutOfRange(ModuleId),

    #[error("chunk id {0} is out of range")]
    ChunkOutOfRange(ChunkId),
}

/// A directed reference from one module to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Import specifier as written in the source
    pub request: String,

    /// Module the request resolved to, `None` for missing or external modules
    pub module: Option<ModuleId>,

    /// Weak references carry no placement obligations
    pub weak: bool,
}

impl Dependency {
    /// A strong edge to `module`
    pub fn strong(request: impl Into<String>, module: ModuleId) -> Self {
        Self {
            request: request.into(),
            module: Some(module),
            weak: false,
        }
    }

    /// A weak edge to `module`
    pub fn weak(request: impl Into<String>, module: ModuleId) -> Self {
        Self {
            request: request.into(),
            module: Some(module),
            weak: true,
        }
    }

    /// An edge whose request did not resolve to any module
    pub fn unresolved(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            module: None,
            weak: false,
        }
    }
}

/// What a dependency edge points at, as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyReference {
    pub module: Option<ModuleId>,
    pub weak: bool,
}

/// A module in the build graph
#[derive(Debug, Clone)]
pub struct Module {
    /// Stable identifier (usually the resolved request)
    pub identifier: String,

    /// Name used by string and pattern rules, typically the resource path
    pub name_for_condition: Option<String>,

    /// Outgoing dependency edges
    pub dependencies: Vec<Dependency>,

    /// Chunks containing this module, in connection order
    pub(crate) chunks: Vec<ChunkId>,
}

impl Module {
    /// Create a module whose condition name equals its identifier
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            name_for_condition: Some(identifier.clone()),
            identifier,
            dependencies: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// Override the condition name
    pub fn with_condition_name(mut self, name: Option<String>) -> Self {
        self.name_for_condition = name;
        self
    }

    /// Name seen by string and pattern rules; an empty name counts as no name
    pub fn condition_name(&self) -> Option<&str> {
        self.name_for_condition.as_deref().filter(|name| !name.is_empty())
    }

    /// Chunks this module currently belongs to
    pub fn chunks(&self) -> &[ChunkId] {
        &self.chunks
    }
}

/// The graph of one build: modules, chunks and chunk groups
///
/// Modules and chunks live in arenas indexed by their ids. Removing a chunk
/// only drops it from the live chunk list, so ids stay stable for the whole
/// compilation.
#[derive(Debug, Default)]
pub struct Compilation {
    modules: Vec<Module>,
    chunk_store: Vec<Chunk>,
    chunks: Vec<ChunkId>,
    chunk_groups: Vec<ChunkGroup>,
}

impl Compilation {
    /// Create a new empty compilation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module to the graph
    pub fn add_module(&mut self, mut module: Module) -> ModuleId {
        module.chunks.clear();
        self.modules.push(module);
        self.modules.len() - 1
    }

    /// Add a dependency edge to an existing module
    pub fn add_dependency(&mut self, from: ModuleId, dependency: Dependency) -> Result<(), GraphError> {
        let module = self
            .modules
            .get_mut(from)
            .ok_or(GraphError::ModuleOutOfRange(from))?;
        module.dependencies.push(dependency);
        Ok(())
    }

    /// Add a chunk to the live chunk list
    pub fn add_chunk(&mut self, chunk: Chunk) -> ChunkId {
        let id = self.chunk_store.len();
        self.chunk_store.push(Chunk {
            modules: Vec::new(),
            groups: Vec::new(),
            ..chunk
        });
        self.chunks.push(id);
        id
    }

    /// Add a chunk group listing the given chunks
    pub fn add_chunk_group(&mut self, name: Option<String>, chunks: &[ChunkId]) -> Result<ChunkGroupId, GraphError> {
        let id = self.chunk_groups.len();
        let mut group = ChunkGroup::new(name);
        for &chunk in chunks {
            let stored = self
                .chunk_store
                .get_mut(chunk)
                .ok_or(GraphError::ChunkOutOfRange(chunk))?;
            stored.add_group(id);
            group.push_chunk(chunk);
        }
        self.chunk_groups.push(group);
        Ok(id)
    }

    /// Get a module by ID
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id)
    }

    /// All modules with their IDs, in insertion order
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules.iter().enumerate()
    }

    /// Find a module by identifier
    pub fn module_by_identifier(&self, identifier: &str) -> Option<ModuleId> {
        self.modules.iter().position(|m| m.identifier == identifier)
    }

    /// Get a chunk by ID, including chunks already removed from the build
    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunk_store.get(id)
    }

    /// Live chunk IDs, in insertion order
    pub fn chunk_ids(&self) -> &[ChunkId] {
        &self.chunks
    }

    /// Live chunks with their IDs
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> {
        self.chunks.iter().map(|&id| (id, &self.chunk_store[id]))
    }

    /// Number of live chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks containing `module`
    pub fn chunks_of(&self, module: ModuleId) -> Vec<&Chunk> {
        self.module(module)
            .map(|m| m.chunks.iter().map(|&id| &self.chunk_store[id]).collect())
            .unwrap_or_default()
    }

    /// Display name for a chunk
    pub fn chunk_label(&self, id: ChunkId) -> String {
        self.chunk(id)
            .and_then(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    }

    /// All chunk groups with their IDs
    pub fn chunk_groups(&self) -> impl Iterator<Item = (ChunkGroupId, &ChunkGroup)> {
        self.chunk_groups.iter().enumerate()
    }

    /// Look up what the `index`-th dependency of `owner` refers to
    pub fn dependency_reference(&self, owner: ModuleId, index: usize) -> Option<DependencyReference> {
        let dep = self.module(owner)?.dependencies.get(index)?;
        Some(DependencyReference {
            module: dep.module.filter(|&id| id < self.modules.len()),
            weak: dep.weak,
        })
    }

    /// Connect a module and a chunk on both sides
    pub fn connect_chunk_and_module(&mut self, chunk: ChunkId, module: ModuleId) -> Result<bool, GraphError> {
        if module >= self.modules.len() {
            return Err(GraphError::ModuleOutOfRange(module));
        }
        let stored = self
            .chunk_store
            .get_mut(chunk)
            .ok_or(GraphError::ChunkOutOfRange(chunk))?;
        if !stored.add_module(module) {
            return Ok(false);
        }
        self.modules[module].chunks.push(chunk);
        Ok(true)
    }

    /// Disconnect a module and a chunk on both sides
    pub fn disconnect_chunk_and_module(&mut self, chunk: ChunkId, module: ModuleId) -> Result<bool, GraphError> {
        if module >= self.modules.len() {
            return Err(GraphError::ModuleOutOfRange(module));
        }
        let stored = self
            .chunk_store
            .get_mut(chunk)
            .ok_or(GraphError::ChunkOutOfRange(chunk))?;
        if !stored.remove_module(module) {
            return Ok(false);
        }
        self.modules[module].chunks.retain(|&id| id != chunk);
        Ok(true)
    }

    /// Remove a chunk from a chunk group on both sides
    pub fn remove_chunk_from_group(&mut self, group: ChunkGroupId, chunk: ChunkId) -> bool {
        let Some(chunk_group) = self.chunk_groups.get_mut(group) else {
            return false;
        };
        let removed = chunk_group.remove_chunk(chunk);
        if let Some(stored) = self.chunk_store.get_mut(chunk) {
            stored.remove_group(group);
        }
        removed
    }

    /// Drop chunks from the live chunk list
    pub fn remove_chunks(&mut self, removed: &[ChunkId]) {
        self.chunks.retain(|id| !removed.contains(id));
    }

    /// Total number of modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if graph is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
