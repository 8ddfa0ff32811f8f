//! Serializable description of a compilation graph
//!
//! Modules are referenced by identifier, chunk groups reference chunks by
//! their position in `chunks`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::chunk::{Chunk, ChunkId};
use super::graph::{Compilation, Dependency, GraphError, Module, ModuleId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub modules: Vec<ModuleSnapshot>,

    #[serde(default)]
    pub chunks: Vec<ChunkSnapshot>,

    #[serde(default)]
    pub chunk_groups: Vec<ChunkGroupSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    pub id: String,

    /// Condition name, defaults to `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,

    /// Target module id; absent or unknown means unresolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub weak: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkGroupSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub chunks: Vec<usize>,
}

impl Compilation {
    /// Build a compilation from a snapshot
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, GraphError> {
        let mut compilation = Compilation::new();
        let mut ids: HashMap<&str, ModuleId> = HashMap::with_capacity(snapshot.modules.len());

        for module in &snapshot.modules {
            if ids.contains_key(module.id.as_str()) {
                return Err(GraphError::DuplicateModule(module.id.clone()));
            }
            let name = module.name.clone().unwrap_or_else(|| module.id.clone());
            let id = compilation.add_module(Module::new(module.id.as_str()).with_condition_name(Some(name)));
            ids.insert(module.id.as_str(), id);
        }

        for module in &snapshot.modules {
            let owner = ids[module.id.as_str()];
            for dep in &module.dependencies {
                let target = dep.module.as_deref().and_then(|id| ids.get(id).copied());
                let request = dep
                    .request
                    .clone()
                    .or_else(|| dep.module.clone())
                    .unwrap_or_default();
                compilation.add_dependency(
                    owner,
                    Dependency {
                        request,
                        module: target,
                        weak: dep.weak,
                    },
                )?;
            }
        }

        let mut chunk_ids = Vec::with_capacity(snapshot.chunks.len());
        for (index, chunk) in snapshot.chunks.iter().enumerate() {
            let chunk_id = compilation.add_chunk(Chunk::new(chunk.name.clone()));
            for module in &chunk.modules {
                let module_id = ids.get(module.as_str()).copied().ok_or_else(|| GraphError::UnknownModule {
                    chunk: chunk.name.clone().unwrap_or_else(|| format!("#{}", index)),
                    module: module.clone(),
                })?;
                compilation.connect_chunk_and_module(chunk_id, module_id)?;
            }
            chunk_ids.push(chunk_id);
        }

        for group in &snapshot.chunk_groups {
            let mut members: Vec<ChunkId> = Vec::with_capacity(group.chunks.len());
            for &index in &group.chunks {
                let chunk = chunk_ids.get(index).copied().ok_or_else(|| GraphError::UnknownChunk {
                    group: group.name.clone().unwrap_or_default(),
                    index,
                    count: chunk_ids.len(),
                })?;
                members.push(chunk);
            }
            compilation.add_chunk_group(group.name.clone(), &members)?;
        }

        Ok(compilation)
    }

    /// Describe the current graph; removed chunks are left out
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let modules = self
            .modules()
            .map(|(_, module)| ModuleSnapshot {
                id: module.identifier.clone(),
                name: module
                    .name_for_condition
                    .clone()
                    .filter(|name| *name != module.identifier),
                dependencies: module
                    .dependencies
                    .iter()
                    .map(|dep| {
                        let target = dep
                            .module
                            .and_then(|id| self.module(id))
                            .map(|m| m.identifier.clone());
                        DependencySnapshot {
                            request: Some(dep.request.clone())
                                .filter(|r| !r.is_empty() && Some(r) != target.as_ref()),
                            module: target,
                            weak: dep.weak,
                        }
                    })
                    .collect(),
            })
            .collect();

        let position: HashMap<ChunkId, usize> = self
            .chunk_ids()
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index))
            .collect();

        let chunks = self
            .chunks()
            .map(|(_, chunk)| ChunkSnapshot {
                name: chunk.name.clone(),
                modules: chunk
                    .modules()
                    .iter()
                    .filter_map(|&id| self.module(id))
                    .map(|m| m.identifier.clone())
                    .collect(),
            })
            .collect();

        let chunk_groups = self
            .chunk_groups()
            .map(|(_, group)| ChunkGroupSnapshot {
                name: group.name.clone(),
                chunks: group
                    .chunks()
                    .iter()
                    .filter_map(|id| position.get(id).copied())
                    .collect(),
            })
            .collect();

        GraphSnapshot {
            modules,
            chunks,
            chunk_groups,
        }
    }
}
