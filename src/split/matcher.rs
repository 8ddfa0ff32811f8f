//! Cache-group test evaluation

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::bundler::{Chunk, Compilation, Module, ModuleId};

type ModulePredicate = dyn Fn(&Module) -> bool + Send + Sync;
type ModuleChunksPredicate = dyn Fn(&Module, &[&Chunk]) -> bool + Send + Sync;

/// How a cache group decides whether a module belongs to it
#[derive(Clone, Default)]
pub enum Test {
    /// No test configured, every module matches
    #[default]
    Always,
    /// Predicate over the module alone
    Module(Arc<ModulePredicate>),
    /// Predicate over the module and the chunks it currently lives in
    ModuleAndChunks(Arc<ModuleChunksPredicate>),
    /// Fixed answer
    Bool(bool),
    /// Prefix of the condition name or of any current chunk name
    Prefix(String),
    /// Pattern found in the condition name or in any current chunk name
    Pattern(Regex),
    /// A test shape that is not understood; never matches
    Unsupported(String),
}

impl Test {
    pub fn module<F>(predicate: F) -> Self
    where
        F: Fn(&Module) -> bool + Send + Sync + 'static,
    {
        Test::Module(Arc::new(predicate))
    }

    pub fn module_and_chunks<F>(predicate: F) -> Self
    where
        F: Fn(&Module, &[&Chunk]) -> bool + Send + Sync + 'static,
    {
        Test::ModuleAndChunks(Arc::new(predicate))
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Test::Prefix(prefix.into())
    }

    /// Compile `pattern`, falling back to a never-matching test when invalid
    pub fn pattern(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => Test::Pattern(regex),
            Err(err) => Test::Unsupported(format!("invalid pattern '{}': {}", pattern, err)),
        }
    }

    /// Evaluate the test against a module of the compilation
    pub fn matches(&self, compilation: &Compilation, module_id: ModuleId) -> bool {
        let Some(module) = compilation.module(module_id) else {
            return false;
        };

        match self {
            Test::Always => true,
            Test::Module(predicate) => predicate(module),
            Test::ModuleAndChunks(predicate) => predicate(module, &compilation.chunks_of(module_id)),
            Test::Bool(value) => *value,
            Test::Prefix(prefix) => {
                module
                    .condition_name()
                    .is_some_and(|name| name.starts_with(prefix.as_str()))
                    || compilation
                        .chunks_of(module_id)
                        .iter()
                        .any(|chunk| chunk.name_starts_with(prefix))
            }
            Test::Pattern(regex) => {
                module.condition_name().is_some_and(|name| regex.is_match(name))
                    || compilation
                        .chunks_of(module_id)
                        .iter()
                        .any(|chunk| chunk.condition_name().is_some_and(|name| regex.is_match(name)))
            }
            Test::Unsupported(_) => false,
        }
    }
}

impl fmt::Debug for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Test::Always => f.write_str("Always"),
            Test::Module(_) => f.write_str("Module(<fn>)"),
            Test::ModuleAndChunks(_) => f.write_str("ModuleAndChunks(<fn>)"),
            Test::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Test::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Test::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Test::Unsupported(reason) => f.debug_tuple("Unsupported").field(reason).finish(),
        }
    }
}
