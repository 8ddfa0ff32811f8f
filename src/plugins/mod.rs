//! Plugin system
//!
//! Plugins hook into the lifecycle of each compilation. A plugin hands out one
//! hook object per compilation, so any state it keeps is scoped to that
//! compilation.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::bundler::Compilation;

/// Plugin trait - implement this to take part in compilations
pub trait Plugin: Send + Sync {
    /// Plugin name for logging and debugging
    fn name(&self) -> &str;

    /// Called when a compilation starts; returns the hooks for that compilation
    fn this_compilation(&self) -> Option<Box<dyn CompilationHooks>> {
        None
    }
}

/// Per-compilation hooks
pub trait CompilationHooks: Send {
    /// The compilation was unsealed and will be optimized again
    fn unseal(&mut self, _compilation: &mut Compilation) {}

    /// Chunk optimization finished
    fn after_optimize_chunks(&mut self, _compilation: &mut Compilation) -> Result<()> {
        Ok(())
    }
}

/// Plugin manager
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    /// Create a new plugin manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Names of registered plugins
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Start a compilation, collecting hooks from every plugin
    pub fn compilation(&self, compilation: Compilation) -> CompilationSession {
        let hooks = self
            .plugins
            .iter()
            .filter_map(|plugin| {
                let hooks = plugin.this_compilation()?;
                debug!("Plugin '{}' attached to compilation", plugin.name());
                Some(hooks)
            })
            .collect();

        CompilationSession { compilation, hooks }
    }
}

/// A compilation together with the hooks attached to it
pub struct CompilationSession {
    compilation: Compilation,
    hooks: Vec<Box<dyn CompilationHooks>>,
}

impl CompilationSession {
    pub fn compilation(&self) -> &Compilation {
        &self.compilation
    }

    pub fn compilation_mut(&mut self) -> &mut Compilation {
        &mut self.compilation
    }

    /// Run unseal hooks
    pub fn unseal(&mut self) {
        for hooks in &mut self.hooks {
            hooks.unseal(&mut self.compilation);
        }
    }

    /// Run after_optimize_chunks hooks
    pub fn after_optimize_chunks(&mut self) -> Result<()> {
        for hooks in &mut self.hooks {
            hooks.after_optimize_chunks(&mut self.compilation)?;
        }
        Ok(())
    }

    pub fn into_compilation(self) -> Compilation {
        self.compilation
    }
}
