//! Cache groups: ordered matching rules

use crate::bundler::{Compilation, ModuleId};

use super::matcher::Test;

/// Chunk names a cache group pins its modules to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkSelector {
    Name(String),
    Names(Vec<String>),
}

impl ChunkSelector {
    pub fn contains(&self, name: &str) -> bool {
        match self {
            ChunkSelector::Name(expected) => expected == name,
            ChunkSelector::Names(names) => names.iter().any(|n| n == name),
        }
    }
}

/// A user-declared rule
#[derive(Debug, Clone)]
pub struct CacheGroup {
    pub name: String,
    pub test: Test,
    /// Explicit destination chunks; when absent the destination is inferred
    /// from the chunks of dependent modules
    pub chunks: Option<ChunkSelector>,
}

impl CacheGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test: Test::Always,
            chunks: None,
        }
    }

    pub fn with_test(mut self, test: Test) -> Self {
        self.test = test;
        self
    }

    pub fn with_chunks(mut self, chunks: ChunkSelector) -> Self {
        self.chunks = Some(chunks);
        self
    }
}

/// Cache groups in declaration order
#[derive(Debug, Clone, Default)]
pub struct CacheGroups {
    groups: Vec<CacheGroup>,
}

impl CacheGroups {
    pub fn new(groups: Vec<CacheGroup>) -> Self {
        Self { groups }
    }

    /// First group whose test matches `module`, with its position
    pub fn resolve(&self, compilation: &Compilation, module: ModuleId) -> Option<(usize, &CacheGroup)> {
        self.groups
            .iter()
            .enumerate()
            .find(|(_, group)| group.test.matches(compilation, module))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheGroup> {
        self.groups.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CacheGroup> {
        self.groups.get(index)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<CacheGroup> for CacheGroups {
    fn from_iter<I: IntoIterator<Item = CacheGroup>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::Module;

    #[test]
    fn test_first_match_wins() {
        let mut compilation = Compilation::new();
        let lib = compilation.add_module(Module::new("node_modules/lib/index.js"));
        let app = compilation.add_module(Module::new("src/app.js"));

        let groups: CacheGroups = [
            CacheGroup::new("libs").with_test(Test::prefix("node_modules")),
            CacheGroup::new("all").with_test(Test::Bool(true)),
            CacheGroup::new("lib-again").with_test(Test::pattern("lib")),
        ]
        .into_iter()
        .collect();

        assert_eq!(groups.resolve(&compilation, lib).map(|(i, g)| (i, g.name.as_str())), Some((0, "libs")));
        assert_eq!(groups.resolve(&compilation, app).map(|(i, g)| (i, g.name.as_str())), Some((1, "all")));
    }

    #[test]
    fn test_no_groups_no_match() {
        let mut compilation = Compilation::new();
        let app = compilation.add_module(Module::new("src/app.js"));
        assert!(CacheGroups::default().resolve(&compilation, app).is_none());

        let groups = CacheGroups::new(vec![CacheGroup::new("never").with_test(Test::Bool(false))]);
        assert!(groups.resolve(&compilation, app).is_none());
    }

    #[test]
    fn test_selector_contains() {
        assert!(ChunkSelector::Name("vendor".to_string()).contains("vendor"));
        assert!(!ChunkSelector::Name("vendor".to_string()).contains("vendors"));
        let names = ChunkSelector::Names(vec!["a".to_string(), "b".to_string()]);
        assert!(names.contains("b"));
        assert!(!names.contains("c"));
    }
}
