//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use toml::Value;
use tracing::warn;

use crate::split::{CacheGroup, ChunkSelector, Test};

/// Project metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
        }
    }
}

fn default_name() -> String {
    "app".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Turn the raw `cache_groups` value into rules, keeping declaration order
///
/// Anything other than a table yields no rules.
pub fn cache_groups_from_value(value: Option<&Value>) -> Vec<CacheGroup> {
    let table = match value {
        None => return Vec::new(),
        Some(Value::Table(table)) => table,
        Some(other) => {
            warn!("cache_groups must be a table, found {}; no cache group applies", other.type_str());
            return Vec::new();
        }
    };

    table
        .iter()
        .map(|(name, rule)| cache_group_from_value(name, rule))
        .collect()
}

fn cache_group_from_value(name: &str, rule: &Value) -> CacheGroup {
    let group = CacheGroup::new(name);

    let Value::Table(rule) = rule else {
        warn!("cache group '{}' must be a table, found {}", name, rule.type_str());
        return group.with_test(Test::Unsupported(format!("rule is a {}", rule.type_str())));
    };

    let test = rule.get("test").map_or(Test::Always, test_from_value);
    if let Test::Unsupported(reason) = &test {
        warn!("cache group '{}' never matches: {}", name, reason);
    }

    let group = group.with_test(test);
    match rule.get("chunks") {
        None => group,
        Some(chunks) => group.with_chunks(chunks_from_value(name, chunks)),
    }
}

/// `true`/`false`, a prefix string, or `{ regex = "..." }` / `{ prefix = "..." }`
pub fn test_from_value(value: &Value) -> Test {
    match value {
        Value::Boolean(b) => Test::Bool(*b),
        Value::String(prefix) => Test::prefix(prefix.as_str()),
        Value::Table(table) => match (table.get("regex"), table.get("prefix")) {
            (Some(Value::String(pattern)), None) => Test::pattern(pattern),
            (None, Some(Value::String(prefix))) => Test::prefix(prefix.as_str()),
            _ => Test::Unsupported("test table needs exactly one of `regex` or `prefix`".to_string()),
        },
        other => Test::Unsupported(format!("test cannot be a {}", other.type_str())),
    }
}

/// A chunk name or a list of chunk names
///
/// Once `chunks` is present the group never falls back to inference: items
/// that are not strings are dropped, and any other shape selects no chunk.
pub fn chunks_from_value(group: &str, value: &Value) -> ChunkSelector {
    match value {
        Value::String(name) => ChunkSelector::Name(name.clone()),
        Value::Array(items) => {
            let names: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let name = item.as_str().map(str::to_string);
                    if name.is_none() {
                        warn!(
                            "cache group '{}': ignoring chunk name that is a {}",
                            group,
                            item.type_str()
                        );
                    }
                    name
                })
                .collect();
            ChunkSelector::Names(names)
        }
        other => {
            warn!(
                "cache group '{}': chunks must be a string or a list of strings, found {}; no chunk is selected",
                group,
                other.type_str()
            );
            ChunkSelector::Names(Vec::new())
        }
    }
}
