//! chunksplit library
//!
//! Moves modules between the output chunks of a build according to
//! declarative cache groups, then drops chunks left empty.

pub mod bundler;
pub mod cli;
pub mod config;
pub mod plugins;
pub mod split;
pub mod utils;

pub use bundler::Compilation;
pub use cli::Cli;
pub use config::Config;
pub use split::SplitModuleChunks;
