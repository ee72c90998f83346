//! CLI command handlers.

pub mod config;
pub mod pipelines;
pub mod run;
pub mod tools;

use std::sync::Arc;

use anyhow::Result;
use shaderpipe_config::LoadedConfig;
use shaderpipe_core::{LoadEvent, PipelineLibrary, ToolRegistry};
use shaderpipe_tools::Toolchain;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration and where it came from.
    pub loaded: LoadedConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Toolchain built from the `[tools]` section.
    pub fn toolchain(&self) -> Arc<Toolchain> {
        Arc::new(Toolchain::from_config(&self.loaded.config.tools()))
    }

    /// Registry holding every built-in tool.
    pub fn registry(&self) -> Result<ToolRegistry> {
        Ok(shaderpipe_tools::default_registry(&self.loaded.config.tools())?)
    }

    /// Pipelines from `[pipelines] dir`; empty when unset.
    pub fn library(&self) -> (PipelineLibrary, Vec<LoadEvent>) {
        match self.loaded.config.pipelines().dir {
            Some(dir) => PipelineLibrary::load_dir(&dir),
            None => (PipelineLibrary::new(), Vec::new()),
        }
    }
}
