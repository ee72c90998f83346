//! Declarative pipeline definition files.
//!
//! # Example TOML
//!
//! ```toml
//! [pipeline]
//! name = "hlsl-to-mali"
//! description = "Compile HLSL to SPIR-V with dxc and analyse it for Mali GPUs"
//! language = "HLSL"
//!
//! [[pipeline.steps]]
//! tool = "dxc"
//! arguments = { OutputLanguage = "SPIR-V", EntryPoint = "PSMain" }
//!
//! [[pipeline.steps]]
//! tool = "mali"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;
use crate::pipeline::CompilationStep;

/// Top-level wrapper matching the TOML structure `[pipeline]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineFile {
    pub pipeline: PipelineDefinition,
}

/// A named, reusable list of compilation steps.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineDefinition {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Language of the source the pipeline expects, if fixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    pub steps: Vec<CompilationStep>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl PipelineFile {
    /// Parse a pipeline definition from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        toml::from_str(toml_str)
            .map_err(|e| PipelineError::InvalidDefinition(format!("TOML parse error: {}", e)))
    }

    /// Load a pipeline definition from a file path.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::InvalidDefinition(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file = Self::from_toml(&content)?;
        debug!(
            path = %path.display(),
            name = %file.pipeline.name,
            steps = file.pipeline.steps.len(),
            "Loaded pipeline definition"
        );
        Ok(file)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::InvalidDefinition(format!("TOML serialize error: {}", e)))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl PipelineDefinition {
    /// Structural checks that need no registry: a name, at least one step,
    /// and a tool name on every step.
    ///
    /// Tool existence and chaining are checked when the pipeline is planned.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.name.trim().is_empty() {
            return Err(PipelineError::InvalidDefinition(
                "Pipeline name cannot be empty".into(),
            ));
        }

        if self.steps.is_empty() {
            return Err(PipelineError::InvalidDefinition(
                "Pipeline must have at least one step".into(),
            ));
        }

        for (index, step) in self.steps.iter().enumerate() {
            if step.tool.trim().is_empty() {
                return Err(PipelineError::InvalidDefinition(format!(
                    "Step {} has no tool",
                    index
                )));
            }
        }

        if let Some(ref language) = self.language
            && language.trim().is_empty()
        {
            return Err(PipelineError::InvalidDefinition(
                "Pipeline language cannot be empty".into(),
            ));
        }

        Ok(())
    }
}
