//! Error types for the pipeline core.

use thiserror::Error;

use crate::parameter::ParameterError;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a pipeline run or reject a tool/pipeline definition.
///
/// The first four variants are configuration errors: they are raised before
/// (or instead of) running the offending step and always carry its index.
/// A tool that merely fails to compile its input is *not* an error here; see
/// [`crate::ToolError`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A step names a tool that is not registered.
    #[error("step {step_index}: unknown tool '{tool}'")]
    UnknownTool { step_index: usize, tool: String },

    /// A step's tool does not accept the language of the artifact it would receive.
    #[error(
        "step {step_index}: tool '{tool}' does not accept {got} input (expected one of: {})",
        .expected.join(", ")
    )]
    IncompatibleStage {
        step_index: usize,
        tool: String,
        got: String,
        expected: Vec<String>,
    },

    /// A raw argument could not be bound against the tool's parameter schema.
    #[error("step {step_index}: invalid arguments for tool '{tool}': {source}")]
    InvalidParameter {
        step_index: usize,
        tool: String,
        #[source]
        source: ParameterError,
    },

    /// A step that is followed by another step produced nothing to forward.
    #[error("step {step_index}: tool '{tool}' produced no pipeable output but is not the last step")]
    NoPipeableOutput { step_index: usize, tool: String },

    /// A tool descriptor was rejected at registration time.
    #[error("Invalid tool definition: {0}")]
    InvalidToolDefinition(String),

    /// A pipeline definition file could not be parsed or is malformed.
    #[error("Invalid pipeline definition: {0}")]
    InvalidDefinition(String),
}

impl PipelineError {
    /// Whether this error comes from a structurally invalid pipeline request.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool { .. }
                | Self::IncompatibleStage { .. }
                | Self::InvalidParameter { .. }
                | Self::NoPipeableOutput { .. }
        )
    }

    /// Index of the step that caused the error, if the error is tied to one.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            Self::UnknownTool { step_index, .. }
            | Self::IncompatibleStage { step_index, .. }
            | Self::InvalidParameter { step_index, .. }
            | Self::NoPipeableOutput { step_index, .. } => Some(*step_index),
            _ => None,
        }
    }
}
