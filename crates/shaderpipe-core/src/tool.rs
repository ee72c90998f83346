//! Tool adapter contract.
//!
//! Every compiler, translator or disassembler is exposed through the
//! [`ShaderTool`] trait: a static [`ToolDescriptor`] (name, accepted input
//! languages, emitted languages, parameter schema) plus an async `compile`
//! operation.
//!
//! # Example
//!
//! ```rust,ignore
//! use shaderpipe_core::{ShaderTool, ToolDescriptor, ParameterSpec, StepResult, StepOutput};
//!
//! struct Upper { descriptor: ToolDescriptor }
//!
//! #[async_trait]
//! impl ShaderTool for Upper {
//!     fn descriptor(&self) -> &ToolDescriptor { &self.descriptor }
//!
//!     async fn compile(&self, input: &ShaderCode, _args: &BoundArguments)
//!         -> Result<StepResult, ToolError>
//!     {
//!         let text = input.as_text().unwrap_or_default().to_uppercase();
//!         Ok(StepResult::new(ShaderCode::text("GLSL", text.clone()),
//!                            vec![StepOutput::text("Output", Some("GLSL"), text)]))
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::ShaderCode;
use crate::parameter::{BoundArguments, ParameterSpec};
use crate::result::StepResult;

// ─────────────────────────────────────────────────────────────────────────────
// Tool Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure inside a single tool invocation.
///
/// These never abort a pipeline by themselves: the executor turns them into a
/// failure [`StepResult`] (see [`crate::report`]).
#[derive(Debug, Error)]
pub enum ToolError {
    /// The executable could not be started.
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The executable did not finish in time and was killed.
    #[error("'{program}' timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    /// Reading or writing a temp file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool exited successfully but did not write its output file.
    #[error("tool produced no output at {}", .0.display())]
    MissingOutput(PathBuf),

    /// The tool reported a failure; `diagnostics` holds its raw output.
    #[error("{diagnostics}")]
    Failed {
        exit_code: Option<i32>,
        diagnostics: String,
    },

    /// A schema parameter was not bound.
    #[error("missing argument '{0}'")]
    MissingArgument(String),

    /// A bound argument has a different type than the adapter expected.
    #[error("argument '{name}' is not a {expected}")]
    ArgumentType { name: String, expected: &'static str },
}

impl ToolError {
    /// Text shown to the user for this failure.
    ///
    /// Compiler failures are reported verbatim; everything else uses the
    /// error message.
    pub fn diagnostics(&self) -> String {
        match self {
            Self::Failed { diagnostics, .. } => diagnostics.clone(),
            other => other.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Descriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Static description of a tool's capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique registry key, e.g. `"dxc"`.
    pub name: String,
    /// Human-readable name, e.g. `"DirectX Shader Compiler"`.
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Languages the tool accepts as input.
    pub input_languages: Vec<String>,
    /// Languages the tool may emit as pipeable output. Empty for terminal tools.
    #[serde(default)]
    pub output_languages: Vec<String>,
    /// Parameter schema, in binding order.
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            input_languages: Vec::new(),
            output_languages: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_input_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Whether the tool accepts input in `language`.
    pub fn accepts(&self, language: &str) -> bool {
        self.input_languages.iter().any(|l| l == language)
    }

    /// Whether the tool never forwards an artifact.
    pub fn is_terminal(&self) -> bool {
        self.output_languages.is_empty()
    }

    /// Languages the tool will emit given these arguments.
    ///
    /// When the schema has an `OutputLanguage` parameter its bound value is
    /// the only possibility; otherwise every declared output language is.
    pub fn predicted_output_languages(&self, args: &BoundArguments) -> Vec<String> {
        let selected = self
            .parameters
            .iter()
            .find(|p| p.output_languages().is_some())
            .and_then(|p| args.string(&p.name).ok());

        match selected {
            Some(language) => vec![language.to_string()],
            None => self.output_languages.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A compiler, translator or disassembler usable as a pipeline step.
#[async_trait]
pub trait ShaderTool: Send + Sync {
    /// Static capabilities of this tool.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Run the tool on `input`.
    ///
    /// Return `Err` for any failure (bad source, missing executable, timeout);
    /// the executor reports it as a failed step instead of aborting the run.
    async fn compile(
        &self,
        input: &ShaderCode,
        args: &BoundArguments,
    ) -> Result<StepResult, ToolError>;

    /// Registry key.
    fn name(&self) -> &str {
        &self.descriptor().name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Tool (for testing)
// ─────────────────────────────────────────────────────────────────────────────

/// A configurable tool that records its invocations.
#[cfg(test)]
#[derive(Debug)]
pub struct MockTool {
    descriptor: ToolDescriptor,
    emits: Option<String>,
    fail_with: Option<String>,
    calls: std::sync::Mutex<Vec<ShaderCode>>,
}

#[cfg(test)]
impl MockTool {
    /// A tool accepting `inputs` and forwarding its input text as `emits`.
    pub fn new(name: &str, inputs: &[&str], emits: Option<&str>) -> Self {
        let descriptor = ToolDescriptor::new(name, name.to_uppercase())
            .with_input_languages(inputs.iter().copied())
            .with_output_languages(emits.into_iter());
        Self {
            descriptor,
            emits: emits.map(String::from),
            fail_with: None,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.descriptor = self.descriptor.with_parameter(parameter);
        self
    }

    /// Make every invocation fail with these diagnostics.
    pub fn failing(mut self, diagnostics: &str) -> Self {
        self.fail_with = Some(diagnostics.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl ShaderTool for MockTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn compile(
        &self,
        input: &ShaderCode,
        _args: &BoundArguments,
    ) -> Result<StepResult, ToolError> {
        self.calls.lock().unwrap().push(input.clone());

        if let Some(ref diagnostics) = self.fail_with {
            return Err(ToolError::Failed {
                exit_code: Some(1),
                diagnostics: diagnostics.clone(),
            });
        }

        let outputs = vec![crate::result::StepOutput::text(
            "Output",
            self.emits.as_deref(),
            format!("{} ran", self.descriptor.name),
        )];
        Ok(match self.emits {
            Some(ref language) => {
                StepResult::new(ShaderCode::binary(language.clone(), input.as_bytes()), outputs)
            }
            None => StepResult::terminal(outputs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::parameter::bind;

    fn dxc_like() -> ToolDescriptor {
        ToolDescriptor::new("dxc", "DXC")
            .with_input_languages(["HLSL"])
            .with_output_languages(["DXIL", "SPIR-V"])
            .with_parameter(ParameterSpec::string("EntryPoint", "main"))
            .with_parameter(ParameterSpec::output_language(["DXIL", "SPIR-V"], "DXIL"))
    }

    #[test]
    fn test_descriptor_accepts() {
        let d = dxc_like();
        assert!(d.accepts("HLSL"));
        assert!(!d.accepts("GLSL"));
        assert!(!d.is_terminal());
    }

    #[test]
    fn test_predicted_output_uses_selected_language() {
        let d = dxc_like();
        let raw = HashMap::from([("OutputLanguage".to_string(), "SPIR-V".to_string())]);
        let args = bind(&d.parameters, &raw).unwrap();
        assert_eq!(d.predicted_output_languages(&args), vec!["SPIR-V"]);
    }

    #[test]
    fn test_predicted_output_without_selector() {
        let d = ToolDescriptor::new("glslang", "glslang")
            .with_input_languages(["GLSL", "HLSL"])
            .with_output_languages(["SPIR-V"]);
        let args = bind(&d.parameters, &HashMap::new()).unwrap();
        assert_eq!(d.predicted_output_languages(&args), vec!["SPIR-V"]);
    }

    #[test]
    fn test_terminal_descriptor_predicts_nothing() {
        let d = ToolDescriptor::new("mali", "Mali").with_input_languages(["SPIR-V"]);
        assert!(d.is_terminal());
        assert!(d.predicted_output_languages(&BoundArguments::default()).is_empty());
    }

    #[test]
    fn test_failed_diagnostics_are_raw() {
        let err = ToolError::Failed {
            exit_code: Some(1),
            diagnostics: "shader.hlsl(3,1): error X3000".into(),
        };
        assert_eq!(err.diagnostics(), "shader.hlsl(3,1): error X3000");

        let err = ToolError::MissingArgument("EntryPoint".into());
        assert_eq!(err.diagnostics(), "missing argument 'EntryPoint'");
    }

    #[tokio::test]
    async fn test_mock_tool_records_calls() {
        let tool = MockTool::new("echo", &["HLSL"], Some("GLSL"));
        let result = tool
            .compile(&ShaderCode::text("HLSL", "x"), &BoundArguments::default())
            .await
            .unwrap();
        assert_eq!(tool.call_count(), 1);
        assert_eq!(result.pipeable_output.unwrap().language, "GLSL");
    }
}
