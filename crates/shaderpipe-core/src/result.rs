//! Per-step results.
//!
//! A step yields two channels: the *pipeable* artifact that the next step
//! consumes, and an ordered list of auxiliary outputs meant for a human
//! (disassembly, AST dumps, error text). Diagnostic-only tools leave the
//! pipeable channel empty.

use serde::{Deserialize, Serialize};

use crate::artifact::{CodeType, Payload, ShaderCode};

/// Whether an auxiliary output is a regular result or an error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Output,
    Error,
}

/// A non-forwarded output of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutput {
    /// Label shown to the user, e.g. `"Disassembly"`.
    pub display_name: String,
    /// Language of the content, when it is code in a known language.
    pub language: Option<String>,
    pub value: Payload,
    pub kind: OutputKind,
}

impl StepOutput {
    pub fn text(
        display_name: impl Into<String>,
        language: Option<&str>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            language: language.map(String::from),
            value: Payload::Text(text.into()),
            kind: OutputKind::Output,
        }
    }

    pub fn binary(
        display_name: impl Into<String>,
        language: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            language: language.map(String::from),
            value: Payload::Binary(bytes.into()),
            kind: OutputKind::Output,
        }
    }

    /// An error report carrying raw diagnostic text.
    pub fn error(diagnostics: impl Into<String>) -> Self {
        Self {
            display_name: "Errors".to_string(),
            language: None,
            value: Payload::Text(diagnostics.into()),
            kind: OutputKind::Error,
        }
    }

    pub fn code_type(&self) -> CodeType {
        self.value.code_type()
    }

    pub fn is_error(&self) -> bool {
        self.kind == OutputKind::Error
    }
}

/// Everything one step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Artifact eligible to feed the next step.
    pub pipeable_output: Option<ShaderCode>,
    /// Auxiliary outputs in display order.
    pub outputs: Vec<StepOutput>,
    /// Index into `outputs` a viewer should show first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_output: Option<usize>,
}

impl StepResult {
    /// A result that forwards `pipeable` to the next step.
    pub fn new(pipeable: ShaderCode, outputs: Vec<StepOutput>) -> Self {
        Self {
            pipeable_output: Some(pipeable),
            outputs,
            selected_output: None,
        }
    }

    /// A result with nothing to forward (diagnostic-only tools).
    pub fn terminal(outputs: Vec<StepOutput>) -> Self {
        Self {
            pipeable_output: None,
            outputs,
            selected_output: None,
        }
    }

    /// Mark which output a viewer should show first. Out-of-range indices are ignored.
    pub fn with_selected_output(mut self, index: usize) -> Self {
        if index < self.outputs.len() {
            self.selected_output = Some(index);
        }
        self
    }

    pub fn is_pipeable(&self) -> bool {
        self.pipeable_output.is_some()
    }

    /// Whether any auxiliary output is an error report.
    pub fn has_errors(&self) -> bool {
        self.outputs.iter().any(StepOutput::is_error)
    }

    /// Concatenated text of all error outputs.
    pub fn error_text(&self) -> Option<String> {
        let errors: Vec<&str> = self
            .outputs
            .iter()
            .filter(|o| o.is_error())
            .filter_map(|o| o.value.as_text())
            .collect();
        if errors.is_empty() {
            None
        } else {
            Some(errors.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeable_result() {
        let result = StepResult::new(
            ShaderCode::binary("SPIR-V", vec![1, 2, 3]),
            vec![StepOutput::text("Disassembly", Some("SPIR-V"), "OpCapability Shader")],
        );
        assert!(result.is_pipeable());
        assert!(!result.has_errors());
        assert!(result.error_text().is_none());
        assert_eq!(result.outputs[0].code_type(), CodeType::Text);
    }

    #[test]
    fn test_terminal_result() {
        let result = StepResult::terminal(vec![StepOutput::text("Output", None, "cycles: 4")]);
        assert!(!result.is_pipeable());
        assert_eq!(result.outputs[0].language, None);
    }

    #[test]
    fn test_selected_output_bounds() {
        let outputs = vec![
            StepOutput::binary("Object", Some("DXBC"), vec![0u8; 4]),
            StepOutput::text("Disassembly", Some("DXBC"), "ps_5_0"),
        ];
        let result = StepResult::terminal(outputs.clone()).with_selected_output(1);
        assert_eq!(result.selected_output, Some(1));

        let result = StepResult::terminal(outputs).with_selected_output(5);
        assert_eq!(result.selected_output, None);
    }

    #[test]
    fn test_error_text_joins_errors() {
        let result = StepResult::terminal(vec![
            StepOutput::text("Output", None, "partial"),
            StepOutput::error("error X3000: syntax error"),
            StepOutput::error("compilation failed"),
        ]);
        assert!(result.has_errors());
        assert_eq!(
            result.error_text().unwrap(),
            "error X3000: syntax error\ncompilation failed"
        );
    }
}
