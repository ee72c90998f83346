//! Error reporter: turns tool failures into ordinary step results.

use crate::result::{StepOutput, StepResult};
use crate::tool::ToolError;

/// Build the failure result for a tool that could not produce output.
///
/// The result carries no pipeable output and exactly one error entry holding
/// the raw diagnostics, so a pipeline that needs to continue past this step
/// stops with `NoPipeableOutput`.
pub fn failure_result(error: &ToolError) -> StepResult {
    StepResult::terminal(vec![StepOutput::error(error.diagnostics())]).with_selected_output(0)
}
