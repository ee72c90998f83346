//! Step executor.

use std::time::Instant;

use tracing::{debug, warn};

use crate::artifact::ShaderCode;
use crate::parameter::BoundArguments;
use crate::report::failure_result;
use crate::result::StepResult;
use crate::tool::ShaderTool;

/// Run one tool on one artifact.
///
/// Never fails: a tool error becomes a failure result (see
/// [`crate::report::failure_result`]). The caller is responsible for checking
/// that `tool` accepts `input.language` beforehand.
pub async fn execute(
    tool: &dyn ShaderTool,
    input: &ShaderCode,
    args: &BoundArguments,
    step_index: usize,
) -> StepResult {
    let start = Instant::now();
    debug!(
        step = step_index,
        tool = %tool.name(),
        language = %input.language,
        input_bytes = input.payload.len(),
        "Executing step"
    );

    match tool.compile(input, args).await {
        Ok(result) => {
            debug!(
                step = step_index,
                tool = %tool.name(),
                elapsed = ?start.elapsed(),
                output_language = ?result.pipeable_output.as_ref().map(|c| &c.language),
                outputs = result.outputs.len(),
                "Step completed"
            );
            result
        }
        Err(e) => {
            warn!(
                step = step_index,
                tool = %tool.name(),
                elapsed = ?start.elapsed(),
                error = %e,
                "Step failed"
            );
            failure_result(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::MockTool;

    #[tokio::test]
    async fn test_execute_success() {
        let tool = MockTool::new("dxc", &["HLSL"], Some("SPIR-V"));
        let result = execute(
            &tool,
            &ShaderCode::text("HLSL", "void main() {}"),
            &BoundArguments::default(),
            0,
        )
        .await;

        assert_eq!(result.pipeable_output.as_ref().unwrap().language, "SPIR-V");
        assert!(!result.has_errors());
        assert_eq!(tool.call_count(), 1);
    }

    #[tokio::test]
    async fn test_execute_failure_becomes_result() {
        let tool = MockTool::new("fxc", &["HLSL"], Some("DXBC")).failing("error X3000: syntax error");
        let result = execute(
            &tool,
            &ShaderCode::text("HLSL", "garbage"),
            &BoundArguments::default(),
            3,
        )
        .await;

        assert!(!result.is_pipeable());
        assert_eq!(result.error_text().unwrap(), "error X3000: syntax error");
    }
}
