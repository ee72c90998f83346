//! Arm Mali Offline Compiler: performance report for GLSL or SPIR-V.
//!
//! Diagnostic only: the report is an output, never a pipeable artifact.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use shaderpipe_core::language::{GLSL, SPIRV};
use shaderpipe_core::{
    BoundArguments, ParameterSpec, ShaderCode, ShaderTool, StepOutput, StepResult, ToolDescriptor,
    ToolError,
};

use crate::common::{ENTRY_POINT, SHADER_STAGE, entry_point, shader_stage};
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;

pub const NAME: &str = "mali";
pub const EXECUTABLE: &str = "malioc";

pub const CORE: &str = "Core";

const CORES: [&str; 10] = [
    "Mali-G31", "Mali-G51", "Mali-G52", "Mali-G57", "Mali-G71", "Mali-G72", "Mali-G76",
    "Mali-G77", "Mali-G78", "Mali-G710",
];

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(NAME, "Mali Offline Compiler")
        .with_description("Arm's static performance analyzer for Mali GPUs")
        .with_input_languages([GLSL, SPIRV])
        .with_parameter(shader_stage())
        .with_parameter(ParameterSpec::choice(CORE, CORES, "Mali-G72").with_description("Target GPU"))
        .with_parameter(entry_point("main"))
}

fn stage_flag(stage: &str) -> &'static str {
    match stage {
        "vert" => "--vertex",
        "tesc" => "--tessellation_control",
        "tese" => "--tessellation_evaluation",
        "geom" => "--geometry",
        "comp" => "--compute",
        _ => "--fragment",
    }
}

/// Command line for analysing `input` (in `language`).
pub fn build_args(
    args: &BoundArguments,
    language: &str,
    input: &Path,
) -> Result<Vec<OsString>, ToolError> {
    let mut cmd: Vec<OsString> = vec![
        "--core".into(),
        args.string(CORE)?.into(),
        stage_flag(args.string(SHADER_STAGE)?).into(),
    ];

    if language == SPIRV {
        cmd.push("--spirv".into());
        cmd.push("--name".into());
        cmd.push(args.string(ENTRY_POINT)?.into());
    }

    cmd.push(input.into());
    Ok(cmd)
}

/// Mali Offline Compiler adapter.
#[derive(Debug)]
pub struct Mali {
    descriptor: ToolDescriptor,
    toolchain: Arc<Toolchain>,
}

impl Mali {
    pub fn new(toolchain: Arc<Toolchain>) -> Self {
        Self {
            descriptor: descriptor().with_parameter(toolchain.version_parameter(NAME)),
            toolchain,
        }
    }
}

#[async_trait]
impl ShaderTool for Mali {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn compile(
        &self,
        input: &ShaderCode,
        args: &BoundArguments,
    ) -> Result<StepResult, ToolError> {
        let ws = Workspace::with_input(input).await?;
        let cmd_args = build_args(args, &input.language, ws.input())?;

        let output = self
            .toolchain
            .runner()
            .run(&self.toolchain.program(NAME, EXECUTABLE, args)?, cmd_args, ws.root())
            .await?
            .check()?;

        Ok(StepResult::terminal(vec![StepOutput::text(
            "Output",
            None,
            output.stdout,
        )]))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use shaderpipe_core::bind;

    use super::*;

    fn line(pairs: &[(&str, &str)], language: &str) -> Vec<String> {
        let raw: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let args = bind(&descriptor().parameters, &raw).unwrap();
        build_args(&args, language, Path::new("in"))
            .unwrap()
            .into_iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_glsl_fragment() {
        assert_eq!(line(&[], GLSL), vec!["--core", "Mali-G72", "--fragment", "in"]);
    }

    #[test]
    fn test_spirv_vertex_with_entry() {
        assert_eq!(
            line(
                &[("ShaderStage", "vert"), ("Core", "Mali-G76"), ("EntryPoint", "VSMain")],
                SPIRV
            ),
            vec!["--core", "Mali-G76", "--vertex", "--spirv", "--name", "VSMain", "in"]
        );
    }

    #[test]
    fn test_is_terminal() {
        assert!(descriptor().is_terminal());
    }
}
