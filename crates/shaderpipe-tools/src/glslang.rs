//! Khronos glslang: GLSL or HLSL to SPIR-V.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use shaderpipe_core::language::{GLSL, HLSL, SPIRV};
use shaderpipe_core::{
    BoundArguments, ParameterSpec, ShaderCode, ShaderTool, StepOutput, StepResult, ToolDescriptor,
    ToolError,
};

use crate::common::{ENTRY_POINT, SHADER_STAGE, entry_point, shader_stage};
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;

pub const NAME: &str = "glslang";
pub const EXECUTABLE: &str = "glslangValidator";

pub const TARGET: &str = "Target";

const OUTPUT_FILE: &str = "shader.spv";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(NAME, "glslang")
        .with_description("Khronos reference front end for GLSL and HLSL, producing SPIR-V")
        .with_input_languages([GLSL, HLSL])
        .with_output_languages([SPIRV])
        .with_parameter(shader_stage())
        .with_parameter(
            ParameterSpec::choice(
                TARGET,
                ["Vulkan 1.0", "Vulkan 1.1", "Vulkan 1.2", "OpenGL"],
                "Vulkan 1.0",
            )
            .with_description("Client API the SPIR-V is generated for"),
        )
        .with_parameter(entry_point("main"))
}

/// Command line for compiling `input` (in `language`) to `output`.
///
/// `-H` makes glslang print the human-readable module on stdout.
pub fn build_args(
    args: &BoundArguments,
    language: &str,
    input: &Path,
    output: &Path,
) -> Result<Vec<OsString>, ToolError> {
    let mut cmd: Vec<OsString> = Vec::new();

    match args.string(TARGET)? {
        "OpenGL" => {
            cmd.push("-G".into());
            cmd.push("--target-env".into());
            cmd.push("opengl".into());
        }
        vulkan => {
            let version = vulkan.trim_start_matches("Vulkan ");
            cmd.push("-V".into());
            cmd.push("--target-env".into());
            cmd.push(format!("vulkan{version}").into());
        }
    }

    cmd.push("-S".into());
    cmd.push(args.string(SHADER_STAGE)?.into());

    if language == HLSL {
        cmd.push("-D".into());
        cmd.push("-e".into());
        cmd.push(args.string(ENTRY_POINT)?.into());
    }

    cmd.push("-H".into());
    cmd.push("-o".into());
    cmd.push(output.into());
    cmd.push(input.into());
    Ok(cmd)
}

/// glslang adapter.
#[derive(Debug)]
pub struct Glslang {
    descriptor: ToolDescriptor,
    toolchain: Arc<Toolchain>,
}

impl Glslang {
    pub fn new(toolchain: Arc<Toolchain>) -> Self {
        Self {
            descriptor: descriptor().with_parameter(toolchain.version_parameter(NAME)),
            toolchain,
        }
    }
}

#[async_trait]
impl ShaderTool for Glslang {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn compile(
        &self,
        input: &ShaderCode,
        args: &BoundArguments,
    ) -> Result<StepResult, ToolError> {
        let ws = Workspace::with_input(input).await?;
        let cmd_args = build_args(args, &input.language, ws.input(), &ws.path(OUTPUT_FILE))?;

        let output = self
            .toolchain
            .runner()
            .run(&self.toolchain.program(NAME, EXECUTABLE, args)?, cmd_args, ws.root())
            .await?
            .check()?;

        let module = ws.read_bytes(OUTPUT_FILE).await?;

        Ok(StepResult::new(
            ShaderCode::binary(SPIRV, module),
            vec![StepOutput::text("Disassembly", Some(SPIRV), output.stdout)],
        ))
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
        build_args(&args, language, Path::new("in"), Path::new("out.spv"))
            .unwrap()
            .into_iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_glsl_vulkan_defaults() {
        assert_eq!(
            line(&[], GLSL),
            vec![
                "-V",
                "--target-env",
                "vulkan1.0",
                "-S",
                "frag",
                "-H",
                "-o",
                "out.spv",
                "in"
            ]
        );
    }

    #[test]
    fn test_hlsl_input_sets_entry_point() {
        let cmd = line(
            &[("EntryPoint", "PSMain"), ("Target", "Vulkan 1.2")],
            HLSL,
        );
        assert!(cmd.contains(&"vulkan1.2".to_string()));
        let pos = cmd.iter().position(|s| s == "-D").unwrap();
        assert_eq!(&cmd[pos..pos + 3], ["-D", "-e", "PSMain"]);
    }

    #[test]
    fn test_opengl_target() {
        let cmd = line(&[("Target", "OpenGL"), ("ShaderStage", "comp")], GLSL);
        assert_eq!(&cmd[..5], ["-G", "--target-env", "opengl", "-S", "comp"]);
    }
}
