//! SPIRV-Cross: SPIR-V back to GLSL, HLSL or Metal source.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use shaderpipe_core::language::{GLSL, HLSL, METAL, SPIRV};
use shaderpipe_core::{
    BoundArguments, OUTPUT_LANGUAGE, ParameterSpec, ShaderCode, ShaderTool, StepOutput, StepResult,
    ToolDescriptor, ToolError,
};

use crate::common::{ENTRY_POINT, entry_point};
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;

pub const NAME: &str = "spirv-cross";
pub const EXECUTABLE: &str = "spirv-cross";

pub const GLSL_VERSION: &str = "GlslVersion";
pub const GLSL_ES: &str = "GlslEs";
pub const HLSL_SHADER_MODEL: &str = "HlslShaderModel";

const OUTPUT_FILE: &str = "shader.out";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(NAME, "SPIRV-Cross")
        .with_description("Khronos SPIR-V decompiler targeting GLSL, HLSL and Metal")
        .with_input_languages([SPIRV])
        .with_output_languages([GLSL, HLSL, METAL])
        .with_parameter(ParameterSpec::integer_in(GLSL_VERSION, 100, 460, 450))
        .with_parameter(
            ParameterSpec::boolean(GLSL_ES, false).with_description("Emit GLSL ES"),
        )
        .with_parameter(
            ParameterSpec::integer_in(HLSL_SHADER_MODEL, 30, 66, 50)
                .with_description("HLSL shader model, e.g. 50 for SM 5.0"),
        )
        // Empty selects the module's only entry point.
        .with_parameter(entry_point(""))
        .with_parameter(ParameterSpec::output_language([GLSL, HLSL, METAL], GLSL))
}

/// Command line for translating `input` into `output`.
pub fn build_args(
    args: &BoundArguments,
    input: &Path,
    output: &Path,
) -> Result<Vec<OsString>, ToolError> {
    let mut cmd: Vec<OsString> = vec![input.into(), "--output".into(), output.into()];

    match args.string(OUTPUT_LANGUAGE)? {
        HLSL => {
            cmd.push("--hlsl".into());
            cmd.push("--shader-model".into());
            cmd.push(args.integer(HLSL_SHADER_MODEL)?.to_string().into());
        }
        METAL => cmd.push("--msl".into()),
        _ => {
            cmd.push("--version".into());
            cmd.push(args.integer(GLSL_VERSION)?.to_string().into());
            if args.boolean(GLSL_ES)? {
                cmd.push("--es".into());
            }
        }
    }

    let entry = args.string(ENTRY_POINT)?;
    if !entry.is_empty() {
        cmd.push("--entry".into());
        cmd.push(entry.into());
    }
    Ok(cmd)
}

/// SPIRV-Cross adapter.
#[derive(Debug)]
pub struct SpirvCross {
    descriptor: ToolDescriptor,
    toolchain: Arc<Toolchain>,
}

impl SpirvCross {
    pub fn new(toolchain: Arc<Toolchain>) -> Self {
        Self {
            descriptor: descriptor().with_parameter(toolchain.version_parameter(NAME)),
            toolchain,
        }
    }
}

#[async_trait]
impl ShaderTool for SpirvCross {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn compile(
        &self,
        input: &ShaderCode,
        args: &BoundArguments,
    ) -> Result<StepResult, ToolError> {
        let output_language = args.string(OUTPUT_LANGUAGE)?;
        let ws = Workspace::with_input(input).await?;
        let cmd_args = build_args(args, ws.input(), &ws.path(OUTPUT_FILE))?;

        self.toolchain
            .runner()
            .run(&self.toolchain.program(NAME, EXECUTABLE, args)?, cmd_args, ws.root())
            .await?
            .check()?;

        let source = ws.read_text(OUTPUT_FILE).await?;

        Ok(StepResult::new(
            ShaderCode::text(output_language, source.clone()),
            vec![StepOutput::text("Output", Some(output_language), source)],
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use shaderpipe_core::bind;

    use super::*;

    fn line(pairs: &[(&str, &str)]) -> Vec<String> {
        let raw: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let args = bind(&descriptor().parameters, &raw).unwrap();
        build_args(&args, Path::new("in.spv"), Path::new("out"))
            .unwrap()
            .into_iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_glsl_default() {
        assert_eq!(
            line(&[]),
            vec!["in.spv", "--output", "out", "--version", "450"]
        );
    }

    #[test]
    fn test_glsl_es() {
        let cmd = line(&[("GlslVersion", "310"), ("GlslEs", "true")]);
        assert_eq!(&cmd[3..], ["--version", "310", "--es"]);
    }

    #[test]
    fn test_hlsl() {
        let cmd = line(&[("OutputLanguage", "HLSL"), ("HlslShaderModel", "51")]);
        assert_eq!(&cmd[3..], ["--hlsl", "--shader-model", "51"]);
    }

    #[test]
    fn test_metal_with_entry() {
        let cmd = line(&[("OutputLanguage", "Metal"), ("EntryPoint", "PSMain")]);
        assert_eq!(&cmd[3..], ["--msl", "--entry", "PSMain"]);
    }
}
