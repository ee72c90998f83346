//! HLSLcc: DXBC bytecode to GLSL or Metal source.
//!
//! HLSLcc is a library; it is driven through a small command-line shim that
//! takes `<input> <language-id> <output>`.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use shaderpipe_core::language::{DXBC, GLSL, METAL};
use shaderpipe_core::{
    BoundArguments, OUTPUT_LANGUAGE, ParameterSpec, ShaderCode, ShaderTool, StepOutput, StepResult,
    ToolDescriptor, ToolError,
};

use crate::toolchain::Toolchain;
use crate::workspace::Workspace;

pub const NAME: &str = "hlslcc";
pub const EXECUTABLE: &str = "hlslcc-shim";

const OUTPUT_FILE: &str = "shader.out";

/// HLSLcc's `GLLang` values.
const LANG_DEFAULT: u32 = 0;
const LANG_METAL: u32 = 14;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(NAME, "HLSLcc")
        .with_description("Unity Technologies' DirectX shader bytecode cross compiler")
        .with_input_languages([DXBC])
        .with_output_languages([GLSL, METAL])
        .with_parameter(ParameterSpec::output_language([GLSL, METAL], GLSL))
}

/// Shim command line for translating `input` into `output`.
pub fn build_args(
    args: &BoundArguments,
    input: &Path,
    output: &Path,
) -> Result<Vec<OsString>, ToolError> {
    let lang = if args.string(OUTPUT_LANGUAGE)? == METAL {
        LANG_METAL
    } else {
        LANG_DEFAULT
    };
    Ok(vec![input.into(), lang.to_string().into(), output.into()])
}

/// HLSLcc adapter.
#[derive(Debug)]
pub struct HlslCc {
    descriptor: ToolDescriptor,
    toolchain: Arc<Toolchain>,
}

impl HlslCc {
    pub fn new(toolchain: Arc<Toolchain>) -> Self {
        Self {
            descriptor: descriptor().with_parameter(toolchain.version_parameter(NAME)),
            toolchain,
        }
    }
}

#[async_trait]
impl ShaderTool for HlslCc {
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

    fn line(language: &str) -> Vec<String> {
        let raw = HashMap::from([(OUTPUT_LANGUAGE.to_string(), language.to_string())]);
        let args = bind(&descriptor().parameters, &raw).unwrap();
        build_args(&args, Path::new("in.dxbc"), Path::new("out"))
            .unwrap()
            .into_iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_language_ids() {
        assert_eq!(line(GLSL), vec!["in.dxbc", "0", "out"]);
        assert_eq!(line(METAL), vec!["in.dxbc", "14", "out"]);
    }

    #[test]
    fn test_rejects_spirv_output() {
        let raw = HashMap::from([(OUTPUT_LANGUAGE.to_string(), "SPIR-V".to_string())]);
        assert!(bind(&descriptor().parameters, &raw).is_err());
    }
}
