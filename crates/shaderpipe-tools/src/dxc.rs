//! DirectX Shader Compiler: HLSL to DXIL or SPIR-V.
//!
//! Two invocations per step: the compile itself (object + disassembly
//! listing) and an `-ast-dump` pass whose stdout becomes the AST output.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use shaderpipe_core::language::{DXIL, HLSL, SPIRV};
use shaderpipe_core::{
    BoundArguments, OUTPUT_LANGUAGE, ParameterSpec, ShaderCode, ShaderTool, StepOutput, StepResult,
    ToolDescriptor, ToolError,
};
use tracing::debug;

use crate::common::{
    DISABLE_OPTIMIZATIONS, ENTRY_POINT, OPTIMIZATION_LEVEL, TARGET_PROFILE, disable_optimizations,
    entry_point, extra_options, optimization_level, split_extra_options,
};
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;

pub const NAME: &str = "dxc";
pub const EXECUTABLE: &str = "dxc";

pub const ENABLE_16BIT_TYPES: &str = "Enable16BitTypes";
pub const SPIRV_TARGET: &str = "SpirvTarget";

const OBJECT_FILE: &str = "shader.bin";
const LISTING_FILE: &str = "shader.txt";

const PROFILES: [&str; 14] = [
    "vs_6_0", "ps_6_0", "gs_6_0", "hs_6_0", "ds_6_0", "cs_6_0", "vs_6_2", "ps_6_2", "cs_6_2",
    "vs_6_6", "ps_6_6", "cs_6_6", "lib_6_3", "lib_6_6",
];

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(NAME, "DXC")
        .with_description("Microsoft's LLVM-based HLSL compiler, producing DXIL or SPIR-V")
        .with_input_languages([HLSL])
        .with_output_languages([DXIL, SPIRV])
        .with_parameter(entry_point("main"))
        .with_parameter(
            ParameterSpec::choice(TARGET_PROFILE, PROFILES, "ps_6_0")
                .with_description("Shader model and stage"),
        )
        .with_parameter(disable_optimizations())
        .with_parameter(optimization_level(3))
        .with_parameter(
            ParameterSpec::boolean(ENABLE_16BIT_TYPES, false)
                .with_description("Enable native 16-bit types (shader model 6.2+)"),
        )
        .with_parameter(
            ParameterSpec::choice(
                SPIRV_TARGET,
                ["vulkan1.0", "vulkan1.1", "vulkan1.2", "vulkan1.3"],
                "vulkan1.0",
            )
            .with_description("Target environment when emitting SPIR-V"),
        )
        .with_parameter(extra_options())
        .with_parameter(ParameterSpec::output_language([DXIL, SPIRV], DXIL))
}

/// Options shared by the compile and AST invocations.
fn common_args(args: &BoundArguments) -> Result<Vec<OsString>, ToolError> {
    let mut cmd: Vec<OsString> = vec![
        "-T".into(),
        args.string(TARGET_PROFILE)?.into(),
        "-E".into(),
        args.string(ENTRY_POINT)?.into(),
    ];
    if args.boolean(ENABLE_16BIT_TYPES)? {
        cmd.push("-enable-16bit-types".into());
    }
    cmd.extend(split_extra_options(args)?.into_iter().map(OsString::from));
    Ok(cmd)
}

/// Command line for compiling `input` into `object` plus a `listing`.
pub fn build_args(
    args: &BoundArguments,
    input: &Path,
    object: &Path,
    listing: &Path,
) -> Result<Vec<OsString>, ToolError> {
    let mut cmd = common_args(args)?;

    if args.boolean(DISABLE_OPTIMIZATIONS)? {
        cmd.push("-Od".into());
    } else {
        cmd.push(format!("-O{}", args.integer(OPTIMIZATION_LEVEL)?).into());
    }

    if args.string(OUTPUT_LANGUAGE)? == SPIRV {
        cmd.push("-spirv".into());
        cmd.push(format!("-fspv-target-env={}", args.string(SPIRV_TARGET)?).into());
    }

    cmd.push("-Fo".into());
    cmd.push(object.into());
    cmd.push("-Fc".into());
    cmd.push(listing.into());
    cmd.push(input.into());
    Ok(cmd)
}

/// Command line for dumping the AST of `input` to stdout.
pub fn build_ast_args(args: &BoundArguments, input: &Path) -> Result<Vec<OsString>, ToolError> {
    let mut cmd = common_args(args)?;
    cmd.push("-ast-dump".into());
    cmd.push(input.into());
    Ok(cmd)
}

/// DXC adapter.
#[derive(Debug)]
pub struct Dxc {
    descriptor: ToolDescriptor,
    toolchain: Arc<Toolchain>,
}

impl Dxc {
    pub fn new(toolchain: Arc<Toolchain>) -> Self {
        Self {
            descriptor: descriptor().with_parameter(toolchain.version_parameter(NAME)),
            toolchain,
        }
    }
}

#[async_trait]
impl ShaderTool for Dxc {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn compile(
        &self,
        input: &ShaderCode,
        args: &BoundArguments,
    ) -> Result<StepResult, ToolError> {
        let output_language = args.string(OUTPUT_LANGUAGE)?;
        let program = self.toolchain.program(NAME, EXECUTABLE, args)?;
        let runner = self.toolchain.runner();
        let ws = Workspace::with_input(input).await?;

        let cmd_args = build_args(args, ws.input(), &ws.path(OBJECT_FILE), &ws.path(LISTING_FILE))?;
        runner.run(&program, cmd_args, ws.root()).await?.check()?;

        let object = ws.read_bytes(OBJECT_FILE).await?;
        let listing = ws.read_text_if_exists(LISTING_FILE).await?.unwrap_or_default();

        // The AST is informational; a failed dump never fails the step.
        let ast_text = match runner
            .run(&program, build_ast_args(args, ws.input())?, ws.root())
            .await
        {
            Ok(ast) if ast.success() => ast.stdout,
            Ok(ast) => {
                debug!(exit_code = ?ast.exit_code, "dxc AST dump failed");
                ast.diagnostics()
            }
            Err(e) => {
                debug!(error = %e, "dxc AST dump did not run");
                e.diagnostics()
            }
        };

        Ok(StepResult::new(
            ShaderCode::binary(output_language, object),
            vec![
                StepOutput::text("Disassembly", Some(output_language), listing),
                StepOutput::text("AST", None, ast_text),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use shaderpipe_core::bind;

    use super::*;

    fn args(pairs: &[(&str, &str)]) -> BoundArguments {
        let raw: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        bind(&descriptor().parameters, &raw).unwrap()
    }

    fn compile_line(a: &BoundArguments) -> Vec<String> {
        build_args(a, Path::new("in.hlsl"), Path::new("o.bin"), Path::new("o.txt"))
            .unwrap()
            .into_iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_dxil_command_line() {
        assert_eq!(
            compile_line(&args(&[])),
            vec![
                "-T", "ps_6_0", "-E", "main", "-O3", "-Fo", "o.bin", "-Fc", "o.txt", "in.hlsl"
            ]
        );
    }

    #[test]
    fn test_spirv_command_line() {
        let cmd = compile_line(&args(&[
            ("EntryPoint", "PSMain"),
            ("OutputLanguage", "SPIR-V"),
            ("SpirvTarget", "vulkan1.1"),
            ("Enable16BitTypes", "true"),
            ("TargetProfile", "ps_6_2"),
        ]));
        assert!(cmd.contains(&"-spirv".to_string()));
        assert!(cmd.contains(&"-fspv-target-env=vulkan1.1".to_string()));
        assert!(cmd.contains(&"-enable-16bit-types".to_string()));
        assert_eq!(cmd.last().map(String::as_str), Some("in.hlsl"));
    }

    #[test]
    fn test_extra_options_forwarded() {
        let cmd = compile_line(&args(&[("ExtraOptions", "-Zpr -HV 2021")]));
        let pos = cmd.iter().position(|s| s == "-Zpr").unwrap();
        assert_eq!(&cmd[pos..pos + 3], ["-Zpr", "-HV", "2021"]);
    }

    #[test]
    fn test_ast_command_line() {
        let cmd: Vec<String> = build_ast_args(&args(&[]), Path::new("in.hlsl"))
            .unwrap()
            .into_iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        assert_eq!(cmd, vec!["-T", "ps_6_0", "-E", "main", "-ast-dump", "in.hlsl"]);
    }
}
