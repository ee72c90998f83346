//! Microsoft FXC: HLSL to DXBC bytecode.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use shaderpipe_core::language::{DXBC, HLSL};
use shaderpipe_core::{
    BoundArguments, ParameterSpec, ShaderCode, ShaderTool, StepOutput, StepResult, ToolDescriptor,
    ToolError,
};

use crate::common::{
    DISABLE_OPTIMIZATIONS, ENTRY_POINT, OPTIMIZATION_LEVEL, TARGET_PROFILE, disable_optimizations,
    entry_point, optimization_level,
};
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;

pub const NAME: &str = "fxc";
pub const EXECUTABLE: &str = "fxc";

const OBJECT_FILE: &str = "shader.dxbc";
const LISTING_FILE: &str = "shader.asm";

const PROFILES: [&str; 16] = [
    "vs_4_0", "ps_4_0", "gs_4_0", "cs_4_0", "vs_5_0", "ps_5_0", "gs_5_0", "hs_5_0", "ds_5_0",
    "cs_5_0", "vs_5_1", "ps_5_1", "gs_5_1", "hs_5_1", "ds_5_1", "cs_5_1",
];

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(NAME, "FXC")
        .with_description("Microsoft's legacy HLSL compiler, producing DXBC bytecode")
        .with_input_languages([HLSL])
        .with_output_languages([DXBC])
        .with_parameter(entry_point("main"))
        .with_parameter(
            ParameterSpec::choice(TARGET_PROFILE, PROFILES, "ps_5_0")
                .with_description("Shader model and stage"),
        )
        .with_parameter(disable_optimizations())
        .with_parameter(optimization_level(1))
}

/// Command line for compiling `input` into `object` plus a `listing`.
pub fn build_args(
    args: &BoundArguments,
    input: &Path,
    object: &Path,
    listing: &Path,
) -> Result<Vec<OsString>, ToolError> {
    let optimization = if args.boolean(DISABLE_OPTIMIZATIONS)? {
        "/Od".to_string()
    } else {
        format!("/O{}", args.integer(OPTIMIZATION_LEVEL)?)
    };

    Ok(vec![
        "/nologo".into(),
        "/T".into(),
        args.string(TARGET_PROFILE)?.into(),
        "/E".into(),
        args.string(ENTRY_POINT)?.into(),
        optimization.into(),
        "/Fo".into(),
        object.into(),
        "/Fc".into(),
        listing.into(),
        input.into(),
    ])
}

/// FXC adapter.
#[derive(Debug)]
pub struct Fxc {
    descriptor: ToolDescriptor,
    toolchain: Arc<Toolchain>,
}

impl Fxc {
    pub fn new(toolchain: Arc<Toolchain>) -> Self {
        Self {
            descriptor: descriptor().with_parameter(toolchain.version_parameter(NAME)),
            toolchain,
        }
    }
}

#[async_trait]
impl ShaderTool for Fxc {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn compile(
        &self,
        input: &ShaderCode,
        args: &BoundArguments,
    ) -> Result<StepResult, ToolError> {
        let ws = Workspace::with_input(input).await?;
        let cmd_args = build_args(args, ws.input(), &ws.path(OBJECT_FILE), &ws.path(LISTING_FILE))?;

        self.toolchain
            .runner()
            .run(&self.toolchain.program(NAME, EXECUTABLE, args)?, cmd_args, ws.root())
            .await?
            .check()?;

        let object = ws.read_bytes(OBJECT_FILE).await?;
        let listing = ws.read_text_if_exists(LISTING_FILE).await?.unwrap_or_default();

        Ok(StepResult::new(
            ShaderCode::binary(DXBC, object.clone()),
            vec![
                StepOutput::binary("Object", Some(DXBC), object),
                StepOutput::text("Disassembly", Some(DXBC), listing),
            ],
        )
        .with_selected_output(1))
    }
}
