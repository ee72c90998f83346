//! Shader tool adapters for shaderpipe.
//!
//! Each adapter wraps one external executable behind the
//! [`ShaderTool`](shaderpipe_core::ShaderTool) trait: it writes its input to a
//! scoped [`Workspace`], runs the executable through the [`ProcessRunner`],
//! and reads back the files the tool produced.
//!
//! | tool          | input        | pipeable output        |
//! |---------------|--------------|------------------------|
//! | `fxc`         | HLSL         | DXBC                   |
//! | `dxc`         | HLSL         | DXIL or SPIR-V         |
//! | `glslang`     | GLSL, HLSL   | SPIR-V                 |
//! | `spirv-cross` | SPIR-V       | GLSL, HLSL or Metal    |
//! | `hlslcc`      | DXBC         | GLSL or Metal          |
//! | `mali`        | GLSL, SPIR-V | none (report only)     |

pub mod common;
pub mod dxc;
pub mod fxc;
pub mod glslang;
pub mod hlslcc;
pub mod mali;
pub mod process;
pub mod spirv_cross;
pub mod toolchain;
pub mod workspace;

use std::sync::Arc;

use shaderpipe_config::ToolsSection;
use shaderpipe_core::{Result, ToolRegistry};

pub use dxc::Dxc;
pub use fxc::Fxc;
pub use glslang::Glslang;
pub use hlslcc::HlslCc;
pub use mali::Mali;
pub use process::{ProcessOutput, ProcessRunner};
pub use spirv_cross::SpirvCross;
pub use toolchain::Toolchain;
pub use workspace::Workspace;

/// `(tool name, default executable name)` for every built-in adapter.
pub const BUILTIN_TOOLS: [(&str, &str); 6] = [
    (fxc::NAME, fxc::EXECUTABLE),
    (dxc::NAME, dxc::EXECUTABLE),
    (glslang::NAME, glslang::EXECUTABLE),
    (spirv_cross::NAME, spirv_cross::EXECUTABLE),
    (hlslcc::NAME, hlslcc::EXECUTABLE),
    (mali::NAME, mali::EXECUTABLE),
];

/// Register every built-in adapter, sharing one toolchain.
pub fn register_builtin(registry: &mut ToolRegistry, toolchain: Arc<Toolchain>) -> Result<()> {
    registry.register(Fxc::new(Arc::clone(&toolchain)))?;
    registry.register(Dxc::new(Arc::clone(&toolchain)))?;
    registry.register(Glslang::new(Arc::clone(&toolchain)))?;
    registry.register(SpirvCross::new(Arc::clone(&toolchain)))?;
    registry.register(HlslCc::new(Arc::clone(&toolchain)))?;
    registry.register(Mali::new(toolchain))?;
    Ok(())
}

/// A registry holding all built-in adapters configured from `[tools]`.
pub fn default_registry(tools: &ToolsSection) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    register_builtin(&mut registry, Arc::new(Toolchain::from_config(tools)))?;
    Ok(registry)
}
