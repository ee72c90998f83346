//! Compilation pipeline orchestrator for shader tools.
//!
//! A caller submits a source artifact plus an ordered list of steps, each
//! naming a registered tool and a bag of raw arguments. The [`Pipeline`]
//! validates the chain, runs each tool in turn, and returns one
//! [`StepResult`] per step: the pipeable artifact handed to the next step and
//! the auxiliary outputs (disassembly, AST dumps, errors) meant for a human.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Pipeline                                                │
//! │  - plan: resolve tools, bind arguments, check chaining   │
//! │  - execute: run steps in order, thread pipeable output   │
//! └────────────┬───────────────────────────┬─────────────────┘
//!              │                           │
//!      ┌───────▼────────┐         ┌────────▼────────┐
//!      │  ToolRegistry  │         │  executor       │
//!      │  name → tool   │         │  ToolError →    │
//!      │                │         │  failure result │
//!      └───────┬────────┘         └─────────────────┘
//!              │
//!      ┌───────▼────────┐
//!      │  dyn ShaderTool│  (fxc, dxc, glslang, ...)
//!      └────────────────┘
//! ```

pub mod artifact;
pub mod definition;
pub mod error;
pub mod executor;
pub mod language;
pub mod library;
pub mod parameter;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod result;
pub mod tool;

pub use artifact::{CodeType, Payload, ShaderCode};
pub use definition::{PipelineDefinition, PipelineFile};
pub use error::{PipelineError, Result};
pub use executor::execute;
pub use library::{LoadEvent, LoadedPipeline, PipelineLibrary};
pub use parameter::{
    ArgumentValue, BoundArguments, OUTPUT_LANGUAGE, ParameterError, ParameterKind, ParameterSpec,
    bind,
};
pub use pipeline::{CompilationStep, Pipeline, Plan, PlannedStep};
pub use registry::ToolRegistry;
pub use report::failure_result;
pub use result::{OutputKind, StepOutput, StepResult};
pub use tool::{ShaderTool, ToolDescriptor, ToolError};
