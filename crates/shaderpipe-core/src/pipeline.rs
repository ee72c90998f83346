//! Pipeline orchestrator.
//!
//! A run is planned in full before any tool is invoked: every step's tool is
//! resolved, the chain of languages checked as far as the descriptors allow,
//! and its arguments bound. Only then are the steps executed, strictly in order,
//! each consuming the pipeable output of the previous one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::artifact::ShaderCode;
use crate::error::{PipelineError, Result};
use crate::executor::execute;
use crate::parameter::{BoundArguments, bind};
use crate::registry::ToolRegistry;
use crate::result::StepResult;
use crate::tool::ShaderTool;

// ─────────────────────────────────────────────────────────────────────────────
// Steps
// ─────────────────────────────────────────────────────────────────────────────

/// One requested step: a tool name plus raw arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationStep {
    pub tool: String,
    #[serde(default, deserialize_with = "scalar_map")]
    pub arguments: HashMap<String, String>,
}

impl CompilationStep {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            arguments: HashMap::new(),
        }
    }

    /// Add a raw argument.
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }
}

/// Accept strings, booleans and numbers as argument values.
fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        String(String),
        Bool(bool),
        Int(i64),
        Float(f64),
    }

    let raw = HashMap::<String, Scalar>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                Scalar::String(s) => s,
                Scalar::Bool(b) => b.to_string(),
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
            };
            (k, v)
        })
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Plan
// ─────────────────────────────────────────────────────────────────────────────

/// A step whose tool is resolved and whose arguments are bound.
#[derive(Clone)]
pub struct PlannedStep {
    pub index: usize,
    pub tool: Arc<dyn ShaderTool>,
    pub arguments: BoundArguments,
}

impl std::fmt::Debug for PlannedStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannedStep")
            .field("index", &self.index)
            .field("tool", &self.tool.name())
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl PlannedStep {
    fn incompatible(&self, got: &str) -> PipelineError {
        PipelineError::IncompatibleStage {
            step_index: self.index,
            tool: self.tool.name().to_string(),
            got: got.to_string(),
            expected: self.tool.descriptor().input_languages.clone(),
        }
    }

    fn no_pipeable_output(&self) -> PipelineError {
        PipelineError::NoPipeableOutput {
            step_index: self.index,
            tool: self.tool.name().to_string(),
        }
    }
}

/// A validated run, ready to execute.
#[derive(Debug, Clone)]
pub struct Plan {
    pub steps: Vec<PlannedStep>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A predicted language set as written in errors: `"GLSL"`, `"GLSL or HLSL"`.
fn describe_languages(languages: &[String]) -> String {
    match languages {
        [] => String::new(),
        [single] => single.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// Drives compilation steps against a shared registry.
///
/// Cheap to clone; independent runs may execute concurrently.
#[derive(Debug, Clone)]
pub struct Pipeline {
    registry: Arc<ToolRegistry>,
}

impl Pipeline {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Resolve, check and bind `steps` for an input in `initial_language`.
    ///
    /// Each step is resolved, checked against the languages the previous step
    /// can emit, then bound, in request order. Fails with the first
    /// configuration error found.
    pub fn plan(&self, initial_language: &str, steps: &[CompilationStep]) -> Result<Plan> {
        let mut planned: Vec<PlannedStep> = Vec::with_capacity(steps.len());
        let mut incoming = vec![initial_language.to_string()];

        for (index, step) in steps.iter().enumerate() {
            let tool = self
                .registry
                .get(&step.tool)
                .ok_or_else(|| PipelineError::UnknownTool {
                    step_index: index,
                    tool: step.tool.clone(),
                })?;
            let descriptor = tool.descriptor();

            if let Some(previous) = planned.last()
                && incoming.is_empty()
            {
                return Err(previous.no_pipeable_output());
            }

            if !incoming.iter().any(|l| descriptor.accepts(l)) {
                return Err(PipelineError::IncompatibleStage {
                    step_index: index,
                    tool: step.tool.clone(),
                    got: describe_languages(&incoming),
                    expected: descriptor.input_languages.clone(),
                });
            }

            let arguments = bind(&descriptor.parameters, &step.arguments).map_err(|source| {
                PipelineError::InvalidParameter {
                    step_index: index,
                    tool: step.tool.clone(),
                    source,
                }
            })?;

            incoming = descriptor.predicted_output_languages(&arguments);
            planned.push(PlannedStep {
                index,
                tool,
                arguments,
            });
        }

        Ok(Plan { steps: planned })
    }

    /// Execute a planned run.
    ///
    /// Each step's input language is re-checked against what the previous
    /// step actually produced.
    pub async fn execute_plan(&self, initial: &ShaderCode, plan: &Plan) -> Result<Vec<StepResult>> {
        let mut results = Vec::with_capacity(plan.len());
        let mut current = initial.clone();

        for (position, step) in plan.steps.iter().enumerate() {
            if !step.tool.descriptor().accepts(&current.language) {
                return Err(step.incompatible(&current.language));
            }

            let result = execute(step.tool.as_ref(), &current, &step.arguments, step.index).await;
            let is_last = position + 1 == plan.len();

            match result.pipeable_output {
                Some(ref output) => current = output.clone(),
                None if !is_last => return Err(step.no_pipeable_output()),
                None => {}
            }
            results.push(result);
        }

        Ok(results)
    }

    /// Plan and execute `steps` on `initial`.
    ///
    /// Returns one result per step in request order, or the first
    /// configuration error. Configuration errors found while planning are
    /// raised before any tool runs.
    pub async fn run(
        &self,
        initial: &ShaderCode,
        steps: &[CompilationStep],
    ) -> Result<Vec<StepResult>> {
        let start = Instant::now();
        let plan = self.plan(&initial.language, steps)?;
        debug!(steps = plan.len(), language = %initial.language, "Pipeline planned");

        let results = self.execute_plan(initial, &plan).await?;
        info!(
            steps = results.len(),
            failed = results.iter().filter(|r| r.has_errors()).count(),
            elapsed = ?start.elapsed(),
            "Pipeline completed"
        );
        Ok(results)
    }
}
