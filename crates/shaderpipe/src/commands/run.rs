//! Run command - compile a shader through a sequence of tools.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow, bail};
use clap::Args;
use console::{Style, style};
use serde::Serialize;
use shaderpipe_core::language;
use shaderpipe_core::{
    CompilationStep, Payload, Pipeline, PipelineDefinition, PipelineFile, ShaderCode, StepResult,
};
use tracing::{debug, info};

use super::Context;

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Shader source or bytecode file
    pub input: PathBuf,

    /// Input language, e.g. HLSL or SPIR-V (inferred from the file extension when omitted)
    #[arg(short, long)]
    pub language: Option<String>,

    /// A step as TOOL or TOOL:KEY=VALUE,KEY=VALUE (repeat for each step, in order)
    #[arg(short, long = "step", value_name = "STEP", conflicts_with = "pipeline")]
    pub steps: Vec<String>,

    /// Pipeline definition file, or the name of a pipeline in the library
    #[arg(short, long)]
    pub pipeline: Option<String>,

    /// Write pipeable artifacts and outputs into this directory
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

/// Full run report for JSON output.
#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    input: &'a Path,
    language: &'a str,
    steps: Vec<StepReport<'a>>,
}

#[derive(Debug, Serialize)]
struct StepReport<'a> {
    index: usize,
    tool: &'a str,
    result: &'a StepResult,
}

/// Run the run command.
pub async fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let (steps, pipeline_language) = resolve_steps(&args, ctx)?;

    let language = args
        .language
        .clone()
        .or(pipeline_language)
        .or_else(|| infer_language(&args.input).map(String::from))
        .ok_or_else(|| {
            anyhow!(
                "Cannot infer the language of {}; pass --language",
                args.input.display()
            )
        })?;

    let input = read_input(&args.input, &language).await?;
    let pipeline = Pipeline::new(Arc::new(ctx.registry()?));

    debug!(
        input = %args.input.display(),
        language = %language,
        steps = steps.len(),
        "Starting run"
    );

    let handle = tokio::spawn({
        let steps = steps.clone();
        async move { pipeline.run(&input, &steps).await }
    });
    let results = handle.await.context("Pipeline task failed")??;

    if let Some(ref dir) = args.out_dir {
        let written = write_outputs(dir, &steps, &results).await?;
        info!(dir = %dir.display(), files = written.len(), "Wrote outputs");
    }

    if ctx.json_output {
        let output = RunOutput {
            input: &args.input,
            language: &language,
            steps: steps
                .iter()
                .zip(&results)
                .enumerate()
                .map(|(index, (step, result))| StepReport {
                    index,
                    tool: &step.tool,
                    result,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_results(&steps, &results);
    }

    let failed = results.iter().filter(|r| r.has_errors()).count();
    if failed > 0 {
        bail!("{} step(s) reported errors", failed);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Request parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse `TOOL` or `TOOL:KEY=VALUE,KEY=VALUE` into a step.
pub fn parse_step(spec: &str) -> Result<CompilationStep> {
    let (tool, arguments) = match spec.split_once(':') {
        Some((tool, arguments)) => (tool.trim(), arguments),
        None => (spec.trim(), ""),
    };
    if tool.is_empty() {
        bail!("Step '{}' has no tool name", spec);
    }

    let mut step = CompilationStep::new(tool);
    for pair in arguments.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once('=') else {
            bail!(
                "Invalid argument '{}' in step '{}': expected KEY=VALUE",
                pair,
                spec
            );
        };
        step = step.with_argument(key.trim(), value.trim());
    }
    Ok(step)
}

/// Steps from `--pipeline` or `--step`, plus the pipeline's declared language.
fn resolve_steps(args: &RunArgs, ctx: &Context) -> Result<(Vec<CompilationStep>, Option<String>)> {
    if let Some(ref name) = args.pipeline {
        let definition = load_pipeline(name, ctx)?;
        return Ok((definition.steps, definition.language));
    }

    if args.steps.is_empty() {
        bail!("No steps given. Use --step TOOL[:KEY=VALUE,...] or --pipeline");
    }

    let steps = args
        .steps
        .iter()
        .map(|s| parse_step(s))
        .collect::<Result<Vec<_>>>()?;
    Ok((steps, None))
}

/// A pipeline file on disk, else a named entry of the pipeline library.
fn load_pipeline(name: &str, ctx: &Context) -> Result<PipelineDefinition> {
    let path = Path::new(name);
    if path.is_file() {
        let file = PipelineFile::from_file(path)?;
        file.pipeline.validate()?;
        return Ok(file.pipeline);
    }

    let (library, _) = ctx.library();
    library
        .get(name)
        .map(|loaded| loaded.definition.clone())
        .ok_or_else(|| anyhow!("Pipeline not found: {} (no such file or library entry)", name))
}

fn infer_language(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(language::from_extension)
}

async fn read_input(path: &Path, language: &str) -> Result<ShaderCode> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if language::is_binary(language) {
        return Ok(ShaderCode::binary(language, bytes));
    }
    match String::from_utf8(bytes) {
        Ok(text) => Ok(ShaderCode::text(language, text)),
        Err(e) => Ok(ShaderCode::binary(language, e.into_bytes())),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_results(steps: &[CompilationStep], results: &[StepResult]) {
    let dim = Style::new().dim();
    let red = Style::new().red();

    for (index, (step, result)) in steps.iter().zip(results).enumerate() {
        println!();
        println!(
            "{} {}",
            style(format!("Step {}:", index + 1)).bold(),
            style(&step.tool).cyan()
        );
        println!("{}", dim.apply_to("─".repeat(40)));

        if let Some(ref code) = result.pipeable_output {
            println!(
                "  {} {} ({})",
                dim.apply_to("Pipeable:"),
                code.language,
                describe(&code.payload)
            );
        }

        for (i, output) in result.outputs.iter().enumerate() {
            let marker = if result.selected_output == Some(i) { "›" } else { " " };
            let lang = output
                .language
                .as_deref()
                .map(|l| format!(" [{l}]"))
                .unwrap_or_default();

            if output.is_error() {
                println!("{marker} {}{lang}", red.apply_to(&output.display_name));
            } else {
                println!("{marker} {}{lang}", style(&output.display_name).bold());
            }

            match output.value {
                Payload::Text(ref text) => {
                    for line in text.lines() {
                        println!("    {line}");
                    }
                }
                Payload::Binary(_) => {
                    println!("    {}", dim.apply_to(describe(&output.value)));
                }
            }
        }
    }
    println!();
}

fn describe(payload: &Payload) -> String {
    match payload {
        Payload::Text(text) => format!("{} lines", text.lines().count()),
        Payload::Binary(bytes) => format!("{} bytes", bytes.len()),
    }
}

/// Write each step's pipeable artifact and outputs as
/// `<step>-<tool>.<ext>` and `<step>-<tool>-<output>.<ext>`.
async fn write_outputs(
    dir: &Path,
    steps: &[CompilationStep],
    results: &[StepResult],
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    for (index, (step, result)) in steps.iter().zip(results).enumerate() {
        let prefix = format!("{}-{}", index + 1, slug(&step.tool));

        if let Some(ref code) = result.pipeable_output {
            let path = dir.join(format!(
                "{prefix}.{}",
                language::file_extension(&code.language)
            ));
            tokio::fs::write(&path, code.as_bytes()).await?;
            written.push(path);
        }

        for output in &result.outputs {
            let extension = match output.value {
                Payload::Text(_) => "txt",
                Payload::Binary(_) => output
                    .language
                    .as_deref()
                    .map(language::file_extension)
                    .unwrap_or("bin"),
            };
            let path = dir.join(format!(
                "{prefix}-{}.{extension}",
                slug(&output.display_name)
            ));
            tokio::fs::write(&path, output.value.as_bytes()).await?;
            written.push(path);
        }
    }
    Ok(written)
}

/// Lowercase, with runs of anything but ASCII alphanumerics turned into `-`.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_tool() {
        let step = parse_step("mali").unwrap();
        assert_eq!(step.tool, "mali");
        assert!(step.arguments.is_empty());
    }

    #[test]
    fn test_parse_tool_with_arguments() {
        let step = parse_step("dxc:OutputLanguage=SPIR-V, EntryPoint=PSMain").unwrap();
        assert_eq!(step.tool, "dxc");
        assert_eq!(step.arguments["OutputLanguage"], "SPIR-V");
        assert_eq!(step.arguments["EntryPoint"], "PSMain");
    }

    #[test]
    fn test_parse_value_may_contain_equals() {
        let step = parse_step("dxc:ExtraOptions=-D X=1").unwrap();
        assert_eq!(step.arguments["ExtraOptions"], "-D X=1");
    }

    #[test]
    fn test_parse_rejects_bad_pairs() {
        assert!(parse_step(":EntryPoint=main").is_err());
        let err = parse_step("fxc:EntryPoint").unwrap_err();
        assert!(err.to_string().contains("expected KEY=VALUE"));
    }

    #[test]
    fn test_infer_language() {
        assert_eq!(infer_language(Path::new("lit.hlsl")), Some("HLSL"));
        assert_eq!(infer_language(Path::new("mod.spv")), Some("SPIR-V"));
        assert_eq!(infer_language(Path::new("README")), None);
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Disassembly"), "disassembly");
        assert_eq!(slug("spirv-cross"), "spirv-cross");
        assert_eq!(slug("  Mali Report (G72) "), "mali-report-g72");
    }

    #[tokio::test]
    async fn test_write_outputs_names() {
        let dir = tempfile::tempdir().unwrap();
        let steps = vec![CompilationStep::new("fxc")];
        let results = vec![
            StepResult::new(
                ShaderCode::binary(language::DXBC, vec![1, 2, 3]),
                vec![shaderpipe_core::StepOutput::text(
                    "Disassembly",
                    Some(language::DXBC),
                    "ps_5_0",
                )],
            ),
        ];

        let written = write_outputs(dir.path(), &steps, &results).await.unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("1-fxc.dxbc"),
                dir.path().join("1-fxc-disassembly.txt"),
            ]
        );
        assert_eq!(std::fs::read(&written[0]).unwrap(), vec![1, 2, 3]);
    }
}
