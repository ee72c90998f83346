//! Pipelines command - list the pipeline library.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;
use shaderpipe_core::LoadEvent;

use super::Context;

/// Arguments for the pipelines command.
#[derive(Args, Debug)]
pub struct PipelinesArgs {
    /// Show each pipeline's steps and arguments
    #[arg(short, long)]
    pub detailed: bool,
}

#[derive(Debug, Serialize)]
struct PipelineInfo<'a> {
    name: &'a str,
    description: &'a str,
    language: Option<&'a str>,
    path: String,
    steps: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct PipelinesOutput<'a> {
    dir: Option<String>,
    pipelines: Vec<PipelineInfo<'a>>,
    errors: Vec<String>,
}

/// Run the pipelines command.
pub async fn run(args: PipelinesArgs, ctx: &Context) -> Result<()> {
    let dir = ctx.loaded.config.pipelines().dir;
    let (library, events) = ctx.library();

    let errors: Vec<String> = events
        .iter()
        .filter_map(|event| match event {
            LoadEvent::Error { path, error } => Some(format!("{}: {}", path.display(), error)),
            LoadEvent::Loaded { .. } => None,
        })
        .collect();

    if ctx.json_output {
        let output = PipelinesOutput {
            dir: dir.as_ref().map(|d| d.display().to_string()),
            pipelines: library
                .iter()
                .map(|loaded| PipelineInfo {
                    name: &loaded.definition.name,
                    description: &loaded.definition.description,
                    language: loaded.definition.language.as_deref(),
                    path: loaded.path.display().to_string(),
                    steps: loaded.definition.steps.iter().map(|s| s.tool.as_str()).collect(),
                })
                .collect(),
            errors,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let Some(dir) = dir else {
        println!("No pipeline directory configured.");
        println!("Set [pipelines] dir in shaderpipe.toml to use named pipelines.");
        return Ok(());
    };

    let dim = Style::new().dim();
    println!();
    println!("{} {}", style("Pipelines in").bold(), dir.display());
    println!("{}", dim.apply_to("─".repeat(40)));

    if library.is_empty() {
        println!("  (none)");
    }

    for loaded in library.iter() {
        let def = &loaded.definition;
        let chain: Vec<&str> = def.steps.iter().map(|s| s.tool.as_str()).collect();
        println!(
            "  {:<20} {}",
            style(&def.name).cyan(),
            chain.join(" → ")
        );
        if !def.description.is_empty() {
            println!("  {:<20} {}", "", dim.apply_to(&def.description));
        }

        if args.detailed {
            if let Some(ref language) = def.language {
                println!("  {:<20} input: {}", "", language);
            }
            for (index, step) in def.steps.iter().enumerate() {
                let mut arguments: Vec<String> = step
                    .arguments
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                arguments.sort();
                println!(
                    "  {:<20} {}. {} {}",
                    "",
                    index + 1,
                    step.tool,
                    dim.apply_to(arguments.join(", "))
                );
            }
        }
    }

    if !errors.is_empty() {
        let red = Style::new().red();
        println!();
        println!("{}", red.apply_to("Errors:"));
        for error in &errors {
            println!("  ⚠ {}", error);
        }
    }
    println!();

    Ok(())
}
