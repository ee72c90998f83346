//! Tools command - list registered tools and their parameters.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};
use serde::Serialize;
use shaderpipe_core::{ParameterKind, ToolDescriptor};
use shaderpipe_tools::BUILTIN_TOOLS;

use super::Context;

/// Arguments for the tools command.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Only show this tool
    pub name: Option<String>,
}

/// One tool for JSON output.
#[derive(Debug, Serialize)]
struct ToolInfo<'a> {
    #[serde(flatten)]
    descriptor: &'a ToolDescriptor,
    executable: String,
    found: bool,
}

/// Run the tools command.
pub async fn run(args: ToolsArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let toolchain = ctx.toolchain();

    let mut descriptors = registry.descriptors();
    if let Some(ref name) = args.name {
        if !registry.contains(name) {
            bail!("Tool not found: {}", name);
        }
        descriptors.retain(|d| d.name == *name);
    }

    let infos: Vec<ToolInfo> = descriptors
        .into_iter()
        .map(|descriptor| {
            let default_name = BUILTIN_TOOLS
                .iter()
                .find(|(tool, _)| *tool == descriptor.name)
                .map(|(_, exe)| *exe)
                .unwrap_or(descriptor.name.as_str());
            let located = toolchain.locate(&descriptor.name, default_name);
            ToolInfo {
                descriptor,
                found: located.is_some(),
                executable: located
                    .unwrap_or_else(|| toolchain.executable(&descriptor.name, default_name))
                    .display()
                    .to_string(),
            }
        })
        .collect();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let green = Style::new().green();
    let yellow = Style::new().yellow();

    for info in &infos {
        let d = info.descriptor;
        println!();
        println!(
            "{} {}",
            style(&d.name).bold().cyan(),
            dim.apply_to(format!("- {}", d.display_name))
        );
        if !d.description.is_empty() {
            println!("  {}", d.description);
        }

        let outputs = if d.is_terminal() {
            "(report only)".to_string()
        } else {
            d.output_languages.join(", ")
        };
        println!(
            "  {} {} → {}",
            dim.apply_to("Languages:"),
            d.input_languages.join(", "),
            outputs
        );

        let status = if info.found {
            green.apply_to("✓")
        } else {
            yellow.apply_to("· not found")
        };
        println!("  {} {} {}", dim.apply_to("Executable:"), info.executable, status);

        if !d.parameters.is_empty() {
            println!("  {}", dim.apply_to("Parameters:"));
            for p in &d.parameters {
                println!(
                    "    {:<22} {:<40} default: {}",
                    p.name,
                    kind_summary(&p.kind),
                    if p.default.is_empty() { "\"\"" } else { &p.default }
                );
                if ctx.verbose && !p.description.is_empty() {
                    println!("    {:<22} {}", "", dim.apply_to(&p.description));
                }
            }
        }
    }
    println!();

    Ok(())
}

fn kind_summary(kind: &ParameterKind) -> String {
    match kind {
        ParameterKind::String => "string".to_string(),
        ParameterKind::Bool => "bool".to_string(),
        ParameterKind::Int { min, max } => match (min, max) {
            (Some(min), Some(max)) => format!("int {min}..={max}"),
            (Some(min), None) => format!("int >= {min}"),
            (None, Some(max)) => format!("int <= {max}"),
            (None, None) => "int".to_string(),
        },
        ParameterKind::Enum { allowed } | ParameterKind::OutputLanguage { allowed } => {
            allowed.join(" | ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_summary() {
        assert_eq!(kind_summary(&ParameterKind::Bool), "bool");
        assert_eq!(
            kind_summary(&ParameterKind::Int {
                min: Some(0),
                max: Some(3)
            }),
            "int 0..=3"
        );
        assert_eq!(
            kind_summary(&ParameterKind::OutputLanguage {
                allowed: vec!["DXIL".into(), "SPIR-V".into()]
            }),
            "DXIL | SPIR-V"
        );
    }
}
