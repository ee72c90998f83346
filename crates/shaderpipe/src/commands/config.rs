//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Show the user configuration file path
    Path,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./shaderpipe.toml) instead of user config
        #[arg(long)]
        local: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Path => cmd_path(),
        ConfigCommand::Init { local } => cmd_init(local),
    }
}

#[derive(Debug, Serialize)]
struct SourceInfo {
    path: PathBuf,
    loaded: bool,
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;
    let config = &loaded.config;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("# shaderpipe Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    let tools = config.tools();
    println!("Tools:");
    match tools.binaries_dir {
        Some(ref dir) => println!("  binaries: {}", dir.display()),
        None => println!("  binaries: (PATH)"),
    }
    println!("  timeout:  {}s", tools.timeout_secs);
    let mut overrides: Vec<_> = tools.executables.iter().collect();
    overrides.sort();
    for (tool, path) in overrides {
        println!("  {:<12} -> {}", tool, path.display());
    }
    let mut versions: Vec<_> = tools.versions.iter().collect();
    versions.sort();
    for (tool, listed) in versions {
        println!("  {:<12} versions: trunk, {}", tool, listed.join(", "));
    }
    println!();

    if let Some(dir) = config.pipelines().dir {
        println!("Pipelines:");
        println!("  dir: {}", dir.display());
        println!();
    }

    let logging = config.logging();
    println!("Logging:");
    println!("  level: {}", logging.level);
    if let Some(ref dir) = logging.file_dir {
        println!("  files: {}", dir.display());
    }
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    if ctx.verbose {
        println!("---\nRaw config:\n");
        if let Ok(toml_str) = config.to_toml() {
            println!("{}", toml_str);
        }
    }

    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;

    if ctx.json_output {
        let sources: Vec<SourceInfo> = loaded
            .sources
            .iter()
            .map(|s| SourceInfo {
                path: s.path.clone(),
                loaded: s.loaded,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&sources)?);
        return Ok(());
    }

    println!("Config file search order (later overrides earlier):\n");

    for source in &loaded.sources {
        let status = if source.loaded {
            "✓ loaded"
        } else {
            "· not found"
        };
        println!("  {} {}", status, source.path.display());
    }

    println!();
    let loaded_count = loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found. Run 'shaderpipe config init' to create one.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }

    Ok(())
}

fn cmd_path() -> Result<()> {
    let path = shaderpipe_config::user_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    println!("{}", path.display());
    Ok(())
}

const TEMPLATE: &str = r#"# shaderpipe Configuration

[tools]
# Directory holding fxc, dxc, glslangValidator, spirv-cross, hlslcc-shim, malioc.
# Unset: executables are looked up on PATH.
# binaries_dir = "/opt/shader-tools/bin"
timeout_secs = 30

# Per-tool executable overrides
# [tools.executables]
# mali = "/opt/arm/mali_offline_compiler/malioc"

# Versions selectable per step with Version=..., besides trunk.
# Each lives at <binaries_dir>/<tool>/<version>/<executable>.
# [tools.versions]
# fxc = ["10.0.10240.16384"]
# mali = ["6.2.0"]

# Named pipelines: one <name>.toml per pipeline
# [pipelines]
# dir = "pipelines"

[logging]
level = "info"
# Daily-rotated JSON logs
# file_dir = "logs"
"#;

fn cmd_init(local: bool) -> Result<()> {
    let path = if local {
        PathBuf::from("shaderpipe.toml")
    } else {
        let dir = shaderpipe_config::user_config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        std::fs::create_dir_all(&dir)?;
        dir.join("config.toml")
    };

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    std::fs::write(&path, TEMPLATE)?;
    println!("Created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use shaderpipe_config::ShaderpipeConfig;

    use super::*;

    #[test]
    fn test_template_parses() {
        let config = ShaderpipeConfig::from_toml(TEMPLATE).unwrap();
        assert_eq!(config.tools().timeout_secs, 30);
        assert_eq!(config.logging().level, "info");
        assert!(config.pipelines().dir.is_none());
    }
}
