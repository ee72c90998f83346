//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [tools]                  # where executables live, per-tool timeouts
//! [tools.executables]      # per-tool executable overrides
//! [tools.versions]         # per-tool installed versions besides trunk
//! [pipelines]              # directory of named pipeline definitions
//! [logging]                # log level and optional file output
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderpipeConfig {
    /// External tool settings.
    pub tools: Option<ToolsSection>,

    /// Named pipeline definitions.
    pub pipelines: Option<PipelinesSection>,

    /// Logging configuration.
    pub logging: Option<LoggingSection>,
}

impl ShaderpipeConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole; a layer that sets `[tools]` replaces
    /// every tools setting of the layers below it.
    pub fn merge(&mut self, other: ShaderpipeConfig) {
        if other.tools.is_some() {
            self.tools = other.tools;
        }

        if other.pipelines.is_some() {
            self.pipelines = other.pipelines;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Effective tools settings.
    pub fn tools(&self) -> ToolsSection {
        self.tools.clone().unwrap_or_default()
    }

    /// Effective logging settings.
    pub fn logging(&self) -> LoggingSection {
        self.logging.clone().unwrap_or_default()
    }

    /// Effective pipelines settings.
    pub fn pipelines(&self) -> PipelinesSection {
        self.pipelines.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tools Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Where to find tool executables and how long they may run.
///
/// ```toml
/// [tools]
/// binaries_dir = "/opt/shader-tools/bin"
/// timeout_secs = 30
///
/// [tools.executables]
/// dxc = "/usr/local/bin/dxc"
/// mali = "/opt/arm/malioc"
///
/// [tools.versions]
/// fxc = ["10.0.10240.16384"]
/// mali = ["6.2.0"]
/// ```
///
/// Executable resolution for a tool at version `trunk`: its
/// `[tools.executables]` entry, then the tool's default executable name
/// inside `binaries_dir`, then the default name looked up on `PATH`. A listed
/// version is found at `binaries_dir/<tool>/<version>/<executable>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// Directory containing the tool executables.
    pub binaries_dir: Option<PathBuf>,
    /// Per-invocation timeout in seconds.
    pub timeout_secs: u64,
    /// Per-tool executable overrides, keyed by tool name.
    pub executables: HashMap<String, PathBuf>,
    /// Selectable versions per tool, in addition to `trunk`.
    pub versions: HashMap<String, Vec<String>>,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            binaries_dir: None,
            timeout_secs: 30,
            executables: HashMap::new(),
            versions: HashMap::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipelines Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Location of named pipeline definitions (`<dir>/<name>.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelinesSection {
    /// Directory holding pipeline definition files.
    pub dir: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is unset (e.g. `"info"`).
    pub level: String,
    /// Directory for daily-rotated JSON log files. Disabled when unset.
    pub file_dir: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = ShaderpipeConfig::from_toml("").unwrap();
        assert!(config.tools.is_none());
        assert_eq!(config.tools().timeout_secs, 30);
        assert_eq!(config.logging().level, "info");
        assert!(config.pipelines().dir.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config = ShaderpipeConfig::from_toml(
            r#"
[tools]
binaries_dir = "/opt/shader-tools/bin"
timeout_secs = 10

[tools.executables]
dxc = "/usr/local/bin/dxc"

[tools.versions]
fxc = ["10.0.10240.16384"]

[pipelines]
dir = "pipelines"

[logging]
level = "debug"
file_dir = "/var/log/shaderpipe"
"#,
        )
        .unwrap();

        let tools = config.tools();
        assert_eq!(tools.binaries_dir, Some(PathBuf::from("/opt/shader-tools/bin")));
        assert_eq!(tools.timeout_secs, 10);
        assert_eq!(tools.executables["dxc"], PathBuf::from("/usr/local/bin/dxc"));
        assert_eq!(tools.versions["fxc"], vec!["10.0.10240.16384"]);
        assert_eq!(config.pipelines().dir, Some(PathBuf::from("pipelines")));
        assert_eq!(config.logging().level, "debug");
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config = ShaderpipeConfig::from_toml("[tools]\nbinaries_dir = \"bin\"\n").unwrap();
        let tools = config.tools();
        assert_eq!(tools.timeout_secs, 30);
        assert!(tools.executables.is_empty());
    }

    #[test]
    fn test_merge_replaces_sections() {
        let mut base = ShaderpipeConfig::from_toml(
            r#"
[tools]
timeout_secs = 60
[logging]
level = "warn"
"#,
        )
        .unwrap();
        let overlay = ShaderpipeConfig::from_toml("[tools]\ntimeout_secs = 5\n").unwrap();

        base.merge(overlay);
        assert_eq!(base.tools().timeout_secs, 5);
        assert_eq!(base.logging().level, "warn");
    }

    #[test]
    fn test_roundtrip_serialize() {
        let mut config = ShaderpipeConfig::new();
        config.tools = Some(ToolsSection {
            binaries_dir: Some(PathBuf::from("/bin")),
            timeout_secs: 12,
            executables: HashMap::from([("fxc".to_string(), PathBuf::from("fxc.exe"))]),
            versions: HashMap::from([("mali".to_string(), vec!["6.2.0".to_string()])]),
        });

        let toml_str = config.to_toml().unwrap();
        let parsed = ShaderpipeConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(ShaderpipeConfig::from_toml("[tools]\ntimeout_secs = \"soon\"\n").is_err());
    }
}
