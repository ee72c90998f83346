//! Locating tool executables.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use shaderpipe_config::ToolsSection;
use shaderpipe_core::{BoundArguments, ParameterSpec, ToolError};

use crate::common::{TRUNK, VERSION, version};
use crate::process::ProcessRunner;

/// Executable locations plus the runner used to launch them.
///
/// Resolution for a tool at [`TRUNK`]: explicit override, then
/// `binaries_dir/<default>`, then `<default>` looked up on `PATH` by the OS.
/// Any other version lives at `binaries_dir/<tool>/<version>/<default>`.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    binaries_dir: Option<PathBuf>,
    executables: HashMap<String, PathBuf>,
    versions: HashMap<String, Vec<String>>,
    runner: ProcessRunner,
}

impl Toolchain {
    pub fn new(runner: ProcessRunner) -> Self {
        Self {
            binaries_dir: None,
            executables: HashMap::new(),
            versions: HashMap::new(),
            runner,
        }
    }

    /// Build from the `[tools]` config section.
    pub fn from_config(tools: &ToolsSection) -> Self {
        Self {
            binaries_dir: tools.binaries_dir.clone(),
            executables: tools.executables.clone(),
            versions: tools.versions.clone(),
            runner: ProcessRunner::new(Duration::from_secs(tools.timeout_secs)),
        }
    }

    pub fn with_binaries_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binaries_dir = Some(dir.into());
        self
    }

    /// Use `path` for `tool` regardless of `binaries_dir`.
    pub fn with_executable(mut self, tool: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.executables.insert(tool.into(), path.into());
        self
    }

    /// Installed versions of `tool` besides [`TRUNK`].
    pub fn with_versions<I, S>(mut self, tool: impl Into<String>, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions
            .insert(tool.into(), versions.into_iter().map(Into::into).collect());
        self
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    /// Selectable versions of `tool`, [`TRUNK`] first.
    ///
    /// Configured versions only count when there is a `binaries_dir` to find
    /// them in.
    pub fn versions(&self, tool: &str) -> Vec<String> {
        let mut versions = vec![TRUNK.to_string()];
        if self.binaries_dir.is_some()
            && let Some(configured) = self.versions.get(tool)
        {
            for v in configured {
                if !versions.contains(v) {
                    versions.push(v.clone());
                }
            }
        }
        versions
    }

    /// The `Version` parameter for `tool`'s schema.
    pub fn version_parameter(&self, tool: &str) -> ParameterSpec {
        version(self.versions(tool))
    }

    /// Program to launch for `tool` at [`TRUNK`].
    pub fn executable(&self, tool: &str, default_name: &str) -> PathBuf {
        self.versioned_executable(tool, default_name, TRUNK)
    }

    /// Program to launch for `tool` at `version`.
    pub fn versioned_executable(&self, tool: &str, default_name: &str, version: &str) -> PathBuf {
        let file_name = format!("{default_name}{}", env::consts::EXE_SUFFIX);
        if version != TRUNK
            && let Some(ref dir) = self.binaries_dir
        {
            return dir.join(tool).join(version).join(file_name);
        }
        if let Some(path) = self.executables.get(tool) {
            return path.clone();
        }
        match self.binaries_dir {
            Some(ref dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Program for a step, honouring its bound `Version` argument.
    pub fn program(
        &self,
        tool: &str,
        default_name: &str,
        args: &BoundArguments,
    ) -> Result<PathBuf, ToolError> {
        let version = match args.get(VERSION) {
            Some(_) => args.string(VERSION)?,
            None => TRUNK,
        };
        Ok(self.versioned_executable(tool, default_name, version))
    }

    /// Where `tool`'s executable actually is, if it can be found.
    pub fn locate(&self, tool: &str, default_name: &str) -> Option<PathBuf> {
        let program = self.executable(tool, default_name);
        if program.components().count() > 1 || program.is_absolute() {
            return program.is_file().then_some(program);
        }
        search_path(&program)
    }
}

fn search_path(program: &Path) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
