//! A directory of named pipeline definitions.
//!
//! Every `*.toml` file in the directory is parsed as a [`PipelineFile`] and
//! indexed by its `name`. Files that fail to parse or validate are skipped
//! and reported as [`LoadEvent::Error`]; they never prevent other files from
//! loading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::definition::{PipelineDefinition, PipelineFile};

/// Outcome of loading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// A definition was loaded.
    Loaded { name: String, path: PathBuf },
    /// A file could not be loaded.
    Error { path: PathBuf, error: String },
}

/// A definition plus the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedPipeline {
    pub definition: PipelineDefinition,
    pub path: PathBuf,
}

/// Named pipelines loaded from a directory.
#[derive(Debug, Clone, Default)]
pub struct PipelineLibrary {
    pipelines: BTreeMap<String, LoadedPipeline>,
}

impl PipelineLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every pipeline file in `dir`.
    ///
    /// A missing directory yields an empty library. When two files declare
    /// the same name, the one read last wins and the other is reported as an
    /// error.
    pub fn load_dir(dir: &Path) -> (Self, Vec<LoadEvent>) {
        let mut library = Self::new();
        let mut events = Vec::new();

        let mut paths: Vec<PathBuf> = match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| is_pipeline_file(p))
                .collect(),
            Err(e) => {
                debug!("Pipeline directory {} not readable: {}", dir.display(), e);
                return (library, events);
            }
        };
        paths.sort();

        for path in paths {
            events.extend(library.load_file(&path));
        }

        info!(
            "Loaded {} pipelines from {}",
            library.len(),
            dir.display()
        );
        (library, events)
    }

    fn load_file(&mut self, path: &Path) -> Vec<LoadEvent> {
        let file = match PipelineFile::from_file(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                return vec![LoadEvent::Error {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                }];
            }
        };

        if let Err(e) = file.pipeline.validate() {
            warn!("Invalid pipeline in {}: {}", path.display(), e);
            return vec![LoadEvent::Error {
                path: path.to_path_buf(),
                error: e.to_string(),
            }];
        }

        let name = file.pipeline.name.clone();
        let mut events = Vec::new();
        let replaced = self.pipelines.insert(
            name.clone(),
            LoadedPipeline {
                definition: file.pipeline,
                path: path.to_path_buf(),
            },
        );
        if let Some(previous) = replaced {
            warn!(
                "Pipeline {} in {} shadows {}",
                name,
                path.display(),
                previous.path.display()
            );
            events.push(LoadEvent::Error {
                path: previous.path,
                error: format!("pipeline '{}' redefined in {}", name, path.display()),
            });
        }

        debug!("Pipeline loaded: {} (from {})", name, path.display());
        events.push(LoadEvent::Loaded {
            name,
            path: path.to_path_buf(),
        });
        events
    }

    /// Look up a pipeline by name.
    pub fn get(&self, name: &str) -> Option<&LoadedPipeline> {
        self.pipelines.get(name)
    }

    /// All pipelines, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &LoadedPipeline> {
        self.pipelines.values()
    }

    /// Pipeline names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.pipelines.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

fn is_pipeline_file(path: &Path) -> bool {
    path.is_file() && path.extension().map(|ext| ext == "toml").unwrap_or(false)
}
