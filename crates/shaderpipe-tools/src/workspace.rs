//! Scoped temporary workspaces for tool invocations.
//!
//! Each invocation gets its own directory holding the input file (named with
//! the extension compilers expect for its language) and whatever the tool
//! writes next to it. The directory is removed when the [`Workspace`] is
//! dropped, on success and failure alike.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use shaderpipe_core::language::file_extension;
use shaderpipe_core::{ShaderCode, ToolError};
use tempfile::TempDir;
use tracing::trace;

/// A temp directory with the step's input already written to it.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    input: PathBuf,
}

impl Workspace {
    /// Create a workspace and write `code` to `input.<ext>`.
    pub async fn with_input(code: &ShaderCode) -> Result<Self, ToolError> {
        let dir = tempfile::Builder::new().prefix("shaderpipe-").tempdir()?;
        let input = dir
            .path()
            .join(format!("input.{}", file_extension(&code.language)));
        tokio::fs::write(&input, code.as_bytes()).await?;

        trace!(
            dir = %dir.path().display(),
            bytes = code.payload.len(),
            "Created tool workspace"
        );
        Ok(Self { dir, input })
    }

    /// Workspace directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the input file.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Path of a file inside the workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Read an output file the tool was expected to write.
    pub async fn read_bytes(&self, name: &str) -> Result<Vec<u8>, ToolError> {
        let path = self.path(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ToolError::MissingOutput(path)),
            Err(e) => Err(ToolError::Io(e)),
        }
    }

    /// Read an expected text output file (invalid UTF-8 is replaced).
    pub async fn read_text(&self, name: &str) -> Result<String, ToolError> {
        let bytes = self.read_bytes(name).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read an optional text output file.
    pub async fn read_text_if_exists(&self, name: &str) -> Result<Option<String>, ToolError> {
        match self.read_text(name).await {
            Ok(text) => Ok(Some(text)),
            Err(ToolError::MissingOutput(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_input_written_with_extension() {
        let ws = Workspace::with_input(&ShaderCode::text("HLSL", "float4 main();"))
            .await
            .unwrap();
        assert!(ws.input().ends_with("input.hlsl"));
        assert_eq!(
            std::fs::read_to_string(ws.input()).unwrap(),
            "float4 main();"
        );
    }

    #[tokio::test]
    async fn test_binary_input_and_unknown_language() {
        let ws = Workspace::with_input(&ShaderCode::binary("WGSL-bin", vec![0, 159, 146, 150]))
            .await
            .unwrap();
        assert!(ws.input().ends_with("input.tmp"));
        assert_eq!(std::fs::read(ws.input()).unwrap(), vec![0, 159, 146, 150]);
    }

    #[tokio::test]
    async fn test_missing_output() {
        let ws = Workspace::with_input(&ShaderCode::text("GLSL", "void main() {}"))
            .await
            .unwrap();
        let err = ws.read_bytes("output.spv").await.unwrap_err();
        assert!(matches!(err, ToolError::MissingOutput(ref p) if p.ends_with("output.spv")));
        assert!(ws.read_text_if_exists("output.spv").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_outputs() {
        let ws = Workspace::with_input(&ShaderCode::text("GLSL", "void main() {}"))
            .await
            .unwrap();
        std::fs::write(ws.path("out.txt"), "#version 450").unwrap();
        assert_eq!(ws.read_text("out.txt").await.unwrap(), "#version 450");
        assert_eq!(
            ws.read_text_if_exists("out.txt").await.unwrap().as_deref(),
            Some("#version 450")
        );
    }

    #[tokio::test]
    async fn test_removed_on_drop() {
        let ws = Workspace::with_input(&ShaderCode::text("HLSL", "x")).await.unwrap();
        let root = ws.root().to_path_buf();
        assert!(root.is_dir());
        drop(ws);
        assert!(!root.exists());
    }
}
