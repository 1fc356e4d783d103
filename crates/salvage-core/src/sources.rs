//! File-backed configuration and workflow sources

use crate::collaborators::{ConfigSource, WorkflowSource};
use crate::error::CollaboratorError;
use crate::types::PipelineConfig;
use salvage_workflow::{WorkflowDefinition, WorkflowError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the init stage's configuration inside the temp directory
pub const CONFIG_FILE_NAME: &str = "config";

/// Loads the init stage's JSON configuration
///
/// A missing file means the init stage never got far enough to write one.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source reading `<temp_dir>/config`
    #[inline]
    #[must_use]
    pub fn in_temp_dir(temp_dir: impl AsRef<Path>) -> Self {
        Self::new(temp_dir.as_ref().join(CONFIG_FILE_NAME))
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ConfigSource for FileConfigSource {
    async fn load(&self) -> Result<Option<PipelineConfig>, CollaboratorError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No pipeline configuration found");
                return Ok(None);
            }
            Err(e) => {
                return Err(CollaboratorError::new(
                    "load config",
                    format!("{}: {e}", self.path.display()),
                ))
            }
        };
        serde_json::from_str(&text).map(Some).map_err(|e| {
            CollaboratorError::new("load config", format!("{}: {e}", self.path.display()))
        })
    }
}

/// Reads the running workflow from a YAML file
#[derive(Debug, Clone)]
pub struct FileWorkflowSource {
    path: PathBuf,
}

impl FileWorkflowSource {
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl WorkflowSource for FileWorkflowSource {
    async fn get_workflow(&self) -> Result<WorkflowDefinition, WorkflowError> {
        let yaml = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| WorkflowError::io_error(&self.path, e))?;
        WorkflowDefinition::from_yaml_str(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileConfigSource::in_temp_dir(dir.path());
        assert_eq!(source.path(), dir.path().join("config"));
        assert!(source.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn loads_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"codeQLCmd": "/opt/codeql/codeql", "debugMode": false}"#,
        )
        .unwrap();
        let config = FileConfigSource::in_temp_dir(dir.path())
            .load()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(config.codeql_cmd, Some(PathBuf::from("/opt/codeql/codeql")));
    }

    #[tokio::test]
    async fn invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{not json").unwrap();
        let err = FileConfigSource::in_temp_dir(dir.path())
            .load()
            .await
            .unwrap_err();
        assert_eq!(err.operation, "load config");
    }

    #[tokio::test]
    async fn reads_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codeql.yml");
        std::fs::write(
            &path,
            "jobs:\n  analyze:\n    steps:\n      - uses: github/codeql-action/analyze@v3\n",
        )
        .unwrap();
        let workflow = FileWorkflowSource::new(&path).get_workflow().await.unwrap();
        assert!(workflow.job("analyze").is_some());
    }

    #[tokio::test]
    async fn missing_workflow_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileWorkflowSource::new(dir.path().join("absent.yml"))
            .get_workflow()
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Io { .. }));
    }
}
