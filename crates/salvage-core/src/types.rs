//! Core types for failed-run salvage
//!
//! Defines the data the salvage logic consumes:
//! - Pipeline configuration left behind by the init stage
//! - Analysis tool handle and feature flags
//! - Repository identity
//! - Upload outcome returned by the uploader

use crate::error::ContextError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration snapshot produced by the init stage
///
/// Read-only from this crate's point of view. Fields this crate does not
/// interpret are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Path of the analysis tool binary, if the init stage located it
    #[serde(default, rename = "codeQLCmd")]
    pub codeql_cmd: Option<PathBuf>,
    /// Whether debug artifacts should be captured
    #[serde(default)]
    pub debug_mode: bool,
    /// Name of the debug artifact bundle
    #[serde(default = "default_debug_artifact_name")]
    pub debug_artifact_name: String,
    /// Name of the database inside debug bundles
    #[serde(default = "default_debug_database_name")]
    pub debug_database_name: String,
    /// Pipeline temporary directory
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    /// Settings not interpreted here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_debug_artifact_name() -> String {
    "debug-artifacts".to_string()
}

fn default_debug_database_name() -> String {
    "db".to_string()
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With analysis tool path
    #[inline]
    #[must_use]
    pub fn with_codeql_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.codeql_cmd = Some(cmd.into());
        self
    }

    /// With debug mode
    #[inline]
    #[must_use]
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Handle of the located analysis tool
    ///
    /// An empty path counts as not located.
    #[must_use]
    pub fn tool_handle(&self) -> Option<ToolHandle> {
        self.codeql_cmd
            .as_deref()
            .filter(|cmd| !cmd.as_os_str().is_empty())
            .map(ToolHandle::new)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            codeql_cmd: None,
            debug_mode: false,
            debug_artifact_name: default_debug_artifact_name(),
            debug_database_name: default_debug_database_name(),
            temp_dir: None,
            extra: Map::new(),
        }
    }
}

/// Handle to the analysis tool located by the init stage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolHandle {
    /// Path of the tool binary
    pub cmd: PathBuf,
}

impl ToolHandle {
    #[inline]
    #[must_use]
    pub fn new(cmd: impl AsRef<Path>) -> Self {
        Self {
            cmd: cmd.as_ref().to_path_buf(),
        }
    }
}

impl std::fmt::Display for ToolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cmd.display())
    }
}

/// Capability flags queried from the feature-enablement service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Feature {
    /// Upload a SARIF file for failed runs
    UploadFailedSarifEnabled,
}

impl Feature {
    /// Flag name as stored by the feature service
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UploadFailedSarifEnabled => "upload_failed_sarif_enabled",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository identity (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryNwo {
    pub owner: String,
    pub repo: String,
}

impl RepositoryNwo {
    #[inline]
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FromStr for RepositoryNwo {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self::new(owner, repo))
            }
            _ => Err(ContextError::InvalidRepository(s.to_string())),
        }
    }
}

impl std::fmt::Display for RepositoryNwo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Status report the uploader returns alongside the upload id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStatusReport {
    /// Size of the SARIF payload before compression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_upload_size_bytes: Option<u64>,
    /// Size of the compressed SARIF payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipped_upload_size_bytes: Option<u64>,
    /// Number of results in the uploaded file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_results_in_sarif: Option<u64>,
}

/// Result of a SARIF upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Server-side identifier of the upload
    pub sarif_id: String,
    /// Size and count metrics
    pub status_report: UploadStatusReport,
}

impl UploadOutcome {
    #[inline]
    #[must_use]
    pub fn new(sarif_id: impl Into<String>, status_report: UploadStatusReport) -> Self {
        Self {
            sarif_id: sarif_id.into(),
            status_report,
        }
    }
}

/// Options for waiting on server-side processing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingOptions {
    /// The upload comes from a run that did not complete successfully
    pub is_unsuccessful_execution: bool,
}

impl ProcessingOptions {
    /// Options for an upload made on behalf of a failed run
    #[inline]
    #[must_use]
    pub const fn unsuccessful_execution() -> Self {
        Self {
            is_unsuccessful_execution: true,
        }
    }
}
