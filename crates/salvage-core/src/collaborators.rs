//! External collaborators
//!
//! Everything the salvage logic does not own is reached through one of
//! these traits. Implementations are injected as `Arc<dyn Trait>` through
//! [`Collaborators`].

use crate::error::CollaboratorError;
use crate::types::{
    Feature, PipelineConfig, ProcessingOptions, RepositoryNwo, ToolHandle, UploadOutcome,
};
use salvage_workflow::{WorkflowDefinition, WorkflowError};
use std::path::Path;
use std::sync::Arc;

/// Source of the configuration left behind by the init stage
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ConfigSource: Send + Sync {
    /// Load the configuration; `None` if the init stage never produced one
    async fn load(&self) -> Result<Option<PipelineConfig>, CollaboratorError>;
}

/// Feature-flag lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeatureEnablement: Send + Sync {
    /// Whether `feature` is enabled for this tool and account
    async fn get_value(&self, feature: Feature, tool: &ToolHandle)
        -> Result<bool, CollaboratorError>;
}

/// Source of the workflow definition of the running job
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WorkflowSource: Send + Sync {
    async fn get_workflow(&self) -> Result<WorkflowDefinition, WorkflowError>;
}

/// The analysis tool
#[async_trait::async_trait]
pub trait AnalysisTool: Send + Sync {
    /// Write the tool's diagnostics as a SARIF file at `output`
    async fn diagnostics_export(
        &self,
        tool: &ToolHandle,
        output: &Path,
        category: Option<&str>,
    ) -> Result<(), CollaboratorError>;
}

/// SARIF upload service
#[async_trait::async_trait]
pub trait SarifUploader: Send + Sync {
    /// Upload a SARIF file
    async fn upload_from_actions(
        &self,
        sarif_file: &Path,
        checkout_path: &Path,
        category: Option<&str>,
    ) -> Result<UploadOutcome, CollaboratorError>;

    /// Wait until the service has processed an upload
    async fn wait_for_processing(
        &self,
        repository: &RepositoryNwo,
        sarif_id: &str,
        options: ProcessingOptions,
    ) -> Result<(), CollaboratorError>;
}

/// Debug artifact capture, used only in debug mode
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DebugArtifacts: Send + Sync {
    /// Upload available database bundles
    async fn upload_database_bundle(&self, config: &PipelineConfig)
        -> Result<(), CollaboratorError>;

    /// Upload the tool's logs
    async fn upload_logs(&self, config: &PipelineConfig) -> Result<(), CollaboratorError>;

    /// Print the tool's logs to the job output
    async fn print_debug_logs(&self, config: &PipelineConfig) -> Result<(), CollaboratorError>;
}

/// All collaborators of a salvage run
#[derive(Clone)]
pub struct Collaborators {
    pub config: Arc<dyn ConfigSource>,
    pub features: Arc<dyn FeatureEnablement>,
    pub workflow: Arc<dyn WorkflowSource>,
    pub tool: Arc<dyn AnalysisTool>,
    pub uploader: Arc<dyn SarifUploader>,
    pub debug_artifacts: Arc<dyn DebugArtifacts>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
