//! Testing utilities for the salvage workspace
//!
//! Shared fixtures and a recording fake for every collaborator.

#![allow(missing_docs)]

use parking_lot::Mutex;
use salvage_core::{
    AnalysisTool, CollaboratorError, Collaborators, ConfigSource, DebugArtifacts, Feature,
    FeatureEnablement, LoggingConfig, PipelineConfig, ProcessingOptions, RepositoryNwo,
    RunContext, SarifUploader, ToolHandle, UploadOutcome, UploadStatusReport, WorkflowSource,
};
use salvage_workflow::{WorkflowDefinition, WorkflowError, WorkflowJobMatrix};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Workflow with one job per interesting shape of the analyze step
pub const FIXTURE_WORKFLOW: &str = r"
name: CodeQL
jobs:
  analyze:
    steps:
      - uses: actions/checkout@v4
      - uses: github/codeql-action/init@v3
      - uses: github/codeql-action/analyze@v3
        with:
          category: /language:${{ matrix.language }}
          upload: true
  default-upload:
    steps:
      - uses: github/codeql-action/analyze@v3
  no-upload:
    steps:
      - uses: github/codeql-action/analyze@v3
        with:
          upload: false
  custom-checkout:
    steps:
      - uses: github/codeql-action/analyze@v3
        with:
          checkout_path: /src/${{ matrix.language }}
  unknown-expression:
    steps:
      - uses: github/codeql-action/analyze@v3
        with:
          category: ${{ env.CATEGORY }}
  conflicting:
    steps:
      - uses: github/codeql-action/analyze@v3
        with:
          category: first
      - uses: github/codeql-action/analyze@v3
        with:
          category: second
  no-analyze:
    steps:
      - uses: actions/checkout@v4
";

/// Path the fake config reports for the analysis tool
pub const FAKE_CODEQL_CMD: &str = "/opt/hostedtoolcache/codeql/codeql";

/// SARIF id returned by the fake uploader
pub const FAKE_SARIF_ID: &str = "fake-sarif-id";

pub fn test_repository() -> RepositoryNwo {
    RepositoryNwo::new("octo-org", "widgets")
}

/// Run context for `job` with `language` as its only matrix axis
pub fn context(job: &str) -> RunContext {
    RunContext::new(
        WorkflowJobMatrix::new(job).with_axis("language", "javascript"),
        test_repository(),
    )
    .with_workspace("/home/runner/work/widgets")
}

/// Configuration with the analysis tool located
pub fn located_config() -> PipelineConfig {
    PipelineConfig::new().with_codeql_cmd(FAKE_CODEQL_CMD)
}

/// Install a test-writer subscriber at debug level
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = salvage_core::logging::init(
        &LoggingConfig::new()
            .with_default_directive("salvage_core=debug,salvage_workflow=debug")
            .with_test_writer(),
    );
}

/// A recorded collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    LoadConfig,
    GetFeature {
        feature: Feature,
        tool: ToolHandle,
    },
    GetWorkflow,
    DiagnosticsExport {
        output: PathBuf,
        category: Option<String>,
    },
    Upload {
        sarif_file: PathBuf,
        checkout_path: PathBuf,
        category: Option<String>,
    },
    WaitForProcessing {
        sarif_id: String,
        options: ProcessingOptions,
    },
    UploadDatabaseBundle,
    UploadLogs,
    PrintDebugLogs,
}

impl Call {
    /// Whether the call belongs to the upload itself
    #[must_use]
    pub fn is_upload_step(&self) -> bool {
        matches!(
            self,
            Self::DiagnosticsExport { .. } | Self::Upload { .. } | Self::WaitForProcessing { .. }
        )
    }

    #[must_use]
    pub fn is_debug_capture(&self) -> bool {
        matches!(
            self,
            Self::UploadDatabaseBundle | Self::UploadLogs | Self::PrintDebugLogs
        )
    }
}

/// Fake implementing every collaborator, recording calls in order
#[derive(Debug)]
pub struct FakeCollaborators {
    config: Option<PipelineConfig>,
    config_failure: Option<String>,
    feature_enabled: bool,
    workflow_yaml: String,
    export_failure: Option<String>,
    upload_failure: Option<String>,
    upload_report: UploadStatusReport,
    debug_failure: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl Default for FakeCollaborators {
    fn default() -> Self {
        Self {
            config: Some(located_config()),
            config_failure: None,
            feature_enabled: true,
            workflow_yaml: FIXTURE_WORKFLOW.to_string(),
            export_failure: None,
            upload_failure: None,
            upload_report: UploadStatusReport {
                raw_upload_size_bytes: Some(5000),
                zipped_upload_size_bytes: Some(1200),
                num_results_in_sarif: Some(1),
            },
            debug_failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeCollaborators {
    /// Located tool, feature on, fixture workflow, successful upload
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Config returned by the init stage; `None` simulates an early init failure
    #[must_use]
    pub fn with_config(mut self, config: Option<PipelineConfig>) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_debug_mode(mut self) -> Self {
        if let Some(config) = self.config.take() {
            self.config = Some(config.with_debug_mode(true));
        }
        self
    }

    #[must_use]
    pub fn with_config_failure(mut self, message: &str) -> Self {
        self.config_failure = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn with_tool_missing(mut self) -> Self {
        if let Some(config) = self.config.as_mut() {
            config.codeql_cmd = None;
        }
        self
    }

    #[must_use]
    pub fn with_feature_enabled(mut self, enabled: bool) -> Self {
        self.feature_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_workflow(mut self, yaml: &str) -> Self {
        self.workflow_yaml = yaml.to_string();
        self
    }

    #[must_use]
    pub fn with_export_failure(mut self, message: &str) -> Self {
        self.export_failure = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn with_upload_failure(mut self, message: &str) -> Self {
        self.upload_failure = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn with_upload_sizes(mut self, raw: Option<u64>, zipped: Option<u64>) -> Self {
        self.upload_report.raw_upload_size_bytes = raw;
        self.upload_report.zipped_upload_size_bytes = zipped;
        self
    }

    #[must_use]
    pub fn with_debug_failure(mut self, message: &str) -> Self {
        self.debug_failure = Some(message.to_string());
        self
    }

    /// Wire the fake in as every collaborator
    #[must_use]
    pub fn into_collaborators(self) -> (Arc<Self>, Collaborators) {
        let fake = Arc::new(self);
        let collaborators = Collaborators {
            config: fake.clone(),
            features: fake.clone(),
            workflow: fake.clone(),
            tool: fake.clone(),
            uploader: fake.clone(),
            debug_artifacts: fake.clone(),
        };
        (fake, collaborators)
    }

    /// Calls so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|&call| predicate(call)).count()
    }

    #[must_use]
    pub fn upload_steps(&self) -> Vec<Call> {
        self.calls.lock().iter().filter(|c| c.is_upload_step()).cloned().collect()
    }

    #[must_use]
    pub fn debug_captures(&self) -> Vec<Call> {
        self.calls.lock().iter().filter(|c| c.is_debug_capture()).cloned().collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn debug_result(&self, operation: &str) -> Result<(), CollaboratorError> {
        match &self.debug_failure {
            Some(message) => Err(CollaboratorError::new(operation, message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ConfigSource for FakeCollaborators {
    async fn load(&self) -> Result<Option<PipelineConfig>, CollaboratorError> {
        self.record(Call::LoadConfig);
        match &self.config_failure {
            Some(message) => Err(CollaboratorError::new("load config", message.clone())),
            None => Ok(self.config.clone()),
        }
    }
}

#[async_trait::async_trait]
impl FeatureEnablement for FakeCollaborators {
    async fn get_value(
        &self,
        feature: Feature,
        tool: &ToolHandle,
    ) -> Result<bool, CollaboratorError> {
        self.record(Call::GetFeature {
            feature,
            tool: tool.clone(),
        });
        Ok(self.feature_enabled)
    }
}

#[async_trait::async_trait]
impl WorkflowSource for FakeCollaborators {
    async fn get_workflow(&self) -> Result<WorkflowDefinition, WorkflowError> {
        self.record(Call::GetWorkflow);
        WorkflowDefinition::from_yaml_str(&self.workflow_yaml)
    }
}

#[async_trait::async_trait]
impl AnalysisTool for FakeCollaborators {
    async fn diagnostics_export(
        &self,
        _tool: &ToolHandle,
        output: &Path,
        category: Option<&str>,
    ) -> Result<(), CollaboratorError> {
        self.record(Call::DiagnosticsExport {
            output: output.to_path_buf(),
            category: category.map(str::to_string),
        });
        match &self.export_failure {
            Some(message) => Err(CollaboratorError::new("diagnostics export", message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl SarifUploader for FakeCollaborators {
    async fn upload_from_actions(
        &self,
        sarif_file: &Path,
        checkout_path: &Path,
        category: Option<&str>,
    ) -> Result<UploadOutcome, CollaboratorError> {
        self.record(Call::Upload {
            sarif_file: sarif_file.to_path_buf(),
            checkout_path: checkout_path.to_path_buf(),
            category: category.map(str::to_string),
        });
        match &self.upload_failure {
            Some(message) => Err(CollaboratorError::new("SARIF upload", message.clone())),
            None => Ok(UploadOutcome::new(FAKE_SARIF_ID, self.upload_report.clone())),
        }
    }

    async fn wait_for_processing(
        &self,
        _repository: &RepositoryNwo,
        sarif_id: &str,
        options: ProcessingOptions,
    ) -> Result<(), CollaboratorError> {
        self.record(Call::WaitForProcessing {
            sarif_id: sarif_id.to_string(),
            options,
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl DebugArtifacts for FakeCollaborators {
    async fn upload_database_bundle(
        &self,
        _config: &PipelineConfig,
    ) -> Result<(), CollaboratorError> {
        self.record(Call::UploadDatabaseBundle);
        self.debug_result("database bundle upload")
    }

    async fn upload_logs(&self, _config: &PipelineConfig) -> Result<(), CollaboratorError> {
        self.record(Call::UploadLogs);
        self.debug_result("log upload")
    }

    async fn print_debug_logs(&self, _config: &PipelineConfig) -> Result<(), CollaboratorError> {
        self.record(Call::PrintDebugLogs);
        self.debug_result("print debug logs")
    }
}
