//! Failed-run SARIF uploader
//!
//! Exports the analysis tool's diagnostics as SARIF, uploads the file, and
//! waits for the service to process it, flagged as coming from an
//! unsuccessful run. No retries: transient failures go to the caller.

use crate::collaborators::{AnalysisTool, SarifUploader};
use crate::error::RecoveryError;
use crate::gates::UploadTarget;
use crate::result::{FailedSarifResult, UploadMetrics};
use crate::types::{ProcessingOptions, RepositoryNwo};
use std::path::{Path, PathBuf};

/// Where the diagnostics export is written, relative to the job's working directory
pub const FAILED_RUN_SARIF_PATH: &str = "../codeql-failed-run.sarif";

/// Uploads a SARIF file for a failed run
pub struct FailedSarifUploader<'a> {
    tool: &'a dyn AnalysisTool,
    uploader: &'a dyn SarifUploader,
    repository: &'a RepositoryNwo,
    sarif_path: PathBuf,
}

impl<'a> FailedSarifUploader<'a> {
    #[inline]
    #[must_use]
    pub fn new(
        tool: &'a dyn AnalysisTool,
        uploader: &'a dyn SarifUploader,
        repository: &'a RepositoryNwo,
    ) -> Self {
        Self {
            tool,
            uploader,
            repository,
            sarif_path: PathBuf::from(FAILED_RUN_SARIF_PATH),
        }
    }

    /// Write the export somewhere else
    #[inline]
    #[must_use]
    pub fn with_sarif_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sarif_path = path.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn sarif_path(&self) -> &Path {
        &self.sarif_path
    }

    /// Export, upload and wait for processing
    ///
    /// # Errors
    /// Returns the first collaborator failure.
    pub async fn upload(&self, target: &UploadTarget) -> Result<FailedSarifResult, RecoveryError> {
        let category = target.category.as_deref();

        self.tool
            .diagnostics_export(&target.tool, &self.sarif_path, category)
            .await?;

        tracing::info!(sarif_file = %self.sarif_path.display(), "Uploading failed SARIF file");
        let outcome = self
            .uploader
            .upload_from_actions(&self.sarif_path, &target.checkout_path, category)
            .await?;

        self.uploader
            .wait_for_processing(
                self.repository,
                &outcome.sarif_id,
                ProcessingOptions::unsuccessful_execution(),
            )
            .await?;

        let metrics = UploadMetrics::from(&outcome.status_report);
        tracing::info!(
            sarif_id = %outcome.sarif_id,
            raw_upload_size_bytes = ?metrics.raw_upload_size_bytes,
            zipped_upload_size_bytes = ?metrics.zipped_upload_size_bytes,
            "Uploaded failed SARIF file"
        );
        Ok(FailedSarifResult::uploaded(metrics))
    }
}
