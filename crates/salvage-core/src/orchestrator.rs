//! Failed-run recovery orchestrator
//!
//! Entry point for the failure path of a code scanning job:
//! - Bails out when the init stage left no configuration
//! - Skips when an earlier stage already uploaded a SARIF file
//! - Otherwise runs the gate chain and uploader, containing their errors
//! - Reconciles the outcome with the test-mode expectation
//! - Captures debug artifacts in debug mode

use crate::collaborators::Collaborators;
use crate::context::RunContext;
use crate::error::RecoveryError;
use crate::gates::{GateChain, GateDecision};
use crate::result::{FailedSarifResult, SkipReason};
use crate::types::PipelineConfig;
use crate::uploader::{FailedSarifUploader, FAILED_RUN_SARIF_PATH};
use std::path::PathBuf;
use tracing::Instrument;

/// Which path a run took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// No configuration from the init stage; nothing was attempted
    Unavailable,
    /// The completion marker was set; upload skipped
    AlreadyUploaded,
    /// The gate chain (and possibly the uploader) ran
    Attempted,
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Unavailable,
    AlreadyUploaded(FailedSarifResult),
    Attempted(FailedSarifResult),
}

impl RunOutcome {
    #[inline]
    #[must_use]
    pub fn state(&self) -> RunState {
        match self {
            Self::Unavailable => RunState::Unavailable,
            Self::AlreadyUploaded(_) => RunState::AlreadyUploaded,
            Self::Attempted(_) => RunState::Attempted,
        }
    }

    /// The result record, absent when the run was unavailable
    #[inline]
    #[must_use]
    pub fn result(&self) -> Option<&FailedSarifResult> {
        match self {
            Self::Unavailable => None,
            Self::AlreadyUploaded(result) | Self::Attempted(result) => Some(result),
        }
    }

    #[inline]
    #[must_use]
    pub fn into_result(self) -> Option<FailedSarifResult> {
        match self {
            Self::Unavailable => None,
            Self::AlreadyUploaded(result) | Self::Attempted(result) => Some(result),
        }
    }
}

/// Check a run's outcome against the test-mode upload expectation
///
/// An unavailable run is not checked: there was nothing to upload.
///
/// # Errors
/// Returns [`RecoveryError::UploadExpectedButSkipped`] if an upload was
/// expected and the outcome is neither an upload nor an earlier upload.
pub fn reconcile_expectation(context: &RunContext, outcome: &RunOutcome) -> Result<(), RecoveryError> {
    if !context.expect_failed_sarif_upload {
        return Ok(());
    }
    match outcome.result() {
        Some(result) if !result.satisfies_upload_expectation() => {
            let report = serde_json::to_string(&result.status_report())
                .unwrap_or_else(|_| result.to_string());
            Err(RecoveryError::UploadExpectedButSkipped { result: report })
        }
        _ => Ok(()),
    }
}

/// Failure-path SARIF salvage and debug-artifact capture
#[derive(Debug, Clone)]
pub struct FailedRunRecovery {
    collaborators: Collaborators,
    sarif_path: PathBuf,
}

impl FailedRunRecovery {
    #[inline]
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            sarif_path: PathBuf::from(FAILED_RUN_SARIF_PATH),
        }
    }

    /// Write the diagnostics export somewhere else
    #[inline]
    #[must_use]
    pub fn with_sarif_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sarif_path = path.into();
        self
    }

    /// Run the failure path for one job
    ///
    /// # Errors
    /// Upload failures never surface here; they become
    /// [`FailedSarifResult::Errored`]. Errors are returned only for:
    /// - a failure loading the configuration
    /// - a test-mode expectation violation
    /// - a debug artifact capture failure
    ///
    /// In debug mode artifacts are captured even when an expectation
    /// violation is returned; a capture failure is then only logged.
    pub async fn run(&self, context: &RunContext) -> Result<RunOutcome, RecoveryError> {
        let span = tracing::info_span!(
            "failed_run_recovery",
            job = %context.job.job_name,
            repository = %context.repository,
        );
        self.run_inner(context).instrument(span).await
    }

    async fn run_inner(&self, context: &RunContext) -> Result<RunOutcome, RecoveryError> {
        let Some(config) = self.collaborators.config.load().await? else {
            tracing::warn!(
                "Debugging artifacts are unavailable since the 'init' Action failed before it could produce any."
            );
            return Ok(RunOutcome::Unavailable);
        };

        let verdict = match self.try_upload_sarif_if_run_failed(&config, context).await {
            Ok(outcome) => {
                Self::log_outcome(&outcome);
                reconcile_expectation(context, &outcome).map(|()| outcome)
            }
            Err(e) => Err(e),
        };

        // Capture runs whatever the upload or expectation verdict was.
        if config.debug_mode {
            if let Err(e) = self.capture_debug_artifacts(&config).await {
                match &verdict {
                    Ok(_) => return Err(e),
                    Err(_) => tracing::warn!(error = %e, "Debug artifact capture failed"),
                }
            }
        }

        verdict
    }

    fn log_outcome(outcome: &RunOutcome) {
        if let Some(reason) = outcome.result().and_then(FailedSarifResult::skipped_because) {
            tracing::debug!(
                %reason,
                "Won't upload a failed SARIF file for this CodeQL code scanning run"
            );
        }
        if let Some(result) = outcome.result() {
            tracing::info!(
                status_report = %serde_json::to_string(result).unwrap_or_default(),
                "Failed-run SARIF status"
            );
        }
    }

    /// Upload unless the completion marker shows an earlier upload
    ///
    /// The marker takes precedence over everything else, including the
    /// test-mode expectation.
    ///
    /// # Errors
    /// Returns [`RecoveryError::UploadExpectedButFailed`] if the attempt
    /// failed while an upload was expected. Other failures become an errored
    /// result.
    pub async fn try_upload_sarif_if_run_failed(
        &self,
        config: &PipelineConfig,
        context: &RunContext,
    ) -> Result<RunOutcome, RecoveryError> {
        if context.sarif_already_uploaded {
            return Ok(RunOutcome::AlreadyUploaded(FailedSarifResult::skipped(
                SkipReason::AlreadyUploaded,
            )));
        }

        match self.maybe_upload_failed_sarif(config, context).await {
            Ok(result) => Ok(RunOutcome::Attempted(result)),
            Err(e) if context.expect_failed_sarif_upload => {
                Err(RecoveryError::upload_expected_but_failed(e))
            }
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    "Failed to upload a SARIF file for this failed CodeQL code scanning run"
                );
                Ok(RunOutcome::Attempted(FailedSarifResult::errored(&e)))
            }
        }
    }

    /// Run the gate chain and, if it passes, the uploader
    ///
    /// # Errors
    /// Propagates workflow and collaborator failures.
    pub async fn maybe_upload_failed_sarif(
        &self,
        config: &PipelineConfig,
        context: &RunContext,
    ) -> Result<FailedSarifResult, RecoveryError> {
        let gates = GateChain::new(
            config,
            context,
            self.collaborators.features.as_ref(),
            self.collaborators.workflow.as_ref(),
        );
        match gates.evaluate().await? {
            GateDecision::Skip(reason) => Ok(FailedSarifResult::skipped(reason)),
            GateDecision::Proceed(target) => {
                FailedSarifUploader::new(
                    self.collaborators.tool.as_ref(),
                    self.collaborators.uploader.as_ref(),
                    &context.repository,
                )
                .with_sarif_path(self.sarif_path.clone())
                .upload(&target)
                .await
            }
        }
    }

    async fn capture_debug_artifacts(&self, config: &PipelineConfig) -> Result<(), RecoveryError> {
        tracing::info!(
            "Debug mode is on. Uploading available database bundles and logs as debugging artifacts..."
        );
        let artifacts = &self.collaborators.debug_artifacts;
        artifacts
            .upload_database_bundle(config)
            .await
            .map_err(RecoveryError::DebugArtifact)?;
        artifacts
            .upload_logs(config)
            .await
            .map_err(RecoveryError::DebugArtifact)?;
        artifacts
            .print_debug_logs(config)
            .await
            .map_err(RecoveryError::DebugArtifact)?;
        Ok(())
    }
}
