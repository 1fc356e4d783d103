//! Eligibility gates
//!
//! Ordered checks deciding whether a failed-run SARIF upload is attempted.
//! Each gate either lets the run through or closes with a [`SkipReason`];
//! the first closed gate wins and later gates are never evaluated. Cheap
//! local checks come before calls into collaborators.
//!
//! Order:
//! 1. tool located
//! 2. upload-on-failure feature enabled
//! 3. upload enabled in the workflow (and not in test mode)
//!
//! Once all gates pass, the category and checkout path are resolved. Failure
//! to resolve them is an error, not a skip: it means the workflow is
//! malformed.

use crate::collaborators::{FeatureEnablement, WorkflowSource};
use crate::context::{RunContext, TRUE_LITERAL};
use crate::error::RecoveryError;
use crate::result::SkipReason;
use crate::types::{Feature, PipelineConfig, ToolHandle};
use salvage_workflow::{InputResolver, WorkflowError};
use std::ops::ControlFlow;
use std::path::PathBuf;

/// Everything the uploader needs once all gates pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    /// Located analysis tool
    pub tool: ToolHandle,
    /// Analysis category, if the workflow sets one
    pub category: Option<String>,
    /// Checkout directory the SARIF paths are relative to
    pub checkout_path: PathBuf,
}

/// Verdict of the gate chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// All gates passed
    Proceed(UploadTarget),
    /// A gate closed
    Skip(SkipReason),
}

impl GateDecision {
    #[inline]
    #[must_use]
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skip(reason) => Some(*reason),
            Self::Proceed(_) => None,
        }
    }
}

/// Unwrap a passed gate or return its skip
macro_rules! gate {
    ($check:expr) => {
        match $check {
            ControlFlow::Continue(value) => value,
            ControlFlow::Break(reason) => {
                tracing::debug!(%reason, "Gate closed");
                return Ok(GateDecision::Skip(reason));
            }
        }
    };
}

/// Gate 1: the init stage located the analysis tool
#[must_use]
pub fn tool_located(config: &PipelineConfig) -> ControlFlow<SkipReason, ToolHandle> {
    match config.tool_handle() {
        Some(tool) => ControlFlow::Continue(tool),
        None => ControlFlow::Break(SkipReason::CodeQlNotFound),
    }
}

/// Gate 2: the upload-on-failure capability is enabled
///
/// # Errors
/// Propagates the feature service's failure.
pub async fn feature_enabled(
    features: &dyn FeatureEnablement,
    tool: &ToolHandle,
) -> Result<ControlFlow<SkipReason>, RecoveryError> {
    if features
        .get_value(Feature::UploadFailedSarifEnabled, tool)
        .await?
    {
        Ok(ControlFlow::Continue(()))
    } else {
        Ok(ControlFlow::Break(SkipReason::FeatureDisabled))
    }
}

/// Gate 3: the workflow uploads SARIF for this job, and test mode is off
///
/// # Errors
/// Returns the resolver's error if the upload input cannot be resolved.
pub fn upload_enabled(
    resolver: &InputResolver<'_>,
    test_mode: bool,
) -> Result<ControlFlow<SkipReason>, WorkflowError> {
    let upload = resolver.upload_input()?;
    if upload != TRUE_LITERAL || test_mode {
        return Ok(ControlFlow::Break(SkipReason::UploadDisabled));
    }
    Ok(ControlFlow::Continue(()))
}

/// The ordered gate chain for one run
pub struct GateChain<'a> {
    config: &'a PipelineConfig,
    context: &'a RunContext,
    features: &'a dyn FeatureEnablement,
    workflow: &'a dyn WorkflowSource,
}

impl<'a> GateChain<'a> {
    #[inline]
    #[must_use]
    pub fn new(
        config: &'a PipelineConfig,
        context: &'a RunContext,
        features: &'a dyn FeatureEnablement,
        workflow: &'a dyn WorkflowSource,
    ) -> Self {
        Self {
            config,
            context,
            features,
            workflow,
        }
    }

    /// Run the gates in order
    ///
    /// # Errors
    /// Returns an error if a collaborator fails or the workflow inputs cannot
    /// be resolved. A closed gate is not an error.
    pub async fn evaluate(&self) -> Result<GateDecision, RecoveryError> {
        let tool = gate!(tool_located(self.config));
        gate!(feature_enabled(self.features, &tool).await?);

        let workflow = self.workflow.get_workflow().await?;
        let resolver = InputResolver::new(&workflow, &self.context.job);
        gate!(upload_enabled(&resolver, self.context.test_mode)?);

        let category = resolver.category_input()?;
        let checkout_path = resolver.checkout_path_input(&self.context.workspace)?;

        tracing::debug!(?category, checkout_path = %checkout_path.display(), "All gates passed");
        Ok(GateDecision::Proceed(UploadTarget {
            tool,
            category,
            checkout_path,
        }))
    }
}
