//! Salvage Core - failed-run SARIF salvage
//!
//! Runs on the failure path of a code scanning job:
//! - Decides whether a SARIF file describing the failure should be uploaded
//! - Exports, uploads and waits for processing when it should
//! - Reports why it skipped or what went wrong as a status record
//! - Captures debug artifacts when the run is in debug mode
//!
//! # Example
//!
//! ```rust,ignore
//! use salvage_core::prelude::*;
//!
//! # async fn example(collaborators: Collaborators) -> Result<(), RecoveryError> {
//! salvage_core::logging::init(&LoggingConfig::default());
//!
//! let context = RunContext::from_env()?;
//! let outcome = FailedRunRecovery::new(collaborators).run(&context).await?;
//!
//! if let Some(result) = outcome.result() {
//!     println!("{}", serde_json::to_string(result)?);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod collaborators;
pub mod context;
pub mod error;
pub mod gates;
pub mod logging;
pub mod orchestrator;
pub mod result;
pub mod sources;
pub mod types;
pub mod uploader;

#[cfg(test)]
mod test_support;

pub use collaborators::{
    AnalysisTool, Collaborators, ConfigSource, DebugArtifacts, FeatureEnablement, SarifUploader,
    WorkflowSource,
};
pub use context::RunContext;
pub use error::{CollaboratorError, ContextError, RecoveryError, EXPECTATION_MISMATCH};
pub use gates::{GateChain, GateDecision, UploadTarget};
pub use logging::{LogFormat, LoggingConfig};
pub use orchestrator::{reconcile_expectation, FailedRunRecovery, RunOutcome, RunState};
pub use result::{FailedSarifResult, FailedSarifStatusReport, SkipReason, UploadMetrics};
pub use sources::{FileConfigSource, FileWorkflowSource};
pub use types::{
    Feature, PipelineConfig, ProcessingOptions, RepositoryNwo, ToolHandle, UploadOutcome,
    UploadStatusReport,
};
pub use uploader::{FailedSarifUploader, FAILED_RUN_SARIF_PATH};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running the failure path
    pub use crate::{
        Collaborators, FailedRunRecovery, FailedSarifResult, LoggingConfig, PipelineConfig,
        RecoveryError, RunContext, RunOutcome, SkipReason,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
