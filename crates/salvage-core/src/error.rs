//! Error types for failed-run salvage
//!
//! Provides error handling for:
//! - Collaborator failures (tool export, upload, processing wait, sources)
//! - Malformed workflow inputs
//! - Run context construction at the process edge
//! - Test-mode expectation violations

use salvage_workflow::WorkflowError;

/// Prefix shared by every expectation violation message
pub const EXPECTATION_MISMATCH: &str =
    "Expected to upload a failed SARIF file for this CodeQL code scanning run";

/// Main salvage error type
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// Workflow inputs could not be resolved
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// An external collaborator failed
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Run context could not be built
    #[error("context error: {0}")]
    Context(#[from] ContextError),

    /// Upload was expected but the attempt failed
    #[error("{prefix}, but the attempt failed: {source}", prefix = EXPECTATION_MISMATCH)]
    UploadExpectedButFailed {
        #[source]
        source: Box<RecoveryError>,
    },

    /// Upload was expected but the run skipped it
    #[error("{prefix}, but the result was instead {result}.", prefix = EXPECTATION_MISMATCH)]
    UploadExpectedButSkipped {
        /// Serialized status report of the actual result
        result: String,
    },

    /// Debug artifact capture failed
    #[error("debug artifact capture failed: {0}")]
    DebugArtifact(#[source] CollaboratorError),
}

impl RecoveryError {
    /// Check if error is a test-mode expectation violation
    #[inline]
    #[must_use]
    pub fn is_expectation_violation(&self) -> bool {
        matches!(
            self,
            Self::UploadExpectedButFailed { .. } | Self::UploadExpectedButSkipped { .. }
        )
    }

    /// Create expectation violation wrapping a failed attempt
    #[inline]
    pub fn upload_expected_but_failed(source: impl Into<Box<RecoveryError>>) -> Self {
        Self::UploadExpectedButFailed {
            source: source.into(),
        }
    }
}

/// Failure reported by an external collaborator
///
/// Collaborators are black boxes; only the failing operation and its message
/// are kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed: {message}")]
pub struct CollaboratorError {
    /// Operation that failed, e.g. `diagnostics export`
    pub operation: String,
    /// Collaborator-provided message
    pub message: String,
}

impl CollaboratorError {
    /// Create new collaborator error
    #[inline]
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Errors building a run context from the process environment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// Required environment variable is unset
    #[error("required environment variable {0} is not set")]
    MissingEnv(String),

    /// Repository is not of the form `owner/name`
    #[error("invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),

    /// Matrix JSON is invalid
    #[error("invalid matrix: {0}")]
    InvalidMatrix(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_error_display() {
        let err = CollaboratorError::new("sarif upload", "HTTP 502");
        assert_eq!(err.to_string(), "sarif upload failed: HTTP 502");
    }

    #[test]
    fn workflow_error_is_transparent() {
        let err = RecoveryError::from(WorkflowError::ActionNotCalled {
            input: "category".to_string(),
            action: "github/codeql-action/analyze".to_string(),
        });
        assert!(err.to_string().starts_with("could not get category input"));
    }

    #[test]
    fn expectation_errors_mention_mismatch() {
        let failed = RecoveryError::upload_expected_but_failed(RecoveryError::from(
            CollaboratorError::new("sarif upload", "HTTP 502"),
        ));
        assert!(failed.is_expectation_violation());
        assert!(failed.to_string().contains(EXPECTATION_MISMATCH));
        assert!(failed.to_string().contains("HTTP 502"));

        let skipped = RecoveryError::UploadExpectedButSkipped {
            result: "{}".to_string(),
        };
        assert!(skipped.is_expectation_violation());
        assert!(skipped.to_string().contains("but the result was instead {}"));
    }

    #[test]
    fn plain_errors_are_not_violations() {
        let err = RecoveryError::DebugArtifact(CollaboratorError::new("logs upload", "quota"));
        assert!(!err.is_expectation_violation());
    }
}
