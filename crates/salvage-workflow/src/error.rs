//! Error types for workflow input resolution
//!
//! Every variant names the input and the action it was requested for, so a
//! malformed workflow can be diagnosed from the message alone.

use std::path::PathBuf;

/// Errors raised while reading a workflow or resolving an analyze-step input
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The job is not declared in the workflow
    #[error("could not get {input} input to {action} since job '{job}' was not found in the workflow")]
    JobNotFound {
        input: String,
        action: String,
        job: String,
    },

    /// The job has no step calling the action
    #[error("could not get {input} input to {action} since the analysis job does not call {action}")]
    ActionNotCalled { input: String, action: String },

    /// Several steps call the action with different values for the input
    #[error(
        "could not get {input} input to {action} since there were multiple steps calling {action} with different values for {input}"
    )]
    ConflictingValues { input: String, action: String },

    /// The input still contains an expression after matrix substitution
    #[error("could not get {input} input to {action} since it contained an unrecognized dynamic value")]
    UnrecognizedDynamicValue { input: String, action: String },

    /// Workflow file could not be read
    #[error("io error reading workflow {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Workflow YAML could not be parsed
    #[error("invalid workflow definition: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Matrix values are not a JSON object
    #[error("invalid matrix: {0}")]
    InvalidMatrix(String),
}

impl WorkflowError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Name of the input this error concerns, if any
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        match self {
            Self::JobNotFound { input, .. }
            | Self::ActionNotCalled { input, .. }
            | Self::ConflictingValues { input, .. }
            | Self::UnrecognizedDynamicValue { input, .. } => Some(input),
            Self::Io { .. } | Self::Parse(_) | Self::InvalidMatrix(_) => None,
        }
    }
}
