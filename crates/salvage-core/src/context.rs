//! Run context
//!
//! Typed state handed to the salvage entry point by earlier pipeline stages:
//! which job instance is running, where its workspace is, and the flags that
//! would otherwise be read from the process environment. The environment is
//! only consulted in [`RunContext::from_env`], at the process edge.

use crate::error::ContextError;
use crate::types::RepositoryNwo;
use salvage_workflow::WorkflowJobMatrix;
use std::path::PathBuf;

/// Environment variable names read by [`RunContext::from_env`]
pub mod env_vars {
    /// Job id of the running job
    pub const JOB: &str = "GITHUB_JOB";
    /// `owner/name` of the repository
    pub const REPOSITORY: &str = "GITHUB_REPOSITORY";
    /// Default checkout directory
    pub const WORKSPACE: &str = "GITHUB_WORKSPACE";
    /// JSON matrix values of the job instance
    pub const MATRIX: &str = "CODEQL_ACTION_MATRIX";
    /// Completion marker: a SARIF file was already uploaded by this job
    pub const SARIF_UPLOADED: &str = "CODEQL_ACTION_SARIF_UPLOADED";
    /// Internal test mode, suppresses real uploads
    pub const TEST_MODE: &str = "CODEQL_ACTION_TEST_MODE";
    /// Integration-test expectation that a failed-run SARIF file is uploaded
    pub const EXPECT_UPLOAD_FAILED_SARIF: &str = "CODEQL_ACTION_EXPECT_UPLOAD_FAILED_SARIF";
}

/// Literal a boolean flag must equal to count as set
pub const TRUE_LITERAL: &str = "true";

/// State the salvage entry point runs against
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Running job instance
    pub job: WorkflowJobMatrix,
    /// Repository the results belong to
    pub repository: RepositoryNwo,
    /// Default checkout directory
    pub workspace: PathBuf,
    /// Completion marker set by an earlier successful upload in this job
    pub sarif_already_uploaded: bool,
    /// Internal test mode; never perform real uploads
    pub test_mode: bool,
    /// Test-mode expectation that a failed-run SARIF file gets uploaded
    pub expect_failed_sarif_upload: bool,
}

impl RunContext {
    /// Context with all flags cleared and the current directory as workspace
    #[inline]
    #[must_use]
    pub fn new(job: WorkflowJobMatrix, repository: RepositoryNwo) -> Self {
        Self {
            job,
            repository,
            workspace: PathBuf::from("."),
            sarif_already_uploaded: false,
            test_mode: false,
            expect_failed_sarif_upload: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = workspace.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_sarif_already_uploaded(mut self, uploaded: bool) -> Self {
        self.sarif_already_uploaded = uploaded;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_expect_failed_sarif_upload(mut self, expect: bool) -> Self {
        self.expect_failed_sarif_upload = expect;
        self
    }

    /// Build the context from the process environment
    ///
    /// # Errors
    /// See [`RunContext::from_lookup`].
    pub fn from_env() -> Result<Self, ContextError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the context from a variable lookup
    ///
    /// Flags count as set only when their value is exactly `"true"`.
    ///
    /// # Errors
    /// - [`ContextError::MissingEnv`] if the job, repository or workspace is unset
    /// - [`ContextError::InvalidRepository`] if the repository is malformed
    /// - [`ContextError::InvalidMatrix`] if the matrix is not a JSON object
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ContextError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| ContextError::MissingEnv(key.to_string()));
        let flag = |key: &str| lookup(key).as_deref() == Some(TRUE_LITERAL);

        let job_name = required(env_vars::JOB)?;
        let matrix_json = lookup(env_vars::MATRIX).unwrap_or_default();
        let job = WorkflowJobMatrix::from_matrix_json(job_name, &matrix_json)
            .map_err(|e| ContextError::InvalidMatrix(e.to_string()))?;
        let repository = required(env_vars::REPOSITORY)?.parse()?;
        let workspace = required(env_vars::WORKSPACE)?;

        let context = Self::new(job, repository)
            .with_workspace(workspace)
            .with_sarif_already_uploaded(flag(env_vars::SARIF_UPLOADED))
            .with_test_mode(flag(env_vars::TEST_MODE))
            .with_expect_failed_sarif_upload(flag(env_vars::EXPECT_UPLOAD_FAILED_SARIF));

        tracing::debug!(
            job = %context.job.job_name,
            repository = %context.repository,
            sarif_already_uploaded = context.sarif_already_uploaded,
            test_mode = context.test_mode,
            "Built run context from environment"
        );
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecoveryError;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        (env_vars::JOB, "analyze"),
        (env_vars::REPOSITORY, "octo/widgets"),
        (env_vars::WORKSPACE, "/home/runner/work/widgets"),
    ];

    #[test]
    fn minimal_environment() {
        let ctx = RunContext::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(ctx.job.job_name, "analyze");
        assert!(ctx.job.matrix.is_empty());
        assert_eq!(ctx.repository, RepositoryNwo::new("octo", "widgets"));
        assert_eq!(ctx.workspace, PathBuf::from("/home/runner/work/widgets"));
        assert!(!ctx.sarif_already_uploaded);
        assert!(!ctx.test_mode);
        assert!(!ctx.expect_failed_sarif_upload);
    }

    #[test]
    fn flags_require_exact_true() {
        let mut vars = BASE.to_vec();
        vars.push((env_vars::SARIF_UPLOADED, "true"));
        vars.push((env_vars::TEST_MODE, "TRUE"));
        vars.push((env_vars::EXPECT_UPLOAD_FAILED_SARIF, "1"));
        let ctx = RunContext::from_lookup(lookup(&vars)).unwrap();
        assert!(ctx.sarif_already_uploaded);
        assert!(!ctx.test_mode);
        assert!(!ctx.expect_failed_sarif_upload);
    }

    #[test]
    fn marker_ignores_near_miss_values() {
        for value in ["True", "TRUE", "1", "yes", " true", ""] {
            let mut vars = BASE.to_vec();
            vars.push((env_vars::SARIF_UPLOADED, value));
            let ctx = RunContext::from_lookup(lookup(&vars)).unwrap();
            assert!(!ctx.sarif_already_uploaded, "marker set by {value:?}");
        }
    }

    #[test]
    fn context_errors_convert_into_recovery_errors() {
        fn build(vars: &[(&str, &str)]) -> Result<RunContext, RecoveryError> {
            Ok(RunContext::from_lookup(lookup(vars))?)
        }

        let err = build(&BASE[..2]).unwrap_err();
        assert!(matches!(
            &err,
            RecoveryError::Context(ContextError::MissingEnv(name)) if name == env_vars::WORKSPACE
        ));
        assert_eq!(
            err.to_string(),
            "context error: required environment variable GITHUB_WORKSPACE is not set"
        );
        assert!(!err.is_expectation_violation());
    }

    #[test]
    fn matrix_is_parsed() {
        let mut vars = BASE.to_vec();
        vars.push((env_vars::MATRIX, r#"{"language":"go"}"#));
        let ctx = RunContext::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(ctx.job.axis("language").as_deref(), Some("go"));
    }

    #[test]
    fn missing_job_is_error() {
        let err = RunContext::from_lookup(lookup(&BASE[1..])).unwrap_err();
        assert_eq!(err, ContextError::MissingEnv(env_vars::JOB.to_string()));
    }

    #[test]
    fn invalid_inputs_are_errors() {
        let mut vars = BASE.to_vec();
        vars[1] = (env_vars::REPOSITORY, "widgets");
        assert!(matches!(
            RunContext::from_lookup(lookup(&vars)),
            Err(ContextError::InvalidRepository(_))
        ));

        let mut vars = BASE.to_vec();
        vars.push((env_vars::MATRIX, "not json"));
        assert!(matches!(
            RunContext::from_lookup(lookup(&vars)),
            Err(ContextError::InvalidMatrix(_))
        ));
    }

    #[test]
    fn builder_sets_flags() {
        let ctx = RunContext::new(
            WorkflowJobMatrix::new("analyze"),
            RepositoryNwo::new("octo", "widgets"),
        )
        .with_sarif_already_uploaded(true)
        .with_expect_failed_sarif_upload(true);
        assert!(ctx.sarif_already_uploaded);
        assert!(ctx.expect_failed_sarif_upload);
        assert!(!ctx.test_mode);
    }
}
