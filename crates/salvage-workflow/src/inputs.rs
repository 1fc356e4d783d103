//! Analyze-step input resolution
//!
//! Resolves the value an input of the analyze action takes for one job
//! instance:
//! - locate the job and the steps calling the action
//! - require all those steps to agree on the input
//! - substitute `${{ matrix.<key> }}` expressions from the job's matrix
//! - reject any expression left over after substitution

use crate::definition::{WorkflowDefinition, WorkflowJobMatrix};
use crate::error::WorkflowError;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Action whose inputs are resolved by default
pub const ANALYZE_ACTION: &str = "github/codeql-action/analyze";

/// Name of the upload input
pub const UPLOAD_INPUT: &str = "upload";
/// Name of the category input
pub const CATEGORY_INPUT: &str = "category";
/// Name of the checkout path input
pub const CHECKOUT_PATH_INPUT: &str = "checkout_path";

/// Value the upload input takes when the workflow does not set it
pub const DEFAULT_UPLOAD_VALUE: &str = "true";

fn matrix_expression() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{\{\s*matrix\.([A-Za-z0-9_-]+)\s*\}\}")
            .expect("Failed to compile matrix expression pattern")
    })
}

/// Resolves analyze-step inputs for one job instance
#[derive(Debug, Clone, Copy)]
pub struct InputResolver<'a> {
    workflow: &'a WorkflowDefinition,
    job: &'a WorkflowJobMatrix,
    action: &'a str,
}

impl<'a> InputResolver<'a> {
    /// Resolver for inputs of [`ANALYZE_ACTION`]
    #[inline]
    #[must_use]
    pub fn new(workflow: &'a WorkflowDefinition, job: &'a WorkflowJobMatrix) -> Self {
        Self {
            workflow,
            job,
            action: ANALYZE_ACTION,
        }
    }

    /// Resolve inputs of another action instead
    #[inline]
    #[must_use]
    pub fn with_action(mut self, action: &'a str) -> Self {
        self.action = action;
        self
    }

    /// Resolved value of `input`, or `None` if no step sets it
    ///
    /// # Errors
    /// - [`WorkflowError::JobNotFound`] if the job is not in the workflow
    /// - [`WorkflowError::ActionNotCalled`] if no step of the job calls the action
    /// - [`WorkflowError::ConflictingValues`] if the calling steps disagree
    /// - [`WorkflowError::UnrecognizedDynamicValue`] if an expression survives substitution
    pub fn step_input(&self, input: &str) -> Result<Option<String>, WorkflowError> {
        let job = self
            .workflow
            .job(&self.job.job_name)
            .ok_or_else(|| WorkflowError::JobNotFound {
                input: input.to_string(),
                action: self.action.to_string(),
                job: self.job.job_name.clone(),
            })?;

        let mut values: Vec<Option<String>> = Vec::new();
        for step in job.steps_calling(self.action) {
            let value = step.input(input);
            if !values.contains(&value) {
                values.push(value);
            }
        }

        let raw = match values.as_slice() {
            [] => {
                return Err(WorkflowError::ActionNotCalled {
                    input: input.to_string(),
                    action: self.action.to_string(),
                })
            }
            [single] => single.clone(),
            _ => {
                return Err(WorkflowError::ConflictingValues {
                    input: input.to_string(),
                    action: self.action.to_string(),
                })
            }
        };

        let Some(raw) = raw else {
            return Ok(None);
        };

        let substituted = self.substitute_matrix(&raw);
        if substituted.contains("${{") {
            return Err(WorkflowError::UnrecognizedDynamicValue {
                input: input.to_string(),
                action: self.action.to_string(),
            });
        }
        Ok(Some(substituted))
    }

    /// Value of the upload input, `"true"` when unset
    ///
    /// # Errors
    /// See [`InputResolver::step_input`].
    pub fn upload_input(&self) -> Result<String, WorkflowError> {
        Ok(self
            .step_input(UPLOAD_INPUT)?
            .unwrap_or_else(|| DEFAULT_UPLOAD_VALUE.to_string()))
    }

    /// Value of the category input
    ///
    /// # Errors
    /// See [`InputResolver::step_input`].
    pub fn category_input(&self) -> Result<Option<String>, WorkflowError> {
        self.step_input(CATEGORY_INPUT)
    }

    /// Value of the checkout path input, `workspace` when unset
    ///
    /// # Errors
    /// See [`InputResolver::step_input`].
    pub fn checkout_path_input(&self, workspace: &Path) -> Result<PathBuf, WorkflowError> {
        Ok(self
            .step_input(CHECKOUT_PATH_INPUT)?
            .map_or_else(|| workspace.to_path_buf(), PathBuf::from))
    }

    fn substitute_matrix(&self, raw: &str) -> String {
        matrix_expression()
            .replace_all(raw, |caps: &Captures<'_>| {
                self.job
                    .axis(&caps[1])
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}
