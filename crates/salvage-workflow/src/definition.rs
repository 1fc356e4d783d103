//! Workflow definition model
//!
//! A deliberately small view of a CI workflow file: jobs, their steps, and
//! the `with:` inputs of each step. Keys the resolver does not need
//! (`runs-on`, `env`, `strategy`, ...) are ignored during deserialization.

use crate::error::WorkflowError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed workflow file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Optional display name of the workflow
    #[serde(default)]
    pub name: Option<String>,
    /// Jobs keyed by their id
    #[serde(default)]
    pub jobs: IndexMap<String, WorkflowJob>,
}

impl WorkflowDefinition {
    /// Parse a workflow from YAML text
    ///
    /// # Errors
    /// Returns [`WorkflowError::Parse`] if the text is not a valid workflow.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, WorkflowError> {
        let workflow: Self = serde_yaml::from_str(yaml)?;
        tracing::debug!(jobs = workflow.jobs.len(), "Parsed workflow definition");
        Ok(workflow)
    }

    /// Look up a job by id
    #[inline]
    #[must_use]
    pub fn job(&self, job_name: &str) -> Option<&WorkflowJob> {
        self.jobs.get(job_name)
    }
}

/// A single job of the workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowJob {
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
    /// Steps in declaration order
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowJob {
    /// Steps whose `uses:` reference contains `action`
    pub fn steps_calling<'a>(&'a self, action: &'a str) -> impl Iterator<Item = &'a WorkflowStep> {
        self.steps
            .iter()
            .filter(move |step| step.uses.as_deref().is_some_and(|uses| uses.contains(action)))
    }
}

/// A single step of a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
    /// Action reference, e.g. `github/codeql-action/analyze@v3`
    #[serde(default)]
    pub uses: Option<String>,
    /// Inputs passed to the action
    #[serde(default)]
    pub with: Option<IndexMap<String, serde_yaml::Value>>,
}

impl WorkflowStep {
    /// Raw text of an input, if set
    ///
    /// Scalars are rendered the way the runner passes them to the action:
    /// `true` becomes `"true"`, `42` becomes `"42"`. A `null` value counts as
    /// unset.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<String> {
        let value = self.with.as_ref()?.get(name)?;
        match value {
            serde_yaml::Value::Null => None,
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            other => serde_yaml::to_string(other)
                .ok()
                .map(|s| s.trim_end().to_string()),
        }
    }
}

/// Identity of one job instance: the job id plus its matrix axis values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowJobMatrix {
    /// Job id as declared under `jobs:`
    pub job_name: String,
    /// Matrix axis values for this instance (empty when the job has no matrix)
    #[serde(default)]
    pub matrix: Map<String, Value>,
}

impl WorkflowJobMatrix {
    /// Job instance without matrix values
    #[inline]
    #[must_use]
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            matrix: Map::new(),
        }
    }

    /// With one matrix axis value
    #[inline]
    #[must_use]
    pub fn with_axis(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.matrix.insert(key.into(), value.into());
        self
    }

    /// Build from the JSON text of the matrix context
    ///
    /// An empty string or `null` means the job has no matrix.
    ///
    /// # Errors
    /// Returns [`WorkflowError::InvalidMatrix`] unless the text is a JSON object.
    pub fn from_matrix_json(job_name: impl Into<String>, json: &str) -> Result<Self, WorkflowError> {
        let job = Self::new(job_name);
        let trimmed = json.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(job);
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(matrix)) => Ok(Self { matrix, ..job }),
            Ok(other) => Err(WorkflowError::InvalidMatrix(format!(
                "expected a JSON object, got {other}"
            ))),
            Err(e) => Err(WorkflowError::InvalidMatrix(e.to_string())),
        }
    }

    /// Matrix value for `key`, rendered as text
    ///
    /// Strings are returned without quotes; other JSON values use their JSON
    /// text.
    #[must_use]
    pub fn axis(&self, key: &str) -> Option<String> {
        self.matrix.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}
