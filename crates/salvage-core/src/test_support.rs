//! Recording stubs for the tool and uploader in unit tests

use crate::collaborators::{AnalysisTool, SarifUploader};
use crate::error::CollaboratorError;
use crate::types::{ProcessingOptions, RepositoryNwo, ToolHandle, UploadOutcome, UploadStatusReport};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub(crate) struct StubTool {
    failure: Option<String>,
    exports: Mutex<Vec<(PathBuf, Option<String>)>>,
}

impl StubTool {
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn exports(&self) -> Vec<(PathBuf, Option<String>)> {
        self.exports.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AnalysisTool for StubTool {
    async fn diagnostics_export(
        &self,
        _tool: &ToolHandle,
        output: &Path,
        category: Option<&str>,
    ) -> Result<(), CollaboratorError> {
        self.exports
            .lock()
            .unwrap()
            .push((output.to_path_buf(), category.map(str::to_string)));
        match &self.failure {
            Some(message) => Err(CollaboratorError::new("diagnostics export", message.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StubUploader {
    report: UploadStatusReport,
    uploads: Mutex<Vec<(PathBuf, PathBuf, Option<String>)>>,
    waits: Mutex<Vec<(String, ProcessingOptions)>>,
}

impl StubUploader {
    pub(crate) fn new(report: UploadStatusReport) -> Self {
        Self {
            report,
            ..Self::default()
        }
    }

    pub(crate) fn with_sizes(raw: Option<u64>, zipped: Option<u64>) -> Self {
        Self::new(UploadStatusReport {
            raw_upload_size_bytes: raw,
            zipped_upload_size_bytes: zipped,
            num_results_in_sarif: None,
        })
    }

    pub(crate) fn uploads(&self) -> Vec<(PathBuf, PathBuf, Option<String>)> {
        self.uploads.lock().unwrap().clone()
    }

    pub(crate) fn waits(&self) -> Vec<(String, ProcessingOptions)> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SarifUploader for StubUploader {
    async fn upload_from_actions(
        &self,
        sarif_file: &Path,
        checkout_path: &Path,
        category: Option<&str>,
    ) -> Result<UploadOutcome, CollaboratorError> {
        self.uploads.lock().unwrap().push((
            sarif_file.to_path_buf(),
            checkout_path.to_path_buf(),
            category.map(str::to_string),
        ));
        Ok(UploadOutcome::new("sarif-1", self.report.clone()))
    }

    async fn wait_for_processing(
        &self,
        _repository: &RepositoryNwo,
        sarif_id: &str,
        options: ProcessingOptions,
    ) -> Result<(), CollaboratorError> {
        self.waits
            .lock()
            .unwrap()
            .push((sarif_id.to_string(), options));
        Ok(())
    }
}
