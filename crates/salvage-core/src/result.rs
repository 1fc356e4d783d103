//! Failed-run SARIF result
//!
//! The externally observable outcome of one salvage attempt. Exactly one of
//! skipped / errored / uploaded is ever populated; callers match on the enum
//! instead of probing optional fields.

use crate::types::UploadStatusReport;
use serde::Serialize;

/// Why no SARIF file was uploaded for the failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SkipReason {
    /// The init stage never located the analysis tool
    CodeQlNotFound,
    /// The upload-on-failure capability is off
    FeatureDisabled,
    /// The workflow disables SARIF upload, or test mode is on
    UploadDisabled,
    /// An earlier stage of this job already uploaded a SARIF file
    AlreadyUploaded,
}

impl SkipReason {
    /// Documented reason code
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CodeQlNotFound => "CodeQL command not found",
            Self::FeatureDisabled => "Feature disabled",
            Self::UploadDisabled => "SARIF upload is disabled",
            Self::AlreadyUploaded => "SARIF file already uploaded",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size metrics of a successful upload
///
/// Either may be absent when the uploader did not report it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadMetrics {
    pub raw_upload_size_bytes: Option<u64>,
    pub zipped_upload_size_bytes: Option<u64>,
}

impl From<&UploadStatusReport> for UploadMetrics {
    fn from(report: &UploadStatusReport) -> Self {
        Self {
            raw_upload_size_bytes: report.raw_upload_size_bytes,
            zipped_upload_size_bytes: report.zipped_upload_size_bytes,
        }
    }
}

/// Outcome of a failed-run SARIF upload attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "FailedSarifStatusReport")]
pub enum FailedSarifResult {
    /// A gate or the completion marker stopped the upload
    Skipped(SkipReason),
    /// The attempt failed; the message is the error text
    Errored { message: String },
    /// The upload went through
    Uploaded(UploadMetrics),
}

impl FailedSarifResult {
    #[inline]
    #[must_use]
    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped(reason)
    }

    /// Errored result carrying the error's display text
    #[inline]
    #[must_use]
    pub fn errored(error: &impl std::fmt::Display) -> Self {
        Self::Errored {
            message: error.to_string(),
        }
    }

    #[inline]
    #[must_use]
    pub fn uploaded(metrics: UploadMetrics) -> Self {
        Self::Uploaded(metrics)
    }

    #[inline]
    #[must_use]
    pub fn skipped_because(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped(reason) => Some(*reason),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Errored { message } => Some(message),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn metrics(&self) -> Option<&UploadMetrics> {
        match self {
            Self::Uploaded(metrics) => Some(metrics),
            _ => None,
        }
    }

    /// Whether this result is what a run expected to upload a failed-run
    /// SARIF file should observe: an upload, or one already made upstream
    #[inline]
    #[must_use]
    pub fn satisfies_upload_expectation(&self) -> bool {
        matches!(
            self,
            Self::Uploaded(_) | Self::Skipped(SkipReason::AlreadyUploaded)
        )
    }

    /// Flat telemetry view of this result
    #[must_use]
    pub fn status_report(&self) -> FailedSarifStatusReport {
        FailedSarifStatusReport::from(self.clone())
    }
}

impl std::fmt::Display for FailedSarifResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Errored { message } => write!(f, "error: {message}"),
            Self::Uploaded(metrics) => write!(
                f,
                "uploaded (raw: {:?} bytes, zipped: {:?} bytes)",
                metrics.raw_upload_size_bytes, metrics.zipped_upload_size_bytes
            ),
        }
    }
}

/// Flat status-report fields merged into the job's telemetry
///
/// Only the fields of the populated result variant are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailedSarifStatusReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_failed_run_skipped_because: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_failed_run_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_upload_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipped_upload_size_bytes: Option<u64>,
}

impl From<FailedSarifResult> for FailedSarifStatusReport {
    fn from(result: FailedSarifResult) -> Self {
        match result {
            FailedSarifResult::Skipped(reason) => Self {
                upload_failed_run_skipped_because: Some(reason.as_str().to_string()),
                ..Self::default()
            },
            FailedSarifResult::Errored { message } => Self {
                upload_failed_run_error: Some(message),
                ..Self::default()
            },
            FailedSarifResult::Uploaded(metrics) => Self {
                raw_upload_size_bytes: metrics.raw_upload_size_bytes,
                zipped_upload_size_bytes: metrics.zipped_upload_size_bytes,
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reason_codes() {
        assert_eq!(SkipReason::CodeQlNotFound.to_string(), "CodeQL command not found");
        assert_eq!(SkipReason::FeatureDisabled.to_string(), "Feature disabled");
        assert_eq!(SkipReason::UploadDisabled.to_string(), "SARIF upload is disabled");
        assert_eq!(
            SkipReason::AlreadyUploaded.to_string(),
            "SARIF file already uploaded"
        );
    }

    #[test]
    fn accessors_match_variant() {
        let skipped = FailedSarifResult::skipped(SkipReason::FeatureDisabled);
        assert_eq!(skipped.skipped_because(), Some(SkipReason::FeatureDisabled));
        assert!(skipped.error().is_none());
        assert!(skipped.metrics().is_none());

        let errored = FailedSarifResult::errored(&"boom");
        assert_eq!(errored.error(), Some("boom"));
        assert!(errored.skipped_because().is_none());
        assert!(errored.metrics().is_none());
    }

    #[test]
    fn metrics_copied_from_status_report() {
        let report = UploadStatusReport {
            raw_upload_size_bytes: Some(1000),
            zipped_upload_size_bytes: Some(200),
            num_results_in_sarif: Some(7),
        };
        let result = FailedSarifResult::uploaded(UploadMetrics::from(&report));
        let metrics = result.metrics().unwrap();
        assert_eq!(metrics.raw_upload_size_bytes, Some(1000));
        assert_eq!(metrics.zipped_upload_size_bytes, Some(200));
    }

    #[test]
    fn serializes_only_populated_variant() {
        let skipped = serde_json::to_value(FailedSarifResult::skipped(SkipReason::CodeQlNotFound))
            .unwrap();
        assert_eq!(
            skipped,
            json!({ "upload_failed_run_skipped_because": "CodeQL command not found" })
        );

        let errored = serde_json::to_value(FailedSarifResult::Errored {
            message: "missing input".to_string(),
        })
        .unwrap();
        assert_eq!(errored, json!({ "upload_failed_run_error": "missing input" }));

        let uploaded = serde_json::to_value(FailedSarifResult::uploaded(UploadMetrics {
            raw_upload_size_bytes: Some(5000),
            zipped_upload_size_bytes: None,
        }))
        .unwrap();
        assert_eq!(uploaded, json!({ "raw_upload_size_bytes": 5000 }));
    }

    #[test]
    fn upload_expectation() {
        assert!(FailedSarifResult::uploaded(UploadMetrics::default()).satisfies_upload_expectation());
        assert!(FailedSarifResult::skipped(SkipReason::AlreadyUploaded)
            .satisfies_upload_expectation());
        assert!(!FailedSarifResult::skipped(SkipReason::UploadDisabled)
            .satisfies_upload_expectation());
        assert!(!FailedSarifResult::errored(&"boom").satisfies_upload_expectation());
    }
}
