use proptest::prelude::*;
use salvage_core::{FailedRunRecovery, FailedSarifResult, SkipReason};
use salvage_test_utils::{context, FakeCollaborators};

#[derive(Debug, Clone, Copy)]
struct Conditions {
    marker: bool,
    tool_located: bool,
    feature_enabled: bool,
    workflow_uploads: bool,
    test_mode: bool,
}

/// First closed gate wins; all open means an upload
fn expected(c: Conditions) -> Option<SkipReason> {
    if c.marker {
        Some(SkipReason::AlreadyUploaded)
    } else if !c.tool_located {
        Some(SkipReason::CodeQlNotFound)
    } else if !c.feature_enabled {
        Some(SkipReason::FeatureDisabled)
    } else if !c.workflow_uploads || c.test_mode {
        Some(SkipReason::UploadDisabled)
    } else {
        None
    }
}

fn evaluate(c: Conditions) -> FailedSarifResult {
    let mut fake = FakeCollaborators::new().with_feature_enabled(c.feature_enabled);
    if !c.tool_located {
        fake = fake.with_tool_missing();
    }
    let (_, collaborators) = fake.into_collaborators();
    let job = if c.workflow_uploads { "analyze" } else { "no-upload" };
    let ctx = context(job)
        .with_sarif_already_uploaded(c.marker)
        .with_test_mode(c.test_mode);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime
        .block_on(FailedRunRecovery::new(collaborators).run(&ctx))
        .unwrap()
        .into_result()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_first_closed_gate_decides(
        marker in any::<bool>(),
        tool_located in any::<bool>(),
        feature_enabled in any::<bool>(),
        workflow_uploads in any::<bool>(),
        test_mode in any::<bool>(),
    ) {
        let conditions = Conditions { marker, tool_located, feature_enabled, workflow_uploads, test_mode };
        let result = evaluate(conditions);

        prop_assert_eq!(result.skipped_because(), expected(conditions));
    }

    #[test]
    fn prop_exactly_one_outcome(
        marker in any::<bool>(),
        tool_located in any::<bool>(),
        feature_enabled in any::<bool>(),
        workflow_uploads in any::<bool>(),
        test_mode in any::<bool>(),
    ) {
        let result = evaluate(Conditions { marker, tool_located, feature_enabled, workflow_uploads, test_mode });

        let populated = [
            result.skipped_because().is_some(),
            result.error().is_some(),
            result.metrics().is_some(),
        ];
        prop_assert_eq!(populated.iter().filter(|set| **set).count(), 1);

        let report = serde_json::to_value(&result).unwrap();
        let skipped = report.get("upload_failed_run_skipped_because").is_some();
        let uploaded = report.get("raw_upload_size_bytes").is_some();
        prop_assert!(skipped != uploaded);
    }
}

#[test]
fn marker_wins_over_every_closed_gate() {
    let result = evaluate(Conditions {
        marker: true,
        tool_located: false,
        feature_enabled: false,
        workflow_uploads: false,
        test_mode: true,
    });
    assert_eq!(result.skipped_because(), Some(SkipReason::AlreadyUploaded));
}
