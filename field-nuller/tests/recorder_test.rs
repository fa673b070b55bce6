use chrono::Utc;
use field_nuller::{
    recorder::artifact_name, BatchBuilder, BatchOutcome, FieldSet, Identifier, ResultRecorder,
    RunSummary,
};
use serde_json::json;

fn failure(batch_index: usize) -> BatchOutcome {
    let ids = vec![Identifier::parse("c-1").unwrap(), Identifier::parse("c-2").unwrap()];
    let batch = BatchBuilder::default()
        .build(&ids, &FieldSet::parse("email").unwrap())
        .remove(0);
    BatchOutcome::Failure {
        batch_index,
        error_message: "update request failed with status: 503, body: busy".to_string(),
        batch,
        timestamp: Utc::now(),
    }
}

fn success(batch_index: usize) -> BatchOutcome {
    BatchOutcome::Success {
        batch_index,
        response_body: json!({"updated": 2}),
    }
}

#[test]
fn test_artifact_names_sort_by_index() {
    assert_eq!(artifact_name(&success(1)), "batch_0001_response.json");
    assert_eq!(artifact_name(&failure(12)), "batch_0012_error.json");
    assert!(artifact_name(&success(9)) < artifact_name(&success(10)));
}

#[tokio::test]
async fn test_recorder_creates_directory_and_writes_both_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = ResultRecorder::new(dir.path().join("results"));

    recorder.ensure_dir().await.unwrap();
    recorder.ensure_dir().await.unwrap();

    let ok_path = recorder.write_outcome(&success(1)).await.unwrap();
    let err_path = recorder.write_outcome(&failure(2)).await.unwrap();

    let ok: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(ok_path).unwrap()).unwrap();
    assert_eq!(ok, json!({"updated": 2}));

    let err: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(err_path).unwrap()).unwrap();
    assert_eq!(err["error"], "update request failed with status: 503, body: busy");
    assert_eq!(err["batch"]["items"][1], json!({"id": "c-2", "fields": {"email": null}}));
    assert!(err["timestamp"].is_string());
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("results");
    std::fs::write(&blocker, "not a directory").unwrap();

    let recorder = ResultRecorder::new(&blocker);
    assert!(recorder.write_outcome(&success(1)).await.is_err());
}

#[test]
fn test_summarize_counts_outcomes() {
    let summary = ResultRecorder::summarize(&[success(1), failure(2), success(3)]);
    assert_eq!(
        summary,
        RunSummary {
            total_batches: 3,
            succeeded: 2,
            failed: 1,
            unrecorded: 0,
            not_attempted: 0,
        }
    );
    assert_eq!(summary.to_string(), "2 succeeded, 1 failed of 3 batches");
}
