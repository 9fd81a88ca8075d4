//! Integration tests for the view and update hooks.

use docstore_hooks::{
    JobDocument, LogDocument, LogMerger, MapFunction, MergeRequest, StateHistoryIndexer,
    StateKey, StateRecord, Status, Timestamp, UpdateFunction, ViewIndex,
};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// --- State History View ---

#[test]
fn test_project_emits_one_row_per_state() {
    init_tracing();
    let indexer = StateHistoryIndexer::default();

    let doc = JobDocument::new(
        "ReReco_Run2024",
        vec![
            StateRecord::new("new", 1000),
            StateRecord::new("created", 1010),
            StateRecord::new("executing", 1100),
            StateRecord::new("complete", 2000),
        ],
    );

    let rows = indexer.project(&doc);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].key, StateKey::new("new", 1000));
    assert_eq!(rows[3].key, StateKey::new("complete", 2000));
    for row in &rows {
        assert_eq!(row.value.as_deref(), Some("ReReco_Run2024"));
    }
}

#[test]
fn test_project_is_deterministic() {
    let indexer = StateHistoryIndexer::default();
    let doc = json!({
        "workflow": "wf",
        "states": [
            {"newstate": "success", "timestamp": 30},
            {"newstate": "new", "timestamp": 10},
            {"newstate": "new", "timestamp": 10}
        ]
    });

    assert_eq!(indexer.map(&doc), indexer.map(&doc));
    assert_eq!(indexer.map(&doc).len(), 3);
}

#[test]
fn test_project_json_skips_only_malformed_entries() {
    let indexer = StateHistoryIndexer::default();
    let rows = indexer.project_json(&json!({
        "workflow": "wf",
        "states": [
            {"newstate": "new", "timestamp": 1},
            {"newstate": null, "timestamp": 2},
            {"newstate": "running"},
            {"newstate": "success", "timestamp": 4.75}
        ]
    }));

    let keys: Vec<_> = rows.into_iter().map(|r| r.key).collect();
    assert_eq!(keys, vec![StateKey::new("new", 1), StateKey::new("success", 4)]);
}

#[test]
fn test_view_index_range_query_across_jobs() {
    init_tracing();
    let indexer = StateHistoryIndexer::default();
    let index = ViewIndex::new();

    let jobs = [
        ("job-1", "wf-a", vec![("new", 10), ("running", 20), ("success", 90)]),
        ("job-2", "wf-b", vec![("new", 15), ("running", 40), ("jobfailed", 60)]),
        ("job-3", "wf-a", vec![("new", 50), ("running", 70)]),
    ];

    for (id, workflow, states) in &jobs {
        let states = states
            .iter()
            .map(|(state, ts)| json!({"newstate": state, "timestamp": ts}))
            .collect::<Vec<_>>();
        let rows = indexer.project_json(&json!({"workflow": workflow, "states": states}));
        index.update_document(id, rows);
    }

    assert_eq!(index.len(), 8);
    assert_eq!(index.document_count(), 3);

    assert_eq!(
        index.workflows_entering("running", Timestamp(0), Timestamp(50)),
        vec!["wf-a".to_string(), "wf-b".to_string()]
    );
    assert_eq!(
        index.workflows_entering("running", Timestamp(41), Timestamp(100)),
        vec!["wf-a".to_string()]
    );
    assert_eq!(index.range("new", Timestamp(11), Timestamp(49)).len(), 1);
}

#[test]
fn test_view_index_tracks_new_revisions() {
    let indexer = StateHistoryIndexer::default();
    let index = ViewIndex::new();

    let mut doc = json!({"workflow": "wf", "states": [{"newstate": "new", "timestamp": 1}]});
    index.update_document("job", indexer.map(&doc));
    assert!(index.range("running", Timestamp(0), Timestamp(10)).is_empty());

    doc["states"]
        .as_array_mut()
        .unwrap()
        .push(json!({"newstate": "running", "timestamp": 5}));
    index.update_document("job", indexer.map(&doc));

    assert_eq!(index.len(), 2);
    assert_eq!(index.range("running", Timestamp(0), Timestamp(10)).len(), 1);
}

// --- Log Merger ---

#[test]
fn test_log_lifecycle() {
    init_tracing();
    let merger = LogMerger::default();

    let (doc, status) = merger.merge(None, MergeRequest::new().with("id", "x").with("msg", "hello"));
    assert_eq!(status, Status::Ok);
    let doc = doc.unwrap();
    assert_eq!(doc.msg, vec![json!("hello")]);

    let (doc, status) = merger.merge(Some(&doc), MergeRequest::new().with("msg", "world"));
    assert_eq!(status, Status::Ok);
    let doc = doc.unwrap();
    assert_eq!(doc.id, "x");
    assert_eq!(doc.msg, vec![json!("hello"), json!("world")]);
}

#[test]
fn test_log_lifecycle_through_stored_json() {
    let merger = LogMerger::default();

    let (doc, status) = merger.merge(None, MergeRequest::new().with("id", "x").with("msg", "hello"));
    assert_eq!(status, Status::Ok);
    let stored = doc.unwrap().to_json().unwrap();

    // Reloaded through the typed API
    let reloaded = LogDocument::from_json(&stored).unwrap();
    let (doc, status) = merger.merge(Some(&reloaded), MergeRequest::new().with("msg", "world"));
    assert_eq!(status, Status::Ok);
    assert_eq!(doc.unwrap().msg, vec![json!("hello"), json!("world")]);

    // Reloaded through the host-facing handler
    let response = merger.update(Some(&stored), r#"{"msg": "world"}"#);
    assert_eq!(response.status, Status::Ok);
    let doc = response.doc.unwrap();
    assert_eq!(doc.id, "x");
    assert_eq!(doc.msg, vec![json!("hello"), json!("world")]);
}

#[test]
fn test_merge_into_stored_doc_keyed_by_id() {
    let merger = LogMerger::default();
    let stored = json!({"id": "x", "msg": ["hello"], "ts": 1});

    let response = merger.update(Some(&stored), r#"{"msg": "world", "ts": 2}"#);
    assert_eq!(response.status, Status::Ok);
    assert_eq!(
        response.doc.unwrap(),
        LogDocument::new("x").with_msg("hello").with_msg("world").with_ts(2)
    );
}

#[test]
fn test_ts_overwritten_not_aggregated() {
    let merger = LogMerger::default();
    let existing = LogDocument::new("x").with_msg("hello").with_ts(1);

    let (doc, status) = merger.merge(Some(&existing), MergeRequest::new().with("ts", 2));
    assert_eq!(status, Status::Ok);
    assert_eq!(doc.unwrap(), LogDocument::new("x").with_msg("hello").with_ts(2));
}

#[test]
fn test_unknown_fields_ignored_on_merge_kept_on_create() {
    let merger = LogMerger::default();

    let created = merger
        .try_merge(
            None,
            MergeRequest::new()
                .with("_id", "x")
                .with("msg", "first")
                .with("agent", "wmagent-1")
                .with("thr", "JobSubmitter"),
        )
        .unwrap();
    assert_eq!(created.extra.get("agent"), Some(&json!("wmagent-1")));
    assert_eq!(created.extra.get("thr"), Some(&json!("JobSubmitter")));

    let (merged, status) = merger.merge(
        Some(&created),
        MergeRequest::new().with("unknownField", "z").with("agent", "other"),
    );
    assert_eq!(status, Status::Ok);
    assert_eq!(merged.unwrap(), created);
}

#[test]
fn test_empty_request_on_existing_is_noop() {
    let merger = LogMerger::default();
    let existing = LogDocument::new("x").with_msg("hello");

    let (doc, status) = merger.merge(Some(&existing), MergeRequest::new());
    assert_eq!(status, Status::Ok);
    assert_eq!(doc.unwrap(), existing);
}

#[test]
fn test_update_handler_over_raw_json() {
    let merger = LogMerger::default();
    assert_eq!(UpdateFunction::name(&merger), "updatecomments");

    let response = merger.update(None, r#"{"_id": "req-1", "msg": "submitted", "ts": 100, "request": "req-1"}"#);
    assert_eq!(response.status, Status::Ok);
    let stored = response.doc.unwrap().to_json().unwrap();
    assert_eq!(
        stored,
        json!({"_id": "req-1", "msg": ["submitted"], "ts": 100, "request": "req-1"})
    );

    let response = merger.update(Some(&stored), r#"{"msg": "running", "ts": 200, "request": "other"}"#);
    assert_eq!(response.status, Status::Ok);
    assert_eq!(
        response.doc.unwrap().to_json().unwrap(),
        json!({"_id": "req-1", "msg": ["submitted", "running"], "ts": 200, "request": "req-1"})
    );
}
