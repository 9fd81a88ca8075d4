//! # Document Store Hooks
//!
//! Extension points a document store calls on document lifecycle events.
//!
//! ## Core Concepts
//!
//! - **Views**: Pure projections from a document revision to index rows
//! - **Updates**: Combinators that create or selectively merge a document
//! - **Index**: An ordered row store answering state/time range queries
//!
//! ## Example
//!
//! ```
//! use docstore_hooks::{LogMerger, MergeRequest, StateHistoryIndexer, Status, Timestamp, ViewIndex};
//! use serde_json::json;
//!
//! // Index a job's state history
//! let indexer = StateHistoryIndexer::default();
//! let rows = indexer.project_json(&json!({
//!     "workflow": "wf-1",
//!     "states": [{"newstate": "running", "timestamp": 100}]
//! }));
//!
//! let index = ViewIndex::new();
//! index.update_document("job-1", rows);
//! assert_eq!(
//!     index.workflows_entering("running", Timestamp(0), Timestamp(200)),
//!     vec!["wf-1".to_string()]
//! );
//!
//! // Create then extend a log document
//! let merger = LogMerger::default();
//! let (doc, status) = merger.merge(None, MergeRequest::new().with("_id", "log-1").with("msg", "hello"));
//! assert_eq!(status, Status::Ok);
//!
//! let (doc, _) = merger.merge(doc.as_ref(), MergeRequest::new().with("msg", "world"));
//! assert_eq!(doc.unwrap().msg.len(), 2);
//! ```

pub mod error;
pub mod types;
pub mod updates;
pub mod views;

// Re-exports
pub use error::{HookError, Result};
pub use types::*;
pub use updates::{
    LogField, LogMerger, MergeRequest, MergerConfig, UpdateFunction, UpdateResponse,
};
pub use views::{MapFunction, StateHistoryIndexer, ViewIndex, ViewRow};
