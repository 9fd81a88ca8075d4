//! State-history projection: one view row per recorded state transition.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::types::{JobDocument, StateKey};

/// Default name the projection is registered under.
pub const DEFAULT_VIEW_NAME: &str = "statusByTime";

/// A single emitted index entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRow {
    pub key: StateKey,
    /// Workflow the job belongs to.
    pub value: Option<String>,
}

/// A pure map function the host runs against every document revision.
pub trait MapFunction: Send + Sync {
    /// Name the host registers the view under.
    fn name(&self) -> &str;

    /// Project a raw document into index rows.
    fn map(&self, doc: &Value) -> Vec<ViewRow>;
}

/// Indexes jobs by `(state, time entered)`, valued by workflow.
#[derive(Clone, Debug)]
pub struct StateHistoryIndexer {
    name: String,
}

impl Default for StateHistoryIndexer {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_NAME)
    }
}

impl StateHistoryIndexer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Emit one row per state entry, in history order.
    ///
    /// Entries without a state name or timestamp are skipped; the rest of
    /// the history still emits.
    pub fn project(&self, doc: &JobDocument) -> Vec<ViewRow> {
        let Some(states) = doc.states.as_deref() else {
            return Vec::new();
        };

        states
            .iter()
            .enumerate()
            .filter_map(|(position, record)| {
                match (record.newstate.as_ref(), record.timestamp) {
                    (Some(state), Some(timestamp)) => Some(ViewRow {
                        key: StateKey {
                            state: state.clone(),
                            timestamp,
                        },
                        value: doc.workflow.clone(),
                    }),
                    _ => {
                        trace!(view = %self.name, position, "skipping incomplete state entry");
                        None
                    }
                }
            })
            .collect()
    }

    /// Project a raw JSON document.
    pub fn project_json(&self, doc: &Value) -> Vec<ViewRow> {
        self.project(&JobDocument::from_json(doc))
    }
}

impl MapFunction for StateHistoryIndexer {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, doc: &Value) -> Vec<ViewRow> {
        self.project_json(doc)
    }
}
