//! In-memory ordered view index fed by projection output.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::types::{StateKey, Timestamp};
use crate::views::ViewRow;

/// Row position inside the index: key, owning document, emit position.
type RowId = (StateKey, String, usize);

#[derive(Default)]
struct IndexInner {
    /// Ordered rows: (key, doc id, emit position) -> value.
    rows: BTreeMap<RowId, Option<String>>,

    /// Document id to the rows it currently owns.
    by_document: HashMap<String, Vec<RowId>>,
}

/// Ordered index over emitted `(state, timestamp) -> workflow` rows.
///
/// Each document revision replaces the rows of its previous revision, the
/// way a materialized view is refreshed.
#[derive(Default)]
pub struct ViewIndex {
    inner: RwLock<IndexInner>,
}

impl ViewIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row previously emitted for `doc_id`.
    pub fn update_document(&self, doc_id: &str, rows: Vec<ViewRow>) {
        let mut inner = self.inner.write();
        Self::remove_locked(&mut inner, doc_id);

        if rows.is_empty() {
            return;
        }

        let mut owned = Vec::with_capacity(rows.len());
        for (position, row) in rows.into_iter().enumerate() {
            let id = (row.key, doc_id.to_string(), position);
            inner.rows.insert(id.clone(), row.value);
            owned.push(id);
        }

        debug!(doc_id, rows = owned.len(), "indexed document");
        inner.by_document.insert(doc_id.to_string(), owned);
    }

    /// Drop all rows of a deleted document.
    pub fn remove_document(&self, doc_id: &str) -> bool {
        let mut inner = self.inner.write();
        Self::remove_locked(&mut inner, doc_id)
    }

    fn remove_locked(inner: &mut IndexInner, doc_id: &str) -> bool {
        match inner.by_document.remove(doc_id) {
            Some(ids) => {
                for id in ids {
                    inner.rows.remove(&id);
                }
                true
            }
            None => false,
        }
    }

    /// All rows entering `state` between `from` and `to`, both inclusive.
    ///
    /// Results are ordered by timestamp, then document id.
    pub fn range(
        &self,
        state: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> Vec<(Timestamp, Option<String>)> {
        if from > to {
            return Vec::new();
        }

        let start = (
            StateKey {
                state: state.to_string(),
                timestamp: from,
            },
            String::new(),
            0,
        );
        let inner = self.inner.read();

        inner
            .rows
            .range(start..)
            .take_while(|((key, _, _), _)| key.state == state && key.timestamp <= to)
            .map(|((key, _, _), value)| (key.timestamp, value.clone()))
            .collect()
    }

    /// Distinct workflows that entered `state` within the window, in the
    /// order they were first seen.
    pub fn workflows_entering(&self, state: &str, from: Timestamp, to: Timestamp) -> Vec<String> {
        let mut seen = Vec::new();
        for (_, workflow) in self.range(state, from, to) {
            if let Some(workflow) = workflow {
                if !seen.contains(&workflow) {
                    seen.push(workflow);
                }
            }
        }
        seen
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of documents with at least one row.
    pub fn document_count(&self) -> usize {
        self.inner.read().by_document.len()
    }
}
