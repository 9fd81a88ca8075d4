//! View projections and the ordered index they feed.
//!
//! Projections are pure functions of a single document revision. The host
//! may run them in any order and in parallel; the index only ever sees
//! whole-revision replacements.

mod index;
mod state_history;

pub use index::ViewIndex;
pub use state_history::{MapFunction, StateHistoryIndexer, ViewRow, DEFAULT_VIEW_NAME};
