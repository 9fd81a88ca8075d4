//! Update handlers: combinators from (stored document, request) to a new
//! document revision.
//!
//! Handlers never persist anything. The host reads the stored document,
//! calls the handler and writes the result atomically.

mod log_merger;
mod request;

pub use log_merger::{
    LogMerger, MergerConfig, UpdateFunction, UpdateResponse, DEFAULT_HANDLER_NAME,
};
pub use request::{LogField, MergeRequest, MSG_FIELD, TS_FIELD};
