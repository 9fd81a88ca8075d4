//! Log document update combinator.

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::{HookError, Result};
use crate::types::{LogDocument, Status};
use crate::updates::request::{LogField, MergeRequest, MSG_FIELD, TS_FIELD};

/// Default name the update handler is registered under.
pub const DEFAULT_HANDLER_NAME: &str = "updatecomments";

/// Configuration for [`LogMerger`].
#[derive(Clone, Debug)]
pub struct MergerConfig {
    /// Request fields searched, in order, for the new document's id.
    pub id_fields: Vec<String>,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            id_fields: vec!["_id".to_string(), "id".to_string()],
        }
    }
}

/// Result handed back to the host for one write request.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateResponse {
    pub doc: Option<LogDocument>,
    pub status: Status,
    /// Why the write was rejected, if it was.
    pub error: Option<String>,
}

impl UpdateResponse {
    fn accepted(doc: LogDocument) -> Self {
        Self {
            doc: Some(doc),
            status: Status::Ok,
            error: None,
        }
    }

    fn rejected(error: HookError) -> Self {
        warn!(%error, "rejecting log update");
        Self {
            doc: None,
            status: Status::Error,
            error: Some(error.to_string()),
        }
    }

    /// The `[doc, status]` pair the host expects, with `null` for no document.
    pub fn to_json(&self) -> Result<Value> {
        let doc = match &self.doc {
            Some(doc) => doc.to_json()?,
            None => Value::Null,
        };
        Ok(Value::Array(vec![doc, Value::String(self.status.to_string())]))
    }
}

/// An update handler the host calls once per write request.
pub trait UpdateFunction: Send + Sync {
    /// Name the host registers the handler under.
    fn name(&self) -> &str;

    /// Combine the stored document (if any) with the raw request payload.
    fn update(&self, existing: Option<&Value>, query_doc: &str) -> UpdateResponse;
}

/// Creates log documents or merges new messages into them.
///
/// Creation copies the whole request; later merges only append `msg` and
/// overwrite `ts`.
#[derive(Clone, Debug)]
pub struct LogMerger {
    name: String,
    config: MergerConfig,
}

impl Default for LogMerger {
    fn default() -> Self {
        Self::new(MergerConfig::default())
    }
}

impl LogMerger {
    pub fn new(config: MergerConfig) -> Self {
        Self {
            name: DEFAULT_HANDLER_NAME.to_string(),
            config,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(&self) -> &MergerConfig {
        &self.config
    }

    /// Merge and report the outcome as a `(document, status)` pair.
    pub fn merge(
        &self,
        existing: Option<&LogDocument>,
        incoming: MergeRequest,
    ) -> (Option<LogDocument>, Status) {
        match self.try_merge(existing, incoming) {
            Ok(doc) => (Some(doc), Status::Ok),
            Err(error) => {
                warn!(%error, "log merge failed");
                (None, Status::Error)
            }
        }
    }

    /// Merge, returning the new document value.
    ///
    /// `existing` is never modified. The only failure is creating a document
    /// from a request that carries no id.
    pub fn try_merge(
        &self,
        existing: Option<&LogDocument>,
        incoming: MergeRequest,
    ) -> Result<LogDocument> {
        match existing {
            None => self.create(incoming),
            Some(doc) => Ok(self.apply(doc, &incoming)),
        }
    }

    /// Host-facing entry point over raw JSON.
    pub fn update_json(&self, existing: Option<&Value>, query_doc: &str) -> UpdateResponse {
        let request = match MergeRequest::from_query_doc(query_doc) {
            Ok(request) => request,
            Err(error) => return UpdateResponse::rejected(error),
        };

        let existing = match existing.map(LogDocument::from_json).transpose() {
            Ok(existing) => existing,
            Err(error) => return UpdateResponse::rejected(error),
        };

        match self.try_merge(existing.as_ref(), request) {
            Ok(doc) => UpdateResponse::accepted(doc),
            Err(error) => UpdateResponse::rejected(error),
        }
    }

    fn create(&self, incoming: MergeRequest) -> Result<LogDocument> {
        let id = self
            .identifier(&incoming)
            .ok_or(HookError::MissingIdentifier)?;

        let mut fields = incoming.into_map();
        let msg = fields.remove(MSG_FIELD).unwrap_or(Value::Null);
        let ts = fields.remove(TS_FIELD);
        // Both spellings are owned by `LogDocument::id`.
        fields.remove("_id");
        fields.remove("id");

        debug!(id = %id, extra_fields = fields.len(), "creating log document");

        Ok(LogDocument {
            id,
            msg: vec![msg],
            ts,
            extra: fields,
        })
    }

    fn apply(&self, existing: &LogDocument, incoming: &MergeRequest) -> LogDocument {
        let mut merged = existing.clone();

        for (field, key, value) in incoming.tagged() {
            match field {
                LogField::Msg => merged.msg.push(value.clone()),
                LogField::Timestamp => merged.ts = Some(value.clone()),
                LogField::Other => trace!(key, "ignoring field on merge"),
            }
        }

        debug!(id = %merged.id, messages = merged.msg.len(), "merged log document");
        merged
    }

    fn identifier(&self, incoming: &MergeRequest) -> Option<String> {
        self.config
            .id_fields
            .iter()
            .find_map(|field| match incoming.get(field)? {
                Value::String(id) if !id.is_empty() => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            })
    }
}

impl UpdateFunction for LogMerger {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&self, existing: Option<&Value>, query_doc: &str) -> UpdateResponse {
        self.update_json(existing, query_doc)
    }
}
