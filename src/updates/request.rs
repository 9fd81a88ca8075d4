//! Incoming update payloads and the fields the merger recognizes.

use serde_json::{Map, Value};

use crate::error::{HookError, Result};

/// Message list field.
pub const MSG_FIELD: &str = "msg";

/// Last-write timestamp field.
pub const TS_FIELD: &str = "ts";

/// Fields a merge into an existing log document acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogField {
    /// Appended to the message list.
    Msg,
    /// Overwrites the stored timestamp.
    Timestamp,
    /// Ignored on merge.
    Other,
}

impl LogField {
    pub fn from_key(key: &str) -> Self {
        match key {
            MSG_FIELD => LogField::Msg,
            TS_FIELD => LogField::Timestamp,
            _ => LogField::Other,
        }
    }
}

/// Flat field mapping carried by a write request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeRequest {
    fields: Map<String, Value>,
}

impl MergeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value; only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(HookError::InvalidRequest(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parse the JSON text the host passes as the `doc` query parameter.
    pub fn from_query_doc(doc: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(doc)?;
        Self::from_value(value)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Iterate fields tagged by how a merge treats them.
    pub fn tagged(&self) -> impl Iterator<Item = (LogField, &str, &Value)> {
        self.fields
            .iter()
            .map(|(key, value)| (LogField::from_key(key), key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
