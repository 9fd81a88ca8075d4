//! Core document types shared by the view and update hooks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{HookError, Result};

/// Seconds since Unix epoch, as the job tracker records state changes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Lenient conversion from a JSON value.
    ///
    /// Integers are taken as is and finite floats are floored, so sub-second
    /// transitions within the same second share a key and only keep their
    /// history order. Anything else (strings, null, NaN) is treated as absent.
    pub fn from_json(value: &Value) -> Option<Self> {
        if let Some(i) = value.as_i64() {
            return Some(Timestamp(i));
        }
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| Timestamp(f.floor() as i64))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Timestamp(value)
    }
}

/// Composite view key: state name first, then the time it was entered.
///
/// Ordering follows the fields, so a scan from `(S, t1)` to `(S, t2)`
/// visits every entry into `S` within that window.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub state: String,
    pub timestamp: Timestamp,
}

impl StateKey {
    pub fn new(state: impl Into<String>, timestamp: i64) -> Self {
        Self {
            state: state.into(),
            timestamp: Timestamp(timestamp),
        }
    }
}

/// One transition in a job's state history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    #[serde(default)]
    pub newstate: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

impl StateRecord {
    pub fn new(newstate: impl Into<String>, timestamp: i64) -> Self {
        Self {
            newstate: Some(newstate.into()),
            timestamp: Some(Timestamp(timestamp)),
        }
    }

    fn from_json(value: &Value) -> Self {
        Self {
            newstate: value
                .get("newstate")
                .and_then(Value::as_str)
                .map(str::to_string),
            timestamp: value.get("timestamp").and_then(Timestamp::from_json),
        }
    }
}

/// A job document carrying its state-transition history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDocument {
    #[serde(default)]
    pub workflow: Option<String>,
    #[serde(default)]
    pub states: Option<Vec<StateRecord>>,
}

impl JobDocument {
    pub fn new(workflow: impl Into<String>, states: Vec<StateRecord>) -> Self {
        Self {
            workflow: Some(workflow.into()),
            states: Some(states),
        }
    }

    /// Build a job document from raw JSON without ever failing.
    ///
    /// Fields of the wrong type are read as absent, so a single bad state
    /// entry does not hide the rest of the history. A non-string `workflow`
    /// is absent too.
    pub fn from_json(value: &Value) -> Self {
        let workflow = value
            .get("workflow")
            .and_then(Value::as_str)
            .map(str::to_string);

        let states = value
            .get("states")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(StateRecord::from_json).collect());

        Self { workflow, states }
    }
}

/// A log document: an append-only message list plus a last-write timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogDocument {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default)]
    pub msg: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,

    /// Fields copied verbatim from the creating request.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            msg: Vec::new(),
            ts: None,
            extra: Map::new(),
        }
    }

    pub fn with_msg(mut self, msg: impl Into<Value>) -> Self {
        self.msg.push(msg.into());
        self
    }

    pub fn with_ts(mut self, ts: impl Into<Value>) -> Self {
        self.ts = Some(ts.into());
        self
    }

    /// Parse a stored document as handed over by the host.
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| HookError::Serialization(e.to_string()))
    }
}

/// Status token returned to the host alongside an update result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    Error,
}

impl Status {
    pub fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Error => write!(f, "Error"),
        }
    }
}
