//! Events delivered to a running machine.
//!
//! An event is a kind string plus an arbitrary JSON payload. External callers
//! pick their own kinds; the runtime reserves three for itself.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Kind of the event seen by start-time actions and the initial state.
pub const INIT_EVENT: &str = "machine.init";

/// Kind of the synthetic event emitted when an actor resolves.
pub const DONE_EVENT: &str = "done";

/// Kind of the synthetic event emitted when an actor rejects.
pub const ERROR_EVENT: &str = "error";

/// An event: a kind used for transition lookup plus a payload.
///
/// # Example
///
/// ```rust
/// use statewise::core::Event;
/// use serde_json::json;
///
/// let event = Event::with_data("todo.updated", json!({ "todo": { "completed": true } }));
///
/// assert_eq!(event.kind(), "todo.updated");
/// assert_eq!(event.pointer("/todo/completed"), Some(&json!(true)));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Event {
    /// Create an event without payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: Value::Null,
        }
    }

    /// Create an event carrying a payload.
    pub fn with_data(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    pub(crate) fn init() -> Self {
        Self::new(INIT_EVENT)
    }

    /// Synthetic event for an actor that resolved with `value`.
    pub fn done(state: &str, index: usize, value: Value) -> Self {
        Self::with_data(
            DONE_EVENT,
            json!({ "state": state, "index": index, "value": value }),
        )
    }

    /// Synthetic event for an actor that rejected.
    pub fn error(state: &str, index: usize, error: impl ToString) -> Self {
        Self::with_data(
            ERROR_EVENT,
            json!({ "state": state, "index": index, "error": error.to_string() }),
        )
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Look up a top-level payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Look up a nested payload field with a JSON pointer (`/todo/completed`).
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.data.pointer(pointer)
    }

    /// Whether the runtime produced this event rather than a caller.
    pub fn is_synthetic(&self) -> bool {
        matches!(self.kind.as_str(), INIT_EVENT | DONE_EVENT | ERROR_EVENT)
    }
}

impl From<&str> for Event {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}
