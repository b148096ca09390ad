//! Parameters passed to named guards, named actions and actor inputs.

use crate::core::event::Event;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Builds parameters from the current context and triggering event.
pub type ParamsFn<C> = Arc<dyn Fn(&C, &Event) -> Value + Send + Sync>;

/// Static or computed parameters.
///
/// # Example
///
/// ```rust
/// use statewise::core::{Event, Params};
/// use serde_json::{json, Value};
///
/// let params: Params<u32> = Params::build(|_count: &u32, event: &Event| {
///     json!({ "todo": event.get("todo").cloned().unwrap_or(Value::Null) })
/// });
///
/// let event = Event::with_data("todo.updated", json!({ "todo": { "completed": true } }));
/// assert_eq!(params.resolve(&0, &event), json!({ "todo": { "completed": true } }));
/// ```
pub enum Params<C> {
    /// No parameters; resolves to `Value::Null`.
    None,
    Static(Value),
    Build(ParamsFn<C>),
}

impl<C> Params<C> {
    /// Parameters computed at evaluation time.
    pub fn build<F>(builder: F) -> Self
    where
        F: Fn(&C, &Event) -> Value + Send + Sync + 'static,
    {
        Params::Build(Arc::new(builder))
    }

    /// Produce the parameter value for this evaluation.
    pub fn resolve(&self, context: &C, event: &Event) -> Value {
        match self {
            Params::None => Value::Null,
            Params::Static(value) => value.clone(),
            Params::Build(builder) => builder(context, event),
        }
    }
}

impl<C> Default for Params<C> {
    fn default() -> Self {
        Params::None
    }
}

impl<C> Clone for Params<C> {
    fn clone(&self) -> Self {
        match self {
            Params::None => Params::None,
            Params::Static(value) => Params::Static(value.clone()),
            Params::Build(builder) => Params::Build(Arc::clone(builder)),
        }
    }
}

impl<C> fmt::Debug for Params<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Params::None => f.write_str("None"),
            Params::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Params::Build(_) => f.write_str("Build(<function>)"),
        }
    }
}

impl<C> From<Value> for Params<C> {
    fn from(value: Value) -> Self {
        Params::Static(value)
    }
}
