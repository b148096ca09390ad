//! Actor logic: the asynchronous work a state invokes on entry.
//!
//! An actor turns an input value into exactly one outcome, a value or an
//! [`ActorError`]. Like transition actions in the rest of the crate, actors
//! are stored as factories that build a fresh Stillwater effect for every
//! invocation.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use thiserror::Error;

/// An actor rejected.
///
/// Delivered to the machine as an `error` event, never raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ActorError {
    message: String,
}

impl ActorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for ActorError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ActorError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Effect produced by one invocation.
pub type ActorEffect<Env> = BoxedEffect<Value, ActorError, Env>;

/// Factory creating a fresh effect from an input.
pub type InvokeFn<Env> = Arc<dyn Fn(Value) -> ActorEffect<Env> + Send + Sync>;

/// Hook called when an invocation is cancelled.
pub type CancelFn = Arc<dyn Fn() + Send + Sync>;

/// A registered actor.
///
/// # Example
///
/// ```rust
/// use statewise::effects::{ActorError, ActorLogic};
/// use serde_json::{json, Value};
///
/// #[derive(Clone)]
/// struct Env {
///     base_url: String,
/// }
///
/// let fetch = ActorLogic::from_async(|input: Value, env: Env| async move {
///     if env.base_url.is_empty() {
///         return Err(ActorError::new("no base url"));
///     }
///     Ok(json!({ "url": env.base_url, "query": input }))
/// });
/// ```
pub struct ActorLogic<Env> {
    invoke: InvokeFn<Env>,
    cancel: Option<CancelFn>,
}

impl<Env> ActorLogic<Env>
where
    Env: Clone + Send + Sync + 'static,
{
    /// Create an actor from an effect factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(Value) -> ActorEffect<Env> + Send + Sync + 'static,
    {
        Self {
            invoke: Arc::new(factory),
            cancel: None,
        }
    }

    /// Create an actor from an async function of the input and environment.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Value, Env) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ActorError>> + Send + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |input| {
            let f = Arc::clone(&f);
            from_async(move |env: &Env| f(input, env.clone())).boxed()
        })
    }

    /// Create an actor from a synchronous function.
    ///
    /// It still runs on its own task and reports through the queue.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Value, &Env) -> Result<Value, ActorError> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |input| {
            let f = Arc::clone(&f);
            from_fn(move |env: &Env| f(input, env)).boxed()
        })
    }

    /// An actor that resolves immediately with `value`.
    pub fn resolved(value: Value) -> Self {
        Self::new(move |_| pure(value.clone()).boxed())
    }

    /// An actor that rejects immediately with `error`.
    pub fn rejected(error: ActorError) -> Self {
        Self::new(move |_| fail(error.clone()).boxed())
    }

    /// Attach a cancellation hook, called when the invoking state is left
    /// before the actor finished.
    pub fn with_cancel<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.cancel = Some(Arc::new(hook));
        self
    }
}

impl<Env> ActorLogic<Env> {
    pub(crate) fn effect(&self, input: Value) -> ActorEffect<Env> {
        (self.invoke)(input)
    }

    pub(crate) fn cancel_hook(&self) -> Option<CancelFn> {
        self.cancel.clone()
    }
}

impl<Env> Clone for ActorLogic<Env> {
    fn clone(&self) -> Self {
        Self {
            invoke: Arc::clone(&self.invoke),
            cancel: self.cancel.clone(),
        }
    }
}
