//! Named implementations referenced from machine descriptions.

use crate::core::{ActionKind, Event, HandlerError, PredicateFn};
use crate::effects::ActorLogic;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps names used in a description to the functions behind them.
///
/// Assigners and effects share one namespace; registering either under a
/// name already taken replaces the earlier entry.
///
/// # Example
///
/// ```rust
/// use statewise::builder::Registry;
/// use statewise::core::Event;
/// use serde_json::Value;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Todos {
///     completed: usize,
/// }
///
/// let registry: Registry<Todos, ()> = Registry::new()
///     .assign("complete", |todos: &Todos, _: &Event, _: &Value| {
///         Ok(Todos { completed: todos.completed + 1 })
///     })
///     .guard("anyCompleted", |todos: &Todos, _: &Event, _: &Value| Ok(todos.completed > 0));
///
/// assert!(registry.has_action("complete"));
/// assert!(registry.has_guard("anyCompleted"));
/// ```
pub struct Registry<C, Env> {
    actions: HashMap<String, ActionKind<C>>,
    guards: HashMap<String, PredicateFn<C>>,
    actors: HashMap<String, ActorLogic<Env>>,
}

impl<C, Env> Registry<C, Env> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            guards: HashMap::new(),
            actors: HashMap::new(),
        }
    }

    /// Register an assigner producing the next context.
    pub fn assign<F>(mut self, name: impl Into<String>, assigner: F) -> Self
    where
        F: Fn(&C, &Event, &Value) -> Result<C, HandlerError> + Send + Sync + 'static,
    {
        self.actions
            .insert(name.into(), ActionKind::Assign(Arc::new(assigner)));
        self
    }

    /// Register a side effect. It must not block.
    pub fn effect<F>(mut self, name: impl Into<String>, effect: F) -> Self
    where
        F: Fn(&C, &Event, &Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.actions
            .insert(name.into(), ActionKind::Effect(Arc::new(effect)));
        self
    }

    pub fn guard<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C, &Event, &Value) -> Result<bool, HandlerError> + Send + Sync + 'static,
    {
        self.guards.insert(name.into(), Arc::new(predicate));
        self
    }

    pub fn actor(mut self, name: impl Into<String>, logic: ActorLogic<Env>) -> Self {
        self.actors.insert(name.into(), logic);
        self
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn has_guard(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    pub fn has_actor(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    pub(crate) fn action(&self, name: &str) -> Option<ActionKind<C>> {
        self.actions.get(name).cloned()
    }

    pub(crate) fn predicate(&self, name: &str) -> Option<PredicateFn<C>> {
        self.guards.get(name).map(Arc::clone)
    }

    pub(crate) fn actor_logic(&self, name: &str) -> Option<ActorLogic<Env>> {
        self.actors.get(name).cloned()
    }
}

impl<C, Env> Default for Registry<C, Env> {
    fn default() -> Self {
        Self::new()
    }
}
