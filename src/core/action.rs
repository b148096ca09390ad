//! Action execution.
//!
//! Actions come in two kinds. Assigners produce a new context; effects run a
//! side effect and leave the context alone. A step (exit, transition or entry
//! actions) runs its actions in order, threading the context through them.

use crate::core::error::{ActionFailure, HandlerError, StepFault};
use crate::core::event::Event;
use crate::core::guard::Guard;
use crate::core::params::Params;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Assigner: `(context, event, params) -> new context`.
pub type AssignFn<C> = Arc<dyn Fn(&C, &Event, &Value) -> Result<C, HandlerError> + Send + Sync>;

/// Effect: `(context, event, params) -> ()`. Must not block.
pub type EffectFn<C> = Arc<dyn Fn(&C, &Event, &Value) -> Result<(), HandlerError> + Send + Sync>;

/// What an action does when applied.
pub enum ActionKind<C> {
    Assign(AssignFn<C>),
    Effect(EffectFn<C>),
}

impl<C> Clone for ActionKind<C> {
    fn clone(&self) -> Self {
        match self {
            ActionKind::Assign(f) => ActionKind::Assign(Arc::clone(f)),
            ActionKind::Effect(f) => ActionKind::Effect(Arc::clone(f)),
        }
    }
}

/// A resolved action, ready to apply.
pub struct Action<C> {
    pub(crate) name: String,
    pub(crate) kind: ActionKind<C>,
    pub(crate) params: Params<C>,
    pub(crate) guard: Option<Guard<C>>,
}

impl<C> Action<C> {
    pub fn new(name: impl Into<String>, kind: ActionKind<C>) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Params::None,
            guard: None,
        }
    }

    pub fn with_params(mut self, params: Params<C>) -> Self {
        self.params = params;
        self
    }

    pub fn with_guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the action. Returns `Some(context)` for assigners, `None` for effects.
    pub fn apply(&self, context: &C, event: &Event) -> Result<Option<C>, HandlerError> {
        let params = self.params.resolve(context, event);
        match &self.kind {
            ActionKind::Assign(assign) => assign(context, event, &params).map(Some),
            ActionKind::Effect(effect) => effect(context, event, &params).map(|()| None),
        }
    }
}

impl<C> Clone for Action<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            params: self.params.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ActionKind::Assign(_) => "assign",
            ActionKind::Effect(_) => "effect",
        };
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("params", &self.params)
            .field("guard", &self.guard)
            .finish()
    }
}

/// Outcome of running one action step.
#[derive(Debug)]
pub struct Execution<C> {
    /// Context after the last action that succeeded
    pub context: C,
    pub applied: usize,
    pub fault: Option<StepFault>,
}

/// Run `actions` in order starting from `context`.
///
/// A guarded action whose guard is false is skipped. The first failure stops
/// the step; the actions after it do not run.
pub fn execute<C>(actions: &[Action<C>], context: C, event: &Event) -> Execution<C> {
    let mut context = context;
    let mut applied = 0;

    for action in actions {
        if let Some(guard) = &action.guard {
            match guard.evaluate(&context, event) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(failure) => {
                    return Execution {
                        context,
                        applied,
                        fault: Some(StepFault::Guard(failure)),
                    }
                }
            }
        }

        match action.apply(&context, event) {
            Ok(Some(next)) => context = next,
            Ok(None) => {}
            Err(source) => {
                return Execution {
                    context,
                    applied,
                    fault: Some(StepFault::Action(ActionFailure {
                        action: action.name.clone(),
                        source,
                    })),
                }
            }
        }
        applied += 1;
    }

    Execution {
        context,
        applied,
        fault: None,
    }
}
