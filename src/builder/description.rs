//! Declarative machine descriptions.
//!
//! A description refers to actions, guards and actors by name, or carries
//! inline closures. Nothing is resolved or checked until it is compiled
//! against a [`Registry`](crate::builder::Registry).

use crate::core::{ActionKind, Event, HandlerError, InlineGuardFn, Params};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A whole machine.
pub struct MachineDescription<C> {
    pub id: String,
    pub initial: Option<String>,
    pub context: C,
    /// Run once when an instance starts, before the initial state is entered
    pub entry: Vec<ActionSpec<C>>,
    /// Declaration order is kept
    pub states: Vec<StateSpec<C>>,
}

impl<C> MachineDescription<C> {
    pub fn new(id: impl Into<String>, context: C) -> Self {
        Self {
            id: id.into(),
            initial: None,
            context,
            entry: Vec::new(),
            states: Vec::new(),
        }
    }
}

/// A single state. Names may contain any characters, spaces included.
pub struct StateSpec<C> {
    pub name: String,
    pub description: Option<String>,
    /// Candidates per event kind, in priority order. Kinds iterate sorted.
    pub on: BTreeMap<String, Vec<TransitionSpec<C>>>,
    pub always: Vec<TransitionSpec<C>>,
    pub invoke: Vec<InvocationSpec<C>>,
    pub entry: Vec<ActionSpec<C>>,
    pub exit: Vec<ActionSpec<C>>,
}

impl<C> StateSpec<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            on: BTreeMap::new(),
            always: Vec::new(),
            invoke: Vec::new(),
            entry: Vec::new(),
            exit: Vec::new(),
        }
    }
}

/// One transition candidate.
pub struct TransitionSpec<C> {
    /// `None` reacts in place: actions run, no exit or entry
    pub target: Option<String>,
    pub guard: Option<GuardSpec<C>>,
    pub actions: Vec<ActionSpec<C>>,
}

impl<C> Default for TransitionSpec<C> {
    fn default() -> Self {
        Self {
            target: None,
            guard: None,
            actions: Vec::new(),
        }
    }
}

pub(crate) enum ActionSource<C> {
    Named(String),
    Inline { label: String, kind: ActionKind<C> },
}

/// An action reference: a registry name or an inline closure, with
/// optional params and an optional guard.
pub struct ActionSpec<C> {
    pub(crate) source: ActionSource<C>,
    pub(crate) params: Params<C>,
    pub(crate) guard: Option<GuardSpec<C>>,
}

impl<C> ActionSpec<C> {
    pub fn named(name: impl Into<String>) -> Self {
        Self::from_source(ActionSource::Named(name.into()))
    }

    /// Inline assigner computing the next context.
    pub fn assign<F>(assigner: F) -> Self
    where
        F: Fn(&C, &Event) -> C + Send + Sync + 'static,
    {
        Self::try_assign(move |context: &C, event: &Event| Ok(assigner(context, event)))
    }

    /// Inline assigner that may fail.
    pub fn try_assign<F>(assigner: F) -> Self
    where
        F: Fn(&C, &Event) -> Result<C, HandlerError> + Send + Sync + 'static,
    {
        let kind = ActionKind::Assign(Arc::new(
            move |context: &C, event: &Event, _: &Value| -> Result<C, HandlerError> {
                assigner(context, event)
            },
        ));
        Self::inline("<assign>", kind)
    }

    /// Inline side effect.
    pub fn effect<F>(effect: F) -> Self
    where
        F: Fn(&C, &Event) + Send + Sync + 'static,
    {
        let kind = ActionKind::Effect(Arc::new(
            move |context: &C, event: &Event, _: &Value| -> Result<(), HandlerError> {
                effect(context, event);
                Ok(())
            },
        ));
        Self::inline("<effect>", kind)
    }

    /// Name an inline action in logs and errors.
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        if let ActionSource::Inline { label: current, .. } = &mut self.source {
            *current = label.into();
        }
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Params::Static(params);
        self
    }

    /// Build params from the context and event when the action runs.
    pub fn params_with<F>(mut self, builder: F) -> Self
    where
        F: Fn(&C, &Event) -> Value + Send + Sync + 'static,
    {
        self.params = Params::build(builder);
        self
    }

    /// Only run the action when `guard` holds.
    pub fn when(mut self, guard: GuardSpec<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    fn inline(label: &str, kind: ActionKind<C>) -> Self {
        Self::from_source(ActionSource::Inline {
            label: label.to_string(),
            kind,
        })
    }

    fn from_source(source: ActionSource<C>) -> Self {
        Self {
            source,
            params: Params::None,
            guard: None,
        }
    }
}

/// A guard expression referring to predicates by name.
pub enum GuardSpec<C> {
    Named { name: String, params: Params<C> },
    Inline(InlineGuardFn<C>),
    And(Vec<GuardSpec<C>>),
    Or(Vec<GuardSpec<C>>),
    Not(Box<GuardSpec<C>>),
}

impl<C> GuardSpec<C> {
    pub fn named(name: impl Into<String>) -> Self {
        GuardSpec::Named {
            name: name.into(),
            params: Params::None,
        }
    }

    pub fn inline<F>(predicate: F) -> Self
    where
        F: Fn(&C, &Event) -> bool + Send + Sync + 'static,
    {
        Self::try_inline(move |context: &C, event: &Event| Ok(predicate(context, event)))
    }

    pub fn try_inline<F>(predicate: F) -> Self
    where
        F: Fn(&C, &Event) -> Result<bool, HandlerError> + Send + Sync + 'static,
    {
        GuardSpec::Inline(Arc::new(predicate))
    }

    /// Static params for a named guard. Other variants are returned unchanged.
    pub fn with_params(self, value: Value) -> Self {
        self.set_params(Params::Static(value))
    }

    /// Params built per evaluation for a named guard. Other variants are
    /// returned unchanged.
    pub fn params_with<F>(self, builder: F) -> Self
    where
        F: Fn(&C, &Event) -> Value + Send + Sync + 'static,
    {
        self.set_params(Params::build(builder))
    }

    fn set_params(self, params: Params<C>) -> Self {
        match self {
            GuardSpec::Named { name, .. } => GuardSpec::Named { name, params },
            other => other,
        }
    }
}

/// An actor started on entry to its state.
pub struct InvocationSpec<C> {
    pub actor: String,
    pub input: Params<C>,
}

impl<C> InvocationSpec<C> {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            input: Params::None,
        }
    }

    pub fn input(mut self, input: Value) -> Self {
        self.input = Params::Static(input);
        self
    }

    /// Build the input from the context and the event that entered the state.
    pub fn input_with<F>(mut self, builder: F) -> Self
    where
        F: Fn(&C, &Event) -> Value + Send + Sync + 'static,
    {
        self.input = Params::build(builder);
        self
    }
}
