//! Compiled machine definition.
//!
//! Produced once by [`crate::builder::create_machine`]. Every name in the
//! description has been resolved: targets are [`StateId`]s and guards,
//! actions and actors hold their functions directly.

use crate::core::action::Action;
use crate::core::guard::Guard;
use crate::core::params::Params;
use crate::effects::ActorLogic;
use std::collections::HashMap;
use std::fmt;

/// Index of a state inside its definition.
pub type StateId = usize;

/// A transition candidate.
pub struct Transition<C> {
    pub(crate) guard: Option<Guard<C>>,
    /// `None` for action-only reactions that stay in the current state
    pub(crate) target: Option<StateId>,
    pub(crate) actions: Vec<Action<C>>,
}

impl<C> Transition<C> {
    pub fn target(&self) -> Option<StateId> {
        self.target
    }

    pub fn guard(&self) -> Option<&Guard<C>> {
        self.guard.as_ref()
    }

    pub fn actions(&self) -> &[Action<C>] {
        &self.actions
    }
}

impl<C> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("guard", &self.guard)
            .field("target", &self.target)
            .field("actions", &self.actions)
            .finish()
    }
}

/// An actor started when its state is entered.
pub struct Invocation<C, Env> {
    pub(crate) actor: String,
    pub(crate) logic: ActorLogic<Env>,
    pub(crate) input: Params<C>,
}

impl<C, Env> Invocation<C, Env> {
    pub fn actor(&self) -> &str {
        &self.actor
    }
}

/// A compiled state.
pub struct StateNode<C, Env> {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) on: HashMap<String, Vec<Transition<C>>>,
    pub(crate) always: Vec<Transition<C>>,
    pub(crate) invoke: Vec<Invocation<C, Env>>,
    pub(crate) entry: Vec<Action<C>>,
    pub(crate) exit: Vec<Action<C>>,
}

impl<C, Env> StateNode<C, Env> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Candidates declared for an event kind, in declaration order.
    pub fn candidates(&self, kind: &str) -> &[Transition<C>] {
        self.on.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn always(&self) -> &[Transition<C>] {
        &self.always
    }

    pub fn invocations(&self) -> &[Invocation<C, Env>] {
        &self.invoke
    }

    /// Whether the state reacts to this event kind at all.
    pub fn handles(&self, kind: &str) -> bool {
        self.on.contains_key(kind)
    }

    /// A state is final when nothing can ever move the machine out of it.
    pub fn is_final(&self) -> bool {
        self.on.is_empty() && self.always.is_empty() && self.invoke.is_empty()
    }
}

/// A compiled machine.
pub struct MachineDefinition<C, Env> {
    pub(crate) id: String,
    pub(crate) initial: StateId,
    pub(crate) context: C,
    pub(crate) entry: Vec<Action<C>>,
    pub(crate) states: Vec<StateNode<C, Env>>,
    pub(crate) index: HashMap<String, StateId>,
}

impl<C, Env> MachineDefinition<C, Env> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn entry(&self) -> &[Action<C>] {
        &self.entry
    }

    /// Look up a compiled state by id, if it exists.
    pub fn get(&self, id: StateId) -> Option<&StateNode<C, Env>> {
        self.states.get(id)
    }

    // Callers hold ids produced by this definition's own index.
    pub(crate) fn state(&self, id: StateId) -> &StateNode<C, Env> {
        &self.states[id]
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    pub fn find(&self, name: &str) -> Option<&StateNode<C, Env>> {
        self.state_id(name).map(|id| self.state(id))
    }

    pub fn states(&self) -> &[StateNode<C, Env>] {
        &self.states
    }
}
