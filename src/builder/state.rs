//! Builder for states.

use crate::builder::description::{ActionSpec, InvocationSpec, StateSpec, TransitionSpec};

/// Builder for a state with a fluent API.
pub struct StateBuilder<C> {
    spec: StateSpec<C>,
}

impl<C> StateBuilder<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            spec: StateSpec::new(name),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = Some(description.into());
        self
    }

    /// Add a candidate for `kind`. Candidates are tried in the order added.
    pub fn on(mut self, kind: impl Into<String>, transition: impl Into<TransitionSpec<C>>) -> Self {
        self.spec
            .on
            .entry(kind.into())
            .or_default()
            .push(transition.into());
        self
    }

    /// Add an eventless candidate, checked after every transition.
    pub fn always(mut self, transition: impl Into<TransitionSpec<C>>) -> Self {
        self.spec.always.push(transition.into());
        self
    }

    pub fn invoke(mut self, invocation: InvocationSpec<C>) -> Self {
        self.spec.invoke.push(invocation);
        self
    }

    pub fn entry(mut self, action: ActionSpec<C>) -> Self {
        self.spec.entry.push(action);
        self
    }

    pub fn exit(mut self, action: ActionSpec<C>) -> Self {
        self.spec.exit.push(action);
        self
    }

    pub fn build(self) -> StateSpec<C> {
        self.spec
    }
}

impl<C> From<StateBuilder<C>> for StateSpec<C> {
    fn from(builder: StateBuilder<C>) -> Self {
        builder.build()
    }
}
