//! Builder for constructing machines.

use crate::builder::compile::compile;
use crate::builder::description::{ActionSpec, MachineDescription, StateSpec};
use crate::builder::error::ConstructionFailed;
use crate::builder::registry::Registry;
use crate::effects::Machine;

/// Builder for a machine description with a fluent API.
///
/// # Example
///
/// ```rust
/// use statewise::builder::{assign, transition, MachineBuilder, Registry, StateBuilder};
/// use statewise::core::Event;
///
/// let machine = MachineBuilder::new("toggle", 0u32)
///     .initial("off")
///     .state(StateBuilder::new("off").on(
///         "flip",
///         transition()
///             .to("on")
///             .action(assign(|flips: &u32, _: &Event| flips + 1)),
///     ))
///     .state(StateBuilder::new("on").on("flip", transition().to("off")))
///     .create(&Registry::<u32, ()>::new())
///     .unwrap();
///
/// assert_eq!(machine.initial_state(), "off");
/// assert_eq!(machine.state_names(), vec!["off", "on"]);
/// ```
pub struct MachineBuilder<C> {
    description: MachineDescription<C>,
}

impl<C> MachineBuilder<C> {
    pub fn new(id: impl Into<String>, context: C) -> Self {
        Self {
            description: MachineDescription::new(id, context),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.description.initial = Some(state.into());
        self
    }

    /// Add an action run once when an instance starts.
    pub fn entry(mut self, action: ActionSpec<C>) -> Self {
        self.description.entry.push(action);
        self
    }

    pub fn state(mut self, state: impl Into<StateSpec<C>>) -> Self {
        self.description.states.push(state.into());
        self
    }

    pub fn build(self) -> MachineDescription<C> {
        self.description
    }

    /// Compile the description against `registry`.
    pub fn create<Env>(self, registry: &Registry<C, Env>) -> Result<Machine<C, Env>, ConstructionFailed> {
        compile(self.description, registry).map(Machine::from_definition)
    }
}
