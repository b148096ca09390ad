//! Builder API for machine construction.
//!
//! Machines are described declaratively, with actions, guards and actors
//! referred to by name, then compiled against a [`Registry`] that supplies
//! the implementations. Compilation resolves every name once and reports
//! every problem it finds, not just the first.
//!
//! The free functions below keep descriptions short:
//!
//! ```rust
//! use statewise::builder::{action, and, guard, not, transition, MachineBuilder, Registry, StateBuilder};
//! use statewise::core::Event;
//! use serde_json::Value;
//!
//! let registry: Registry<u32, ()> = Registry::new()
//!     .guard("isEven", |n: &u32, _: &Event, _: &Value| Ok(n % 2 == 0))
//!     .guard("isZero", |n: &u32, _: &Event, _: &Value| Ok(*n == 0))
//!     .effect("log", |n: &u32, _: &Event, _: &Value| {
//!         println!("count is {n}");
//!         Ok(())
//!     });
//!
//! let machine = MachineBuilder::new("parity", 0)
//!     .initial("checking")
//!     .state(
//!         StateBuilder::new("checking")
//!             .on("check", transition().to("even").guard(and(vec![guard("isEven"), not(guard("isZero"))])))
//!             .on("check", transition().action(action("log"))),
//!     )
//!     .state(StateBuilder::new("even"))
//!     .create(&registry);
//!
//! assert!(machine.is_ok());
//! ```

mod compile;
pub mod description;
pub mod error;
pub mod machine;
pub mod registry;
pub mod state;
pub mod transition;

pub use compile::compile;
pub use description::{
    ActionSpec, GuardSpec, InvocationSpec, MachineDescription, StateSpec, TransitionSpec,
};
pub use error::{ConstructionError, ConstructionFailed, ReferenceKind};
pub use machine::MachineBuilder;
pub use registry::Registry;
pub use state::StateBuilder;
pub use transition::TransitionBuilder;

use crate::core::Event;
use crate::effects::Machine;

/// Compile a description into a runnable machine.
pub fn create_machine<C, Env>(
    description: MachineDescription<C>,
    registry: &Registry<C, Env>,
) -> Result<Machine<C, Env>, ConstructionFailed> {
    compile(description, registry).map(Machine::from_definition)
}

/// Start a transition candidate.
pub fn transition<C>() -> TransitionBuilder<C> {
    TransitionBuilder::new()
}

/// Reference a registered guard.
pub fn guard<C>(name: impl Into<String>) -> GuardSpec<C> {
    GuardSpec::named(name)
}

/// True when every child is; `and(vec![])` is true.
pub fn and<C>(children: Vec<GuardSpec<C>>) -> GuardSpec<C> {
    GuardSpec::And(children)
}

/// True when any child is; `or(vec![])` is false.
pub fn or<C>(children: Vec<GuardSpec<C>>) -> GuardSpec<C> {
    GuardSpec::Or(children)
}

pub fn not<C>(child: GuardSpec<C>) -> GuardSpec<C> {
    GuardSpec::Not(Box::new(child))
}

/// Reference a registered assigner or effect.
pub fn action<C>(name: impl Into<String>) -> ActionSpec<C> {
    ActionSpec::named(name)
}

/// Inline assigner.
pub fn assign<C, F>(assigner: F) -> ActionSpec<C>
where
    F: Fn(&C, &Event) -> C + Send + Sync + 'static,
{
    ActionSpec::assign(assigner)
}

/// Inline side effect.
pub fn effect<C, F>(effect: F) -> ActionSpec<C>
where
    F: Fn(&C, &Event) + Send + Sync + 'static,
{
    ActionSpec::effect(effect)
}

/// Reference a registered actor.
pub fn invoke<C>(actor: impl Into<String>) -> InvocationSpec<C> {
    InvocationSpec::new(actor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn guard_helpers_nest() {
        let spec: GuardSpec<u32> = and(vec![guard("a"), or(vec![not(guard("b"))])]);

        match spec {
            GuardSpec::And(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(&children[1], GuardSpec::Or(inner) if matches!(inner[0], GuardSpec::Not(_))));
            }
            _ => panic!("expected and"),
        }
    }

    #[test]
    fn guard_params_only_apply_to_named_guards() {
        let named: GuardSpec<u32> = guard("atLeast").with_params(json!({ "min": 3 }));
        let inline: GuardSpec<u32> = GuardSpec::inline(|_: &u32, _: &Event| true).with_params(json!(1));

        assert!(matches!(named, GuardSpec::Named { params: crate::core::Params::Static(_), .. }));
        assert!(matches!(inline, GuardSpec::Inline(_)));
    }

    #[test]
    fn create_machine_reports_failures() {
        let description = MachineDescription::<u32>::new("broken", 0);

        let result = create_machine(description, &Registry::<u32, ()>::new());

        assert!(matches!(
            result.map(|_| ()),
            Err(failed) if failed.contains(&ConstructionError::MissingInitialState)
        ));
    }
}
