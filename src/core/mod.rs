//! Core state machine types and logic.
//!
//! This module contains the pure part of the runtime:
//! - Events, parameters and the context bounds
//! - Guard expressions and their evaluator
//! - The action executor
//! - The compiled machine definition and transition resolver
//! - Immutable history tracking
//!
//! Nothing here spawns tasks or touches channels; that lives in
//! [`crate::effects`], following the "pure core, imperative shell" philosophy.

mod action;
mod context;
mod definition;
mod error;
mod event;
mod guard;
mod history;
mod params;
mod resolver;

pub use action::{execute, Action, ActionKind, AssignFn, EffectFn, Execution};
pub use context::{Context, Environment};
pub use definition::{Invocation, MachineDefinition, StateId, StateNode, Transition};
pub use error::{
    ActionFailure, GuardFailure, HandlerError, RuntimeError, SendError, StepFault,
};
pub use event::{Event, DONE_EVENT, ERROR_EVENT, INIT_EVENT};
pub use guard::{Guard, InlineGuardFn, PredicateFn};
pub use history::{StateHistory, StateTransition};
pub use params::{Params, ParamsFn};
pub use resolver::{resolve_always, resolve_event, Resolution};
