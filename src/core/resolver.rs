//! Transition selection.
//!
//! Candidates are tried in declaration order and the first one whose guard
//! is absent or true wins. A guard that fails counts as not matched; the
//! failure is handed back so the interpreter can log it.

use crate::core::definition::{StateNode, Transition};
use crate::core::error::GuardFailure;
use crate::core::event::Event;

/// Result of resolving one event (or one always-check) against a state.
#[derive(Debug)]
pub struct Resolution<'a, C> {
    pub transition: Option<&'a Transition<C>>,
    /// Guards that failed while searching, in evaluation order
    pub faults: Vec<GuardFailure>,
}

impl<C> Resolution<'_, C> {
    pub fn is_match(&self) -> bool {
        self.transition.is_some()
    }
}

/// Select the transition `node` takes on `event`.
pub fn resolve_event<'a, C, Env>(
    node: &'a StateNode<C, Env>,
    event: &Event,
    context: &C,
) -> Resolution<'a, C> {
    select(node.candidates(event.kind()), context, event)
}

/// Select the eventless transition `node` takes right now.
///
/// `cause` is the event that started the current cycle; always-guards and
/// the actions they trigger see it as their event.
pub fn resolve_always<'a, C, Env>(
    node: &'a StateNode<C, Env>,
    cause: &Event,
    context: &C,
) -> Resolution<'a, C> {
    select(node.always(), context, cause)
}

fn select<'a, C>(
    candidates: &'a [Transition<C>],
    context: &C,
    event: &Event,
) -> Resolution<'a, C> {
    let mut faults = Vec::new();

    let transition = candidates.iter().find(|candidate| match &candidate.guard {
        None => true,
        Some(guard) => guard.evaluate(context, event).unwrap_or_else(|failure| {
            faults.push(failure);
            false
        }),
    });

    Resolution { transition, faults }
}
