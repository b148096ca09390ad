//! Guard expressions controlling transitions.
//!
//! A guard is a small expression tree: leaves are registered predicates or
//! inline closures, inner nodes are the boolean combinators AND, OR and NOT.
//! Evaluation is pure; the only way it can fail is a leaf returning an error.

use crate::core::error::{GuardFailure, HandlerError};
use crate::core::event::Event;
use crate::core::params::Params;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Registered predicate: `(context, event, params) -> bool`.
pub type PredicateFn<C> = Arc<dyn Fn(&C, &Event, &Value) -> Result<bool, HandlerError> + Send + Sync>;

/// Inline predicate: `(context, event) -> bool`.
pub type InlineGuardFn<C> = Arc<dyn Fn(&C, &Event) -> Result<bool, HandlerError> + Send + Sync>;

/// A resolved guard expression.
///
/// Combinators short-circuit left to right. Empty combinators follow the
/// usual vacuous conventions, which are easy to trip over:
///
/// - `And([])` is **true**
/// - `Or([])` is **false**
///
/// # Example
///
/// ```rust
/// use statewise::core::{Event, Guard};
///
/// let over_ten = Guard::inline(|count: &u32, _: &Event| *count >= 10);
/// let guard = Guard::And(vec![over_ten, Guard::Not(Box::new(Guard::Or(vec![])))]);
///
/// assert_eq!(guard.evaluate(&12, &Event::new("tick")), Ok(true));
/// assert_eq!(guard.evaluate(&3, &Event::new("tick")), Ok(false));
/// ```
pub enum Guard<C> {
    /// Registered predicate, already resolved from the registry
    Predicate {
        name: String,
        predicate: PredicateFn<C>,
        params: Params<C>,
    },
    Inline(InlineGuardFn<C>),
    And(Vec<Guard<C>>),
    Or(Vec<Guard<C>>),
    Not(Box<Guard<C>>),
}

impl<C> Guard<C> {
    /// Create a guard from an infallible inline predicate.
    pub fn inline<F>(predicate: F) -> Self
    where
        F: Fn(&C, &Event) -> bool + Send + Sync + 'static,
    {
        Guard::Inline(Arc::new(
            move |context: &C, event: &Event| -> Result<bool, HandlerError> {
                Ok(predicate(context, event))
            },
        ))
    }

    /// Evaluate against a context and the triggering event.
    pub fn evaluate(&self, context: &C, event: &Event) -> Result<bool, GuardFailure> {
        match self {
            Guard::Predicate {
                name,
                predicate,
                params,
            } => {
                let params = params.resolve(context, event);
                predicate(context, event, &params).map_err(|source| GuardFailure {
                    guard: name.clone(),
                    source,
                })
            }
            Guard::Inline(predicate) => {
                predicate(context, event).map_err(|source| GuardFailure {
                    guard: self.describe(),
                    source,
                })
            }
            Guard::And(children) => {
                for child in children {
                    if !child.evaluate(context, event)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Guard::Or(children) => {
                for child in children {
                    if child.evaluate(context, event)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Guard::Not(child) => child.evaluate(context, event).map(|result| !result),
        }
    }

    /// Render the expression for diagnostics, e.g. `and(todoIsCompleted, <inline>)`.
    pub fn describe(&self) -> String {
        fn join<C>(children: &[Guard<C>]) -> String {
            children
                .iter()
                .map(Guard::describe)
                .collect::<Vec<_>>()
                .join(", ")
        }

        match self {
            Guard::Predicate { name, .. } => name.clone(),
            Guard::Inline(_) => "<inline>".to_string(),
            Guard::And(children) => format!("and({})", join(children)),
            Guard::Or(children) => format!("or({})", join(children)),
            Guard::Not(child) => format!("not({})", child.describe()),
        }
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        match self {
            Guard::Predicate {
                name,
                predicate,
                params,
            } => Guard::Predicate {
                name: name.clone(),
                predicate: Arc::clone(predicate),
                params: params.clone(),
            },
            Guard::Inline(predicate) => Guard::Inline(Arc::clone(predicate)),
            Guard::And(children) => Guard::And(children.clone()),
            Guard::Or(children) => Guard::Or(children.clone()),
            Guard::Not(child) => Guard::Not(child.clone()),
        }
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn always(result: bool) -> Guard<u32> {
        Guard::inline(move |_, _| result)
    }

    fn failing() -> Guard<u32> {
        Guard::Inline(Arc::new(|_: &u32, _: &Event| -> Result<bool, HandlerError> {
            Err(HandlerError::new("guard exploded"))
        }))
    }

    fn todo_is_completed() -> Guard<u32> {
        Guard::Predicate {
            name: "todoIsCompleted".to_string(),
            predicate: Arc::new(|_: &u32, _: &Event, params: &Value| {
                Ok(params
                    .pointer("/todo/completed")
                    .and_then(Value::as_bool)
                    .unwrap_or(false))
            }),
            params: Params::build(|_, event: &Event| {
                json!({ "todo": event.get("todo").cloned().unwrap_or(Value::Null) })
            }),
        }
    }

    fn tick() -> Event {
        Event::new("tick")
    }

    #[test]
    fn empty_and_is_true() {
        assert_eq!(Guard::<u32>::And(vec![]).evaluate(&0, &tick()), Ok(true));
    }

    #[test]
    fn empty_or_is_false() {
        assert_eq!(Guard::<u32>::Or(vec![]).evaluate(&0, &tick()), Ok(false));
    }

    #[test]
    fn not_negates_child() {
        let guard = Guard::Not(Box::new(always(true)));
        assert_eq!(guard.evaluate(&0, &tick()), Ok(false));
    }

    #[test]
    fn and_short_circuits_on_first_false() {
        let guard = Guard::And(vec![always(false), failing()]);
        assert_eq!(guard.evaluate(&0, &tick()), Ok(false));
    }

    #[test]
    fn or_short_circuits_on_first_true() {
        let guard = Guard::Or(vec![always(true), failing()]);
        assert_eq!(guard.evaluate(&0, &tick()), Ok(true));
    }

    #[test]
    fn and_with_trailing_false_is_always_false() {
        let guard = Guard::And(vec![always(true), always(false)]);
        assert_eq!(guard.evaluate(&0, &tick()), Ok(false));
    }

    #[test]
    fn predicate_receives_built_params() {
        let guard = todo_is_completed();

        let done = Event::with_data("todo.updated", json!({ "todo": { "completed": true } }));
        let open = Event::with_data("todo.updated", json!({ "todo": { "completed": false } }));

        assert_eq!(guard.evaluate(&0, &done), Ok(true));
        assert_eq!(guard.evaluate(&0, &open), Ok(false));
    }

    #[test]
    fn inline_guard_reads_context() {
        let guard = Guard::inline(|count: &u32, _| *count >= 10);

        assert_eq!(guard.evaluate(&9, &tick()), Ok(false));
        assert_eq!(guard.evaluate(&10, &tick()), Ok(true));
    }

    #[test]
    fn failure_propagates_through_combinators() {
        let guard = Guard::Not(Box::new(Guard::And(vec![always(true), failing()])));

        let failure = guard.evaluate(&0, &tick()).unwrap_err();

        assert_eq!(failure.guard, "<inline>");
        assert_eq!(failure.source.message(), "guard exploded");
    }

    #[test]
    fn predicate_failure_names_predicate() {
        let guard: Guard<u32> = Guard::Predicate {
            name: "isAdmin".to_string(),
            predicate: Arc::new(|_: &u32, _: &Event, _: &Value| Err("no user".into())),
            params: Params::None,
        };

        let failure = guard.evaluate(&0, &tick()).unwrap_err();
        assert_eq!(failure.guard, "isAdmin");
    }

    #[test]
    fn evaluation_is_deterministic() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let guard = Guard::inline(move |count: &u32, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            *count % 2 == 0
        });

        let first = guard.evaluate(&4, &tick());
        let second = guard.evaluate(&4, &tick());

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn describe_renders_tree() {
        let guard = Guard::And(vec![
            todo_is_completed(),
            Guard::Not(Box::new(always(false))),
        ]);
        assert_eq!(guard.describe(), "and(todoIsCompleted, not(<inline>))");
    }
}
