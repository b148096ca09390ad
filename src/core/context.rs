//! Bounds for machine context and actor environments.
//!
//! The context is the application-defined value a machine carries from
//! transition to transition. It is owned by the interpreter and only ever
//! handed out as a clone, so it must be cheap enough to clone and comparable
//! (change detection for subscribers relies on `PartialEq`).

use std::fmt::Debug;

/// Trait for machine context values.
///
/// Blanket-implemented for every type meeting the bounds, so any plain
/// struct deriving `Clone`, `PartialEq` and `Debug` qualifies.
///
/// # Required Traits
///
/// - `Clone`: snapshots hand out copies, never references
/// - `PartialEq`: a cycle that leaves context equal does not notify subscribers
/// - `Debug`: context is included in diagnostics
/// - `Send + Sync + 'static`: the interpreter may run on any Tokio worker
///
/// # Example
///
/// ```rust
/// use statewise::core::Context;
///
/// #[derive(Clone, PartialEq, Debug, Default)]
/// struct Counter {
///     count: u32,
/// }
///
/// fn assert_context<C: Context>() {}
/// assert_context::<Counter>();
/// ```
pub trait Context: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> Context for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// Environment handed to actor effects when they run.
///
/// Cloned once per invocation, so wrap heavy resources in `Arc`.
pub trait Environment: Clone + Send + Sync + 'static {}

impl<T> Environment for T where T: Clone + Send + Sync + 'static {}
