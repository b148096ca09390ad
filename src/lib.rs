//! Statewise: an event-driven state machine runtime
//!
//! Statewise is built on Stillwater's "pure core, imperative shell" philosophy.
//! Guard evaluation, action execution and transition resolution are pure
//! functions over an explicit context. Everything asynchronous, the actors a
//! state invokes and the queue an instance drains, lives in a thin shell
//! around that core.
//!
//! # Core Concepts
//!
//! - **Descriptions**: states, transitions, guards and actions declared by name
//! - **Registry**: the implementations those names resolve to, checked once at construction
//! - **Guards**: predicate trees combined with AND, OR and NOT
//! - **Actors**: Stillwater effects started on state entry, cancelled on exit
//! - **Instances**: one serialized processing cycle at a time, observed through snapshots
//!
//! # Example
//!
//! ```rust
//! use statewise::builder::{assign, guard, transition, MachineBuilder, Registry, StateBuilder};
//! use statewise::core::{Event, HandlerError};
//! use statewise::effects::Completion;
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! #[derive(Clone, PartialEq, Debug, Default)]
//! struct Todos {
//!     added: u32,
//! }
//!
//! let registry: Registry<Todos, ()> = Registry::new().guard(
//!     "todoIsCompleted",
//!     |_: &Todos, _: &Event, params: &Value| {
//!         params
//!             .pointer("/todo/completed")
//!             .and_then(Value::as_bool)
//!             .ok_or_else(|| HandlerError::new("params.todo.completed missing"))
//!     },
//! );
//!
//! let machine = MachineBuilder::new("todos", Todos::default())
//!     .initial("open")
//!     .state(
//!         StateBuilder::new("open")
//!             .on(
//!                 "todo.added",
//!                 transition().action(assign(|todos: &Todos, _: &Event| Todos {
//!                     added: todos.added + 1,
//!                 })),
//!             )
//!             .on(
//!                 "todo.updated",
//!                 transition().to("done").guard(
//!                     guard("todoIsCompleted")
//!                         .params_with(|_, event: &Event| json!({ "todo": event.get("todo") })),
//!                 ),
//!             ),
//!     )
//!     .state(StateBuilder::new("done"))
//!     .create(&registry)
//!     .unwrap();
//!
//! let (sink, _completions) = mpsc::unbounded_channel::<Completion>();
//! let mut todos = machine.interpreter((), Arc::new(sink));
//! todos.start();
//!
//! todos.process(Event::new("todo.added")).unwrap();
//! todos.process(Event::with_data("todo.updated", json!({ "todo": { "completed": true } }))).unwrap();
//!
//! let snapshot = todos.snapshot();
//! assert_eq!(snapshot.state, "done");
//! assert_eq!(snapshot.context.added, 1);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod effects;

// Re-export commonly used types
pub use builder::{create_machine, ConstructionError, ConstructionFailed, MachineBuilder, Registry};
pub use config::InterpreterConfig;
pub use core::{Event, Guard, HandlerError, RuntimeError, SendError, StateHistory, StateTransition};
pub use effects::{ActorError, ActorLogic, Machine, ServiceHandle, Snapshot, Status};
