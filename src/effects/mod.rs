//! The imperative shell around the pure core.
//!
//! Everything that touches time, tasks or mutable instance state lives here.
//!
//! # Key Concepts
//!
//! - **Actors**: asynchronous work a state invokes, stored as Stillwater effect factories
//! - **Supervisor**: owns in-flight invocations and rejects stale outcomes
//! - **Interpreter**: runs one instance cycle by cycle
//! - **Service**: the interpreter on a Tokio task, fed from a single queue
//!
//! # Stillwater
//!
//! Actors follow Stillwater 0.11.0 conventions:
//! - Each invocation builds a fresh `BoxedEffect` from the registered factory
//! - The effect runs against the environment the instance was created with
//! - Use free-standing constructors: `pure()`, `fail()`, `from_fn()`, `from_async()`

mod actor;
mod interpreter;
mod machine;
mod service;
mod supervisor;

pub use actor::{ActorEffect, ActorError, ActorLogic, CancelFn, InvokeFn};
pub use interpreter::{Cycle, Interpreter, Snapshot, Status};
pub use machine::Machine;
pub use service::{Listener, ServiceHandle, Subscription};
pub use supervisor::{Completion, CompletionSink, InvocationId, Slot, Supervisor};
