//! Supervision of in-flight actor invocations.
//!
//! Each invocation owns a slot `(state, index)`. Outcomes travel back to the
//! interpreter through a [`CompletionSink`] as [`Completion`] messages and
//! are only accepted if the invocation still owns its slot. A completion
//! from an invocation whose state was exited, or whose slot was restarted,
//! is stale and gets dropped. Task cancellation is best effort; the
//! ownership check is what keeps stale results out of the context.
//!
//! An actor that panics is reported as an `error` completion, so every
//! invocation that is not cancelled ends with exactly one outcome.

use crate::core::{Event, Invocation};
use crate::effects::actor::{ActorError, CancelFn};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::effect::Effect;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Unique id of one invocation within an interpreter.
pub type InvocationId = u64;

/// Identifies an invocation by the state that started it and its position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    pub state: String,
    pub index: usize,
}

impl Slot {
    pub fn new(state: impl Into<String>, index: usize) -> Self {
        Self {
            state: state.into(),
            index,
        }
    }
}

/// Outcome of an invocation on its way back to the interpreter.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub slot: Slot,
    pub id: InvocationId,
    pub outcome: Result<Value, ActorError>,
}

impl Completion {
    /// The synthetic event this completion turns into.
    pub fn to_event(&self) -> Event {
        match &self.outcome {
            Ok(value) => Event::done(&self.slot.state, self.slot.index, value.clone()),
            Err(error) => Event::error(&self.slot.state, self.slot.index, error),
        }
    }
}

/// Where completions are queued.
pub trait CompletionSink: Send + Sync + 'static {
    fn deliver(&self, completion: Completion);
}

impl CompletionSink for mpsc::UnboundedSender<Completion> {
    fn deliver(&self, completion: Completion) {
        if let Err(err) = self.send(completion) {
            debug!(slot = ?err.0.slot, "completion receiver dropped");
        }
    }
}

struct Handle {
    id: InvocationId,
    actor: String,
    task: Option<AbortHandle>,
    cancel: Option<CancelFn>,
}

impl Handle {
    fn cancel(self) {
        if let Some(task) = self.task {
            task.abort();
        }
        if let Some(hook) = self.cancel {
            hook();
        }
    }
}

/// Tracks the live invocation handle of every slot.
pub struct Supervisor {
    sink: Arc<dyn CompletionSink>,
    next_id: InvocationId,
    handles: HashMap<Slot, Handle>,
}

impl Supervisor {
    pub fn new(sink: Arc<dyn CompletionSink>) -> Self {
        Self {
            sink,
            next_id: 0,
            handles: HashMap::new(),
        }
    }

    /// Start `invocation` for slot `(state, index)`.
    ///
    /// The input is built from `context` and `event`. Any handle already in
    /// the slot is cancelled and becomes stale. Without a Tokio runtime the
    /// invocation fails at once with an `error` completion.
    pub fn start<C, Env>(
        &mut self,
        invocation: &Invocation<C, Env>,
        state: &str,
        index: usize,
        context: &C,
        event: &Event,
        env: &Env,
    ) -> InvocationId
    where
        Env: Clone + Send + Sync + 'static,
    {
        let slot = Slot::new(state, index);
        if let Some(previous) = self.handles.remove(&slot) {
            debug!(state, index, id = previous.id, "replacing live invocation");
            previous.cancel();
        }

        self.next_id += 1;
        let id = self.next_id;
        let input = invocation.input.resolve(context, event);
        let effect = invocation.logic.effect(input);
        let sink = Arc::clone(&self.sink);

        let task = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let env = env.clone();
                let slot = slot.clone();
                let actor = invocation.actor.clone();
                let work = runtime.spawn(async move { effect.run(&env).await });
                let abort = work.abort_handle();
                runtime.spawn(async move {
                    let outcome = match work.await {
                        Ok(outcome) => outcome,
                        Err(err) if err.is_panic() => {
                            let reason = panic_reason(err.into_panic());
                            warn!(actor = %actor, state = %slot.state, index = slot.index, id, "actor panicked: {reason}");
                            Err(ActorError::new(format!("actor panicked: {reason}")))
                        }
                        // Cancelled; the slot has already been released.
                        Err(_) => return,
                    };
                    sink.deliver(Completion { slot, id, outcome });
                });
                Some(abort)
            }
            Err(err) => {
                warn!(actor = %invocation.actor, state, index, "cannot spawn actor: {err}");
                sink.deliver(Completion {
                    slot: slot.clone(),
                    id,
                    outcome: Err(ActorError::new(format!("no async runtime available: {err}"))),
                });
                None
            }
        };

        debug!(actor = %invocation.actor, state, index, id, "invocation started");
        self.handles.insert(
            slot,
            Handle {
                id,
                actor: invocation.actor.clone(),
                task,
                cancel: invocation.logic.cancel_hook(),
            },
        );
        id
    }

    /// Cancel every invocation started by `state`. Returns how many were live.
    pub fn cancel_all(&mut self, state: &str) -> usize {
        let slots: Vec<Slot> = self
            .handles
            .keys()
            .filter(|slot| slot.state == state)
            .cloned()
            .collect();

        for slot in &slots {
            if let Some(handle) = self.handles.remove(slot) {
                debug!(actor = %handle.actor, state, index = slot.index, id = handle.id, "invocation cancelled");
                handle.cancel();
            }
        }
        slots.len()
    }

    /// Cancel every live invocation.
    pub fn cancel_everything(&mut self) -> usize {
        let count = self.handles.len();
        for (_, handle) in self.handles.drain() {
            handle.cancel();
        }
        count
    }

    /// Whether invocation `id` still owns `slot`.
    pub fn is_current(&self, slot: &Slot, id: InvocationId) -> bool {
        self.handles
            .get(slot)
            .map(|handle| handle.id == id)
            .unwrap_or(false)
    }

    /// Accept a completion if it is current, releasing its slot.
    ///
    /// Returns `false` for stale completions, which must be dropped.
    pub fn accept(&mut self, completion: &Completion) -> bool {
        if !self.is_current(&completion.slot, completion.id) {
            return false;
        }
        self.handles.remove(&completion.slot);
        true
    }

    /// Number of live invocations.
    pub fn in_flight(&self) -> usize {
        self.handles.len()
    }
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message.to_string();
    }
    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_else(|| "unknown cause".to_string())
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.cancel_everything();
    }
}
