//! Running instances on a Tokio task.
//!
//! [`Machine::spawn`] starts an [`Interpreter`] and moves it onto a task that
//! owns it for the rest of its life. External events and actor completions
//! share one unbounded queue, so every cycle runs to completion before the
//! next message is looked at. Callers talk to the instance through a
//! cloneable [`ServiceHandle`].

use crate::config::InterpreterConfig;
use crate::core::{Context, Environment, Event, SendError};
use crate::effects::interpreter::{Interpreter, Snapshot, Status};
use crate::effects::machine::Machine;
use crate::effects::supervisor::{Completion, CompletionSink};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};
use uuid::Uuid;

/// Called with the new snapshot after every cycle that changed something.
pub type Listener<C> = Arc<dyn Fn(&Snapshot<C>) + Send + Sync>;

enum Command<C> {
    Send(Event),
    Complete(Completion),
    Subscribe { id: u64, listener: Listener<C> },
    Unsubscribe(u64),
    Flush(oneshot::Sender<()>),
    Stop,
}

/// Routes actor outcomes into the instance queue.
///
/// Holds a weak sender so in-flight actors do not keep an abandoned instance
/// alive.
struct QueueSink<C> {
    tx: mpsc::WeakUnboundedSender<Command<C>>,
}

impl<C: Context> CompletionSink for QueueSink<C> {
    fn deliver(&self, completion: Completion) {
        match self.tx.upgrade() {
            Some(tx) => {
                if tx.send(Command::Complete(completion)).is_err() {
                    debug!("instance gone, completion dropped");
                }
            }
            None => debug!("instance gone, completion dropped"),
        }
    }
}

impl<C: Context, Env: Environment> Machine<C, Env> {
    /// Start an instance on its own task.
    ///
    /// The instance is started before this returns, so the handle's first
    /// snapshot already reflects the initial state. Dropping every handle
    /// stops the instance.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn(&self, env: Env) -> ServiceHandle<C> {
        self.spawn_with(env, InterpreterConfig::default())
    }

    pub fn spawn_with(&self, env: Env, config: InterpreterConfig) -> ServiceHandle<C> {
        let (tx, rx) = mpsc::unbounded_channel::<Command<C>>();
        let sink = Arc::new(QueueSink { tx: tx.downgrade() });

        let mut interpreter = self.interpreter_with(env, sink, config);
        interpreter.start();

        let (snapshots_tx, snapshots) = watch::channel(interpreter.snapshot());
        let stopped = Arc::new(AtomicBool::new(interpreter.status() == Status::Stopped));
        let id = interpreter.id();

        tokio::spawn(run(interpreter, rx, snapshots_tx));

        ServiceHandle {
            id,
            tx,
            snapshots,
            stopped,
            next_listener: Arc::new(AtomicU64::new(0)),
        }
    }
}

async fn run<C: Context, Env: Environment>(
    mut interpreter: Interpreter<C, Env>,
    mut rx: mpsc::UnboundedReceiver<Command<C>>,
    snapshots: watch::Sender<Snapshot<C>>,
) {
    let mut listeners: Vec<(u64, Listener<C>)> = Vec::new();

    while let Some(command) = rx.recv().await {
        let cycle = match command {
            Command::Send(event) => interpreter.process(event),
            Command::Complete(completion) => interpreter.deliver(completion),
            Command::Subscribe { id, listener } => {
                listeners.push((id, listener));
                continue;
            }
            Command::Unsubscribe(id) => {
                listeners.retain(|(listener, _)| *listener != id);
                continue;
            }
            Command::Flush(done) => {
                let _ = done.send(());
                continue;
            }
            Command::Stop => {
                if interpreter.stop() {
                    publish(&interpreter, &snapshots, &listeners);
                }
                continue;
            }
        };

        match cycle {
            Ok(cycle) if cycle.changed => publish(&interpreter, &snapshots, &listeners),
            Ok(_) => {}
            Err(err) => debug!(instance = %interpreter.id(), "message dropped: {err}"),
        }
    }

    if interpreter.stop() {
        info!(instance = %interpreter.id(), "all handles dropped");
    }
}

fn publish<C: Context, Env: Environment>(
    interpreter: &Interpreter<C, Env>,
    snapshots: &watch::Sender<Snapshot<C>>,
    listeners: &[(u64, Listener<C>)],
) {
    let snapshot = interpreter.snapshot();
    for (_, listener) in listeners {
        listener(&snapshot);
    }
    snapshots.send_replace(snapshot);
}

/// Handle to a spawned instance.
pub struct ServiceHandle<C> {
    id: Uuid,
    tx: mpsc::UnboundedSender<Command<C>>,
    snapshots: watch::Receiver<Snapshot<C>>,
    stopped: Arc<AtomicBool>,
    next_listener: Arc<AtomicU64>,
}

impl<C: Context> ServiceHandle<C> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue an event. Processing happens on the instance task.
    pub fn send(&self, event: impl Into<Event>) -> Result<(), SendError> {
        if self.stopped.load(Ordering::SeqCst) || self.status() == Status::Stopped {
            return Err(SendError::Stopped);
        }
        self.tx
            .send(Command::Send(event.into()))
            .map_err(|_| SendError::Stopped)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot<C> {
        self.snapshots.borrow().clone()
    }

    pub fn status(&self) -> Status {
        self.snapshots.borrow().status
    }

    /// Register a listener for future changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<C>
    where
        F: Fn(&Snapshot<C>) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(Command::Subscribe {
            id,
            listener: Arc::new(listener),
        });
        Subscription {
            id,
            tx: self.tx.clone(),
        }
    }

    /// Stop the instance. Later sends fail with [`SendError::Stopped`].
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(Command::Stop);
        }
    }

    /// Wait until every message queued before this call has been processed.
    pub async fn flush(&self) {
        let (done, processed) = oneshot::channel();
        if self.tx.send(Command::Flush(done)).is_ok() {
            let _ = processed.await;
        }
    }

    /// Wait for the first published snapshot matching `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> Snapshot<C>
    where
        F: FnMut(&Snapshot<C>) -> bool,
    {
        let mut snapshots = self.snapshots.clone();
        let matched = snapshots
            .wait_for(predicate)
            .await
            .map(|snapshot| snapshot.clone());
        match matched {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot(),
        }
    }
}

impl<C> Clone for ServiceHandle<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            tx: self.tx.clone(),
            snapshots: self.snapshots.clone(),
            stopped: Arc::clone(&self.stopped),
            next_listener: Arc::clone(&self.next_listener),
        }
    }
}

/// A registered listener. Keeps the instance alive until unsubscribed.
pub struct Subscription<C> {
    id: u64,
    tx: mpsc::UnboundedSender<Command<C>>,
}

impl<C> Subscription<C> {
    pub fn unsubscribe(self) {
        let _ = self.tx.send(Command::Unsubscribe(self.id));
    }
}
