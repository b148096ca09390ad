//! The machine interpreter.
//!
//! An [`Interpreter`] owns one live instance: its current state, context and
//! in-flight invocations. Every mutation happens inside a processing cycle
//! (`start`, `process`, `deliver`), and cycles never overlap because the
//! interpreter is only reachable through `&mut self`. The async shell in
//! [`crate::effects::service`] feeds it from a single queue.

use crate::config::InterpreterConfig;
use crate::core::{
    execute, resolve_always, resolve_event, Action, Context, Environment, Event, GuardFailure,
    MachineDefinition, RuntimeError, SendError, StateHistory, StateId, StateTransition,
    Transition,
};
use crate::effects::machine::Machine;
use crate::effects::supervisor::{Completion, CompletionSink, Supervisor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Lifecycle of an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Uninitialized,
    Running,
    /// Terminal: stopped by the caller or frozen by a transition loop
    Stopped,
}

/// Immutable view of an instance after a completed cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<C> {
    pub state: String,
    pub context: C,
    pub status: Status,
    /// The error that froze the instance, if any
    pub error: Option<RuntimeError>,
}

impl<C> Snapshot<C> {
    pub fn matches(&self, state: &str) -> bool {
        self.state == state
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }
}

/// Report of one processing cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cycle {
    /// State, context or status differ from before the cycle
    pub changed: bool,
    /// Targeted transitions taken, always-transitions included
    pub transitions: usize,
    /// The cycle delivered a stale completion and did nothing
    pub discarded: bool,
    pub errors: Vec<RuntimeError>,
}

impl Cycle {
    pub fn is_fatal(&self) -> bool {
        self.errors.iter().any(RuntimeError::is_fatal)
    }
}

/// A live machine instance.
pub struct Interpreter<C, Env> {
    machine: Machine<C, Env>,
    env: Env,
    config: InterpreterConfig,
    instance: Uuid,
    status: Status,
    state: StateId,
    context: C,
    supervisor: Supervisor,
    history: StateHistory,
    error: Option<RuntimeError>,
}

impl<C: Context, Env: Environment> Interpreter<C, Env> {
    pub fn new(
        machine: Machine<C, Env>,
        env: Env,
        sink: Arc<dyn CompletionSink>,
        mut config: InterpreterConfig,
    ) -> Self {
        config.max_always_steps = config.max_always_steps.max(1);
        let state = machine.definition().initial();
        let context = machine.definition().context().clone();
        Self {
            machine,
            env,
            config,
            instance: Uuid::new_v4(),
            status: Status::Uninitialized,
            state,
            context,
            supervisor: Supervisor::new(sink),
            history: StateHistory::new(),
            error: None,
        }
    }

    /// Replace the initial context. Ignored once the instance has started.
    pub fn with_context(mut self, context: C) -> Self {
        if self.status == Status::Uninitialized {
            self.context = context;
        }
        self
    }

    pub fn id(&self) -> Uuid {
        self.instance
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn state(&self) -> &str {
        self.machine.definition().state(self.state).name()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Number of invocations still running.
    pub fn in_flight(&self) -> usize {
        self.supervisor.in_flight()
    }

    pub fn snapshot(&self) -> Snapshot<C> {
        Snapshot {
            state: self.state().to_string(),
            context: self.context.clone(),
            status: self.status,
            error: self.error.clone(),
        }
    }

    /// Start the instance: run the machine's entry actions, enter the initial
    /// state and settle its always-transitions. A second call does nothing.
    pub fn start(&mut self) -> Cycle {
        if self.status != Status::Uninitialized {
            debug!(instance = %self.instance, status = ?self.status, "start ignored");
            return Cycle::default();
        }

        let machine = self.machine.clone();
        let definition = machine.definition();
        let stable = (self.state, self.context.clone());
        let event = Event::init();
        let mut cycle = Cycle {
            changed: true,
            ..Cycle::default()
        };

        self.status = Status::Running;
        info!(
            machine = definition.id(),
            instance = %self.instance,
            initial = self.state(),
            "machine started"
        );

        self.run_step(definition.entry(), &event, &mut cycle);
        self.enter(definition, self.state, &event, &mut cycle);
        let settled = self.settle(definition, &event, &mut cycle);
        self.conclude(stable, settled, cycle)
    }

    /// Process one event to completion.
    ///
    /// An event no candidate matches leaves the instance untouched.
    pub fn process(&mut self, event: Event) -> Result<Cycle, SendError> {
        self.ensure_running()?;

        let machine = self.machine.clone();
        let definition = machine.definition();
        let stable = (self.state, self.context.clone());
        let mut cycle = Cycle::default();

        let resolution = resolve_event(definition.state(self.state), &event, &self.context);
        self.report_guards(resolution.faults, &event, &mut cycle);

        let Some(transition) = resolution.transition else {
            debug!(
                instance = %self.instance,
                state = self.state(),
                event = event.kind(),
                "no transition matched"
            );
            return Ok(cycle);
        };

        self.take(definition, transition, &event, &mut cycle);
        let settled = self.settle(definition, &event, &mut cycle);
        Ok(self.conclude(stable, settled, cycle))
    }

    /// Deliver an actor outcome.
    ///
    /// Outcomes from invocations that no longer own their slot are dropped
    /// without touching state or context.
    pub fn deliver(&mut self, completion: Completion) -> Result<Cycle, SendError> {
        self.ensure_running()?;

        if !self.supervisor.accept(&completion) {
            debug!(
                instance = %self.instance,
                slot_state = %completion.slot.state,
                index = completion.slot.index,
                id = completion.id,
                "discarding stale completion"
            );
            return Ok(Cycle {
                discarded: true,
                ..Cycle::default()
            });
        }

        self.process(completion.to_event())
    }

    /// Stop the instance and cancel everything it started.
    ///
    /// Returns `false` if it was already stopped.
    pub fn stop(&mut self) -> bool {
        if self.status == Status::Stopped {
            return false;
        }
        let cancelled = self.supervisor.cancel_everything();
        self.status = Status::Stopped;
        info!(instance = %self.instance, state = self.state(), cancelled, "machine stopped");
        true
    }

    fn ensure_running(&self) -> Result<(), SendError> {
        match self.status {
            Status::Running => Ok(()),
            Status::Uninitialized => Err(SendError::NotStarted),
            Status::Stopped => Err(SendError::Stopped),
        }
    }

    fn take(
        &mut self,
        definition: &MachineDefinition<C, Env>,
        transition: &Transition<C>,
        event: &Event,
        cycle: &mut Cycle,
    ) {
        let Some(target) = transition.target else {
            self.run_step(&transition.actions, event, cycle);
            return;
        };

        let source = definition.state(self.state);
        self.run_step(&source.exit, event, cycle);
        self.supervisor.cancel_all(source.name());
        self.run_step(&transition.actions, event, cycle);

        let destination = definition.state(target);
        debug!(
            instance = %self.instance,
            from = source.name(),
            to = destination.name(),
            event = event.kind(),
            "transition"
        );
        self.state = target;
        self.history = self.history.record_within(
            StateTransition {
                from: source.name().to_string(),
                to: destination.name().to_string(),
                event: event.kind().to_string(),
                timestamp: chrono::Utc::now(),
            },
            self.config.history_limit,
        );
        cycle.transitions += 1;

        self.enter(definition, target, event, cycle);
    }

    fn enter(
        &mut self,
        definition: &MachineDefinition<C, Env>,
        target: StateId,
        event: &Event,
        cycle: &mut Cycle,
    ) {
        let node = definition.state(target);
        self.run_step(&node.entry, event, cycle);

        for (index, invocation) in node.invoke.iter().enumerate() {
            self.supervisor
                .start(invocation, node.name(), index, &self.context, event, &self.env);
        }
    }

    /// Follow always-transitions until none matches.
    fn settle(
        &mut self,
        definition: &MachineDefinition<C, Env>,
        cause: &Event,
        cycle: &mut Cycle,
    ) -> Result<(), RuntimeError> {
        let limit = self.config.max_always_steps;
        let mut steps = 0;

        loop {
            let resolution = resolve_always(definition.state(self.state), cause, &self.context);
            self.report_guards(resolution.faults, cause, cycle);

            let Some(transition) = resolution.transition else {
                return Ok(());
            };
            if steps == limit {
                return Err(RuntimeError::TransitionLoop {
                    state: self.state().to_string(),
                    limit,
                });
            }
            self.take(definition, transition, cause, cycle);
            steps += 1;
        }
    }

    fn conclude(
        &mut self,
        stable: (StateId, C),
        settled: Result<(), RuntimeError>,
        mut cycle: Cycle,
    ) -> Cycle {
        let (stable_state, stable_context) = stable;

        if let Err(err) = settled {
            error!(instance = %self.instance, "{err}; freezing instance");
            self.supervisor.cancel_everything();
            self.state = stable_state;
            self.context = stable_context;
            self.status = Status::Stopped;
            self.error = Some(err.clone());
            cycle.errors.push(err);
            cycle.changed = true;
            return cycle;
        }

        cycle.changed =
            cycle.changed || self.state != stable_state || self.context != stable_context;
        cycle
    }

    fn run_step(&mut self, actions: &[Action<C>], event: &Event, cycle: &mut Cycle) {
        if actions.is_empty() {
            return;
        }

        let execution = execute(actions, self.context.clone(), event);
        self.context = execution.context;

        if let Some(fault) = execution.fault {
            let err = RuntimeError::from_fault(self.state(), event.kind(), fault);
            warn!(instance = %self.instance, "{err}");
            cycle.errors.push(err);
        }
    }

    fn report_guards(&self, faults: Vec<GuardFailure>, event: &Event, cycle: &mut Cycle) {
        for failure in faults {
            let err = RuntimeError::from_guard(self.state(), event.kind(), failure);
            warn!(instance = %self.instance, "{err}");
            cycle.errors.push(err);
        }
    }
}
