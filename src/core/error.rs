//! Runtime error types.

use thiserror::Error;

/// Error returned by a user-supplied guard or action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// A guard failed while being evaluated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("guard '{guard}' failed: {source}")]
pub struct GuardFailure {
    pub guard: String,
    pub source: HandlerError,
}

/// An action failed while being applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("action '{action}' failed: {source}")]
pub struct ActionFailure {
    pub action: String,
    pub source: HandlerError,
}

/// The failure that cut an action step short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepFault {
    /// A guarded action's guard failed
    Guard(GuardFailure),
    Action(ActionFailure),
}

/// Errors raised while a machine processes an event.
///
/// None of these terminate the instance except `TransitionLoop`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("guard '{guard}' failed in state '{state}' on event '{event}': {source}")]
    GuardEvaluation {
        state: String,
        event: String,
        guard: String,
        source: HandlerError,
    },

    #[error("action '{action}' failed in state '{state}' on event '{event}': {source}")]
    ActionExecution {
        state: String,
        event: String,
        action: String,
        source: HandlerError,
    },

    #[error("always transitions did not settle within {limit} steps (reached state '{state}')")]
    TransitionLoop { state: String, limit: usize },
}

impl RuntimeError {
    pub(crate) fn from_guard(state: &str, event: &str, failure: GuardFailure) -> Self {
        RuntimeError::GuardEvaluation {
            state: state.to_string(),
            event: event.to_string(),
            guard: failure.guard,
            source: failure.source,
        }
    }

    pub(crate) fn from_fault(state: &str, event: &str, fault: StepFault) -> Self {
        match fault {
            StepFault::Guard(failure) => Self::from_guard(state, event, failure),
            StepFault::Action(failure) => RuntimeError::ActionExecution {
                state: state.to_string(),
                event: event.to_string(),
                action: failure.action,
                source: failure.source,
            },
        }
    }

    /// Whether this error froze the instance.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RuntimeError::TransitionLoop { .. })
    }
}

/// Why an event was not accepted.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("machine has not been started")]
    NotStarted,

    #[error("machine has been stopped")]
    Stopped,
}
