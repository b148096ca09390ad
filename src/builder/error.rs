//! Construction errors.

use std::fmt;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// What kind of registry entry a name failed to resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Action,
    Guard,
    Actor,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ReferenceKind::Action => "action",
            ReferenceKind::Guard => "guard",
            ReferenceKind::Actor => "actor",
        };
        f.write_str(kind)
    }
}

/// A single problem found in a machine description.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Initial state not specified. Call .initial(state) before .create()")]
    MissingInitialState,

    #[error("Initial state '{0}' is not declared")]
    UnknownInitialState(String),

    #[error("Unknown target state '{target}' in {location}")]
    UnknownState { target: String, location: String },

    #[error("Unknown {kind} '{name}' in {location}")]
    UnknownReference {
        kind: ReferenceKind,
        name: String,
        location: String,
    },

    #[error("State '{0}' is declared more than once")]
    DuplicateState(String),
}

/// Every problem found in a description, in the order they were found.
///
/// States are checked in declaration order and their event handlers
/// sorted by event kind, so the order is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionFailed {
    pub errors: Vec<ConstructionError>,
}

impl ConstructionFailed {
    pub fn errors(&self) -> &[ConstructionError] {
        &self.errors
    }

    pub fn contains(&self, error: &ConstructionError) -> bool {
        self.errors.contains(error)
    }
}

impl From<NonEmptyVec<ConstructionError>> for ConstructionFailed {
    fn from(errors: NonEmptyVec<ConstructionError>) -> Self {
        Self {
            errors: errors.into_vec(),
        }
    }
}

impl fmt::Display for ConstructionFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Machine construction failed with {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConstructionFailed {}
