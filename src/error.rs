//! Unified error types for the greenhouse simulator.
//!
//! A small taxonomy that every subsystem funnels into:
//!
//! ```text
//!   OutOfRangeError ─┐
//!   InvalidRateError ├─▶ ValidationError ─┐
//!   InputError ──────┘                    │
//!   PlaybackFormatError ──────────────────┼─▶ SimError
//!   std::io::Error ───────────────────────┤
//!   LifecycleError ───────────────────────┘
//! ```
//!
//! Validation failures stop a run from starting, out-of-range assignments
//! are rejected with the prior value retained, playback format errors end
//! that one subsystem's playback, and I/O errors are reported without
//! stopping the control step that triggered them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::lifecycle::SimState;
use crate::sensors::{Quantity, SubsystemId};

// ---------------------------------------------------------------------------
// Model-level errors
// ---------------------------------------------------------------------------

/// A quantity was set outside its hard physical limits.
///
/// The message names the legal bounds so the collaborator can show it as-is.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{quantity} out of bounds: please enter a value between {min}{unit} and {max}{unit} (got {value})", unit = .quantity.unit())]
pub struct OutOfRangeError {
    pub quantity: Quantity,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// A one-way actuator rate was zero, negative, or not a number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{quantity} rate must be a positive number (got {rate})")]
pub struct InvalidRateError {
    pub quantity: Quantity,
    pub rate: f64,
}

/// The collaborator could not produce a numeric value for a field
/// (e.g. unparsable text in an input box).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InputError {
    pub field: &'static str,
    pub message: String,
}

impl InputError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A starting parameter failed a domain constraint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),
    #[error(transparent)]
    InvalidRate(#[from] InvalidRateError),
    #[error(transparent)]
    Input(#[from] InputError),
    /// Refresh interval must be strictly positive.
    #[error("refresh interval must be greater than zero")]
    RefreshInterval,
}

// ---------------------------------------------------------------------------
// Record / playback errors
// ---------------------------------------------------------------------------

/// A record line with a known tag could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("incorrect data on line {line}, the file might be corrupted: {reason}")]
pub struct PlaybackFormatError {
    /// 1-based line number in the playback source (0 when decoding a bare line).
    pub line: usize,
    pub reason: String,
}

impl PlaybackFormatError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            line: 0,
            reason: reason.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

// ---------------------------------------------------------------------------
// Orchestrator errors
// ---------------------------------------------------------------------------

/// A command arrived in a state or mode that does not permit it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: SimState,
    },
    #[error("save and playback are mutually exclusive: {0}")]
    ModeConflict(&'static str),
    #[error("{0} has no settings of that kind")]
    Unsupported(SubsystemId),
    #[error("setup has not completed successfully")]
    NotReady,
    #[error("settings cannot change during playback")]
    PlaybackReadOnly,
}

/// Top-level simulator error.
#[derive(Debug, Error)]
pub enum SimError {
    /// One or more subsystems rejected their starting parameters.
    #[error("{} subsystem(s) failed validation: {}", .0.len(), describe_failures(.0))]
    Setup(Vec<(SubsystemId, ValidationError)>),
    #[error("{subsystem}: {source}")]
    Validation {
        subsystem: SubsystemId,
        #[source]
        source: ValidationError,
    },
    #[error(transparent)]
    Playback(#[from] PlaybackFormatError),
    #[error("{context} ({}): {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not spawn {name} thread: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl SimError {
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub fn validation(subsystem: SubsystemId, source: impl Into<ValidationError>) -> Self {
        Self::Validation {
            subsystem,
            source: source.into(),
        }
    }
}

fn describe_failures(failures: &[(SubsystemId, ValidationError)]) -> String {
    failures
        .iter()
        .map(|(id, e)| format!("{id}: {e}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Simulator-wide `Result` alias.
pub type Result<T> = core::result::Result<T, SimError>;
