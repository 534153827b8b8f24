//! Simulation lifecycle and recording-mode state machines.
//!
//! ```text
//!                 start            pause
//!  Configuring ─────────▶ Running ───────▶ Paused
//!       │                   ▲  ◀─────────── │
//!       │                   │    resume     │
//!       └──────── close ────┴───────────────┴──▶ Closed
//! ```
//!
//! A run cannot be restarted once closed.  Recording mode is chosen while
//! configuring and is one of live, saving, or playback: saving and
//! playback exclude each other for the whole run.

use log::info;

use crate::error::LifecycleError;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimState {
    #[default]
    Configuring,
    Running,
    Paused,
    Closed,
}

/// Orchestrator-level requests that move the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Start,
    Pause,
    Resume,
    Close,
}

impl LifecycleAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Close => "close",
        }
    }
}

impl SimState {
    /// Compute the next state, or refuse the action.
    ///
    /// Pausing a paused run and resuming a running one are accepted no-ops.
    pub fn apply(self, action: LifecycleAction) -> Result<Self, LifecycleError> {
        use LifecycleAction as A;
        let next = match (self, action) {
            (Self::Configuring, A::Start) => Self::Running,
            (Self::Running | Self::Paused, A::Pause) => Self::Paused,
            (Self::Running | Self::Paused, A::Resume) => Self::Running,
            (_, A::Close) => Self::Closed,
            (state, action) => {
                return Err(LifecycleError::InvalidTransition {
                    action: action.verb(),
                    state,
                });
            }
        };
        if next != self {
            info!("Lifecycle: {:?} -> {:?}", self, next);
        }
        Ok(next)
    }

    /// Whether worker loops have been started in this run.
    pub fn is_started(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

// ---------------------------------------------------------------------------
// Recording mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingMode {
    #[default]
    Live,
    Saving,
    Playback,
}

impl RecordingMode {
    /// Select saving or playback.  Only possible from live mode.
    pub fn select(self, requested: Self) -> Result<Self, LifecycleError> {
        match (self, requested) {
            (_, Self::Live) => Err(LifecycleError::ModeConflict(
                "live mode cannot be selected explicitly",
            )),
            (Self::Live, mode) => {
                info!("Recording mode: {:?}", mode);
                Ok(mode)
            }
            (Self::Saving, Self::Playback) => Err(LifecycleError::ModeConflict(
                "a save file is already selected",
            )),
            (Self::Playback, Self::Saving) => Err(LifecycleError::ModeConflict(
                "a playback file is already loaded",
            )),
            (_, _) => Err(LifecycleError::ModeConflict(
                "this mode is already selected",
            )),
        }
    }
}
