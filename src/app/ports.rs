//! Port traits: the boundary between the simulator core and its UI.
//!
//! ```text
//!   UI / config ──▶ InputPort ──▶ Simulator::setup
//!   worker loops ──▶ DisplayPort ──▶ UI / log
//! ```
//!
//! The simulator never renders anything itself.  Whatever drives it (a
//! window, a terminal, a test) implements these traits.

use crate::config::{EnvironmentSettings, OneWaySettings, TemperatureSettings};
use crate::error::InputError;
use crate::record::Record;
use crate::sensors::SubsystemId;

// ───────────────────────────────────────────────────────────────
// Input port (collaborator → simulator)
// ───────────────────────────────────────────────────────────────

/// Supplies the starting parameters of each subsystem.
///
/// An `Err` means the collaborator could not turn its input into a number;
/// it fails that subsystem's setup just like a range violation.
pub trait InputPort {
    fn environment(&self) -> Result<EnvironmentSettings, InputError>;
    fn temperature(&self) -> Result<TemperatureSettings, InputError>;
    fn humidity(&self) -> Result<OneWaySettings, InputError>;
    fn moisture(&self) -> Result<OneWaySettings, InputError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (simulator → collaborator)
// ───────────────────────────────────────────────────────────────

/// Receives every tick's state and every reportable error.
///
/// Called from the worker threads, so implementations must be
/// thread-safe and should return quickly.
pub trait DisplayPort: Send + Sync {
    /// One subsystem's state after a tick (or one replayed line).
    fn display_snapshot(&self, record: &Record);

    /// A human-readable failure attributed to one subsystem.
    fn display_error(&self, subsystem: SubsystemId, message: &str);
}
