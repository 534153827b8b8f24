//! Inbound commands to the simulator.
//!
//! These are the actions a UI (window, terminal, script) can request.
//! [`Simulator::handle_command`](super::service::Simulator::handle_command)
//! validates and applies each one synchronously and hands any error back.

use std::path::PathBuf;
use std::time::Duration;

use crate::sensors::{Quantity, SubsystemId};

/// Commands that a collaborator can send into the simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    /// Spawn every worker loop.  Requires a successful setup.
    Start,
    Pause,
    Resume,

    /// Replay a saved run instead of simulating.
    OpenPlayback(PathBuf),

    /// Append every tick to this file.
    SaveTo(PathBuf),

    /// Move a sensor's desired band.
    SetBand {
        subsystem: SubsystemId,
        upper: f64,
        lower: f64,
    },

    /// Humidifier/sprinkler rate, or the furnace rate for temperature.
    SetRiseRate { subsystem: SubsystemId, rate: f64 },

    /// Air-conditioner rate; the sign is ignored.
    SetCoolRate(f64),

    /// External drift of one quantity.
    SetExternalRate { quantity: Quantity, rate: f64 },

    SetRefreshInterval {
        subsystem: SubsystemId,
        interval: Duration,
    },

    /// Stop every loop and release the record file.
    Close,
}
