//! Subsystem controllers: one worker loop per subsystem.
//!
//! ```text
//!   Simulator
//!     ├── EnvironmentController ─┬─▶ TemperatureModel
//!     │                          ├─▶ OneWayModel (humidity)
//!     │                          └─▶ OneWayModel (moisture)
//!     ├── TemperatureController
//!     ├── OneWayController (humidity)
//!     └── OneWayController (moisture)
//! ```
//!
//! Every controller is set up, then moved onto its own thread where
//! [`Controller::run`] loops until shutdown or end of playback.  Pause,
//! resume, and shutdown reach the running loop through its
//! [`LoopControl`] handle.

pub mod environment;
pub mod one_way;
pub mod temperature;

use std::path::Path;
use std::sync::Arc;

use crate::app::ports::InputPort;
use crate::control::{LoopControl, LoopCore};
use crate::error::{Result, ValidationError};
use crate::recording::RecordSink;
use crate::sensors::SubsystemId;

pub use environment::EnvironmentController;
pub use one_way::OneWayController;
pub use temperature::TemperatureController;

/// Capability set shared by every subsystem loop.
pub trait Controller: Send {
    fn core(&self) -> &LoopCore;
    fn core_mut(&mut self) -> &mut LoopCore;

    /// Read starting parameters and apply them to the model.
    ///
    /// A no-op in playback mode.  On error the model keeps whatever was
    /// applied before the failing field.
    fn setup(&mut self, inputs: &dyn InputPort) -> core::result::Result<(), ValidationError>;

    /// Loop until shutdown (live) or end of input (playback).
    fn run(&mut self);

    fn id(&self) -> SubsystemId {
        self.core().id()
    }

    fn control(&self) -> Arc<LoopControl> {
        self.core().control()
    }

    fn open_playback(&mut self, path: &Path) -> Result<()> {
        self.core_mut().open_playback(path)
    }

    fn save_to(&mut self, sink: RecordSink) {
        self.core_mut().save_to(sink);
    }

    fn pause(&self) {
        self.core().control().pause();
    }

    fn resume(&self) {
        self.core().control().resume();
    }

    /// Release the reader or sink.  Safe to call more than once.
    fn close(&mut self) {
        self.core_mut().close();
    }
}
