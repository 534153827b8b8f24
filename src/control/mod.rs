//! Worker loop machinery shared by every subsystem controller.
//!
//! A [`LoopCore`] owns one subsystem's loop control, its display handle,
//! and its recording mode.  Controllers supply only the per-tick work:
//!
//! ```text
//!   live:      tick() ─▶ display ─▶ append (if saving) ─▶ pace
//!   playback:  next tagged line ─▶ display ─▶ sleep(recorded interval)
//! ```

pub mod gate;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::app::ports::DisplayPort;
use crate::error::{Result, ValidationError};
use crate::record::{Record, Snapshot};
use crate::recording::{PlaybackReader, RecordSink};
use crate::sensors::SubsystemId;

pub use gate::{Flow, LoopControl};

/// Refresh interval until setup supplies one.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Where a loop's records come from or go to.
enum LoopMode {
    Live,
    Saving(RecordSink),
    Playback(PlaybackReader),
}

pub struct LoopCore {
    id: SubsystemId,
    control: Arc<LoopControl>,
    display: Arc<dyn DisplayPort>,
    mode: LoopMode,
}

impl LoopCore {
    pub fn new(id: SubsystemId, display: Arc<dyn DisplayPort>) -> Self {
        Self {
            id,
            control: Arc::new(LoopControl::new(DEFAULT_INTERVAL)),
            display,
            mode: LoopMode::Live,
        }
    }

    pub fn id(&self) -> SubsystemId {
        self.id
    }

    pub fn control(&self) -> Arc<LoopControl> {
        Arc::clone(&self.control)
    }

    pub fn is_playback(&self) -> bool {
        matches!(self.mode, LoopMode::Playback(_))
    }

    /// Open this loop's own reader on a saved run.
    pub fn open_playback(&mut self, path: &Path) -> Result<()> {
        let reader = PlaybackReader::open(path)?;
        debug!("{} reading playback from {}", self.id, reader.path().display());
        self.mode = LoopMode::Playback(reader);
        Ok(())
    }

    pub fn save_to(&mut self, sink: RecordSink) {
        self.mode = LoopMode::Saving(sink);
    }

    /// Set the live refresh interval from milliseconds.
    pub fn set_interval_ms(&self, ms: u64) -> core::result::Result<(), ValidationError> {
        if ms == 0 {
            return Err(ValidationError::RefreshInterval);
        }
        self.control.set_interval(Duration::from_millis(ms));
        Ok(())
    }

    /// Interval written into records, in whole seconds.
    pub fn interval_secs(&self) -> u64 {
        self.control.interval().as_secs()
    }

    /// Show an error against this subsystem.
    pub fn report(&self, message: &str) {
        warn!("{}: {}", self.id, message);
        self.display.display_error(self.id, message);
    }

    /// Display one tick's state and append it when saving.
    pub fn publish(&self, snapshot: Snapshot) {
        let record = Record::new(snapshot, self.interval_secs());
        self.display.display_snapshot(&record);
        if let LoopMode::Saving(sink) = &self.mode {
            if let Err(e) = sink.append(record) {
                self.report(&format!("could not save record: {e}"));
            }
        }
    }

    /// Run ticks until shutdown.  `tick` advances the model one step and
    /// returns the resulting state.
    pub fn run_live(&self, mut tick: impl FnMut(&Self) -> Snapshot) {
        info!("{} loop started", self.id);
        loop {
            let snapshot = tick(self);
            self.publish(snapshot);
            if self.control.pace(self.control.interval()) == Flow::Stop {
                break;
            }
        }
        info!("{} loop stopped", self.id);
    }

    /// Replay this subsystem's recorded lines at their recorded pace.
    ///
    /// Ends at end of input, on shutdown, or on the first bad line.
    pub fn run_playback(&mut self) {
        let LoopMode::Playback(reader) = &mut self.mode else {
            return;
        };
        info!("{} playback started", self.id);
        loop {
            match reader.next_for(self.id) {
                Ok(Some(record)) => {
                    self.display.display_snapshot(&record);
                    let wait = Duration::from_secs(record.interval_secs);
                    if self.control.pace(wait) == Flow::Stop {
                        break;
                    }
                }
                Ok(None) => {
                    info!("{} playback finished", self.id);
                    break;
                }
                Err(e) => {
                    error!("{} playback aborted: {}", self.id, e);
                    self.display.display_error(self.id, &e.to_string());
                    break;
                }
            }
        }
    }

    /// Drop any reader or sink.  Safe to call repeatedly.
    pub fn close(&mut self) {
        self.mode = LoopMode::Live;
    }
}
