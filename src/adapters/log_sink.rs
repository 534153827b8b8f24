//! Log-based display adapter.
//!
//! Implements [`DisplayPort`] by writing every snapshot and error to the
//! `log` facade.  Used by the headless binary; a windowed UI would
//! implement the same trait.

use log::{error, info};

use crate::app::ports::DisplayPort;
use crate::record::{Record, Snapshot};
use crate::sensors::SubsystemId;

/// Adapter that logs every tick of every subsystem.
#[derive(Debug, Default)]
pub struct LogDisplay;

impl LogDisplay {
    pub fn new() -> Self {
        Self
    }
}

/// One human-readable status line for a record.
pub fn describe(record: &Record) -> String {
    let every = record.interval_secs;
    match &record.snapshot {
        Snapshot::Environment(e) => format!(
            "ENV   | T={:.2}\u{00b0}C ({:+.2}) | H={:.2}% ({:+.2}) | M={:.2}% ({:+.2}) | every {}s",
            e.temperature.current,
            e.temperature.rate,
            e.humidity.current,
            e.humidity.rate,
            e.moisture.current,
            e.moisture.rate,
            every,
        ),
        Snapshot::Temperature(t) => format!(
            "TEMP  | {:.2}\u{00b0}C in [{:.0}, {:.0}] | {} | every {}s",
            t.current,
            t.lower,
            t.upper,
            t.device_status(),
            every,
        ),
        Snapshot::Humidity(s) | Snapshot::Moisture(s) => format!(
            "{:<5} | {:.2}% in [{:.0}, {:.0}] | {} | every {}s",
            if matches!(record.snapshot, Snapshot::Humidity(_)) {
                "HUMID"
            } else {
                "MOIST"
            },
            s.current,
            s.lower,
            s.upper,
            s.device_status(),
            every,
        ),
    }
}

impl DisplayPort for LogDisplay {
    fn display_snapshot(&self, record: &Record) {
        info!("{}", describe(record));
    }

    fn display_error(&self, subsystem: SubsystemId, message: &str) {
        error!("{} | {}", subsystem, message);
    }
}
