//! Mock ports for integration tests.
//!
//! `CaptureDisplay` records every snapshot and error with a timestamp so
//! tests can assert on ordering and pacing.  `FlakyInput` wraps a config
//! and can make one subsystem's input unreadable.

use std::time::{Duration, Instant};

use greenhouse::app::ports::{DisplayPort, InputPort};
use greenhouse::config::{
    EnvironmentSettings, OneWaySettings, SimulationConfig, TemperatureSettings,
};
use greenhouse::error::InputError;
use greenhouse::record::Record;
use greenhouse::sensors::SubsystemId;
use parking_lot::Mutex;

// ── Display ───────────────────────────────────────────────────

#[derive(Default)]
pub struct CaptureDisplay {
    pub snapshots: Mutex<Vec<(Instant, Record)>>,
    pub errors: Mutex<Vec<(SubsystemId, String)>>,
}

#[allow(dead_code)]
impl CaptureDisplay {
    pub fn records_for(&self, id: SubsystemId) -> Vec<Record> {
        self.snapshots
            .lock()
            .iter()
            .filter(|(_, r)| r.subsystem() == id)
            .map(|(_, r)| *r)
            .collect()
    }

    pub fn times_for(&self, id: SubsystemId) -> Vec<Instant> {
        self.snapshots
            .lock()
            .iter()
            .filter(|(_, r)| r.subsystem() == id)
            .map(|(t, _)| *t)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.snapshots.lock().len()
    }

    pub fn errors_for(&self, id: SubsystemId) -> Vec<String> {
        self.errors
            .lock()
            .iter()
            .filter(|(s, _)| *s == id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Poll until `id` has shown at least `n` records or `timeout` passes.
    pub fn wait_for(&self, id: SubsystemId, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.records_for(id).len() >= n {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }
}

impl DisplayPort for CaptureDisplay {
    fn display_snapshot(&self, record: &Record) {
        self.snapshots.lock().push((Instant::now(), *record));
    }

    fn display_error(&self, subsystem: SubsystemId, message: &str) {
        self.errors.lock().push((subsystem, message.to_owned()));
    }
}

// ── Input ─────────────────────────────────────────────────────

pub struct FlakyInput {
    pub config: SimulationConfig,
    pub unreadable: Option<SubsystemId>,
}

impl FlakyInput {
    fn check(&self, id: SubsystemId) -> Result<(), InputError> {
        if self.unreadable == Some(id) {
            Err(InputError::new("rate", "'fast' is not a number"))
        } else {
            Ok(())
        }
    }
}

impl InputPort for FlakyInput {
    fn environment(&self) -> Result<EnvironmentSettings, InputError> {
        self.check(SubsystemId::Environment)?;
        Ok(self.config.environment.clone())
    }

    fn temperature(&self) -> Result<TemperatureSettings, InputError> {
        self.check(SubsystemId::Temperature)?;
        Ok(self.config.temperature.clone())
    }

    fn humidity(&self) -> Result<OneWaySettings, InputError> {
        self.check(SubsystemId::Humidity)?;
        Ok(self.config.humidity.clone())
    }

    fn moisture(&self) -> Result<OneWaySettings, InputError> {
        self.check(SubsystemId::Moisture)?;
        Ok(self.config.moisture.clone())
    }
}

/// Default greenhouse with every loop ticking every `ms` milliseconds.
pub fn fast_config(ms: u64) -> SimulationConfig {
    let mut c = SimulationConfig::default();
    c.environment.refresh_interval_ms = ms;
    c.temperature.refresh_interval_ms = ms;
    c.humidity.refresh_interval_ms = ms;
    c.moisture.refresh_interval_ms = ms;
    c
}
