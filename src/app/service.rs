//! Simulator service: the orchestrator.
//!
//! [`Simulator`] owns the four models, their controllers, and the record
//! file.  It enforces the lifecycle and the save/playback exclusion; the
//! worker loops themselves know nothing about either.
//!
//! ```text
//!  InputPort ──▶ ┌──────────────────────────┐ ──▶ DisplayPort
//!                │        Simulator          │
//!  SimCommand ──▶│  lifecycle · mode · loops │──▶ RecordWriter
//!                └──────────────────────────┘
//!                   │ spawn (env, T, H, M)
//!                   ▼
//!             4 × worker thread ── LoopControl (pause / resume / shutdown)
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info, warn};

use crate::control::LoopControl;
use crate::controllers::environment::SensorSet;
use crate::controllers::{
    Controller, EnvironmentController, OneWayController, TemperatureController,
};
use crate::error::{LifecycleError, Result, SimError, ValidationError};
use crate::lifecycle::{LifecycleAction, RecordingMode, SimState};
use crate::record::Snapshot;
use crate::recording::RecordWriter;
use crate::sensors::{
    EnvironmentModel, OneWayModel, Quantity, Shared, SubsystemId, TemperatureModel, shared,
};

use super::commands::SimCommand;
use super::ports::{DisplayPort, InputPort};

// ───────────────────────────────────────────────────────────────
// Simulator
// ───────────────────────────────────────────────────────────────

pub struct Simulator {
    display: Arc<dyn DisplayPort>,
    environment: Shared<EnvironmentModel>,
    sensors: SensorSet,
    /// Controllers not yet moved onto their threads, in start order.
    controllers: Vec<Box<dyn Controller>>,
    /// Indexed by [`SubsystemId::index`].
    controls: Vec<Arc<LoopControl>>,
    workers: Vec<JoinHandle<()>>,
    writer: Option<RecordWriter>,
    state: SimState,
    mode: RecordingMode,
    ready: bool,
}

impl Simulator {
    pub fn new(display: Arc<dyn DisplayPort>) -> Self {
        let environment = shared(EnvironmentModel::new());
        let sensors = SensorSet {
            temperature: shared(TemperatureModel::new()),
            humidity: shared(OneWayModel::humidity()),
            moisture: shared(OneWayModel::moisture()),
        };
        let controllers: Vec<Box<dyn Controller>> = vec![
            Box::new(EnvironmentController::new(
                Arc::clone(&environment),
                sensors.clone(),
                Arc::clone(&display),
            )),
            Box::new(TemperatureController::new(
                Arc::clone(&sensors.temperature),
                Arc::clone(&display),
            )),
            Box::new(OneWayController::new(
                Arc::clone(&sensors.humidity),
                Arc::clone(&display),
            )),
            Box::new(OneWayController::new(
                Arc::clone(&sensors.moisture),
                Arc::clone(&display),
            )),
        ];
        let controls = controllers.iter().map(|c| c.control()).collect();

        Self {
            display,
            environment,
            sensors,
            controllers,
            controls,
            workers: Vec::new(),
            writer: None,
            state: SimState::Configuring,
            mode: RecordingMode::Live,
            ready: false,
        }
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn mode(&self) -> RecordingMode {
        self.mode
    }

    // ── Configuration ─────────────────────────────────────────

    /// Apply starting parameters to every subsystem.
    ///
    /// All four are attempted, environment first, and every failure is
    /// reported to the display.  The run can start only after a setup in
    /// which nothing failed.  Always succeeds in playback mode.
    pub fn setup(&mut self, inputs: &dyn InputPort) -> Result<()> {
        self.require_configuring("set up")?;
        let mut failures = Vec::new();
        for controller in &mut self.controllers {
            if let Err(e) = controller.setup(inputs) {
                let id = controller.id();
                warn!("{} setup failed: {}", id, e);
                self.display.display_error(id, &e.to_string());
                failures.push((id, e));
            }
        }
        self.ready = failures.is_empty();
        if self.ready {
            info!("Setup complete");
            Ok(())
        } else {
            Err(SimError::Setup(failures))
        }
    }

    /// Replay a saved run.  Every loop opens its own reader on `path`.
    pub fn open_playback(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.require_configuring("open a playback file")?;
        let mode = self.mode.select(RecordingMode::Playback)?;
        let path = path.as_ref();
        for i in 0..self.controllers.len() {
            if let Err(e) = self.controllers[i].open_playback(path) {
                for opened in &mut self.controllers[..i] {
                    opened.close();
                }
                return Err(e);
            }
        }
        info!("Playing back {}", path.display());
        self.mode = mode;
        Ok(())
    }

    /// Append every tick of this run to `path`.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.require_configuring("select a save file")?;
        let mode = self.mode.select(RecordingMode::Saving)?;
        let writer = RecordWriter::create(path, Arc::clone(&self.display))?;
        for controller in &mut self.controllers {
            if let Some(sink) = writer.sink() {
                controller.save_to(sink);
            }
        }
        self.writer = Some(writer);
        self.mode = mode;
        Ok(())
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Spawn one thread per subsystem.
    pub fn start(&mut self) -> Result<()> {
        self.launch(|name, mut controller| {
            thread::Builder::new().name(name).spawn(move || {
                controller.run();
                controller.close();
            })
        })
    }

    /// Hand every controller to `spawn`, then enter `Running`.
    ///
    /// If any spawn fails the run is closed: loops already started are
    /// shut down and joined, and the unstarted ones release their files.
    fn launch<F>(&mut self, mut spawn: F) -> Result<()>
    where
        F: FnMut(String, Box<dyn Controller>) -> io::Result<JoinHandle<()>>,
    {
        if !self.ready && self.mode != RecordingMode::Playback {
            return Err(LifecycleError::NotReady.into());
        }
        let next = self.state.apply(LifecycleAction::Start)?;
        let mut pending = std::mem::take(&mut self.controllers).into_iter();
        while let Some(controller) = pending.next() {
            let name = format!("{}-loop", controller.id());
            match spawn(name.clone(), controller) {
                Ok(handle) => self.workers.push(handle),
                Err(source) => {
                    error!("Could not spawn {}: {}", name, source);
                    self.controllers.extend(pending);
                    self.close();
                    return Err(SimError::Spawn { name, source });
                }
            }
        }
        self.state = next;
        info!("Started {} loops ({:?})", self.workers.len(), self.mode);
        Ok(())
    }

    /// Park every loop at its next tick boundary.
    pub fn pause(&mut self) -> Result<()> {
        self.state = self.state.apply(LifecycleAction::Pause)?;
        for control in &self.controls {
            control.pause();
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.state = self.state.apply(LifecycleAction::Resume)?;
        for control in &self.controls {
            control.resume();
        }
        Ok(())
    }

    /// Whether every loop has exited (playback ran out, or closed).
    pub fn finished(&self) -> bool {
        match self.state {
            SimState::Closed => true,
            state if state.is_started() => self.workers.iter().all(|w| w.is_finished()),
            _ => false,
        }
    }

    /// Stop every loop, wait for them, then close the record file.
    ///
    /// Never fails and is safe to call more than once.
    pub fn close(&mut self) {
        if self.state == SimState::Closed {
            return;
        }
        self.state = self
            .state
            .apply(LifecycleAction::Close)
            .unwrap_or(SimState::Closed);
        for control in &self.controls {
            control.shutdown();
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("A worker loop panicked");
            }
        }
        // Unstarted controllers still hold readers or sinks.
        for controller in &mut self.controllers {
            controller.close();
        }
        if let Some(mut writer) = self.writer.take() {
            writer.close();
            info!("Closed record file {}", writer.path().display());
        }
        info!("Simulator closed");
    }

    // ── Live settings ─────────────────────────────────────────

    pub fn set_band(&self, subsystem: SubsystemId, upper: f64, lower: f64) -> Result<()> {
        self.require_live_settings()?;
        match subsystem {
            SubsystemId::Temperature => self
                .sensors
                .temperature
                .lock()
                .set_desired_range(upper, lower),
            SubsystemId::Humidity => self.sensors.humidity.lock().set_desired_range(upper, lower),
            SubsystemId::Moisture => self.sensors.moisture.lock().set_desired_range(upper, lower),
            SubsystemId::Environment => return Err(LifecycleError::Unsupported(subsystem).into()),
        }
        Ok(())
    }

    /// Humidifier or sprinkler rate; the furnace rate for temperature.
    pub fn set_rise_rate(&self, subsystem: SubsystemId, rate: f64) -> Result<()> {
        self.require_live_settings()?;
        let result = match subsystem {
            SubsystemId::Temperature => self.sensors.temperature.lock().set_heat_rate(rate),
            SubsystemId::Humidity => self.sensors.humidity.lock().set_rise_rate(rate),
            SubsystemId::Moisture => self.sensors.moisture.lock().set_rise_rate(rate),
            SubsystemId::Environment => return Err(LifecycleError::Unsupported(subsystem).into()),
        };
        result.map_err(|e| SimError::validation(subsystem, e))
    }

    pub fn set_cool_rate(&self, rate: f64) -> Result<()> {
        self.require_live_settings()?;
        self.sensors.temperature.lock().set_cool_rate(rate);
        Ok(())
    }

    pub fn set_external_rate(&self, quantity: Quantity, rate: f64) -> Result<()> {
        self.require_live_settings()?;
        self.environment.lock().set_rate(quantity, rate);
        Ok(())
    }

    /// Takes effect after the loop's current sleep.
    pub fn set_refresh_interval(&self, subsystem: SubsystemId, interval: Duration) -> Result<()> {
        self.require_live_settings()?;
        if interval.is_zero() {
            return Err(SimError::validation(subsystem, ValidationError::RefreshInterval));
        }
        self.controls[subsystem.index()].set_interval(interval);
        Ok(())
    }

    /// Current state of one subsystem's model.
    pub fn snapshot(&self, subsystem: SubsystemId) -> Snapshot {
        match subsystem {
            SubsystemId::Environment => Snapshot::Environment(self.environment.lock().state()),
            SubsystemId::Temperature => Snapshot::Temperature(self.sensors.temperature.lock().state()),
            SubsystemId::Humidity => Snapshot::Humidity(self.sensors.humidity.lock().state()),
            SubsystemId::Moisture => Snapshot::Moisture(self.sensors.moisture.lock().state()),
        }
    }

    // ── Command dispatch ──────────────────────────────────────

    pub fn handle_command(&mut self, cmd: SimCommand) -> Result<()> {
        match cmd {
            SimCommand::Start => self.start(),
            SimCommand::Pause => self.pause(),
            SimCommand::Resume => self.resume(),
            SimCommand::OpenPlayback(path) => self.open_playback(path),
            SimCommand::SaveTo(path) => self.save_to(path),
            SimCommand::SetBand {
                subsystem,
                upper,
                lower,
            } => self.set_band(subsystem, upper, lower),
            SimCommand::SetRiseRate { subsystem, rate } => self.set_rise_rate(subsystem, rate),
            SimCommand::SetCoolRate(rate) => self.set_cool_rate(rate),
            SimCommand::SetExternalRate { quantity, rate } => {
                self.set_external_rate(quantity, rate)
            }
            SimCommand::SetRefreshInterval {
                subsystem,
                interval,
            } => self.set_refresh_interval(subsystem, interval),
            SimCommand::Close => {
                self.close();
                Ok(())
            }
        }
    }

    // ── Guards ────────────────────────────────────────────────

    fn require_configuring(&self, action: &'static str) -> Result<()> {
        if self.state == SimState::Configuring {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                action,
                state: self.state,
            }
            .into())
        }
    }

    fn require_live_settings(&self) -> Result<()> {
        if self.state == SimState::Closed {
            return Err(LifecycleError::InvalidTransition {
                action: "change settings",
                state: self.state,
            }
            .into());
        }
        if self.mode == RecordingMode::Playback {
            return Err(LifecycleError::PlaybackReadOnly.into());
        }
        Ok(())
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.close();
    }
}
