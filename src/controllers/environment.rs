//! External environment loop.
//!
//! Each tick pulls the sensors' current readings, drifts them by the
//! external rates, and pushes the results back down:
//!
//! ```text
//!   sensors ──current──▶ EnvironmentModel::observe
//!                         EnvironmentModel::process   (saturating)
//!   sensors ◀─set_current─ EnvironmentModel::current
//! ```

use std::sync::Arc;

use log::debug;

use super::Controller;
use crate::app::ports::{DisplayPort, InputPort};
use crate::control::LoopCore;
use crate::error::{OutOfRangeError, ValidationError};
use crate::record::Snapshot;
use crate::sensors::{
    EnvironmentModel, OneWayModel, Quantity, Shared, SubsystemId, TemperatureModel,
};

/// Handles to the three sensor models the environment drives.
#[derive(Clone)]
pub struct SensorSet {
    pub temperature: Shared<TemperatureModel>,
    pub humidity: Shared<OneWayModel>,
    pub moisture: Shared<OneWayModel>,
}

impl SensorSet {
    fn current(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Temperature => self.temperature.lock().current(),
            Quantity::Humidity => self.humidity.lock().current(),
            Quantity::Moisture => self.moisture.lock().current(),
        }
    }

    fn set_current(&self, quantity: Quantity, value: f64) -> Result<(), OutOfRangeError> {
        match quantity {
            Quantity::Temperature => self.temperature.lock().set_current(value),
            Quantity::Humidity => self.humidity.lock().set_current(value),
            Quantity::Moisture => self.moisture.lock().set_current(value),
        }
    }
}

pub struct EnvironmentController {
    core: LoopCore,
    model: Shared<EnvironmentModel>,
    sensors: SensorSet,
}

impl EnvironmentController {
    pub fn new(
        model: Shared<EnvironmentModel>,
        sensors: SensorSet,
        display: Arc<dyn DisplayPort>,
    ) -> Self {
        Self {
            core: LoopCore::new(SubsystemId::Environment, display),
            model,
            sensors,
        }
    }
}

/// One environment tick.  Never holds two model locks at once.
fn tick(core: &LoopCore, model: &Shared<EnvironmentModel>, sensors: &SensorSet) -> Snapshot {
    for q in EnvironmentModel::QUANTITIES {
        let reading = sensors.current(q);
        model.lock().observe(q, reading);
    }
    model.lock().process();
    for q in EnvironmentModel::QUANTITIES {
        let value = model.lock().current(q);
        if let Err(e) = sensors.set_current(q, value) {
            core.report(&e.to_string());
        }
    }
    Snapshot::Environment(model.lock().state())
}

impl Controller for EnvironmentController {
    fn core(&self) -> &LoopCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LoopCore {
        &mut self.core
    }

    /// Start values seed both the environment and the sensors' current
    /// readings.
    fn setup(&mut self, inputs: &dyn InputPort) -> Result<(), ValidationError> {
        if self.core.is_playback() {
            return Ok(());
        }
        let settings = inputs.environment()?;
        let start = [
            (Quantity::Temperature, settings.start_temperature, settings.temperature_rate),
            (Quantity::Humidity, settings.start_humidity, settings.humidity_rate),
            (Quantity::Moisture, settings.start_moisture, settings.moisture_rate),
        ];
        for (q, value, rate) in start {
            self.model.lock().set_start(q, value)?;
            self.sensors.set_current(q, value)?;
            self.model.lock().set_rate(q, rate);
        }
        self.core.set_interval_ms(settings.refresh_interval_ms)?;
        debug!("environment start {:?}", self.model.lock().state());
        Ok(())
    }

    fn run(&mut self) {
        if self.core.is_playback() {
            self.core.run_playback();
            return;
        }
        let model = Arc::clone(&self.model);
        let sensors = self.sensors.clone();
        self.core.run_live(|core| tick(core, &model, &sensors));
    }
}
