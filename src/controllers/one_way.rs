//! Humidity and soil-moisture loops: one device that can only raise.

use std::sync::Arc;

use log::debug;

use super::Controller;
use crate::app::ports::{DisplayPort, InputPort};
use crate::control::LoopCore;
use crate::error::ValidationError;
use crate::record::Snapshot;
use crate::sensors::{OneWayModel, OneWayState, Quantity, Shared, SubsystemId};

pub struct OneWayController {
    core: LoopCore,
    model: Shared<OneWayModel>,
    quantity: Quantity,
}

impl OneWayController {
    /// The model's quantity picks the subsystem (humidity or moisture).
    pub fn new(model: Shared<OneWayModel>, display: Arc<dyn DisplayPort>) -> Self {
        let quantity = model.lock().quantity();
        let id = match quantity {
            Quantity::Moisture => SubsystemId::Moisture,
            Quantity::Humidity | Quantity::Temperature => SubsystemId::Humidity,
        };
        Self {
            core: LoopCore::new(id, display),
            model,
            quantity,
        }
    }
}

fn wrap(quantity: Quantity, state: OneWayState) -> Snapshot {
    match quantity {
        Quantity::Moisture => Snapshot::Moisture(state),
        Quantity::Humidity | Quantity::Temperature => Snapshot::Humidity(state),
    }
}

impl Controller for OneWayController {
    fn core(&self) -> &LoopCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LoopCore {
        &mut self.core
    }

    fn setup(&mut self, inputs: &dyn InputPort) -> Result<(), ValidationError> {
        if self.core.is_playback() {
            return Ok(());
        }
        let settings = match self.quantity {
            Quantity::Moisture => inputs.moisture()?,
            _ => inputs.humidity()?,
        };
        self.model.lock().set_rise_rate(settings.rise_rate)?;
        self.model
            .lock()
            .set_desired_range(settings.upper, settings.lower);
        self.core.set_interval_ms(settings.refresh_interval_ms)?;
        debug!(
            "{} band {}..{} rise {}",
            self.core.id(),
            settings.lower,
            settings.upper,
            settings.rise_rate
        );
        Ok(())
    }

    fn run(&mut self) {
        if self.core.is_playback() {
            self.core.run_playback();
            return;
        }
        let model = Arc::clone(&self.model);
        let quantity = self.quantity;
        self.core.run_live(|_| {
            let mut m = model.lock();
            m.step();
            wrap(quantity, m.state())
        });
    }
}
