//! Temperature loop: furnace and air conditioner.

use std::sync::Arc;

use log::debug;

use super::Controller;
use crate::app::ports::{DisplayPort, InputPort};
use crate::control::LoopCore;
use crate::error::ValidationError;
use crate::record::Snapshot;
use crate::sensors::{Shared, SubsystemId, TemperatureModel};

pub struct TemperatureController {
    core: LoopCore,
    model: Shared<TemperatureModel>,
}

impl TemperatureController {
    pub fn new(model: Shared<TemperatureModel>, display: Arc<dyn DisplayPort>) -> Self {
        Self {
            core: LoopCore::new(SubsystemId::Temperature, display),
            model,
        }
    }
}

impl Controller for TemperatureController {
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
        let settings = inputs.temperature()?;
        self.model.lock().set_cool_rate(settings.cool_rate);
        self.model.lock().set_heat_rate(settings.heat_rate)?;
        self.model
            .lock()
            .set_desired_range(settings.upper, settings.lower);
        self.core.set_interval_ms(settings.refresh_interval_ms)?;
        debug!(
            "temperature band {}..{} heat {} cool {}",
            settings.lower, settings.upper, settings.heat_rate, settings.cool_rate
        );
        Ok(())
    }

    fn run(&mut self) {
        if self.core.is_playback() {
            self.core.run_playback();
            return;
        }
        let model = Arc::clone(&self.model);
        self.core.run_live(|_| {
            let mut m = model.lock();
            m.step();
            Snapshot::Temperature(m.state())
        });
    }
}
