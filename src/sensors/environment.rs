//! External environment: drift applied to every quantity each tick.
//!
//! Unlike the sensor setters this step saturates at the hard limits
//! instead of rejecting.  It models an outside force, not user input.

use serde::{Deserialize, Serialize};

use super::Quantity;
use crate::error::OutOfRangeError;

/// One externally perturbed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Drift {
    /// Value captured when the simulation started.
    pub start: f64,
    pub current: f64,
    /// External change per tick (either sign).
    pub rate: f64,
}

impl Drift {
    fn advance(&mut self, quantity: Quantity) {
        self.current = quantity.clamp(self.current + self.rate);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub temperature: Drift,
    pub humidity: Drift,
    pub moisture: Drift,
}

impl EnvironmentState {
    pub fn drift(&self, quantity: Quantity) -> &Drift {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
            Quantity::Moisture => &self.moisture,
        }
    }
}

#[derive(Debug, Default)]
pub struct EnvironmentModel {
    state: EnvironmentState,
}

impl EnvironmentModel {
    pub const QUANTITIES: [Quantity; 3] =
        [Quantity::Temperature, Quantity::Humidity, Quantity::Moisture];

    pub fn new() -> Self {
        Self::default()
    }

    fn drift_mut(&mut self, quantity: Quantity) -> &mut Drift {
        match quantity {
            Quantity::Temperature => &mut self.state.temperature,
            Quantity::Humidity => &mut self.state.humidity,
            Quantity::Moisture => &mut self.state.moisture,
        }
    }

    /// Record the starting value of a quantity (also its current value).
    pub fn set_start(&mut self, quantity: Quantity, value: f64) -> Result<(), OutOfRangeError> {
        let value = quantity.check(value)?;
        let drift = self.drift_mut(quantity);
        drift.start = value;
        drift.current = value;
        Ok(())
    }

    /// Take in the latest sensor reading before drifting it.
    pub fn observe(&mut self, quantity: Quantity, value: f64) {
        self.drift_mut(quantity).current = value;
    }

    pub fn set_rate(&mut self, quantity: Quantity, rate: f64) {
        self.drift_mut(quantity).rate = rate;
    }

    pub fn current(&self, quantity: Quantity) -> f64 {
        self.state.drift(quantity).current
    }

    /// Apply one tick of external drift to every quantity.
    pub fn process(&mut self) {
        for q in Self::QUANTITIES {
            self.drift_mut(q).advance(q);
        }
    }

    pub fn state(&self) -> EnvironmentState {
        self.state
    }
}
