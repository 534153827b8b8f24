//! One-way devices: the humidifier and the soil sprinkler.
//!
//! Neither can remove water from the greenhouse.  Above the band the
//! device simply switches off and the reading sits wherever the
//! environment leaves it.

use serde::{Deserialize, Serialize};

use super::{Actuator, Quantity};
use crate::error::{InvalidRateError, OutOfRangeError};

/// Point-in-time view of a humidity or moisture subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneWayState {
    pub quantity: Quantity,
    pub current: f64,
    pub upper: f64,
    pub lower: f64,
    pub rise_rate: f64,
    pub device_on: bool,
}

impl OneWayState {
    pub fn device_status(&self) -> &'static str {
        if self.device_on { "On" } else { "Off" }
    }
}

#[derive(Debug)]
pub struct OneWayModel {
    quantity: Quantity,
    current: f64,
    upper: f64,
    lower: f64,
    rise_rate: f64,
    actuator: Actuator,
}

impl OneWayModel {
    pub fn new(quantity: Quantity) -> Self {
        Self {
            quantity,
            current: 0.0,
            upper: 0.0,
            lower: 0.0,
            rise_rate: 0.0,
            actuator: Actuator::Off,
        }
    }

    pub fn humidity() -> Self {
        Self::new(Quantity::Humidity)
    }

    pub fn moisture() -> Self {
        Self::new(Quantity::Moisture)
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn set_desired_range(&mut self, upper: f64, lower: f64) {
        self.upper = upper;
        self.lower = lower;
    }

    pub fn set_current(&mut self, value: f64) -> Result<(), OutOfRangeError> {
        self.current = self.quantity.check(value)?;
        Ok(())
    }

    pub fn set_rise_rate(&mut self, rate: f64) -> Result<(), InvalidRateError> {
        self.rise_rate = self.quantity.check_rate(rate)?;
        Ok(())
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn actuator(&self) -> Actuator {
        self.actuator
    }

    pub fn device_status(&self) -> &'static str {
        self.state().device_status()
    }

    /// One control tick.
    pub fn step(&mut self) {
        let q = self.quantity;
        if self.current < self.lower && self.current >= q.hard_min() {
            self.actuator = Actuator::Raising;
            self.current = q.clamp(self.current + self.rise_rate);
        } else {
            // Above the band (or inside it) there is nothing this device can do.
            self.actuator = Actuator::Off;
        }
    }

    pub fn state(&self) -> OneWayState {
        OneWayState {
            quantity: self.quantity,
            current: self.current,
            upper: self.upper,
            lower: self.lower,
            rise_rate: self.rise_rate,
            device_on: self.actuator.is_on(),
        }
    }
}
