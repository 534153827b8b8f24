//! Greenhouse temperature: a furnace that heats and an air conditioner
//! that cools.
//!
//! The only two-way device in the greenhouse.  The cooling rate is held
//! internally as a negative magnitude so the control step can always add
//! the active rate.

use serde::{Deserialize, Serialize};

use super::{Actuator, Quantity};
use crate::error::{InvalidRateError, OutOfRangeError};

/// Point-in-time view of the temperature subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureState {
    pub current: f64,
    pub upper: f64,
    pub lower: f64,
    /// Furnace rate (°C per tick), always > 0 once configured.
    pub heat_rate: f64,
    /// Air-conditioner rate magnitude (°C per tick).
    pub cool_rate: f64,
    pub actuator: Actuator,
}

impl TemperatureState {
    pub fn device_status(&self) -> &'static str {
        match self.actuator {
            Actuator::Off => "Off",
            Actuator::Raising => "Heating",
            Actuator::Lowering => "Cooling",
        }
    }
}

#[derive(Debug, Default)]
pub struct TemperatureModel {
    current: f64,
    upper: f64,
    lower: f64,
    heat_rate: f64,
    /// Stored as `-|rate|`.
    fall_rate: f64,
    actuator: Actuator,
}

impl TemperatureModel {
    pub const QUANTITY: Quantity = Quantity::Temperature;

    pub fn new() -> Self {
        Self::default()
    }

    /// Store the desired band.  No validation: a band outside the hard
    /// limits just keeps an actuator running.
    pub fn set_desired_range(&mut self, upper: f64, lower: f64) {
        self.upper = upper;
        self.lower = lower;
    }

    pub fn set_current(&mut self, value: f64) -> Result<(), OutOfRangeError> {
        self.current = Self::QUANTITY.check(value)?;
        Ok(())
    }

    pub fn set_heat_rate(&mut self, rate: f64) -> Result<(), InvalidRateError> {
        self.heat_rate = Self::QUANTITY.check_rate(rate)?;
        Ok(())
    }

    /// Never fails; the sign is normalised.
    pub fn set_cool_rate(&mut self, rate: f64) {
        self.fall_rate = -rate.abs();
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
        if self.current < self.lower {
            self.actuator = Actuator::Raising;
            self.current += self.heat_rate;
        } else if self.current > self.upper {
            self.actuator = Actuator::Lowering;
            self.current += self.fall_rate;
        } else {
            self.actuator = Actuator::Off;
        }
        self.current = Self::QUANTITY.clamp(self.current);
    }

    pub fn state(&self) -> TemperatureState {
        TemperatureState {
            current: self.current,
            upper: self.upper,
            lower: self.lower,
            heat_rate: self.heat_rate,
            cool_rate: self.fall_rate.abs(),
            actuator: self.actuator,
        }
    }
}
