//! Simulation parameters
//!
//! Starting values, desired bands, rates, and refresh intervals for every
//! subsystem.  Loaded from JSON; any field left out takes its default.
//!
//! Nothing here is validated.  The models check each value when
//! [`Simulator::setup`](crate::app::service::Simulator::setup) applies it,
//! so a bad config fails exactly like bad UI input.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::app::ports::InputPort;
use crate::error::InputError;

/// External environment: where each quantity starts and how it drifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSettings {
    /// Degrees Celsius
    pub start_temperature: f64,
    /// Percent
    pub start_humidity: f64,
    /// Percent
    pub start_moisture: f64,
    /// Change per tick, either sign
    pub temperature_rate: f64,
    pub humidity_rate: f64,
    pub moisture_rate: f64,
    pub refresh_interval_ms: u64,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            start_temperature: 20.0,
            start_humidity: 50.0,
            start_moisture: 50.0,
            temperature_rate: -0.5,
            humidity_rate: -0.5,
            moisture_rate: -1.0,
            refresh_interval_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureSettings {
    pub upper: f64,
    pub lower: f64,
    /// Furnace output per tick (positive)
    pub heat_rate: f64,
    /// Air conditioner output per tick; the sign is ignored
    pub cool_rate: f64,
    pub refresh_interval_ms: u64,
}

impl Default for TemperatureSettings {
    fn default() -> Self {
        Self {
            upper: 26.0,
            lower: 18.0,
            heat_rate: 1.0,
            cool_rate: 1.0,
            refresh_interval_ms: 5000,
        }
    }
}

/// Humidity or soil moisture: a band and the single device's rise rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneWaySettings {
    pub upper: f64,
    pub lower: f64,
    pub rise_rate: f64,
    pub refresh_interval_ms: u64,
}

impl Default for OneWaySettings {
    fn default() -> Self {
        Self {
            upper: 70.0,
            lower: 40.0,
            rise_rate: 1.0,
            refresh_interval_ms: 5000,
        }
    }
}

/// Complete configuration of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub environment: EnvironmentSettings,
    pub temperature: TemperatureSettings,
    pub humidity: OneWaySettings,
    pub moisture: OneWaySettings,
}

impl SimulationConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl InputPort for SimulationConfig {
    fn environment(&self) -> Result<EnvironmentSettings, InputError> {
        Ok(self.environment.clone())
    }

    fn temperature(&self) -> Result<TemperatureSettings, InputError> {
        Ok(self.temperature.clone())
    }

    fn humidity(&self) -> Result<OneWaySettings, InputError> {
        Ok(self.humidity.clone())
    }

    fn moisture(&self) -> Result<OneWaySettings, InputError> {
        Ok(self.moisture.clone())
    }
}
