//! Bounded quantity models, one per greenhouse subsystem.
//!
//! Each model is pure state plus transition rules for one physical
//! quantity, clamped to that quantity's hard limits.  The worker loops
//! own the stepping; the UI collaborator only reads.
//!
//! ```text
//!   EnvironmentModel ──(drift, saturating)──▶ pushes current values into
//!        │
//!        ├──▶ TemperatureModel   furnace ▲ / air-con ▼
//!        ├──▶ OneWayModel (humidity)  humidifier ▲
//!        └──▶ OneWayModel (moisture)  sprinkler  ▲
//! ```
//!
//! Models are shared between a worker loop and the orchestrator through
//! [`Shared`] handles.  Every accessor takes the lock for exactly one
//! call: there is no multi-call transaction.

pub mod environment;
pub mod one_way;
pub mod temperature;

use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{InvalidRateError, OutOfRangeError};

pub use environment::{Drift, EnvironmentModel, EnvironmentState};
pub use one_way::{OneWayModel, OneWayState};
pub use temperature::{TemperatureModel, TemperatureState};

/// Lock-per-call handle to a model shared across threads.
pub type Shared<T> = Arc<Mutex<T>>;

/// Wrap a model in a [`Shared`] handle.
pub fn shared<T>(model: T) -> Shared<T> {
    Arc::new(Mutex::new(model))
}

// ---------------------------------------------------------------------------
// Physical quantities
// ---------------------------------------------------------------------------

/// The three physical quantities the greenhouse tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Temperature,
    Humidity,
    Moisture,
}

impl Quantity {
    /// Absolute zero.
    pub const ABSOLUTE_ZERO_C: f64 = -273.15;
    /// Upper temperature limit of the simulated greenhouse.
    pub const MAX_TEMPERATURE_C: f64 = 300.0;

    /// Lowest value the quantity can physically reach.
    pub const fn hard_min(self) -> f64 {
        match self {
            Self::Temperature => Self::ABSOLUTE_ZERO_C,
            Self::Humidity | Self::Moisture => 0.0,
        }
    }

    /// Highest value the quantity can physically reach.
    pub const fn hard_max(self) -> f64 {
        match self {
            Self::Temperature => Self::MAX_TEMPERATURE_C,
            Self::Humidity | Self::Moisture => 100.0,
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "\u{00b0}C",
            Self::Humidity | Self::Moisture => "%",
        }
    }

    /// Check a user- or sensor-supplied value against the hard limits.
    /// Rejects rather than clamps.
    pub fn check(self, value: f64) -> Result<f64, OutOfRangeError> {
        if value >= self.hard_min() && value <= self.hard_max() {
            Ok(value)
        } else {
            Err(OutOfRangeError {
                quantity: self,
                value,
                min: self.hard_min(),
                max: self.hard_max(),
            })
        }
    }

    /// Saturate a value at the hard limits (used for internal forces).
    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.hard_min(), self.hard_max())
    }

    /// Validate a one-way actuator rate (strictly positive).
    pub fn check_rate(self, rate: f64) -> Result<f64, InvalidRateError> {
        if rate > 0.0 {
            Ok(rate)
        } else {
            Err(InvalidRateError {
                quantity: self,
                rate,
            })
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "Temperature"),
            Self::Humidity => write!(f, "Humidity"),
            Self::Moisture => write!(f, "Soil moisture"),
        }
    }
}

// ---------------------------------------------------------------------------
// Subsystems
// ---------------------------------------------------------------------------

/// The four independently looping subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsystemId {
    Environment,
    Temperature,
    Humidity,
    Moisture,
}

impl SubsystemId {
    /// Start order: the environment seeds the sensors' current values.
    pub const ALL: [Self; 4] = [
        Self::Environment,
        Self::Temperature,
        Self::Humidity,
        Self::Moisture,
    ];

    /// One-letter record tag.
    pub const fn tag(self) -> char {
        match self {
            Self::Environment => 'E',
            Self::Temperature => 'T',
            Self::Humidity => 'H',
            Self::Moisture => 'M',
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "E" => Some(Self::Environment),
            "T" => Some(Self::Temperature),
            "H" => Some(Self::Humidity),
            "M" => Some(Self::Moisture),
            _ => None,
        }
    }

    /// Position in [`Self::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::Temperature => write!(f, "temperature"),
            Self::Humidity => write!(f, "humidity"),
            Self::Moisture => write!(f, "moisture"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator state
// ---------------------------------------------------------------------------

/// Current device state.  Raising and lowering are mutually exclusive by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Actuator {
    #[default]
    Off,
    Raising,
    Lowering,
}

impl Actuator {
    pub fn is_on(self) -> bool {
        self != Self::Off
    }
}
