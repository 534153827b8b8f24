//! Line-oriented record format used for saving and playing back a run.
//!
//! One line per tick per subsystem, comma separated, no header:
//!
//! ```text
//! E,startTemp,startHumid,startMoist,extTempRate,extHumidRate,extMoistRate,intervalSec
//! T,currentTemp,upper,lower,heatRate,coolRate,furnaceOn,airConOn,intervalSec
//! H,currentHumid,upper,lower,riseRate,humidifierOn,intervalSec
//! M,currentMoist,upper,lower,riseRate,sprinklerOn,intervalSec
//! ```
//!
//! Measured values and rates are written with two decimals; band limits
//! and device flags are written as integers.  Fields are never quoted:
//! every field is numeric or a one-letter tag.
//!
//! Decoding is forward compatible: a line with an unknown tag decodes to
//! `Ok(None)`.  A line with a known tag that fails to parse is an error.

use core::fmt;

use heapless::Vec;

use crate::error::PlaybackFormatError;
use crate::sensors::{
    Actuator, Drift, EnvironmentState, OneWayState, Quantity, SubsystemId, TemperatureState,
};

/// Widest record (`T`) has nine fields including the tag.
const MAX_FIELDS: usize = 9;

// ---------------------------------------------------------------------------
// Snapshot / Record
// ---------------------------------------------------------------------------

/// The full state of one subsystem at one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Snapshot {
    Environment(EnvironmentState),
    Temperature(TemperatureState),
    Humidity(OneWayState),
    Moisture(OneWayState),
}

impl Snapshot {
    pub fn subsystem(&self) -> SubsystemId {
        match self {
            Self::Environment(_) => SubsystemId::Environment,
            Self::Temperature(_) => SubsystemId::Temperature,
            Self::Humidity(_) => SubsystemId::Humidity,
            Self::Moisture(_) => SubsystemId::Moisture,
        }
    }

    /// Display label for the subsystem's device, `None` for the
    /// environment (it has no actuator).
    pub fn device_status(&self) -> Option<&'static str> {
        match self {
            Self::Environment(_) => None,
            Self::Temperature(t) => Some(t.device_status()),
            Self::Humidity(s) | Self::Moisture(s) => Some(s.device_status()),
        }
    }

    /// Headline reading: the sensor value, or the environment's
    /// current temperature.
    pub fn current(&self) -> f64 {
        match self {
            Self::Environment(e) => e.temperature.current,
            Self::Temperature(t) => t.current,
            Self::Humidity(s) | Self::Moisture(s) => s.current,
        }
    }
}

/// One serialised tick: a snapshot plus the refresh interval it ran at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub snapshot: Snapshot,
    pub interval_secs: u64,
}

impl Record {
    pub fn new(snapshot: Snapshot, interval_secs: u64) -> Self {
        Self {
            snapshot,
            interval_secs,
        }
    }

    pub fn subsystem(&self) -> SubsystemId {
        self.snapshot.subsystem()
    }

    /// Serialise without the trailing newline.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parse one line.  `Ok(None)` for lines whose tag is not recognised.
    pub fn decode(line: &str) -> Result<Option<Self>, PlaybackFormatError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(id) = tag_of(line) else {
            return Ok(None);
        };

        let mut fields = Fields::split(line)?;
        let snapshot = match id {
            SubsystemId::Environment => {
                fields.expect_len(8)?;
                let mut temperature = Drift::at_start(fields.float("start temperature")?);
                let mut humidity = Drift::at_start(fields.float("start humidity")?);
                let mut moisture = Drift::at_start(fields.float("start moisture")?);
                temperature.rate = fields.float("temperature rate")?;
                humidity.rate = fields.float("humidity rate")?;
                moisture.rate = fields.float("moisture rate")?;
                Snapshot::Environment(EnvironmentState {
                    temperature,
                    humidity,
                    moisture,
                })
            }
            SubsystemId::Temperature => {
                fields.expect_len(9)?;
                let current = fields.float("current temperature")?;
                let upper = fields.float("upper bound")?;
                let lower = fields.float("lower bound")?;
                let heat_rate = fields.float("heat rate")?;
                let cool_rate = fields.float("cool rate")?;
                let actuator = match (fields.flag("furnace")?, fields.flag("air conditioner")?) {
                    (false, false) => Actuator::Off,
                    (true, false) => Actuator::Raising,
                    (false, true) => Actuator::Lowering,
                    (true, true) => {
                        return Err(PlaybackFormatError::new(
                            "furnace and air conditioner cannot both be on",
                        ));
                    }
                };
                Snapshot::Temperature(TemperatureState {
                    current,
                    upper,
                    lower,
                    heat_rate,
                    cool_rate,
                    actuator,
                })
            }
            SubsystemId::Humidity | SubsystemId::Moisture => {
                fields.expect_len(7)?;
                let quantity = if id == SubsystemId::Humidity {
                    Quantity::Humidity
                } else {
                    Quantity::Moisture
                };
                let state = OneWayState {
                    quantity,
                    current: fields.float("current value")?,
                    upper: fields.float("upper bound")?,
                    lower: fields.float("lower bound")?,
                    rise_rate: fields.float("rise rate")?,
                    device_on: fields.flag("device")?,
                };
                if quantity == Quantity::Humidity {
                    Snapshot::Humidity(state)
                } else {
                    Snapshot::Moisture(state)
                }
            }
        };
        let interval_secs = fields.seconds()?;
        Ok(Some(Self::new(snapshot, interval_secs)))
    }
}

impl Drift {
    fn at_start(start: f64) -> Self {
        Self {
            start,
            current: start,
            rate: 0.0,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.subsystem().tag();
        match &self.snapshot {
            Snapshot::Environment(e) => write!(
                f,
                "{tag},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
                e.temperature.start,
                e.humidity.start,
                e.moisture.start,
                e.temperature.rate,
                e.humidity.rate,
                e.moisture.rate,
            )?,
            Snapshot::Temperature(t) => write!(
                f,
                "{tag},{:.2},{},{},{:.2},{:.2},{},{}",
                t.current,
                bound(t.upper),
                bound(t.lower),
                t.heat_rate,
                t.cool_rate,
                u8::from(t.actuator == Actuator::Raising),
                u8::from(t.actuator == Actuator::Lowering),
            )?,
            Snapshot::Humidity(s) | Snapshot::Moisture(s) => write!(
                f,
                "{tag},{:.2},{},{},{:.2},{}",
                s.current,
                bound(s.upper),
                bound(s.lower),
                s.rise_rate,
                u8::from(s.device_on),
            )?,
        }
        write!(f, ",{}", self.interval_secs)
    }
}

/// Band limits are written truncated toward zero.
fn bound(value: f64) -> i64 {
    value.trunc() as i64
}

/// Subsystem named by a line's leading tag, without parsing the rest.
pub fn tag_of(line: &str) -> Option<SubsystemId> {
    line.split(',').next().and_then(SubsystemId::from_tag)
}

// ---------------------------------------------------------------------------
// Field cursor
// ---------------------------------------------------------------------------

struct Fields<'a> {
    items: Vec<&'a str, MAX_FIELDS>,
    pos: usize,
}

impl<'a> Fields<'a> {
    /// Split a line; the tag is consumed.
    fn split(line: &'a str) -> Result<Self, PlaybackFormatError> {
        let mut items = Vec::new();
        for field in line.split(',') {
            items.push(field.trim()).map_err(|_| {
                PlaybackFormatError::new(format!("more than {MAX_FIELDS} fields"))
            })?;
        }
        Ok(Self { items, pos: 1 })
    }

    fn expect_len(&self, len: usize) -> Result<(), PlaybackFormatError> {
        if self.items.len() == len {
            Ok(())
        } else {
            Err(PlaybackFormatError::new(format!(
                "expected {len} fields, found {}",
                self.items.len()
            )))
        }
    }

    fn next(&mut self) -> &'a str {
        let field = self.items.get(self.pos).copied().unwrap_or("");
        self.pos += 1;
        field
    }

    fn float(&mut self, name: &str) -> Result<f64, PlaybackFormatError> {
        let raw = self.next();
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(PlaybackFormatError::new(format!("{name}: '{raw}' is not a number"))),
        }
    }

    fn flag(&mut self, name: &str) -> Result<bool, PlaybackFormatError> {
        match self.next() {
            "0" => Ok(false),
            "1" => Ok(true),
            raw => Err(PlaybackFormatError::new(format!("{name}: '{raw}' is not 0 or 1"))),
        }
    }

    fn seconds(&mut self) -> Result<u64, PlaybackFormatError> {
        let raw = self.next();
        raw.parse::<u64>().map_err(|_| {
            PlaybackFormatError::new(format!("interval: '{raw}' is not a whole number of seconds"))
        })
    }
}
