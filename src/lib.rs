//! Greenhouse life-support simulator.
//!
//! Four independently looping subsystems (external environment,
//! temperature, humidity, soil moisture) on their own threads, with
//! optional recording of every tick to a shared file and deterministic
//! playback from it.  All UI concerns sit behind the port traits in
//! [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod controllers;
pub mod error;
pub mod lifecycle;
pub mod record;
pub mod recording;
pub mod sensors;

pub use app::commands::SimCommand;
pub use app::service::Simulator;
pub use config::SimulationConfig;
pub use error::{Result, SimError};
