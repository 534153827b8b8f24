//! Application core: orchestration, commands, and port traits.
//!
//! Everything the simulator needs from the outside world (starting
//! parameters, somewhere to show state) comes through the traits in
//! [`ports`], so the core runs the same under a UI, the CLI, or a test.

pub mod commands;
pub mod ports;
pub mod service;
