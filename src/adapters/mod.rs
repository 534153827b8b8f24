//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements   | Connects to        |
//! |------------|--------------|--------------------|
//! | `log_sink` | DisplayPort  | `log` output       |
//!
//! [`SimulationConfig`](crate::config::SimulationConfig) is the stock
//! [`InputPort`](crate::app::ports::InputPort).

pub mod log_sink;
