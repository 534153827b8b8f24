//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the simulator through its
//! public API against mock ports.  Timing-sensitive tests use short
//! refresh intervals and generous bounds.

mod mock_ports;
mod playback_tests;
mod simulator_tests;
