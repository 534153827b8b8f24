//! Per-loop run gate: pause, resume, shutdown, and the refresh interval.
//!
//! A worker loop only ever suspends at its tick boundary:
//!
//! ```text
//!   tick ──▶ sleep(interval) ──▶ checkpoint ──▶ tick ...
//!                 │                   │
//!                 │ ends early only   │ blocks while paused,
//!                 │ on shutdown       │ released by resume/shutdown
//! ```
//!
//! Pausing never cuts a sleep short.  A resume that arrives while the loop
//! is still sleeping just leaves the gate open, so the loop finishes its
//! sleep and carries on without skipping or repeating a tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// What a loop should do after a suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug)]
struct GateState {
    running: bool,
    shutdown: bool,
}

/// Shared between one worker loop and the orchestrator.
#[derive(Debug)]
pub struct LoopControl {
    state: Mutex<GateState>,
    cv: Condvar,
    interval_ms: AtomicU64,
}

impl LoopControl {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: Mutex::new(GateState {
                running: true,
                shutdown: false,
            }),
            cv: Condvar::new(),
            interval_ms: AtomicU64::new(millis(interval)),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Relaxed))
    }

    /// Takes effect from the next sleep.
    pub fn set_interval(&self, interval: Duration) {
        self.interval_ms.store(millis(interval), Ordering::Relaxed);
    }

    /// Park the loop at its next tick boundary.
    pub fn pause(&self) {
        self.state.lock().running = false;
    }

    /// Release a parked loop.  Harmless if the loop was never paused.
    pub fn resume(&self) {
        self.state.lock().running = true;
        self.cv.notify_one();
    }

    /// Ask the loop to exit at its next suspension point, interrupting
    /// any sleep or pause wait in progress.
    pub fn shutdown(&self) {
        self.state.lock().shutdown = true;
        self.cv.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        !self.state.lock().running
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shutdown
    }

    /// Sleep for `duration`.  Only a shutdown ends it early.
    ///
    /// A duration too long to represent as a deadline waits for shutdown.
    pub fn sleep(&self, duration: Duration) -> Flow {
        let deadline = Instant::now().checked_add(duration);
        let mut state = self.state.lock();
        while !state.shutdown {
            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Flow::Continue;
                    }
                    // Resume wakes us too; the deadline check sends us back to sleep.
                    let _ = self.cv.wait_until(&mut state, deadline);
                }
                None => self.cv.wait(&mut state),
            }
        }
        Flow::Stop
    }

    /// Block while paused.
    pub fn checkpoint(&self) -> Flow {
        let mut state = self.state.lock();
        while !state.running && !state.shutdown {
            self.cv.wait(&mut state);
        }
        if state.shutdown { Flow::Stop } else { Flow::Continue }
    }

    /// End-of-tick suspension: sleep, then honour a pending pause.
    pub fn pace(&self, duration: Duration) -> Flow {
        match self.sleep(duration) {
            Flow::Continue => self.checkpoint(),
            Flow::Stop => Flow::Stop,
        }
    }
}
