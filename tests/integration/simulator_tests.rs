//! Integration tests: Simulator lifecycle, pause/resume, and saving.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use greenhouse::app::commands::SimCommand;
use greenhouse::app::service::Simulator;
use greenhouse::config::OneWaySettings;
use greenhouse::controllers::{Controller, OneWayController};
use greenhouse::error::{LifecycleError, SimError};
use greenhouse::lifecycle::{RecordingMode, SimState};
use greenhouse::record::Record;
use greenhouse::recording::RecordWriter;
use greenhouse::sensors::{OneWayModel, Quantity, SubsystemId, shared};

use crate::mock_ports::{CaptureDisplay, FlakyInput, fast_config};

fn humidity_below_band(interval_ms: u64) -> OneWaySettings {
    OneWaySettings {
        upper: 95.0,
        lower: 90.0,
        rise_rate: 1.0,
        refresh_interval_ms: interval_ms,
    }
}

// ── Setup ─────────────────────────────────────────────────────

#[test]
fn unreadable_input_blocks_start_and_is_reported() {
    let display = Arc::new(CaptureDisplay::default());
    let mut sim = Simulator::new(display.clone());
    let input = FlakyInput {
        config: fast_config(50),
        unreadable: Some(SubsystemId::Humidity),
    };

    match sim.setup(&input) {
        Err(SimError::Setup(failures)) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, SubsystemId::Humidity);
        }
        other => panic!("expected setup failure, got {other:?}"),
    }
    assert_eq!(display.errors_for(SubsystemId::Humidity).len(), 1);
    assert!(matches!(
        sim.handle_command(SimCommand::Start),
        Err(SimError::Lifecycle(LifecycleError::NotReady))
    ));
    assert_eq!(display.count(), 0, "no loop may run after a failed setup");
}

#[test]
fn every_failing_subsystem_is_reported() {
    let display = Arc::new(CaptureDisplay::default());
    let mut sim = Simulator::new(display.clone());
    let mut config = fast_config(50);
    config.environment.start_temperature = 301.0;
    config.humidity.rise_rate = 0.0;
    config.moisture.rise_rate = -2.0;

    let Err(SimError::Setup(failures)) = sim.setup(&config) else {
        panic!("setup should fail");
    };
    let ids: Vec<_> = failures.iter().map(|(id, _)| *id).collect();
    assert_eq!(
        ids,
        vec![
            SubsystemId::Environment,
            SubsystemId::Humidity,
            SubsystemId::Moisture
        ]
    );
    let message = display.errors_for(SubsystemId::Environment).join("");
    assert!(message.contains("300"), "{message}");
}

// ── Pause / resume ────────────────────────────────────────────

/// Pausing and resuming during a sleep neither shortens that sleep nor
/// skips or repeats a tick.
#[test]
fn pause_and_resume_mid_sleep() {
    let model = shared(OneWayModel::humidity());
    model.lock().set_current(30.0).unwrap();
    let display = Arc::new(CaptureDisplay::default());
    let mut controller = OneWayController::new(model, display.clone());
    let mut config = fast_config(200);
    config.humidity = humidity_below_band(200);
    controller.setup(&config).unwrap();

    let control = controller.control();
    let worker = thread::spawn(move || controller.run());

    assert!(display.wait_for(SubsystemId::Humidity, 1, Duration::from_secs(2)));
    thread::sleep(Duration::from_millis(50));
    control.pause();
    thread::sleep(Duration::from_millis(50));
    control.resume();
    assert!(display.wait_for(SubsystemId::Humidity, 3, Duration::from_secs(3)));
    control.shutdown();
    worker.join().unwrap();

    let records = display.records_for(SubsystemId::Humidity);
    for pair in records.windows(2) {
        assert_eq!(pair[1].snapshot.current() - pair[0].snapshot.current(), 1.0);
    }
    let times = display.times_for(SubsystemId::Humidity);
    assert!(times[1] - times[0] >= Duration::from_millis(190));
}

#[test]
fn paused_simulator_stops_ticking_until_resumed() {
    let display = Arc::new(CaptureDisplay::default());
    let mut sim = Simulator::new(display.clone());
    sim.setup(&fast_config(10)).unwrap();
    sim.start().unwrap();
    assert!(display.wait_for(SubsystemId::Moisture, 2, Duration::from_secs(2)));

    sim.pause().unwrap();
    assert_eq!(sim.state(), SimState::Paused);
    thread::sleep(Duration::from_millis(80));
    let parked = display.count();
    thread::sleep(Duration::from_millis(120));
    assert_eq!(display.count(), parked);

    sim.resume().unwrap();
    sim.resume().unwrap();
    let resumed = display.records_for(SubsystemId::Moisture).len();
    assert!(display.wait_for(SubsystemId::Moisture, resumed + 2, Duration::from_secs(2)));
    sim.close();
    assert!(sim.finished());
}

#[test]
fn close_interrupts_long_sleeps() {
    let display = Arc::new(CaptureDisplay::default());
    let mut sim = Simulator::new(display.clone());
    sim.setup(&fast_config(60_000)).unwrap();
    sim.start().unwrap();
    assert!(display.wait_for(SubsystemId::Temperature, 1, Duration::from_secs(2)));
    sim.pause().unwrap();

    let started = Instant::now();
    sim.handle_command(SimCommand::Close).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(sim.state(), SimState::Closed);
    assert!(sim.start().is_err());
}

// ── Live settings ─────────────────────────────────────────────

#[test]
fn settings_change_while_running() {
    let display = Arc::new(CaptureDisplay::default());
    let mut sim = Simulator::new(display.clone());
    let mut config = fast_config(10);
    config.humidity = humidity_below_band(10);
    config.environment.humidity_rate = 0.0;
    config.environment.start_humidity = 10.0;
    sim.setup(&config).unwrap();
    sim.start().unwrap();

    sim.handle_command(SimCommand::SetRiseRate {
        subsystem: SubsystemId::Humidity,
        rate: 0.0,
    })
    .unwrap_err();
    sim.handle_command(SimCommand::SetBand {
        subsystem: SubsystemId::Humidity,
        upper: 20.0,
        lower: 5.0,
    })
    .unwrap();
    sim.handle_command(SimCommand::SetExternalRate {
        quantity: Quantity::Moisture,
        rate: 0.0,
    })
    .unwrap();
    sim.handle_command(SimCommand::SetRefreshInterval {
        subsystem: SubsystemId::Temperature,
        interval: Duration::from_millis(20),
    })
    .unwrap();

    let shown = display.records_for(SubsystemId::Humidity).len();
    assert!(display.wait_for(SubsystemId::Humidity, shown + 3, Duration::from_secs(2)));
    sim.close();

    let last = display.records_for(SubsystemId::Humidity);
    let last = last.last().unwrap();
    assert_eq!(last.snapshot.device_status(), Some("Off"));
}

// ── Saving ────────────────────────────────────────────────────

#[test]
fn saved_file_holds_every_displayed_tick() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let display = Arc::new(CaptureDisplay::default());
    let mut sim = Simulator::new(display.clone());
    sim.save_to(&path).unwrap();
    assert_eq!(sim.mode(), RecordingMode::Saving);
    sim.setup(&fast_config(5)).unwrap();
    sim.start().unwrap();
    for id in SubsystemId::ALL {
        assert!(display.wait_for(id, 3, Duration::from_secs(2)));
    }
    sim.close();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), display.count());
    for line in &lines {
        assert!(Record::decode(line).unwrap().is_some(), "bad line {line:?}");
    }
    for tag in ['E', 'T', 'H', 'M'] {
        assert!(lines.iter().any(|l| l.starts_with(tag)), "no {tag} lines");
    }
}

/// Two writers appending at the same moment still produce whole lines.
#[test]
fn concurrent_appends_never_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.log");
    let display = Arc::new(CaptureDisplay::default());
    let mut writer = RecordWriter::create(&path, display.clone()).unwrap();

    let humid = Record::decode("H,55.00,70,30,2.50,1,3").unwrap().unwrap();
    let moist = Record::decode("M,12.25,60,20,1.00,0,1").unwrap().unwrap();
    let workers: Vec<_> = [humid, moist]
        .into_iter()
        .map(|record| {
            let sink = writer.sink().unwrap();
            thread::spawn(move || {
                for _ in 0..500 {
                    sink.append(record).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    writer.close();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 1000);
    assert_eq!(lines.iter().filter(|l| **l == "H,55.00,70,30,2.50,1,3").count(), 500);
    assert_eq!(lines.iter().filter(|l| **l == "M,12.25,60,20,1.00,0,1").count(), 500);
    assert!(display.errors.lock().is_empty());
}

#[test]
fn save_and_playback_are_exclusive() {
    let dir = tempfile::tempdir().unwrap();
    let saved = dir.path().join("saved.log");
    std::fs::write(&saved, "").unwrap();

    let mut sim = Simulator::new(Arc::new(CaptureDisplay::default()));
    sim.save_to(&saved).unwrap();
    assert!(matches!(
        sim.open_playback(&saved),
        Err(SimError::Lifecycle(LifecycleError::ModeConflict(_)))
    ));

    let mut sim = Simulator::new(Arc::new(CaptureDisplay::default()));
    sim.open_playback(&saved).unwrap();
    assert!(matches!(
        sim.handle_command(SimCommand::SaveTo(saved.clone())),
        Err(SimError::Lifecycle(LifecycleError::ModeConflict(_)))
    ));
    assert_eq!(sim.mode(), RecordingMode::Playback);
}

#[test]
fn save_file_must_be_chosen_before_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = Simulator::new(Arc::new(CaptureDisplay::default()));
    sim.setup(&fast_config(50)).unwrap();
    sim.start().unwrap();
    assert!(sim.save_to(dir.path().join("late.log")).is_err());
    sim.close();
}
