//! Integration tests: replaying saved runs.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use greenhouse::app::service::Simulator;
use greenhouse::error::{LifecycleError, SimError};
use greenhouse::lifecycle::RecordingMode;
use greenhouse::record::Snapshot;
use greenhouse::sensors::SubsystemId;

use crate::mock_ports::{CaptureDisplay, FlakyInput, fast_config};

fn wait_finished(sim: &Simulator, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if sim.finished() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn playback_shows_recorded_line_and_waits_its_interval() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("play.log");
    std::fs::write(&path, "H,55.00,70,30,2.50,1,3\nH,56.00,70,30,2.50,1,3\n").unwrap();

    let display = Arc::new(CaptureDisplay::default());
    let mut sim = Simulator::new(display.clone());
    sim.open_playback(&path).unwrap();
    sim.setup(&fast_config(0)).unwrap();
    sim.start().unwrap();

    assert!(display.wait_for(SubsystemId::Humidity, 1, Duration::from_secs(2)));
    let first = display.records_for(SubsystemId::Humidity)[0];
    let Snapshot::Humidity(state) = first.snapshot else {
        panic!("expected humidity, got {:?}", first.snapshot);
    };
    assert_eq!(state.current, 55.0);
    assert_eq!((state.lower, state.upper), (30.0, 70.0));
    assert_eq!(state.rise_rate, 2.5);
    assert_eq!(first.snapshot.device_status(), Some("On"));
    assert_eq!(first.interval_secs, 3);

    // Still inside the recorded three-second wait.
    thread::sleep(Duration::from_millis(300));
    assert_eq!(display.records_for(SubsystemId::Humidity).len(), 1);

    let started = Instant::now();
    sim.close();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(display.records_for(SubsystemId::Temperature).is_empty());
}

#[test]
fn saved_run_plays_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");

    let recorded = Arc::new(CaptureDisplay::default());
    {
        let mut sim = Simulator::new(recorded.clone());
        sim.save_to(&path).unwrap();
        sim.setup(&fast_config(5)).unwrap();
        sim.start().unwrap();
        for id in SubsystemId::ALL {
            assert!(recorded.wait_for(id, 4, Duration::from_secs(2)));
        }
        // Dropping closes the run and the file.
    }

    let replayed = Arc::new(CaptureDisplay::default());
    let mut sim = Simulator::new(replayed.clone());
    sim.open_playback(&path).unwrap();
    sim.start().unwrap();
    assert!(wait_finished(&sim, Duration::from_secs(5)));

    for id in SubsystemId::ALL {
        let before: Vec<_> = recorded
            .records_for(id)
            .iter()
            .map(|r| r.encode())
            .collect();
        let after: Vec<_> = replayed
            .records_for(id)
            .iter()
            .map(|r| r.encode())
            .collect();
        assert_eq!(before, after, "{id} differs after playback");
    }
    assert!(replayed.errors.lock().is_empty());
}

#[test]
fn bad_line_ends_only_that_subsystems_playback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.log");
    std::fs::write(
        &path,
        "M,40.00,60,20,1.00,0,0\n\
         T,20.00,22,18,2.00,3.00,0,0,0\n\
         M,forty,60,20,1.00,0,0\n\
         Q,from,a,newer,version\n\
         T,21.00,22,18,2.00,3.00,0,0,0\n\
         M,41.00,60,20,1.00,0,0\n",
    )
    .unwrap();

    let display = Arc::new(CaptureDisplay::default());
    let mut sim = Simulator::new(display.clone());
    sim.open_playback(&path).unwrap();
    sim.start().unwrap();
    assert!(wait_finished(&sim, Duration::from_secs(5)));

    assert_eq!(display.records_for(SubsystemId::Moisture).len(), 1);
    assert_eq!(display.records_for(SubsystemId::Temperature).len(), 2);
    let errors = display.errors_for(SubsystemId::Moisture);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("line 3"), "{}", errors[0]);
    assert!(display.errors_for(SubsystemId::Temperature).is_empty());
}

#[test]
fn missing_playback_file_leaves_mode_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = Simulator::new(Arc::new(CaptureDisplay::default()));
    let err = sim.open_playback(dir.path().join("absent.log")).unwrap_err();
    assert!(matches!(err, SimError::Io { .. }), "{err}");
    assert_eq!(sim.mode(), RecordingMode::Live);
}

#[test]
fn playback_ignores_inputs_and_refuses_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("play.log");
    std::fs::write(&path, "E,20.00,50.00,45.00,-1.00,0.00,2.00,0\n").unwrap();

    let mut sim = Simulator::new(Arc::new(CaptureDisplay::default()));
    sim.open_playback(&path).unwrap();
    let unreadable = FlakyInput {
        config: fast_config(0),
        unreadable: Some(SubsystemId::Temperature),
    };
    sim.setup(&unreadable).unwrap();
    assert!(matches!(
        sim.set_cool_rate(2.0),
        Err(SimError::Lifecycle(LifecycleError::PlaybackReadOnly))
    ));
    sim.start().unwrap();
    assert!(wait_finished(&sim, Duration::from_secs(5)));
    sim.close();
}
