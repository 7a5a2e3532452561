use std::thread;
use std::time::{Duration, Instant};

use approx::assert_relative_eq;

use super::testing::{FAKE_SAMPLE, FakeLoader, FakeMixer, FakePcmDevice, track};
use super::*;

fn device_engine() -> (DeviceEngine, FakeMixer, FakeLoader) {
    let mixer = FakeMixer::default();
    let loader = FakeLoader::default();
    let engine = DeviceEngine::new(
        Box::new(mixer.clone()),
        Box::new(loader.clone()),
        Volume::MAX,
    );
    (engine, mixer, loader)
}

fn stream_engine(device: FakePcmDevice, chunk: usize) -> (StreamEngine, FakeLoader) {
    let loader = FakeLoader::default();
    let engine = StreamEngine::new(
        Box::new(device),
        Box::new(loader.clone()),
        chunk,
        Volume::MAX,
    );
    (engine, loader)
}

fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn device_play_reports_mixer_position_and_stop_releases() {
    let (mut engine, mixer, loader) = device_engine();
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(engine.time(), 0.0);

    engine.play(&track("a", 3.0)).unwrap();
    assert_eq!(engine.state(), PlaybackState::Playing);
    assert_eq!(engine.is_playing(), (true, true));

    let temp = loader.created()[0].clone();
    assert!(temp.exists());

    mixer.set_position(Duration::from_millis(1500));
    assert_relative_eq!(engine.time(), 1.5, epsilon = 1e-9);

    engine.stop();
    assert_eq!(engine.state(), PlaybackState::Stopped);
    assert_eq!(engine.time(), 0.0);
    assert!(!temp.exists());
}

#[test]
fn loading_a_new_track_releases_the_previous_one() {
    let (mut engine, _mixer, loader) = device_engine();
    engine.play(&track("a", 2.0)).unwrap();
    engine.play(&track("b", 2.0)).unwrap();

    let created = loader.created();
    assert_eq!(created.len(), 2);
    assert!(!created[0].exists());
    assert!(created[1].exists());
}

#[test]
fn failed_load_returns_to_idle_without_temp_files() {
    let (mut engine, _mixer, loader) = device_engine();
    let err = engine.play(&track("broken", 2.0)).unwrap_err();
    assert!(matches!(err, EngineError::TrackLoad { .. }));
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(loader.created().is_empty());
}

#[test]
fn seek_past_the_end_clamps_and_keeps_pause() {
    let (mut engine, mixer, _loader) = device_engine();
    engine.play(&track("long", 180.0)).unwrap();
    engine.pause();
    assert_eq!(mixer.state.lock().unwrap().audible_starts, 1);

    engine.seek(200.0).unwrap();
    {
        let s = mixer.state.lock().unwrap();
        assert_eq!(s.starts.last(), Some(&Duration::from_secs_f64(179.5)));
        assert!(s.paused);
        // The restarted output never sounded.
        assert_eq!(s.audible_starts, 1);
    }
    assert_eq!(engine.state(), PlaybackState::Paused);
    assert_relative_eq!(engine.time(), 179.5, epsilon = 1e-9);

    engine.resume();
    assert_eq!(mixer.state.lock().unwrap().audible_starts, 2);
    mixer.set_position(Duration::from_millis(250));
    assert_relative_eq!(engine.time(), 179.75, epsilon = 1e-9);
}

#[test]
fn seek_rejects_negative_targets_and_inactive_engines() {
    let (mut engine, _mixer, _loader) = device_engine();
    assert!(matches!(engine.seek(3.0), Err(EngineError::NotActive)));

    engine.play(&track("a", 10.0)).unwrap();
    assert!(matches!(
        engine.seek(-1.0),
        Err(EngineError::SeekOutOfRange(_))
    ));
    engine.seek(4.0).unwrap();
    assert_relative_eq!(engine.time(), 4.0, epsilon = 1e-9);
}

#[test]
fn rejected_seek_leaves_position_and_state_alone() {
    let (mut engine, mixer, _loader) = device_engine();
    engine.play(&track("a", 10.0)).unwrap();
    mixer.set_position(Duration::from_secs(7));
    let starts = mixer.state.lock().unwrap().starts.len();

    assert!(engine.seek(-0.5).is_err());
    assert!(engine.seek(f64::NAN).is_err());

    assert_relative_eq!(engine.time(), 7.0, epsilon = 1e-9);
    assert_eq!(engine.state(), PlaybackState::Playing);
    assert_eq!(mixer.state.lock().unwrap().starts.len(), starts);

    engine.pause();
    assert!(engine.seek(-3.0).is_err());
    assert_eq!(engine.state(), PlaybackState::Paused);
    assert_relative_eq!(engine.time(), 7.0, epsilon = 1e-9);
}

#[test]
fn natural_end_is_reaped_by_poll() {
    let (mut engine, mixer, loader) = device_engine();
    engine.play(&track("a", 1.0)).unwrap();
    engine.poll().unwrap();
    assert_eq!(engine.state(), PlaybackState::Playing);

    mixer.finish();
    assert_eq!(engine.is_playing(), (true, false));
    engine.poll().unwrap();
    assert_eq!(engine.state(), PlaybackState::Stopped);
    assert!(!loader.created()[0].exists());
}

#[test]
fn paused_output_is_not_reaped() {
    let (mut engine, _mixer, _loader) = device_engine();
    engine.play(&track("a", 1.0)).unwrap();
    engine.pause();
    engine.poll().unwrap();
    assert_eq!(engine.state(), PlaybackState::Paused);
    assert!(!engine.is_playing().0);
}

#[test]
fn rejected_output_releases_the_decoded_file() {
    let (mut engine, mixer, loader) = device_engine();
    mixer.state.lock().unwrap().fail_play = true;

    let err = engine.play(&track("a", 1.0)).unwrap_err();
    assert!(matches!(err, EngineError::Device(_)));
    assert_eq!(engine.state(), PlaybackState::Stopped);
    assert!(!loader.created()[0].exists());
}

#[test]
fn volume_changes_saturate_and_reach_the_mixer() {
    let (mut engine, mixer, _loader) = device_engine();
    assert_eq!(engine.change_volume(10), Volume::MAX);
    assert_eq!(engine.change_volume(-35).level(), 65);
    assert!((mixer.state.lock().unwrap().gain - 0.65).abs() < 1e-6);
    assert_eq!(engine.change_volume(-1000), Volume::MIN);
}

#[test]
fn stream_writes_every_sample_and_counts_time() {
    let device = FakePcmDevice::default();
    let (mut engine, loader) = stream_engine(device.clone(), 64);

    engine.play(&track("a", 1.0)).unwrap();
    wait_until(|| !engine.is_playing().1);

    assert_eq!(engine.state(), PlaybackState::Playing);
    assert_relative_eq!(engine.time(), 1.0, epsilon = 1e-9);
    let samples = device.samples();
    assert_eq!(samples.len(), 200);
    assert!(samples.iter().all(|s| *s == FAKE_SAMPLE));

    engine.poll().unwrap();
    assert_eq!(engine.state(), PlaybackState::Stopped);
    assert_eq!(engine.time(), 0.0);
    assert!(!loader.created()[0].exists());
    assert!(device.stopped.load(std::sync::atomic::Ordering::Acquire));
}

#[test]
fn stream_scales_by_current_volume() {
    let device = FakePcmDevice::default();
    let (mut engine, _loader) = stream_engine(device.clone(), 64);
    engine.set_volume(Volume::new(50));

    engine.play(&track("a", 0.5)).unwrap();
    wait_until(|| !engine.is_playing().1);

    let samples = device.samples();
    assert_eq!(samples.len(), 100);
    assert!(samples.iter().all(|s| *s == FAKE_SAMPLE / 2));
}

#[test]
fn stream_pause_holds_the_writer_and_stop_joins_it() {
    let device = FakePcmDevice {
        write_delay: Duration::from_millis(2),
        ..Default::default()
    };
    let (mut engine, loader) = stream_engine(device.clone(), 64);
    engine.play(&track("a", 60.0)).unwrap();
    wait_until(|| !device.written.lock().unwrap().is_empty());

    engine.pause();
    assert_eq!(engine.state(), PlaybackState::Paused);
    // Let any in-flight chunk land.
    thread::sleep(Duration::from_millis(30));
    let held = device.written.lock().unwrap().len();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(device.written.lock().unwrap().len(), held);
    assert_eq!(engine.is_playing(), (false, true));

    engine.resume();
    wait_until(|| device.written.lock().unwrap().len() > held);

    engine.stop();
    assert_eq!(engine.state(), PlaybackState::Stopped);
    assert_eq!(engine.is_playing(), (false, false));
    assert!(!loader.created()[0].exists());
}

#[test]
fn stream_cannot_seek() {
    let (mut engine, _loader) = stream_engine(FakePcmDevice::default(), 64);
    assert!(matches!(
        engine.seek(-2.0),
        Err(EngineError::SeekOutOfRange(_))
    ));
    assert!(matches!(engine.seek(2.0), Err(EngineError::SeekUnsupported)));
}

#[test]
fn stream_device_refusal_releases_the_decoded_file() {
    let device = FakePcmDevice {
        fail_open: true,
        ..Default::default()
    };
    let (mut engine, loader) = stream_engine(device, 64);
    let err = engine.play(&track("a", 1.0)).unwrap_err();
    assert!(matches!(err, EngineError::Device(DeviceError::Open(_))));
    assert_eq!(engine.state(), PlaybackState::Stopped);
    assert!(!loader.created()[0].exists());
}

#[test]
fn stream_write_failure_surfaces_on_poll() {
    let device = FakePcmDevice {
        fail_writes: true,
        ..Default::default()
    };
    let (mut engine, _loader) = stream_engine(device, 64);
    engine.play(&track("a", 1.0)).unwrap();
    wait_until(|| !engine.is_playing().1);

    let err = engine.poll().unwrap_err();
    assert!(matches!(err, EngineError::Device(DeviceError::Rejected(_))));
    assert_eq!(engine.state(), PlaybackState::Stopped);
}

#[test]
fn dropping_an_engine_cleans_up() {
    let device = FakePcmDevice {
        write_delay: Duration::from_millis(2),
        ..Default::default()
    };
    let (mut engine, loader) = stream_engine(device, 64);
    engine.play(&track("a", 30.0)).unwrap();
    drop(engine);
    assert!(!loader.created()[0].exists());
}
