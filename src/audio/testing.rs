//! In-memory stand-ins for the audio backends, shared by the audio and
//! queue tests.

use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::library::{ContainerFormat, Track};

use super::backend::{Mixer, PcmDevice, PcmOutput};
use super::error::{DeviceError, LoadError};
use super::loader::{LoadedAudio, TrackLoader};
use super::temp::TempAudio;
use super::types::PcmSpec;

pub const FAKE_RATE: u32 = 100;
pub const FAKE_SAMPLE: i16 = 1000;

pub fn track(name: &str, duration: f64) -> Track {
    let mut t = Track::untagged(format!("/music/{name}.flac"), ContainerFormat::Flac);
    t.title = name.to_string();
    t.artist = "Tester".to_string();
    t.duration = duration;
    t
}

/// Writes `track.duration` seconds of constant stereo PCM at [`FAKE_RATE`].
/// Paths containing "broken" fail to load.
#[derive(Clone, Default)]
pub struct FakeLoader {
    pub created: Arc<Mutex<Vec<PathBuf>>>,
}

impl TrackLoader for FakeLoader {
    fn load(&self, track: &Track) -> Result<LoadedAudio, LoadError> {
        if track.path.to_string_lossy().contains("broken") {
            return Err(LoadError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            )));
        }
        let spec = PcmSpec {
            sample_rate: FAKE_RATE,
            channels: 2,
        };
        let mut audio = TempAudio::create("segue-test_")?;
        let frames = (track.duration * FAKE_RATE as f64).round() as u64;
        {
            let file = audio.as_file_mut().ok_or(LoadError::NoAudioTrack)?;
            let mut w = hound::WavWriter::new(
                BufWriter::new(file),
                hound::WavSpec {
                    channels: 2,
                    sample_rate: FAKE_RATE,
                    bits_per_sample: 16,
                    sample_format: hound::SampleFormat::Int,
                },
            )?;
            for _ in 0..frames * 2 {
                w.write_sample(FAKE_SAMPLE)?;
            }
            w.finalize()?;
        }
        self.created.lock().unwrap().push(audio.path().to_path_buf());
        Ok(LoadedAudio {
            audio,
            spec,
            duration: frames as f64 / FAKE_RATE as f64,
        })
    }
}

impl FakeLoader {
    pub fn created(&self) -> Vec<PathBuf> {
        self.created.lock().unwrap().clone()
    }
}

#[derive(Debug, Default)]
pub struct MixerState {
    pub loaded: Option<PathBuf>,
    pub playing: bool,
    pub paused: bool,
    pub position: Duration,
    pub starts: Vec<Duration>,
    /// Times output went from silent to audible.
    pub audible_starts: u32,
    pub gain: f32,
    pub fail_play: bool,
}

/// Mixer whose position and completion are driven by the test.
#[derive(Clone, Default)]
pub struct FakeMixer {
    pub state: Arc<Mutex<MixerState>>,
}

impl FakeMixer {
    pub fn set_position(&self, position: Duration) {
        self.state.lock().unwrap().position = position;
    }

    /// Simulate the output running dry.
    pub fn finish(&self) {
        let mut s = self.state.lock().unwrap();
        s.playing = false;
        s.paused = false;
    }
}

impl Mixer for FakeMixer {
    fn load(&mut self, path: &Path) -> Result<(), DeviceError> {
        let mut s = self.state.lock().unwrap();
        s.loaded = Some(path.to_path_buf());
        s.playing = false;
        Ok(())
    }

    fn play_from(&mut self, start: Duration, paused: bool) -> Result<(), DeviceError> {
        let mut s = self.state.lock().unwrap();
        if s.fail_play {
            return Err(DeviceError::Rejected("fake".into()));
        }
        s.starts.push(start);
        s.position = Duration::ZERO;
        s.playing = true;
        s.paused = paused;
        if !paused {
            s.audible_starts += 1;
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().paused = true;
    }

    fn unpause(&mut self) {
        let mut s = self.state.lock().unwrap();
        if s.paused && s.playing {
            s.audible_starts += 1;
        }
        s.paused = false;
    }

    fn stop(&mut self) {
        let mut s = self.state.lock().unwrap();
        s.loaded = None;
        s.playing = false;
        s.paused = false;
        s.position = Duration::ZERO;
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn busy(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn set_gain(&mut self, gain: f32) {
        self.state.lock().unwrap().gain = gain;
    }
}

/// Captures written PCM. `write_delay` keeps the writer alive long enough
/// for tests to observe it mid-stream.
#[derive(Clone, Default)]
pub struct FakePcmDevice {
    pub written: Arc<Mutex<Vec<u8>>>,
    pub stopped: Arc<AtomicBool>,
    pub fail_open: bool,
    pub fail_writes: bool,
    pub write_delay: Duration,
}

impl FakePcmDevice {
    pub fn samples(&self) -> Vec<i16> {
        self.written
            .lock()
            .unwrap()
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }
}

impl PcmDevice for FakePcmDevice {
    fn open(&mut self, _spec: PcmSpec) -> Result<Box<dyn PcmOutput>, DeviceError> {
        if self.fail_open {
            return Err(DeviceError::Open("fake".into()));
        }
        Ok(Box::new(FakePcmOutput {
            device: self.clone(),
        }))
    }
}

struct FakePcmOutput {
    device: FakePcmDevice,
}

impl PcmOutput for FakePcmOutput {
    fn write(&mut self, bytes: &[u8]) -> Result<(), DeviceError> {
        if self.device.fail_writes {
            return Err(DeviceError::Rejected("fake".into()));
        }
        if !self.device.write_delay.is_zero() {
            thread::sleep(self.device.write_delay);
        }
        self.device.written.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }

    fn pending(&self) -> bool {
        false
    }

    fn set_paused(&mut self, _paused: bool) {}

    fn stop(&mut self) {
        self.device.stopped.store(true, Ordering::Release);
    }
}
