//! Audio-related small types.
//!
//! This module defines the engine state, the PCM layout handed from the
//! loader to the output, and the capability set both engines implement.

use crate::library::Track;

use super::error::EngineError;
use super::volume::Volume;

/// Lifecycle of the active track inside an engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing has been loaded, or the last load failed.
    #[default]
    Idle,
    /// Decoding/converting the requested track.
    Loading,
    Playing,
    Paused,
    /// Stopped by request or by reaching the end of the stream.
    Stopped,
}

impl PlaybackState {
    /// Whether a track is loaded into the output (playing or paused).
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

/// Layout of the decoded intermediate audio: always signed 16-bit little-endian.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PcmSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmSpec {
    pub const BYTES_PER_SAMPLE: usize = 2;

    /// Interleaved samples per second of audio.
    pub fn samples_per_second(&self) -> u64 {
        self.sample_rate as u64 * self.channels as u64
    }

    /// Seconds represented by `samples` interleaved samples.
    pub fn seconds_for_samples(&self, samples: u64) -> f64 {
        let per_sec = self.samples_per_second();
        if per_sec == 0 {
            return 0.0;
        }
        samples as f64 / per_sec as f64
    }
}

/// What the navigator and the UI may ask of a playback engine.
///
/// Both engines implement the same capability set; callers pick one at
/// construction time and never look behind the trait.
pub trait Engine {
    /// Stop whatever is active, then decode `track` so it is ready to start.
    fn load(&mut self, track: &Track) -> Result<(), EngineError>;

    /// Load `track` and start it from the beginning.
    fn play(&mut self, track: &Track) -> Result<(), EngineError>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Stop output and release the temporary audio. Safe to call at any time.
    fn stop(&mut self);

    /// Restart output at `to_seconds`, keeping the paused state.
    fn seek(&mut self, to_seconds: f64) -> Result<(), EngineError>;

    /// Current position in the active track, in seconds. Never negative;
    /// 0 when nothing is active.
    fn time(&self) -> f64;

    /// `(engine belief, backend busy)`; these agree except around transitions.
    fn is_playing(&self) -> (bool, bool);

    fn state(&self) -> PlaybackState;

    fn volume(&self) -> Volume;

    fn set_volume(&mut self, volume: Volume);

    /// Reap a natural end of stream and surface output failures. Called once
    /// per polling tick.
    fn poll(&mut self) -> Result<(), EngineError>;

    /// Stop and release everything the engine holds.
    fn shutdown(&mut self) {
        self.stop();
    }

    /// Adjust the volume by `delta`, saturating at the bounds.
    fn change_volume(&mut self, delta: i32) -> Volume {
        let v = self.volume().adjusted(delta);
        self.set_volume(v);
        v
    }
}
