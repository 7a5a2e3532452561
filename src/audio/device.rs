//! Engine driving a managed mixer.
//!
//! The mixer owns the decode and output; this engine only keeps the temp
//! file alive, corrects the mixer's position with a seek offset and mirrors
//! the pause flag.

use std::time::Duration;

use crate::library::Track;

use super::backend::Mixer;
use super::clock::DeviceClock;
use super::error::EngineError;
use super::loader::{LoadedAudio, TrackLoader};
use super::types::{Engine, PlaybackState};
use super::volume::Volume;

/// Seeking further than this before the end would leave nothing to play.
const END_MARGIN_SECONDS: f64 = 0.5;

pub struct DeviceEngine {
    mixer: Box<dyn Mixer>,
    loader: Box<dyn TrackLoader>,
    state: PlaybackState,
    clock: DeviceClock,
    volume: Volume,
    active: Option<(Track, LoadedAudio)>,
}

impl DeviceEngine {
    pub fn new(mixer: Box<dyn Mixer>, loader: Box<dyn TrackLoader>, volume: Volume) -> Self {
        let mut engine = Self {
            mixer,
            loader,
            state: PlaybackState::Idle,
            clock: DeviceClock::default(),
            volume,
            active: None,
        };
        engine.mixer.set_gain(volume.gain());
        engine
    }

    fn release(&mut self) {
        if let Some((track, mut loaded)) = self.active.take() {
            if let Err(e) = loaded.audio.release() {
                tracing::warn!(path = %track.path.display(), error = %e, "temp audio not removed");
            }
        }
    }

    fn duration(&self) -> f64 {
        self.active.as_ref().map_or(0.0, |(_, l)| l.duration)
    }
}

impl Engine for DeviceEngine {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        self.stop();
        self.state = PlaybackState::Loading;

        let loaded = match self.loader.load(track) {
            Ok(l) => l,
            Err(e) => {
                self.state = PlaybackState::Idle;
                return Err(EngineError::load(&track.path, e));
            }
        };

        if let Err(e) = self.mixer.load(loaded.audio.path()) {
            // `loaded` drops here, deleting its file.
            self.state = PlaybackState::Stopped;
            return Err(e.into());
        }
        self.active = Some((track.clone(), loaded));
        self.clock.reset();
        self.state = PlaybackState::Stopped;
        Ok(())
    }

    fn play(&mut self, track: &Track) -> Result<(), EngineError> {
        self.load(track)?;
        if let Err(e) = self.mixer.play_from(Duration::ZERO, false) {
            self.mixer.stop();
            self.release();
            self.state = PlaybackState::Stopped;
            return Err(e.into());
        }
        self.state = PlaybackState::Playing;
        tracing::info!(track = %track.display(), "playing");
        Ok(())
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.mixer.pause();
            self.state = PlaybackState::Paused;
        }
    }

    fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.mixer.unpause();
            self.state = PlaybackState::Playing;
        }
    }

    fn stop(&mut self) {
        if self.active.is_none() && !self.state.is_active() {
            return;
        }
        self.mixer.stop();
        self.release();
        self.clock.reset();
        if self.state != PlaybackState::Idle {
            self.state = PlaybackState::Stopped;
        }
    }

    fn seek(&mut self, to_seconds: f64) -> Result<(), EngineError> {
        if !to_seconds.is_finite() || to_seconds < 0.0 {
            return Err(EngineError::SeekOutOfRange(to_seconds));
        }
        if !self.state.is_active() {
            return Err(EngineError::NotActive);
        }

        let target = to_seconds.min((self.duration() - END_MARGIN_SECONDS).max(0.0));
        let was_paused = self.state == PlaybackState::Paused;

        if let Err(e) = self
            .mixer
            .play_from(Duration::from_secs_f64(target), was_paused)
        {
            self.stop();
            return Err(e.into());
        }
        self.clock.seeked(target, self.mixer.position());
        tracing::debug!(target, was_paused, "seeked");
        Ok(())
    }

    fn time(&self) -> f64 {
        if !self.state.is_active() {
            return 0.0;
        }
        self.clock.time(self.mixer.position())
    }

    fn is_playing(&self) -> (bool, bool) {
        (self.state == PlaybackState::Playing, self.mixer.busy())
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn volume(&self) -> Volume {
        self.volume
    }

    fn set_volume(&mut self, volume: Volume) {
        self.volume = volume;
        self.mixer.set_gain(volume.gain());
    }

    fn poll(&mut self) -> Result<(), EngineError> {
        if self.state == PlaybackState::Playing && !self.mixer.busy() {
            tracing::debug!("mixer drained");
            self.stop();
        }
        Ok(())
    }
}

impl Drop for DeviceEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
