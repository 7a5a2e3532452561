//! Playback engines and everything they sit on: decoding to a temporary WAV,
//! output backends, clocks and volume.
//!
//! Two engines implement [`Engine`]. The device engine hands the decoded file
//! to a managed mixer and trusts its position. The streaming engine writes
//! PCM itself from a writer thread and counts samples. Which one runs is a
//! configuration choice made once at startup.

mod backend;
mod clock;
mod device;
mod error;
mod loader;
mod stream;
mod temp;
mod types;
mod volume;

#[cfg(test)]
pub(crate) mod testing;

pub use device::DeviceEngine;
pub use error::{DeviceError, EngineError};
pub use stream::StreamEngine;
pub use types::{Engine, PlaybackState};
pub use volume::Volume;

use backend::{RodioMixer, RodioPcmDevice};
use loader::SymphoniaLoader;

use crate::config::{AudioSettings, EngineKind};

/// Open the default output and build the configured engine.
pub fn build_engine(kind: EngineKind, settings: &AudioSettings) -> Result<Box<dyn Engine>, DeviceError> {
    let loader = Box::new(SymphoniaLoader::new(settings.temp_prefix.clone()));
    let volume = Volume::new(settings.volume);
    tracing::info!(?kind, volume = volume.level(), "opening audio output");

    Ok(match kind {
        EngineKind::Device => Box::new(DeviceEngine::new(
            Box::new(RodioMixer::open()?),
            loader,
            volume,
        )),
        EngineKind::Stream => Box::new(StreamEngine::new(
            Box::new(RodioPcmDevice::open()?),
            loader,
            settings.chunk_bytes,
            volume,
        )),
    })
}

#[cfg(test)]
mod tests;
