use std::path::PathBuf;

use thiserror::Error;

/// Why a track could not be turned into playable audio.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported container: {0}")]
    Unsupported(String),
    #[error("corrupt or undecodable stream: {0}")]
    Decode(#[from] symphonia::core::errors::Error),
    #[error("no audio track in file")]
    NoAudioTrack,
    #[error("cannot write decoded audio: {0}")]
    Wav(#[from] hound::Error),
}

/// Failures of the audio output backend.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("cannot open audio output: {0}")]
    Open(String),
    #[error("audio output rejected the stream: {0}")]
    Rejected(String),
    #[error("reading decoded audio failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("writer thread panicked")]
    WriterPanicked,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load {}: {source}", path.display())]
    TrackLoad {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    #[error("seek target {0}s is before the start of the track")]
    SeekOutOfRange(f64),
    #[error("the streaming engine cannot seek")]
    SeekUnsupported,
    #[error("no track is playing")]
    NotActive,
    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl EngineError {
    pub(crate) fn load(path: impl Into<PathBuf>, source: LoadError) -> Self {
        Self::TrackLoad {
            path: path.into(),
            source,
        }
    }
}
