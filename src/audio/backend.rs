//! Output backends behind the two engines.
//!
//! The device engine drives a [`Mixer`]: a managed player that takes a file,
//! restarts it at an offset and reports its own position. The streaming
//! engine pushes raw PCM into a [`PcmOutput`] obtained from a [`PcmDevice`].
//! Both are implemented on top of rodio here and faked in tests.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::error::DeviceError;
use super::types::PcmSpec;

pub trait Mixer {
    /// Make `path` the current file. Output does not start until `play_from`.
    fn load(&mut self, path: &Path) -> Result<(), DeviceError>;
    /// (Re)start the current file at `start`, discarding any previous output.
    /// With `paused` set the new output is held silent until `unpause`.
    fn play_from(&mut self, start: Duration, paused: bool) -> Result<(), DeviceError>;
    fn pause(&mut self);
    fn unpause(&mut self);
    fn stop(&mut self);
    /// Time played since the last `play_from`.
    fn position(&self) -> Duration;
    /// Whether output is still queued (paused output counts as busy).
    fn busy(&self) -> bool;
    fn set_gain(&mut self, gain: f32);
}

pub trait PcmDevice {
    fn open(&mut self, spec: PcmSpec) -> Result<Box<dyn PcmOutput>, DeviceError>;
}

/// A blocking sink for interleaved signed 16-bit little-endian PCM.
pub trait PcmOutput: Send {
    /// Queue `bytes`, blocking while the device is saturated.
    fn write(&mut self, bytes: &[u8]) -> Result<(), DeviceError>;
    /// Whether previously written audio is still being played.
    fn pending(&self) -> bool;
    fn set_paused(&mut self, paused: bool);
    fn stop(&mut self);
}

fn open_stream() -> Result<OutputStream, DeviceError> {
    let mut stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| DeviceError::Open(e.to_string()))?;
    // rodio logs to stderr when the stream is dropped, which corrupts the TUI.
    stream.log_on_drop(false);
    Ok(stream)
}

/// Managed playback through rodio's mixer. Seeking rebuilds the sink with
/// the decoder skipped forward.
pub struct RodioMixer {
    stream: OutputStream,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    gain: f32,
}

impl RodioMixer {
    pub fn open() -> Result<Self, DeviceError> {
        Ok(Self {
            stream: open_stream()?,
            sink: None,
            path: None,
            gain: 1.0,
        })
    }
}

impl Mixer for RodioMixer {
    fn load(&mut self, path: &Path) -> Result<(), DeviceError> {
        self.stop();
        if !path.is_file() {
            return Err(DeviceError::Rejected(format!(
                "{} is not a file",
                path.display()
            )));
        }
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn play_from(&mut self, start: Duration, paused: bool) -> Result<(), DeviceError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| DeviceError::Rejected("nothing loaded".into()))?;
        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| DeviceError::Rejected(e.to_string()))?
            // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
            .skip_duration(start);

        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.gain);
        // Paused before the source is attached, so not a frame leaks out.
        sink.pause();
        sink.append(source);
        if !paused {
            sink.play();
        }
        self.sink = Some(sink);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn unpause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.path = None;
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(Sink::get_pos)
            .unwrap_or(Duration::ZERO)
    }

    fn busy(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| !s.empty())
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
        if let Some(sink) = &self.sink {
            sink.set_volume(gain);
        }
    }
}

/// Buffers queued ahead of the device before `write` blocks: the one playing
/// plus one prepared. Keeps volume, pause and the sample clock within a chunk
/// of what is audible.
const MAX_QUEUED_BUFFERS: usize = 2;
const BACKPRESSURE_SLEEP: Duration = Duration::from_millis(2);

fn saturated(queued: usize) -> bool {
    queued >= MAX_QUEUED_BUFFERS
}

/// Opens raw PCM outputs on the default rodio stream.
pub struct RodioPcmDevice {
    stream: OutputStream,
}

impl RodioPcmDevice {
    pub fn open() -> Result<Self, DeviceError> {
        Ok(Self {
            stream: open_stream()?,
        })
    }
}

impl PcmDevice for RodioPcmDevice {
    fn open(&mut self, spec: PcmSpec) -> Result<Box<dyn PcmOutput>, DeviceError> {
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(DeviceError::Rejected(format!(
                "{} channels at {} Hz",
                spec.channels, spec.sample_rate
            )));
        }
        let sink = Sink::connect_new(self.stream.mixer());
        Ok(Box::new(RodioPcmOutput { sink, spec }))
    }
}

struct RodioPcmOutput {
    sink: Sink,
    spec: PcmSpec,
}

impl PcmOutput for RodioPcmOutput {
    fn write(&mut self, bytes: &[u8]) -> Result<(), DeviceError> {
        while saturated(self.sink.len()) {
            thread::sleep(BACKPRESSURE_SLEEP);
        }
        let samples: Vec<f32> = bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect();
        if samples.is_empty() {
            return Ok(());
        }
        self.sink.append(SamplesBuffer::new(
            self.spec.channels,
            self.spec.sample_rate,
            samples,
        ));
        Ok(())
    }

    fn pending(&self) -> bool {
        !self.sink.empty()
    }

    fn set_paused(&mut self, paused: bool) {
        if paused {
            self.sink.pause();
        } else {
            self.sink.play();
        }
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}
