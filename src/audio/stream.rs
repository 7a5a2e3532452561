//! Engine that streams raw PCM from the decoded temp file on its own thread.
//!
//! Each played track gets a session: a writer thread reading fixed-size
//! chunks, scaling them by the live volume and pushing them into a
//! [`PcmOutput`]. Elapsed time is counted from the samples delivered.

use std::fs::File;
use std::io::{BufReader, Read, Take};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::library::Track;

use super::backend::{PcmDevice, PcmOutput};
use super::clock::SampleClock;
use super::error::{DeviceError, EngineError};
use super::loader::{LoadedAudio, TrackLoader};
use super::types::{Engine, PcmSpec, PlaybackState};
use super::volume::{Volume, scale_pcm_le16};

const PAUSE_PARK: Duration = Duration::from_millis(50);
const DRAIN_POLL: Duration = Duration::from_millis(5);

/// State shared between the engine and one writer thread.
#[derive(Debug)]
struct WriterShared {
    running: AtomicBool,
    paused: AtomicBool,
    volume: AtomicU8,
    clock: SampleClock,
    spec: PcmSpec,
}

impl WriterShared {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn volume(&self) -> Volume {
        Volume::from(self.volume.load(Ordering::Relaxed))
    }
}

struct Session {
    shared: Arc<WriterShared>,
    handle: Option<JoinHandle<Result<(), DeviceError>>>,
    track: Track,
    loaded: LoadedAudio,
}

impl Session {
    fn writer_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn unpark(&self) {
        if let Some(h) = &self.handle {
            h.thread().unpark();
        }
    }

    /// Signal the writer to finish and wait for it.
    fn halt(&mut self) -> Result<(), DeviceError> {
        self.shared.running.store(false, Ordering::Release);
        self.unpark();
        match self.handle.take() {
            Some(handle) => join_writer(handle),
            None => Ok(()),
        }
    }
}

/// Join the writer and hand back its result. Called from the writer itself
/// this returns at once; a thread cannot join itself.
fn join_writer(handle: JoinHandle<Result<(), DeviceError>>) -> Result<(), DeviceError> {
    if handle.thread().id() == thread::current().id() {
        return Ok(());
    }
    handle.join().map_err(|_| DeviceError::WriterPanicked)?
}

pub struct StreamEngine {
    device: Box<dyn PcmDevice>,
    loader: Box<dyn TrackLoader>,
    chunk_bytes: usize,
    state: PlaybackState,
    volume: Volume,
    prepared: Option<(Track, LoadedAudio)>,
    session: Option<Session>,
}

impl StreamEngine {
    /// `chunk_bytes` is the write granularity; a multiple of the 4-byte
    /// stereo frame keeps channels aligned.
    pub fn new(
        device: Box<dyn PcmDevice>,
        loader: Box<dyn TrackLoader>,
        chunk_bytes: usize,
        volume: Volume,
    ) -> Self {
        Self {
            device,
            loader,
            chunk_bytes: chunk_bytes.max(4),
            state: PlaybackState::Idle,
            volume,
            prepared: None,
            session: None,
        }
    }

    fn end_session(&mut self) -> Result<(), DeviceError> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        let result = session.halt();
        if let Err(e) = session.loaded.audio.release() {
            tracing::warn!(path = %session.track.path.display(), error = %e, "temp audio not removed");
        }
        result
    }
}

/// Open the decoded WAV and position the reader on its sample data.
fn open_pcm(loaded: &LoadedAudio) -> Result<Take<BufReader<File>>, DeviceError> {
    let reader = hound::WavReader::new(BufReader::new(File::open(loaded.audio.path())?))
        .map_err(|e| DeviceError::Rejected(e.to_string()))?;
    // `len` counts interleaved samples.
    let data_bytes = reader.len() as u64 * PcmSpec::BYTES_PER_SAMPLE as u64;
    Ok(reader.into_inner().take(data_bytes))
}

fn fill_chunk(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

fn run_writer(
    shared: Arc<WriterShared>,
    mut reader: impl Read,
    mut output: Box<dyn PcmOutput>,
    chunk_bytes: usize,
) -> Result<(), DeviceError> {
    let mut chunk = vec![0u8; chunk_bytes];
    let mut output_paused = false;

    let result = loop {
        if !shared.is_running() {
            break Ok(());
        }
        if shared.paused.load(Ordering::Acquire) {
            if !output_paused {
                output.set_paused(true);
                output_paused = true;
            }
            thread::park_timeout(PAUSE_PARK);
            continue;
        }
        if output_paused {
            output.set_paused(false);
            output_paused = false;
        }

        let n = match fill_chunk(&mut reader, &mut chunk) {
            Ok(n) => n,
            Err(e) => break Err(DeviceError::Io(e)),
        };
        if n == 0 {
            // End of data: let the device play out what it has.
            while shared.is_running() && output.pending() {
                thread::sleep(DRAIN_POLL);
            }
            break Ok(());
        }

        // A short final read may split a sample; drop the dangling byte.
        let usable = n - n % PcmSpec::BYTES_PER_SAMPLE;
        let data = &mut chunk[..usable];
        scale_pcm_le16(data, shared.volume());
        if let Err(e) = output.write(data) {
            break Err(e);
        }
        shared
            .clock
            .advance((usable / PcmSpec::BYTES_PER_SAMPLE) as u64);
    };

    output.stop();
    shared.running.store(false, Ordering::Release);
    result
}

impl Engine for StreamEngine {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        self.stop();
        self.state = PlaybackState::Loading;
        match self.loader.load(track) {
            Ok(loaded) => {
                self.prepared = Some((track.clone(), loaded));
                self.state = PlaybackState::Stopped;
                Ok(())
            }
            Err(e) => {
                self.state = PlaybackState::Idle;
                Err(EngineError::load(&track.path, e))
            }
        }
    }

    fn play(&mut self, track: &Track) -> Result<(), EngineError> {
        self.load(track)?;
        let Some((track, loaded)) = self.prepared.take() else {
            return Err(EngineError::NotActive);
        };

        let opened = open_pcm(&loaded)
            .and_then(|reader| Ok((reader, self.device.open(loaded.spec)?)));
        let (reader, output) = match opened {
            Ok(pair) => pair,
            Err(e) => {
                // `loaded` drops here, deleting its file.
                self.state = PlaybackState::Stopped;
                return Err(e.into());
            }
        };

        let shared = Arc::new(WriterShared {
            running: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            volume: AtomicU8::new(self.volume.level()),
            clock: SampleClock::default(),
            spec: loaded.spec,
        });
        let chunk_bytes = self.chunk_bytes;
        let writer_shared = Arc::clone(&shared);
        let spawned = thread::Builder::new()
            .name("segue-writer".into())
            .spawn(move || run_writer(writer_shared, reader, output, chunk_bytes));
        let handle = match spawned {
            Ok(h) => h,
            Err(e) => {
                self.state = PlaybackState::Stopped;
                return Err(EngineError::Device(DeviceError::Io(e)));
            }
        };

        tracing::info!(track = %track.display(), "streaming");
        self.session = Some(Session {
            shared,
            handle: Some(handle),
            track,
            loaded,
        });
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if let Some(s) = &self.session {
            s.shared.paused.store(true, Ordering::Release);
        }
        self.state = PlaybackState::Paused;
    }

    fn resume(&mut self) {
        if self.state != PlaybackState::Paused {
            return;
        }
        if let Some(s) = &self.session {
            s.shared.paused.store(false, Ordering::Release);
            s.unpark();
        }
        self.state = PlaybackState::Playing;
    }

    fn stop(&mut self) {
        if let Some((track, mut loaded)) = self.prepared.take() {
            if let Err(e) = loaded.audio.release() {
                tracing::warn!(path = %track.path.display(), error = %e, "temp audio not removed");
            }
        }
        if let Err(e) = self.end_session() {
            tracing::warn!(error = %e, "writer ended with an error");
        }
        if self.state != PlaybackState::Idle {
            self.state = PlaybackState::Stopped;
        }
    }

    fn seek(&mut self, to_seconds: f64) -> Result<(), EngineError> {
        if !to_seconds.is_finite() || to_seconds < 0.0 {
            return Err(EngineError::SeekOutOfRange(to_seconds));
        }
        Err(EngineError::SeekUnsupported)
    }

    fn time(&self) -> f64 {
        match &self.session {
            Some(s) if self.state.is_active() => s.shared.clock.time(&s.shared.spec),
            _ => 0.0,
        }
    }

    fn is_playing(&self) -> (bool, bool) {
        let alive = self.session.as_ref().is_some_and(Session::writer_alive);
        (self.state == PlaybackState::Playing, alive)
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn volume(&self) -> Volume {
        self.volume
    }

    fn set_volume(&mut self, volume: Volume) {
        self.volume = volume;
        if let Some(s) = &self.session {
            s.shared.volume.store(volume.level(), Ordering::Relaxed);
        }
    }

    fn poll(&mut self) -> Result<(), EngineError> {
        let finished = self
            .session
            .as_ref()
            .is_some_and(|s| !s.writer_alive());
        if !finished {
            return Ok(());
        }
        let result = self.end_session();
        self.state = PlaybackState::Stopped;
        result.map_err(EngineError::from)
    }
}

impl Drop for StreamEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
