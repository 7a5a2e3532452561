//! Converts a library track into a temporary 16-bit stereo WAV.
//!
//! Decoding is delegated to symphonia; the result is written with hound so
//! both engines read the same intermediate form.

use std::fs::File;
use std::io::BufWriter;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::library::Track;

use super::error::LoadError;
use super::temp::TempAudio;
use super::types::PcmSpec;

/// Decoded audio ready for an engine: the temp file, its layout and length.
#[derive(Debug)]
pub struct LoadedAudio {
    pub audio: TempAudio,
    pub spec: PcmSpec,
    pub duration: f64,
}

pub trait TrackLoader {
    fn load(&self, track: &Track) -> Result<LoadedAudio, LoadError>;
}

/// Symphonia-backed loader writing `prefix*.wav` temp files.
#[derive(Debug, Clone)]
pub struct SymphoniaLoader {
    prefix: String,
}

impl SymphoniaLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

fn classify(e: SymphoniaError) -> LoadError {
    match e {
        SymphoniaError::Unsupported(what) => LoadError::Unsupported(what.to_string()),
        SymphoniaError::IoError(io) => LoadError::Io(io),
        other => LoadError::Decode(other),
    }
}

impl TrackLoader for SymphoniaLoader {
    fn load(&self, track: &Track) -> Result<LoadedAudio, LoadError> {
        let file = File::open(&track.path)?;

        let mut hint = Hint::new();
        hint.with_extension(track.format.extension());
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(classify)?;
        let mut format = probed.format;

        let source = format.default_track().ok_or(LoadError::NoAudioTrack)?;
        let track_id = source.id;
        let params = source.codec_params.clone();
        let sample_rate = params.sample_rate.ok_or(LoadError::NoAudioTrack)?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(classify)?;

        let spec = PcmSpec {
            sample_rate,
            channels: 2,
        };
        let wav_spec = hound::WavSpec {
            channels: spec.channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut out = TempAudio::create(&self.prefix)?;
        let mut frames: u64 = 0;
        {
            let sink = out.as_file_mut().ok_or(LoadError::NoAudioTrack)?;
            let mut writer = hound::WavWriter::new(BufWriter::new(sink), wav_spec)?;

            loop {
                let packet = match format.next_packet() {
                    Ok(p) => p,
                    Err(SymphoniaError::IoError(e))
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        break;
                    }
                    Err(SymphoniaError::ResetRequired) => break,
                    Err(e) => return Err(classify(e)),
                };
                if packet.track_id() != track_id {
                    continue;
                }

                let decoded = match decoder.decode(&packet) {
                    Ok(d) => d,
                    // A damaged packet is skipped; the rest of the stream may be fine.
                    Err(SymphoniaError::DecodeError(msg)) => {
                        tracing::debug!(path = %track.path.display(), msg, "skipping bad packet");
                        continue;
                    }
                    Err(e) => return Err(classify(e)),
                };

                let channels = decoded.spec().channels.count();
                if channels == 0 {
                    continue;
                }
                let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec());
                buf.copy_interleaved_ref(decoded);

                for frame in buf.samples().chunks_exact(channels) {
                    let (left, right) = match frame {
                        [mono] => (*mono, *mono),
                        [l, r, ..] => (*l, *r),
                        [] => continue,
                    };
                    writer.write_sample(left)?;
                    writer.write_sample(right)?;
                    frames += 1;
                }
            }

            writer.finalize()?;
        }

        if frames == 0 {
            return Err(LoadError::NoAudioTrack);
        }

        let duration = frames as f64 / sample_rate as f64;
        tracing::debug!(
            path = %track.path.display(),
            temp = %out.path().display(),
            sample_rate,
            duration,
            "decoded track"
        );

        Ok(LoadedAudio {
            audio: out,
            spec,
            duration,
        })
    }
}
