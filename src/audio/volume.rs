//! Linear volume in `0..=100`.

/// A saturated volume level. Out-of-range requests are clamped, never rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Volume(u8);

impl Volume {
    pub const MIN: Volume = Volume(0);
    pub const MAX: Volume = Volume(100);

    pub fn new(level: i32) -> Self {
        Self(level.clamp(0, 100) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn adjusted(self, delta: i32) -> Self {
        Self::new((self.0 as i32).saturating_add(delta))
    }

    /// Mixer gain in `0.0..=1.0`.
    pub fn gain(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::MAX
    }
}

impl From<u8> for Volume {
    fn from(level: u8) -> Self {
        Self::new(level as i32)
    }
}

/// Rescale interleaved signed 16-bit little-endian samples in place.
///
/// Each sample is multiplied by `level / 100`, truncated toward zero and
/// clipped to the i16 range. A trailing odd byte is left untouched.
pub fn scale_pcm_le16(chunk: &mut [u8], volume: Volume) {
    if volume == Volume::MAX {
        return;
    }
    let level = volume.level() as i32;
    for pair in chunk.chunks_exact_mut(2) {
        let sample = i16::from_le_bytes([pair[0], pair[1]]) as i32;
        let scaled = (sample * level / 100).clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        pair.copy_from_slice(&scaled.to_le_bytes());
    }
}
