//! Playback clocks.
//!
//! The device engine trusts the output's own position and corrects it with
//! an offset absorbed at every seek. The streaming engine has no device
//! clock; it counts the samples its writer has delivered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::types::PcmSpec;

/// Device position plus a logical offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceClock {
    offset: f64,
}

impl DeviceClock {
    /// Playing from the start: the device position is the whole story.
    pub fn reset(&mut self) {
        self.offset = 0.0;
    }

    /// Record a seek to `target` given the device position read right after
    /// output was restarted there.
    pub fn seeked(&mut self, target: f64, device_position: Duration) {
        self.offset = target - device_position.as_secs_f64();
    }

    #[cfg(test)]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn time(&self, device_position: Duration) -> f64 {
        (device_position.as_secs_f64() + self.offset).max(0.0)
    }
}

/// Elapsed time derived from the number of interleaved samples written.
#[derive(Debug, Default)]
pub struct SampleClock {
    samples: AtomicU64,
}

impl SampleClock {
    pub fn advance(&self, samples: u64) {
        self.samples.fetch_add(samples, Ordering::Release);
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Acquire)
    }

    pub fn time(&self, spec: &PcmSpec) -> f64 {
        spec.seconds_for_samples(self.samples())
    }
}
