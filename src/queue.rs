//! Playback queue and the navigator that advances through it.

use thiserror::Error;

mod navigator;

pub use navigator::{Navigator, Tick};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("no queue entry {index} (queue has {len})")]
    OutOfRange { index: usize, len: usize },
}
