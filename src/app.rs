//! Application module: the model the TUI renders and the runtime mutates.
//!
//! `App` holds the browsable library, the current view and typed input;
//! playback itself lives in the queue navigator.

mod model;

pub use model::*;
