//! "Now playing" notifications for anything outside the player that wants
//! to mirror it.

use crate::library::Track;

pub trait Presence {
    /// A new track started; `elapsed` is its position when the change was seen.
    fn track_changed(&self, title: &str, artist: &str, album: &str, elapsed: f64);

    /// Nothing is playing any more.
    fn cleared(&self);

    fn announce(&self, track: &Track, elapsed: f64) {
        self.track_changed(&track.display_title(), &track.artist, &track.album, elapsed);
    }
}

/// Presence sink that only records the change in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresence;

impl Presence for LogPresence {
    fn track_changed(&self, title: &str, artist: &str, album: &str, elapsed: f64) {
        tracing::info!(title, artist, album, elapsed, "now playing");
    }

    fn cleared(&self) {
        tracing::info!("playback cleared");
    }
}
