use rand::seq::SliceRandom;

use crate::audio::{Engine, EngineError, PlaybackState, Volume};
use crate::library::{self, Track};
use crate::presence::Presence;

use super::QueueError;

/// What a polling tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing to do: audio is still playing, the user paused, or the queue
    /// has nothing further.
    Idle,
    /// Entry at this index started.
    Started(usize),
    /// The last entry finished; nothing is playing now.
    Ended,
}

/// Ordered queue plus the engine playing through it.
///
/// `index` is the entry currently (or most recently) started; `None` means
/// nothing has been started yet. Whenever set it is `< queue.len()`.
pub struct Navigator {
    queue: Vec<Track>,
    index: Option<usize>,
    engine: Box<dyn Engine>,
    presence: Box<dyn Presence>,
    now_playing: Option<Track>,
    /// The entry behind `now_playing` was removed from the queue.
    playing_removed: bool,
    paused: bool,
    insert_mode: bool,
    restart_threshold: f64,
    last_error: Option<String>,
}

impl Navigator {
    pub fn new(
        engine: Box<dyn Engine>,
        presence: Box<dyn Presence>,
        restart_threshold: f64,
    ) -> Self {
        Self {
            queue: Vec::new(),
            index: None,
            engine,
            presence,
            now_playing: None,
            playing_removed: false,
            paused: false,
            insert_mode: false,
            restart_threshold,
            last_error: None,
        }
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn now_playing(&self) -> Option<&Track> {
        self.now_playing.as_ref()
    }

    /// Queue position of the track being heard, if it is still queued.
    pub fn playing_index(&self) -> Option<usize> {
        if self.now_playing.is_none() || self.playing_removed {
            return None;
        }
        self.index
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn toggle_insert_mode(&mut self) -> bool {
        self.insert_mode = !self.insert_mode;
        self.insert_mode
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn insert_position(&self) -> usize {
        if self.insert_mode {
            self.index.map_or(0, |i| i + 1).min(self.queue.len())
        } else {
            self.queue.len()
        }
    }

    /// Append `track`, or splice it right after the current entry in insert
    /// mode. Returns where it landed.
    pub fn enqueue(&mut self, track: Track) -> usize {
        let at = self.insert_position();
        tracing::debug!(track = %track.display(), at, "enqueued");
        self.queue.insert(at, track);
        at
    }

    /// Queue every library track of `album` in track-number order. Returns
    /// how many were added.
    pub fn enqueue_album(&mut self, library: &[Track], album: &str) -> usize {
        let tracks = library::album_tracks(library, album);
        let count = tracks.len();
        let at = self.insert_position();
        self.queue.splice(at..at, tracks);
        tracing::debug!(album, count, at, "album enqueued");
        count
    }

    /// Remove entry `k`. Entries at or before the current one shift it down,
    /// so the removed-while-playing entry simply finishes.
    pub fn remove(&mut self, k: usize) -> Result<Track, QueueError> {
        if k >= self.queue.len() {
            return Err(QueueError::OutOfRange {
                index: k,
                len: self.queue.len(),
            });
        }
        let removed = self.queue.remove(k);
        match self.index {
            Some(i) if k <= i => {
                if k == i {
                    self.playing_removed = true;
                }
                self.index = i.checked_sub(1);
            }
            _ => {}
        }
        Ok(removed)
    }

    /// Restart the current track when it has played past the threshold,
    /// otherwise step back one entry. The next tick does the actual play.
    pub fn previous(&mut self) {
        let Some(i) = self.index else {
            return;
        };
        let elapsed = self.engine.time();
        if elapsed > self.restart_threshold {
            self.index = i.checked_sub(1);
        } else if i == 0 {
            return;
        } else {
            self.index = i.checked_sub(2);
        }
        self.paused = false;
        self.engine.stop();
    }

    pub fn next(&mut self) {
        self.paused = false;
        self.engine.stop();
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.engine.state() {
            PlaybackState::Playing => {
                self.engine.pause();
                self.paused = true;
            }
            PlaybackState::Paused => {
                self.engine.resume();
                self.paused = false;
            }
            _ => self.paused = !self.paused,
        }
        self.paused
    }

    pub fn seek_to(&mut self, seconds: f64) -> Result<(), EngineError> {
        self.engine.seek(seconds)
    }

    /// Relative seek; targets before the start land on 0.
    pub fn seek_by(&mut self, delta: f64) -> Result<(), EngineError> {
        let target = (self.engine.time() + delta).max(0.0);
        self.engine.seek(target)
    }

    pub fn change_volume(&mut self, delta: i32) -> Volume {
        self.engine.change_volume(delta)
    }

    /// Shuffle the entries that have not been started yet.
    pub fn shuffle_upcoming(&mut self) {
        let from = self.index.map_or(0, |i| i + 1);
        if let Some(upcoming) = self.queue.get_mut(from..) {
            upcoming.shuffle(&mut rand::rng());
        }
    }

    /// One polling step: reap the engine, then start the next entry if
    /// nothing is audible and the user has not paused.
    pub fn tick(&mut self) -> Tick {
        if let Err(e) = self.engine.poll() {
            tracing::error!(error = %e, "playback failed");
            self.last_error = Some(e.to_string());
        }

        let (_, busy) = self.engine.is_playing();
        if busy || self.paused || self.queue.is_empty() {
            return Tick::Idle;
        }

        loop {
            let next = self.index.map_or(0, |i| i + 1);
            if next >= self.queue.len() {
                if self.now_playing.take().is_some() {
                    self.engine.stop();
                    self.presence.cleared();
                    tracing::info!("end of queue");
                    return Tick::Ended;
                }
                return Tick::Idle;
            }

            self.index = Some(next);
            self.playing_removed = false;
            self.engine.stop();
            let track = self.queue[next].clone();
            match self.engine.play(&track) {
                Ok(()) => {
                    self.presence.announce(&track, self.engine.time());
                    self.now_playing = Some(track);
                    return Tick::Started(next);
                }
                Err(e) => {
                    tracing::warn!(track = %track.display(), error = %e, "skipping entry");
                    self.last_error = Some(e.to_string());
                }
            }
        }
    }

    /// Stop playback and release everything the engine holds.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
        if self.now_playing.take().is_some() {
            self.presence.cleared();
        }
    }
}
