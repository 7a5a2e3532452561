//! Application model: which view is showing, the typed entry number, scroll
//! position and the per-session caches the UI reads from.

use std::collections::HashMap;

use crate::library::{self, Favorites, Track, TrackId};
use crate::lyrics::{self, Lyrics};
use crate::queue::Navigator;

/// Which list the main pane shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Tracks,
    Queue,
    Albums,
    Lyrics,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Tracks => "tracks",
            View::Queue => "queue",
            View::Albums => "albums",
            View::Lyrics => "lyrics",
        }
    }
}

/// The main application model.
pub struct App {
    pub library: Vec<Track>,
    pub albums: Vec<(String, String)>,
    pub view: View,
    /// First visible row of the current view.
    pub offset: usize,
    /// Digits typed so far; Enter acts on the entry they name.
    pub input: String,
    /// Keep the active lyric line centred until the user scrolls.
    pub lyrics_follow: bool,
    pub status: Option<String>,
    pub favorites: Favorites,
    lyrics_autoscroll: bool,
    lyrics: HashMap<TrackId, Option<Lyrics>>,
}

impl App {
    /// `library` is shown in the order given.
    pub fn new(library: Vec<Track>, favorites: Favorites, lyrics_autoscroll: bool) -> Self {
        let albums = library::albums(&library);
        Self {
            library,
            albums,
            view: View::Tracks,
            offset: 0,
            input: String::new(),
            lyrics_follow: lyrics_autoscroll,
            status: None,
            favorites,
            lyrics_autoscroll,
            lyrics: HashMap::new(),
        }
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
        self.offset = 0;
        self.input.clear();
        if view == View::Lyrics {
            self.lyrics_follow = self.lyrics_autoscroll;
        }
    }

    pub fn push_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.input.len() < 9 {
            self.input.push(c);
        }
    }

    pub fn pop_digit(&mut self) {
        self.input.pop();
    }

    fn take_number(&mut self) -> Option<usize> {
        let n = self.input.parse().ok();
        self.input.clear();
        n
    }

    /// Rows in the current view, for scroll bounds.
    pub fn view_len(&mut self, nav: &Navigator) -> usize {
        match self.view {
            View::Tracks => self.library.len(),
            View::Queue => nav.queue().len(),
            View::Albums => self.albums.len(),
            View::Lyrics => nav
                .now_playing()
                .cloned()
                .and_then(|t| self.lyrics_for(&t).map(|l| l.lines().len()))
                .unwrap_or(0),
        }
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.offset = self.offset.saturating_sub(rows);
        if self.view == View::Lyrics {
            self.lyrics_follow = false;
        }
    }

    pub fn scroll_down(&mut self, rows: usize, len: usize) {
        self.offset = (self.offset + rows).min(len.saturating_sub(1));
        if self.view == View::Lyrics {
            self.lyrics_follow = false;
        }
    }

    /// Act on the typed entry number for the current view.
    pub fn submit(&mut self, nav: &mut Navigator) {
        let Some(n) = self.take_number() else {
            return;
        };
        self.status = Some(match self.view {
            View::Tracks => match self.library.get(n) {
                Some(track) => {
                    let title = track.display();
                    let at = nav.enqueue(track.clone());
                    format!("queued {title} at {at}")
                }
                None => format!("no track {n}"),
            },
            View::Queue => match nav.remove(n) {
                Ok(track) => format!("removed {}", track.display()),
                Err(e) => e.to_string(),
            },
            View::Albums => match self.albums.get(n) {
                Some((artist, album)) => {
                    let count = nav.enqueue_album(&self.library, album);
                    format!("queued {count} tracks of {artist} - {album}")
                }
                None => format!("no album {n}"),
            },
            View::Lyrics => return,
        });
    }

    /// Flip the favorite flag of the playing track.
    pub fn toggle_favorite(&mut self, nav: &Navigator) {
        let Some(track) = nav.now_playing() else {
            self.status = Some("nothing playing".to_string());
            return;
        };
        self.status = Some(match self.favorites.toggle(&track.id()) {
            Ok(true) => format!("favorited {}", track.display()),
            Ok(false) => format!("unfavorited {}", track.display()),
            Err(e) => {
                tracing::warn!(error = %e, "favorites not saved");
                e.to_string()
            }
        });
    }

    pub fn is_favorite(&self, track: &Track) -> bool {
        self.favorites.is_favorite(&track.id())
    }

    /// Lyrics of `track`, read from its sidecar on first request.
    pub fn lyrics_for(&mut self, track: &Track) -> Option<&Lyrics> {
        self.lyrics
            .entry(track.id())
            .or_insert_with(|| match Lyrics::load_for(&track.path) {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(path = %track.path.display(), error = %e, "lyrics unreadable");
                    None
                }
            })
            .as_ref()
    }

    /// Move the lyrics view so the active line sits mid-pane, unless the user
    /// has taken over scrolling.
    pub fn follow_lyrics(&mut self, active: Option<usize>, height: usize) {
        if let (true, Some(active)) = (self.lyrics_follow, active) {
            self.offset = lyrics::centered_offset(active, height);
        }
    }
}
