//! Music library: track model, tag reading, scanning, the metadata cache and
//! favorites.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::LibrarySettings;

mod cache;
mod favorites;
mod model;
mod scan;
mod tags;

pub use cache::{load_cache, save_cache, sort_for_browsing};
pub use favorites::Favorites;
pub use model::{Track, TrackId};
use scan::scan_sources;

#[cfg(test)]
pub use model::ContainerFormat;

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: malformed JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no music found in any source directory")]
    Empty,
}

impl LibraryError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Load the cached library, rebuilding it from the configured sources (plus
/// `extra_sources`) when forced or when no cache exists yet.
pub fn load_or_refresh(
    settings: &LibrarySettings,
    extra_sources: &[PathBuf],
    force: bool,
) -> Result<Vec<Track>, LibraryError> {
    let cache_path = settings.cache_path.as_path();
    let mut tracks = if force || !cache_path.exists() {
        let sources: Vec<&Path> = settings
            .sources
            .iter()
            .chain(extra_sources)
            .map(PathBuf::as_path)
            .collect();
        tracing::info!(sources = sources.len(), "refreshing metadata cache");
        let tracks = scan_sources(&sources, settings);
        if tracks.is_empty() {
            return Err(LibraryError::Empty);
        }
        save_cache(cache_path, &tracks)?;
        tracks
    } else {
        load_cache(cache_path)?
    };

    sort_for_browsing(&mut tracks);
    Ok(tracks)
}

/// Unique `(artist, album)` pairs in library order.
pub fn albums(tracks: &[Track]) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for t in tracks {
        let key = (t.artist.clone(), t.album.clone());
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

/// All tracks of `album`, ordered by track number.
pub fn album_tracks(tracks: &[Track], album: &str) -> Vec<Track> {
    let mut out: Vec<Track> = tracks.iter().filter(|t| t.album == album).cloned().collect();
    out.sort_by_key(|t| t.track_number);
    out
}
