//! On-disk JSON cache of track metadata.
//!
//! The file is a list of `{ "id": <sha256 hex>, "info": { ... } }` records.
//! The id is recomputed from the tags on load, so a stale id never
//! disagrees with the track it is attached to.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::LibraryError;
use super::model::{Track, TrackId};

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    id: TrackId,
    info: Track,
}

/// Read a cache written by [`save_cache`].
pub fn load_cache(path: &Path) -> Result<Vec<Track>, LibraryError> {
    let bytes = fs::read(path).map_err(|e| LibraryError::io(path, e))?;
    let records: Vec<CacheRecord> =
        serde_json::from_slice(&bytes).map_err(|e| LibraryError::json(path, e))?;
    Ok(records.into_iter().map(|r| r.info).collect())
}

/// Write `tracks` as the cache at `path`, creating parent directories.
pub fn save_cache(path: &Path, tracks: &[Track]) -> Result<(), LibraryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| LibraryError::io(parent, e))?;
        }
    }
    let records: Vec<CacheRecord> = tracks
        .iter()
        .map(|t| CacheRecord {
            id: t.id(),
            info: t.clone(),
        })
        .collect();
    let json = serde_json::to_vec(&records).map_err(|e| LibraryError::json(path, e))?;
    fs::write(path, json).map_err(|e| LibraryError::io(path, e))
}

/// Sort the way the library is browsed: by album, then track number.
pub fn sort_for_browsing(tracks: &mut [Track]) {
    tracks.sort_by(|a, b| {
        a.album
            .to_lowercase()
            .cmp(&b.album.to_lowercase())
            .then(a.track_number.cmp(&b.track_number))
    });
}
