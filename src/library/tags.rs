//! Tag extraction.
//!
//! Each container resolves once to the tag blocks it is expected to carry
//! (see [`ContainerFormat::tag_types`]); the first block present wins and
//! anything missing falls back to empty values.

use std::path::Path;

use lofty::prelude::{Accessor, AudioFile, ItemKey, TaggedFileExt};
use lofty::tag::Tag;

use super::model::{ContainerFormat, Track};

/// Read tags and duration for `path`. Unreadable or untagged files still yield
/// a track with empty fields.
pub fn read_track(path: &Path, format: ContainerFormat) -> Track {
    let mut track = Track::untagged(path, format);

    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no readable tags");
            return track;
        }
    };

    track.duration = tagged.properties().duration().as_secs_f64();

    let tag = format
        .tag_types()
        .iter()
        .find_map(|&tt| tagged.tag(tt))
        .or_else(|| tagged.primary_tag())
        .or_else(|| tagged.first_tag());

    if let Some(tag) = tag {
        fill_from_tag(&mut track, tag);
    }
    track
}

fn fill_from_tag(track: &mut Track, tag: &Tag) {
    if let Some(v) = tag.title() {
        track.title = v.trim().to_string();
    }
    if let Some(v) = tag.artist() {
        track.artist = v.trim().to_string();
    }
    if let Some(v) = tag.album() {
        track.album = v.trim().to_string();
    }
    if let Some(v) = tag.genre() {
        let v = v.trim();
        if !v.is_empty() {
            track.genre = Some(v.to_string());
        }
    }
    if let Some(n) = tag.track() {
        track.track_number = n;
    }

    let album_artist = tag
        .items()
        .find(|item| matches!(item.key(), ItemKey::AlbumArtist))
        .and_then(|item| item.value().text());
    if let Some(v) = album_artist {
        track.album_artist = v.trim().to_string();
    }
}
