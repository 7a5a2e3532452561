use std::path::Path;

use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{ContainerFormat, Track};
use super::tags::read_track;

fn audio_format(path: &Path, settings: &LibrarySettings) -> Option<ContainerFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let wanted = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .any(|e| e == ext);
    if !wanted {
        return None;
    }
    ContainerFormat::from_path(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Walk `dir` recursively and read every supported audio file.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let walker = WalkDir::new(dir).follow_links(settings.follow_links);

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(format) = audio_format(path, settings) {
            tracks.push(read_track(path, format));
        }
    }

    tracing::debug!(dir = %dir.display(), found = tracks.len(), "scanned source");
    tracks
}

/// Scan every source directory; missing directories are skipped.
pub fn scan_sources<P: AsRef<Path>>(sources: &[P], settings: &LibrarySettings) -> Vec<Track> {
    let mut out = Vec::new();
    for dir in sources {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            tracing::info!(dir = %dir.display(), "skipping missing music source");
            continue;
        }
        out.extend(scan(dir, settings));
    }
    out
}
