//! Time-synced lyrics from sidecar `.lrc` files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Seconds from the start of the track.
    pub at: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lyrics {
    lines: Vec<LyricLine>,
}

/// `<stem>.lrc` next to the audio file.
pub fn sidecar_path(track_path: &Path) -> PathBuf {
    track_path.with_extension("lrc")
}

/// Parse one `[mm:ss.ff]text` line. Anything else yields `None`.
fn parse_line(line: &str) -> Option<LyricLine> {
    let rest = line.trim_end_matches('\r').strip_prefix('[')?;
    let (stamp, text) = rest.split_once(']')?;
    let (minutes, seconds) = stamp.split_once(':')?;

    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return None;
    }

    Some(LyricLine {
        at: minutes as f64 * 60.0 + seconds,
        text: text.to_string(),
    })
}

impl Lyrics {
    /// Parse LRC text, silently skipping lines that carry no timestamp.
    pub fn parse(source: &str) -> Self {
        Self {
            lines: source.lines().filter_map(parse_line).collect(),
        }
    }

    /// Read the sidecar for `track_path`. A missing file is `Ok(None)`.
    pub fn load_for(track_path: &Path) -> io::Result<Option<Self>> {
        let path = sidecar_path(track_path);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(Self::parse(&text))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    /// The line whose timestamp is closest to `now` without being after it.
    /// On equal distance the earlier entry wins.
    pub fn active_index(&self, now: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, line) in self.lines.iter().enumerate() {
            let delta = now - line.at;
            if delta < 0.0 {
                continue;
            }
            if best.is_none_or(|(_, d)| delta < d) {
                best = Some((i, delta));
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Scroll offset that keeps `active` in the middle of a `height`-line view.
pub fn centered_offset(active: usize, height: usize) -> usize {
    active.saturating_sub(height / 2)
}
