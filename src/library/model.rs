use std::fmt;
use std::path::{Path, PathBuf};

use lofty::tag::TagType;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// Containers the player knows how to convert and tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Flac,
    Mp3,
    Wav,
}

impl ContainerFormat {
    /// Guess the container from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "flac" => Some(Self::Flac),
            "mp3" => Some(Self::Mp3),
            "wav" | "wave" => Some(Self::Wav),
            _ => None,
        }
    }

    /// Tag blocks to consult for this container, most authoritative first.
    pub fn tag_types(self) -> &'static [TagType] {
        match self {
            Self::Flac => &[TagType::VorbisComments, TagType::Id3v2],
            Self::Mp3 => &[TagType::Id3v2, TagType::Id3v1, TagType::Ape],
            Self::Wav => &[TagType::RiffInfo, TagType::Id3v2],
        }
    }

    /// Extension hint handed to the decoder's probe.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Stable identity of a track: SHA-256 over `artist + title`, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn from_tags(artist: &str, title: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(artist.as_bytes());
        hasher.update(title.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One playable file plus its metadata. Missing tags are empty, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub format: ContainerFormat,
    /// Seconds; never negative.
    #[serde(default, deserialize_with = "non_negative")]
    pub duration: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artist: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub album_artist: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub album: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(rename = "track", default, deserialize_with = "null_as_zero")]
    pub track_number: u32,
}

impl Track {
    /// A track with no tags beyond its location, as a scan would produce for an
    /// untagged file.
    pub fn untagged(path: impl Into<PathBuf>, format: ContainerFormat) -> Self {
        Self {
            path: path.into(),
            format,
            duration: 0.0,
            artist: String::new(),
            album_artist: String::new(),
            album: String::new(),
            title: String::new(),
            genre: None,
            track_number: 0,
        }
    }

    pub fn id(&self) -> TrackId {
        TrackId::from_tags(&self.artist, &self.title)
    }

    /// Title for display, falling back to the file stem.
    pub fn display_title(&self) -> String {
        if !self.title.trim().is_empty() {
            return self.title.clone();
        }
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string()
    }

    /// `Artist - Title`, or just the title when the artist is unknown.
    pub fn display(&self) -> String {
        let title = self.display_title();
        match self.artist.trim() {
            "" => title,
            artist => format!("{artist} - {title}"),
        }
    }
}

fn null_as_empty<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

fn null_as_zero<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(de)?.unwrap_or(0))
}

fn non_negative<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<f64>::deserialize(de)?.unwrap_or(0.0);
    Ok(if v.is_finite() { v.max(0.0) } else { 0.0 })
}
