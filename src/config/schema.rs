use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/segue/config.toml` or `~/.config/segue/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SEGUE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

/// Which playback engine drives the output device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Whole-file playback through the mixer; position comes from the device.
    #[serde(alias = "mixer", alias = "buffered")]
    Device,
    /// Chunked PCM streaming with software volume; position is counted locally.
    #[serde(alias = "streaming", alias = "pcm")]
    Stream,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    pub engine: EngineKind,
    /// Initial volume, saturated into 0..=100.
    pub volume: i32,
    /// Bytes of 16-bit stereo PCM pushed per write by the streaming engine.
    pub chunk_bytes: usize,
    /// Name prefix for the temporary decoded files.
    pub temp_prefix: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            engine: EngineKind::Device,
            volume: 100,
            chunk_bytes: 1024,
            temp_prefix: "segue-conv_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Volume change per `+` / `-` press.
    pub volume_step: i32,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Past this many seconds, "previous" restarts the current track instead.
    pub restart_threshold_seconds: f64,
    /// Event loop polling interval (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            volume_step: 10,
            scrub_seconds: 5,
            restart_threshold_seconds: 5.0,
            poll_interval_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directories scanned when the cache is (re)built.
    pub sources: Vec<PathBuf>,
    /// Where the metadata cache is kept.
    pub cache_path: PathBuf,
    /// Where favorites are kept.
    pub favorites_path: PathBuf,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        let data = super::load::default_data_dir().unwrap_or_else(|| PathBuf::from("."));
        let music = std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Music"))
            .unwrap_or_else(|| PathBuf::from("Music"));
        Self {
            sources: vec![music],
            cache_path: data.join("songcache.json"),
            favorites_path: data.join("favorites.json"),
            extensions: vec!["flac".into(), "mp3".into(), "wav".into()],
            follow_links: true,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether the lyrics view starts by following the active line.
    pub lyrics_autoscroll: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " segue ".to_string(),
            lyrics_autoscroll: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    /// Log file used while the TUI owns the terminal. No file means no TUI logs.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}
