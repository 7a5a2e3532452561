use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::LoggingSettings;
use crate::queue::Navigator;

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
///
/// While the TUI owns the terminal, logs go to the configured file or
/// nowhere; otherwise they go to stderr.
pub fn init_logging(settings: &LoggingSettings, tui: bool) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter.as_str()));

    if !tui {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(());
    }

    if let Some(path) = &settings.file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

/// Queue what `--play` asked for: library entry `n`, or album `n` of the
/// albums view.
pub fn queue_initial(app: &App, nav: &mut Navigator, play: Option<usize>, album: bool) -> Result<(), String> {
    let Some(n) = play else {
        return Ok(());
    };
    if album {
        let (_, name) = app
            .albums
            .get(n)
            .ok_or_else(|| format!("no album {n} (library has {})", app.albums.len()))?;
        let count = nav.enqueue_album(&app.library, name);
        tracing::info!(album = %name, count, "queued from command line");
    } else {
        let track = app
            .library
            .get(n)
            .ok_or_else(|| format!("no track {n} (library has {})", app.library.len()))?;
        nav.enqueue(track.clone());
        tracing::info!(track = %track.display(), "queued from command line");
    }
    Ok(())
}
