use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio;
use crate::config::EngineKind;
use crate::library::{self, Favorites};
use crate::presence::LogPresence;
use crate::queue::Navigator;

mod event_loop;
mod settings;
mod startup;

/// Terminal music player with a play queue, albums and synced lyrics.
#[derive(Debug, Parser)]
#[command(name = "segue", version, about)]
pub struct Args {
    /// Rebuild the metadata cache from the source directories.
    #[arg(long)]
    pub refresh: bool,

    /// Extra directory to scan (repeatable); implies --refresh.
    #[arg(long = "add-source", value_name = "DIR")]
    pub add_source: Vec<PathBuf>,

    /// Print the library with entry numbers and exit.
    #[arg(long)]
    pub list: bool,

    /// Start with library entry N queued.
    #[arg(long, value_name = "N")]
    pub play: Option<usize>,

    /// Treat --play N as an album number.
    #[arg(long, requires = "play")]
    pub album: bool,

    /// Override the configured playback engine.
    #[arg(long, value_enum)]
    pub engine: Option<EngineKind>,

    /// Print the effective settings as TOML and exit.
    #[arg(long)]
    pub dump_config: bool,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let (mut settings, settings_problem) = settings::load_settings();
    if let Some(engine) = args.engine {
        settings.audio.engine = engine;
    }

    if args.dump_config {
        print!("{}", toml::to_string_pretty(&settings)?);
        return Ok(());
    }

    let tui = !args.list;
    startup::init_logging(&settings.logging, tui)?;
    if let Some(problem) = settings_problem {
        tracing::warn!("{problem}");
    }

    let refresh = args.refresh || !args.add_source.is_empty();
    let tracks = library::load_or_refresh(&settings.library, &args.add_source, refresh)?;

    if args.list {
        let mut out = std::io::stdout().lock();
        for (i, t) in tracks.iter().enumerate() {
            writeln!(out, "{i}: {} [{}]", t.display(), t.album)?;
        }
        return Ok(());
    }

    let favorites = Favorites::open(&settings.library.favorites_path)?;
    let mut app = App::new(tracks, favorites, settings.ui.lyrics_autoscroll);

    let engine = audio::build_engine(settings.audio.engine, &settings.audio)?;
    let mut nav = Navigator::new(
        engine,
        Box::new(LogPresence),
        settings.controls.restart_threshold_seconds,
    );
    startup::queue_initial(&app, &mut nav, args.play, args.album)?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &mut nav);

    nav.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
