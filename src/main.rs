mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use noorpath::{
    arcade::{Arcade, GameKind, KeyOutcome},
    config::{Config, ConfigStore, FileConfigStore},
    feedback::{Feedback, FeedbackError, FeedbackEvent, FeedbackSink},
    runtime::{ArcadeEvent, CrosstermEventSource, FixedTicker, Runner},
    Clock, SystemClock, WordPool,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin, Write},
    path::{Path, PathBuf},
    time::Duration,
};

const TICK_RATE_MS: u64 = 50;

/// reaction, aim, number and verbal memory mini-games in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Four short cognitive mini-games: a reaction timer, an aim trainer, a growing number recall test and a seen-or-new word memory test."
)]
pub struct Cli {
    /// game to open first
    #[clap(short = 'g', long, value_enum)]
    game: Option<GameKind>,

    /// seed for every random draw, for repeatable runs
    #[clap(long)]
    seed: Option<u64>,

    /// length of an aim round in seconds
    #[clap(long)]
    round_secs: Option<u32>,

    /// aim target edge length in surface units (one column is 8, one row is 16)
    #[clap(long)]
    target_size: Option<f64>,

    /// inset kept free around the aim board edge, in surface units
    #[clap(long)]
    margin: Option<f64>,

    /// disable the terminal bell on hits and correct answers
    #[clap(long)]
    mute: bool,

    /// write logs to this file (the terminal belongs to the UI)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// read settings from this file instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// persist the merged settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags win over stored settings
    fn merge_into(&self, mut cfg: Config) -> Config {
        if let Some(game) = self.game {
            cfg.start_tab = game;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(secs) = self.round_secs {
            cfg.aim_round_secs = secs;
        }
        if let Some(size) = self.target_size {
            cfg.aim_target_size = size;
        }
        if let Some(margin) = self.margin {
            cfg.aim_margin = margin;
        }
        if self.mute {
            cfg.sound = false;
        }
        if self.log_file.is_some() {
            cfg.log_file = self.log_file.clone();
        }
        cfg
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

/// Rings the terminal bell on positive cues
struct TerminalBell;

impl FeedbackSink for TerminalBell {
    fn play(&self, event: FeedbackEvent) -> Result<(), FeedbackError> {
        if matches!(event, FeedbackEvent::Hit | FeedbackEvent::Correct) {
            let mut out = io::stdout();
            out.write_all(b"\x07")?;
            out.flush()?;
        }
        Ok(())
    }
}

fn feedback_for(cfg: &Config) -> impl Fn() -> Feedback {
    let sound = cfg.sound;
    move || {
        if sound {
            Feedback::new(TerminalBell)
        } else {
            Feedback::silent()
        }
    }
}

/// Logs only go to a file; without one the logger stays uninstalled
fn init_logging(log_file: Option<&Path>) {
    let Some(path) = log_file else {
        return;
    };
    if let Err(err) = install_file_logger(path) {
        eprintln!("logging to {} disabled: {err}", path.display());
    }
}

fn install_file_logger(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

fn build_arcade<C: Clock + Clone>(clock: C, cfg: &Config) -> Result<Arcade<C>, Box<dyn Error>> {
    let pool = WordPool::embedded()?;
    Ok(Arcade::new(clock, cfg, pool, feedback_for(cfg)))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = cli.config_store();
    let cfg = cli.merge_into(store.load());

    init_logging(cfg.log_file.as_deref());

    if cli.save_config {
        store.save(&cfg)?;
        log::info!("saved settings to {}", store.path().display());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut arcade = build_arcade(SystemClock::new(), &cfg)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut arcade);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, C: Clock + Clone>(
    terminal: &mut Terminal<B>,
    arcade: &mut Arcade<C>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| ui::draw(arcade, f))?;

        match runner.step(arcade.until_next_deadline()) {
            ArcadeEvent::Tick | ArcadeEvent::Resize => {}
            ArcadeEvent::Key(key) => {
                if arcade.handle_key(key) == KeyOutcome::Quit {
                    break;
                }
            }
        }

        arcade.pump();
    }

    arcade.teardown();
    Ok(())
}
