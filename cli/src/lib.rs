use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use mineboard_core::*;

use crate::command::{Command, DifficultyChoice, HELP};
use crate::records::{Leaderboard, record_name};
use crate::render::render_game;
use crate::session::{Difficulty, Session, custom_config};

pub mod command;
pub mod records;
pub mod render;
pub mod session;

/// Terminal minesweeper with per-board best times.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub verbose: Verbosity,

    /// Board preset, ignored when a custom board is given
    #[arg(short, long, value_enum, default_value_t = Difficulty::Junior)]
    pub difficulty: Difficulty,

    /// Custom board rows, clamped to 5..=30
    #[arg(long, requires_all = ["cols", "mines"])]
    pub rows: Option<Coord>,

    /// Custom board columns, clamped to 5..=30
    #[arg(long, requires_all = ["rows", "mines"])]
    pub cols: Option<Coord>,

    /// Custom mine count, clamped to at most half the board
    #[arg(long, requires_all = ["rows", "cols"])]
    pub mines: Option<CellCount>,

    /// Seed for the layout stream, random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory holding the best-time lists
    #[arg(long, default_value = "LegendLists")]
    pub records_dir: PathBuf,

    /// Name used for records instead of asking after each win
    #[arg(long)]
    pub name: Option<String>,

    /// Also print each finished game as a JSON line
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn game_config(&self) -> mineboard_core::Result<GameConfig> {
        match (self.rows, self.cols, self.mines) {
            (Some(rows), Some(cols), Some(mines)) => custom_config(rows, cols, mines),
            _ => self.difficulty.config(),
        }
    }
}

/// Installs the fmt subscriber on stderr, which also forwards `log` records.
pub fn init_logging(verbosity: &Verbosity) -> Result<()> {
    use tracing_subscriber::filter::LevelFilter;

    let level = match verbosity.log_level_filter() {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))
}

fn lock(session: &Mutex<Session>) -> Result<MutexGuard<'_, Session>> {
    session
        .lock()
        .map_err(|_| anyhow!("session lock poisoned"))
}

/// Reads commands line by line until `q` or end of input.
pub fn run(
    args: &Args,
    session: &Arc<Mutex<Session>>,
    leaderboard: &Leaderboard,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<()> {
    let mut lines = input.lines();

    render_game(lock(session)?.game(), &mut out)?;
    writeln!(out, "type `h` for help")?;

    while let Some(line) = lines.next() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "{err}")?;
                continue;
            }
        };
        log::debug!("Command {:?}", command);

        let summary = {
            let mut session = lock(session)?;
            let summary = match command {
                Command::Reveal(coords) => match session.reveal(coords) {
                    Ok(effect) => effect.summary,
                    Err(err) => {
                        writeln!(out, "{err}")?;
                        continue;
                    }
                },
                Command::Flag(coords) => {
                    if let Err(err) = session.toggle_flag(coords) {
                        writeln!(out, "{err}")?;
                        continue;
                    }
                    None
                }
                Command::ForceWin => session.force_win().summary,
                Command::NewGame => {
                    session.new_game()?;
                    None
                }
                Command::Difficulty(choice) => {
                    let config = match choice {
                        DifficultyChoice::Preset(preset) => preset.config(),
                        DifficultyChoice::Custom { rows, cols, mines } => {
                            custom_config(rows, cols, mines)
                        }
                    };
                    if let Err(err) = config.and_then(|config| session.change_difficulty(config)) {
                        writeln!(out, "{err}")?;
                        continue;
                    }
                    None
                }
                Command::Leaderboard => {
                    print_records(leaderboard, &session.config(), &mut out)?;
                    continue;
                }
                Command::Help => {
                    writeln!(out, "{HELP}")?;
                    continue;
                }
                Command::Quit => break,
            };
            render_game(session.game(), &mut out)?;
            summary
        };

        if let Some(summary) = summary {
            finish_game(args, leaderboard, &summary, &mut lines, &mut out)?;
        }
    }

    Ok(())
}

fn print_records(leaderboard: &Leaderboard, config: &GameConfig, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "best times for {}x{} with {} mines:",
        config.rows(),
        config.cols(),
        config.mines()
    )?;
    match leaderboard.records(config) {
        Ok(records) if records.is_empty() => writeln!(out, "  no records yet")?,
        Ok(records) => {
            for (place, record) in records.iter().enumerate() {
                writeln!(out, "{:>3}. {:<20} {:>5}s", place + 1, record.name, record.secs)?;
            }
        }
        Err(err) => {
            log::error!("Failed to read records: {err:#}");
            writeln!(out, "could not read records: {err:#}")?;
        }
    }
    Ok(())
}

fn finish_game(
    args: &Args,
    leaderboard: &Leaderboard,
    summary: &GameSummary,
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    out: &mut impl Write,
) -> Result<()> {
    match summary.outcome {
        Outcome::Won => writeln!(out, "You win! {}s", summary.elapsed_secs)?,
        Outcome::Lost => writeln!(out, "Boom! Game over, `n` for a new game")?,
        Outcome::InProgress => {}
    }
    if args.json {
        writeln!(out, "{}", serde_json::to_string(summary)?)?;
    }

    // zero-second wins are not records
    if summary.outcome != Outcome::Won || summary.elapsed_secs == 0 {
        return Ok(());
    }

    let name = match &args.name {
        Some(name) => name.clone(),
        None => {
            write!(out, "name for the leaderboard (empty to skip): ")?;
            out.flush()?;
            match lines.next() {
                Some(line) => line?,
                None => return Ok(()),
            }
        }
    };
    let Some(name) = record_name(&name, summary.forced) else {
        return Ok(());
    };

    match leaderboard.add_record(&summary.config, &name, summary.elapsed_secs) {
        Ok(()) => writeln!(out, "saved {} to {}", name, leaderboard.dir().display())?,
        Err(err) => {
            log::error!("Failed to save record: {err:#}");
            writeln!(out, "could not save record: {err:#}")?;
        }
    }
    Ok(())
}
