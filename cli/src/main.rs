use std::io;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use mineboard_cli::records::Leaderboard;
use mineboard_cli::session::{Session, Ticker};
use mineboard_cli::{Args, init_logging, run};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose)?;

    let config = args.game_config()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!(
        "Starting {}x{} with {} mines, seed {}",
        config.rows(),
        config.cols(),
        config.mines(),
        seed
    );

    let session = Arc::new(Mutex::new(Session::new(config, seed)));
    let ticker = Ticker::spawn(session.clone());
    let leaderboard = Leaderboard::new(&args.records_dir);

    let result = run(
        &args,
        &session,
        &leaderboard,
        io::stdin().lock(),
        io::stdout().lock(),
    );
    ticker.shutdown();
    result
}
