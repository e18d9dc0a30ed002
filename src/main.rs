//! Arcade launcher CLI
//!
//! Command-line stand-in for the arcade menu: lists games, shows
//! leaderboards and records finished sessions in the shared score file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};

use arcade_scores::{
    config::ArcadeConfig,
    launcher::{describe_status, render_leaderboard, RecordedSession},
    GameKind, PlayerIdentity, VERSION,
};

#[derive(Parser)]
#[command(name = "arcade", version, about = "3-in-1 arcade launcher and shared leaderboards")]
struct Cli {
    #[arg(long, global = true, help = "Path to the shared score file (overrides ARCADE_SCORES_PATH)")]
    scores: Option<PathBuf>,
    #[arg(long, global = true, help = "Spool record emails into this directory (overrides ARCADE_MAIL_OUTBOX)")]
    outbox: Option<PathBuf>,
    #[arg(long, global = true, help = "Do not send top score notifications")]
    no_notify: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the bundled games.
    Games,
    /// Show one game's top 10.
    Top {
        /// flappy, snake or space-invaders
        game: GameKind,
    },
    /// Show every game's top 10.
    Board,
    /// Record a finished session.
    Submit {
        game: GameKind,
        #[arg(long, default_value = "", help = "Name typed on the game-over screen")]
        name: String,
        #[arg(long, help = "Player email (defaults to the remembered one)")]
        email: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        score: i64,
    },
    /// Remove every entry of one game.
    Clear {
        game: GameKind,
    },
    /// Show a player's stored score.
    Player {
        game: GameKind,
        email: String,
    },
    /// Create an empty score file if none exists.
    Init,
}

fn main() {
    let cli = Cli::parse();

    let mut config = ArcadeConfig::from_env();
    if let Some(scores) = cli.scores.clone() {
        config.scores_path = scores;
    }
    if let Some(outbox) = cli.outbox.clone() {
        config.mail_outbox = Some(outbox);
    }
    if cli.no_notify {
        config.notify = false;
    }

    if let Err(e) = arcade_scores::logging::init(&config.log_level) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
    debug!("Arcade v{} using {}", VERSION, config.scores_path.display());

    if let Err(e) = run(cli.command, &config) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Command, config: &ArcadeConfig) -> Result<()> {
    match command {
        Command::Games => {
            for game in GameKind::ALL {
                println!("{:<14} {}", game.id(), game.title());
            }
        }
        Command::Top { game } => {
            let records = config
                .open_store()
                .top_scores(game.id())
                .with_context(|| format!("reading {} leaderboard", game))?;
            print!("{}", render_leaderboard(game, &records));
        }
        Command::Board => {
            let boards = config
                .launcher()
                .leaderboards()
                .context("reading leaderboards")?;
            for (i, (game, records)) in boards.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", render_leaderboard(*game, records));
            }
        }
        Command::Submit { game, name, email, score } => {
            let launcher = config.launcher();
            let email = email.or_else(|| launcher.remembered_email());
            let player = PlayerIdentity::from_arg(email.as_deref());

            let mut session = RecordedSession::new(game, name, score);
            let report = launcher
                .run(&mut session, player)
                .context("running session")?;

            println!("{}: {} points as {}", game.title(), report.score, report.name);
            println!("{}", describe_status(&report.status));
            print!("{}", render_leaderboard(game, &report.leaderboard));
        }
        Command::Clear { game } => {
            let removed = config
                .open_store()
                .clear_game(game.id())
                .with_context(|| format!("clearing {} leaderboard", game))?;
            info!("Cleared {} entries from {}", removed, game);
            println!("Removed {} entries from {}.", removed, game.title());
        }
        Command::Player { game, email } => {
            if !arcade_scores::is_valid_email(&email) {
                bail!("'{}' is not a valid email", email);
            }
            let found = config
                .open_store()
                .find_player(game.id(), &email)
                .with_context(|| format!("reading {} leaderboard", game))?;
            match found {
                Some(record) => println!(
                    "{} ({}) has {} points in {}",
                    record.display_name(),
                    record.email,
                    record.score,
                    game.title()
                ),
                None => println!("{} is not on the {} leaderboard", email, game.title()),
            }
        }
        Command::Init => {
            let store = config.open_store();
            let created = store
                .ensure_initialized()
                .with_context(|| format!("initialising {}", store.location()))?;
            if created {
                println!("Created {}", store.location());
            } else {
                println!("{} already exists", store.location());
            }
        }
    }
    Ok(())
}
