#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Number Munchers sessions headlessly.

mod autoplay;
mod save_file;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use munchers_core::{ActiveRule, GridSize, LevelId, Rule};
use munchers_system_progression::{LevelCatalog, Progression};
use munchers_world::{query, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::save_file::JsonFileStore;

#[derive(Debug, Parser)]
#[command(name = "munchers", about = "Plays Number Munchers sessions with a greedy autoplayer")]
struct CliArgs {
    /// Base seed for board generation and troggle movement.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Catalog level to play; defaults to the highest unlocked level.
    #[arg(long, conflicts_with = "classic")]
    level: Option<u32>,
    /// Plays an untimed classic board instead of a catalog level.
    #[arg(long)]
    classic: bool,
    /// Rows of the classic board.
    #[arg(long, default_value_t = 5)]
    rows: u32,
    /// Columns of the classic board.
    #[arg(long, default_value_t = 6)]
    columns: u32,
    /// Rule of the classic board.
    #[arg(long, value_enum, default_value_t = RuleArg::Multiples)]
    rule: RuleArg,
    /// Target number of the classic board.
    #[arg(long, default_value_t = 3)]
    target: u32,
    /// Troggles roaming the classic board.
    #[arg(long, default_value_t = 1)]
    troggles: usize,
    /// TOML level catalog replacing the built-in one.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// JSON file holding campaign progress.
    #[arg(long, default_value = "munchers-save.json")]
    save: PathBuf,
    /// Ticks the autoplayer may spend before giving up.
    #[arg(long, default_value_t = 600)]
    max_ticks: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RuleArg {
    Multiples,
    Factors,
    Primes,
    Addition,
    Subtraction,
    Mixed,
}

impl From<RuleArg> for Rule {
    fn from(value: RuleArg) -> Self {
        match value {
            RuleArg::Multiples => Rule::Multiples,
            RuleArg::Factors => Rule::Factors,
            RuleArg::Primes => Rule::Primes,
            RuleArg::Addition => Rule::Addition,
            RuleArg::Subtraction => Rule::Subtraction,
            RuleArg::Mixed => Rule::Mixed,
        }
    }
}

/// Entry point for the Number Munchers command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    println!("{}", query::welcome_banner());
    if args.classic {
        run_classic(&args)
    } else {
        run_campaign(&args)
    }
}

fn run_classic(args: &CliArgs) -> Result<()> {
    let size = GridSize::new(args.rows, args.columns).context("invalid classic board size")?;
    let rule = ActiveRule::new(args.rule.into(), args.target);
    let mut session = Session::classic(args.seed, size, rule, args.troggles);
    println!("Classic board {}x{}: {}", args.rows, args.columns, session.state().rule());

    let report = autoplay::play(&mut session, args.max_ticks);
    let state = session.state();
    let outcome = if state.is_game_won() {
        "won"
    } else if state.is_game_over() {
        "lost"
    } else {
        "unfinished"
    };
    println!(
        "Session {outcome} after {} ticks ({} moves, {} eats): score {}, mistakes {}, best streak {}",
        report.ticks,
        report.moves,
        report.eats,
        state.score(),
        state.mistakes(),
        state.best_streak()
    );
    Ok(())
}

fn run_campaign(args: &CliArgs) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => LevelCatalog::from_path(path)?,
        None => LevelCatalog::builtin()?,
    };
    let store = JsonFileStore::new(&args.save);
    let mut progression = Progression::new(catalog, store).with_context(|| {
        format!("failed to load progress from {}", args.save.display())
    })?;

    let level = match args.level {
        Some(level) => LevelId::new(level),
        None => progression
            .unlocked_levels()
            .last()
            .copied()
            .context("the catalog has no unlocked level")?,
    };
    let mut session = progression
        .start_level(level, args.seed)
        .with_context(|| format!("failed to start level {level}"))?;
    if let Some(config) = progression.catalog().get(level) {
        println!("Level {level} \"{}\": {}", config.name, session.state().rule());
    }

    let report = autoplay::play(&mut session, args.max_ticks);
    let Some(summary) = session.summary() else {
        println!(
            "Level {level} unfinished after {} ticks ({} moves, {} eats)",
            report.ticks, report.moves, report.eats
        );
        return Ok(());
    };

    let unlocked = progression
        .record(&summary)
        .with_context(|| format!("failed to record level {level}"))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to encode session summary")?
    );
    for achievement in unlocked {
        println!("Achievement unlocked: {achievement:?}");
    }
    info!(
        save = %progression.store().path().display(),
        total_score = progression.save_data().total_score,
        "progress saved"
    );
    Ok(())
}
