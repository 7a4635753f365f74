use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use freedom_achievements::{
    summarize, AchievementEngine, AchievementStatus, CelebrationNotifier, Collaborators,
    LogNotifier, MemoryActivity, SystemClock,
};
use freedom_core::answers::KEYS;
use freedom_core::{score_and_recommend, score_checked, AnswerSheet, DiagnosticAnswers};
use freedom_ingest::{parse_checkins_csv, parse_snapshots_csv};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod notify;
mod render;
mod state;

const DELIVERY_WAIT: Duration = Duration::from_secs(15);

#[derive(Parser, Debug)]
#[command(
    name = "freedom",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FREEDOM_BUILD_SHA"), ")"),
    about = "Freedom Score diagnostic, achievements and momentum"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a diagnostic and recommend sprints
    Score {
        /// Answers as JSON ({"M1_Q1": 7, ...}); "-" reads stdin
        #[arg(long)]
        input: Option<PathBuf>,

        /// Set one answer, e.g. --answer M3_Q2=7 (repeatable)
        #[arg(long = "answer", value_name = "KEY=VALUE")]
        answers: Vec<String>,

        /// Clamp out-of-range answers from --input into 1..=10 instead of failing
        #[arg(long)]
        clamp: bool,

        #[arg(long)]
        json: bool,
    },

    /// Import check-ins (and optionally monthly business numbers) from CSV
    Import {
        #[arg(long)]
        user: String,

        /// CSV with date,energy_level,tasks_completed[,created_at]
        #[arg(long)]
        checkins: Option<PathBuf>,

        /// CSV with month,revenue,expenses
        #[arg(long)]
        snapshots: Option<PathBuf>,
    },

    /// List achievements with progress
    Achievements {
        #[arg(long)]
        user: String,

        /// Record anything newly earned and send celebrations
        #[arg(long)]
        unlock: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show the momentum score and its factors
    Momentum {
        #[arg(long)]
        user: String,

        #[arg(long)]
        json: bool,
    },

    /// Points, completion and the closest achievements
    Summary {
        #[arg(long)]
        user: String,

        #[arg(long)]
        json: bool,
    },

    /// Manage ~/.freedom/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Score {
            input,
            answers,
            clamp,
            json,
        } => {
            run_score(input.as_deref(), &answers, clamp, json)?;
        }

        Command::Import {
            user,
            checkins,
            snapshots,
        } => {
            run_import(&user, checkins.as_deref(), snapshots.as_deref())?;
        }

        Command::Achievements { user, unlock, json } => {
            run_achievements(&user, unlock, json).await?;
        }

        Command::Momentum { user, json } => {
            let engine = open_engine(&config::load_config()?)?;
            let score = engine.calculate_momentum_score(&user).await;
            if json {
                print_json(&score)?;
            } else {
                print!("{}", render::momentum_report(&score));
            }
        }

        Command::Summary { user, json } => {
            let engine = open_engine(&config::load_config()?)?;
            let summary = summarize(&engine.user_achievements(&user).await);
            if json {
                print_json(&summary)?;
            } else {
                print!("{}", render::summary_report(&summary));
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_score(input: Option<&Path>, assignments: &[String], clamp: bool, json: bool) -> Result<()> {
    let mut answers = match input {
        Some(p) => {
            let sheet = read_answers(p)?;
            if clamp {
                sheet.clamped()
            } else {
                DiagnosticAnswers::try_from(sheet)?
            }
        }
        None => DiagnosticAnswers::from_array([0; 12]),
    };
    for a in assignments {
        answers.apply_assignment(a)?;
    }

    if input.is_none() {
        let missing: Vec<&str> = KEYS
            .into_iter()
            .zip(answers.to_array())
            .filter(|(_, v)| *v == 0)
            .map(|(k, _)| k)
            .collect();
        if !missing.is_empty() {
            bail!(
                "missing answers: {} (pass --input <file> or --answer KEY=VALUE for each)",
                missing.join(", ")
            );
        }
    }

    let result = if clamp {
        score_and_recommend(&answers)
    } else {
        score_checked(&answers)?
    };

    if json {
        print_json(&result)?;
    } else {
        print!("{}", render::score_report(&result));
    }
    Ok(())
}

fn read_answers(p: &Path) -> Result<AnswerSheet> {
    let raw = if p == Path::new("-") {
        let mut s = String::new();
        std::io::stdin()
            .read_to_string(&mut s)
            .context("read answers from stdin")?;
        s
    } else {
        std::fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("parse answers from {}", p.display()))
}

fn run_import(user: &str, checkins: Option<&Path>, snapshots: Option<&Path>) -> Result<()> {
    if checkins.is_none() && snapshots.is_none() {
        bail!("nothing to import (pass --checkins <csv> and/or --snapshots <csv>)");
    }

    let cfg = config::load_config()?;
    let tz = cfg.engine.tz()?;
    let path = state::activity_path()?;
    let mut activity = state::load_state(&path)?;

    if let Some(csv_path) = checkins {
        let rows = parse_checkins_csv(csv_path, user, tz)
            .with_context(|| format!("parsing {}", csv_path.display()))?;
        let total = rows.len();
        let added = activity.merge_checkins(rows);
        println!(
            "Imported {total} check-ins from {} ({added} new days)",
            csv_path.display()
        );
    }

    if let Some(csv_path) = snapshots {
        let rows = parse_snapshots_csv(csv_path, user)
            .with_context(|| format!("parsing {}", csv_path.display()))?;
        println!("Imported {} monthly snapshots from {}", rows.len(), csv_path.display());
        activity.merge_snapshots(rows);
    }

    state::save_state(&path, &activity)?;
    println!("Saved {}", path.display());
    println!("\nNext: `freedom achievements --user {user} --unlock`");
    Ok(())
}

async fn run_achievements(user: &str, unlock: bool, json: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let notifier: Arc<dyn CelebrationNotifier> = if unlock {
        notify::build_notifier(&cfg.notify)?
    } else {
        Arc::new(LogNotifier)
    };
    let (notifier, mut delivered) = notify::Delivered::wrap(notifier);

    let tz = cfg.engine.tz()?;
    let path = state::activity_path()?;
    let store = Arc::new(MemoryActivity::from_state(
        state::load_state(&path)?,
        Arc::new(SystemClock),
        tz,
    ));
    let engine = build_engine(&cfg, store.clone(), notifier);

    let newly = if unlock {
        let newly = engine.check_and_unlock(user).await;
        if !newly.is_empty() {
            state::save_state(&path, &store.state())?;
            notify::wait_for_deliveries(&mut delivered, newly.len(), DELIVERY_WAIT).await;
        }
        newly
    } else {
        Vec::new()
    };

    let list = engine.user_achievements(user).await;
    if json {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Out<'a> {
            newly_unlocked: &'a [AchievementStatus],
            achievements: &'a [AchievementStatus],
        }
        print_json(&Out {
            newly_unlocked: &newly,
            achievements: &list,
        })?;
    } else {
        print!("{}", render::achievements_report(&list, &newly));
    }
    Ok(())
}

/// Read-only engine over the persisted activity file.
fn open_engine(cfg: &config::Config) -> Result<AchievementEngine> {
    let tz = cfg.engine.tz()?;
    let state = state::load_state(&state::activity_path()?)?;
    let store = Arc::new(MemoryActivity::from_state(state, Arc::new(SystemClock), tz));
    Ok(build_engine(cfg, store, Arc::new(LogNotifier)))
}

fn build_engine(
    cfg: &config::Config,
    store: Arc<MemoryActivity>,
    notifier: Arc<dyn CelebrationNotifier>,
) -> AchievementEngine {
    AchievementEngine::new(
        Collaborators {
            activity: store.clone(),
            business: store.clone(),
            store,
            notifier,
        },
        Arc::new(SystemClock),
        cfg.engine.engine_config(),
    )
}
