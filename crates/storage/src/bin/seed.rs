use std::fmt;

use chrono::{DateTime, Duration, Utc};
use progress_core::keys::{canonical_key, legacy_key};
use progress_core::model::{ProgressKey, ProgressUpdate, TopicKey, UserId};
use progress_core::scoring::{percentage, points_from_correct};
use serde_json::json;
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user: UserId,
    topics: u32,
    with_legacy: bool,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUser { raw: String },
    InvalidTopics { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUser { raw } => {
                write!(f, "invalid --user value (expected UUID): {raw}")
            }
            ArgsError::InvalidTopics { raw } => write!(f, "invalid --topics value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("PROGRESS_DB_URL")
            .unwrap_or_else(|_| "sqlite:progress.sqlite3?mode=rwc".into());
        let mut user = std::env::var("PROGRESS_USER_ID")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok())
            .unwrap_or_else(UserId::random);
        let mut topics = std::env::var("PROGRESS_TOPICS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut with_legacy = false;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    user = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUser { raw: value.clone() })?;
                }
                "--topics" => {
                    let value = require_value(&mut args, "--topics")?;
                    topics = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidTopics { raw: value.clone() })?;
                }
                "--legacy" => with_legacy = true,
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user,
            topics,
            with_legacy,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>    SQLite URL (default: sqlite:progress.sqlite3?mode=rwc)");
    eprintln!("  --user <uuid>        Learner to seed (default: random)");
    eprintln!("  --topics <n>         Number of theory/quiz topic pairs (default: 3)");
    eprintln!("  --legacy             Store quiz results under legacy keys");
    eprintln!("  --now <rfc3339>      Fixed current time for deterministic seeding");
    eprintln!("  -h, --help           Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  PROGRESS_DB_URL, PROGRESS_USER_ID, PROGRESS_TOPICS");
    eprintln!("Logging: RUST_LOG (e.g. RUST_LOG=info)");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let samples = ["ownership", "borrowing", "lifetimes", "traits", "closures"];
    for i in 0..args.topics {
        let idx = (i as usize) % samples.len();
        let topic = TopicKey::new(format!("{}-{}", samples[idx], i + 1))?;
        let at = now - Duration::days(i64::from(i));

        // Legacy quiz records share the bare key with the theory page.
        if !args.with_legacy {
            let theory = ProgressUpdate::completed(ProgressKey::from(&topic), 100, 0);
            storage.progress.save_progress(args.user, &theory, at).await?;
        }

        let total = 5_usize;
        let correct = (i as usize % total) + 1;
        let quiz_key = if args.with_legacy {
            legacy_key(&topic)
        } else {
            canonical_key(&topic)
        };
        let quiz = ProgressUpdate::completed(
            quiz_key.clone(),
            percentage(correct, total),
            points_from_correct(correct),
        )
        .with_extra(json!({"correct": correct, "total": total}));
        let outcome = storage.progress.save_progress(args.user, &quiz, at).await?;
        log::info!(
            "seeded {quiz_key} ({correct}/{total}, points awarded: {})",
            outcome.points_awarded
        );
    }

    println!(
        "Seeded {} topics for user {} into {}",
        args.topics, args.user, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
