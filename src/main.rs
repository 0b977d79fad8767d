// src/main.rs

use clap::{Args, Parser, Subcommand};
use log::{debug, error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use study_scheduler::config::format_delay;
use study_scheduler::models::now_millis;
use study_scheduler::{
    CollectionId, CollectionSize, Persistence, Recall, ReviewState, SchedulerConfig, StudySession,
};

#[derive(Parser)]
#[command(
    name = "study-scheduler",
    about = "Spaced-repetition scheduler for certification study",
    version
)]
struct Cli {
    /// JSON config file (database path, schedule, log filter)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overrides the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Keep progress in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the next flashcard to review
    Next {
        collection: String,
        /// Number of flashcards in the collection
        #[arg(long)]
        items: usize,
    },

    /// List flashcards that are due now
    Due {
        collection: String,
        #[arg(long)]
        items: usize,
    },

    /// Grade a flashcard
    Grade {
        collection: String,
        index: usize,
        #[arg(long)]
        items: usize,
        /// Topic the card belongs to (defaults to "flashcards")
        #[arg(long)]
        topic: Option<String>,
        #[command(flatten)]
        outcome: GradeOutcome,
    },

    /// Show what each grade would do to a flashcard
    Preview {
        collection: String,
        index: usize,
        #[arg(long)]
        items: usize,
    },

    /// Put a flashcard back to bucket 1, due now
    Reset {
        collection: String,
        index: usize,
        #[arg(long)]
        items: usize,
    },

    /// Record a quiz answer
    Answer {
        collection: String,
        index: usize,
        /// Number of quiz questions in the collection
        #[arg(long)]
        items: usize,
        #[arg(long)]
        topic: Option<String>,
        #[command(flatten)]
        outcome: AnswerOutcome,
    },

    /// Quiz questions ordered weakest first
    Rank {
        collection: String,
        #[arg(long)]
        items: usize,
    },

    /// Topic accuracy, weak topics and mastery
    Stats { collection: String },

    /// Delete all stored progress for a collection
    Forget { collection: String },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct GradeOutcome {
    #[arg(long)]
    knew: bool,
    #[arg(long)]
    missed: bool,
    /// Recall quality 0-5 (3 and above counts as knew)
    #[arg(long)]
    quality: Option<i32>,
}

impl GradeOutcome {
    fn recall(&self) -> Result<Recall, String> {
        match self.quality {
            Some(q) => Recall::from_quality(q).map_err(|e| e.to_string()),
            None => Ok(Recall::from(self.knew && !self.missed)),
        }
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct AnswerOutcome {
    #[arg(long)]
    correct: bool,
    #[arg(long)]
    wrong: bool,
}

fn describe(state: &ReviewState, now: i64) -> String {
    if state.is_due(now) {
        format!("bucket {}, due now", state.bucket)
    } else {
        format!(
            "bucket {}, due in {}",
            state.bucket,
            format_delay(state.next_due_at - now)
        )
    }
}

fn join(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn load_config(cli: &Cli) -> Result<SchedulerConfig, String> {
    let mut config = match &cli.config {
        Some(path) => SchedulerConfig::load(path).map_err(|e| e.to_string())?,
        None => SchedulerConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    Ok(config)
}

fn open_session(
    cli: &Cli,
    config: &SchedulerConfig,
    collection: &str,
    size: CollectionSize,
) -> StudySession {
    let persistence = if cli.ephemeral {
        Persistence::ephemeral()
    } else {
        Persistence::open(&config.database_path)
    };
    StudySession::open(
        CollectionId::new(collection),
        size,
        config.schedule.clone(),
        persistence,
    )
}

fn cards(items: usize) -> CollectionSize {
    CollectionSize {
        cards: items,
        questions: 0,
    }
}

fn questions(items: usize) -> CollectionSize {
    CollectionSize {
        cards: 0,
        questions: items,
    }
}

fn run(cli: &Cli, config: &SchedulerConfig) -> Result<(), String> {
    let now = now_millis();
    debug!("Running command at {}", now);

    match &cli.command {
        Command::Next { collection, items } => {
            let session = open_session(cli, config, collection, cards(*items));
            match session.next_card(now).map_err(|e| e.to_string())? {
                Some(index) => {
                    let state = session.card_state(index).map_err(|e| e.to_string())?;
                    println!("Next card: {} ({})", index, describe(&state, now));
                }
                None => println!("No cards in {}", collection),
            }
        }
        Command::Due { collection, items } => {
            let session = open_session(cli, config, collection, cards(*items));
            let due = session.due_cards(now).map_err(|e| e.to_string())?;
            if due.is_empty() {
                println!("No cards due.");
            } else {
                println!("{} due: {}", due.len(), join(&due));
            }
        }
        Command::Grade {
            collection,
            index,
            items,
            topic,
            outcome,
        } => {
            let recall = outcome.recall()?;
            let mut session = open_session(cli, config, collection, cards(*items));
            let state = session
                .grade_card(*index, topic.as_deref(), recall, now)
                .map_err(|e| e.to_string())?;
            println!("Card {}: {}", index, describe(&state, now));
        }
        Command::Preview {
            collection,
            index,
            items,
        } => {
            let session = open_session(cli, config, collection, cards(*items));
            let preview = session
                .preview_card(*index, now)
                .map_err(|e| e.to_string())?;
            println!("Knew it:   {}", describe(&preview.knew, now));
            println!("Missed it: {}", describe(&preview.missed, now));
        }
        Command::Reset {
            collection,
            index,
            items,
        } => {
            let mut session = open_session(cli, config, collection, cards(*items));
            session.reset_card(*index).map_err(|e| e.to_string())?;
            println!("Card {} reset.", index);
        }
        Command::Answer {
            collection,
            index,
            items,
            topic,
            outcome,
        } => {
            let mut session = open_session(cli, config, collection, questions(*items));
            let wrong = session
                .answer_question(*index, topic.as_deref(), outcome.correct && !outcome.wrong)
                .map_err(|e| e.to_string())?;
            println!("Question {}: {} wrong so far", index, wrong);
        }
        Command::Rank { collection, items } => {
            let session = open_session(cli, config, collection, questions(*items));
            println!("{}", join(&session.quiz_order()));
        }
        Command::Stats { collection } => {
            let session = open_session(cli, config, collection, CollectionSize::default());
            let stats = session.topic_stats();
            println!("Mastery: {}% over {} answers", session.mastery_percent(), stats.total);
            for (topic, stat) in &stats.topics {
                println!("  {}: {}/{}", topic, stat.correct, stat.total);
            }
            let weak = session.weak_topics();
            if !weak.is_empty() {
                println!("Weak topics: {}", weak.join(", "));
            }
        }
        Command::Forget { collection } => {
            let session = open_session(cli, config, collection, CollectionSize::default());
            session.forget();
            println!("Forgot {}", collection);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_filter))
        .init();
    info!("Starting study scheduler...");

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("study-scheduler").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_db_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{ "database_path": "from_config.db", "log_filter": "debug" }"#,
        )
        .unwrap();
        let config_owned = config_path.to_string_lossy().to_string();
        let config_arg = config_owned.as_str();

        let cli = parse(&["--config", config_arg, "stats", "a+"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.database_path, PathBuf::from("from_config.db"));
        assert_eq!(config.log_filter, "debug");

        let cli = parse(&["--config", config_arg, "--db", "override.db", "stats", "a+"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.database_path, PathBuf::from("override.db"));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_unreadable_config_is_an_error() {
        let cli = parse(&["--config", "/nonexistent/study.json", "stats", "a+"]);
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_scheduler_errors_fail_the_command() {
        let config = SchedulerConfig::default();

        let cli = parse(&["--ephemeral", "grade", "a+", "3", "--items", "2", "--knew"]);
        let err = run(&cli, &config).unwrap_err();
        assert!(err.contains("Item 3 not found"));

        let cli = parse(&["--ephemeral", "grade", "a+", "0", "--items", "2", "--quality", "7"]);
        assert!(run(&cli, &config).is_err());

        let cli = parse(&["--ephemeral", "answer", "a+", "5", "--items", "2", "--wrong"]);
        assert!(run(&cli, &config).is_err());
    }

    #[test]
    fn test_valid_commands_succeed() {
        let config = SchedulerConfig::default();
        for args in [
            &["--ephemeral", "next", "a+", "--items", "3"][..],
            &["--ephemeral", "grade", "a+", "0", "--items", "3", "--missed", "--topic", "ports"][..],
            &["--ephemeral", "answer", "a+", "1", "--items", "2", "--correct"][..],
            &["--ephemeral", "rank", "a+", "--items", "4"][..],
        ] {
            assert!(run(&parse(args), &config).is_ok(), "failed: {:?}", args);
        }
    }

    #[test]
    fn test_grade_requires_exactly_one_outcome() {
        let base = ["study-scheduler", "grade", "a+", "0", "--items", "2"];
        assert!(Cli::try_parse_from(base).is_err());
        assert!(Cli::try_parse_from(base.iter().chain(&["--knew", "--missed"])).is_err());
    }
}
