//! Trivia command-line front end.
//!
//! # Responsibility
//! - Translate subcommands into API requests against a local SQLite store.
//! - Print the same JSON envelopes the API boundary returns.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rusqlite::Connection;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use trivia_core::db::open_db;
use trivia_core::db::seed::seed_default_categories;
use trivia_core::{
    init_logging, ApiRequest, Dispatcher, SqliteCategoryRepository, SqliteQuestionRepository,
    TriviaConfig, TriviaService,
};

#[derive(Parser)]
#[command(name = "trivia")]
#[command(version)]
#[command(about = "Trivia quiz store: browse, search and play questions")]
struct Cli {
    /// Path to the SQLite database (overrides TRIVIA_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory for rolling log files (overrides TRIVIA_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides TRIVIA_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage
    Ping,

    /// Insert the default categories into an empty store
    Seed,

    /// List all categories
    Categories,

    /// List one page of questions
    Questions {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Case-insensitive search over question text
    Search { term: String },

    /// List questions in one category
    Category { id: i64 },

    /// Draw the next quiz question
    Quiz {
        /// Restrict to one category (0 plays all)
        #[arg(short, long)]
        category: Option<i64>,

        /// Ids already asked, comma separated
        #[arg(short, long, value_delimiter = ',')]
        previous: Vec<i64>,

        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Add a question
    Add {
        #[arg(short, long)]
        question: String,

        #[arg(short, long)]
        answer: String,

        #[arg(short, long)]
        category: i64,

        #[arg(short, long)]
        difficulty: u8,
    },

    /// Delete a question by id
    Delete { id: i64 },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &absolute(log_dir)?)
            .context("failed to initialize logging")?;
    }

    match cli.command {
        Commands::Ping => {
            println!("trivia_core ping={}", trivia_core::ping());
            println!("trivia_core version={}", trivia_core::core_version());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Seed => {
            let mut conn = open_store(&config)?;
            let inserted = seed_default_categories(&mut conn)?;
            println!("{}", json!({"success": true, "inserted": inserted}));
            Ok(ExitCode::SUCCESS)
        }
        command => run_api_command(&config, command),
    }
}

fn run_api_command(config: &TriviaConfig, command: Commands) -> anyhow::Result<ExitCode> {
    let Some((request, seed)) = build_request(command) else {
        anyhow::bail!("command does not map to an API request");
    };

    let conn = open_store(config)?;
    let service = TriviaService::with_page_size(
        SqliteQuestionRepository::try_new(&conn)?,
        SqliteCategoryRepository::try_new(&conn)?,
        config.page_size,
    );
    let dispatcher = Dispatcher::new(&service);

    let mut rng: Box<dyn RngCore> = match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    let response = dispatcher.dispatch(&request, &mut *rng);
    info!(
        "event=cli_command module=cli status=done method={} path={} code={}",
        request.method, request.path, response.status
    );
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn open_store(config: &TriviaConfig) -> anyhow::Result<Connection> {
    open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))
}

fn resolve_config(cli: &Cli) -> anyhow::Result<TriviaConfig> {
    let mut config = TriviaConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

fn build_request(command: Commands) -> Option<(ApiRequest, Option<u64>)> {
    let request = match command {
        Commands::Categories => (ApiRequest::get("/categories"), None),
        Commands::Questions { page } => {
            (ApiRequest::get(&format!("/questions?page={page}")), None)
        }
        Commands::Search { term } => (
            ApiRequest::post("/questions", json!({"searchTerm": term})),
            None,
        ),
        Commands::Category { id } => {
            (ApiRequest::get(&format!("/categories/{id}/questions")), None)
        }
        Commands::Quiz {
            category,
            previous,
            seed,
        } => (
            ApiRequest::post(
                "/quizzes",
                json!({
                    "previous_questions": previous,
                    "quiz_category": {"id": category.unwrap_or(0)},
                }),
            ),
            seed,
        ),
        Commands::Add {
            question,
            answer,
            category,
            difficulty,
        } => (
            ApiRequest::post(
                "/questions",
                json!({
                    "question": question,
                    "answer": answer,
                    "category": category,
                    "difficulty": difficulty,
                }),
            ),
            None,
        ),
        Commands::Delete { id } => (ApiRequest::delete(&format!("/questions/{id}")), None),
        Commands::Ping | Commands::Seed => return None,
    };
    Some(request)
}
