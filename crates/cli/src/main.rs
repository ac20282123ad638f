//! classmap: CSS class index for a project directory
//!
//! Every command except `watch` builds the index once and prints a JSON
//! response on stdout. Logs and the progress spinner go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

mod commands;
mod progress;
mod response;

use commands::{CursorArgs, Session};
use response::{CommandResponse, ResponseMeta};

#[derive(Parser)]
#[command(name = "classmap")]
#[command(about = "Index the CSS classes defined in a project", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Hide the progress spinner
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the class index and print the rebuild summary
    Rebuild,

    /// Rebuild whenever a stylesheet or classmap.toml changes (NDJSON output)
    Watch,

    /// Class name completions at a position
    Complete {
        file: PathBuf,
        /// 1-based line
        line: usize,
        /// 1-based column; the cursor sits before this character
        column: usize,
    },

    /// Where the class under a position is defined
    Definition {
        file: PathBuf,
        line: usize,
        column: usize,
    },

    /// Every indexed class
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let started = Instant::now();
    let session = match Session::open(&cli.root, !cli.quiet) {
        Ok(session) => session,
        Err(err) => {
            return finish(CommandResponse::error(
                format!("{err:#}"),
                ResponseMeta::default(),
            ))
        }
    };

    let result = match cli.command {
        Commands::Watch => return session.watch().await,
        Commands::Rebuild => to_json(session.rebuild().await),
        Commands::Complete { file, line, column } => {
            to_json(session.complete(&CursorArgs { file, line, column }).await)
        }
        Commands::Definition { file, line, column } => {
            to_json(session.definition(&CursorArgs { file, line, column }).await)
        }
        Commands::List => to_json(session.list().await),
    };

    #[allow(clippy::cast_possible_truncation)]
    let meta = ResponseMeta {
        config_path: Some(session.config_path().display().to_string()),
        duration_ms: Some(started.elapsed().as_millis() as u64),
        index_classes: Some(session.class_count()),
    };

    let response = match result {
        Ok(data) => CommandResponse::ok(data, meta),
        Err(err) => CommandResponse::error(format!("{err:#}"), meta),
    };
    finish(response)
}

fn to_json<T: Serialize>(result: Result<T>) -> Result<Value> {
    Ok(serde_json::to_value(result?)?)
}

fn finish(response: CommandResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
