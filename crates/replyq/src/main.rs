// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replyq - a posting queue engine for approved replies.
//!
//! This is the binary entry point: operator commands for managing the queue
//! plus `run`, which executes one posting batch.

use clap::{Parser, Subcommand};

mod ops;
mod run;

/// Replyq - a posting queue engine for approved replies.
#[derive(Parser, Debug)]
#[command(name = "replyq", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one posting batch.
    Run {
        /// Per-batch item budget. Defaults to `poster.batch_max_items`.
        #[arg(long)]
        max_items: Option<u32>,
    },
    /// Add a reply to the queue.
    Enqueue {
        /// Identifier of the post being replied to.
        #[arg(long)]
        target: String,
        /// The reply text.
        #[arg(long)]
        text: String,
        /// Identifier of the originating draft, if any.
        #[arg(long)]
        draft: Option<String>,
        /// Entry source: approved, manual, or backfill.
        #[arg(long, default_value = "approved")]
        source: String,
        /// Explicit priority; higher runs sooner. Defaults by source.
        #[arg(long)]
        priority: Option<i64>,
    },
    /// Show queue counts per status.
    Stats {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// List queue entries, newest first.
    List {
        /// Only show entries with this status.
        #[arg(long)]
        status: Option<String>,
        /// Maximum number of entries to show.
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Requeue failed entries for another attempt.
    Retry {
        /// Entry ids, comma separated or repeated.
        #[arg(long, required = true, value_delimiter = ',')]
        ids: Vec<i64>,
    },
    /// Cancel pending entries.
    Cancel {
        /// Entry ids, comma separated or repeated.
        #[arg(long, required = true, value_delimiter = ',')]
        ids: Vec<i64>,
    },
    /// Change the priority of pending entries.
    SetPriority {
        /// Entry ids, comma separated or repeated.
        #[arg(long, required = true, value_delimiter = ',')]
        ids: Vec<i64>,
        /// The new priority.
        #[arg(long)]
        priority: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match replyq_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            replyq_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run { max_items } => run::run_batch(&config, max_items).await,
        Commands::Enqueue {
            target,
            text,
            draft,
            source,
            priority,
        } => ops::enqueue(&config, target, text, draft, &source, priority).await,
        Commands::Stats { json } => ops::stats(&config, json).await,
        Commands::List { status, limit } => ops::list(&config, status.as_deref(), limit).await,
        Commands::Retry { ids } => ops::retry(&config, &ids).await,
        Commands::Cancel { ids } => ops::cancel(&config, &ids).await,
        Commands::SetPriority { ids, priority } => {
            ops::set_priority(&config, &ids, priority).await
        }
    };

    if let Err(err) = result {
        eprintln!("replyq: {err}");
        std::process::exit(1);
    }
}
