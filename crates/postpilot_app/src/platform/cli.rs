//! Command-line surface. `main` only parses; dispatch lives in
//! [`super::run`].

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Draft, refine and post short social updates to X and Reddit.
#[derive(Debug, Parser)]
#[command(name = "postpilot", version, about)]
pub struct Cli {
    /// RON settings file. Defaults to ./postpilot.ron when it exists.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where log output goes. Each command has its own default.
    #[arg(long, global = true, value_enum)]
    pub log: Option<LogTarget>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive session: prompt, generate, refine, post.
    Compose,

    /// Generate one post and publish it to X and Reddit.
    RunOnce {
        /// Prompt to generate from; the first configured prompt otherwise.
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Run `run-once` periodically, rotating through the configured prompts.
    Schedule {
        /// Minutes between runs.
        #[arg(long, value_name = "MINUTES", conflicts_with = "cron")]
        every: Option<u64>,

        /// Cron expression (5 or 6 fields), evaluated in UTC.
        #[arg(long, value_name = "EXPR")]
        cron: Option<String>,

        /// Stop after this many runs.
        #[arg(long)]
        max_runs: Option<u32>,
    },

    /// Print the latest headlines from the configured feed.
    Headlines {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}
