//! mockexam CLI: randomized practice exams from a LaTeX question bank.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::BankArgs;

#[derive(Parser)]
#[command(
    name = "mockexam",
    version,
    about = "Randomized practice exams that cycle through a question bank"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an exam from unsolved questions
    Generate {
        /// Number of questions (default from config)
        #[arg(long, short = 'n')]
        count: Option<usize>,

        /// Take at most one question per topic
        #[arg(long)]
        one_per_topic: bool,

        /// RNG seed for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,

        /// Shuffle the question order of the paper
        #[arg(long)]
        shuffle: bool,

        /// Output directory for the exam paper
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[command(flatten)]
        bank: BankArgs,
    },

    /// Show solved and unsolved counts per topic
    Stats {
        #[command(flatten)]
        bank: BankArgs,
    },

    /// Mark every question unsolved again
    Reset {
        /// Also drop the session history
        #[arg(long)]
        clear_history: bool,

        /// Delete the progress file instead of rewriting it
        #[arg(long, conflicts_with = "clear_history")]
        delete: bool,

        #[command(flatten)]
        bank: BankArgs,
    },

    /// List past exam sessions, newest first
    History {
        /// Number of sessions to show
        #[arg(long, default_value = "10")]
        limit: usize,

        #[command(flatten)]
        bank: BankArgs,
    },

    /// Check the question bank for problems
    Validate {
        #[command(flatten)]
        bank: BankArgs,
    },

    /// Create a starter config and sample question file
    Init,
}

fn main() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "mockexam=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            count,
            one_per_topic,
            seed,
            shuffle,
            output,
            format,
            bank,
        } => commands::generate::execute(count, one_per_topic, seed, shuffle, output, format, bank),
        Commands::Stats { bank } => commands::stats::execute(bank),
        Commands::Reset {
            clear_history,
            delete,
            bank,
        } => commands::reset::execute(clear_history, delete, bank),
        Commands::History { limit, bank } => commands::history::execute(limit, bank),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
