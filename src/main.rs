use swarm::main_handler;

use ansi_term::Color::*;
use clap::{builder::styling::*, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default())
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Yellow.on_default())
}

#[derive(Parser)]
#[command(
    version,
    about = format!("{} with {}",
        Purple.bold().paint("Batch program synthesis"),
        Yellow.bold().paint("🐝 Swarm"),
    ),
    long_about = None,
    styles = styles(),
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for a program for every problem in a problem set
    Solve {
        /// The problem set to solve (one JSON record per line)
        input: PathBuf,

        /// Where to write the results (one JSON record per line)
        output: PathBuf,

        /// The scoring model checkpoint to use (.json)
        model: PathBuf,

        /// The per-problem search timeout (in seconds)
        timeout: u64,

        /// The maximum number of statements in a solution
        max_program_len: usize,

        /// The number of worker threads (1 for sequential, blank for all cores)
        #[arg(short, long, value_name = "N")]
        num_workers: Option<usize>,

        /// Overrides the beam search budget
        #[arg(short, long, value_name = "N")]
        max_beam_size: Option<usize>,

        /// The search strategy to use
        #[arg(short, long, value_name = "STRATEGY", default_value = "beam")]
        search_method: swarm::menu::StrategyName,

        /// Search parameter overrides (.toml)
        #[arg(short, long, value_name = "FILE")]
        params: Option<PathBuf>,

        /// The priority bonus for following the reference program
        #[arg(short, long, value_name = "X", default_value_t = 1.0)]
        threshold: f64,

        /// Whether or not to use "quiet" mode
        #[arg(short, long, action)]
        quiet: bool,
    },

    /// Check that a problem set is well-formed without searching
    Check {
        /// The problem set to check (one JSON record per line)
        input: PathBuf,
    },
}

impl Command {
    pub fn handle(self) -> Result<(), String> {
        match self {
            Self::Solve {
                input,
                output,
                model,
                timeout,
                max_program_len,
                num_workers,
                max_beam_size,
                search_method,
                params,
                threshold,
                quiet,
            } => main_handler::solve(main_handler::SolveOptions {
                input,
                output,
                model,
                timeout: Duration::from_secs(timeout),
                max_program_len,
                workers: num_workers,
                strategy: search_method,
                params,
                max_beam_size,
                threshold,
                quiet,
            })
            .map(|_| ()),
            Self::Check { input } => main_handler::check(input),
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = cli.command.handle();

    match result {
        Ok(()) => (),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1)
        }
    }
}
