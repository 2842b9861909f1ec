use crate::*;

use ansi_term::Color::*;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn write_file(path: PathBuf, s: &str) -> Result<(), String> {
    match File::create(path) {
        Ok(mut file) => write!(file, "{}", s).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn error(msg: impl fmt::Display) -> String {
    format!("{} {}", Red.bold().paint("error:"), msg)
}

fn load_problems(input: &PathBuf) -> Result<Vec<problem::Problem>, String> {
    let src = std::fs::read_to_string(input)
        .map_err(|e| error(format!("{}: {}", input.display(), e)))?;
    problem::problem_set(&src)
        .map_err(|e| error(format!("{}: {}", input.display(), e)))
}

////////////////////////////////////////////////////////////////////////////////
// Summary

/// How many problems a run solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub solved: usize,
    pub total: usize,
}

impl Summary {
    pub fn of(records: &[solve::Record]) -> Self {
        Self {
            solved: records.iter().filter(|r| r.solved()).count(),
            total: records.len(),
        }
    }

    /// Percentage of problems solved (zero for an empty run).
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.solved as f64 / self.total as f64
        }
    }

    /// The final line printed after a run; plain text in quiet mode.
    pub fn report(&self, quiet: bool) -> String {
        if quiet {
            self.to_string()
        } else {
            Green.bold().paint(self.to_string()).to_string()
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Solved: {}/{} ({:.2}%)",
            self.solved,
            self.total,
            self.rate()
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Commands

pub struct SolveOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub model: PathBuf,
    pub timeout: Duration,
    pub max_program_len: usize,
    pub workers: Option<usize>,
    pub strategy: menu::StrategyName,
    pub params: Option<PathBuf>,
    pub max_beam_size: Option<usize>,
    pub threshold: f64,
    pub quiet: bool,
}

pub fn solve(options: SolveOptions) -> Result<Summary, String> {
    let problems = load_problems(&options.input)?;

    let mut params = match &options.params {
        Some(path) => config::SearchParams::load(path).map_err(error)?,
        None => config::SearchParams::default(),
    };
    if let Some(n) = options.max_beam_size {
        params.beam.max_beam_size = n;
    }

    let scorer = model::Checkpoint::load(&options.model)
        .map_err(error)?
        .eval();

    log::info!(
        "strategy {} on {} problems (timeout {:?}, max length {})",
        options.strategy,
        problems.len(),
        options.timeout,
        options.max_program_len
    );

    let progress = if options.quiet {
        solve::Progress::hidden()
    } else {
        solve::Progress::new(problems.len())
    };

    let ctx = solve::Context {
        strategy: options.strategy.with_params(&params, options.threshold),
        searcher: &search::Guided,
        scorer: &scorer,
        timeout: options.timeout,
        max_program_len: options.max_program_len,
        counters: solve::Counters::new(),
        progress: progress.clone(),
    };

    let records =
        pool::run(&problems, &ctx, options.workers).map_err(error)?;
    progress.finish();

    let summary = Summary::of(&records);
    log::info!("{}", summary);
    println!("{}", summary.report(options.quiet));

    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(error)?;
    write_file(options.output, &lines.join("\n")).map_err(error)?;

    Ok(summary)
}

pub fn check(input: PathBuf) -> Result<(), String> {
    let problems = load_problems(&input)?;

    let mut references = 0;
    for (i, p) in problems.iter().enumerate() {
        let prepared = solve::prepare(p)
            .map_err(|e| error(format!("problem {}: {}", i + 1, e)))?;
        if prepared.reference.is_some() {
            references += 1;
        }
    }

    println!(
        "{} {} problems ({} with a reference program)",
        Green.bold().paint("ok:"),
        problems.len(),
        references
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_format() {
        let s = Summary {
            solved: 1,
            total: 3,
        };
        assert_eq!(s.to_string(), "Solved: 1/3 (33.33%)");
    }

    #[test]
    fn empty_summary_has_zero_rate() {
        let s = Summary::of(&[]);
        assert_eq!(s.rate(), 0.0);
        assert_eq!(s.to_string(), "Solved: 0/0 (0.00%)");
    }

    #[test]
    fn quiet_report_still_has_rate() {
        let s = Summary {
            solved: 2,
            total: 4,
        };
        assert_eq!(s.report(true), "Solved: 2/4 (50.00%)");
        assert!(s.report(false).contains("Solved: 2/4 (50.00%)"));
    }
}
