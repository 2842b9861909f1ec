//! # Solving a single problem
//!
//! The [`Context`] holds everything a worker needs to solve problems: the
//! strategy, the searcher and scoring model, the limits, and handles to the
//! shared [`Counters`]. [`Context::execute`] runs the per-problem protocol:
//! parse the reference program, build the search environment, dispatch the
//! search, then classify and encode the outcome into a [`Record`].

use crate::codegen;
use crate::core::{Program, ValueError};
use crate::env::{self, ProgramEnv};
use crate::menu::{MissingReference, Strategy, StrategyName};
use crate::model::Scorer;
use crate::parse;
use crate::problem::Problem;
use crate::search::{SearchStats, Searcher};
use crate::typecheck;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

////////////////////////////////////////////////////////////////////////////////
// Errors

/// Errors that abort a run (as opposed to search failures, which do not).
#[derive(Debug)]
pub enum Error {
    /// The reference program does not parse
    Parse(String),
    /// The reference program is ill-formed
    Type(typecheck::Error),
    /// Example data is not a DSL value
    Value(ValueError),
    /// Examples disagree on their types
    Env(env::Error),
    MissingReference(StrategyName),
    Pool(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "reference program: {}", e),
            Error::Type(e) => write!(f, "reference program: {}", e),
            Error::Value(e) => write!(f, "examples: {}", e),
            Error::Env(e) => write!(f, "examples: {}", e),
            Error::MissingReference(name) => {
                write!(f, "strategy '{}' requires a reference program", name)
            }
            Error::Pool(e) => write!(f, "worker pool: {}", e),
        }
    }
}

impl From<MissingReference> for Error {
    fn from(e: MissingReference) -> Self {
        Error::MissingReference(e.0)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Shared state

/// Handles to the solved/failed counters shared by every worker.
///
/// Clones share the same underlying counts.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    solved: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn solved(&self) -> usize {
        self.solved.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> usize {
        self.solved() + self.failed()
    }

    fn record_solved(&self) {
        self.solved.fetch_add(1, Ordering::SeqCst);
    }

    fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// The running "solved so far" display.
#[derive(Clone)]
pub struct Progress(ProgressBar);

impl Progress {
    pub fn new(total: usize) -> Self {
        let style = ProgressStyle::with_template(
            "Solving problems... {pos}/{len} [{bar:40}] {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        Self(ProgressBar::new(total as u64).with_style(style))
    }

    pub fn hidden() -> Self {
        Self(ProgressBar::hidden())
    }

    pub fn observe(&self, counters: &Counters) {
        let (solved, failed) = (counters.solved(), counters.failed());
        log::debug!("solved {} (failed: {})", solved, failed);
        self.0.set_position((solved + failed) as u64);
        self.0.set_message(format!("solved {} (failed: {})", solved, failed));
    }

    pub fn finish(&self) {
        self.0.finish();
    }
}

////////////////////////////////////////////////////////////////////////////////
// Results

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved(String),
    Failed,
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Solved(encoded) => s.serialize_str(encoded),
            Outcome::Failed => s.serialize_str("Failed"),
        }
    }
}

/// The result of solving one problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "result")]
    pub outcome: Outcome,
    #[serde(flatten)]
    pub stats: SearchStats,
    #[serde(rename = "changedOp")]
    pub tag: serde_json::Value,
}

impl Record {
    pub fn solved(&self) -> bool {
        matches!(self.outcome, Outcome::Solved(_))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Execution

/// What a problem looks like once its inputs have been validated.
pub struct Prepared {
    pub reference: Option<Program>,
    pub env: ProgramEnv,
}

/// Parse and check a problem's reference program, and build its search
/// environment.
pub fn prepare(problem: &Problem) -> Result<Prepared, Error> {
    let reference = match &problem.program {
        Some(src) => {
            let program = parse::program(src).map_err(Error::Parse)?;
            typecheck::program(&program).map_err(Error::Type)?;
            Some(program)
        }
        None => None,
    };

    let examples = problem.examples().map_err(Error::Value)?;
    let env = ProgramEnv::new(&examples).map_err(Error::Env)?;

    Ok(Prepared { reference, env })
}

/// Per-worker configuration. Everything but the counters is read-only.
pub struct Context<'a> {
    pub strategy: Strategy,
    pub searcher: &'a dyn Searcher,
    pub scorer: &'a dyn Scorer,
    pub timeout: Duration,
    pub max_program_len: usize,
    pub counters: Counters,
    pub progress: Progress,
}

impl Context<'_> {
    pub fn execute(&self, problem: &Problem) -> Result<Record, Error> {
        let Prepared { reference, env } = prepare(problem)?;

        let solution = self.strategy.dispatch(
            self.searcher,
            &env,
            self.max_program_len,
            self.scorer,
            self.timeout,
            reference.as_ref(),
        )?;

        let outcome = match solution.program {
            None => {
                self.counters.record_failed();
                Outcome::Failed
            }
            Some(statements) => {
                let input_types = problem.input_types().map_err(Error::Value)?;
                let encoded =
                    codegen::encode(&Program::new(input_types, statements));
                log::debug!("solved: {}", encoded);
                self.counters.record_solved();
                Outcome::Solved(encoded)
            }
        };

        self.progress.observe(&self.counters);

        Ok(Record {
            outcome,
            stats: solution.stats,
            tag: problem.tag.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchParams;
    use crate::menu::StrategyName;
    use crate::model::Uniform;
    use crate::search::Guided;

    fn problem(line: &str) -> Problem {
        Problem::from_line(line).unwrap()
    }

    fn context(strategy: StrategyName) -> Context<'static> {
        Context {
            strategy: strategy.with_params(&SearchParams::default(), 1.0),
            searcher: &Guided,
            scorer: &Uniform,
            timeout: Duration::from_secs(30),
            max_program_len: 1,
            counters: Counters::new(),
            progress: Progress::hidden(),
        }
    }

    #[test]
    fn solved_record() {
        let ctx = context(StrategyName::Beam);
        let record = ctx
            .execute(&problem(
                r#"{"examples": [{"inputs": [[3, 1, 2]], "output": [1, 2, 3]}], "changedOp": "SORT"}"#,
            ))
            .unwrap();
        assert_eq!(record.outcome, Outcome::Solved("LIST|SORT,0".to_owned()));
        assert_eq!(record.tag, serde_json::json!("SORT"));
        assert_eq!((ctx.counters.solved(), ctx.counters.failed()), (1, 0));
    }

    #[test]
    fn failed_record() {
        let ctx = context(StrategyName::Dfs);
        let record = ctx
            .execute(&problem(
                r#"{"examples": [{"inputs": [[3, 1, 2]], "output": [9, 9, 9, 9]}], "changedOp": 4}"#,
            ))
            .unwrap();
        assert_eq!(record.outcome, Outcome::Failed);
        assert_eq!(record.tag, serde_json::json!(4));
        assert_eq!((ctx.counters.solved(), ctx.counters.failed()), (0, 1));
    }

    #[test]
    fn malformed_reference_is_fatal() {
        let ctx = context(StrategyName::Beam);
        let e = ctx
            .execute(&problem(
                r#"{"examples": [{"inputs": [[1]], "output": [1]}], "program": "LIST|NOPE,0"}"#,
            ))
            .unwrap_err();
        assert!(matches!(e, Error::Parse(_)));

        let e = ctx
            .execute(&problem(
                r#"{"examples": [{"inputs": [[1]], "output": [1]}], "program": "LIST|SORT,4"}"#,
            ))
            .unwrap_err();
        assert!(matches!(e, Error::Type(_)));
        assert_eq!(ctx.counters.processed(), 0);
    }

    #[test]
    fn malformed_examples_are_fatal() {
        let ctx = context(StrategyName::Beam);
        let e = ctx
            .execute(&problem(
                r#"{"examples": [{"inputs": ["x"], "output": [1]}]}"#,
            ))
            .unwrap_err();
        assert!(matches!(e, Error::Value(_)));
    }

    #[test]
    fn repair_requires_reference() {
        let ctx = context(StrategyName::BeamRepair);
        let e = ctx
            .execute(&problem(
                r#"{"examples": [{"inputs": [[1]], "output": [1]}]}"#,
            ))
            .unwrap_err();
        assert!(matches!(e, Error::MissingReference(StrategyName::BeamRepair)));
    }

    #[test]
    fn record_serialization() {
        let record = Record {
            outcome: Outcome::Failed,
            stats: SearchStats {
                explored: 3,
                elapsed: Duration::from_millis(1500),
            },
            tag: serde_json::json!({"op": "MAP"}),
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "result": "Failed",
                "explored": 3,
                "time": 1.5,
                "changedOp": {"op": "MAP"}
            })
        );
    }
}
