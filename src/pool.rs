//! # Worker pool
//!
//! Runs [`Context::execute`] over a batch of problems. With exactly one
//! worker, problems are solved in order on the calling thread, which keeps
//! search defects reproducible without interleaving. Otherwise a dedicated
//! rayon pool is built; any parallelism the scorer itself uses stays inside
//! that pool rather than oversubscribing the machine.
//!
//! Either way, records come back in input order.

use crate::problem::Problem;
use crate::solve::{Context, Error, Record};

use rayon::prelude::*;

/// Solve every problem exactly once, returning records in input order.
///
/// `workers` of `None` (or zero) uses all available parallelism.
pub fn run(
    problems: &[Problem],
    ctx: &Context,
    workers: Option<usize>,
) -> Result<Vec<Record>, Error> {
    if workers == Some(1) {
        log::info!("solving {} problems sequentially", problems.len());
        return problems.iter().map(|p| ctx.execute(p)).collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.unwrap_or(0))
        .thread_name(|i| format!("solver-{}", i))
        .build()
        .map_err(|e| Error::Pool(e.to_string()))?;

    log::info!(
        "solving {} problems on {} workers",
        problems.len(),
        pool.current_num_threads()
    );

    pool.install(|| problems.par_iter().map(|p| ctx.execute(p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchParams;
    use crate::menu::StrategyName;
    use crate::model::Uniform;
    use crate::search::Guided;
    use crate::solve::{Counters, Outcome, Progress};
    use std::time::Duration;

    fn context() -> Context<'static> {
        Context {
            strategy: StrategyName::Beam.with_params(&SearchParams::default(), 1.0),
            searcher: &Guided,
            scorer: &Uniform,
            timeout: Duration::from_secs(30),
            max_program_len: 1,
            counters: Counters::new(),
            progress: Progress::hidden(),
        }
    }

    fn problems() -> Vec<Problem> {
        (0..12)
            .map(|i| {
                let output = if i % 3 == 0 { "[7, 7, 7, 7]" } else { "[1, 2, 3]" };
                Problem::from_line(&format!(
                    r#"{{"examples": [{{"inputs": [[3, 1, 2]], "output": {}}}], "changedOp": {}}}"#,
                    output, i
                ))
                .unwrap()
            })
            .collect()
    }

    fn summary(records: &[Record]) -> Vec<(Outcome, serde_json::Value)> {
        records
            .iter()
            .map(|r| (r.outcome.clone(), r.tag.clone()))
            .collect()
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let problems = problems();

        let ctx = context();
        let sequential = run(&problems, &ctx, Some(1)).unwrap();
        assert_eq!((ctx.counters.solved(), ctx.counters.failed()), (8, 4));

        for workers in [None, Some(0), Some(4)] {
            let ctx = context();
            let parallel = run(&problems, &ctx, workers).unwrap();
            assert_eq!(summary(&parallel), summary(&sequential));
            assert_eq!((ctx.counters.solved(), ctx.counters.failed()), (8, 4));
        }
    }

    #[test]
    fn records_keep_input_order() {
        let problems = problems();
        let records = run(&problems, &context(), Some(3)).unwrap();
        let tags: Vec<_> = records.iter().map(|r| r.tag.clone()).collect();
        let expected: Vec<_> = (0..12).map(|i| serde_json::json!(i)).collect();
        assert_eq!(tags, expected);
    }

    #[test]
    fn empty_batch() {
        let ctx = context();
        assert!(run(&[], &ctx, Some(2)).unwrap().is_empty());
        assert_eq!(ctx.counters.processed(), 0);
    }

    #[test]
    fn fatal_errors_propagate() {
        let mut problems = problems();
        problems.push(
            Problem::from_line(
                r#"{"examples": [{"inputs": [[1]], "output": [1]}], "program": "LIST|BOGUS"}"#,
            )
            .unwrap(),
        );
        assert!(matches!(
            run(&problems, &context(), Some(2)),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            run(&problems, &context(), Some(1)),
            Err(Error::Parse(_))
        ));
    }
}
