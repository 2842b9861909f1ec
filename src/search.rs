//! # Search
//!
//! Search procedures look for a statement sequence that maps every example's
//! inputs to its output. They are exposed through the [`Searcher`] trait, which
//! has one entry point per strategy; the solver picks between them in
//! [`crate::menu`].
//!
//! Every entry point takes a timeout and enforces it itself: when the deadline
//! passes, the search gives up and reports that nothing was found.

use crate::config::{BeamParams, DfsParams};
use crate::core::*;
use crate::env::ProgramEnv;
use crate::model::Scorer;
use crate::util::{Timer, TimerExpired};

use serde::{Serialize, Serializer};
use std::time::Duration;

////////////////////////////////////////////////////////////////////////////////
// Results

fn seconds<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Bookkeeping about a single search call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStats {
    /// The number of candidate statements tried
    pub explored: usize,

    /// Wall-clock time spent searching
    #[serde(rename = "time", serialize_with = "seconds")]
    pub elapsed: Duration,
}

/// The result of a search call.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionResult {
    /// The statements found, if any (no input types are declared)
    pub program: Option<Vec<Statement>>,
    pub stats: SearchStats,
}

impl SolutionResult {
    pub fn found(&self) -> bool {
        self.program.is_some()
    }
}

/// What repair-style searches are given in addition to the examples.
#[derive(Debug, Clone)]
pub struct Repair<'a> {
    /// A reference program to stay close to
    pub reference: &'a Program,

    /// The priority bonus for following the reference program
    pub threshold: f64,
}

////////////////////////////////////////////////////////////////////////////////
// Searchers

/// The type of search procedures.
pub trait Searcher: Sync {
    fn beam(
        &self,
        env: &ProgramEnv,
        max_len: usize,
        scorer: &dyn Scorer,
        params: &BeamParams,
        timeout: Duration,
    ) -> SolutionResult;

    fn dfs(
        &self,
        env: &ProgramEnv,
        max_len: usize,
        scorer: &dyn Scorer,
        params: &DfsParams,
        timeout: Duration,
    ) -> SolutionResult;

    fn beam_repair(
        &self,
        env: &ProgramEnv,
        max_len: usize,
        scorer: &dyn Scorer,
        params: &BeamParams,
        timeout: Duration,
        repair: &Repair,
    ) -> SolutionResult;

    fn dfs_repair(
        &self,
        env: &ProgramEnv,
        max_len: usize,
        scorer: &dyn Scorer,
        params: &DfsParams,
        timeout: Duration,
        repair: &Repair,
    ) -> SolutionResult;
}

/// Model-guided search over the candidate statements of an environment.
pub struct Guided;

impl Searcher for Guided {
    fn beam(
        &self,
        env: &ProgramEnv,
        max_len: usize,
        scorer: &dyn Scorer,
        params: &BeamParams,
        timeout: Duration,
    ) -> SolutionResult {
        Search::new(scorer, None, timeout).beam(env, max_len, params)
    }

    fn dfs(
        &self,
        env: &ProgramEnv,
        max_len: usize,
        scorer: &dyn Scorer,
        params: &DfsParams,
        timeout: Duration,
    ) -> SolutionResult {
        Search::new(scorer, None, timeout).dfs(env, max_len, params)
    }

    fn beam_repair(
        &self,
        env: &ProgramEnv,
        max_len: usize,
        scorer: &dyn Scorer,
        params: &BeamParams,
        timeout: Duration,
        repair: &Repair,
    ) -> SolutionResult {
        Search::new(scorer, Some(repair), timeout).beam(env, max_len, params)
    }

    fn dfs_repair(
        &self,
        env: &ProgramEnv,
        max_len: usize,
        scorer: &dyn Scorer,
        params: &DfsParams,
        timeout: Duration,
        repair: &Repair,
    ) -> SolutionResult {
        Search::new(scorer, Some(repair), timeout).dfs(env, max_len, params)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Implementation

enum Round {
    Found(Vec<Statement>),
    /// Some candidates were cut, so a wider round might succeed
    Pruned,
    /// Nothing was cut, so the whole space was searched
    Exhausted,
}

struct Search<'a> {
    scorer: &'a dyn Scorer,
    repair: Option<&'a Repair<'a>>,
    timer: Timer,
    explored: usize,
}

impl<'a> Search<'a> {
    fn new(
        scorer: &'a dyn Scorer,
        repair: Option<&'a Repair<'a>>,
        timeout: Duration,
    ) -> Self {
        Self {
            scorer,
            repair,
            timer: Timer::finite(timeout),
            explored: 0,
        }
    }

    fn finish(self, program: Option<Vec<Statement>>) -> SolutionResult {
        SolutionResult {
            program,
            stats: SearchStats {
                explored: self.explored,
                elapsed: self.timer.elapsed(),
            },
        }
    }

    /// Candidate statements, best first.
    ///
    /// Under repair, the statement the reference program takes at this depth
    /// gets a bonus. Ties keep candidate order.
    fn ranked(&self, env: &ProgramEnv) -> Vec<(Statement, f64)> {
        let scores = self.scorer.score(env);
        let hint = self.repair.and_then(|r| {
            r.reference
                .statements
                .get(env.depth())
                .map(|s| (s, r.threshold))
        });

        let mut ranked: Vec<_> = env
            .candidates()
            .into_iter()
            .map(|s| {
                let mut p = scores.statement(&s);
                if let Some((h, bonus)) = hint {
                    if *h == s {
                        p += bonus;
                    }
                }
                (s, p)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    fn beam(
        mut self,
        env: &ProgramEnv,
        max_len: usize,
        params: &BeamParams,
    ) -> SolutionResult {
        let mut beam_size = params.beam_size.max(1);
        let mut width = params.width.max(1);

        let program = loop {
            if beam_size > params.max_beam_size {
                break None;
            }
            match self.beam_round(env, max_len, beam_size, width) {
                Ok(Round::Found(p)) => break Some(p),
                Ok(Round::Exhausted) => break None,
                Err(TimerExpired) => {
                    log::debug!("beam search timed out at size {}", beam_size);
                    break None;
                }
                Ok(Round::Pruned) => {
                    log::debug!(
                        "beam round (size {}, width {}) found nothing",
                        beam_size,
                        width
                    );
                    beam_size = beam_size.saturating_mul(2);
                    width = width.saturating_add(params.width_growth);
                }
            }
        };

        self.finish(program)
    }

    fn beam_round(
        &mut self,
        env: &ProgramEnv,
        max_len: usize,
        beam_size: usize,
        width: usize,
    ) -> Result<Round, TimerExpired> {
        let mut beam = vec![(env.clone(), 0.0)];
        let mut pruned = false;

        for _ in env.depth()..max_len {
            let mut next = vec![];
            for (state, log_p) in &beam {
                self.timer.tick()?;
                let ranked = self.ranked(state);
                if ranked.len() > width {
                    pruned = true;
                }
                for (s, p) in ranked.into_iter().take(width) {
                    self.explored += 1;
                    let child = match state.step(&s) {
                        Some(child) => child,
                        None => continue,
                    };
                    if child.solved() {
                        return Ok(Round::Found(child.statements().to_vec()));
                    }
                    next.push((child, log_p + p.ln()));
                }
            }

            next.sort_by(|a, b| b.1.total_cmp(&a.1));
            if next.len() > beam_size {
                pruned = true;
                next.truncate(beam_size);
            }
            if next.is_empty() {
                break;
            }
            beam = next;
        }

        Ok(if pruned {
            Round::Pruned
        } else {
            Round::Exhausted
        })
    }

    fn dfs(
        mut self,
        env: &ProgramEnv,
        max_len: usize,
        params: &DfsParams,
    ) -> SolutionResult {
        let program = match self.dfs_from(env, max_len, params.max_width) {
            Ok(p) => p,
            Err(TimerExpired) => {
                log::debug!("depth-first search timed out");
                None
            }
        };
        self.finish(program)
    }

    fn dfs_from(
        &mut self,
        env: &ProgramEnv,
        max_len: usize,
        max_width: usize,
    ) -> Result<Option<Vec<Statement>>, TimerExpired> {
        self.timer.tick()?;
        if env.depth() >= max_len {
            return Ok(None);
        }
        for (s, _) in self.ranked(env).into_iter().take(max_width) {
            self.explored += 1;
            let child = match env.step(&s) {
                Some(child) => child,
                None => continue,
            };
            if child.solved() {
                return Ok(Some(child.statements().to_vec()));
            }
            if let Some(p) = self.dfs_from(&child, max_len, max_width)? {
                return Ok(Some(p));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Checkpoint, Uniform};
    use crate::problem::Example;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn l(xs: &[i64]) -> Value {
        Value::List(xs.to_vec())
    }

    /// Sort the list, then double every element.
    fn sort_double_env() -> ProgramEnv {
        ProgramEnv::new(&[
            Example {
                inputs: vec![l(&[3, 1, 2])],
                output: l(&[2, 4, 6]),
            },
            Example {
                inputs: vec![l(&[-5, 7])],
                output: l(&[-10, 14]),
            },
        ])
        .unwrap()
    }

    fn check(env: &ProgramEnv, result: &SolutionResult) {
        let statements = result.program.clone().unwrap();
        let mut state = env.clone();
        for s in &statements {
            state = state.step(s).unwrap();
        }
        assert!(state.solved());
    }

    #[test]
    fn beam_finds_solution() {
        let env = sort_double_env();
        let result = Guided.beam(&env, 2, &Uniform, &BeamParams::default(), TIMEOUT);
        assert!(result.found());
        check(&env, &result);
        assert!(result.stats.explored > 0);
    }

    #[test]
    fn dfs_finds_solution() {
        let env = sort_double_env();
        let result = Guided.dfs(&env, 2, &Uniform, &DfsParams::default(), TIMEOUT);
        assert!(result.found());
        check(&env, &result);
    }

    #[test]
    fn guidance_changes_what_is_found_first() {
        let env = sort_double_env();
        let model = Checkpoint::from_json(
            r#"{"prior": {"MAP": 1.0, "SORT": 1.0, "*2": 1.0}, "default_weight": 0.0}"#,
        )
        .unwrap()
        .eval();
        let result = Guided.dfs(&env, 2, &model, &DfsParams { max_width: 2 }, TIMEOUT);
        let program = result.program.unwrap();
        assert_eq!(program.len(), 2);
        assert!(program.iter().any(|s| s.function == Function::Sort));
        assert!(program.iter().any(|s| s.function == Function::Map));
    }

    #[test]
    fn nothing_found_within_length() {
        let env = sort_double_env();
        let result = Guided.beam(&env, 1, &Uniform, &BeamParams::default(), TIMEOUT);
        assert!(!result.found());
        let result = Guided.dfs(&env, 1, &Uniform, &DfsParams::default(), TIMEOUT);
        assert!(!result.found());
    }

    #[test]
    fn repair_follows_reference() {
        let env = ProgramEnv::new(&[Example {
            inputs: vec![l(&[3, 1, 2])],
            output: l(&[1, 2, 3]),
        }])
        .unwrap();
        let reference = Program::new(
            vec![Type::List],
            vec![Statement::new(Function::Sort, vec![Arg::Var(0)])],
        );
        let narrow = BeamParams {
            beam_size: 1,
            width: 1,
            width_growth: 0,
            max_beam_size: 1,
        };

        // Unguided, the single widest-ranked candidate (HEAD) is not a solution
        let plain = Guided.beam(&env, 1, &Uniform, &narrow, TIMEOUT);
        assert!(!plain.found());

        let repair = Repair {
            reference: &reference,
            threshold: 1.0,
        };
        let repaired =
            Guided.beam_repair(&env, 1, &Uniform, &narrow, TIMEOUT, &repair);
        assert_eq!(repaired.program, Some(reference.statements.clone()));

        let repaired = Guided.dfs_repair(
            &env,
            1,
            &Uniform,
            &DfsParams { max_width: 1 },
            TIMEOUT,
            &repair,
        );
        assert_eq!(repaired.program, Some(reference.statements));
    }

    #[test]
    fn large_lists_are_searched_without_overflow() {
        let env = ProgramEnv::new(&[Example {
            inputs: vec![l(&[200; 10])],
            output: Value::Int(7),
        }])
        .unwrap();
        let result = Guided.dfs(&env, 1, &Uniform, &DfsParams::default(), TIMEOUT);
        assert!(!result.found());
        let result =
            Guided.beam(&env, 2, &Uniform, &BeamParams::default(), TIMEOUT);
        assert!(!result.found());
    }
}
