//! # Scoring models
//!
//! Search procedures are guided by a [`Scorer`], which assigns a priority to
//! every operation (function or lambda) given the current search state. The
//! solver only ever reads from a scorer, so a single instance is shared by all
//! workers.
//!
//! Trained models are stored as [`Checkpoint`]s. A checkpoint is loaded, then
//! fixed into inference mode with [`Checkpoint::eval`], which produces an
//! immutable [`PriorModel`].

use crate::core::*;
use crate::env::ProgramEnv;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

////////////////////////////////////////////////////////////////////////////////
// Scores

/// Priorities over operations for a particular search state.
#[derive(Debug, Clone, PartialEq)]
pub struct Scores(IndexMap<Operation, f64>);

impl Scores {
    pub fn new(priorities: IndexMap<Operation, f64>) -> Self {
        Self(priorities)
    }

    /// Operations missing from the scores have priority zero.
    pub fn get(&self, op: Operation) -> f64 {
        self.0.get(&op).copied().unwrap_or(0.0)
    }

    /// The priority of a statement: the product of its operations'.
    pub fn statement(&self, s: &Statement) -> f64 {
        s.operations().map(|op| self.get(op)).product()
    }
}

/// The type of scoring models.
pub trait Scorer: Sync {
    fn score(&self, env: &ProgramEnv) -> Scores;
}

/// Scores every operation equally.
pub struct Uniform;

impl Scorer for Uniform {
    fn score(&self, _env: &ProgramEnv) -> Scores {
        Scores(Operation::all().into_iter().map(|op| (op, 1.0)).collect())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Checkpoints

fn default_weight() -> f64 {
    1e-3
}

/// A serialized model.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Checkpoint {
    /// Unnormalized weight of each operation, by name
    pub prior: IndexMap<String, f64>,

    /// Per-output-type multipliers on top of the prior
    #[serde(default)]
    pub by_output_type: IndexMap<Type, IndexMap<String, f64>>,

    /// Weight of operations that the prior does not mention
    #[serde(default = "default_weight")]
    pub default_weight: f64,
}

impl Checkpoint {
    pub fn from_json(src: &str) -> Result<Self, String> {
        let checkpoint: Self =
            serde_json::from_str(src).map_err(|e| e.to_string())?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        Self::from_json(&src).map_err(|e| format!("{}: {}", path.display(), e))
    }

    fn validate(&self) -> Result<(), String> {
        let tables = std::iter::once(&self.prior)
            .chain(self.by_output_type.values());
        for table in tables {
            for (name, w) in table {
                if Operation::from_name(name).is_none() {
                    return Err(format!("unknown operation '{}'", name));
                }
                if !w.is_finite() || *w < 0.0 {
                    return Err(format!(
                        "weight of '{}' must be finite and non-negative, got {}",
                        name, w
                    ));
                }
            }
        }
        if !self.default_weight.is_finite() || self.default_weight < 0.0 {
            return Err(format!(
                "default_weight must be finite and non-negative, got {}",
                self.default_weight
            ));
        }
        Ok(())
    }

    fn weight(&self, t: Type, op: Operation) -> f64 {
        let base = self
            .prior
            .get(op.name())
            .copied()
            .unwrap_or(self.default_weight);
        let multiplier = self
            .by_output_type
            .get(&t)
            .and_then(|table| table.get(op.name()))
            .copied()
            .unwrap_or(1.0);
        base * multiplier
    }

    /// Fix the checkpoint into inference mode.
    pub fn eval(self) -> PriorModel {
        let scores = Type::all()
            .into_iter()
            .map(|t| {
                let functions = normalize(
                    Function::all()
                        .into_iter()
                        .map(Operation::Function)
                        .map(|op| (op, self.weight(t, op)))
                        .collect(),
                );
                let lambdas = normalize(
                    Lambda::all()
                        .into_iter()
                        .map(Operation::Lambda)
                        .map(|op| (op, self.weight(t, op)))
                        .collect(),
                );
                (t, Scores(functions.into_iter().chain(lambdas).collect()))
            })
            .collect();
        PriorModel { scores }
    }
}

/// Normalize weights into a distribution (uniform if they are all zero).
fn normalize(weights: Vec<(Operation, f64)>) -> Vec<(Operation, f64)> {
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let n = weights.len() as f64;
    weights
        .into_iter()
        .map(|(op, w)| (op, if total > 0.0 { w / total } else { 1.0 / n }))
        .collect()
}

////////////////////////////////////////////////////////////////////////////////
// Prior model

/// A checkpoint in inference mode: operation priorities conditioned on the
/// output type of the problem.
#[derive(Debug)]
pub struct PriorModel {
    scores: IndexMap<Type, Scores>,
}

impl Scorer for PriorModel {
    fn score(&self, env: &ProgramEnv) -> Scores {
        match self.scores.get(&env.output_type()) {
            Some(s) => s.clone(),
            None => Uniform.score(env),
        }
    }
}
