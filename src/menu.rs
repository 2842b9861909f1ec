use crate::config::{BeamParams, DfsParams, SearchParams};
use crate::core::Program;
use crate::env::ProgramEnv;
use crate::model::Scorer;
use crate::search::{Repair, Searcher, SolutionResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The names of the available search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyName {
    Beam,
    Dfs,
    BeamRepair,
    DfsRepair,
}

impl StrategyName {
    pub fn all() -> Vec<Self> {
        vec![Self::Beam, Self::Dfs, Self::BeamRepair, Self::DfsRepair]
    }

    pub fn is_repair(&self) -> bool {
        match self {
            Self::Beam | Self::Dfs => false,
            Self::BeamRepair | Self::DfsRepair => true,
        }
    }

    /// Attach the parameters that this strategy needs.
    pub fn with_params(
        &self,
        params: &SearchParams,
        threshold: f64,
    ) -> Strategy {
        match self {
            Self::Beam => Strategy::Beam(params.beam.clone()),
            Self::Dfs => Strategy::Dfs(params.dfs.clone()),
            Self::BeamRepair => {
                Strategy::BeamRepair(params.beam.clone(), threshold)
            }
            Self::DfsRepair => Strategy::DfsRepair(params.dfs.clone(), threshold),
        }
    }
}

impl std::str::FromStr for StrategyName {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(&format!("\"{}\"", s))
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Beam => "beam",
            Self::Dfs => "dfs",
            Self::BeamRepair => "beam_repair",
            Self::DfsRepair => "dfs_repair",
        };
        write!(f, "{}", s)
    }
}

/// A search strategy together with exactly the parameters it needs.
///
/// Repair strategies carry their acceptance threshold; the reference program
/// is per-problem and is supplied at dispatch time.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Beam(BeamParams),
    Dfs(DfsParams),
    BeamRepair(BeamParams, f64),
    DfsRepair(DfsParams, f64),
}

/// Raised when a repair strategy is dispatched without a reference program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingReference(pub StrategyName);

impl Strategy {
    pub fn name(&self) -> StrategyName {
        match self {
            Self::Beam(_) => StrategyName::Beam,
            Self::Dfs(_) => StrategyName::Dfs,
            Self::BeamRepair(_, _) => StrategyName::BeamRepair,
            Self::DfsRepair(_, _) => StrategyName::DfsRepair,
        }
    }

    /// Invoke exactly one search call on the searcher.
    pub fn dispatch(
        &self,
        searcher: &dyn Searcher,
        env: &ProgramEnv,
        max_len: usize,
        scorer: &dyn Scorer,
        timeout: Duration,
        reference: Option<&Program>,
    ) -> Result<SolutionResult, MissingReference> {
        let repair = |threshold: f64| {
            reference
                .map(|reference| Repair {
                    reference,
                    threshold,
                })
                .ok_or(MissingReference(self.name()))
        };

        Ok(match self {
            Self::Beam(params) => {
                searcher.beam(env, max_len, scorer, params, timeout)
            }
            Self::Dfs(params) => searcher.dfs(env, max_len, scorer, params, timeout),
            Self::BeamRepair(params, threshold) => searcher.beam_repair(
                env,
                max_len,
                scorer,
                params,
                timeout,
                &repair(*threshold)?,
            ),
            Self::DfsRepair(params, threshold) => searcher.dfs_repair(
                env,
                max_len,
                scorer,
                params,
                timeout,
                &repair(*threshold)?,
            ),
        })
    }
}
