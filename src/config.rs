//! # Search parameters
//!
//! Every parameter has a default; a TOML file may override any subset of
//! them:
//!
//! ```toml
//! [beam]
//! beam_size = 100
//! width = 10
//! width_growth = 10
//! max_beam_size = 819200
//!
//! [dfs]
//! max_width = 50
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of (complete anytime) beam search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeamParams {
    /// The beam size of the first round
    pub beam_size: usize,

    /// The number of children expanded per state in the first round
    pub width: usize,

    /// How much the width grows after each round
    pub width_growth: usize,

    /// Search stops once the beam size would exceed this bound
    pub max_beam_size: usize,
}

impl Default for BeamParams {
    fn default() -> Self {
        Self {
            beam_size: 100,
            width: 10,
            width_growth: 10,
            max_beam_size: 819200,
        }
    }
}

/// Parameters of depth-first search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DfsParams {
    /// The number of children tried per state
    pub max_width: usize,
}

impl Default for DfsParams {
    fn default() -> Self {
        Self { max_width: 50 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchParams {
    pub beam: BeamParams,
    pub dfs: DfsParams,
}

impl SearchParams {
    pub fn from_toml(src: &str) -> Result<Self, String> {
        toml::from_str(src).map_err(|e| e.to_string())
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        Self::from_toml(&src).map_err(|e| format!("{}: {}", path.display(), e))
    }
}
