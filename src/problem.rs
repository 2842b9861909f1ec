//! # Problem records
//!
//! A problem set is a line-delimited file of JSON objects, one problem per
//! line:
//!
//! ```text
//! {"examples": [{"inputs": [3, [1, 2, 3]], "output": [1, 2, 3]}], "program": "INT|LIST|TAKE,0,1", "changedOp": "DROP"}
//! ```
//!
//! The `program` is an optional reference program (required by repair
//! strategies) and `changedOp` is an opaque tag that is copied to the result
//! record untouched.

use crate::core::*;

use serde::{Deserialize, Serialize};

/// A single input/output example, exactly as it appears in the problem file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawExample {
    pub inputs: Vec<serde_json::Value>,
    pub output: serde_json::Value,
}

/// A single input/output example, with typed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub inputs: Vec<Value>,
    pub output: Value,
}

impl Example {
    pub fn construct(raw: &RawExample) -> Result<Self, ValueError> {
        Ok(Self {
            inputs: raw
                .inputs
                .iter()
                .map(Value::construct)
                .collect::<Result<_, _>>()?,
            output: Value::construct(&raw.output)?,
        })
    }
}

/// The unit of work.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Problem {
    pub examples: Vec<RawExample>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(rename = "changedOp", default)]
    pub tag: serde_json::Value,
}

impl Problem {
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Construct typed values for every example.
    pub fn examples(&self) -> Result<Vec<Example>, ValueError> {
        self.examples.iter().map(Example::construct).collect()
    }

    /// Infer the input types of the problem from its first example.
    ///
    /// Later examples are not consulted.
    pub fn input_types(&self) -> Result<Vec<Type>, ValueError> {
        let first = self
            .examples
            .first()
            .ok_or_else(|| ValueError("problem has no examples".to_owned()))?;
        first
            .inputs
            .iter()
            .map(|x| Value::construct(x).map(|v| v.typ()))
            .collect()
    }
}

/// Parse a line-delimited problem set (blank lines are skipped).
pub fn problem_set(src: &str) -> Result<Vec<Problem>, String> {
    src.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            Problem::from_line(line.trim_end())
                .map_err(|e| format!("line {}: {}", i + 1, e))
        })
        .collect()
}
