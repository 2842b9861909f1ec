//! # Code generation
//!
//! After search, a bare statement sequence is combined with the inferred input
//! types and encoded into the canonical textual form that [`crate::parse`]
//! reads back. Encoding is a pure function of the program.

use crate::core::*;

fn arg(a: &Arg) -> String {
    match a {
        Arg::Lambda(l) => l.name().to_owned(),
        Arg::Var(i) => i.to_string(),
    }
}

/// Encode a single statement (e.g. `MAP,*2,0`)
pub fn statement(s: &Statement) -> String {
    std::iter::once(s.function.name().to_owned())
        .chain(s.args.iter().map(arg))
        .collect::<Vec<_>>()
        .join(",")
}

/// Encode a program (e.g. `LIST|MAP,*2,0|SORT,1`)
pub fn encode(p: &Program) -> String {
    p.input_types
        .iter()
        .map(|t| t.name().to_owned())
        .chain(p.statements.iter().map(statement))
        .collect::<Vec<_>>()
        .join("|")
}
