//! # Search environments
//!
//! A [`ProgramEnv`] is the state that search procedures walk over: the values
//! of every variable on every example, together with the statements that
//! produced them. Environments are immutable; [`ProgramEnv::step`] returns a
//! new environment with one more statement.

use crate::core::*;
use crate::problem::Example;
use crate::typecheck;
use crate::util;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error(pub String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ProgramEnv {
    outputs: Vec<Value>,
    /// `vars[e][i]` is the value of variable `i` on example `e`.
    vars: Vec<Vec<Value>>,
    types: Vec<Type>,
    input_count: usize,
    statements: Vec<Statement>,
}

impl ProgramEnv {
    /// Build the initial environment for a set of examples.
    ///
    /// All examples must agree on input arity, input types, and output type.
    pub fn new(examples: &[Example]) -> Result<Self, Error> {
        let first = examples
            .first()
            .ok_or_else(|| Error("no examples".to_owned()))?;

        let types: Vec<Type> = first.inputs.iter().map(Value::typ).collect();
        let output_type = first.output.typ();

        for (i, ex) in examples.iter().enumerate() {
            let ex_types: Vec<Type> = ex.inputs.iter().map(Value::typ).collect();
            if ex_types != types {
                return Err(Error(format!(
                    "example {} has input types {:?}, expected {:?}",
                    i, ex_types, types
                )));
            }
            if ex.output.typ() != output_type {
                return Err(Error(format!(
                    "example {} has output type {}, expected {}",
                    i,
                    ex.output.typ(),
                    output_type
                )));
            }
        }

        Ok(Self {
            outputs: examples.iter().map(|ex| ex.output.clone()).collect(),
            vars: examples.iter().map(|ex| ex.inputs.clone()).collect(),
            input_count: types.len(),
            types,
            statements: vec![],
        })
    }

    /// The types of all variables (inputs first).
    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn input_types(&self) -> &[Type] {
        &self.types[..self.input_count]
    }

    pub fn output_type(&self) -> Type {
        self.outputs[0].typ()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// The number of statements taken so far.
    pub fn depth(&self) -> usize {
        self.statements.len()
    }

    pub fn example_count(&self) -> usize {
        self.outputs.len()
    }

    /// Every well-typed statement over the current variables.
    ///
    /// The order is deterministic: functions in canonical order, then the
    /// cartesian product of each parameter's choices.
    pub fn candidates(&self) -> Vec<Statement> {
        let mut ret = vec![];
        for f in Function::all() {
            let choices: Vec<Vec<Arg>> = f
                .signature()
                .params
                .iter()
                .map(|p| match p {
                    Param::Lambda(kind) => Lambda::of_kind(*kind)
                        .into_iter()
                        .map(Arg::Lambda)
                        .collect(),
                    Param::Var(t) => self
                        .types
                        .iter()
                        .enumerate()
                        .filter(|(_, vt)| *vt == t)
                        .map(|(i, _)| Arg::Var(i))
                        .collect(),
                })
                .collect();
            for args in util::cartesian_product(&choices) {
                ret.push(Statement::new(f, args));
            }
        }
        ret
    }

    /// Take a statement, evaluating it on every example.
    ///
    /// Returns `None` if the statement is ill-typed here, has no value on some
    /// example, or merely recomputes an existing variable.
    pub fn step(&self, s: &Statement) -> Option<Self> {
        let typ = typecheck::statement(&self.types, s).ok()?;

        let results = self
            .vars
            .iter()
            .map(|vars| s.eval(vars))
            .collect::<Option<Vec<_>>>()?;

        let duplicate = (0..self.types.len())
            .any(|i| self.vars.iter().zip(&results).all(|(vs, r)| vs[i] == *r));
        if duplicate {
            return None;
        }

        let mut next = self.clone();
        for (vars, r) in next.vars.iter_mut().zip(results) {
            vars.push(r);
        }
        next.types.push(typ);
        next.statements.push(s.clone());
        Some(next)
    }

    /// Whether the most recent statement produces every expected output.
    pub fn solved(&self) -> bool {
        !self.statements.is_empty()
            && self
                .vars
                .iter()
                .zip(&self.outputs)
                .all(|(vars, out)| vars.last() == Some(out))
    }

    pub fn program(&self) -> Program {
        Program::new(self.input_types().to_vec(), self.statements.clone())
    }
}
