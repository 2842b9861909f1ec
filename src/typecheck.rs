use crate::core::*;

use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub context: Vec<String>,
    pub message: String,
    _private: (),
}

impl Error {
    pub fn with_context(mut self, ctx: String) -> Self {
        self.context.push(ctx);
        self
    }

    pub fn new(message: String) -> Self {
        Self {
            context: vec![],
            message,
            _private: (),
        }
    }

    pub fn argcount(got: usize, expected: usize) -> Self {
        Self::new(format!("got {} args, expected {}", got, expected))
    }

    pub fn scope(index: usize, defined: usize) -> Self {
        Self::new(format!(
            "variable {} is not in scope ({} defined)",
            index, defined
        ))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for ctx in &self.context {
            write!(f, "\n    - in {}", ctx)?;
        }
        Ok(())
    }
}

type Check = Result<(), Error>;
type Infer<T> = Result<T, Error>;

/// Check that a program is well-formed, returning the types of all of its
/// variables (inputs first, then statement results).
pub fn program(program: &Program) -> Infer<Vec<Type>> {
    let mut vars = program.input_types.clone();
    for (i, s) in program.statements.iter().enumerate() {
        let t = statement(&vars, s).map_err(|e| {
            e.with_context(format!("statement {} ({})", i, s.function.name()))
        })?;
        vars.push(t);
    }
    Ok(vars)
}

/// Infer the result type of a statement in a variable context.
pub fn statement(vars: &[Type], s: &Statement) -> Infer<Type> {
    let sig = s.function.signature();

    if s.args.len() != sig.params.len() {
        return Err(Error::argcount(s.args.len(), sig.params.len()));
    }

    for (i, (arg, param)) in s.args.iter().zip(&sig.params).enumerate() {
        argument(vars, arg, param)
            .map_err(|e| e.with_context(format!("argument {}", i)))?;
    }

    Ok(sig.ret)
}

fn argument(vars: &[Type], arg: &Arg, param: &Param) -> Check {
    match (arg, param) {
        (Arg::Lambda(l), Param::Lambda(kind)) => {
            if l.kind() != *kind {
                return Err(Error::new(format!(
                    "lambda '{}' is a {:?}, expected {:?}",
                    l.name(),
                    l.kind(),
                    kind
                )));
            }
            Ok(())
        }
        (Arg::Var(i), Param::Var(expected)) => {
            let got = vars.get(*i).ok_or_else(|| Error::scope(*i, vars.len()))?;
            if got != expected {
                return Err(Error::new(format!(
                    "variable {} has type {}, expected {}",
                    i, got, expected
                )));
            }
            Ok(())
        }
        (Arg::Lambda(l), Param::Var(t)) => Err(Error::new(format!(
            "got lambda '{}', expected a variable of type {}",
            l.name(),
            t
        ))),
        (Arg::Var(i), Param::Lambda(kind)) => Err(Error::new(format!(
            "got variable {}, expected a {:?} lambda",
            i, kind
        ))),
    }
}
