//! # Core syntax
//!
//! This module defines the core syntax of the list-manipulation DSL that the
//! solver searches over: types, values, functions, lambdas, statements, and
//! programs. Programs are straight-line sequences of statements; each statement
//! applies a function to lambdas and previously-defined variables and binds
//! the result to a fresh variable.

use serde::{Deserialize, Serialize};
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// Types

/// The types that variables may take on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Type {
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "LIST")]
    List,
}

impl Type {
    pub fn all() -> Vec<Self> {
        vec![Self::Int, Self::List]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::List => "LIST",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|t| t.name() == s)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Values

/// The smallest integer a value may contain.
pub const INT_MIN: i64 = -256;

/// The largest integer a value may contain.
pub const INT_MAX: i64 = 255;

/// The possible values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),
    List(Vec<i64>),
}

/// Raised when raw example data does not describe a DSL value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError(pub String);

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn in_range(x: i64) -> bool {
    (INT_MIN..=INT_MAX).contains(&x)
}

impl Value {
    /// Construct a value from raw (JSON) example data.
    ///
    /// The type of the resulting value is the inferred type of the data, so
    /// this is also how input types are recovered for encoding.
    pub fn construct(raw: &serde_json::Value) -> Result<Self, ValueError> {
        let int = |v: &serde_json::Value| -> Result<i64, ValueError> {
            let x = v.as_i64().ok_or_else(|| {
                ValueError(format!("expected an integer, got {}", v))
            })?;
            if !in_range(x) {
                return Err(ValueError(format!(
                    "integer {} outside of [{}, {}]",
                    x, INT_MIN, INT_MAX
                )));
            }
            Ok(x)
        };

        match raw {
            serde_json::Value::Number(_) => Ok(Value::Int(int(raw)?)),
            serde_json::Value::Array(xs) => Ok(Value::List(
                xs.iter().map(int).collect::<Result<_, _>>()?,
            )),
            _ => Err(ValueError(format!("cannot construct a value from {}", raw))),
        }
    }

    /// Returns `Some(v)` if every integer in `v` is within bounds.
    pub fn bounded(self) -> Option<Self> {
        let ok = match &self {
            Value::Int(x) => in_range(*x),
            Value::List(xs) => xs.iter().all(|x| in_range(*x)),
        };
        if ok {
            Some(self)
        } else {
            None
        }
    }

    pub fn typ(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::List(_) => Type::List,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(x) => write!(f, "{}", x),
            Value::List(xs) => write!(
                f,
                "[{}]",
                xs.iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Lambdas

/// The kinds of lambdas (by signature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LambdaKind {
    /// `INT -> INT`
    Map,
    /// `INT -> BOOL`
    Predicate,
    /// `INT -> INT -> INT`
    Fold,
}

/// The lambdas that higher-order functions may be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lambda {
    Plus1,
    Minus1,
    Times2,
    Div2,
    Negate,
    Square,
    Times3,
    Div3,
    Times4,
    Div4,
    Positive,
    Negative,
    Even,
    Odd,
    Add,
    Sub,
    Mul,
    Min,
    Max,
}

impl Lambda {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Plus1,
            Self::Minus1,
            Self::Times2,
            Self::Div2,
            Self::Negate,
            Self::Square,
            Self::Times3,
            Self::Div3,
            Self::Times4,
            Self::Div4,
            Self::Positive,
            Self::Negative,
            Self::Even,
            Self::Odd,
            Self::Add,
            Self::Sub,
            Self::Mul,
            Self::Min,
            Self::Max,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plus1 => "+1",
            Self::Minus1 => "-1",
            Self::Times2 => "*2",
            Self::Div2 => "/2",
            Self::Negate => "*(-1)",
            Self::Square => "**2",
            Self::Times3 => "*3",
            Self::Div3 => "/3",
            Self::Times4 => "*4",
            Self::Div4 => "/4",
            Self::Positive => ">0",
            Self::Negative => "<0",
            Self::Even => "%2==0",
            Self::Odd => "%2==1",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|l| l.name() == s)
    }

    pub fn kind(&self) -> LambdaKind {
        match self {
            Self::Plus1
            | Self::Minus1
            | Self::Times2
            | Self::Div2
            | Self::Negate
            | Self::Square
            | Self::Times3
            | Self::Div3
            | Self::Times4
            | Self::Div4 => LambdaKind::Map,
            Self::Positive | Self::Negative | Self::Even | Self::Odd => {
                LambdaKind::Predicate
            }
            Self::Add | Self::Sub | Self::Mul | Self::Min | Self::Max => {
                LambdaKind::Fold
            }
        }
    }

    /// The lambdas of a particular kind, in canonical order.
    pub fn of_kind(kind: LambdaKind) -> Vec<Self> {
        Self::all().into_iter().filter(|l| l.kind() == kind).collect()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Functions

/// The shape of a single function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Lambda(LambdaKind),
    Var(Type),
}

/// Signatures for functions that define their arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub ret: Type,
}

/// The first-order and higher-order functions of the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Head,
    Last,
    Take,
    Drop,
    Access,
    Minimum,
    Maximum,
    Reverse,
    Sort,
    Sum,
    Map,
    Filter,
    Count,
    ZipWith,
    Scanl1,
}

impl Function {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Head,
            Self::Last,
            Self::Take,
            Self::Drop,
            Self::Access,
            Self::Minimum,
            Self::Maximum,
            Self::Reverse,
            Self::Sort,
            Self::Sum,
            Self::Map,
            Self::Filter,
            Self::Count,
            Self::ZipWith,
            Self::Scanl1,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Last => "LAST",
            Self::Take => "TAKE",
            Self::Drop => "DROP",
            Self::Access => "ACCESS",
            Self::Minimum => "MINIMUM",
            Self::Maximum => "MAXIMUM",
            Self::Reverse => "REVERSE",
            Self::Sort => "SORT",
            Self::Sum => "SUM",
            Self::Map => "MAP",
            Self::Filter => "FILTER",
            Self::Count => "COUNT",
            Self::ZipWith => "ZIPWITH",
            Self::Scanl1 => "SCANL1",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|f| f.name() == s)
    }

    pub fn signature(&self) -> Signature {
        use Param::*;
        let (params, ret) = match self {
            Self::Head
            | Self::Last
            | Self::Minimum
            | Self::Maximum
            | Self::Sum => (vec![Var(Type::List)], Type::Int),
            Self::Reverse | Self::Sort => (vec![Var(Type::List)], Type::List),
            Self::Take | Self::Drop => {
                (vec![Var(Type::Int), Var(Type::List)], Type::List)
            }
            Self::Access => (vec![Var(Type::Int), Var(Type::List)], Type::Int),
            Self::Map => {
                (vec![Lambda(LambdaKind::Map), Var(Type::List)], Type::List)
            }
            Self::Filter => (
                vec![Lambda(LambdaKind::Predicate), Var(Type::List)],
                Type::List,
            ),
            Self::Count => (
                vec![Lambda(LambdaKind::Predicate), Var(Type::List)],
                Type::Int,
            ),
            Self::ZipWith => (
                vec![
                    Lambda(LambdaKind::Fold),
                    Var(Type::List),
                    Var(Type::List),
                ],
                Type::List,
            ),
            Self::Scanl1 => {
                (vec![Lambda(LambdaKind::Fold), Var(Type::List)], Type::List)
            }
        };
        Signature { params, ret }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Operations

/// The type of operations that a scoring model assigns priorities to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Function(Function),
    Lambda(Lambda),
}

impl Operation {
    pub fn all() -> Vec<Self> {
        Function::all()
            .into_iter()
            .map(Self::Function)
            .chain(Lambda::all().into_iter().map(Self::Lambda))
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Function(f) => f.name(),
            Self::Lambda(l) => l.name(),
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Function::from_name(s)
            .map(Self::Function)
            .or_else(|| Lambda::from_name(s).map(Self::Lambda))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Statements and programs

/// The arguments that a statement may pass to its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arg {
    Lambda(Lambda),
    /// A zero-based variable index (inputs first, then statement results).
    Var(usize),
}

/// A single function application, bound to a fresh variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    pub function: Function,
    pub args: Vec<Arg>,
}

impl Statement {
    pub fn new(function: Function, args: Vec<Arg>) -> Self {
        Self { function, args }
    }

    /// The operations used by this statement (its function, then lambdas).
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        std::iter::once(Operation::Function(self.function)).chain(
            self.args.iter().filter_map(|a| match a {
                Arg::Lambda(l) => Some(Operation::Lambda(*l)),
                Arg::Var(_) => None,
            }),
        )
    }
}

/// Structured programs: declared input types and a statement sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub input_types: Vec<Type>,
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(input_types: Vec<Type>, statements: Vec<Statement>) -> Self {
        Self {
            input_types,
            statements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn construct_infers_types() {
        assert_eq!(Value::construct(&json!(3)), Ok(Value::Int(3)));
        assert_eq!(
            Value::construct(&json!([1, 2, 3])),
            Ok(Value::List(vec![1, 2, 3]))
        );
        assert_eq!(Value::construct(&json!([])).unwrap().typ(), Type::List);
    }

    #[test]
    fn construct_rejects_non_values() {
        assert!(Value::construct(&json!("abc")).is_err());
        assert!(Value::construct(&json!([1, [2]])).is_err());
        assert!(Value::construct(&json!(1.5)).is_err());
        assert!(Value::construct(&json!(1000)).is_err());
        assert!(Value::construct(&json!(null)).is_err());
    }

    #[test]
    fn names_are_unique() {
        let names: Vec<_> = Operation::all().iter().map(|o| o.name()).collect();
        for op in Operation::all() {
            assert_eq!(Operation::from_name(op.name()), Some(op));
            assert_eq!(names.iter().filter(|n| **n == op.name()).count(), 1);
        }
    }

    #[test]
    fn statement_operations() {
        let s = Statement::new(
            Function::ZipWith,
            vec![Arg::Lambda(Lambda::Max), Arg::Var(0), Arg::Var(1)],
        );
        assert_eq!(
            s.operations().collect::<Vec<_>>(),
            vec![
                Operation::Function(Function::ZipWith),
                Operation::Lambda(Lambda::Max)
            ]
        );
    }
}
