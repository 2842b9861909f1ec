//! # Evaluation
//!
//! Concrete semantics for statements. Every function is total over its inputs
//! in the sense that it returns `None` (rather than panicking) when it has no
//! meaningful result, or when the result leaves the integer bounds.

use crate::core::*;

/// Floor division, rounding toward negative infinity.
fn div_floor(x: i64, d: i64) -> i64 {
    let q = x / d;
    if (x % d != 0) && ((x < 0) != (d < 0)) {
        q - 1
    } else {
        q
    }
}

/// Clamp a (possibly negative) slice bound into `0..=len`.
fn slice_bound(n: i64, len: usize) -> usize {
    let len = len as i64;
    let n = if n < 0 { len + n } else { n };
    n.clamp(0, len) as usize
}

impl Lambda {
    pub fn map(&self, x: i64) -> Option<i64> {
        match self {
            Lambda::Plus1 => x.checked_add(1),
            Lambda::Minus1 => x.checked_sub(1),
            Lambda::Times2 => x.checked_mul(2),
            Lambda::Div2 => Some(div_floor(x, 2)),
            Lambda::Negate => x.checked_neg(),
            Lambda::Square => x.checked_mul(x),
            Lambda::Times3 => x.checked_mul(3),
            Lambda::Div3 => Some(div_floor(x, 3)),
            Lambda::Times4 => x.checked_mul(4),
            Lambda::Div4 => Some(div_floor(x, 4)),
            _ => None,
        }
    }

    pub fn test(&self, x: i64) -> Option<bool> {
        match self {
            Lambda::Positive => Some(x > 0),
            Lambda::Negative => Some(x < 0),
            Lambda::Even => Some(x.rem_euclid(2) == 0),
            Lambda::Odd => Some(x.rem_euclid(2) == 1),
            _ => None,
        }
    }

    pub fn fold(&self, x: i64, y: i64) -> Option<i64> {
        match self {
            Lambda::Add => x.checked_add(y),
            Lambda::Sub => x.checked_sub(y),
            Lambda::Mul => x.checked_mul(y),
            Lambda::Min => Some(x.min(y)),
            Lambda::Max => Some(x.max(y)),
            _ => None,
        }
    }
}

/// Argument values after variables have been looked up.
#[derive(Debug, Clone, Copy)]
pub enum ArgValue<'a> {
    Lambda(Lambda),
    Value(&'a Value),
}

fn int(a: ArgValue) -> Option<i64> {
    match a {
        ArgValue::Value(Value::Int(x)) => Some(*x),
        _ => None,
    }
}

fn list(a: ArgValue<'_>) -> Option<&'_ [i64]> {
    match a {
        ArgValue::Value(Value::List(xs)) => Some(xs),
        _ => None,
    }
}

fn lambda(a: ArgValue) -> Option<Lambda> {
    match a {
        ArgValue::Lambda(l) => Some(l),
        _ => None,
    }
}

impl Function {
    /// Apply a function to already-looked-up arguments.
    ///
    /// Returns `None` if the arguments are ill-typed, the function is
    /// undefined on them, or the result is out of bounds.
    pub fn apply(&self, args: &[ArgValue]) -> Option<Value> {
        let arg = |i: usize| args.get(i);
        let result = match self {
            Function::Head => Value::Int(*list(*arg(0)?)?.first()?),
            Function::Last => Value::Int(*list(*arg(0)?)?.last()?),
            Function::Minimum => Value::Int(*list(*arg(0)?)?.iter().min()?),
            Function::Maximum => Value::Int(*list(*arg(0)?)?.iter().max()?),
            Function::Sum => Value::Int(
                list(*arg(0)?)?
                    .iter()
                    .try_fold(0i64, |acc, x| acc.checked_add(*x))?,
            ),
            Function::Reverse => {
                Value::List(list(*arg(0)?)?.iter().rev().copied().collect())
            }
            Function::Sort => {
                let mut xs = list(*arg(0)?)?.to_vec();
                xs.sort();
                Value::List(xs)
            }
            Function::Take => {
                let xs = list(*arg(1)?)?;
                Value::List(xs[..slice_bound(int(*arg(0)?)?, xs.len())].to_vec())
            }
            Function::Drop => {
                let xs = list(*arg(1)?)?;
                Value::List(xs[slice_bound(int(*arg(0)?)?, xs.len())..].to_vec())
            }
            Function::Access => {
                let n = int(*arg(0)?)?;
                let xs = list(*arg(1)?)?;
                Value::Int(*xs.get(usize::try_from(n).ok()?)?)
            }
            Function::Map => {
                let f = lambda(*arg(0)?)?;
                Value::List(
                    list(*arg(1)?)?
                        .iter()
                        .map(|x| f.map(*x))
                        .collect::<Option<_>>()?,
                )
            }
            Function::Filter => {
                let p = lambda(*arg(0)?)?;
                let mut ys = vec![];
                for x in list(*arg(1)?)? {
                    if p.test(*x)? {
                        ys.push(*x);
                    }
                }
                Value::List(ys)
            }
            Function::Count => {
                let p = lambda(*arg(0)?)?;
                let mut n = 0;
                for x in list(*arg(1)?)? {
                    if p.test(*x)? {
                        n += 1;
                    }
                }
                Value::Int(n)
            }
            Function::ZipWith => {
                let f = lambda(*arg(0)?)?;
                let xs = list(*arg(1)?)?;
                let ys = list(*arg(2)?)?;
                Value::List(
                    xs.iter()
                        .zip(ys)
                        .map(|(x, y)| f.fold(*x, *y))
                        .collect::<Option<_>>()?,
                )
            }
            Function::Scanl1 => {
                let f = lambda(*arg(0)?)?;
                let mut ys: Vec<i64> = vec![];
                for x in list(*arg(1)?)? {
                    let y = match ys.last() {
                        Some(acc) => f.fold(*acc, *x)?,
                        None => *x,
                    };
                    // Every prefix is part of the output, so stop early.
                    if !(INT_MIN..=INT_MAX).contains(&y) {
                        return None;
                    }
                    ys.push(y);
                }
                Value::List(ys)
            }
        };
        result.bounded()
    }
}

impl Statement {
    /// Evaluate a statement against a variable environment.
    pub fn eval(&self, vars: &[Value]) -> Option<Value> {
        let args = self
            .args
            .iter()
            .map(|a| match a {
                Arg::Lambda(l) => Some(ArgValue::Lambda(*l)),
                Arg::Var(i) => vars.get(*i).map(ArgValue::Value),
            })
            .collect::<Option<Vec<_>>>()?;
        self.function.apply(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(f: Function, args: Vec<Arg>, vars: Vec<Value>) -> Option<Value> {
        Statement::new(f, args).eval(&vars)
    }

    fn l(xs: &[i64]) -> Value {
        Value::List(xs.to_vec())
    }

    #[test]
    fn first_order() {
        let xs = vec![l(&[3, -1, 2])];
        assert_eq!(
            run(Function::Head, vec![Arg::Var(0)], xs.clone()),
            Some(Value::Int(3))
        );
        assert_eq!(
            run(Function::Minimum, vec![Arg::Var(0)], xs.clone()),
            Some(Value::Int(-1))
        );
        assert_eq!(
            run(Function::Sort, vec![Arg::Var(0)], xs.clone()),
            Some(l(&[-1, 2, 3]))
        );
        assert_eq!(
            run(Function::Sum, vec![Arg::Var(0)], xs),
            Some(Value::Int(4))
        );
    }

    #[test]
    fn partial_functions() {
        let empty = vec![l(&[])];
        assert_eq!(run(Function::Head, vec![Arg::Var(0)], empty.clone()), None);
        assert_eq!(run(Function::Maximum, vec![Arg::Var(0)], empty), None);
        assert_eq!(
            run(
                Function::Access,
                vec![Arg::Var(0), Arg::Var(1)],
                vec![Value::Int(5), l(&[1, 2])]
            ),
            None
        );
        assert_eq!(
            run(
                Function::Access,
                vec![Arg::Var(0), Arg::Var(1)],
                vec![Value::Int(-1), l(&[1, 2])]
            ),
            None
        );
    }

    #[test]
    fn take_and_drop_slice() {
        let vars = |n| vec![Value::Int(n), l(&[1, 2, 3, 4])];
        let both = vec![Arg::Var(0), Arg::Var(1)];
        assert_eq!(
            run(Function::Take, both.clone(), vars(2)),
            Some(l(&[1, 2]))
        );
        assert_eq!(
            run(Function::Take, both.clone(), vars(-1)),
            Some(l(&[1, 2, 3]))
        );
        assert_eq!(
            run(Function::Drop, both.clone(), vars(10)),
            Some(l(&[]))
        );
        assert_eq!(run(Function::Drop, both, vars(-1)), Some(l(&[4])));
    }

    #[test]
    fn higher_order() {
        let xs = vec![l(&[1, -2, 3, -4])];
        assert_eq!(
            run(
                Function::Map,
                vec![Arg::Lambda(Lambda::Div2), Arg::Var(0)],
                xs.clone()
            ),
            Some(l(&[0, -1, 1, -2]))
        );
        assert_eq!(
            run(
                Function::Filter,
                vec![Arg::Lambda(Lambda::Positive), Arg::Var(0)],
                xs.clone()
            ),
            Some(l(&[1, 3]))
        );
        assert_eq!(
            run(
                Function::Count,
                vec![Arg::Lambda(Lambda::Even), Arg::Var(0)],
                xs.clone()
            ),
            Some(Value::Int(2))
        );
        assert_eq!(
            run(
                Function::Scanl1,
                vec![Arg::Lambda(Lambda::Add), Arg::Var(0)],
                xs.clone()
            ),
            Some(l(&[1, -1, 2, -2]))
        );
        assert_eq!(
            run(
                Function::ZipWith,
                vec![Arg::Lambda(Lambda::Max), Arg::Var(0), Arg::Var(1)],
                vec![l(&[1, 5, 3]), l(&[4, 2])]
            ),
            Some(l(&[4, 5]))
        );
    }

    #[test]
    fn out_of_bounds_results_are_rejected() {
        assert_eq!(
            run(
                Function::Map,
                vec![Arg::Lambda(Lambda::Square), Arg::Var(0)],
                vec![l(&[20])]
            ),
            None
        );
    }

    #[test]
    fn wrong_lambda_kind_is_rejected() {
        assert_eq!(
            run(
                Function::Map,
                vec![Arg::Lambda(Lambda::Odd), Arg::Var(0)],
                vec![l(&[1])]
            ),
            None
        );
    }

    #[test]
    fn scan_stops_when_accumulator_leaves_range() {
        let big = vec![l(&[200; 10])];
        assert_eq!(
            run(
                Function::Scanl1,
                vec![Arg::Lambda(Lambda::Mul), Arg::Var(0)],
                big.clone()
            ),
            None
        );
        assert_eq!(
            run(
                Function::Scanl1,
                vec![Arg::Lambda(Lambda::Add), Arg::Var(0)],
                big.clone()
            ),
            None
        );
        assert_eq!(
            run(
                Function::Scanl1,
                vec![Arg::Lambda(Lambda::Max), Arg::Var(0)],
                big
            ),
            Some(l(&[200; 10]))
        );
    }

    #[test]
    fn arithmetic_never_overflows() {
        assert_eq!(Lambda::Mul.fold(i64::MAX, 2), None);
        assert_eq!(Lambda::Sub.fold(i64::MIN, 1), None);
        assert_eq!(Lambda::Square.map(i64::MAX), None);
        assert_eq!(Lambda::Negate.map(i64::MIN), None);
        assert_eq!(Lambda::Mul.fold(-16, 16), Some(-256));
    }
}
