//! Standard generic operators and their default implementations.
//!
//! The defaults cover flat values (numbers, booleans, text). Content types
//! extend these operators with their own rules; see [`crate::content`].

use crate::error::{GenericError, GenericResult};
use crate::generic::{Generics, Predicate};
use crate::value::Value;

pub const MERGE: &str = "merge";
pub const IS_CONTRADICTORY: &str = "is_contradictory";
pub const ADD: &str = "add";
pub const SUB: &str = "sub";
pub const MUL: &str = "mul";
pub const DIV: &str = "div";
pub const LT: &str = "lt";
pub const GT: &str = "gt";
pub const LE: &str = "le";
pub const GE: &str = "ge";
pub const NOT: &str = "not";
pub const SQRT: &str = "sqrt";
pub const ABS: &str = "abs";
pub const SQUARE: &str = "square";

/// Binary arithmetic operators.
pub const ARITHMETIC: [&str; 4] = [ADD, SUB, MUL, DIV];

/// Binary comparison operators.
pub const COMPARISONS: [&str; 4] = [LT, GT, LE, GE];

/// Unary operators with a numeric default.
pub const UNARY: [&str; 3] = [SQRT, ABS, NOT];

pub(crate) fn no_rule(operator: &str, args: &[Value]) -> GenericError {
    let arguments = args
        .iter()
        .map(Value::type_name)
        .collect::<Vec<_>>()
        .join(", ");
    GenericError::NoApplicableRule {
        operator: operator.to_owned(),
        arguments,
    }
}

/// Define every standard operator except `merge` and `is_contradictory`
/// (those belong to [`crate::merge`]).
pub fn define_standard(generics: &mut Generics) {
    generics.define(ADD, 2, |_, args| match (&args[0], &args[1]) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{a}{b}"))),
        _ => Err(no_rule(ADD, args)),
    });

    generics.define(SUB, 2, |_, args| match (&args[0], &args[1]) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        _ => Err(no_rule(SUB, args)),
    });

    generics.define(MUL, 2, |_, args| match (&args[0], &args[1]) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        _ => Err(no_rule(MUL, args)),
    });

    generics.define(DIV, 2, |_, args| match (&args[0], &args[1]) {
        (Value::Number(_), Value::Number(b)) if *b == 0.0 => Err(GenericError::DivisionByZero {
            operator: DIV.to_owned(),
        }),
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
        _ => Err(no_rule(DIV, args)),
    });

    define_comparison(generics, LT, |o| o.is_lt());
    define_comparison(generics, GT, |o| o.is_gt());
    define_comparison(generics, LE, |o| o.is_le());
    define_comparison(generics, GE, |o| o.is_ge());

    generics.define(NOT, 1, |_, args| match &args[0] {
        Value::Nothing | Value::Contradiction(_) => Err(no_rule(NOT, args)),
        value => Ok(Value::Bool(!value.truthy())),
    });

    generics.define(SQRT, 1, |_, args| match &args[0] {
        Value::Number(n) => Ok(Value::Number(n.sqrt())),
        _ => Err(no_rule(SQRT, args)),
    });

    generics.define(ABS, 1, |_, args| match &args[0] {
        Value::Number(n) => Ok(Value::Number(n.abs())),
        _ => Err(no_rule(ABS, args)),
    });

    generics.define(SQUARE, 1, |g, args| g.call(MUL, &[args[0].clone(), args[0].clone()]));
}

fn define_comparison(generics: &mut Generics, name: &'static str, accept: fn(std::cmp::Ordering) -> bool) {
    generics.define(name, 2, move |_, args| {
        let ordering = match (&args[0], &args[1]) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => return Err(no_rule(name, args)),
        };
        Ok(Value::Bool(ordering.is_some_and(accept)))
    });
}

/// Contradictions flow through every operator unchanged, so an inconsistent
/// cell surfaces as a contradictory value downstream instead of an error.
///
/// Installed right after the merge rules: every content-type rule registered
/// later takes precedence and gets to unwrap its own representation first.
pub fn install_contradiction_absorption(generics: &mut Generics) -> GenericResult<()> {
    let contradictory = Predicate::with_generics(|g, v| is_contradictory(g, v));

    for name in ARITHMETIC.into_iter().chain(COMPARISONS) {
        generics.register(name, vec![Predicate::any(), contradictory.clone()], |_, args| {
            Ok(args[1].clone())
        })?;
        generics.register(name, vec![contradictory.clone(), Predicate::any()], |_, args| {
            Ok(args[0].clone())
        })?;
    }

    for name in UNARY.into_iter().chain([SQUARE]) {
        generics.register(name, vec![contradictory.clone()], |_, args| Ok(args[0].clone()))?;
    }

    Ok(())
}

/// Generic contradiction test. An operator failure counts as "not
/// contradictory" so predicates stay total.
pub fn is_contradictory(generics: &Generics, value: &Value) -> bool {
    matches!(generics.call(IS_CONTRADICTORY, std::slice::from_ref(value)), Ok(Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::Contradiction;

    fn generics() -> Generics {
        Generics::standard().unwrap()
    }

    #[test]
    fn numeric_defaults() {
        let g = generics();
        assert_eq!(g.call(ADD, &[15.into(), 13.into()]).unwrap(), Value::from(28));
        assert_eq!(g.call(SUB, &[15.into(), 13.into()]).unwrap(), Value::from(2));
        assert_eq!(g.call(MUL, &[5.into(), 3.into()]).unwrap(), Value::from(15));
        assert_eq!(g.call(DIV, &[9.into(), 3.into()]).unwrap(), Value::from(3));
        assert_eq!(g.call(ABS, &[(-9).into()]).unwrap(), Value::from(9));
        assert_eq!(g.call(SQRT, &[16.into()]).unwrap(), Value::from(4));
        assert_eq!(g.call(SQUARE, &[7.into()]).unwrap(), Value::from(49));
    }

    #[test]
    fn text_addition_concatenates() {
        let g = generics();
        assert_eq!(g.call(ADD, &["15".into(), "13".into()]).unwrap(), Value::from("1513"));
    }

    #[test]
    fn comparisons() {
        let g = generics();
        assert_eq!(g.call(LT, &[13.into(), 15.into()]).unwrap(), Value::from(true));
        assert_eq!(g.call(LT, &[17.into(), 15.into()]).unwrap(), Value::from(false));
        assert_eq!(g.call(GT, &[17.into(), 15.into()]).unwrap(), Value::from(true));
        assert_eq!(g.call(LE, &[15.into(), 15.into()]).unwrap(), Value::from(true));
        assert_eq!(g.call(GE, &[13.into(), 15.into()]).unwrap(), Value::from(false));
    }

    #[test]
    fn negation() {
        let g = generics();
        assert_eq!(g.call(NOT, &[true.into()]).unwrap(), Value::from(false));
        assert_eq!(g.call(NOT, &[false.into()]).unwrap(), Value::from(true));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let g = generics();
        assert!(matches!(
            g.call(DIV, &[1.into(), 0.into()]),
            Err(GenericError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn unsupported_types_have_no_rule() {
        let g = generics();
        let err = g.call(SUB, &["a".into(), true.into()]).unwrap_err();
        assert!(matches!(err, GenericError::NoApplicableRule { .. }));
        assert!(err.to_string().contains("text, bool"));
    }

    #[test]
    fn contradictions_are_absorbed() {
        let g = generics();
        let c = Value::from(Contradiction::new("boom"));
        assert_eq!(g.call(ADD, &[c.clone(), 1.into()]).unwrap(), c);
        assert_eq!(g.call(MUL, &[1.into(), c.clone()]).unwrap(), c);
        assert_eq!(g.call(SQRT, &[c.clone()]).unwrap(), c);
        assert_eq!(g.call(SQUARE, &[c.clone()]).unwrap(), c);
        assert!(is_contradictory(&g, &g.call(LT, &[c.clone(), 2.into()]).unwrap()));
    }
}
