//! Closed numeric intervals as partial information about a number.
//!
//! Merging two intervals intersects them; an empty intersection is a
//! contradiction. Arithmetic follows the non-negative range convention:
//! endpoints are combined pairwise and never re-sorted, so multiplication and
//! division are only meaningful for ranges that do not straddle zero with
//! mixed signs. General-sign interval arithmetic is not implemented.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GenericError, GenericResult};
use crate::generic::{Generics, Handler, Predicate};
use crate::merge::Contradiction;
use crate::operators::{ABS, ADD, DIV, IS_CONTRADICTORY, MERGE, MUL, SQRT, SUB, no_rule};
use crate::value::Value;

/// Closed range `[low, high]`.
///
/// `low > high` (or a NaN endpoint) describes the empty range. It is
/// contradictory content: merges and operators absorb it instead of
/// computing with it, and an empty intersection becomes a [`Contradiction`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// The degenerate interval `[n, n]`.
    pub fn point(n: f64) -> Self {
        Self::new(n, n)
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_nan() || self.high.is_nan() || self.low > self.high
    }

    pub fn contains(&self, n: f64) -> bool {
        self.low <= n && n <= self.high
    }

    /// `true` when every point of `self` lies in `other`.
    pub fn is_within(&self, other: &Interval) -> bool {
        other.low <= self.low && self.high <= other.high
    }

    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval::new(self.low.max(other.low), self.high.min(other.high))
    }

    pub fn add(&self, other: &Interval) -> Interval {
        Interval::new(self.low + other.low, self.high + other.high)
    }

    pub fn sub(&self, other: &Interval) -> Interval {
        Interval::new(self.low - other.high, self.high - other.low)
    }

    pub fn mul(&self, other: &Interval) -> Interval {
        Interval::new(self.low * other.low, self.high * other.high)
    }

    /// `self * [1 / other.high, 1 / other.low]`.
    pub fn div(&self, other: &Interval) -> GenericResult<Interval> {
        if other.low == 0.0 || other.high == 0.0 {
            return Err(GenericError::DivisionByZero {
                operator: DIV.to_owned(),
            });
        }
        Ok(self.mul(&Interval::new(1.0 / other.high, 1.0 / other.low)))
    }

    pub fn sqrt(&self) -> Interval {
        Interval::new(self.low.sqrt(), self.high.sqrt())
    }

    pub fn abs(&self) -> Interval {
        if self.low >= 0.0 {
            *self
        } else if self.high <= 0.0 {
            Interval::new(-self.high, -self.low)
        } else {
            Interval::new(0.0, (-self.low).max(self.high))
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interval({}, {})", self.low, self.high)
    }
}

/// Coerce a number or interval argument to an interval.
fn to_interval(value: &Value) -> Option<Interval> {
    match value {
        Value::Interval(i) => Some(*i),
        Value::Number(n) => Some(Interval::point(*n)),
        _ => None,
    }
}

fn merge_intervals(content: &Interval, increment: &Interval) -> Value {
    let range = content.intersect(increment);
    if range.is_empty() {
        Contradiction::new(format!("Empty merge: {content} & {increment} == {range}")).into()
    } else if range == *content {
        Value::Interval(*content)
    } else if range == *increment {
        Value::Interval(*increment)
    } else {
        Value::Interval(range)
    }
}

fn ensure_inside(interval: &Interval, n: f64) -> Value {
    if interval.contains(n) {
        Value::Number(n)
    } else {
        Contradiction::new(format!("{n} is not inside {interval}")).into()
    }
}

/// Binary handler that coerces both arguments to intervals first.
fn binary(name: &'static str, op: fn(&Interval, &Interval) -> GenericResult<Interval>) -> Handler {
    std::sync::Arc::new(move |_: &Generics, args: &[Value]| {
        match (to_interval(&args[0]), to_interval(&args[1])) {
            (Some(a), Some(b)) => Ok(Value::Interval(op(&a, &b)?)),
            _ => Err(no_rule(name, args)),
        }
    })
}

/// Register the interval rules for `is_contradictory`, `merge`, arithmetic,
/// `sqrt` and `abs`.
pub fn install(generics: &mut Generics) -> GenericResult<()> {
    // Empty intervals fall through to the contradiction absorption rules.
    let interval = Predicate::new(|v: &Value| v.as_interval().is_some_and(|i| !i.is_empty()));
    let number = Predicate::new(Value::is_number);

    generics.register(IS_CONTRADICTORY, vec![Predicate::new(Value::is_interval)], |_, args| {
        match &args[0] {
            Value::Interval(i) => Ok(Value::Bool(i.is_empty())),
            _ => Err(no_rule(IS_CONTRADICTORY, args)),
        }
    })?;

    generics.register(MERGE, vec![interval.clone(), interval.clone()], |_, args| {
        match (&args[0], &args[1]) {
            (Value::Interval(a), Value::Interval(b)) => Ok(merge_intervals(a, b)),
            _ => Err(no_rule(MERGE, args)),
        }
    })?;
    generics.register(MERGE, vec![number.clone(), interval.clone()], |_, args| {
        match (&args[0], &args[1]) {
            (Value::Number(n), Value::Interval(i)) => Ok(ensure_inside(i, *n)),
            _ => Err(no_rule(MERGE, args)),
        }
    })?;
    generics.register(MERGE, vec![interval.clone(), number.clone()], |_, args| {
        match (&args[0], &args[1]) {
            (Value::Interval(i), Value::Number(n)) => Ok(ensure_inside(i, *n)),
            _ => Err(no_rule(MERGE, args)),
        }
    })?;

    let ops: [(&'static str, fn(&Interval, &Interval) -> GenericResult<Interval>); 4] = [
        (ADD, |a, b| Ok(a.add(b))),
        (SUB, |a, b| Ok(a.sub(b))),
        (MUL, |a, b| Ok(a.mul(b))),
        (DIV, Interval::div),
    ];
    for (name, op) in ops {
        let handler = binary(name, op);
        for predicates in [
            vec![interval.clone(), interval.clone()],
            vec![interval.clone(), number.clone()],
            vec![number.clone(), interval.clone()],
        ] {
            generics.register_handler(name, predicates, handler.clone())?;
        }
    }

    generics.register(SQRT, vec![interval.clone()], |_, args| match &args[0] {
        Value::Interval(i) => Ok(Value::Interval(i.sqrt())),
        _ => Err(no_rule(SQRT, args)),
    })?;
    generics.register(ABS, vec![interval], |_, args| match &args[0] {
        Value::Interval(i) => Ok(Value::Interval(i.abs())),
        _ => Err(no_rule(ABS, args)),
    })?;

    Ok(())
}
