//! Provenance-tracked values.
//!
//! A [`Supported`] value pairs a conclusion with the [`Support`] set of
//! evidence labels it was derived from. Operators on supported values apply
//! to the inner values and union the supports, so every derived cell records
//! which measurements its content depends on.
//!
//! Supports are ordered by inclusion: a smaller support explains the same
//! conclusion with less evidence and is therefore more informative.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::GenericResult;
use crate::generic::{Generics, Handler, Predicate};
use crate::operators::{ARITHMETIC, COMPARISONS, IS_CONTRADICTORY, MERGE, UNARY, no_rule};
use crate::value::Value;

/// A set of provenance labels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Support(BTreeSet<String>);

impl Support {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        self.0.insert(label.into())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_subset(&self, other: &Support) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Strict subset: the same conclusion needs less evidence.
    pub fn more_informative_than(&self, other: &Support) -> bool {
        self != other && self.is_subset(other)
    }

    pub fn union(&self, other: &Support) -> Support {
        Support(self.0.union(&other.0).cloned().collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Support {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Support(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, "}}")
    }
}

/// A value together with the labels of the evidence that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Supported {
    pub value: Value,
    pub support: Support,
}

impl Supported {
    pub fn new(value: impl Into<Value>, support: Support) -> Self {
        Self {
            value: value.into(),
            support,
        }
    }

    /// Supported by the given labels.
    pub fn with_labels<S: Into<String>>(value: impl Into<Value>, labels: impl IntoIterator<Item = S>) -> Self {
        Self::new(value, labels.into_iter().collect())
    }

    /// Supported by nothing: a premise-free value.
    pub fn bare(value: impl Into<Value>) -> Self {
        Self::new(value, Support::new())
    }

    /// `self` subsumes `other` when its value implies `other`'s and it needs
    /// no evidence beyond `other`'s.
    pub fn subsumes(&self, generics: &Generics, other: &Supported) -> GenericResult<bool> {
        Ok(generics.implies(&self.value, &other.value)? && self.support.is_subset(&other.support))
    }
}

impl fmt::Display for Supported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Supported({}, {})", self.value, self.support)
    }
}

/// Merge two supported values.
///
/// - same conclusion: keep the stored one unless the increment needs strictly
///   less evidence
/// - the stored value already implies the increment's: keep the stored one
/// - the increment's value is the merged one: it supersedes the stored value
///   together with its provenance
/// - otherwise the merged conclusion depends on both supports
fn merge_supported(generics: &Generics, content: &Supported, increment: &Supported) -> GenericResult<Value> {
    let merged = generics.merge(&content.value, &increment.value)?;

    if merged == content.value {
        if generics.implies(&increment.value, &merged)?
            && increment.support.more_informative_than(&content.support)
        {
            return Ok(increment.clone().into());
        }
        return Ok(content.clone().into());
    }

    if merged == increment.value {
        return Ok(increment.clone().into());
    }

    Ok(Supported::new(merged, content.support.union(&increment.support)).into())
}

/// View an argument as a supported value; flat values get an empty support.
fn to_supported(value: &Value) -> Supported {
    match value {
        Value::Supported(s) => (**s).clone(),
        other => Supported::bare(other.clone()),
    }
}

/// Handler applying `name` to the inner values and unioning the supports.
fn lifted(name: &'static str) -> Handler {
    std::sync::Arc::new(move |g: &Generics, args: &[Value]| {
        let supported: Vec<Supported> = args.iter().map(to_supported).collect();
        let inner: Vec<Value> = supported.iter().map(|s| s.value.clone()).collect();
        let support = supported
            .iter()
            .fold(Support::new(), |acc, s| acc.union(&s.support));
        Ok(Supported::new(g.call(name, &inner)?, support).into())
    })
}

/// Register the supported-value rules for `merge`, `is_contradictory` and the
/// standard arithmetic, comparison and unary operators.
pub fn install(generics: &mut Generics) -> GenericResult<()> {
    let supported = Predicate::new(Value::is_supported);
    let flat = Predicate::new(Value::is_flat);

    let merge: Handler = std::sync::Arc::new(|g: &Generics, args: &[Value]| {
        match (&args[0], &args[1]) {
            (Value::Supported(_), _) | (_, Value::Supported(_)) => {
                merge_supported(g, &to_supported(&args[0]), &to_supported(&args[1]))
            }
            _ => Err(no_rule(MERGE, args)),
        }
    });
    for predicates in [
        vec![supported.clone(), supported.clone()],
        vec![supported.clone(), flat.clone()],
        vec![flat.clone(), supported.clone()],
    ] {
        generics.register_handler(MERGE, predicates, merge.clone())?;
    }

    for name in ARITHMETIC.into_iter().chain(COMPARISONS) {
        let handler = lifted(name);
        for predicates in [
            vec![supported.clone(), supported.clone()],
            vec![supported.clone(), flat.clone()],
            vec![flat.clone(), supported.clone()],
        ] {
            generics.register_handler(name, predicates, handler.clone())?;
        }
    }

    for name in UNARY {
        generics.register_handler(name, vec![supported.clone()], lifted(name))?;
    }

    generics.register(IS_CONTRADICTORY, vec![supported], |g, args| match &args[0] {
        Value::Supported(s) => Ok(Value::Bool(g.is_contradictory(&s.value)?)),
        _ => Err(no_rule(IS_CONTRADICTORY, args)),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::interval::Interval;
    use crate::merge::Contradiction;
    use crate::operators::{ADD, MUL, SQRT};

    fn generics() -> Generics {
        Generics::standard().unwrap()
    }

    fn sup(value: impl Into<Value>, labels: &[&str]) -> Supported {
        Supported::with_labels(value, labels.iter().copied())
    }

    fn iv(low: f64, high: f64) -> Interval {
        Interval::new(low, high)
    }

    #[test]
    fn more_informative_than_is_strict_subset() {
        let s1: Support = ["source1", "source2", "source3"].into_iter().collect();
        let s2: Support = ["source1", "source2"].into_iter().collect();
        assert!(s2.more_informative_than(&s1));
        assert!(!s1.more_informative_than(&s2));
        assert!(!s1.more_informative_than(&s1));
    }

    #[test]
    fn display_lists_labels_in_order() {
        let s = sup(45, &["superintendent", "shadows"]);
        assert_eq!(s.to_string(), "Supported(45, {shadows, superintendent})");
    }

    #[test]
    fn arithmetic_unions_supports() {
        let g = generics();
        let sum = g
            .call(ADD, &[sup(3, &["a"]).into(), sup(4, &["b"]).into()])
            .unwrap();
        assert_eq!(sum, sup(7, &["a", "b"]).into());
    }

    #[test]
    fn flat_operands_are_coerced() {
        let g = generics();
        let product = g.call(MUL, &[sup(3, &["a"]).into(), 4.into()]).unwrap();
        assert_eq!(product, sup(12, &["a"]).into());
        let product = g.call(MUL, &[4.into(), sup(3, &["a"]).into()]).unwrap();
        assert_eq!(product, sup(12, &["a"]).into());
    }

    #[test]
    fn interval_values_propagate_inside_supports() {
        let g = generics();
        let product = g
            .call(MUL, &[Supported::bare(iv(3.0, 4.0)).into(), Supported::bare(iv(5.0, 6.0)).into()])
            .unwrap();
        assert_eq!(product, Supported::bare(iv(15.0, 24.0)).into());
        let root = g.call(SQRT, &[sup(iv(4.0, 9.0), &["m"]).into()]).unwrap();
        assert_eq!(root, sup(iv(2.0, 3.0), &["m"]).into());
    }

    #[test]
    fn same_conclusion_prefers_smaller_support() {
        let g = generics();
        let small = sup(5, &["a"]);
        let large = sup(5, &["a", "b"]);
        assert_eq!(g.merge(&large.clone().into(), &small.clone().into()).unwrap(), small.clone().into());
        assert_eq!(g.merge(&small.clone().into(), &large.into()).unwrap(), small.into());
    }

    #[test]
    fn same_conclusion_incomparable_supports_keeps_content() {
        let g = generics();
        let a = sup(5, &["a"]);
        let b = sup(5, &["b"]);
        assert_eq!(g.merge(&a.clone().into(), &b.into()).unwrap(), a.into());
    }

    #[test]
    fn looser_increment_is_not_interesting() {
        let g = generics();
        let tight = sup(iv(6.0, 9.0), &["a"]);
        let loose = sup(iv(5.0, 10.0), &["b"]);
        assert_eq!(g.merge(&tight.clone().into(), &loose.into()).unwrap(), tight.into());
    }

    #[test]
    fn tighter_increment_supersedes() {
        let g = generics();
        let loose = sup(iv(44.0, 48.0), &["shadows"]);
        let exact = sup(45, &["superintendent"]);
        assert_eq!(g.merge(&loose.into(), &exact.clone().into()).unwrap(), exact.into());
    }

    #[test]
    fn joint_conclusion_needs_both_supports() {
        let g = generics();
        let a = sup(iv(44.0, 48.0), &["shadows"]);
        let b = sup(iv(45.0, 49.0), &["fall"]);
        assert_eq!(
            g.merge(&a.into(), &b.into()).unwrap(),
            sup(iv(45.0, 48.0), &["fall", "shadows"]).into()
        );
    }

    #[test]
    fn flat_values_merge_as_unsupported() {
        let g = generics();
        let merged = g.merge(&sup(iv(1.0, 5.0), &["a"]).into(), &iv(2.0, 3.0).into()).unwrap();
        assert_eq!(merged, Supported::bare(iv(2.0, 3.0)).into());
    }

    #[test]
    fn merge_laws_hold_for_supported_values() {
        let g = generics();
        let s: Value = sup(iv(1.0, 5.0), &["a", "b"]).into();
        assert_eq!(g.merge(&s, &s).unwrap(), s);
        assert_eq!(g.merge(&s, &Value::Nothing).unwrap(), s);
        assert_eq!(g.merge(&Value::Nothing, &s).unwrap(), s);

        let bad = Value::from(Contradiction::new("inconsistent"));
        assert_eq!(g.merge(&s, &bad).unwrap(), bad);
        assert_eq!(g.merge(&bad, &s).unwrap(), bad);
    }

    #[test]
    fn inverted_inner_interval_is_contradictory() {
        let g = generics();
        assert!(g.is_contradictory(&sup(iv(10.0, 5.0), &["a"]).into()).unwrap());
    }

    #[test]
    fn contradictory_when_inner_value_is() {
        let g = generics();
        let inner = sup(Contradiction::new("x"), &["a"]);
        assert!(g.is_contradictory(&inner.into()).unwrap());
        assert!(!g.is_contradictory(&sup(1, &["a"]).into()).unwrap());

        let merged = g
            .merge(&sup(iv(5.0, 10.0), &["a"]).into(), &sup(iv(20.0, 30.0), &["b"]).into())
            .unwrap();
        assert!(g.is_contradictory(&merged).unwrap());
        assert_eq!(merged.as_supported().map(|s| s.support.len()), Some(2));
    }

    #[test]
    fn subsumption() {
        let g = generics();
        let this = ["this"];
        let both = ["this", "that"];
        assert!(sup(iv(5.0, 10.0), &this).subsumes(&g, &sup(iv(5.0, 10.0), &both)).unwrap());
        assert!(sup(iv(6.0, 9.0), &both).subsumes(&g, &sup(iv(5.0, 10.0), &both)).unwrap());
        assert!(sup(iv(6.0, 9.0), &this).subsumes(&g, &sup(iv(5.0, 10.0), &both)).unwrap());
        assert!(!sup(iv(5.0, 10.0), &both).subsumes(&g, &sup(iv(5.0, 10.0), &this)).unwrap());
        assert!(!sup(iv(5.0, 10.0), &both).subsumes(&g, &sup(iv(6.0, 9.0), &both)).unwrap());
        assert!(!sup(iv(5.0, 10.0), &both).subsumes(&g, &sup(iv(6.0, 9.0), &this)).unwrap());
    }
}
