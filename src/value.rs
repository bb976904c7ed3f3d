//! Cell content values.
//!
//! A [`Value`] is everything a cell can hold: no information at all
//! ([`Value::Nothing`]), a flat value, one of the partial-information content
//! types ([`Interval`], [`Supported`]), a [`Contradiction`], or a
//! [`CustomContent`] supplied by a downstream crate.
//!
//! The engine never inspects values itself. Everything type-specific goes
//! through the generic operators in [`crate::generic`]; the variant tags only
//! make the predicates cheap.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::content::interval::Interval;
use crate::content::supported::Supported;
use crate::merge::Contradiction;

/// A content type defined outside the engine.
///
/// Implement this to plug a new kind of partial information into the network,
/// then register `merge` (and any arithmetic) rules for it whose predicates
/// recognize it via [`Value::downcast_ref`].
pub trait CustomContent: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Short name used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Structural equality against another custom content.
    fn content_eq(&self, other: &dyn CustomContent) -> bool;
}

/// The content of a cell.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// No information.
    #[default]
    Nothing,
    Bool(bool),
    Number(f64),
    Text(String),
    Interval(Interval),
    Supported(Box<Supported>),
    Contradiction(Contradiction),
    Custom(#[serde(serialize_with = "serialize_custom")] Arc<dyn CustomContent>),
}

fn serialize_custom<S: Serializer>(
    content: &Arc<dyn CustomContent>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(content)
}

impl Value {
    /// Wrap a custom content type.
    pub fn custom<T: CustomContent>(content: T) -> Self {
        Value::Custom(Arc::new(content))
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    pub fn is_something(&self) -> bool {
        !self.is_nothing()
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, Value::Interval(_))
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Value::Supported(_))
    }

    /// Flat values are the ones a supported value can wrap directly:
    /// numbers and intervals.
    pub fn is_flat(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Interval(_))
    }

    /// Structural contradiction test on the tag only.
    ///
    /// Use the generic `is_contradictory` operator to also catch content
    /// types that wrap a contradiction (e.g. a supported contradiction).
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Value::Contradiction(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_interval(&self) -> Option<&Interval> {
        match self {
            Value::Interval(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_supported(&self) -> Option<&Supported> {
        match self {
            Value::Supported(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_contradiction(&self) -> Option<&Contradiction> {
        match self {
            Value::Contradiction(c) => Some(c),
            _ => None,
        }
    }

    /// Downcast a [`Value::Custom`] to its concrete type.
    pub fn downcast_ref<T: CustomContent>(&self) -> Option<&T> {
        match self {
            Value::Custom(c) => c.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Boolean interpretation used by `not` and conditional propagators.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Nothing => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Short tag for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nothing => "nothing",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Interval(_) => "interval",
            Value::Supported(_) => "supported",
            Value::Contradiction(_) => "contradiction",
            Value::Custom(c) => c.type_name(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nothing, Value::Nothing) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Interval(a), Value::Interval(b)) => a == b,
            (Value::Supported(a), Value::Supported(b)) => a == b,
            (Value::Contradiction(a), Value::Contradiction(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => a.content_eq(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nothing => write!(f, "Nothing"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Interval(i) => write!(f, "{i}"),
            Value::Supported(s) => write!(f, "{s}"),
            Value::Contradiction(c) => write!(f, "{c}"),
            Value::Custom(c) => write!(f, "{c}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Interval> for Value {
    fn from(i: Interval) -> Self {
        Value::Interval(i)
    }
}

impl From<Supported> for Value {
    fn from(s: Supported) -> Self {
        Value::Supported(Box::new(s))
    }
}

impl From<Contradiction> for Value {
    fn from(c: Contradiction) -> Self {
        Value::Contradiction(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tag(&'static str);

    impl fmt::Display for Tag {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Tag({})", self.0)
        }
    }

    impl CustomContent for Tag {
        fn type_name(&self) -> &'static str {
            "tag"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn content_eq(&self, other: &dyn CustomContent) -> bool {
            other.as_any().downcast_ref::<Tag>() == Some(self)
        }
    }

    #[test]
    fn default_is_nothing() {
        assert!(Value::default().is_nothing());
    }

    #[test]
    fn numbers_from_integers() {
        assert_eq!(Value::from(28), Value::Number(28.0));
        assert_eq!(Value::from(28).to_string(), "28");
    }

    #[test]
    fn custom_equality_is_structural() {
        let a = Value::custom(Tag("x"));
        let b = Value::custom(Tag("x"));
        let c = Value::custom(Tag("y"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<Tag>(), Some(&Tag("x")));
        assert_eq!(a.type_name(), "tag");
    }

    #[test]
    fn different_variants_are_unequal() {
        assert_ne!(Value::from(1), Value::from(true));
        assert_ne!(Value::Nothing, Value::from(0));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nothing.truthy());
        assert!(!Value::from(false).truthy());
        assert!(!Value::from(0).truthy());
        assert!(Value::from(3).truthy());
        assert!(!Value::from("").truthy());
        assert!(Value::from("yes").truthy());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&Value::from(2.5)).unwrap();
        assert_eq!(json, r#"{"kind":"number","value":2.5}"#);
        let json = serde_json::to_string(&Value::custom(Tag("x"))).unwrap();
        assert_eq!(json, r#"{"kind":"custom","value":"Tag(x)"}"#);
    }
}
