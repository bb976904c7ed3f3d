//! The merge lattice: how two pieces of information about one cell combine.
//!
//! `merge(content, increment)` is a generic operator. Its default merges equal
//! values to themselves and anything else to a [`Contradiction`]. The rules
//! installed here make "no information" the identity element and contradiction
//! the absorbing element; content types add their own rules on top (see
//! [`crate::content`]).
//!
//! Contradictions are values, not errors. A cell can hold one, and operators
//! pass them through, so an inconsistency shows up as a visible result.

use std::fmt;

use serde::Serialize;

use crate::error::GenericResult;
use crate::generic::{Generics, Predicate};
use crate::operators::{self, IS_CONTRADICTORY, MERGE};
use crate::value::Value;

/// Two pieces of information that cannot both hold.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Contradiction {
    message: Option<String>,
}

impl Contradiction {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// A contradiction without a diagnostic message.
    pub fn bare() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Contradiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "Contradiction('{message}')"),
            None => write!(f, "Contradiction()"),
        }
    }
}

fn default_merge(_: &Generics, args: &[Value]) -> GenericResult<Value> {
    let (content, increment) = (&args[0], &args[1]);
    if content == increment {
        Ok(content.clone())
    } else {
        Ok(Contradiction::new(format!("{content} != {increment}")).into())
    }
}

/// Define `merge` and `is_contradictory` and install the absence and
/// contradiction rules.
pub fn install(generics: &mut Generics) -> GenericResult<()> {
    generics.define(MERGE, 2, default_merge);
    generics.define(IS_CONTRADICTORY, 1, |_, args| {
        Ok(Value::Bool(args[0].is_contradiction()))
    });

    let nothing = Predicate::new(Value::is_nothing);
    let something = Predicate::new(Value::is_something);
    generics.register(MERGE, vec![something.clone(), nothing.clone()], |_, args| {
        Ok(args[0].clone())
    })?;
    generics.register(MERGE, vec![nothing, something], |_, args| Ok(args[1].clone()))?;

    // Registered after the absence rules so a contradiction wins over them.
    let contradictory = Predicate::with_generics(|g, v| operators::is_contradictory(g, v));
    generics.register(MERGE, vec![Predicate::any(), contradictory.clone()], |_, args| {
        Ok(args[1].clone())
    })?;
    generics.register(MERGE, vec![contradictory, Predicate::any()], |_, args| {
        Ok(args[0].clone())
    })?;

    Ok(())
}

impl Generics {
    /// `merge(content, increment)`.
    pub fn merge(&self, content: &Value, increment: &Value) -> GenericResult<Value> {
        self.call(MERGE, &[content.clone(), increment.clone()])
    }

    /// `a` implies `b` when merging `b` into `a` adds nothing: `a` is at least
    /// as informative as `b`.
    pub fn implies(&self, a: &Value, b: &Value) -> GenericResult<bool> {
        Ok(self.merge(a, b)? == *a)
    }

    /// The generic contradiction test, open to every content type.
    pub fn is_contradictory(&self, value: &Value) -> GenericResult<bool> {
        Ok(self.call(IS_CONTRADICTORY, std::slice::from_ref(value))?.truthy())
    }
}
