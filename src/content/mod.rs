//! Partial-information content types.
//!
//! - [`interval`]: closed numeric ranges that narrow under merge
//! - [`supported`]: values paired with the provenance labels that justify them
//!
//! Each module registers its `merge`, arithmetic and `is_contradictory` rules
//! into a [`crate::generic::Generics`] through its `install` function.

pub mod interval;
pub mod supported;
