//! Rich diagnostic error types for the propnet engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Contradictions are *not* errors: they are
//! ordinary cell content (see [`crate::merge::Contradiction`]). The errors here are
//! programmer/integration failures that abort whatever call raised them.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the propnet engine.
#[derive(Debug, Error, Diagnostic)]
pub enum PropError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Generic(#[from] GenericError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Generic operator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GenericError {
    #[error("operator '{operator}' expects {expected} argument(s), received {actual}")]
    #[diagnostic(
        code(propnet::generic::arity),
        help(
            "Generic operators have a fixed arity chosen when they are defined. \
             Pass exactly {expected} argument(s) to '{operator}'."
        )
    )]
    Arity {
        operator: String,
        expected: usize,
        actual: usize,
    },

    #[error("generic operator '{operator}' does not exist")]
    #[diagnostic(
        code(propnet::generic::unknown_operator),
        help(
            "Define the operator with `Generics::define` before calling it or \
             registering rules for it."
        )
    )]
    UnknownOperator { operator: String },

    #[error("rule for '{operator}' has {actual} predicate(s), operator arity is {expected}")]
    #[diagnostic(
        code(propnet::generic::predicate_arity),
        help("Supply exactly one predicate per operator argument.")
    )]
    PredicateArity {
        operator: String,
        expected: usize,
        actual: usize,
    },

    #[error("no rule of '{operator}' applies to ({arguments})")]
    #[diagnostic(
        code(propnet::generic::no_applicable_rule),
        help(
            "None of the registered rules matched these argument types and the \
             default implementation does not handle them. Register a rule for \
             this content type with `Generics::register`."
        )
    )]
    NoApplicableRule { operator: String, arguments: String },

    #[error("division by zero in '{operator}'")]
    #[diagnostic(
        code(propnet::generic::division_by_zero),
        help("The divisor (or an interval endpoint of it) is zero.")
    )]
    DivisionByZero { operator: String },
}

/// Result type for generic operator dispatch.
pub type GenericResult<T> = std::result::Result<T, GenericError>;

// ---------------------------------------------------------------------------
// Network errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum NetworkError {
    #[error("cell not found: {id}")]
    #[diagnostic(
        code(propnet::network::unknown_cell),
        help("Cell handles are only valid for the network that created them.")
    )]
    UnknownCell { id: String },

    #[error("propagator not found: {id}")]
    #[diagnostic(
        code(propnet::network::unknown_propagator),
        help("Propagator handles are only valid for the network that created them.")
    )]
    UnknownPropagator { id: String },

    #[error("scheduler is already draining: nested run() is not allowed")]
    #[diagnostic(
        code(propnet::network::reentrant_run),
        help(
            "Propagators must not call `Network::run`. Alerted propagators are \
             picked up by the drain that is already in progress."
        )
    )]
    ReentrantRun,

    /// A propagator's body is taken out of its registration while it runs.
    /// `run` rejects nested drains, so this only fires if that guard is
    /// bypassed.
    #[error("propagator {id} is already executing")]
    #[diagnostic(
        code(propnet::network::propagator_busy),
        help("A propagator cannot be invoked while its own action is running.")
    )]
    PropagatorBusy { id: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read network config: {path}")]
    #[diagnostic(
        code(propnet::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse network config: {message}")]
    #[diagnostic(
        code(propnet::config::parse),
        help("Check the TOML syntax and the field names in the config file.")
    )]
    Parse { message: String },

    #[error("failed to render network config: {message}")]
    #[diagnostic(
        code(propnet::config::render),
        help("The config could not be serialized as TOML.")
    )]
    Render { message: String },
}

/// Convenience alias for functions returning propnet results.
pub type PropResult<T> = std::result::Result<T, PropError>;
