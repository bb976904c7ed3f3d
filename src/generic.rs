//! Generic operators: named, fixed-arity multi-methods.
//!
//! A [`GenericOperator`] holds an ordered list of rules, each a tuple of
//! per-argument [`Predicate`]s plus a [`Handler`], and a default handler. A
//! call scans the rules from the most recently registered to the oldest and
//! runs the first rule whose predicates all accept their argument; when none
//! match, the default runs.
//!
//! This is the only polymorphism mechanism in propnet. Content types attach
//! `merge`, arithmetic and `is_contradictory` behaviour by registering rules,
//! so neither the network runtime nor other content types need to know their
//! representation.
//!
//! ```
//! use propnet::generic::{Generics, Predicate};
//! use propnet::value::Value;
//!
//! let mut generics = Generics::new();
//! generics.define("concat", 2, |_, args| {
//!     Ok(Value::Text(format!("{}{}", args[0], args[1])))
//! });
//! generics
//!     .register(
//!         "concat",
//!         vec![Predicate::new(Value::is_number), Predicate::new(Value::is_number)],
//!         |_, args| Ok(Value::Text(format!("{}+{}", args[0], args[1]))),
//!     )
//!     .unwrap();
//! let joined = generics.call("concat", &[Value::from(1), Value::from(2)]).unwrap();
//! assert_eq!(joined, Value::from("1+2"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{GenericError, GenericResult};
use crate::value::Value;

/// Implementation of one rule (or the default) of a generic operator.
///
/// Handlers receive the registry so they can dispatch further generic
/// operators on the parts of their arguments.
pub type Handler = Arc<dyn Fn(&Generics, &[Value]) -> GenericResult<Value> + Send + Sync>;

/// Per-argument applicability test of a rule.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Generics, &Value) -> bool + Send + Sync>);

impl Predicate {
    /// A predicate that only looks at the argument.
    pub fn new(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |_: &Generics, value: &Value| test(value)))
    }

    /// A predicate that may consult other generic operators, e.g. the
    /// generic `is_contradictory`.
    pub fn with_generics(test: impl Fn(&Generics, &Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(test))
    }

    /// Accepts every argument.
    pub fn any() -> Self {
        Self::new(|_| true)
    }

    pub fn test(&self, generics: &Generics, value: &Value) -> bool {
        (self.0)(generics, value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

#[derive(Clone)]
struct Rule {
    predicates: Vec<Predicate>,
    handler: Handler,
}

impl Rule {
    fn matches(&self, generics: &Generics, args: &[Value]) -> bool {
        self.predicates
            .iter()
            .zip(args)
            .all(|(predicate, arg)| predicate.test(generics, arg))
    }
}

/// A named, fixed-arity multi-method.
#[derive(Clone)]
pub struct GenericOperator {
    name: String,
    arity: usize,
    /// Oldest first; dispatch walks this in reverse.
    rules: Vec<Rule>,
    default: Handler,
}

impl GenericOperator {
    fn new(name: String, arity: usize, default: Handler) -> Self {
        Self {
            name,
            arity,
            rules: Vec::new(),
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn assign(&mut self, predicates: Vec<Predicate>, handler: Handler) -> GenericResult<()> {
        if predicates.len() != self.arity {
            return Err(GenericError::PredicateArity {
                operator: self.name.clone(),
                expected: self.arity,
                actual: predicates.len(),
            });
        }
        self.rules.push(Rule {
            predicates,
            handler,
        });
        Ok(())
    }

    fn dispatch(&self, generics: &Generics, args: &[Value]) -> GenericResult<Value> {
        if args.len() != self.arity {
            return Err(GenericError::Arity {
                operator: self.name.clone(),
                expected: self.arity,
                actual: args.len(),
            });
        }

        for (index, rule) in self.rules.iter().enumerate().rev() {
            if rule.matches(generics, args) {
                tracing::trace!(operator = %self.name, rule = index, "generic rule matched");
                return (rule.handler)(generics, args);
            }
        }

        tracing::trace!(operator = %self.name, "no rule matched, using default");
        (self.default)(generics, args)
    }
}

impl fmt::Debug for GenericOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericOperator")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Registry of generic operators, addressed by name.
///
/// Cloning is cheap: rules and handlers are shared.
#[derive(Clone, Default)]
pub struct Generics {
    operators: HashMap<String, GenericOperator>,
}

impl Generics {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every standard operator defined and the merge,
    /// interval and supported rules installed.
    pub fn standard() -> GenericResult<Self> {
        let mut generics = Self::new();
        crate::operators::define_standard(&mut generics);
        crate::merge::install(&mut generics)?;
        crate::operators::install_contradiction_absorption(&mut generics)?;
        crate::content::interval::install(&mut generics)?;
        crate::content::supported::install(&mut generics)?;
        Ok(generics)
    }

    /// Define (or replace) the operator `name` with the given arity and default.
    pub fn define<F>(&mut self, name: &str, arity: usize, default: F)
    where
        F: Fn(&Generics, &[Value]) -> GenericResult<Value> + Send + Sync + 'static,
    {
        let operator = GenericOperator::new(name.to_owned(), arity, Arc::new(default));
        if self.operators.insert(name.to_owned(), operator).is_some() {
            tracing::debug!(operator = name, "generic operator redefined");
        }
    }

    /// Register a rule for `name`. The newest rule takes precedence over all
    /// earlier ones.
    pub fn register<F>(&mut self, name: &str, predicates: Vec<Predicate>, handler: F) -> GenericResult<()>
    where
        F: Fn(&Generics, &[Value]) -> GenericResult<Value> + Send + Sync + 'static,
    {
        self.register_handler(name, predicates, Arc::new(handler))
    }

    /// Register an already shared handler, e.g. one reused across several
    /// predicate tuples.
    pub fn register_handler(&mut self, name: &str, predicates: Vec<Predicate>, handler: Handler) -> GenericResult<()> {
        let operator = self
            .operators
            .get_mut(name)
            .ok_or_else(|| GenericError::UnknownOperator {
                operator: name.to_owned(),
            })?;
        operator.assign(predicates, handler)
    }

    /// Invoke the operator `name` on `args`.
    pub fn call(&self, name: &str, args: &[Value]) -> GenericResult<Value> {
        let operator = self
            .operators
            .get(name)
            .ok_or_else(|| GenericError::UnknownOperator {
                operator: name.to_owned(),
            })?;
        operator.dispatch(self, args)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&GenericOperator> {
        self.operators.get(name)
    }

    pub fn arity(&self, name: &str) -> Option<usize> {
        self.operators.get(name).map(GenericOperator::arity)
    }

    pub fn rule_count(&self, name: &str) -> Option<usize> {
        self.operators.get(name).map(GenericOperator::rule_count)
    }

    /// Names of all defined operators, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Generics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generics")
            .field("operators", &self.names())
            .finish()
    }
}
