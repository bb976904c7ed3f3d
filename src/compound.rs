//! Compound propagators: sub-networks built on demand.
//!
//! A compound propagator watches its trigger cells but defers building its
//! internal network until at least one trigger holds something. The build
//! runs at most once; afterwards the compound is inert and the sub-network it
//! created does the work. This is what keeps recursive definitions such as
//! [`crate::networks::sqrt_iter`] finite.

use std::fmt;

use crate::error::PropResult;
use crate::network::{Body, CellId, Network, PropagatorId};

/// Deferred sub-network construction.
pub type Build = Box<dyn FnOnce(&mut Network) -> PropResult<()>>;

/// Lifecycle of a compound propagator.
pub enum CompoundState {
    Pending(Build),
    Materialized,
}

impl fmt::Debug for CompoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(_) => f.write_str("Pending"),
            Self::Materialized => f.write_str("Materialized"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Compound {
    triggers: Vec<CellId>,
    state: CompoundState,
}

impl Compound {
    fn new(triggers: Vec<CellId>, build: Build) -> Self {
        Self {
            triggers,
            state: CompoundState::Pending(build),
        }
    }

    pub(crate) fn is_materialized(&self) -> bool {
        matches!(self.state, CompoundState::Materialized)
    }

    /// One invocation: build the sub-network if still pending and any trigger
    /// has content.
    pub(crate) fn step(&mut self, net: &mut Network) -> PropResult<()> {
        if self.is_materialized() {
            return Ok(());
        }

        let mut ready = false;
        for &trigger in &self.triggers {
            if net.content(trigger)?.is_something() {
                ready = true;
                break;
            }
        }
        if !ready {
            return Ok(());
        }

        match std::mem::replace(&mut self.state, CompoundState::Materialized) {
            CompoundState::Pending(build) => {
                tracing::debug!(triggers = self.triggers.len(), "materializing compound propagator");
                build(net)
            }
            CompoundState::Materialized => Ok(()),
        }
    }
}

impl Network {
    /// Register a compound propagator over `triggers`.
    ///
    /// `build` runs the first time the compound is invoked while any trigger
    /// has content, and never again. If `build` fails the compound still
    /// counts as materialized.
    pub fn compound<F>(&mut self, triggers: &[CellId], build: F) -> PropResult<PropagatorId>
    where
        F: FnOnce(&mut Network) -> PropResult<()> + 'static,
    {
        let compound = Compound::new(triggers.to_vec(), Box::new(build));
        self.register(Some("compound".to_owned()), triggers, Body::Compound(compound))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as Counter;
    use std::rc::Rc;

    use super::*;
    use crate::config::NetworkConfig;
    use crate::value::Value;

    fn network() -> Network {
        Network::new(NetworkConfig::default()).unwrap()
    }

    #[test]
    fn stays_pending_while_triggers_are_empty() {
        let mut net = network();
        let a = net.anonymous_cell();
        let builds = Rc::new(Counter::new(0));
        let counter = Rc::clone(&builds);
        let p = net
            .compound(&[a], move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            })
            .unwrap();

        net.run().unwrap();
        assert_eq!(builds.get(), 0);
        assert_eq!(net.is_materialized(p), Some(false));
    }

    #[test]
    fn builds_once_when_any_trigger_has_content() {
        let mut net = network();
        let a = net.anonymous_cell();
        let b = net.anonymous_cell();
        let out = net.anonymous_cell();
        let builds = Rc::new(Counter::new(0));
        let counter = Rc::clone(&builds);
        let p = net
            .compound(&[a, b], move |net| {
                counter.set(counter.get() + 1);
                crate::primitives::adder(net, a, b, out)?;
                Ok(())
            })
            .unwrap();

        net.add_content(b, 2).unwrap();
        net.run().unwrap();
        assert_eq!(builds.get(), 1);
        assert_eq!(net.is_materialized(p), Some(true));
        assert_eq!(net.content(out).unwrap(), &Value::Nothing);

        net.add_content(a, 3).unwrap();
        net.run().unwrap();
        assert_eq!(builds.get(), 1);
        assert_eq!(net.content(out).unwrap(), &Value::from(5));
    }

    #[test]
    fn plain_propagators_are_not_compounds() {
        let mut net = network();
        let p = net.propagator(&[], |_| Ok(())).unwrap();
        assert_eq!(net.is_materialized(p), None);
    }

    #[test]
    fn state_debug_hides_the_closure() {
        let state = CompoundState::Pending(Box::new(|_: &mut Network| Ok(())));
        assert_eq!(format!("{state:?}"), "Pending");
        assert_eq!(format!("{:?}", CompoundState::Materialized), "Materialized");
    }
}
