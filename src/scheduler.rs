//! Worklist scheduler for alerted propagators.
//!
//! The pending queue is FIFO and duplicate-free: alerting a propagator that is
//! already pending is a no-op, and propagators alerted while another one runs
//! go to the back of the same queue. An optional history remembers every
//! propagator ever alerted so a whole network can be replayed.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;

use crate::network::PropagatorId;

/// Insertion-ordered queue of unique propagator handles.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    order: VecDeque<PropagatorId>,
    members: HashSet<PropagatorId>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `id` unless it is already pending. Returns whether it was added.
    pub fn push(&mut self, id: PropagatorId) -> bool {
        if self.members.insert(id) {
            self.order.push_back(id);
            true
        } else {
            false
        }
    }

    /// Remove and return the earliest-enqueued handle.
    pub fn pop(&mut self) -> Option<PropagatorId> {
        let id = self.order.pop_front()?;
        self.members.remove(&id);
        Some(id)
    }

    pub fn contains(&self, id: PropagatorId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = PropagatorId> + '_ {
        self.order.iter().copied()
    }
}

/// Pending queue, alert history and the single-drain guard.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: PendingQueue,
    ever_alerted: IndexSet<PropagatorId>,
    track_history: bool,
    draining: bool,
}

impl Scheduler {
    pub fn new(track_history: bool) -> Self {
        Self {
            track_history,
            ..Self::default()
        }
    }

    /// Forget all pending alerts and the alert history.
    pub fn initialize(&mut self) {
        tracing::debug!("initializing scheduler");
        self.pending.clear();
        self.ever_alerted.clear();
    }

    pub fn alert(&mut self, id: PropagatorId) {
        if self.track_history {
            self.ever_alerted.insert(id);
        }
        if self.pending.push(id) {
            tracing::debug!(propagator = %id, "propagator alerted");
        }
    }

    pub fn alert_all(&mut self, ids: impl IntoIterator<Item = PropagatorId>) {
        for id in ids {
            self.alert(id);
        }
    }

    /// Re-alert every propagator in the history, in first-alert order.
    pub fn alert_history(&mut self) {
        for id in self.ever_alerted.clone() {
            self.pending.push(id);
        }
    }

    pub fn next(&mut self) -> Option<PropagatorId> {
        self.pending.pop()
    }

    pub fn is_pending(&self, id: PropagatorId) -> bool {
        self.pending.contains(id)
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn ever_alerted(&self) -> &IndexSet<PropagatorId> {
        &self.ever_alerted
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }

    pub(crate) fn set_draining(&mut self, draining: bool) {
        self.draining = draining;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: usize) -> PropagatorId {
        PropagatorId::from_index(n)
    }

    #[test]
    fn new_scheduler_has_no_alerted_propagators() {
        let scheduler = Scheduler::new(true);
        assert_eq!(scheduler.pending_count(), 0);
        assert!(scheduler.ever_alerted().is_empty());
    }

    #[test]
    fn queue_is_fifo() {
        let mut scheduler = Scheduler::new(false);
        scheduler.alert_all([pid(2), pid(0), pid(1)]);
        assert_eq!(scheduler.next(), Some(pid(2)));
        assert_eq!(scheduler.next(), Some(pid(0)));
        assert_eq!(scheduler.next(), Some(pid(1)));
        assert_eq!(scheduler.next(), None);
    }

    #[test]
    fn alerting_a_pending_propagator_is_a_no_op() {
        let mut scheduler = Scheduler::new(false);
        scheduler.alert(pid(0));
        scheduler.alert(pid(1));
        scheduler.alert(pid(0));
        assert_eq!(scheduler.pending_count(), 2);
        assert_eq!(scheduler.next(), Some(pid(0)));

        // Once popped it can be queued again, behind the others.
        scheduler.alert(pid(0));
        assert_eq!(scheduler.pending().iter().collect::<Vec<_>>(), vec![pid(1), pid(0)]);
    }

    #[test]
    fn history_survives_draining_until_initialize() {
        let mut scheduler = Scheduler::new(true);
        scheduler.alert_all([pid(0), pid(1)]);
        while scheduler.next().is_some() {}
        assert_eq!(scheduler.ever_alerted().len(), 2);

        scheduler.alert_history();
        assert_eq!(scheduler.pending_count(), 2);

        scheduler.initialize();
        assert_eq!(scheduler.pending_count(), 0);
        assert!(scheduler.ever_alerted().is_empty());
    }

    #[test]
    fn history_disabled() {
        let mut scheduler = Scheduler::new(false);
        scheduler.alert(pid(0));
        assert!(scheduler.ever_alerted().is_empty());
    }
}
