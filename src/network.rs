//! Network facade: cells, propagator registrations and the scheduler.
//!
//! A [`Network`] owns everything a propagator network needs: the generic
//! operator registry, the cell arena, the registered propagator actions and
//! the [`Scheduler`]. Cells and propagators are addressed by [`CellId`] and
//! [`PropagatorId`] handles.
//!
//! Writing to a cell merges the increment into its content. Only a merge
//! result that differs from the current content is stored, and only then are
//! the cell's neighbors alerted. Repeated writes of information the cell
//! already has never re-trigger propagation, which is what lets
//! [`Network::run`] reach a fixed point.
//!
//! ```
//! use propnet::network::Network;
//! use propnet::config::NetworkConfig;
//! use propnet::primitives::adder;
//! use propnet::value::Value;
//!
//! let mut net = Network::new(NetworkConfig::default()).unwrap();
//! let a = net.new_cell("a");
//! let b = net.new_cell("b");
//! let c = net.new_cell("c");
//! adder(&mut net, a, b, c).unwrap();
//! net.add_content(a, 15).unwrap();
//! net.add_content(b, 13).unwrap();
//! net.run().unwrap();
//! assert_eq!(net.content(c).unwrap(), &Value::from(28));
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::compound::Compound;
use crate::config::NetworkConfig;
use crate::error::{NetworkError, PropResult};
use crate::generic::Generics;
use crate::scheduler::Scheduler;
use crate::value::Value;

/// Handle of a cell within one [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CellId(usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell:{}", self.0)
    }
}

/// Handle of a propagator registration within one [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PropagatorId(usize);

impl PropagatorId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PropagatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prop:{}", self.0)
    }
}

/// A storage location holding partial information.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    label: Option<String>,
    content: Value,
    neighbors: Vec<PropagatorId>,
}

impl Cell {
    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Propagators interested in this cell, in registration order.
    pub fn neighbors(&self) -> &[PropagatorId] {
        &self.neighbors
    }

    fn name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.id.to_string())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({}, {})", self.name(), self.content)
    }
}

/// The computation a plain propagator runs every time it is alerted.
pub type Action = Box<dyn FnMut(&mut Network) -> PropResult<()>>;

pub(crate) enum Body {
    Action(Action),
    Compound(Compound),
}

struct Registration {
    label: Option<String>,
    inputs: Vec<CellId>,
    /// `None` only while the body is executing.
    body: Option<Body>,
}

/// Outcome of one [`Network::run`] drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunReport {
    /// Number of propagator invocations performed.
    pub invocations: usize,
}

/// Serializable view of one cell.
#[derive(Debug, Clone, Serialize)]
pub struct CellSnapshot {
    pub id: CellId,
    pub label: Option<String>,
    pub content: Value,
}

/// A propagator network.
pub struct Network {
    config: NetworkConfig,
    generics: Arc<Generics>,
    cells: Vec<Cell>,
    propagators: Vec<Registration>,
    scheduler: Scheduler,
}

impl Network {
    /// Create an empty network using the standard generic operators.
    pub fn new(config: NetworkConfig) -> PropResult<Self> {
        Ok(Self::with_generics(config, Generics::standard()?))
    }

    /// Create an empty network dispatching through `generics`.
    pub fn with_generics(config: NetworkConfig, generics: Generics) -> Self {
        let scheduler = Scheduler::new(config.track_alert_history);
        Self {
            config,
            generics: Arc::new(generics),
            cells: Vec::new(),
            propagators: Vec::new(),
            scheduler,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn generics(&self) -> &Generics {
        &self.generics
    }

    /// Mutable access to the registry, e.g. to install rules for a new
    /// content type. Copies the registry first if it is shared.
    pub fn generics_mut(&mut self) -> &mut Generics {
        Arc::make_mut(&mut self.generics)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // -----------------------------------------------------------------------
    // Cells
    // -----------------------------------------------------------------------

    /// Create an empty, labelled cell.
    pub fn new_cell(&mut self, label: impl Into<String>) -> CellId {
        self.push_cell(Some(label.into()))
    }

    /// Create an empty cell without a label.
    pub fn anonymous_cell(&mut self) -> CellId {
        self.push_cell(None)
    }

    /// Create a labelled cell and add `content` to it.
    pub fn new_cell_with(&mut self, label: impl Into<String>, content: impl Into<Value>) -> PropResult<CellId> {
        let id = self.new_cell(label);
        self.add_content(id, content)?;
        Ok(id)
    }

    fn push_cell(&mut self, label: Option<String>) -> CellId {
        let id = CellId(self.cells.len());
        tracing::trace!(cell = %id, label = label.as_deref().unwrap_or(""), "new cell");
        self.cells.push(Cell {
            id,
            label,
            content: Value::Nothing,
            neighbors: Vec::new(),
        });
        id
    }

    pub fn cell(&self, id: CellId) -> PropResult<&Cell> {
        self.cells
            .get(id.0)
            .ok_or_else(|| NetworkError::UnknownCell { id: id.to_string() }.into())
    }

    fn cell_mut(&mut self, id: CellId) -> PropResult<&mut Cell> {
        self.cells
            .get_mut(id.0)
            .ok_or_else(|| NetworkError::UnknownCell { id: id.to_string() }.into())
    }

    /// Current content of a cell.
    pub fn content(&self, id: CellId) -> PropResult<&Value> {
        Ok(self.cell(id)?.content())
    }

    /// Whether a cell's content is contradictory for its content type.
    pub fn is_contradictory(&self, id: CellId) -> PropResult<bool> {
        Ok(self.generics.is_contradictory(self.content(id)?)?)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Merge `increment` into the cell's content; alert its neighbors when the
    /// content changed.
    pub fn add_content(&mut self, id: CellId, increment: impl Into<Value>) -> PropResult<()> {
        let increment = increment.into();
        let current = self.content(id)?;
        let merged = self.generics.merge(current, &increment)?;
        if merged == *current {
            return Ok(());
        }

        if self.config.warn_on_contradiction
            && !self.generics.is_contradictory(current)?
            && self.generics.is_contradictory(&merged)?
        {
            tracing::warn!(cell = %self.cell(id)?.name(), content = %merged, "cell became contradictory");
        }

        let cell = self.cell_mut(id)?;
        tracing::debug!(cell = %cell.name(), content = %merged, "cell content changed");
        cell.content = merged;
        let neighbors = cell.neighbors.clone();
        self.scheduler.alert_all(neighbors);
        Ok(())
    }

    /// Make `propagator` a neighbor of the cell and alert it once, whatever
    /// the cell currently holds. Already-registered neighbors are left alone.
    pub fn new_neighbor(&mut self, cell: CellId, propagator: PropagatorId) -> PropResult<()> {
        self.registration(propagator)?;
        let cell = self.cell_mut(cell)?;
        if !cell.neighbors.contains(&propagator) {
            cell.neighbors.push(propagator);
            self.scheduler.alert(propagator);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Propagators
    // -----------------------------------------------------------------------

    /// Register `action` as a neighbor of every input cell and alert it once.
    ///
    /// The action reads its inputs with [`Network::content`] and writes its
    /// outputs with [`Network::add_content`]. It runs again whenever an input
    /// gains information, so it must tolerate inputs holding
    /// [`Value::Nothing`].
    pub fn propagator<F>(&mut self, inputs: &[CellId], action: F) -> PropResult<PropagatorId>
    where
        F: FnMut(&mut Network) -> PropResult<()> + 'static,
    {
        self.register(None, inputs, Body::Action(Box::new(action)))
    }

    /// [`Network::propagator`] with a label shown in traces.
    pub fn named_propagator<F>(
        &mut self,
        label: impl Into<String>,
        inputs: &[CellId],
        action: F,
    ) -> PropResult<PropagatorId>
    where
        F: FnMut(&mut Network) -> PropResult<()> + 'static,
    {
        self.register(Some(label.into()), inputs, Body::Action(Box::new(action)))
    }

    pub(crate) fn register(
        &mut self,
        label: Option<String>,
        inputs: &[CellId],
        body: Body,
    ) -> PropResult<PropagatorId> {
        for &input in inputs {
            self.cell(input)?;
        }

        let id = PropagatorId::from_index(self.propagators.len());
        tracing::trace!(propagator = %id, label = label.as_deref().unwrap_or(""), inputs = inputs.len(), "new propagator");
        self.propagators.push(Registration {
            label,
            inputs: inputs.to_vec(),
            body: Some(body),
        });

        for &input in inputs {
            self.new_neighbor(input, id)?;
        }
        self.scheduler.alert(id);
        Ok(id)
    }

    fn registration(&self, id: PropagatorId) -> PropResult<&Registration> {
        self.propagators
            .get(id.0)
            .ok_or_else(|| NetworkError::UnknownPropagator { id: id.to_string() }.into())
    }

    pub fn propagator_label(&self, id: PropagatorId) -> PropResult<Option<&str>> {
        Ok(self.registration(id)?.label.as_deref())
    }

    pub fn propagator_inputs(&self, id: PropagatorId) -> PropResult<&[CellId]> {
        Ok(&self.registration(id)?.inputs)
    }

    pub fn propagator_count(&self) -> usize {
        self.propagators.len()
    }

    /// `Some(materialized)` for compound propagators, `None` otherwise.
    pub fn is_materialized(&self, id: PropagatorId) -> Option<bool> {
        match self.propagators.get(id.0)?.body.as_ref()? {
            Body::Compound(compound) => Some(compound.is_materialized()),
            Body::Action(_) => None,
        }
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Queue a propagator for the next drain.
    pub fn alert_propagator(&mut self, id: PropagatorId) -> PropResult<()> {
        self.registration(id)?;
        self.scheduler.alert(id);
        Ok(())
    }

    /// Re-queue every propagator ever alerted, for a full replay.
    pub fn alert_all_propagators(&mut self) {
        self.scheduler.alert_history();
    }

    pub fn pending_count(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Clear the pending queue and alert history. Cells and registrations
    /// are kept.
    pub fn initialize(&mut self) {
        self.scheduler.initialize();
    }

    /// Run alerted propagators until none are pending.
    ///
    /// Each propagator runs to completion before the next one is taken;
    /// propagators alerted meanwhile join the back of the queue. A propagator
    /// error aborts the drain and leaves the rest of the queue pending.
    pub fn run(&mut self) -> PropResult<RunReport> {
        if self.scheduler.is_draining() {
            return Err(NetworkError::ReentrantRun.into());
        }

        tracing::debug!(pending = self.scheduler.pending_count(), "running scheduler");
        self.scheduler.set_draining(true);
        let result = self.drain();
        self.scheduler.set_draining(false);

        if let Ok(report) = &result {
            tracing::debug!(invocations = report.invocations, "scheduler done");
        }
        result
    }

    fn drain(&mut self) -> PropResult<RunReport> {
        let mut report = RunReport::default();
        while let Some(id) = self.scheduler.next() {
            report.invocations += 1;
            if let Err(e) = self.fire(id) {
                tracing::warn!(propagator = %id, error = %e, "propagator failed, drain aborted");
                return Err(e);
            }
        }
        Ok(report)
    }

    /// Run one propagator. Its body is out of the registration for the
    /// duration and put back even when it fails.
    fn fire(&mut self, id: PropagatorId) -> PropResult<()> {
        let body = self
            .propagators
            .get_mut(id.0)
            .ok_or_else(|| NetworkError::UnknownPropagator { id: id.to_string() })?
            .body
            .take()
            .ok_or_else(|| NetworkError::PropagatorBusy { id: id.to_string() })?;

        let (body, result) = match body {
            Body::Action(mut action) => {
                let result = action(self);
                (Body::Action(action), result)
            }
            Body::Compound(mut compound) => {
                let result = compound.step(self);
                (Body::Compound(compound), result)
            }
        };

        self.propagators[id.0].body = Some(body);
        result
    }

    /// Serializable view of every cell.
    pub fn snapshot(&self) -> Vec<CellSnapshot> {
        self.cells
            .iter()
            .map(|cell| CellSnapshot {
                id: cell.id,
                label: cell.label.clone(),
                content: cell.content.clone(),
            })
            .collect()
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("config", &self.config)
            .field("cells", &self.cells.len())
            .field("propagators", &self.propagators.len())
            .field("pending", &self.scheduler.pending_count())
            .finish()
    }
}
