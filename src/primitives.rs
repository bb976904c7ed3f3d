//! Primitive propagator factories.
//!
//! Each factory wires one propagator into a network. Lifted primitives apply
//! a generic operator to their inputs' contents and write the result to the
//! output cell, staying silent until every input has content.

use crate::error::PropResult;
use crate::network::{CellId, Network, PropagatorId};
use crate::operators::{ABS, ADD, DIV, GE, GT, LE, LT, MUL, NOT, SQRT, SQUARE, SUB};
use crate::value::Value;

/// Propagator writing `operator(inputs...)` into `output` once no input is
/// [`Value::Nothing`].
pub fn primitive(net: &mut Network, operator: &'static str, inputs: &[CellId], output: CellId) -> PropResult<PropagatorId> {
    let cells = inputs.to_vec();
    net.named_propagator(operator, inputs, move |net| {
        let mut args = Vec::with_capacity(cells.len());
        for &cell in &cells {
            let content = net.content(cell)?;
            if content.is_nothing() {
                return Ok(());
            }
            args.push(content.clone());
        }
        let result = net.generics().call(operator, &args)?;
        net.add_content(output, result)
    })
}

pub fn adder(net: &mut Network, a: CellId, b: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, ADD, &[a, b], output)
}

pub fn subtractor(net: &mut Network, a: CellId, b: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, SUB, &[a, b], output)
}

pub fn multiplier(net: &mut Network, a: CellId, b: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, MUL, &[a, b], output)
}

pub fn divider(net: &mut Network, a: CellId, b: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, DIV, &[a, b], output)
}

pub fn squarer(net: &mut Network, input: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, SQUARE, &[input], output)
}

pub fn sqrter(net: &mut Network, input: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, SQRT, &[input], output)
}

pub fn absolute_value(net: &mut Network, input: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, ABS, &[input], output)
}

pub fn less_than(net: &mut Network, a: CellId, b: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, LT, &[a, b], output)
}

pub fn greater_than(net: &mut Network, a: CellId, b: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, GT, &[a, b], output)
}

pub fn less_or_equal(net: &mut Network, a: CellId, b: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, LE, &[a, b], output)
}

pub fn greater_or_equal(net: &mut Network, a: CellId, b: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, GE, &[a, b], output)
}

/// Boolean negation of the input's truthiness.
pub fn inverter(net: &mut Network, input: CellId, output: CellId) -> PropResult<PropagatorId> {
    primitive(net, NOT, &[input], output)
}

/// Zero-input propagator that writes `value` into `output` when first run.
pub fn constant(net: &mut Network, value: impl Into<Value>, output: CellId) -> PropResult<PropagatorId> {
    let value = value.into();
    net.named_propagator("constant", &[], move |net| net.add_content(output, value.clone()))
}

/// Copy `if_true` or `if_false` into `output` depending on the truthiness of
/// `predicate`. Nothing happens while `predicate` is empty.
pub fn conditional(
    net: &mut Network,
    predicate: CellId,
    if_true: CellId,
    if_false: CellId,
    output: CellId,
) -> PropResult<PropagatorId> {
    net.named_propagator("conditional", &[predicate, if_true, if_false], move |net| {
        let chosen = match net.content(predicate)? {
            Value::Nothing => return Ok(()),
            p if p.truthy() => if_true,
            _ => if_false,
        };
        let content = net.content(chosen)?.clone();
        net.add_content(output, content)
    })
}

/// Copy `if_true` into `output` while `predicate` is true.
pub fn switch(net: &mut Network, predicate: CellId, if_true: CellId, output: CellId) -> PropResult<PropagatorId> {
    let never = net.anonymous_cell();
    conditional(net, predicate, if_true, never, output)
}
