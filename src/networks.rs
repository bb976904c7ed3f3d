//! Reusable network assemblies.
//!
//! Multidirectional constraints ([`product`], [`quadratic`]), the building
//! height estimates from "The Art of the Propagator" ([`fall_duration`],
//! [`similar_triangles`]) and Heron's square root method ([`sqrt_network`]).

use crate::content::interval::Interval;
use crate::error::PropResult;
use crate::network::{CellId, Network, PropagatorId};
use crate::primitives::{
    absolute_value, adder, constant, divider, inverter, less_than, multiplier, sqrter, squarer, subtractor,
    switch,
};

/// Local gravitational acceleration, with some uncertainty.
pub const GRAVITY: Interval = Interval { low: 9.789, high: 9.832 };

/// Default tolerance of [`good_enough`].
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// `x * y = total`, solvable for any one of the three.
pub fn product(net: &mut Network, x: CellId, y: CellId, total: CellId) -> PropResult<()> {
    multiplier(net, x, y, total)?;
    divider(net, total, x, y)?;
    divider(net, total, y, x)?;
    Ok(())
}

/// `x^2 = x_squared` in both directions.
pub fn quadratic(net: &mut Network, x: CellId, x_squared: CellId) -> PropResult<()> {
    squarer(net, x, x_squared)?;
    sqrter(net, x_squared, x)?;
    Ok(())
}

/// Building height `h = g * t^2 / 2` from the fall time `t` of a dropped
/// barometer. Multidirectional: a known height narrows the fall time.
pub fn fall_duration(net: &mut Network, t: CellId, h: CellId) -> PropResult<PropagatorId> {
    net.compound(&[t], move |net| {
        let g = net.new_cell("g");
        let one_half = net.new_cell("one half");
        let t_squared = net.new_cell("t^2");
        let g_t_squared = net.new_cell("gt^2");

        constant(net, GRAVITY, g)?;
        constant(net, Interval::point(0.5), one_half)?;
        quadratic(net, t, t_squared)?;
        product(net, g, t_squared, g_t_squared)?;
        product(net, one_half, g_t_squared, h)
    })
}

/// Building height from shadow lengths: `h_ba / s_ba = h / s`.
pub fn similar_triangles(
    net: &mut Network,
    s_ba: CellId,
    h_ba: CellId,
    s: CellId,
    h: CellId,
) -> PropResult<PropagatorId> {
    net.compound(&[s_ba, h_ba, s, h], move |net| {
        let ratio = net.new_cell("ratio");
        product(net, s_ba, ratio, h_ba)?;
        product(net, s, ratio, h)
    })
}

/// One Heron step: `h = (g + x / g) / 2`.
pub fn heron_step(net: &mut Network, x: CellId, g: CellId, h: CellId) -> PropResult<PropagatorId> {
    net.compound(&[x, g], move |net| {
        let x_over_g = net.new_cell("x/g");
        let g_plus_x_over_g = net.new_cell("g+x/g");
        let two = net.new_cell("two");

        divider(net, x, g, x_over_g)?;
        adder(net, g, x_over_g, g_plus_x_over_g)?;
        constant(net, 2, two)?;
        divider(net, g_plus_x_over_g, two, h)?;
        Ok(())
    })
}

/// `done = |x - g^2| < epsilon`.
pub fn good_enough(net: &mut Network, g: CellId, x: CellId, done: CellId, epsilon: f64) -> PropResult<PropagatorId> {
    net.compound(&[g, x], move |net| {
        let eps = net.new_cell("eps");
        let g_squared = net.new_cell("g^2");
        let x_minus_g_squared = net.new_cell("x-g^2");
        let abs_x_minus_g_squared = net.new_cell("abs(x-g^2)");

        constant(net, epsilon, eps)?;
        multiplier(net, g, g, g_squared)?;
        subtractor(net, x, g_squared, x_minus_g_squared)?;
        absolute_value(net, x_minus_g_squared, abs_x_minus_g_squared)?;
        less_than(net, abs_x_minus_g_squared, eps, done)?;
        Ok(())
    })
}

/// Refine the guess `g` with Heron steps until it is good enough, then write
/// it to `answer`.
///
/// Each level builds the next one over `x if not(done)`, which stays empty
/// once the guess is good enough, so the recursion stops with the answer.
pub fn sqrt_iter(net: &mut Network, x: CellId, g: CellId, answer: CellId, epsilon: f64) -> PropResult<PropagatorId> {
    net.compound(&[x, g], move |net| {
        tracing::trace!(x = %x, g = %g, "sqrt iteration");
        let done = net.new_cell("done");
        let not_done = net.new_cell("not(done)");
        let x_if_not_done = net.new_cell("x if not(done)");
        let g_if_not_done = net.new_cell("g if not(done)");
        let new_g = net.new_cell("new g");

        good_enough(net, g, x, done, epsilon)?;
        switch(net, done, g, answer)?;
        inverter(net, done, not_done)?;
        switch(net, not_done, x, x_if_not_done)?;
        switch(net, not_done, g, g_if_not_done)?;
        heron_step(net, x_if_not_done, g_if_not_done, new_g)?;
        sqrt_iter(net, x_if_not_done, new_g, answer, epsilon)?;
        Ok(())
    })
}

/// Square root of `x` into `answer`, starting from the guess 1.
pub fn sqrt_network(net: &mut Network, x: CellId, answer: CellId, epsilon: f64) -> PropResult<PropagatorId> {
    net.compound(&[x], move |net| {
        let one = net.new_cell("one");
        constant(net, 1, one)?;
        sqrt_iter(net, x, one, answer, epsilon)?;
        Ok(())
    })
}
