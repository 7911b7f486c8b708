//! Per-day re-optimization and plan bookkeeping.
//!
//! A day is the caller's ordered list of stops plus the travel mode into
//! each of them. Optimizing a day chains flight hops into blocks, reorders
//! the blocks between the fixed first and last one, and reattaches every
//! mode to its destination stop.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::debug;

use crate::blocks::{chain, expand, is_flight_hop};
use crate::error::{PlannerError, Result};
use crate::matrix::TravelTimeMatrix;
use crate::optimizer::{optimize, path_cost, OptimizeOptions, MIN_OPTIMIZE_NODES};
use crate::traits::{Id, Stop, TravelMode};

#[derive(Debug, Clone, PartialEq)]
pub struct DayOptimization<I> {
    pub stop_ids: Vec<I>,
    /// Mode into each stop of `stop_ids`, same length.
    pub modes: Vec<TravelMode>,
    /// False when the optimized order equals the input order.
    pub changed: bool,
    pub cost_before: f64,
    pub cost_after: f64,
}

/// Reorder one day's stops.
///
/// `matrix` is indexed by the position of each stop in `stops`; `modes[i]`
/// is the mode into `stops[i]` (driving when missing).
pub fn optimize_day<S: Stop>(
    stops: &[S],
    modes: &[TravelMode],
    matrix: &TravelTimeMatrix,
    options: &OptimizeOptions,
) -> Result<DayOptimization<S::Id>> {
    let n = stops.len();
    if n < MIN_OPTIMIZE_NODES {
        return Err(PlannerError::InsufficientNodes {
            nodes: n,
            min: MIN_OPTIMIZE_NODES,
        });
    }
    matrix.ensure_len(n)?;

    let positions: Vec<usize> = (0..n).collect();
    let blocks = chain(&positions, modes, |&prev, &current, mode| {
        is_flight_hop(stops[prev].kind(), stops[current].kind(), mode)
    });
    let cost_before = path_cost(matrix, &positions);

    let reordered = if blocks.len() < MIN_OPTIMIZE_NODES {
        debug!(stops = n, blocks = blocks.len(), "nothing movable between fixed ends");
        positions.clone()
    } else {
        let block_matrix = matrix.block_matrix(&blocks)?;
        let order = optimize(&block_matrix, 0, blocks.len() - 1, options)?;
        let ordered: Vec<_> = order.into_iter().map(|b| blocks[b].clone()).collect();
        expand(&ordered)
    };

    let cost_after = path_cost(matrix, &reordered);
    let mode_into = |position: usize| modes.get(position).copied().unwrap_or_default();
    let next_modes = reordered
        .iter()
        .enumerate()
        .map(|(i, &position)| if i == 0 { mode_into(0) } else { mode_into(position) })
        .collect();

    debug!(stops = n, blocks = blocks.len(), cost_before, cost_after, "day optimized");

    Ok(DayOptimization {
        changed: reordered != positions,
        stop_ids: reordered.iter().map(|&p| stops[p].id().clone()).collect(),
        modes: next_modes,
        cost_before,
        cost_after,
    })
}

/// One independent day to optimize.
#[derive(Debug, Clone, Copy)]
pub struct DayInput<'a, S> {
    pub stops: &'a [S],
    pub modes: &'a [TravelMode],
    pub matrix: &'a TravelTimeMatrix,
}

/// Optimize independent days in parallel. Results keep input order.
pub fn optimize_days<S>(days: &[DayInput<'_, S>], options: &OptimizeOptions) -> Vec<Result<DayOptimization<S::Id>>>
where
    S: Stop + Sync,
    S::Id: Send,
{
    days.par_iter()
        .map(|day| optimize_day(day.stops, day.modes, day.matrix, options))
        .collect()
}

/// Day lists and modes after reconciliation with the current stop set.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledDays<I> {
    pub days: Vec<Vec<I>>,
    pub modes: Vec<Vec<TravelMode>>,
}

/// Bring a stored day-by-day plan in line with the stops that exist.
///
/// Unknown ids are dropped, an id appearing on several days keeps only its
/// first occurrence, stops missing from every day are appended to the last
/// day, and there is always at least one day. Each id keeps the mode it
/// had at its first occurrence.
pub fn reconcile_days<I: Id>(
    days: &[Vec<I>],
    modes: &[Vec<TravelMode>],
    known: &[I],
    default_mode: TravelMode,
) -> ReconciledDays<I> {
    let known_set: HashSet<&I> = known.iter().collect();

    let mut mode_by_id: HashMap<&I, TravelMode> = HashMap::new();
    for (day, ids) in days.iter().enumerate() {
        for (i, id) in ids.iter().enumerate() {
            let mode = modes.get(day).and_then(|m| m.get(i)).copied().unwrap_or(default_mode);
            mode_by_id.entry(id).or_insert(mode);
        }
    }

    let mut seen: HashSet<&I> = HashSet::new();
    let mut next: Vec<Vec<I>> = days
        .iter()
        .map(|ids| {
            ids.iter()
                .filter(|id| known_set.contains(id) && seen.insert(*id))
                .cloned()
                .collect()
        })
        .collect();

    if next.is_empty() {
        next.push(Vec::new());
    }

    let missing: Vec<I> = known.iter().filter(|id| !seen.contains(id)).cloned().collect();
    if let Some(last) = next.last_mut() {
        last.extend(missing);
    }

    let modes = next
        .iter()
        .map(|ids| {
            ids.iter()
                .map(|id| mode_by_id.get(id).copied().unwrap_or(default_mode))
                .collect()
        })
        .collect();

    ReconciledDays { days: next, modes }
}
