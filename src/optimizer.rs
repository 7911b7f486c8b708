//! Route optimizer for a single day.
//!
//! Reorders the interior of a path while the first and last node stay put.
//! The default pipeline is nearest-neighbor construction followed by 2-opt;
//! Held-Karp is available for small instances when exactness matters.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{PlannerError, Result};
use crate::matrix::TravelTimeMatrix;

/// Largest instance the exact solver accepts.
pub const EXACT_NODE_LIMIT: usize = 12;

/// Fewest nodes for which reordering means anything.
pub const MIN_OPTIMIZE_NODES: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Nearest neighbor + 2-opt.
    #[default]
    Heuristic,
    /// Held-Karp, limited to [`EXACT_NODE_LIMIT`] nodes.
    Exact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeOptions {
    pub strategy: Strategy,
    /// Safety cap on full 2-opt sweeps.
    pub max_two_opt_sweeps: usize,
    /// A 2-opt move must save more than this to be taken.
    pub improvement_epsilon: f64,
    /// Largest instance `Strategy::Exact` will take on. Values above
    /// [`EXACT_NODE_LIMIT`] are capped to it.
    pub exact_node_limit: usize,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Heuristic,
            max_two_opt_sweeps: 2000,
            improvement_epsilon: 1e-6,
            exact_node_limit: EXACT_NODE_LIMIT,
        }
    }
}

/// Reorder all nodes of `matrix` into a path starting at `first` and
/// ending at `last`.
pub fn optimize(
    matrix: &TravelTimeMatrix,
    first: usize,
    last: usize,
    options: &OptimizeOptions,
) -> Result<Vec<usize>> {
    let n = matrix.len();
    if n < MIN_OPTIMIZE_NODES {
        return Err(PlannerError::InsufficientNodes {
            nodes: n,
            min: MIN_OPTIMIZE_NODES,
        });
    }
    for index in [first, last] {
        if index >= n {
            return Err(PlannerError::IndexOutOfRange { index, len: n });
        }
    }
    if first == last {
        return Err(PlannerError::FixedEndpoints { index: first });
    }

    let order = match options.strategy {
        Strategy::Heuristic => {
            let constructed = nearest_neighbor(matrix, first, last);
            let constructed_cost = path_cost(matrix, &constructed);
            let improved = two_opt(matrix, &constructed, options);
            debug!(
                nodes = n,
                constructed_cost,
                improved_cost = path_cost(matrix, &improved),
                "heuristic route optimization"
            );
            improved
        }
        Strategy::Exact => {
            let limit = options.exact_node_limit.min(EXACT_NODE_LIMIT);
            let order = held_karp_within(matrix, first, Some(last), limit)?;
            debug!(nodes = n, cost = path_cost(matrix, &order), "exact route optimization");
            order
        }
    };

    Ok(order)
}

/// Total cost of walking `order`, with unreachable legs at the penalty.
pub fn path_cost(matrix: &TravelTimeMatrix, order: &[usize]) -> f64 {
    order.windows(2).map(|leg| matrix.cost(leg[0], leg[1])).sum()
}

/// Greedy construction from `first`, appending `last` at the very end.
///
/// Only reachable candidates are considered; ties go to the lowest index.
/// If the walk gets stuck, the remaining nodes trail in index order.
///
/// # Panics
///
/// Panics if `first` or `last` is not a node of `matrix`. Use [`optimize`]
/// for checked input.
pub fn nearest_neighbor(matrix: &TravelTimeMatrix, first: usize, last: usize) -> Vec<usize> {
    let n = matrix.len();
    let mut visited = vec![false; n];
    visited[first] = true;
    visited[last] = true;

    let mut order = Vec::with_capacity(n);
    order.push(first);
    let mut current = first;

    loop {
        let mut best: Option<(usize, f64)> = None;
        for candidate in (0..n).filter(|&j| !visited[j]) {
            if let Some(cost) = matrix.seconds(current, candidate) {
                if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                    best = Some((candidate, cost));
                }
            }
        }

        let Some((next, _)) = best else { break };
        visited[next] = true;
        order.push(next);
        current = next;
    }

    let stranded: Vec<usize> = (0..n).filter(|&j| !visited[j]).collect();
    if !stranded.is_empty() {
        trace!(stranded = stranded.len(), "nearest neighbor ran out of reachable nodes");
        order.extend(stranded);
    }

    if last != first {
        order.push(last);
    }
    order
}

/// 2-opt refinement over the interior of `order`.
///
/// Position 0 and the last position are never touched. Sweeps repeat until
/// one finds no improving reversal or the sweep cap is hit.
///
/// # Panics
///
/// Panics if `order` names a node outside `matrix`.
pub fn two_opt(matrix: &TravelTimeMatrix, order: &[usize], options: &OptimizeOptions) -> Vec<usize> {
    let mut best = order.to_vec();
    let n = best.len();
    if n < 4 {
        return best;
    }

    let mut best_cost = path_cost(matrix, &best);
    let mut sweeps = 0;

    while sweeps < options.max_two_opt_sweeps {
        sweeps += 1;
        let mut improved = false;

        for i in 1..n - 2 {
            for k in i + 1..n - 1 {
                best[i..=k].reverse();
                let cost = path_cost(matrix, &best);
                if cost + options.improvement_epsilon < best_cost {
                    best_cost = cost;
                    improved = true;
                } else {
                    best[i..=k].reverse();
                }
            }
        }

        if !improved {
            break;
        }
    }

    trace!(sweeps, cost = best_cost, "2-opt finished");
    best
}

/// Exact shortest Hamiltonian path from `start`, free end.
pub fn held_karp_path(matrix: &TravelTimeMatrix, start: usize) -> Result<Vec<usize>> {
    held_karp(matrix, start, None)
}

/// Bitmask DP over visited sets. `dp[mask][j]` is the cheapest way to
/// reach `j` having visited exactly `mask`. With `end` set, that node may
/// only be entered last.
pub fn held_karp(matrix: &TravelTimeMatrix, start: usize, end: Option<usize>) -> Result<Vec<usize>> {
    held_karp_within(matrix, start, end, EXACT_NODE_LIMIT)
}

fn held_karp_within(
    matrix: &TravelTimeMatrix,
    start: usize,
    end: Option<usize>,
    limit: usize,
) -> Result<Vec<usize>> {
    let n = matrix.len();
    if n > limit {
        return Err(PlannerError::ExactSolverLimit { nodes: n, limit });
    }
    for index in std::iter::once(start).chain(end) {
        if index >= n {
            return Err(PlannerError::IndexOutOfRange { index, len: n });
        }
    }
    if n == 1 {
        return Ok(vec![start]);
    }
    if end == Some(start) {
        return Err(PlannerError::FixedEndpoints { index: start });
    }

    let size = 1usize << n;
    let full = size - 1;
    let start_mask = 1usize << start;
    let mut dp = vec![f64::INFINITY; size * n];
    let mut parent = vec![usize::MAX; size * n];
    dp[start_mask * n + start] = 0.0;

    for mask in 0..size {
        if mask & start_mask == 0 {
            continue;
        }
        for j in (0..n).filter(|&j| mask & (1 << j) != 0) {
            let reached = dp[mask * n + j];
            if !reached.is_finite() {
                continue;
            }
            for k in (0..n).filter(|&k| mask & (1 << k) == 0) {
                let next_mask = mask | (1 << k);
                if end == Some(k) && next_mask != full {
                    continue;
                }
                let cost = reached + matrix.cost(j, k);
                let slot = next_mask * n + k;
                if cost < dp[slot] {
                    dp[slot] = cost;
                    parent[slot] = j;
                }
            }
        }
    }

    let tail = match end {
        Some(end) => end,
        None => (0..n)
            .min_by(|&a, &b| dp[full * n + a].total_cmp(&dp[full * n + b]))
            .unwrap_or(start),
    };

    let mut order = Vec::with_capacity(n);
    let mut mask = full;
    let mut current = tail;
    while current != usize::MAX {
        order.push(current);
        let previous = parent[mask * n + current];
        mask &= !(1 << current);
        current = previous;
    }
    order.reverse();

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> TravelTimeMatrix {
        TravelTimeMatrix::from_rows(rows).unwrap()
    }

    /// Points on a line at the given coordinates; cost is distance.
    fn line(points: &[f64]) -> TravelTimeMatrix {
        matrix(
            points
                .iter()
                .map(|a| points.iter().map(|b| (a - b).abs()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_nearest_neighbor_prefers_lowest_index_on_tie() {
        let m = TravelTimeMatrix::uniform(5, 10.0);
        assert_eq!(nearest_neighbor(&m, 0, 4), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_nearest_neighbor_appends_stranded_nodes() {
        let inf = f64::INFINITY;
        let m = matrix(vec![
            vec![0.0, inf, 5.0, inf, 1.0],
            vec![inf, 0.0, inf, inf, 1.0],
            vec![5.0, inf, 0.0, inf, 1.0],
            vec![inf, inf, inf, 0.0, 1.0],
            vec![1.0, 1.0, 1.0, 1.0, 0.0],
        ]);
        let order = nearest_neighbor(&m, 0, 4);
        assert_eq!(order, vec![0, 2, 1, 3, 4]);
    }

    #[test]
    fn test_two_opt_keeps_short_paths() {
        let m = line(&[0.0, 2.0, 1.0]);
        assert_eq!(two_opt(&m, &[0, 1, 2], &OptimizeOptions::default()), vec![0, 1, 2]);
    }

    #[test]
    fn test_two_opt_untangles_line() {
        let m = line(&[0.0, 3.0, 1.0, 2.0, 4.0]);
        let improved = two_opt(&m, &[0, 1, 2, 3, 4], &OptimizeOptions::default());
        assert_eq!(improved, vec![0, 2, 3, 1, 4]);
        assert_eq!(path_cost(&m, &improved), 4.0);
    }

    #[test]
    fn test_two_opt_respects_sweep_cap() {
        let m = line(&[0.0, 3.0, 1.0, 2.0, 4.0]);
        let options = OptimizeOptions {
            max_two_opt_sweeps: 0,
            ..OptimizeOptions::default()
        };
        assert_eq!(two_opt(&m, &[0, 1, 2, 3, 4], &options), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_optimize_rejects_small_instances() {
        let m = TravelTimeMatrix::uniform(2, 1.0);
        let err = optimize(&m, 0, 1, &OptimizeOptions::default()).unwrap_err();
        assert!(matches!(err, PlannerError::InsufficientNodes { nodes: 2, min: 3 }));
    }

    #[test]
    fn test_optimize_rejects_bad_endpoints() {
        let m = TravelTimeMatrix::uniform(4, 1.0);
        assert!(matches!(
            optimize(&m, 0, 0, &OptimizeOptions::default()),
            Err(PlannerError::FixedEndpoints { index: 0 })
        ));
        assert!(matches!(
            optimize(&m, 0, 9, &OptimizeOptions::default()),
            Err(PlannerError::IndexOutOfRange { index: 9, len: 4 })
        ));
    }

    #[test]
    fn test_optimize_with_non_default_endpoints() {
        let m = line(&[5.0, 0.0, 3.0, 10.0]);
        let order = optimize(&m, 1, 3, &OptimizeOptions::default()).unwrap();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_held_karp_free_end() {
        let m = line(&[2.0, 0.0, 1.0, 3.0]);
        let order = held_karp_path(&m, 0).unwrap();
        assert_eq!(order[0], 0);
        assert_eq!(path_cost(&m, &order), 4.0);
    }

    #[test]
    fn test_held_karp_fixed_end() {
        let m = line(&[0.0, 3.0, 1.0, 2.0, 4.0]);
        let order = held_karp(&m, 0, Some(4)).unwrap();
        assert_eq!(order, vec![0, 2, 3, 1, 4]);
    }

    #[test]
    fn test_held_karp_limit() {
        let m = TravelTimeMatrix::uniform(EXACT_NODE_LIMIT + 1, 1.0);
        assert!(matches!(
            held_karp_path(&m, 0),
            Err(PlannerError::ExactSolverLimit { nodes: 13, limit: 12 })
        ));
        let options = OptimizeOptions {
            strategy: Strategy::Exact,
            ..OptimizeOptions::default()
        };
        assert!(optimize(&m, 0, 12, &options).is_err());
    }

    #[test]
    fn test_held_karp_single_node() {
        let m = TravelTimeMatrix::uniform(1, 0.0);
        assert_eq!(held_karp_path(&m, 0).unwrap(), vec![0]);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: OptimizeOptions = serde_json::from_str(r#"{"strategy":"exact"}"#).unwrap();
        assert_eq!(options.strategy, Strategy::Exact);
        assert_eq!(options.max_two_opt_sweeps, 2000);
        assert_eq!(options.exact_node_limit, EXACT_NODE_LIMIT);
    }

    #[test]
    fn test_exact_node_limit_option() {
        let m = line(&[0.0, 3.0, 1.0, 2.0, 4.0, 6.0]);
        let tight = OptimizeOptions {
            strategy: Strategy::Exact,
            exact_node_limit: 5,
            ..OptimizeOptions::default()
        };
        assert!(matches!(
            optimize(&m, 0, 5, &tight),
            Err(PlannerError::ExactSolverLimit { nodes: 6, limit: 5 })
        ));

        let roomy = OptimizeOptions { exact_node_limit: 6, ..tight };
        assert_eq!(optimize(&m, 0, 5, &roomy).unwrap(), vec![0, 2, 3, 1, 4, 5]);
    }

    #[test]
    fn test_exact_node_limit_is_capped() {
        let m = TravelTimeMatrix::uniform(EXACT_NODE_LIMIT + 1, 1.0);
        let options = OptimizeOptions {
            strategy: Strategy::Exact,
            exact_node_limit: 64,
            ..OptimizeOptions::default()
        };
        assert!(matches!(
            optimize(&m, 0, EXACT_NODE_LIMIT, &options),
            Err(PlannerError::ExactSolverLimit { nodes: 13, limit: 12 })
        ));
    }
}
