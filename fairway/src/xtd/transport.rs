//! An exact solver for the balanced transportation problem, used as the
//! ground engine of the Wasserstein kernel.
//!
//! Classic transportation simplex: a north-west-corner initial basis, MODI
//! potentials, and first-negative-reduced-cost pivoting, so the pivot
//! sequence is deterministic. A pivot cap bounds degenerate stalls; hitting
//! it is reported as non-convergence, never as a partial result.

use std::collections::VecDeque;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum TransportError {
    #[error("transportation simplex did not converge within {0} pivots")]
    IterationLimit(usize),
}

/// Minimum total cost of moving `supply` onto `demand` with the given
/// row-major `cost` table. Both mass vectors must be non-negative and have
/// (numerically) equal totals.
pub(crate) fn minimum_cost(
    supply: &[f64],
    demand: &[f64],
    cost: &[f64],
) -> Result<f64, TransportError> {
    let n = supply.len();
    let m = demand.len();
    debug_assert_eq!(cost.len(), n * m);

    let mut flow = vec![0.0f64; n * m];
    let mut basis = vec![false; n * m];

    // north-west corner start: walks from (0,0) to (n-1,m-1), one basic
    // cell per step, n+m-1 cells total, which spans the bipartite
    // row/column graph as a tree
    {
        let mut s = supply.to_vec();
        let mut d = demand.to_vec();
        let (mut i, mut j) = (0usize, 0usize);
        loop {
            let moved = s[i].min(d[j]);
            flow[i * m + j] = moved;
            basis[i * m + j] = true;
            s[i] -= moved;
            d[j] -= moved;
            if i == n - 1 && j == m - 1 {
                break;
            }
            if s[i] <= d[j] && i < n - 1 {
                i += 1;
            } else if j < m - 1 {
                j += 1;
            } else {
                i += 1;
            }
        }
    }

    let max_cost = cost.iter().cloned().fold(0.0, f64::max);
    let tolerance = 1e-9 * (1.0 + max_cost);
    let pivot_cap = 200 * (n + m);

    let mut row_cols: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut col_rows: Vec<Vec<usize>> = vec![Vec::new(); m];

    for _ in 0..pivot_cap {
        // MODI potentials over the basis tree
        row_cols.iter_mut().for_each(Vec::clear);
        col_rows.iter_mut().for_each(Vec::clear);
        for r in 0..n {
            for c in 0..m {
                if basis[r * m + c] {
                    row_cols[r].push(c);
                    col_rows[c].push(r);
                }
            }
        }
        let mut u = vec![f64::NAN; n];
        let mut v = vec![f64::NAN; m];
        u[0] = 0.0;
        let mut queue = VecDeque::from([0usize]);
        while let Some(node) = queue.pop_front() {
            if node < n {
                for &c in &row_cols[node] {
                    if v[c].is_nan() {
                        v[c] = cost[node * m + c] - u[node];
                        queue.push_back(n + c);
                    }
                }
            } else {
                let c = node - n;
                for &r in &col_rows[c] {
                    if u[r].is_nan() {
                        u[r] = cost[r * m + c] - v[c];
                        queue.push_back(r);
                    }
                }
            }
        }

        // Bland: the first non-basic cell with negative reduced cost enters
        let mut entering = None;
        'scan: for r in 0..n {
            for c in 0..m {
                if !basis[r * m + c] && cost[r * m + c] - u[r] - v[c] < -tolerance {
                    entering = Some((r, c));
                    break 'scan;
                }
            }
        }
        let Some((er, ec)) = entering else {
            return Ok(flow.iter().zip(cost).map(|(f, c)| f * c).sum());
        };

        // the unique cycle: the entering cell plus the tree path from
        // column ec back to row er
        let Some(path) = tree_path(n, m, &row_cols, &col_rows, er, ec) else {
            // a disconnected basis can only come from numerical corruption
            return Err(TransportError::IterationLimit(pivot_cap));
        };
        // edges at even path offsets carry the opposing sign
        let mut theta = f64::INFINITY;
        let mut leaving = (er, ec);
        for (offset, &(r, c)) in path.iter().enumerate() {
            if offset % 2 == 0 && flow[r * m + c] < theta {
                theta = flow[r * m + c];
                leaving = (r, c);
            }
        }
        flow[er * m + ec] += theta;
        basis[er * m + ec] = true;
        for (offset, &(r, c)) in path.iter().enumerate() {
            if offset % 2 == 0 {
                flow[r * m + c] -= theta;
            } else {
                flow[r * m + c] += theta;
            }
        }
        flow[leaving.0 * m + leaving.1] = 0.0;
        basis[leaving.0 * m + leaving.1] = false;
    }

    Err(TransportError::IterationLimit(pivot_cap))
}

/// Basic cells along the tree path from column `ec` to row `er`, in order.
/// The path alternates column/row nodes, so its edges alternate against the
/// entering cell's sign.
fn tree_path(
    n: usize,
    m: usize,
    row_cols: &[Vec<usize>],
    col_rows: &[Vec<usize>],
    er: usize,
    ec: usize,
) -> Option<Vec<(usize, usize)>> {
    // nodes: rows 0..n, columns n..n+m
    let mut parent = vec![usize::MAX; n + m];
    let start = n + ec;
    parent[start] = start;
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        if node == er {
            break;
        }
        if node < n {
            for &c in &row_cols[node] {
                if parent[n + c] == usize::MAX {
                    parent[n + c] = node;
                    queue.push_back(n + c);
                }
            }
        } else {
            let c = node - n;
            for &r in &col_rows[c] {
                if parent[r] == usize::MAX {
                    parent[r] = node;
                    queue.push_back(r);
                }
            }
        }
    }

    if parent[er] == usize::MAX {
        return None;
    }
    let mut cells = Vec::new();
    let mut node = er;
    while node != start {
        let up = parent[node];
        let (r, c) = if node < n { (node, up - n) } else { (up, node - n) };
        cells.push((r, c));
        node = up;
    }
    Some(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_cell() {
        assert_relative_eq!(minimum_cost(&[1.0], &[1.0], &[5.0]).unwrap(), 5.0);
    }

    #[test]
    fn identity_assignment_costs_nothing() {
        let cost = vec![0.0, 1.0, 1.0, 0.0];
        let total = minimum_cost(&[0.5, 0.5], &[0.5, 0.5], &cost).unwrap();
        assert_relative_eq!(total, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn imbalanced_rows_spill_over() {
        // 0.1 of mass has to cross at unit cost
        let cost = vec![0.0, 1.0, 1.0, 0.0];
        let total = minimum_cost(&[0.6, 0.4], &[0.5, 0.5], &cost).unwrap();
        assert_relative_eq!(total, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn shifted_point_masses_pay_the_line_metric() {
        // mass at positions 0..4 moved one slot to the right
        let n = 5;
        let supply = vec![0.2; n];
        let mut demand = vec![0.2; n];
        demand[0] = 0.0;
        demand[4] = 0.4;
        let cost: Vec<f64> = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i as f64 - j as f64).abs()))
            .collect();
        // each of the five packets moves right by its distance to its slot;
        // optimal plan shifts everything one step: total = 0.2 * (1+1+1+1) + 0
        let total = minimum_cost(&supply, &demand, &cost).unwrap();
        assert_relative_eq!(total, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_equal_masses_converge() {
        let n = 6;
        let supply = vec![1.0 / n as f64; n];
        let demand = supply.clone();
        let cost: Vec<f64> = (0..n)
            .flat_map(|i| (0..n).map(move |j| ((i as f64) - (j as f64)).powi(2)))
            .collect();
        let total = minimum_cost(&supply, &demand, &cost).unwrap();
        assert_relative_eq!(total, 0.0, epsilon = 1e-12);
    }
}
