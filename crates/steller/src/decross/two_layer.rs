//! Two-layer sweep heuristic.
//!
//! Alternating descending and ascending passes reorder one layer at a time by
//! an aggregate of each node's neighbor positions in the fixed layer. Nodes
//! without neighbors hold their slot, and ties keep the prior order, so a
//! stable input stays stable.

use super::DecrossOperator;
use crate::error::Result;
use crate::sugi::SugiGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    #[default]
    Median,
    /// Weighted mean over link weights.
    Mean,
}

#[derive(Debug, Clone, Copy)]
pub struct TwoLayer {
    passes: usize,
    agg: Aggregation,
}

impl Default for TwoLayer {
    fn default() -> Self {
        Self {
            passes: 24,
            agg: Aggregation::Median,
        }
    }
}

impl TwoLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_passes(self, passes: usize) -> Self {
        Self { passes, ..self }
    }

    pub fn with_aggregation(self, agg: Aggregation) -> Self {
        Self { agg, ..self }
    }
}

impl DecrossOperator for TwoLayer {
    fn run(&self, graph: &mut SugiGraph) -> Result<()> {
        if graph.layer_count() < 2 {
            return Ok(());
        }

        let mut positions = graph.positions();
        for _ in 0..self.passes {
            let mut changed = false;

            for l in 1..graph.layer_count() {
                changed |= reorder(graph, &mut positions, l, Direction::Down, self.agg);
            }
            for l in (0..graph.layer_count() - 1).rev() {
                changed |= reorder(graph, &mut positions, l, Direction::Up, self.agg);
            }

            if !changed {
                break;
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    /// Fixed layer above the moving one.
    Down,
    /// Fixed layer below.
    Up,
}

/// Reorders layer `l` against its fixed neighbor; returns whether the order
/// changed.
fn reorder(
    graph: &mut SugiGraph,
    positions: &mut Vec<usize>,
    l: usize,
    direction: Direction,
    agg: Aggregation,
) -> bool {
    let current: Vec<usize> = graph.layer(l).to_vec();

    // (original index, node, aggregated neighbor position).
    let mut sortable: Vec<(usize, usize, f64)> = Vec::new();
    let mut fixed: Vec<(usize, usize)> = Vec::new();

    for (i, &v) in current.iter().enumerate() {
        let neighbors: Vec<(usize, usize)> = match direction {
            Direction::Down => graph.parents(v).collect(),
            Direction::Up => graph.children(v).collect(),
        };
        match aggregate(&neighbors, positions, agg) {
            Some(value) => sortable.push((i, v, value)),
            None => fixed.push((i, v)),
        }
    }

    sortable.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.cmp(&b.0)));
    // Smallest original index last so it pops first.
    fixed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut order: Vec<usize> = Vec::with_capacity(current.len());
    let consume_fixed = |order: &mut Vec<usize>, fixed: &mut Vec<(usize, usize)>| {
        while let Some(&(i, v)) = fixed.last() {
            if i > order.len() {
                break;
            }
            order.push(v);
            fixed.pop();
        }
    };

    consume_fixed(&mut order, &mut fixed);
    for &(_, v, _) in &sortable {
        order.push(v);
        consume_fixed(&mut order, &mut fixed);
    }

    if order == current {
        return false;
    }
    for (i, &v) in order.iter().enumerate() {
        positions[v] = i;
    }
    graph.set_order(l, order);
    true
}

fn aggregate(
    neighbors: &[(usize, usize)],
    positions: &[usize],
    agg: Aggregation,
) -> Option<f64> {
    if neighbors.is_empty() {
        return None;
    }
    match agg {
        Aggregation::Median => {
            let mut values: Vec<f64> = neighbors
                .iter()
                .map(|&(v, _)| positions[v] as f64)
                .collect();
            values.sort_by(f64::total_cmp);
            let mid = values.len() / 2;
            if values.len() % 2 == 1 {
                Some(values[mid])
            } else {
                Some((values[mid - 1] + values[mid]) / 2.0)
            }
        }
        Aggregation::Mean => {
            let mut sum = 0.0;
            let mut weight = 0.0;
            for &(v, w) in neighbors {
                sum += positions[v] as f64 * w as f64;
                weight += w as f64;
            }
            Some(sum / weight)
        }
    }
}
