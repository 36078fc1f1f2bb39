//! Coordinate assignment.
//!
//! Operators write an x coordinate into every sugi-node and report the total
//! width. Within every layer the result must keep adjacent nodes at least
//! half their summed widths apart; the orchestrator verifies this before
//! writing anything back to the user DAG.

use crate::error::{Error, Result};
use crate::sugi::{SizeCache, SugiGraph};
use steller_dag::Dag;

mod center;
mod greedy;
mod quad;

pub use center::CoordCenter;
pub use greedy::CoordGreedy;
pub use quad::CoordQuad;

pub trait CoordOperator<N, L> {
    /// Writes x coordinates and returns the total width.
    fn run(&self, graph: &mut SugiGraph, dag: &Dag<N, L>, sizes: &SizeCache) -> Result<f64>;
}

/// Center-packed x per node: cumulative half-width placement within each
/// layer, every layer centered on the widest one.
///
/// Shared by the center operator, the greedy start, and the quadratic
/// operator's feasible start.
pub(crate) fn center_positions(graph: &SugiGraph, sizes: &SizeCache) -> Result<Vec<f64>> {
    if (0..graph.node_count()).all(|v| sizes.width(v) <= 0.0) {
        return Err(Error::ZeroWidth);
    }

    let mut xs = vec![0.0f64; graph.node_count()];
    let mut layer_widths: Vec<f64> = Vec::with_capacity(graph.layer_count());

    for layer in graph.layers() {
        let mut cursor = 0.0f64;
        let mut prev_width: Option<f64> = None;
        for &v in layer {
            let width = sizes.width(v);
            cursor += match prev_width {
                Some(prev) => (prev + width) / 2.0,
                None => width / 2.0,
            };
            xs[v] = cursor;
            prev_width = Some(width);
        }
        layer_widths.push(cursor + prev_width.unwrap_or(0.0) / 2.0);
    }

    let max_width = layer_widths.iter().copied().fold(0.0f64, f64::max);
    for (layer, &width) in graph.layers().iter().zip(&layer_widths) {
        let offset = (max_width - width) / 2.0;
        for &v in layer {
            xs[v] += offset;
        }
    }

    Ok(xs)
}

/// Shifts `xs` so the leftmost extent sits at zero and returns the width.
pub(crate) fn normalize(graph: &mut SugiGraph, sizes: &SizeCache, xs: &[f64]) -> f64 {
    let mut left = f64::INFINITY;
    let mut right = f64::NEG_INFINITY;
    for v in 0..graph.node_count() {
        left = left.min(xs[v] - sizes.width(v) / 2.0);
        right = right.max(xs[v] + sizes.width(v) / 2.0);
    }
    if !left.is_finite() {
        return 0.0;
    }
    for v in 0..graph.node_count() {
        graph.set_x(v, xs[v] - left);
    }
    right - left
}
