//! Greedy neighbor-following placement.

use super::{center_positions, normalize, CoordOperator};
use crate::error::Result;
use crate::sugi::{SizeCache, SugiGraph};
use steller_dag::Dag;

/// One top-down pass over a centered start: each node moves to the mean x of
/// its parents, then paired left-to-right and right-to-left sweeps restore
/// the layer's separation. Cheaper than the quadratic operator, straighter
/// than plain centering.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordGreedy;

impl CoordGreedy {
    pub fn new() -> Self {
        Self
    }
}

impl<N, L> CoordOperator<N, L> for CoordGreedy {
    fn run(&self, graph: &mut SugiGraph, _dag: &Dag<N, L>, sizes: &SizeCache) -> Result<f64> {
        let mut xs = center_positions(graph, sizes)?;

        for l in 1..graph.layer_count() {
            let layer: Vec<usize> = graph.layer(l).to_vec();

            for &v in &layer {
                let mut sum = 0.0f64;
                let mut weight = 0.0f64;
                for (p, w) in graph.parents(v) {
                    sum += xs[p] * w as f64;
                    weight += w as f64;
                }
                if weight > 0.0 {
                    xs[v] = sum / weight;
                }
            }

            // De-overlap with paired sweeps: push right along the layer,
            // then clamp back left against each right neighbor. The trailing
            // normalization absorbs any global drift.
            for i in 1..layer.len() {
                let (prev, v) = (layer[i - 1], layer[i]);
                let gap = (sizes.width(prev) + sizes.width(v)) / 2.0;
                if xs[v] < xs[prev] + gap {
                    xs[v] = xs[prev] + gap;
                }
            }
            for i in (0..layer.len().saturating_sub(1)).rev() {
                let (v, next) = (layer[i], layer[i + 1]);
                let gap = (sizes.width(v) + sizes.width(next)) / 2.0;
                if xs[v] > xs[next] - gap {
                    xs[v] = xs[next] - gap;
                }
            }
        }

        Ok(normalize(graph, sizes, &xs))
    }
}
