//! Longest-path layering.
//!
//! Minimal height, potentially wide. Top-down pins every root to layer 0;
//! bottom-up mirrors the computation over children and flips, pinning every
//! leaf to the deepest layer.

use super::{span, LayeringOperator};
use crate::error::Result;
use steller_dag::{Dag, NodeId};

#[derive(Debug, Clone, Copy)]
pub struct LongestPath {
    top_down: bool,
}

impl Default for LongestPath {
    fn default() -> Self {
        Self { top_down: true }
    }
}

impl LongestPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_down(self, top_down: bool) -> Self {
        Self { top_down }
    }

    pub fn top_down(&self) -> bool {
        self.top_down
    }
}

impl<N, L> LayeringOperator<N, L> for LongestPath {
    fn run(&self, dag: &Dag<N, L>) -> Result<Vec<usize>> {
        let mut layer = vec![0usize; dag.node_count()];
        let order: Vec<NodeId> = dag.topo().collect();

        if self.top_down {
            for &v in &order {
                for (w, count) in dag.children(v) {
                    layer[w.index()] = layer[w.index()].max(layer[v.index()] + span(count));
                }
            }
        } else {
            // Height below each node, then flip so leaves share the bottom.
            for &v in order.iter().rev() {
                for (w, count) in dag.children(v) {
                    layer[v.index()] = layer[v.index()].max(layer[w.index()] + span(count));
                }
            }
            let height = layer.iter().copied().max().unwrap_or(0);
            for l in &mut layer {
                *l = height - *l;
            }
        }

        Ok(layer)
    }
}
