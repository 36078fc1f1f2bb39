//! Centered packing.

use super::{center_positions, normalize, CoordOperator};
use crate::error::Result;
use crate::sugi::{SizeCache, SugiGraph};
use steller_dag::Dag;

/// Packs every layer left-to-right and centers it on the widest layer.
/// Cheap, ignores edges entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordCenter;

impl CoordCenter {
    pub fn new() -> Self {
        Self
    }
}

impl<N, L> CoordOperator<N, L> for CoordCenter {
    fn run(&self, graph: &mut SugiGraph, _dag: &Dag<N, L>, sizes: &SizeCache) -> Result<f64> {
        let xs = center_positions(graph, sizes)?;
        Ok(normalize(graph, sizes, &xs))
    }
}
