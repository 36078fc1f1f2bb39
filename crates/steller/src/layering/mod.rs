//! Layer assignment.
//!
//! A layering maps every node to a non-negative integer layer such that each
//! link descends by at least its span: 1 for simple links, 2 for multi-links
//! so the parallel strands get a waypoint to fan out through.

use crate::error::Result;
use steller_dag::Dag;

mod longest_path;
mod simplex;

pub use longest_path::LongestPath;
pub use simplex::Simplex;

pub trait LayeringOperator<N, L> {
    /// Layer per node, indexed by node id; minimum layer is 0.
    fn run(&self, dag: &Dag<N, L>) -> Result<Vec<usize>>;
}

/// Minimum layer distance a link must cover.
pub(crate) fn span(count: usize) -> usize {
    if count > 1 { 2 } else { 1 }
}
