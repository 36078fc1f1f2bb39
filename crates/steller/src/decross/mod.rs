//! Crossing minimization.
//!
//! Operators permute nodes within layers; they never add or remove nodes.
//! Dummy waypoints participate exactly like real nodes.

use crate::error::Result;
use crate::sugi::SugiGraph;
use crate::util::bigrams;

mod opt;
mod two_layer;

pub use opt::{DecrossOpt, OptLarge};
pub use two_layer::{Aggregation, TwoLayer};

pub trait DecrossOperator {
    fn run(&self, graph: &mut SugiGraph) -> Result<()>;
}

/// Total weighted link crossings over all adjacent layer pairs.
///
/// Two links cross when their endpoint orders disagree; parallel strands
/// multiply, so a pair of multi-links contributes the product of weights.
pub fn count_crossings(graph: &SugiGraph) -> usize {
    let positions = graph.positions();
    let mut total = 0usize;

    for (top, _) in bigrams(graph.layers()) {
        let mut segments: Vec<(usize, usize, usize)> = Vec::new();
        for &v in top {
            for &l in graph.out_links(v) {
                let link = graph.link(l);
                segments.push((positions[link.source], positions[link.target], link.weight));
            }
        }
        for (i, &(s1, t1, w1)) in segments.iter().enumerate() {
            for &(s2, t2, w2) in &segments[i + 1..] {
                if (s1 != s2) && (t1 != t2) && ((s1 < s2) != (t1 < t2)) {
                    total += w1 * w2;
                }
            }
        }
    }

    total
}
