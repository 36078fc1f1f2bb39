//! Graph algorithms shared by the layout pipeline.

use crate::{Dag, NodeId};
use rustc_hash::FxHashSet as HashSet;
use std::collections::VecDeque;

/// Weakly connected components, each in breadth-first discovery order.
///
/// Components are emitted in the order of their lowest-indexed node, so the
/// partition is deterministic for a fixed construction sequence.
pub fn components<N, L>(dag: &Dag<N, L>) -> Vec<Vec<NodeId>> {
    let mut seen: HashSet<NodeId> = HashSet::default();
    let mut out: Vec<Vec<NodeId>> = Vec::new();

    for start in dag.node_ids() {
        if !seen.insert(start) {
            continue;
        }
        let mut comp: Vec<NodeId> = Vec::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            comp.push(v);
            for (w, _) in dag.children(v) {
                if seen.insert(w) {
                    queue.push_back(w);
                }
            }
            for (u, _) in dag.parents(v) {
                if seen.insert(u) {
                    queue.push_back(u);
                }
            }
        }
        out.push(comp);
    }

    out
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// Finds a directed cycle, if one exists, and returns its node path.
///
/// Three-color depth-first search with an explicit stack; the returned path
/// starts and ends at the same node.
pub fn find_cycle<N, L>(dag: &Dag<N, L>) -> Option<Vec<NodeId>> {
    let mut marks = vec![Mark::White; dag.node_count()];
    // Parent pointers let us reconstruct the cycle once a grey node is re-entered.
    let mut parent: Vec<Option<NodeId>> = vec![None; dag.node_count()];

    for root in dag.node_ids() {
        if marks[root.index()] != Mark::White {
            continue;
        }

        // (node, next child offset) frames.
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
        marks[root.index()] = Mark::Grey;

        while let Some(frame) = stack.last_mut() {
            let (v, next) = *frame;
            let out = dag.out_links(v);
            if next >= out.len() {
                marks[v.index()] = Mark::Black;
                stack.pop();
                continue;
            }
            frame.1 += 1;
            let w = dag.target(out[next]);

            match marks[w.index()] {
                Mark::White => {
                    marks[w.index()] = Mark::Grey;
                    parent[w.index()] = Some(v);
                    stack.push((w, 0));
                }
                Mark::Grey => {
                    let mut path = vec![w, v];
                    let mut cur = v;
                    while let Some(p) = parent[cur.index()] {
                        path.push(p);
                        cur = p;
                        if p == w {
                            break;
                        }
                    }
                    path.reverse();
                    return Some(path);
                }
                Mark::Black => {}
            }
        }
    }

    None
}
