//! Small shared helpers.

use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;
use std::time::Instant;

/// Adjacent pairs of a slice, in order.
pub(crate) fn bigrams<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> {
    items.windows(2).map(|w| (&w[0], &w[1]))
}

/// Whether `to` is reachable from `from` over `adjacency`.
///
/// Explicit-stack DFS with a visited set; the adjacency map may be cyclic.
pub(crate) fn reaches(adjacency: &HashMap<usize, Vec<usize>>, from: usize, to: usize) -> bool {
    if from == to {
        return true;
    }
    let mut visited: HashSet<usize> = HashSet::default();
    let mut stack: Vec<usize> = vec![from];
    while let Some(v) = stack.pop() {
        if !visited.insert(v) {
            continue;
        }
        let Some(next) = adjacency.get(&v) else {
            continue;
        };
        for &w in next {
            if w == to {
                return true;
            }
            if !visited.contains(&w) {
                stack.push(w);
            }
        }
    }
    false
}

fn timing_enabled() -> bool {
    std::env::var("STELLER_TIMING")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Runs `f`, printing its wall time to stderr when `STELLER_TIMING` is set.
pub(crate) fn time_stage<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let start = timing_enabled().then(Instant::now);
    let out = f();
    if let Some(start) = start {
        eprintln!("[steller-timing] stage={name} elapsed={:?}", start.elapsed());
    }
    out
}
