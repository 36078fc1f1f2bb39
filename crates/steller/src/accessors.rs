//! Accessor seams for node sizes, layering constraints, and penalty weights.
//!
//! Accessors must be pure for the duration of one layout call; the pipeline
//! evaluates them at most once per node or link and caches the results.
//! Closures are wrapped in the `*Fn` adapters by the builder methods, so user
//! code only ever passes plain closures. [`Const`] marks a weight as constant
//! by type, which is what lets the quadratic operator hoist it.

/// Node extent lookup. `None` is a dummy waypoint of a long link.
pub trait NodeSize<N> {
    fn size(&self, node: Option<&N>) -> (f64, f64);
}

/// Unit squares for real nodes, points for dummies.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodeSize;

impl<N> NodeSize<N> for DefaultNodeSize {
    fn size(&self, node: Option<&N>) -> (f64, f64) {
        match node {
            Some(_) => (1.0, 1.0),
            None => (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SizeFn<F>(pub F);

impl<N, F: Fn(Option<&N>) -> (f64, f64)> NodeSize<N> for SizeFn<F> {
    fn size(&self, node: Option<&N>) -> (f64, f64) {
        (self.0)(node)
    }
}

/// Optional per-node layering rank.
pub trait RankAccessor<N> {
    fn rank(&self, node: &N) -> Option<i32>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoRank;

impl<N> RankAccessor<N> for NoRank {
    fn rank(&self, _node: &N) -> Option<i32> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RankFn<F>(pub F);

impl<N, F: Fn(&N) -> Option<i32>> RankAccessor<N> for RankFn<F> {
    fn rank(&self, node: &N) -> Option<i32> {
        (self.0)(node)
    }
}

/// Optional per-node layering group name.
pub trait GroupAccessor<N> {
    fn group(&self, node: &N) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoGroup;

impl<N> GroupAccessor<N> for NoGroup {
    fn group(&self, _node: &N) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GroupFn<F>(pub F);

impl<N, F: Fn(&N) -> Option<String>> GroupAccessor<N> for GroupFn<F> {
    fn group(&self, node: &N) -> Option<String> {
        (self.0)(node)
    }
}

/// Weight of a link given its endpoints' payloads.
pub trait PairWeight<N> {
    fn weight(&self, source: &N, target: &N) -> f64;

    /// `Some` when the weight is the same for every input.
    fn constant(&self) -> Option<f64> {
        None
    }
}

/// Weight derived from a node payload.
pub trait NodeWeight<N> {
    fn weight(&self, node: &N) -> f64;

    fn constant(&self) -> Option<f64> {
        None
    }
}

/// Weight derived from a link payload.
pub trait LinkWeight<L> {
    fn weight(&self, link: &L) -> f64;

    fn constant(&self) -> Option<f64> {
        None
    }
}

/// A weight that is constant by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Const(pub f64);

impl<N> PairWeight<N> for Const {
    fn weight(&self, _source: &N, _target: &N) -> f64 {
        self.0
    }

    fn constant(&self) -> Option<f64> {
        Some(self.0)
    }
}

impl<N> NodeWeight<N> for Const {
    fn weight(&self, _node: &N) -> f64 {
        self.0
    }

    fn constant(&self) -> Option<f64> {
        Some(self.0)
    }
}

impl<L> LinkWeight<L> for Const {
    fn weight(&self, _link: &L) -> f64 {
        self.0
    }

    fn constant(&self) -> Option<f64> {
        Some(self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PairFn<F>(pub F);

impl<N, F: Fn(&N, &N) -> f64> PairWeight<N> for PairFn<F> {
    fn weight(&self, source: &N, target: &N) -> f64 {
        (self.0)(source, target)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NodeFn<F>(pub F);

impl<N, F: Fn(&N) -> f64> NodeWeight<N> for NodeFn<F> {
    fn weight(&self, node: &N) -> f64 {
        (self.0)(node)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LinkFn<F>(pub F);

impl<L, F: Fn(&L) -> f64> LinkWeight<L> for LinkFn<F> {
    fn weight(&self, link: &L) -> f64 {
        (self.0)(link)
    }
}
