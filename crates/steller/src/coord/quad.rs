//! Quadratic-program coordinate assignment.
//!
//! Builds one convex QP over every sugi-node's x: straight links, low
//! curvature through waypoints, and gently pulled-together components,
//! subject to per-layer non-overlap rows. The objective is built from
//! squared differences only, so it is translation invariant per component; a
//! vanishing ridge term makes the factorization strict without moving the
//! optimum past the verification tolerance.

use super::{center_positions, normalize, CoordOperator};
use crate::accessors::{Const, LinkFn, LinkWeight, NodeFn, NodeWeight, PairFn, PairWeight};
use crate::error::{Error, Result};
use crate::solver::{ActiveSetQp, QpProblem, QpSolver};
use crate::sugi::{SizeCache, SugiGraph, SugiNodeKind};
use crate::util::{bigrams, reaches};
use nalgebra::{DMatrix, DVector};
use rustc_hash::FxHashMap as HashMap;
use steller_dag::Dag;

#[derive(Debug, Clone)]
pub struct CoordQuad<VW = Const, VS = Const, NC = Const, LC = Const, S = ActiveSetQp> {
    vert_weak: VW,
    vert_strong: VS,
    node_curve: NC,
    link_curve: LC,
    component: f64,
    solver: S,
}

impl CoordQuad {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for CoordQuad {
    fn default() -> Self {
        Self {
            vert_weak: Const(1.0),
            vert_strong: Const(0.0),
            node_curve: Const(0.0),
            link_curve: Const(1.0),
            component: 1.0,
            solver: ActiveSetQp::new(),
        }
    }
}

impl<VW, VS, NC, LC, S> CoordQuad<VW, VS, NC, LC, S> {
    /// Straightness weight for segments leaving a real node, given the
    /// original link's endpoint payloads.
    pub fn with_vert_weak<N, F>(self, weak: F) -> CoordQuad<PairFn<F>, VS, NC, LC, S>
    where
        F: Fn(&N, &N) -> f64,
    {
        CoordQuad {
            vert_weak: PairFn(weak),
            vert_strong: self.vert_strong,
            node_curve: self.node_curve,
            link_curve: self.link_curve,
            component: self.component,
            solver: self.solver,
        }
    }

    /// Straightness weight for segments leaving a dummy waypoint, given the
    /// original link's payload.
    pub fn with_vert_strong<L, F>(self, strong: F) -> CoordQuad<VW, LinkFn<F>, NC, LC, S>
    where
        F: Fn(&L) -> f64,
    {
        CoordQuad {
            vert_weak: self.vert_weak,
            vert_strong: LinkFn(strong),
            node_curve: self.node_curve,
            link_curve: self.link_curve,
            component: self.component,
            solver: self.solver,
        }
    }

    /// Constant vertical weights: `weak` for real tails, `strong` for dummy
    /// tails. `strong` defaults to 0, so long links bend freely at their
    /// waypoints unless raised.
    pub fn with_vertical(self, weak: f64, strong: f64) -> CoordQuad<Const, Const, NC, LC, S> {
        CoordQuad {
            vert_weak: Const(weak),
            vert_strong: Const(strong),
            node_curve: self.node_curve,
            link_curve: self.link_curve,
            component: self.component,
            solver: self.solver,
        }
    }

    /// Curvature weight through a real node.
    pub fn with_node_curve<N, F>(self, curve: F) -> CoordQuad<VW, VS, NodeFn<F>, LC, S>
    where
        F: Fn(&N) -> f64,
    {
        CoordQuad {
            vert_weak: self.vert_weak,
            vert_strong: self.vert_strong,
            node_curve: NodeFn(curve),
            link_curve: self.link_curve,
            component: self.component,
            solver: self.solver,
        }
    }

    /// Curvature weight through a dummy waypoint.
    pub fn with_link_curve<L, F>(self, curve: F) -> CoordQuad<VW, VS, NC, LinkFn<F>, S>
    where
        F: Fn(&L) -> f64,
    {
        CoordQuad {
            vert_weak: self.vert_weak,
            vert_strong: self.vert_strong,
            node_curve: self.node_curve,
            link_curve: LinkFn(curve),
            component: self.component,
            solver: self.solver,
        }
    }

    /// Constant curvature weights, `(node, link)` in that order; the paired
    /// getter on the all-constant operator mirrors it.
    pub fn with_curve(self, node: f64, link: f64) -> CoordQuad<VW, VS, Const, Const, S> {
        CoordQuad {
            vert_weak: self.vert_weak,
            vert_strong: self.vert_strong,
            node_curve: Const(node),
            link_curve: Const(link),
            component: self.component,
            solver: self.solver,
        }
    }

    /// Weight pulling unambiguously ordered components together.
    pub fn with_component(self, component: f64) -> Self {
        Self { component, ..self }
    }

    pub fn with_solver<S2>(self, solver: S2) -> CoordQuad<VW, VS, NC, LC, S2> {
        CoordQuad {
            vert_weak: self.vert_weak,
            vert_strong: self.vert_strong,
            node_curve: self.node_curve,
            link_curve: self.link_curve,
            component: self.component,
            solver,
        }
    }

    pub fn component(&self) -> f64 {
        self.component
    }
}

impl<NC, LC, S> CoordQuad<Const, Const, NC, LC, S> {
    /// `(weak, strong)`, matching [`CoordQuad::with_vertical`].
    pub fn vertical(&self) -> (f64, f64) {
        (self.vert_weak.0, self.vert_strong.0)
    }
}

impl<VW, VS, S> CoordQuad<VW, VS, Const, Const, S> {
    /// `(node, link)`, matching [`CoordQuad::with_curve`].
    pub fn curve(&self) -> (f64, f64) {
        (self.node_curve.0, self.link_curve.0)
    }
}

impl<N, L, VW, VS, NC, LC, S> CoordOperator<N, L> for CoordQuad<VW, VS, NC, LC, S>
where
    VW: PairWeight<N>,
    VS: LinkWeight<L>,
    NC: NodeWeight<N>,
    LC: LinkWeight<L>,
    S: QpSolver,
{
    fn run(&self, graph: &mut SugiGraph, dag: &Dag<N, L>, sizes: &SizeCache) -> Result<f64> {
        let n = graph.node_count();
        if n == 0 {
            return Ok(0.0);
        }
        if self.component < 0.0 {
            return Err(Error::config(format!(
                "component weight must be non-negative, got {}",
                self.component
            )));
        }

        let start_xs = center_positions(graph, sizes)?;

        let mut q = DMatrix::zeros(n, n);
        // Objective weight contributed within each component; a component
        // with more than one node and no weight at all has an undetermined
        // shape, which is the ill-defined case.
        let mut component_weight = vec![0.0f64; graph.component_count()];

        let weak_constant = self.vert_weak.constant();
        for link in graph.links() {
            let weight = if graph.node(link.source).is_real() {
                match weak_constant {
                    Some(weight) => weight,
                    None => self.vert_weak.weight(
                        dag.payload(dag.source(link.link)),
                        dag.payload(dag.target(link.link)),
                    ),
                }
            } else {
                self.vert_strong.weight(dag.link_payload(link.link))
            };
            if weight < 0.0 {
                return Err(Error::config(format!(
                    "vertical weight must be non-negative, got {weight}"
                )));
            }
            if weight > 0.0 {
                add_straightness(&mut q, link.source, link.target, weight);
                component_weight[graph.component(link.source)] += weight;
            }
        }

        for b in 0..n {
            let weight = match graph.node(b).kind {
                SugiNodeKind::Real { node } => self.node_curve.weight(dag.payload(node)),
                SugiNodeKind::Dummy { link } => self.link_curve.weight(dag.link_payload(link)),
            };
            if weight < 0.0 {
                return Err(Error::config(format!(
                    "curvature weight must be non-negative, got {weight}"
                )));
            }
            if weight == 0.0 {
                continue;
            }
            let parents: Vec<usize> = graph.parents(b).map(|(p, _)| p).collect();
            let children: Vec<usize> = graph.children(b).map(|(c, _)| c).collect();
            for &a in &parents {
                for &c in &children {
                    add_curvature(&mut q, a, b, c, weight);
                    component_weight[graph.component(b)] += weight;
                }
            }
        }

        self.add_component_spread(graph, &mut q);

        for (component, &weight) in component_weight.iter().enumerate() {
            let members = (0..n).filter(|&v| graph.component(v) == component).count();
            if members > 1 && weight == 0.0 {
                return Err(Error::IllDefinedObjective);
            }
        }

        // Vanishing ridge: the difference terms leave one flat direction per
        // component, which would defeat the solver's factorization.
        let ridge = 1e-8 * q.diagonal().amax().max(1.0);
        for i in 0..n {
            q[(i, i)] += ridge;
        }

        let rows: usize = graph
            .layers()
            .iter()
            .map(|layer| layer.len().saturating_sub(1))
            .sum();
        let mut a = DMatrix::zeros(rows, n);
        let mut b = DVector::zeros(rows);
        let mut row = 0usize;
        for layer in graph.layers() {
            for (&p, &v) in bigrams(layer) {
                a[(row, v)] = 1.0;
                a[(row, p)] = -1.0;
                b[row] = (sizes.width(p) + sizes.width(v)) / 2.0;
                row += 1;
            }
        }

        let problem = QpProblem {
            q,
            c: DVector::zeros(n),
            a,
            b,
        };
        let start = DVector::from_vec(start_xs);
        let solution = self.solver.solve(&problem, &start).map_err(Error::from)?;

        let xs: Vec<f64> = solution.iter().copied().collect();
        Ok(normalize(graph, sizes, &xs))
    }
}

impl<VW, VS, NC, LC, S> CoordQuad<VW, VS, NC, LC, S> {
    /// Pulls layer-adjacent nodes of different components together, but only
    /// when the components' left-of relation is acyclic, i.e. their relative
    /// order is the same in every layer they share.
    fn add_component_spread(&self, graph: &SugiGraph, q: &mut DMatrix<f64>) {
        if graph.component_count() < 2 || self.component == 0.0 {
            return;
        }

        let mut left_of: HashMap<usize, Vec<usize>> = HashMap::default();
        let mut witnesses: Vec<(usize, usize, usize, usize)> = Vec::new();
        for layer in graph.layers() {
            for (&p, &v) in bigrams(layer) {
                let (cp, cv) = (graph.component(p), graph.component(v));
                if cp == cv {
                    continue;
                }
                let successors = left_of.entry(cp).or_default();
                if !successors.contains(&cv) {
                    successors.push(cv);
                }
                witnesses.push((p, v, cp, cv));
            }
        }

        for (p, v, cp, cv) in witnesses {
            if reaches(&left_of, cv, cp) {
                continue;
            }
            add_straightness(q, p, v, self.component);
        }
    }
}

/// Adds `w * (x_a - x_b)^2` to the objective hessian.
fn add_straightness(q: &mut DMatrix<f64>, a: usize, b: usize, w: f64) {
    q[(a, a)] += 2.0 * w;
    q[(b, b)] += 2.0 * w;
    q[(a, b)] -= 2.0 * w;
    q[(b, a)] -= 2.0 * w;
}

/// Adds `w * (x_a - 2 x_b + x_c)^2` to the objective hessian.
fn add_curvature(q: &mut DMatrix<f64>, a: usize, b: usize, c: usize, w: f64) {
    q[(a, a)] += 2.0 * w;
    q[(b, b)] += 8.0 * w;
    q[(c, c)] += 2.0 * w;
    q[(a, b)] -= 4.0 * w;
    q[(b, a)] -= 4.0 * w;
    q[(b, c)] -= 4.0 * w;
    q[(c, b)] -= 4.0 * w;
    q[(a, c)] += 2.0 * w;
    q[(c, a)] += 2.0 * w;
}
