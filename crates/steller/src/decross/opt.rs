//! Exact crossing minimization.
//!
//! One binary variable per unordered in-layer pair decides whether the pair
//! keeps its incoming relative order; triangle rows force the pairwise
//! decisions into a total order, and one slack per candidate crossing pays
//! for every disagreement between a parent pair and its child pair. The
//! program grows quadratically, so a size gate rejects large inputs unless
//! the caller opts out.

use super::DecrossOperator;
use crate::error::{Error, Result};
use crate::sugi::SugiGraph;
use crate::solver::{Bounds, CbcIlp, IlpProblem, IlpSolver, Sense, Variable};
use crate::util::bigrams;
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptLarge {
    /// At most 400 ordering variables.
    #[default]
    Small,
    /// At most 1200 ordering variables.
    Medium,
    /// No limit; may be very slow.
    Large,
}

impl OptLarge {
    fn limit(self) -> Option<usize> {
        match self {
            OptLarge::Small => Some(400),
            OptLarge::Medium => Some(1200),
            OptLarge::Large => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecrossOpt<S = CbcIlp> {
    large: OptLarge,
    solver: S,
}

impl DecrossOpt {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for DecrossOpt {
    fn default() -> Self {
        Self {
            large: OptLarge::Small,
            solver: CbcIlp::new(),
        }
    }
}

impl<S> DecrossOpt<S> {
    pub fn with_large(self, large: OptLarge) -> Self {
        Self { large, ..self }
    }

    pub fn with_solver<S2>(self, solver: S2) -> DecrossOpt<S2> {
        DecrossOpt {
            large: self.large,
            solver,
        }
    }
}

impl<S: IlpSolver> DecrossOperator for DecrossOpt<S> {
    fn run(&self, graph: &mut SugiGraph) -> Result<()> {
        let total_pairs: usize = graph
            .layers()
            .iter()
            .map(|layer| layer.len() * layer.len().saturating_sub(1) / 2)
            .sum();
        if let Some(limit) = self.large.limit() {
            if total_pairs > limit {
                return Err(Error::GraphTooLarge {
                    variables: total_pairs,
                    limit,
                });
            }
        }
        if total_pairs == 0 {
            return Ok(());
        }

        let positions = graph.positions();
        let mut problem = IlpProblem::new(Sense::Minimize);
        let mut variables: Vec<Variable> = Vec::new();

        // Ordering variable per canonical in-layer pair (i, j), i < j by the
        // incoming order: 1 keeps i before j. The tiny bonus for keeping
        // every pair sums below one crossing, so it only breaks ties.
        let keep_bonus = -1.0 / (total_pairs as f64 + 1.0);
        let mut pair_var: HashMap<(usize, usize, usize), usize> = HashMap::default();
        for (l, layer) in graph.layers().iter().enumerate() {
            for i in 0..layer.len() {
                for j in i + 1..layer.len() {
                    let bound = problem.add_constraint(Bounds::at_most(1.0));
                    let index = variables.len();
                    let mut var = Variable {
                        objective: keep_bonus,
                        integer: true,
                        coefficients: Default::default(),
                    };
                    var.coefficients.insert(bound, 1.0);
                    variables.push(var);
                    pair_var.insert((l, i, j), index);
                }
            }
        }

        // Transitivity: x_ij + x_jk - x_ik in [0, 1] for each in-layer triple.
        for (l, layer) in graph.layers().iter().enumerate() {
            for i in 0..layer.len() {
                for j in i + 1..layer.len() {
                    for k in j + 1..layer.len() {
                        let row = problem.add_constraint(Bounds::between(0.0, 1.0));
                        variables[pair_var[&(l, i, j)]].coefficients.insert(row, 1.0);
                        variables[pair_var[&(l, j, k)]].coefficients.insert(row, 1.0);
                        variables[pair_var[&(l, i, k)]].coefficients.insert(row, -1.0);
                    }
                }
            }
        }

        // One slack per candidate crossing: s >= |order(top) - order(bottom)|
        // makes the slack pay exactly when the two pairs disagree.
        for (l, (top, _)) in bigrams(graph.layers()).enumerate() {
            let mut segments: Vec<(usize, usize, usize)> = Vec::new();
            for &v in top {
                for &link in graph.out_links(v) {
                    let link = graph.link(link);
                    segments.push((link.source, link.target, link.weight));
                }
            }

            for (e, &(s1, t1, w1)) in segments.iter().enumerate() {
                for &(s2, t2, w2) in &segments[e + 1..] {
                    if s1 == s2 || t1 == t2 {
                        continue;
                    }
                    let top_order = orient(&pair_var, &positions, l, s1, s2);
                    let bottom_order = orient(&pair_var, &positions, l + 1, t1, t2);

                    let slack = variables.len();
                    variables.push(Variable {
                        objective: (w1 * w2) as f64,
                        integer: false,
                        coefficients: Default::default(),
                    });

                    // s - o_top + o_bot >= 0 and s + o_top - o_bot >= 0,
                    // with the constant parts moved to the right-hand side.
                    for sign in [1.0, -1.0] {
                        let rhs = sign * (top_order.offset - bottom_order.offset);
                        let row = problem.add_constraint(Bounds::at_least(rhs));
                        variables[slack].coefficients.insert(row, 1.0);
                        add_coef(&mut variables[top_order.var], row, -sign * top_order.sign);
                        add_coef(&mut variables[bottom_order.var], row, sign * bottom_order.sign);
                    }
                }
            }
        }

        problem.variables = variables;
        let solution = self.solver.solve(&problem).map_err(Error::from)?;

        // New position of each node = how many layer-mates precede it.
        let layers = graph.layers().to_vec();
        for (l, layer) in layers.iter().enumerate() {
            if layer.len() < 2 {
                continue;
            }
            let mut ranked: Vec<(usize, usize)> = Vec::with_capacity(layer.len());
            for i in 0..layer.len() {
                let mut before = 0usize;
                for j in 0..layer.len() {
                    if i == j {
                        continue;
                    }
                    let (lo, hi) = (i.min(j), i.max(j));
                    let keeps = solution[pair_var[&(l, lo, hi)]] > 0.5;
                    // j precedes i when the canonical decision says so.
                    if (j < i) == keeps {
                        before += 1;
                    }
                }
                ranked.push((before, layer[i]));
            }
            ranked.sort_unstable();
            graph.set_order(l, ranked.into_iter().map(|(_, v)| v).collect());
        }

        Ok(())
    }
}

struct Orientation {
    var: usize,
    /// `order = offset + sign * x` where `order` is 1 when the first node of
    /// the queried pair comes first.
    sign: f64,
    offset: f64,
}

fn orient(
    pair_var: &HashMap<(usize, usize, usize), usize>,
    positions: &[usize],
    layer: usize,
    u: usize,
    v: usize,
) -> Orientation {
    let (pu, pv) = (positions[u], positions[v]);
    if pu < pv {
        Orientation {
            var: pair_var[&(layer, pu, pv)],
            sign: 1.0,
            offset: 0.0,
        }
    } else {
        Orientation {
            var: pair_var[&(layer, pv, pu)],
            sign: -1.0,
            offset: 1.0,
        }
    }
}

fn add_coef(var: &mut Variable, row: usize, coef: f64) {
    *var.coefficients.entry(row).or_insert(0.0) += coef;
}
