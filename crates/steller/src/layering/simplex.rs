//! Span-minimizing layering.
//!
//! One integer variable per node; every link must descend by at least its
//! span; the objective minimizes total weighted span, which also minimizes
//! the number of dummy waypoints inserted later. Optional user constraints
//! pin ranked nodes into ordered layers and grouped nodes into shared layers.

use super::{span, LayeringOperator};
use crate::accessors::{GroupAccessor, GroupFn, NoGroup, NoRank, RankAccessor, RankFn};
use crate::error::{Error, Result};
use crate::solver::{Bounds, CbcIlp, IlpProblem, IlpSolver, Sense, SolverError, Variable};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use steller_dag::{components, Dag};

#[derive(Debug, Clone)]
pub struct Simplex<R = NoRank, G = NoGroup, S = CbcIlp> {
    rank: R,
    group: G,
    solver: S,
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            rank: NoRank,
            group: NoGroup,
            solver: CbcIlp::new(),
        }
    }
}

impl<R, G, S> Simplex<R, G, S> {
    /// Nodes with equal ranks share a layer; strictly ordered ranks force
    /// strictly ordered layers.
    pub fn with_rank<N, F>(self, rank: F) -> Simplex<RankFn<F>, G, S>
    where
        F: Fn(&N) -> Option<i32>,
    {
        Simplex {
            rank: RankFn(rank),
            group: self.group,
            solver: self.solver,
        }
    }

    /// Nodes sharing a group name share a layer.
    pub fn with_group<N, F>(self, group: F) -> Simplex<R, GroupFn<F>, S>
    where
        F: Fn(&N) -> Option<String>,
    {
        Simplex {
            rank: self.rank,
            group: GroupFn(group),
            solver: self.solver,
        }
    }

    pub fn with_solver<S2>(self, solver: S2) -> Simplex<R, G, S2> {
        Simplex {
            rank: self.rank,
            group: self.group,
            solver,
        }
    }
}

impl<N, L, R, G, S> LayeringOperator<N, L> for Simplex<R, G, S>
where
    R: RankAccessor<N>,
    G: GroupAccessor<N>,
    S: IlpSolver,
{
    fn run(&self, dag: &Dag<N, L>) -> Result<Vec<usize>> {
        let n = dag.node_count();
        if n == 0 {
            return Ok(Vec::new());
        }

        let ranks: Vec<Option<i32>> = dag
            .node_ids()
            .map(|v| self.rank.rank(dag.payload(v)))
            .collect();
        let groups: Vec<Option<String>> = dag
            .node_ids()
            .map(|v| self.group.group(dag.payload(v)))
            .collect();
        let constrained = ranks.iter().any(Option::is_some) || groups.iter().any(Option::is_some);

        let mut problem = IlpProblem::new(Sense::Minimize);
        let mut variables: Vec<Variable> = (0..n)
            .map(|_| Variable {
                objective: 0.0,
                integer: true,
                coefficients: Default::default(),
            })
            .collect();

        // Sum of (x_target - x_source) * count expands to one aggregated
        // objective coefficient per node.
        for link in dag.link_ids() {
            let count = dag.count(link) as f64;
            variables[dag.source(link).index()].objective -= count;
            variables[dag.target(link).index()].objective += count;

            let row = problem.add_constraint(Bounds::at_least(span(dag.count(link)) as f64));
            variables[dag.source(link).index()]
                .coefficients
                .insert(row, -1.0);
            variables[dag.target(link).index()]
                .coefficients
                .insert(row, 1.0);
        }

        // Equal ranks share a layer; consecutive distinct ranks are strictly
        // ordered through one representative per rank.
        let mut by_rank: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (v, rank) in ranks.iter().enumerate() {
            if let Some(rank) = rank {
                by_rank.entry(*rank).or_default().push(v);
            }
        }
        for nodes in by_rank.values() {
            tie_layers(&mut problem, &mut variables, nodes);
        }
        let representatives: Vec<usize> = by_rank.values().map(|nodes| nodes[0]).collect();
        for pair in representatives.windows(2) {
            let row = problem.add_constraint(Bounds::at_least(1.0));
            variables[pair[0]].coefficients.insert(row, -1.0);
            variables[pair[1]].coefficients.insert(row, 1.0);
        }

        // Grouped nodes share a layer; a group whose members carry distinct
        // ranks is contradictory before ever reaching the solver.
        let mut by_group: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (v, group) in groups.iter().enumerate() {
            if let Some(group) = group {
                by_group.entry(group.clone()).or_default().push(v);
            }
        }
        for (name, nodes) in &by_group {
            let mut seen_rank: Option<i32> = None;
            for &v in nodes {
                let Some(rank) = ranks[v] else {
                    continue;
                };
                match seen_rank {
                    Some(other) if other != rank => {
                        return Err(Error::config(format!(
                            "group {name:?} members have conflicting ranks {other} and {rank}"
                        )));
                    }
                    _ => seen_rank = Some(rank),
                }
            }
            tie_layers(&mut problem, &mut variables, nodes);
        }

        problem.variables = variables;
        let solution = match self.solver.solve(&problem) {
            Ok(solution) => solution,
            Err(SolverError::Infeasible) if constrained => {
                return Err(Error::IllDefinedConstraints {
                    message: "rank/group constraints are unsatisfiable".to_string(),
                });
            }
            Err(err) => {
                debug_assert!(false, "unconstrained layering program failed: {err}");
                return Err(Error::IllDefinedConstraints {
                    message: format!("internal: layering program failed: {err}"),
                });
            }
        };

        let mut layer: Vec<usize> = (0..n)
            .map(|v| solution.get(v).copied().unwrap_or(0.0).round().max(0.0) as usize)
            .collect();

        // Drop every component to layer 0; the objective is translation
        // invariant per component, so the solver's offsets are arbitrary.
        // Rank/group constraints may tie nodes across components, so with
        // user constraints the shift has to stay global.
        if constrained {
            let low = layer.iter().copied().min().unwrap_or(0);
            if low > 0 {
                for l in &mut layer {
                    *l -= low;
                }
            }
        } else {
            for comp in components(dag) {
                let low = comp.iter().map(|v| layer[v.index()]).min().unwrap_or(0);
                if low > 0 {
                    for v in comp {
                        layer[v.index()] -= low;
                    }
                }
            }
        }

        Ok(layer)
    }
}

/// Chains pairwise layer equalities over `nodes`.
fn tie_layers(problem: &mut IlpProblem, variables: &mut [Variable], nodes: &[usize]) {
    for pair in nodes.windows(2) {
        let row = problem.add_constraint(Bounds::exactly(0.0));
        variables[pair[0]].coefficients.insert(row, 1.0);
        variables[pair[1]].coefficients.insert(row, -1.0);
    }
}
