//! Integer linear programs through `good_lp` on the CBC back-end.
//!
//! The operators keep building [`IlpProblem`] models; this adapter lowers
//! them onto `good_lp` variables and constraint rows and lets CBC handle the
//! branching. Infeasible and unbounded statuses map onto [`SolverError`].

use super::{IlpProblem, IlpSolver, Sense, SolverError, SolverResult};
use good_lp::solvers::coin_cbc::coin_cbc;
use good_lp::{
    variable, Expression, IntoAffineExpression, ProblemVariables, ResolutionError, Solution,
    SolverModel,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CbcIlp;

impl CbcIlp {
    pub fn new() -> Self {
        Self
    }
}

impl IlpSolver for CbcIlp {
    fn solve(&self, problem: &IlpProblem) -> SolverResult<Vec<f64>> {
        if problem.variables.is_empty() {
            return Ok(Vec::new());
        }

        let mut vars = ProblemVariables::new();
        let handles: Vec<good_lp::Variable> = problem
            .variables
            .iter()
            .map(|var| {
                let mut definition = variable().min(0.0);
                if var.integer {
                    definition = definition.integer();
                }
                vars.add(definition)
            })
            .collect();

        let mut objective: Expression = 0.into();
        for (var, &handle) in problem.variables.iter().zip(&handles) {
            if var.objective != 0.0 {
                objective += handle.into_expression() * var.objective;
            }
        }

        let mut rows: Vec<Expression> = (0..problem.constraints.len()).map(|_| 0.into()).collect();
        for (var, &handle) in problem.variables.iter().zip(&handles) {
            for (&row, &coef) in &var.coefficients {
                if coef != 0.0 && row < rows.len() {
                    rows[row] += handle.into_expression() * coef;
                }
            }
        }

        let mut model = match problem.sense {
            Sense::Minimize => vars.minimise(objective).using(coin_cbc),
            Sense::Maximize => vars.maximise(objective).using(coin_cbc),
        };
        for (expression, bounds) in rows.into_iter().zip(&problem.constraints) {
            match (bounds.min, bounds.max) {
                (Some(min), Some(max)) if (max - min).abs() <= f64::EPSILON => {
                    model = model.with(expression.eq(min));
                }
                (min, max) => {
                    if let Some(min) = min {
                        model = model.with(expression.clone().geq(min));
                    }
                    if let Some(max) = max {
                        model = model.with(expression.leq(max));
                    }
                }
            }
        }

        let solution = model.solve().map_err(|err| match err {
            ResolutionError::Infeasible => SolverError::Infeasible,
            ResolutionError::Unbounded => SolverError::Unbounded,
            other => SolverError::Backend(other.to_string()),
        })?;

        Ok(handles
            .iter()
            .map(|&handle| solution.value(handle))
            .collect())
    }
}
