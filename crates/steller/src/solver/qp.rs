//! Primal active-set method for convex quadratic programs.
//!
//! Every iterate stays feasible, so hitting the iteration cap degrades the
//! objective, never the constraints. The caller supplies a feasible start;
//! the layout pipeline feeds it the center pass's coordinates.

use super::{QpProblem, QpSolver, SolverError, SolverResult};
use nalgebra::{Cholesky, DMatrix, DVector};

const ACTIVE_EPS: f64 = 1e-8;
const STEP_EPS: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct ActiveSetQp {
    max_iterations: usize,
}

impl Default for ActiveSetQp {
    fn default() -> Self {
        Self {
            max_iterations: 2_000,
        }
    }
}

impl ActiveSetQp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QpSolver for ActiveSetQp {
    fn solve(&self, problem: &QpProblem, start: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let n = problem.q.nrows();
        let m = problem.a.nrows();
        debug_assert_eq!(problem.q.ncols(), n);
        debug_assert_eq!(problem.c.len(), n);
        debug_assert_eq!(problem.b.len(), m);

        if Cholesky::new(problem.q.clone()).is_none() {
            return Err(SolverError::NotPositiveDefinite);
        }

        let mut x = start.clone();
        for i in 0..m {
            let slack = problem.a.row(i).dot(&x.transpose()) - problem.b[i];
            if slack < -1e-6 {
                return Err(SolverError::Infeasible);
            }
        }

        let mut working: Vec<usize> = Vec::new();

        for _ in 0..self.max_iterations {
            let gradient = &problem.q * &x + &problem.c;
            let (step, multipliers) = equality_step(problem, &gradient, &working)?;

            if step.norm() <= STEP_EPS {
                // Stationary on the working set; optimal unless a multiplier
                // wants its constraint released.
                let blocking = working
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| multipliers[k] < -ACTIVE_EPS)
                    .min_by(|a, b| multipliers[a.0].total_cmp(&multipliers[b.0]));
                match blocking {
                    Some((k, _)) => {
                        working.remove(k);
                    }
                    None => return Ok(x),
                }
                continue;
            }

            // Longest feasible step along `step`, capped at the full step.
            let mut alpha = 1.0f64;
            let mut hit: Option<usize> = None;
            for i in 0..m {
                if working.contains(&i) {
                    continue;
                }
                let direction = problem.a.row(i).dot(&step.transpose());
                if direction >= -STEP_EPS {
                    continue;
                }
                let slack = problem.a.row(i).dot(&x.transpose()) - problem.b[i];
                let limit = (slack / -direction).max(0.0);
                if limit < alpha {
                    alpha = limit;
                    hit = Some(i);
                }
            }

            x += step * alpha;
            if let Some(i) = hit {
                working.push(i);
                working.sort_unstable();
            }
        }

        // Feasible but not proven optimal.
        Ok(x)
    }
}

/// Solves the equality-constrained subproblem on the working set.
///
/// KKT system for `min g'p + p'Qp/2` with `A_w p = 0`:
/// `[Q -A_w'; A_w 0] [p; lambda] = [-g; 0]`.
fn equality_step(
    problem: &QpProblem,
    gradient: &DVector<f64>,
    working: &[usize],
) -> SolverResult<(DVector<f64>, Vec<f64>)> {
    let n = problem.q.nrows();
    let k = working.len();
    let dim = n + k;

    let mut kkt = DMatrix::zeros(dim, dim);
    kkt.view_mut((0, 0), (n, n)).copy_from(&problem.q);
    for (row, &ci) in working.iter().enumerate() {
        for j in 0..n {
            let coef = problem.a[(ci, j)];
            kkt[(j, n + row)] = -coef;
            kkt[(n + row, j)] = coef;
        }
    }

    let mut rhs = DVector::zeros(dim);
    for j in 0..n {
        rhs[j] = -gradient[j];
    }

    // SVD-based solve tolerates working sets with dependent rows.
    let solution = kkt
        .svd(true, true)
        .solve(&rhs, 1e-12)
        .map_err(|_| SolverError::IterationLimit)?;

    let step = DVector::from_fn(n, |j, _| solution[j]);
    let multipliers = (0..k).map(|row| solution[n + row]).collect();
    Ok((step, multipliers))
}
