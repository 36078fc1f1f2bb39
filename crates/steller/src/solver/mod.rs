//! Linear and quadratic program interfaces.
//!
//! The layout operators only build models; solving is delegated through the
//! [`IlpSolver`] and [`QpSolver`] traits so back-ends stay swappable. The
//! crate ships a `good_lp`/CBC adapter for the integer programs and a dense
//! active-set method for the quadratic ones.

use nalgebra::{DMatrix, DVector};
use rustc_hash::FxHashMap;

mod lp;
mod qp;

pub use lp::CbcIlp;
pub use qp::ActiveSetQp;

pub type SolverResult<T> = std::result::Result<T, SolverError>;

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("the program has no feasible solution")]
    Infeasible,

    #[error("the objective is unbounded")]
    Unbounded,

    #[error("the quadratic form is not positive definite")]
    NotPositiveDefinite,

    #[error("iteration limit reached before convergence")]
    IterationLimit,

    #[error("solver back-end failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Row bounds: `min <= coefficients . x <= max`, either side optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn exactly(value: f64) -> Self {
        Self {
            min: Some(value),
            max: Some(value),
        }
    }
}

/// A non-negative decision variable.
///
/// `coefficients` maps constraint index to the variable's coefficient in that
/// row; rows not present have coefficient zero.
#[derive(Debug, Clone, Default)]
pub struct Variable {
    pub objective: f64,
    pub integer: bool,
    pub coefficients: FxHashMap<usize, f64>,
}

/// An integer linear program over non-negative variables.
#[derive(Debug, Clone)]
pub struct IlpProblem {
    pub sense: Sense,
    pub constraints: Vec<Bounds>,
    pub variables: Vec<Variable>,
}

impl IlpProblem {
    pub fn new(sense: Sense) -> Self {
        Self {
            sense,
            constraints: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Appends a constraint row and returns its index for coefficient maps.
    pub fn add_constraint(&mut self, bounds: Bounds) -> usize {
        self.constraints.push(bounds);
        self.constraints.len() - 1
    }

    pub fn add_variable(&mut self, var: Variable) -> usize {
        self.variables.push(var);
        self.variables.len() - 1
    }
}

pub trait IlpSolver {
    /// Returns one optimal assignment, indexed like `problem.variables`.
    fn solve(&self, problem: &IlpProblem) -> SolverResult<Vec<f64>>;
}

/// A convex quadratic program: minimize `x'Qx/2 + c'x` subject to `Ax >= b`.
#[derive(Debug, Clone)]
pub struct QpProblem {
    pub q: DMatrix<f64>,
    pub c: DVector<f64>,
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
}

pub trait QpSolver {
    /// Solves from a feasible `start` point.
    ///
    /// Implementations must keep every iterate feasible so a truncated run
    /// still satisfies `Ax >= b`.
    fn solve(&self, problem: &QpProblem, start: &DVector<f64>) -> SolverResult<DVector<f64>>;
}
