use nalgebra::{DMatrix, DVector};
use steller::solver::{
    ActiveSetQp, Bounds, CbcIlp, IlpProblem, IlpSolver, QpProblem, QpSolver, Sense, SolverError,
    Variable,
};

fn var(objective: f64, integer: bool, coefs: &[(usize, f64)]) -> Variable {
    Variable {
        objective,
        integer,
        coefficients: coefs.iter().copied().collect(),
    }
}

#[test]
fn lp_solves_a_two_variable_maximization() {
    // max 3x + 2y s.t. x + y <= 4, x <= 2.
    let mut p = IlpProblem::new(Sense::Maximize);
    let sum = p.add_constraint(Bounds::at_most(4.0));
    let cap = p.add_constraint(Bounds::at_most(2.0));
    p.add_variable(var(3.0, false, &[(sum, 1.0), (cap, 1.0)]));
    p.add_variable(var(2.0, false, &[(sum, 1.0)]));

    let x = CbcIlp::new().solve(&p).unwrap();
    assert!((x[0] - 2.0).abs() < 1e-6, "x = {x:?}");
    assert!((x[1] - 2.0).abs() < 1e-6, "x = {x:?}");
}

#[test]
fn lp_handles_equality_and_lower_bound_rows() {
    // min x + y s.t. x + y = 3, x >= 1.
    let mut p = IlpProblem::new(Sense::Minimize);
    let eq = p.add_constraint(Bounds::exactly(3.0));
    let lo = p.add_constraint(Bounds::at_least(1.0));
    p.add_variable(var(1.0, false, &[(eq, 1.0), (lo, 1.0)]));
    p.add_variable(var(1.0, false, &[(eq, 1.0)]));

    let x = CbcIlp::new().solve(&p).unwrap();
    assert!((x[0] + x[1] - 3.0).abs() < 1e-6, "x = {x:?}");
    assert!(x[0] >= 1.0 - 1e-6, "x = {x:?}");
}

#[test]
fn lp_detects_infeasibility() {
    // x <= 1 and x >= 2 cannot both hold.
    let mut p = IlpProblem::new(Sense::Minimize);
    let hi = p.add_constraint(Bounds::at_most(1.0));
    let lo = p.add_constraint(Bounds::at_least(2.0));
    p.add_variable(var(1.0, false, &[(hi, 1.0), (lo, 1.0)]));

    assert!(matches!(
        CbcIlp::new().solve(&p),
        Err(SolverError::Infeasible)
    ));
}

#[test]
fn lp_detects_an_unbounded_objective() {
    // max x with only x >= 0.
    let mut p = IlpProblem::new(Sense::Maximize);
    p.add_variable(var(1.0, false, &[]));

    assert!(matches!(
        CbcIlp::new().solve(&p),
        Err(SolverError::Unbounded)
    ));
}

#[test]
fn ilp_finds_an_integral_optimum() {
    // max x + y s.t. 2x + 3y <= 8, 3x + 2y <= 8; LP optimum is fractional
    // (x = y = 8/5), best integral point is (2, 1) or (1, 2) with value 3.
    let mut p = IlpProblem::new(Sense::Maximize);
    let a = p.add_constraint(Bounds::at_most(8.0));
    let b = p.add_constraint(Bounds::at_most(8.0));
    p.add_variable(var(1.0, true, &[(a, 2.0), (b, 3.0)]));
    p.add_variable(var(1.0, true, &[(a, 3.0), (b, 2.0)]));

    let x = CbcIlp::new().solve(&p).unwrap();
    let total = x[0] + x[1];
    assert!((total - 3.0).abs() < 1e-6, "x = {x:?}");
    for v in &x {
        assert!((v - v.round()).abs() < 1e-6, "non-integral solution {x:?}");
    }
}

#[test]
fn ilp_respects_binary_style_bounds() {
    // max x + y + z, each in [0, 1], x + y + z <= 2.
    let mut p = IlpProblem::new(Sense::Maximize);
    let cap = p.add_constraint(Bounds::at_most(2.0));
    let mut vars = Vec::new();
    for _ in 0..3 {
        let bound = p.add_constraint(Bounds::at_most(1.0));
        vars.push(bound);
    }
    for bound in vars {
        p.add_variable(var(1.0, true, &[(cap, 1.0), (bound, 1.0)]));
    }

    let x = CbcIlp::new().solve(&p).unwrap();
    let total: f64 = x.iter().sum();
    assert!((total - 2.0).abs() < 1e-6, "x = {x:?}");
}

#[test]
fn qp_moves_to_the_unconstrained_minimum_when_feasible() {
    // min (x - 2)^2 with no constraints: Q = 2, c = -4.
    let p = QpProblem {
        q: DMatrix::from_row_slice(1, 1, &[2.0]),
        c: DVector::from_column_slice(&[-4.0]),
        a: DMatrix::zeros(0, 1),
        b: DVector::zeros(0),
    };
    let x = ActiveSetQp::new()
        .solve(&p, &DVector::from_column_slice(&[0.0]))
        .unwrap();
    assert!((x[0] - 2.0).abs() < 1e-6, "x = {x:?}");
}

#[test]
fn qp_stops_at_an_active_constraint() {
    // min x^2 + y^2 s.t. x + y >= 2; optimum at (1, 1).
    let p = QpProblem {
        q: DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 2.0]),
        c: DVector::zeros(2),
        a: DMatrix::from_row_slice(1, 2, &[1.0, 1.0]),
        b: DVector::from_column_slice(&[2.0]),
    };
    let start = DVector::from_column_slice(&[3.0, 3.0]);
    let x = ActiveSetQp::new().solve(&p, &start).unwrap();
    assert!((x[0] - 1.0).abs() < 1e-6 && (x[1] - 1.0).abs() < 1e-6, "x = {x:?}");
}

#[test]
fn qp_rejects_an_indefinite_objective() {
    let p = QpProblem {
        q: DMatrix::from_row_slice(1, 1, &[0.0]),
        c: DVector::zeros(1),
        a: DMatrix::zeros(0, 1),
        b: DVector::zeros(0),
    };
    assert!(matches!(
        ActiveSetQp::new().solve(&p, &DVector::zeros(1)),
        Err(SolverError::NotPositiveDefinite)
    ));
}
