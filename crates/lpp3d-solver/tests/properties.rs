//! Property-based tests for the simplex solver
//!
//! Tests:
//! - Optimal points are feasible
//! - Solving is deterministic
//! - Optimal values match brute-force vertex enumeration

use lpp3d_solver::{ProblemModel, ProblemSpec, SolutionStatus, Solver};
use proptest::prelude::*;

const CHECK_TOL: f64 = 1e-6;

fn coefficient() -> impl Strategy<Value = f64> {
    (-5i32..=5).prop_map(f64::from)
}

fn constraint() -> impl Strategy<Value = ([f64; 3], f64)> {
    (
        prop::array::uniform3(coefficient()),
        (-5i32..=20).prop_map(f64::from),
    )
}

fn problem() -> impl Strategy<Value = ProblemModel> {
    (
        prop::array::uniform3(coefficient()),
        prop::collection::vec(constraint(), 1..6),
    )
        .prop_map(|(objective, rows)| {
            rows.into_iter()
                .fold(
                    ProblemSpec::new().objective(objective[0], objective[1], objective[2]),
                    |spec, (coefficients, rhs)| spec.constraint(coefficients, rhs),
                )
                .build()
                .unwrap()
        })
}

/// Every vertex of the feasible region, found by intersecting each triple of
/// boundary planes (constraints plus the coordinate planes).
fn feasible_vertices(problem: &ProblemModel) -> Vec<[f64; 3]> {
    let mut planes: Vec<([f64; 3], f64)> = problem
        .constraints()
        .iter()
        .map(|c| (c.coefficients, c.rhs))
        .collect();
    planes.push(([1.0, 0.0, 0.0], 0.0));
    planes.push(([0.0, 1.0, 0.0], 0.0));
    planes.push(([0.0, 0.0, 1.0], 0.0));

    let mut vertices = Vec::new();
    for i in 0..planes.len() {
        for j in i + 1..planes.len() {
            for k in j + 1..planes.len() {
                let Some(p) = intersect(planes[i], planes[j], planes[k]) else {
                    continue;
                };
                if problem.is_feasible(&p.into(), CHECK_TOL) {
                    vertices.push(p);
                }
            }
        }
    }
    vertices
}

fn det3(m: [[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]) - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn intersect(p: ([f64; 3], f64), q: ([f64; 3], f64), r: ([f64; 3], f64)) -> Option<[f64; 3]> {
    let m = [p.0, q.0, r.0];
    let d = det3(m);
    if d.abs() < 1e-9 {
        return None;
    }
    let rhs = [p.1, q.1, r.1];
    let mut out = [0.0; 3];
    for (col, value) in out.iter_mut().enumerate() {
        let mut mc = m;
        for row in 0..3 {
            mc[row][col] = rhs[row];
        }
        *value = det3(mc) / d;
    }
    Some(out)
}

proptest! {
    /// Optimal points satisfy every constraint and are non-negative
    #[test]
    fn optimal_point_is_feasible(problem in problem()) {
        let report = Solver::new().solve(&problem);
        if let Some(point) = report.point {
            prop_assert!(problem.is_feasible(&point, CHECK_TOL), "{:?} infeasible for {:?}", point, problem);
            let value = report.optimal_value.unwrap();
            prop_assert!((problem.evaluate(&point) - value).abs() < CHECK_TOL * (1.0 + value.abs()));
        }
    }

    /// Solving the same problem twice yields identical reports
    #[test]
    fn solve_is_deterministic(problem in problem()) {
        let solver = Solver::new();
        prop_assert_eq!(solver.solve(&problem), solver.solve(&problem));
    }

    /// Status and optimal value agree with vertex enumeration
    #[test]
    fn agrees_with_vertex_enumeration(problem in problem()) {
        let report = Solver::new().solve(&problem);
        let vertices = feasible_vertices(&problem);

        match report.status {
            SolutionStatus::Optimal => {
                let best = vertices
                    .iter()
                    .map(|v| problem.evaluate(&(*v).into()))
                    .fold(f64::NEG_INFINITY, f64::max);
                let value = report.optimal_value.unwrap();
                prop_assert!((value - best).abs() < CHECK_TOL * (1.0 + best.abs()), "solver {} vs vertices {}", value, best);
            }
            SolutionStatus::Infeasible => prop_assert!(vertices.is_empty()),
            SolutionStatus::Unbounded => prop_assert!(!vertices.is_empty()),
            SolutionStatus::IterationLimit => prop_assert!(false, "iteration limit on {:?}", problem),
        }
    }
}
