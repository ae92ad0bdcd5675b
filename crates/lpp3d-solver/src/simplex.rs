use tracing::{debug, trace, warn};

use crate::problem::ProblemModel;
use crate::solution::{Analysis, Point3, SolutionReport};

/// Number of decision variables (x, y, z)
const N_VARS: usize = 3;

/// Two-phase primal simplex solver for three-variable problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Consecutive degenerate pivots tolerated before switching to Bland's rule
    degenerate_pivot_limit: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            degenerate_pivot_limit: 50,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the comparison tolerance. Values that are not finite and positive
    /// are ignored and the current tolerance is kept.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        if tol.is_finite() && tol > 0.0 {
            self.tolerance = tol;
        } else {
            warn!(tol, kept = self.tolerance, "ignoring invalid solver tolerance");
        }
        self
    }

    pub fn with_degenerate_pivot_limit(mut self, limit: usize) -> Self {
        self.degenerate_pivot_limit = limit;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Maximize the problem's objective using the two-phase simplex method
    pub fn solve(&self, problem: &ProblemModel) -> SolutionReport {
        let mut tableau = Tableau::build(problem);
        let mut iterations = 0;

        debug!(
            constraints = problem.num_constraints(),
            artificials = tableau.n_artificial,
            "starting simplex"
        );

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            tableau.set_phase1_objective();
            match self.run(&mut tableau, &mut iterations) {
                PhaseOutcome::Optimal => {}
                PhaseOutcome::Unbounded => return SolutionReport::infeasible(iterations),
                PhaseOutcome::IterationLimit => {
                    debug!(iterations, "iteration limit reached in phase 1");
                    return SolutionReport::iteration_limit(iterations);
                }
            }

            let residual = tableau.objective_value();
            if residual < -self.tolerance {
                debug!(residual, iterations, "phase 1 left artificial infeasibility");
                return SolutionReport::infeasible(iterations);
            }

            self.drive_out_artificials(&mut tableau);
            tableau.drop_artificials();
            debug!(iterations, "phase 1 found a feasible basis");
        }

        // Phase 2: Optimize the real objective
        tableau.set_objective(&problem.objective());
        match self.run(&mut tableau, &mut iterations) {
            PhaseOutcome::Optimal => {}
            PhaseOutcome::Unbounded => {
                debug!(iterations, "objective is unbounded");
                return SolutionReport::unbounded(iterations);
            }
            PhaseOutcome::IterationLimit => {
                debug!(iterations, "iteration limit reached in phase 2");
                return SolutionReport::iteration_limit(iterations);
            }
        }

        let report = self.extract_solution(&tableau, problem, iterations);
        debug!(value = ?report.optimal_value, iterations, "optimal solution found");
        report
    }

    /// Pivot until no reduced cost is negative
    fn run(&self, tableau: &mut Tableau, iterations: &mut usize) -> PhaseOutcome {
        let mut pivots = 0;
        let mut degenerate_streak = 0;

        loop {
            let bland = degenerate_streak >= self.degenerate_pivot_limit;
            let Some(pivot_col) = self.find_pivot_column(tableau, bland) else {
                return PhaseOutcome::Optimal;
            };
            if pivots == self.max_iterations {
                return PhaseOutcome::IterationLimit;
            }
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col, bland) else {
                return PhaseOutcome::Unbounded;
            };

            let step = tableau.data[pivot_row][tableau.rhs_col()];
            if step.abs() <= self.tolerance {
                degenerate_streak += 1;
            } else {
                degenerate_streak = 0;
            }

            trace!(row = pivot_row, col = pivot_col, step, bland, "pivot");
            tableau.pivot(pivot_row, pivot_col);
            pivots += 1;
            *iterations += 1;
        }
    }

    /// Most negative reduced cost, lowest index on ties.
    /// With `bland` set, the lowest index with any negative reduced cost.
    fn find_pivot_column(&self, tableau: &Tableau, bland: bool) -> Option<usize> {
        let obj = &tableau.data[tableau.obj_row()];
        let candidates = obj[..tableau.rhs_col()].iter().copied().enumerate();

        if bland {
            return candidates.filter(|&(_, v)| v < -self.tolerance).map(|(j, _)| j).next();
        }

        let mut min_val = -self.tolerance;
        let mut min_col = None;
        for (j, v) in candidates {
            if v < min_val {
                min_val = v;
                min_col = Some(j);
            }
        }
        min_col
    }

    /// Minimum ratio test over positive entries of `col`.
    /// Ties go to the lowest row, or to the lowest basic column under Bland's rule.
    fn find_pivot_row(&self, tableau: &Tableau, col: usize, bland: bool) -> Option<usize> {
        let rhs_col = tableau.rhs_col();

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..tableau.n_constraints() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = (tableau.data[i][rhs_col] / val).max(0.0);
            let better = match min_row {
                None => true,
                Some(_) if ratio < min_ratio - self.tolerance => true,
                Some(best) => {
                    bland
                        && (ratio - min_ratio).abs() <= self.tolerance
                        && tableau.basis[i] < tableau.basis[best]
                }
            };
            if better {
                min_ratio = min_ratio.min(ratio);
                min_row = Some(i);
            }
        }

        min_row
    }

    /// Replace artificials left in the basis at zero level with real columns.
    /// Rows where that is impossible are linearly dependent and get removed.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.artificial_start;
        let mut redundant = Vec::new();

        for i in 0..tableau.n_constraints() {
            if tableau.basis[i] < art_start {
                continue;
            }
            let replacement = (0..art_start)
                .filter(|&j| tableau.data[i][j].abs() > self.tolerance)
                .max_by(|&a, &b| tableau.data[i][a].abs().total_cmp(&tableau.data[i][b].abs()));
            match replacement {
                Some(col) => {
                    trace!(row = i, col, "driving artificial out of basis");
                    tableau.pivot(i, col);
                }
                None => redundant.push(i),
            }
        }

        for &i in redundant.iter().rev() {
            debug!(row = i, "removing redundant row");
            tableau.data.remove(i);
            tableau.basis.remove(i);
        }
    }

    fn extract_solution(&self, tableau: &Tableau, problem: &ProblemModel, iterations: usize) -> SolutionReport {
        let rhs_col = tableau.rhs_col();
        let obj = &tableau.data[tableau.obj_row()];

        // Extract variable values
        let mut values = [0.0; N_VARS];
        for (i, &basic) in tableau.basis.iter().enumerate() {
            if basic < N_VARS {
                values[basic] = self.snap(tableau.data[i][rhs_col]);
            }
        }
        let point = Point3::from(values);

        // Slack column of constraint i is N_VARS + i in both phases
        let shadow_prices = (0..problem.num_constraints())
            .map(|i| self.snap(obj[N_VARS + i]))
            .collect();

        let mut reduced_costs = [0.0; N_VARS];
        for (j, rc) in reduced_costs.iter_mut().enumerate() {
            *rc = self.snap(obj[j]);
        }

        let binding_constraints = problem
            .constraints()
            .iter()
            .enumerate()
            .filter(|(_, c)| (c.rhs - c.lhs(&values)).abs() <= self.tolerance * (1.0 + c.rhs.abs()))
            .map(|(i, _)| i)
            .collect();

        let analysis = Analysis {
            shadow_prices,
            reduced_costs,
            binding_constraints,
        };

        SolutionReport::optimal(self.snap(obj[rhs_col]), point, analysis, iterations)
    }

    /// Clamp values within tolerance of zero to exactly zero
    fn snap(&self, value: f64) -> f64 {
        if value.abs() <= self.tolerance { 0.0 } else { value }
    }
}

/// Dense simplex tableau. Constraint rows come first, the objective row is last;
/// the rightmost column holds the right-hand sides.
///
/// Column layout: x, y, z, one slack per constraint, one artificial per
/// constraint whose rhs was negative, rhs.
struct Tableau {
    data: Vec<Vec<f64>>,
    basis: Vec<usize>,
    artificial_start: usize,
    n_artificial: usize,
}

impl Tableau {
    fn build(problem: &ProblemModel) -> Self {
        let n_constraints = problem.num_constraints();
        let n_artificial = problem.constraints().iter().filter(|c| c.rhs < 0.0).count();
        let artificial_start = N_VARS + n_constraints;

        let total_cols = artificial_start + n_artificial + 1; // +1 for RHS
        let total_rows = n_constraints + 1; // +1 for objective
        let rhs_col = total_cols - 1;

        let mut data = vec![vec![0.0; total_cols]; total_rows];
        let mut basis = vec![0; n_constraints];
        let mut artificial_idx = artificial_start;

        for (i, c) in problem.constraints().iter().enumerate() {
            let row = &mut data[i];
            row[..N_VARS].copy_from_slice(&c.coefficients);
            row[N_VARS + i] = 1.0;
            row[rhs_col] = c.rhs;

            if c.rhs < 0.0 {
                // Negate so the rhs is non-negative; the slack can no longer
                // start in the basis, so an artificial takes its place
                for v in row[..=N_VARS + i].iter_mut() {
                    *v = -*v;
                }
                row[rhs_col] = -c.rhs;
                row[artificial_idx] = 1.0;
                basis[i] = artificial_idx;
                artificial_idx += 1;
            } else {
                basis[i] = N_VARS + i;
            }
        }

        Self {
            data,
            basis,
            artificial_start,
            n_artificial,
        }
    }

    fn n_constraints(&self) -> usize {
        self.basis.len()
    }

    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn rhs_col(&self) -> usize {
        self.data[0].len() - 1
    }

    fn objective_value(&self) -> f64 {
        self.data[self.obj_row()][self.rhs_col()]
    }

    /// Objective row for maximizing `-sum(artificials)`, priced out against the
    /// starting basis.
    fn set_phase1_objective(&mut self) {
        let obj_row = self.obj_row();
        let art = self.artificial_start..self.artificial_start + self.n_artificial;

        let mut obj = vec![0.0; self.data[0].len()];
        for v in &mut obj[art.clone()] {
            *v = 1.0;
        }
        for (i, &basic) in self.basis.iter().enumerate() {
            if art.contains(&basic) {
                for (o, &v) in obj.iter_mut().zip(&self.data[i]) {
                    *o -= v;
                }
            }
        }
        self.data[obj_row] = obj;
    }

    /// Objective row for maximizing `objective · (x, y, z)`, priced out against
    /// the current basis.
    fn set_objective(&mut self, objective: &[f64; N_VARS]) {
        let obj_row = self.obj_row();

        let mut obj = vec![0.0; self.data[0].len()];
        for (o, &c) in obj.iter_mut().zip(objective) {
            *o = -c;
        }
        for (i, &basic) in self.basis.iter().enumerate() {
            let factor = obj[basic];
            if factor != 0.0 {
                for (o, &v) in obj.iter_mut().zip(&self.data[i]) {
                    *o -= factor * v;
                }
            }
        }
        self.data[obj_row] = obj;
    }

    fn drop_artificials(&mut self) {
        let art = self.artificial_start..self.artificial_start + self.n_artificial;
        for row in &mut self.data {
            row.drain(art.clone());
        }
        self.n_artificial = 0;
    }

    fn pivot(&mut self, row: usize, col: usize) {
        // Update basic variable
        self.basis[row] = col;

        // Scale pivot row
        let pivot_val = self.data[row][col];
        for v in &mut self.data[row] {
            *v /= pivot_val;
        }
        self.data[row][col] = 1.0;

        // Eliminate column in other rows
        let pivot_row = self.data[row].clone();
        for (i, other) in self.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = other[col];
            if factor != 0.0 {
                for (v, &p) in other.iter_mut().zip(&pivot_row) {
                    *v -= factor * p;
                }
                other[col] = 0.0;
            }
        }
    }
}

enum PhaseOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
}
