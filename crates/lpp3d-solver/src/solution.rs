/// The result of solving a problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionReport {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal objective value, present only when optimal
    pub optimal_value: Option<f64>,
    /// Optimal point, present only when optimal
    pub point: Option<Point3>,
    /// Dual information at the optimum
    pub analysis: Option<Analysis>,
    /// Pivots performed across both phases
    pub iterations: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// No point satisfies all constraints
    Infeasible,
    /// The objective grows without bound over the feasible region
    Unbounded,
    /// The configured pivot limit was hit before a terminal state
    IterationLimit,
}

/// A point in (x, y, z) space
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Dual information read off the final tableau
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Shadow price (dual value) for each constraint.
    /// Indicates how much the optimum would grow per unit increase of its rhs.
    pub shadow_prices: Vec<f64>,
    /// Reduced costs of x, y and z (zero for basic variables)
    pub reduced_costs: [f64; 3],
    /// Indices of constraints that hold with equality at the optimum
    pub binding_constraints: Vec<usize>,
}

impl SolutionReport {
    pub fn optimal(optimal_value: f64, point: Point3, analysis: Analysis, iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_value: Some(optimal_value),
            point: Some(point),
            analysis: Some(analysis),
            iterations,
        }
    }

    pub fn infeasible(iterations: usize) -> Self {
        Self::terminal(SolutionStatus::Infeasible, iterations)
    }

    pub fn unbounded(iterations: usize) -> Self {
        Self::terminal(SolutionStatus::Unbounded, iterations)
    }

    pub fn iteration_limit(iterations: usize) -> Self {
        Self::terminal(SolutionStatus::IterationLimit, iterations)
    }

    fn terminal(status: SolutionStatus, iterations: usize) -> Self {
        Self {
            status,
            optimal_value: None,
            point: None,
            analysis: None,
            iterations,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_reports_carry_no_optimum() {
        for report in [
            SolutionReport::infeasible(3),
            SolutionReport::unbounded(1),
            SolutionReport::iteration_limit(10),
        ] {
            assert!(!report.is_optimal());
            assert!(report.optimal_value.is_none());
            assert!(report.point.is_none());
            assert!(report.analysis.is_none());
        }
    }

    #[test]
    fn test_point_conversions() {
        let p = Point3::from([1.0, 2.0, 3.0]);
        assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p.to_array(), [1.0, 2.0, 3.0]);
    }
}
