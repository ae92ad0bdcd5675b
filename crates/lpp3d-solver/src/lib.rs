mod geometry;
mod problem;
mod simplex;
mod solution;

pub use geometry::{ConstraintSurface, GeometryProjector, ProjectionError, Renderer, Surface, SurfaceColor, VisualizationData};
pub use problem::{Constraint, ConstraintSpec, ProblemModel, ProblemSpec, ValidationError};
pub use simplex::Solver;
pub use solution::{Analysis, Point3, SolutionReport, SolutionStatus};

/// Solve with the default [`Solver`] configuration
pub fn solve(problem: &ProblemModel) -> SolutionReport {
    Solver::default().solve(problem)
}

/// Project with the default [`GeometryProjector`] configuration
pub fn project(problem: &ProblemModel, report: &SolutionReport) -> Result<VisualizationData, ProjectionError> {
    GeometryProjector::default().project(problem, report)
}
