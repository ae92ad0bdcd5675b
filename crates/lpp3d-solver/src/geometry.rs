use thiserror::Error;
use tracing::{debug, warn};

use crate::problem::ProblemModel;
use crate::solution::{Point3, SolutionReport, SolutionStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("Cannot project a {0:?} solution, only optimal ones")]
    NotOptimal(SolutionStatus),
    #[error("Grid resolution must be at least 2, got {0}")]
    Resolution(usize),
}

/// Samples each constraint's boundary plane over a square (x, y) grid so an
/// external renderer can draw the feasible region.
#[derive(Debug, Clone)]
pub struct GeometryProjector {
    /// Samples per axis
    resolution: usize,
    /// Grid extent used when no constraint has a positive right-hand side
    default_extent: f64,
    /// Z coefficients closer to zero than this are treated as vertical planes
    tolerance: f64,
}

impl Default for GeometryProjector {
    fn default() -> Self {
        Self {
            resolution: 10,
            default_extent: 1.0,
            tolerance: 1e-9,
        }
    }
}

/// Everything a renderer needs to draw a solved problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationData {
    /// Side length `L` of the sampled square `[0, L] × [0, L]`
    pub extent: f64,
    /// Sample positions along x (grid columns)
    pub xs: Vec<f64>,
    /// Sample positions along y (grid rows)
    pub ys: Vec<f64>,
    /// One entry per constraint, in constraint order
    pub surfaces: Vec<ConstraintSurface>,
    pub optimum: Point3,
    pub optimal_value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSurface {
    /// Index of the constraint in the problem
    pub index: usize,
    pub name: String,
    pub color: SurfaceColor,
    pub surface: Surface,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// `z` heights indexed `[row][col]`, i.e. at `(xs[col], ys[row])`.
    /// Cells where the plane dips below `z = 0` are `None`.
    Plane(Vec<Vec<Option<f64>>>),
    /// The constraint has no z term, so its plane cannot be written as
    /// `z = f(x, y)`.
    Vertical,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceColor {
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
}

/// Consumer of projected geometry, e.g. a plotting backend
pub trait Renderer {
    type Error;

    fn render(&mut self, data: &VisualizationData) -> Result<(), Self::Error>;
}

impl GeometryProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Grid extent for problems without a positive right-hand side. Values
    /// that are not finite and positive are ignored.
    pub fn with_default_extent(mut self, extent: f64) -> Self {
        if extent.is_finite() && extent > 0.0 {
            self.default_extent = extent;
        } else {
            warn!(extent, kept = self.default_extent, "ignoring invalid default extent");
        }
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        if tol.is_finite() && tol > 0.0 {
            self.tolerance = tol;
        } else {
            warn!(tol, kept = self.tolerance, "ignoring invalid projection tolerance");
        }
        self
    }

    pub fn project(&self, problem: &ProblemModel, report: &SolutionReport) -> Result<VisualizationData, ProjectionError> {
        let (Some(optimum), Some(optimal_value)) = (report.point, report.optimal_value) else {
            return Err(ProjectionError::NotOptimal(report.status));
        };
        if report.status != SolutionStatus::Optimal {
            return Err(ProjectionError::NotOptimal(report.status));
        }
        if self.resolution < 2 {
            return Err(ProjectionError::Resolution(self.resolution));
        }

        let extent = self.extent(problem);
        let axis = linspace(extent, self.resolution);

        let surfaces = problem
            .constraints()
            .iter()
            .enumerate()
            .map(|(index, c)| {
                let [a, b, cz] = c.coefficients;
                let surface = if cz.abs() <= self.tolerance {
                    Surface::Vertical
                } else {
                    Surface::Plane(
                        axis.iter()
                            .map(|&y| {
                                axis.iter()
                                    .map(|&x| {
                                        // `+ 0.0` turns -0.0 into 0.0
                                        let z = (c.rhs - a * x - b * y) / cz + 0.0;
                                        (z >= 0.0).then_some(z)
                                    })
                                    .collect()
                            })
                            .collect(),
                    )
                };
                ConstraintSurface {
                    index,
                    name: c.name.clone(),
                    color: SurfaceColor::cycle(index),
                    surface,
                }
            })
            .collect();

        debug!(extent, resolution = self.resolution, "projected constraint planes");

        Ok(VisualizationData {
            extent,
            xs: axis.clone(),
            ys: axis,
            surfaces,
            optimum,
            optimal_value,
        })
    }

    /// `max(rhs)`, or the configured default when that is not positive
    fn extent(&self, problem: &ProblemModel) -> f64 {
        let max_rhs = problem.max_rhs();
        if max_rhs > self.tolerance {
            max_rhs
        } else {
            self.default_extent
        }
    }
}

impl VisualizationData {
    pub fn title(&self) -> String {
        format!("3D LPP: Optimal Z = {:.2}", self.optimal_value)
    }

}

impl SurfaceColor {
    const PALETTE: [SurfaceColor; 5] = [
        SurfaceColor::Blue,
        SurfaceColor::Red,
        SurfaceColor::Green,
        SurfaceColor::Yellow,
        SurfaceColor::Purple,
    ];

    /// Palette color for the `index`-th surface, wrapping around
    pub fn cycle(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceColor::Blue => "blue",
            SurfaceColor::Red => "red",
            SurfaceColor::Green => "green",
            SurfaceColor::Yellow => "yellow",
            SurfaceColor::Purple => "purple",
        }
    }
}

/// `n` evenly spaced samples from 0 to `end` inclusive
fn linspace(end: f64, n: usize) -> Vec<f64> {
    let step = end / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { end } else { i as f64 * step })
        .collect()
}
