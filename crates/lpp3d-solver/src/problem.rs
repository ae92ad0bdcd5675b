use thiserror::Error;

use crate::solution::Point3;

/// Reasons a problem description is rejected before solving
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Problem has no constraints")]
    NoConstraints,
    #[error("Objective coefficient {index} is not finite: {value}")]
    NonFiniteObjective { index: usize, value: f64 },
    #[error("Coefficient {index} of constraint '{constraint}' is not finite: {value}")]
    NonFiniteCoefficient {
        constraint: String,
        index: usize,
        value: f64,
    },
    #[error("Right-hand side of constraint '{constraint}' is not finite: {value}")]
    NonFiniteRhs { constraint: String, value: f64 },
}

/// A validated three-variable linear program:
/// maximize `objective · (x, y, z)` subject to every constraint and `x, y, z >= 0`.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ProblemSpec", into = "ProblemSpec")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemModel {
    objective: [f64; 3],
    constraints: Vec<Constraint>,
}

/// A single `a·x + b·y + c·z <= rhs` row
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for x, y and z
    pub coefficients: [f64; 3],
    /// Right-hand side value
    pub rhs: f64,
}

/// Unvalidated problem description.
///
/// Doubles as the builder for [`ProblemModel`] and as its wire format when the
/// `serde` feature is enabled.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemSpec {
    pub objective: [f64; 3],
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<ConstraintSpec>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    pub coefficients: [f64; 3],
    pub rhs: f64,
}

impl ProblemSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objective(mut self, cx: f64, cy: f64, cz: f64) -> Self {
        self.objective = [cx, cy, cz];
        self
    }

    pub fn constraint(mut self, coefficients: [f64; 3], rhs: f64) -> Self {
        self.constraints.push(ConstraintSpec {
            name: None,
            coefficients,
            rhs,
        });
        self
    }

    pub fn named_constraint(mut self, name: impl Into<String>, coefficients: [f64; 3], rhs: f64) -> Self {
        self.constraints.push(ConstraintSpec {
            name: Some(name.into()),
            coefficients,
            rhs,
        });
        self
    }

    pub fn build(self) -> Result<ProblemModel, ValidationError> {
        ProblemModel::try_from(self)
    }
}

impl ProblemModel {
    /// Validate and build a problem. Fails if there are no constraints or any
    /// scalar is NaN or infinite.
    pub fn new(objective: [f64; 3], constraints: Vec<Constraint>) -> Result<Self, ValidationError> {
        if constraints.is_empty() {
            return Err(ValidationError::NoConstraints);
        }

        for (index, &value) in objective.iter().enumerate() {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteObjective { index, value });
            }
        }

        for c in &constraints {
            for (index, &value) in c.coefficients.iter().enumerate() {
                if !value.is_finite() {
                    return Err(ValidationError::NonFiniteCoefficient {
                        constraint: c.name.clone(),
                        index,
                        value,
                    });
                }
            }
            if !c.rhs.is_finite() {
                return Err(ValidationError::NonFiniteRhs {
                    constraint: c.name.clone(),
                    value: c.rhs,
                });
            }
        }

        Ok(Self { objective, constraints })
    }

    pub fn objective(&self) -> [f64; 3] {
        self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Largest right-hand side over all constraints
    pub fn max_rhs(&self) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.rhs)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Objective value at `point`
    pub fn evaluate(&self, point: &Point3) -> f64 {
        dot(&self.objective, &point.to_array())
    }

    /// Whether `point` satisfies every constraint and the non-negativity
    /// bounds, allowing `tolerance` of slack in each comparison.
    pub fn is_feasible(&self, point: &Point3, tolerance: f64) -> bool {
        let p = point.to_array();
        p.iter().all(|&v| v >= -tolerance)
            && self.constraints.iter().all(|c| c.lhs(&p) <= c.rhs + tolerance)
    }
}

impl Constraint {
    pub fn new(name: impl Into<String>, coefficients: [f64; 3], rhs: f64) -> Self {
        Self {
            name: name.into(),
            coefficients,
            rhs,
        }
    }

    /// Left-hand side `a·x + b·y + c·z` at `point`
    pub fn lhs(&self, point: &[f64; 3]) -> f64 {
        dot(&self.coefficients, point)
    }
}

impl TryFrom<ProblemSpec> for ProblemModel {
    type Error = ValidationError;

    fn try_from(spec: ProblemSpec) -> Result<Self, Self::Error> {
        let constraints = spec
            .constraints
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let name = c.name.unwrap_or_else(|| format!("c{}", i + 1));
                Constraint::new(name, c.coefficients, c.rhs)
            })
            .collect();
        ProblemModel::new(spec.objective, constraints)
    }
}

impl From<ProblemModel> for ProblemSpec {
    fn from(model: ProblemModel) -> Self {
        Self {
            objective: model.objective,
            constraints: model
                .constraints
                .into_iter()
                .map(|c| ConstraintSpec {
                    name: Some(c.name),
                    coefficients: c.coefficients,
                    rhs: c.rhs,
                })
                .collect(),
        }
    }
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_names_constraints_by_position() {
        let model = ProblemSpec::new()
            .objective(3.0, 2.0, 1.0)
            .constraint([1.0, 1.0, 1.0], 10.0)
            .named_constraint("cap", [1.0, 0.0, 0.0], 4.0)
            .constraint([0.0, 1.0, 0.0], 5.0)
            .build()
            .unwrap();

        let names: Vec<_> = model.constraints().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c1", "cap", "c3"]);
        assert_eq!(model.objective(), [3.0, 2.0, 1.0]);
        assert_eq!(model.num_constraints(), 3);
        assert_eq!(model.max_rhs(), 10.0);
    }

    #[test]
    fn test_new_from_constraints() {
        let model = ProblemModel::new(
            [1.0, 0.0, 0.0],
            vec![Constraint::new("x_max", [1.0, 0.0, 0.0], 4.0)],
        )
        .unwrap();
        assert_eq!(model.constraints()[0].lhs(&[2.0, 9.0, 9.0]), 2.0);
        assert_eq!(ProblemSpec::from(model.clone()).build(), Ok(model));
    }

    #[test]
    fn test_rejects_empty_constraints() {
        let err = ProblemSpec::new().objective(1.0, 1.0, 1.0).build().unwrap_err();
        assert_eq!(err, ValidationError::NoConstraints);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let err = ProblemSpec::new()
            .objective(1.0, f64::NAN, 1.0)
            .constraint([1.0, 1.0, 1.0], 1.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::NonFiniteObjective { index: 1, .. }));

        let err = ProblemSpec::new()
            .objective(1.0, 1.0, 1.0)
            .named_constraint("bad", [1.0, 1.0, f64::INFINITY], 1.0)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonFiniteCoefficient {
                constraint: "bad".to_string(),
                index: 2,
                value: f64::INFINITY,
            }
        );

        let err = ProblemSpec::new()
            .objective(1.0, 1.0, 1.0)
            .constraint([1.0, 1.0, 1.0], f64::NEG_INFINITY)
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::NonFiniteRhs { .. }));
        assert_eq!(
            err.to_string(),
            "Right-hand side of constraint 'c1' is not finite: -inf"
        );
    }

    #[test]
    fn test_feasibility_check() {
        let model = ProblemSpec::new()
            .objective(1.0, 1.0, 1.0)
            .constraint([1.0, 1.0, 0.0], 4.0)
            .build()
            .unwrap();

        assert!(model.is_feasible(&Point3::new(2.0, 2.0, 7.0), 1e-9));
        assert!(!model.is_feasible(&Point3::new(2.0, 2.1, 0.0), 1e-9));
        assert!(!model.is_feasible(&Point3::new(-0.5, 0.0, 0.0), 1e-9));
        assert!(model.is_feasible(&Point3::new(-1e-12, 0.0, 0.0), 1e-9));
        assert_eq!(model.evaluate(&Point3::new(1.0, 2.0, 3.0)), 6.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_goes_through_validation() {
        let model: ProblemModel = serde_json::from_str(
            r#"{"objective": [3, 2, 1], "constraints": [{"coefficients": [1, 1, 1], "rhs": 10}]}"#,
        )
        .unwrap();
        assert_eq!(model.constraints()[0].name, "c1");

        let err = serde_json::from_str::<ProblemModel>(r#"{"objective": [1, 0, 0], "constraints": []}"#)
            .unwrap_err();
        assert!(err.to_string().contains("no constraints"));
    }
}
