use lpp3d_solver::{ConstraintSpec, ProblemModel, ProblemSpec, ValidationError};
use thiserror::Error;

use crate::ast::*;
use crate::lexer::Span;
use crate::parser::{ParseError, Parser};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unknown variable '{name}' at position {span:?}, expected x, y or z")]
    UnknownVariable { name: String, span: Span },
    #[error("Missing objective: add a 'maximize' line")]
    MissingObjective,
    #[error("Objective declared twice, second at position {0:?}")]
    DuplicateObjective(Span),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Invalid problem: {0}")]
    Invalid(#[from] ValidationError),
}

/// Parse and compile source text in one step
pub fn compile_source(source: &str) -> Result<ProblemModel, CompileError> {
    let program = Parser::parse(source)?;
    compile(&program)
}

/// Turn a parsed program into a validated problem.
///
/// Repeated terms for the same variable add up; missing ones are zero.
/// Unlabelled constraints are named `c1`, `c2`, ... by position.
pub fn compile(program: &Program) -> Result<ProblemModel, CompileError> {
    let mut objective: Option<[f64; 3]> = None;
    let mut spec = ProblemSpec::new();

    for statement in &program.statements {
        match statement {
            Statement::Objective(o) => {
                if objective.is_some() {
                    return Err(CompileError::DuplicateObjective(o.span));
                }
                objective = Some(collect_terms(&o.terms)?);
            }
            Statement::Constraint(c) => {
                spec.constraints.push(ConstraintSpec {
                    name: c.label.clone(),
                    coefficients: collect_terms(&c.terms)?,
                    rhs: c.rhs,
                });
            }
        }
    }

    spec.objective = objective.ok_or(CompileError::MissingObjective)?;

    Ok(spec.build()?)
}

fn collect_terms(terms: &[Term]) -> Result<[f64; 3], CompileError> {
    let mut coefficients = [0.0; 3];
    for term in terms {
        let index = match term.variable.as_str() {
            "x" => 0,
            "y" => 1,
            "z" => 2,
            _ => {
                return Err(CompileError::UnknownVariable {
                    name: term.variable.clone(),
                    span: term.span,
                });
            }
        };
        coefficients[index] += term.coefficient;
    }
    Ok(coefficients)
}
