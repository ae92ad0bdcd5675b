use clap::{Parser, Subcommand, ValueEnum};
use lpp3d_solver::{GeometryProjector, ProblemModel, Renderer, SolutionReport, SolutionStatus, Solver};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod render;

use render::{JsonRenderer, TextRenderer};

#[derive(Parser)]
#[command(name = "lpp3d")]
#[command(about = "Solve and visualize three-variable linear programs", long_about = None)]
struct Cli {
    /// Log solver progress (-v for debug, -vv for every pivot)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem and print the optimum
    Solve {
        /// The problem file (.lp text or .json)
        file: PathBuf,
        #[command(flatten)]
        solver: SolverArgs,
        /// Show shadow prices, reduced costs and binding constraints
        #[arg(short, long)]
        analysis: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Solve a problem and output its constraint planes for plotting
    Project {
        /// The problem file (.lp text or .json)
        file: PathBuf,
        #[command(flatten)]
        solver: SolverArgs,
        /// Samples per axis of the (x, y) grid
        #[arg(short, long, default_value_t = 10)]
        resolution: usize,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

#[derive(clap::Args)]
struct SolverArgs {
    /// Tolerance for comparisons against zero
    #[arg(long, default_value_t = 1e-9, value_parser = parse_tolerance)]
    tolerance: f64,
    /// Maximum pivots per simplex phase
    #[arg(long, default_value_t = 10000)]
    max_iterations: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl SolverArgs {
    fn solver(&self) -> Solver {
        Solver::new()
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_iterations)
    }
}

/// Accept only finite, strictly positive tolerances
fn parse_tolerance(s: &str) -> Result<f64, String> {
    let tol: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if tol.is_finite() && tol > 0.0 {
        Ok(tol)
    } else {
        Err(format!("tolerance must be a positive finite number, got {}", s))
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve { file, solver, analysis, format } => {
            let problem = load_or_exit(&file);
            let report = solver.solver().solve(&problem);

            if format == Format::Json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error writing JSON: {}", e);
                        std::process::exit(1);
                    }
                }
                if !report.is_optimal() {
                    std::process::exit(1);
                }
                return;
            }

            print_status(&report);
            let (Some(value), Some(p)) = (report.optimal_value, report.point) else {
                std::process::exit(1);
            };
            println!("Optimal Value (Max Z): {:.2}", value);
            println!("Coordinates: x={:.2}, y={:.2}, z={:.2}", p.x, p.y, p.z);

            if analysis {
                if let Some(ref a) = report.analysis {
                    print_analysis(&problem, a);
                }
            }
        }
        Commands::Project { file, solver, resolution, format } => {
            let problem = load_or_exit(&file);
            let solver = solver.solver();
            let report = solver.solve(&problem);

            if !report.is_optimal() {
                print_status(&report);
                println!("Skipping visualization.");
                std::process::exit(1);
            }

            let projector = GeometryProjector::new()
                .with_resolution(resolution)
                .with_tolerance(solver.tolerance());
            let data = match projector.project(&problem, &report) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("Projection error: {}", e);
                    std::process::exit(1);
                }
            };

            let stdout = std::io::stdout().lock();
            let result = match format {
                Format::Text => TextRenderer::new(stdout).render(&data).map_err(|e| e.to_string()),
                Format::Json => JsonRenderer::new(stdout).render(&data).map_err(|e| e.to_string()),
            };
            if let Err(e) = result {
                eprintln!("Render error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Check { file } => match load_problem(&file) {
            Ok(problem) => {
                let [cx, cy, cz] = problem.objective();
                println!("✓ {} is valid", file.display());
                println!("  maximize {}x + {}y + {}z", cx, cy, cz);
                println!("  {} constraints", problem.num_constraints());
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file.display());
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        },
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }
}

/// Read a problem from `.json` (the `ProblemSpec` format) or `.lp` text
fn load_problem(path: &Path) -> Result<ProblemModel, String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("Error reading file: {}", e))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&source).map_err(|e| format!("Invalid problem: {}", e))
    } else {
        lpp3d_lang::compile_source(&source).map_err(|e| format!("Compile error: {}", e))
    }
}

fn load_or_exit(path: &Path) -> ProblemModel {
    match load_problem(path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn print_status(report: &SolutionReport) {
    match report.status {
        SolutionStatus::Optimal => println!("Status: OPTIMAL"),
        SolutionStatus::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No feasible solution found.");
        }
        SolutionStatus::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The problem has no finite optimal solution.");
        }
        SolutionStatus::IterationLimit => {
            println!("Status: ITERATION LIMIT");
            println!("Stopped after {} pivots without reaching an optimum.", report.iterations);
        }
    }
}

fn print_analysis(problem: &ProblemModel, analysis: &lpp3d_solver::Analysis) {
    let constraints = problem.constraints();

    println!();
    println!("Analysis:");
    println!();

    if !analysis.binding_constraints.is_empty() {
        println!("Binding constraints:");
        for &i in &analysis.binding_constraints {
            println!("  - {}", constraints[i].name);
        }
        println!();
    }

    println!("Shadow prices:");
    for (c, &price) in constraints.iter().zip(&analysis.shadow_prices) {
        if price.abs() > 0.001 {
            println!("  {:20} {:10.4}", c.name, price);
        }
    }
    println!();

    println!("Reduced costs:");
    for (name, &rc) in ["x", "y", "z"].iter().zip(&analysis.reduced_costs) {
        if rc.abs() > 0.001 {
            println!("  {:20} objective coefficient must rise by {:.2} to enter solution", name, rc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_flag_rejects_invalid_values() {
        assert_eq!(parse_tolerance("1e-6"), Ok(1e-6));
        for bad in ["NaN", "inf", "-1", "0", "abc"] {
            assert!(parse_tolerance(bad).is_err(), "accepted {bad}");
        }

        assert!(Cli::try_parse_from(["lpp3d", "solve", "p.lp", "--tolerance", "-1"]).is_err());
        let cli = Cli::try_parse_from(["lpp3d", "solve", "p.lp", "--tolerance", "1e-7"]).unwrap();
        let Commands::Solve { solver, .. } = cli.command else {
            panic!("Expected solve command");
        };
        assert_eq!(solver.solver().tolerance(), 1e-7);
    }
}
