//! Implements a solver interface for HiGHS
use ::highs::{Col, HighsModelStatus, RowProblem, Sense};
use tracing::{debug, warn};

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{SolveLimits, Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution, TerminationReason};

/// Solver using the HiGHS MILP solver
///
/// # Note:
/// HiGHS runs the whole solve in a single call, so the interrupt flag is only
/// checked before the solve starts
#[derive(Debug, Clone)]
pub struct HighsSolver {
    /// Tolerance used when re-checking points returned at a limit
    tolerance: f64,
}

impl HighsSolver {
    /// Create a new HiGHS solver
    pub fn new() -> Self {
        Self { tolerance: 1e-6 }
    }

    /// Create a HiGHS solver re-checking returned points with a custom tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for HighsSolver {
    fn name(&self) -> &str {
        "highs"
    }

    fn integer_variable_capable(&self) -> bool {
        true
    }

    fn solve(&self, problem: &Problem, limits: &SolveLimits) -> Result<ProblemSolution, SolverError> {
        let monitor = limits.start();
        if let Some(reason) = monitor.exhausted() {
            return Ok(ProblemSolution::without_point(OptimizationStatus::NotSolved, reason));
        }
        if problem.num_variables() == 0 {
            // HiGHS reports empty models as errors, settle them here
            let status = if problem.is_feasible(&[], self.tolerance) {
                OptimizationStatus::Optimal
            } else {
                OptimizationStatus::Infeasible
            };
            let mut solution = ProblemSolution::without_point(status, TerminationReason::Completed);
            if status == OptimizationStatus::Optimal {
                solution.objective_value = Some(0.);
                solution.variable_values = Some(Vec::new());
            }
            return Ok(solution);
        }

        let mut pb = RowProblem::default();
        let coefficients = problem.objective().coefficients(problem.num_variables());
        let cols: Vec<Col> = problem
            .variables()
            .zip(coefficients)
            .map(|(var, coef)| {
                if var.is_integral() {
                    pb.add_integer_column(coef, var.lower_bound..=var.upper_bound)
                } else {
                    pb.add_column(coef, var.lower_bound..=var.upper_bound)
                }
            })
            .collect();
        for constraint in problem.constraints() {
            let terms: Vec<(Col, f64)> = constraint
                .get_terms()
                .iter()
                .map(|t| (cols[t.variable], t.coefficient))
                .collect();
            let (lower, upper) = constraint.get_bounds();
            match (lower.is_finite(), upper.is_finite()) {
                (true, true) => {
                    pb.add_row(lower..=upper, &terms);
                }
                (true, false) => {
                    pb.add_row(lower.., &terms);
                }
                (false, true) => {
                    pb.add_row(..=upper, &terms);
                }
                (false, false) => {}
            }
        }

        let sense = match problem.sense() {
            ObjectiveSense::Maximize => Sense::Maximise,
            ObjectiveSense::Minimize => Sense::Minimise,
        };
        let mut model = pb.optimise(sense);
        model.set_option("output_flag", false);
        model.set_option("time_limit", monitor.remaining().as_secs_f64());
        if let Some(nodes) = limits.node_limit {
            model.set_option("mip_max_nodes", i32::try_from(nodes).unwrap_or(i32::MAX));
        }
        let solved = model
            .try_solve()
            .map_err(|status| SolverError::Internal(format!("HiGHS failed with {:?}", status)))?;

        let model_status = solved.status();
        debug!(?model_status, elapsed = ?monitor.elapsed(), "HiGHS returned");
        let termination = match model_status {
            HighsModelStatus::ReachedTimeLimit => TerminationReason::TimeLimit,
            HighsModelStatus::ReachedIterationLimit => TerminationReason::NodeLimit,
            _ => TerminationReason::Completed,
        };
        let status = match model_status {
            HighsModelStatus::Optimal => OptimizationStatus::Optimal,
            HighsModelStatus::Infeasible => OptimizationStatus::Infeasible,
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                OptimizationStatus::Unbounded
            }
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
                OptimizationStatus::Feasible
            }
            other => {
                warn!(?other, "HiGHS stopped without a usable status");
                OptimizationStatus::NotSolved
            }
        };
        if !status.has_solution() {
            return Ok(ProblemSolution::without_point(status, termination));
        }

        let values: Vec<f64> = solved
            .get_solution()
            .columns()
            .iter()
            .zip(problem.variables())
            .map(|(value, var)| if var.is_integral() { value.round() } else { *value })
            .collect();
        // A point returned at a limit may not be feasible, only keep it if it is
        if !problem.is_feasible(&values, self.tolerance) {
            if status == OptimizationStatus::Optimal {
                return Err(SolverError::Internal(
                    "HiGHS reported an optimal point that violates the constraints".to_string(),
                ));
            }
            return Ok(ProblemSolution::without_point(
                OptimizationStatus::NotSolved,
                termination,
            ));
        }
        Ok(ProblemSolution {
            status,
            objective_value: Some(problem.objective_value(&values)),
            variable_values: Some(values),
            termination,
            nodes_explored: 0,
        })
    }
}
