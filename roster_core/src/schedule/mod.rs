//! Roster optimization: builds the integer program of a roster, solves it, and reads
//! back the assignment table
pub mod builder;
pub mod extract;
pub mod objective;

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::configuration::SchedulerConfig;
use crate::optimize::problem::ProblemError;
use crate::optimize::solvers::{solver_for, SolveLimits, SolverError};
use crate::optimize::{OptimizationStatus, TerminationReason};
use crate::roster::model::{RosterModel, ValidationError};
use crate::schedule::builder::ShiftModel;
use crate::schedule::extract::{extract_assignment, AssignmentTable};

/// Outcome of an optimization run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduleResult {
    /// Normalized solver status
    pub status: OptimizationStatus,
    /// Objective value of the returned table, None without a table
    pub objective_value: Option<f64>,
    /// Assignment table, present only for optimal or feasible results
    pub assignment: Option<AssignmentTable>,
    /// Why the solver stopped
    pub termination: TerminationReason,
    /// Branch and bound nodes explored
    pub nodes_explored: usize,
    /// Wall clock time of the solve
    pub elapsed: Duration,
}

impl ScheduleResult {
    /// Whether the time limit ended the solve, in which case a returned table may not be optimal
    pub fn timed_out(&self) -> bool {
        self.termination == TerminationReason::TimeLimit
    }

    /// Whether the returned table is proven optimal
    pub fn is_optimal(&self) -> bool {
        self.status == OptimizationStatus::Optimal
    }
}

/// Errors stopping a run before a status could be produced
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("invalid roster input: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to build the roster model: {0}")]
    Model(#[from] ProblemError),
    #[error(transparent)]
    SolverUnavailable(#[from] SolverError),
}

impl ScheduleError {
    /// Whether the requested backend is not compiled in, as opposed to a backend failure
    pub fn is_solver_unavailable(&self) -> bool {
        matches!(self, ScheduleError::SolverUnavailable(SolverError::Unavailable(_)))
    }
}

/// Find the roster maximizing the weighted number of assignments
///
/// # Parameters
/// - `roster`: Validated roster
/// - `config`: Settings of the run, including the time limit
///
/// # Returns
/// The result of the run. Infeasible rosters are reported through
/// [`ScheduleResult::status`], not as an error.
///
/// # Examples
/// ```rust
/// use std::time::Duration;
/// use chrono::NaiveDate;
/// use indexmap::IndexMap;
/// use roster_core::configuration::SchedulerConfig;
/// use roster_core::optimize::OptimizationStatus;
/// use roster_core::roster::calendar::Day;
/// use roster_core::roster::model::RosterModel;
/// use roster_core::roster::preference::{Availability, PreferenceWeights};
/// use roster_core::roster::staff::Staff;
/// use roster_core::schedule::optimize;
///
/// let day = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
/// let availability = Availability::from_days_off(["A"], &[day], &IndexMap::new());
/// let roster = RosterModel::new(
///     vec![Staff::new("A", true)],
///     vec![Day::new(day)],
///     &PreferenceWeights::new(),
///     &availability,
/// ).unwrap();
/// let result = optimize(&roster, &SchedulerConfig::with_time_limit(Duration::from_secs(5))).unwrap();
/// assert_eq!(result.status, OptimizationStatus::Optimal);
/// assert_eq!(result.assignment.unwrap().get("A", day), Some(true));
/// ```
pub fn optimize(roster: &RosterModel, config: &SchedulerConfig) -> Result<ScheduleResult, ScheduleError> {
    run(roster, config, None)
}

/// Same as [`optimize`], stopping early with the best roster found so far once
/// `interrupt` is set
pub fn optimize_with_interrupt(
    roster: &RosterModel,
    config: &SchedulerConfig,
    interrupt: &AtomicBool,
) -> Result<ScheduleResult, ScheduleError> {
    run(roster, config, Some(interrupt))
}

fn run(
    roster: &RosterModel,
    config: &SchedulerConfig,
    interrupt: Option<&AtomicBool>,
) -> Result<ScheduleResult, ScheduleError> {
    config.validate()?;
    let solver = solver_for(config.backend, config.tolerance)?;
    info!(
        staff = roster.num_staff(),
        days = roster.num_days(),
        solver = solver.name(),
        time_limit = ?config.time_limit,
        "optimizing roster"
    );

    let mut model = ShiftModel::build(roster, config)?;
    model.compose_objective(roster, config)?;
    if model.problem().has_integer_variables() && !solver.integer_variable_capable() {
        return Err(SolverError::UnsupportedProblem {
            solver: solver.name().to_string(),
            problem: "binary assignment variables".to_string(),
        }
        .into());
    }

    let mut limits = SolveLimits::new(config.time_limit).with_node_limit(config.node_limit);
    if let Some(flag) = interrupt {
        limits = limits.with_interrupt(flag);
    }
    let monitor = limits.start();
    let solution = solver.solve(model.problem(), &limits)?;
    let elapsed = monitor.elapsed();

    let assignment = extract_assignment(&model, roster, &solution, config.tolerance);
    if let Some(table) = &assignment {
        if let Err(violation) = table.check(roster, config) {
            error!(%violation, "solver returned a roster breaking a hard rule");
            return Err(SolverError::Internal(violation.to_string()).into());
        }
    }
    let objective_value = assignment.as_ref().and(solution.objective_value);

    if solution.termination.is_limit() {
        warn!(
            termination = ?solution.termination,
            status = %solution.status,
            "roster optimization stopped before proving optimality"
        );
    }
    info!(
        status = %solution.status,
        objective = ?objective_value,
        nodes = solution.nodes_explored,
        ?elapsed,
        "roster optimization finished"
    );
    Ok(ScheduleResult {
        status: solution.status,
        objective_value,
        assignment,
        termination: solution.termination,
        nodes_explored: solution.nodes_explored,
        elapsed,
    })
}
