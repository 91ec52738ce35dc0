//! Solver interfaces, and the backends implementing them
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimize::problem::Problem;
use crate::optimize::{ProblemSolution, TerminationReason};

#[cfg(feature = "highs")]
pub mod highs;
pub mod microlp;

/// Interface shared by all solver backends
pub trait Solver {
    /// Name of the backend, used in logs
    fn name(&self) -> &str;

    /// Whether the backend can handle integer and binary variables
    fn integer_variable_capable(&self) -> bool;

    /// Solve `problem` within `limits`
    ///
    /// Infeasibility, unboundedness, and hitting a limit are reported through the
    /// status of the returned [`ProblemSolution`]. An `Err` means the backend could
    /// not be run at all.
    fn solve(&self, problem: &Problem, limits: &SolveLimits) -> Result<ProblemSolution, SolverError>;
}

/// Budget a single solve must stay within
#[derive(Debug, Clone, Copy)]
pub struct SolveLimits<'a> {
    /// Wall clock budget for the solve
    pub time_limit: Duration,
    /// Maximum number of nodes to explore, unlimited if None
    pub node_limit: Option<usize>,
    /// Flag the caller can raise to stop the solve early
    pub interrupt: Option<&'a AtomicBool>,
}

impl<'a> SolveLimits<'a> {
    /// Create limits with only a time budget
    pub fn new(time_limit: Duration) -> Self {
        SolveLimits {
            time_limit,
            node_limit: None,
            interrupt: None,
        }
    }

    /// Set the node budget
    pub fn with_node_limit(mut self, node_limit: Option<usize>) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Set the interrupt flag
    pub fn with_interrupt(mut self, interrupt: &'a AtomicBool) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Start tracking these limits from now
    pub fn start(&self) -> LimitMonitor<'a> {
        LimitMonitor {
            limits: *self,
            start_time: Instant::now(),
            nodes: 0,
        }
    }
}

/// Tracks elapsed time and explored nodes against a [`SolveLimits`]
#[derive(Debug, Clone)]
pub struct LimitMonitor<'a> {
    limits: SolveLimits<'a>,
    start_time: Instant,
    nodes: usize,
}

impl LimitMonitor<'_> {
    /// Record one explored node
    pub fn on_node(&mut self) {
        self.nodes += 1;
    }

    /// Number of nodes explored so far
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Time since the monitor was started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Time left in the budget
    pub fn remaining(&self) -> Duration {
        self.limits.time_limit.saturating_sub(self.elapsed())
    }

    /// The limit that has been hit, if any
    pub fn exhausted(&self) -> Option<TerminationReason> {
        if self
            .limits
            .interrupt
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Some(TerminationReason::Interrupted);
        }
        if self.limits.node_limit.is_some_and(|limit| self.nodes >= limit) {
            return Some(TerminationReason::NodeLimit);
        }
        if self.elapsed() >= self.limits.time_limit {
            return Some(TerminationReason::TimeLimit);
        }
        None
    }
}

/// Enum used to specify the solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SolverBackend {
    /// Branch and bound over microlp relaxations, always available
    #[default]
    Microlp,
    /// The HiGHS MILP solver, requires the highs feature to be enabled
    Highs,
}

/// Get the solver implementing a backend
///
/// # Parameters
/// - `backend`: Backend to use
/// - `tolerance`: Integrality and feasibility tolerance handed to the backend
///
/// # Returns
/// `SolverError::Unavailable` if the backend was not compiled into this build
pub fn solver_for(backend: SolverBackend, tolerance: f64) -> Result<Box<dyn Solver>, SolverError> {
    match backend {
        SolverBackend::Microlp => Ok(Box::new(self::microlp::MicrolpSolver::with_tolerance(
            tolerance,
        ))),
        SolverBackend::Highs => highs_solver(tolerance),
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "highs")] {
        fn highs_solver(tolerance: f64) -> Result<Box<dyn Solver>, SolverError> {
            Ok(Box::new(self::highs::HighsSolver::with_tolerance(tolerance)))
        }
    } else {
        fn highs_solver(_tolerance: f64) -> Result<Box<dyn Solver>, SolverError> {
            Err(SolverError::Unavailable(
                "HiGHS backend requested but the highs feature is not enabled".to_string(),
            ))
        }
    }
}

/// Errors raised when a solver backend can't be run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The backend is not present in this build, or can't be started
    #[error("solver unavailable: {0}")]
    Unavailable(String),
    /// The backend can't handle the problem type
    #[error("solver {solver} does not support {problem}")]
    UnsupportedProblem {
        /// Name of the backend
        solver: String,
        /// Description of the unsupported feature
        problem: String,
    },
    /// The backend failed while solving
    #[error("solver failed: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_exhausted() {
        let limits = SolveLimits::new(Duration::ZERO);
        assert_eq!(limits.start().exhausted(), Some(TerminationReason::TimeLimit));
    }

    #[test]
    fn node_and_interrupt_limits() {
        let flag = AtomicBool::new(false);
        let limits = SolveLimits::new(Duration::from_secs(60))
            .with_node_limit(Some(2))
            .with_interrupt(&flag);
        let mut monitor = limits.start();
        assert_eq!(monitor.exhausted(), None);
        monitor.on_node();
        monitor.on_node();
        assert_eq!(monitor.exhausted(), Some(TerminationReason::NodeLimit));
        flag.store(true, Ordering::Relaxed);
        assert_eq!(monitor.exhausted(), Some(TerminationReason::Interrupted));
    }

    #[test]
    fn backend_lookup() {
        assert_eq!(solver_for(SolverBackend::Microlp, 1e-6).unwrap().name(), "microlp");
        #[cfg(not(feature = "highs"))]
        assert!(matches!(
            solver_for(SolverBackend::Highs, 1e-6),
            Err(SolverError::Unavailable(_))
        ));
    }

    #[test]
    fn tolerance_reaches_the_backend() {
        // x <= 0.85 relaxes to 0.85, integral only under a loose tolerance
        let mut problem = Problem::new_maximization();
        let x = problem.add_new_binary_variable("x").unwrap();
        problem
            .add_new_inequality_constraint("cap", &[x], &[1.], f64::NEG_INFINITY, 0.85)
            .unwrap();
        problem.add_new_linear_objective_term(x, 1.).unwrap();
        let limits = SolveLimits::new(Duration::from_secs(30));

        let strict = solver_for(SolverBackend::Microlp, 1e-6)
            .unwrap()
            .solve(&problem, &limits)
            .unwrap();
        assert_eq!(strict.objective_value, Some(0.));
        let loose = solver_for(SolverBackend::Microlp, 0.2)
            .unwrap()
            .solve(&problem, &limits)
            .unwrap();
        assert_eq!(loose.variable_values, Some(vec![1.]));
    }
}
