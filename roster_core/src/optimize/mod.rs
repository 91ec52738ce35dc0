//! Module for constructing and solving optimization problems

pub mod constraint;
pub mod objective;
pub mod problem;
pub mod solvers;
pub mod variable;

use serde::{Deserialize, Serialize};

/// Struct representing the solution to an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemSolution {
    /// The status of the optimization problem, representing if the optimization was
    /// completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if a feasible point was found, None otherwise
    pub objective_value: Option<f64>,
    /// Values of the variables at the best point found,
    ///
    /// Some(Vec), indexed by variable index, if a feasible point was found, None otherwise
    pub variable_values: Option<Vec<f64>>,
    /// Why the solver stopped
    pub termination: TerminationReason,
    /// Number of nodes (relaxations) the solver explored
    pub nodes_explored: usize,
}

impl ProblemSolution {
    /// Create a solution carrying no point, for statuses without a feasible solution
    pub fn without_point(status: OptimizationStatus, termination: TerminationReason) -> Self {
        ProblemSolution {
            status,
            objective_value: None,
            variable_values: None,
            termination,
            nodes_explored: 0,
        }
    }

    /// Whether a feasible point is attached to this solution
    pub fn has_point(&self) -> bool {
        self.status.has_solution() && self.variable_values.is_some()
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizationStatus {
    /// Problem has been solved to optimality
    Optimal,
    /// A feasible solution has been found, but it was not proven optimal
    /// (the solver hit a time, node, or interrupt limit)
    Feasible,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// The solver stopped without finding any feasible point, or failed numerically
    NotSolved,
}

impl OptimizationStatus {
    /// Whether this status carries at least one feasible solution
    pub fn has_solution(&self) -> bool {
        matches!(self, OptimizationStatus::Optimal | OptimizationStatus::Feasible)
    }
}

impl std::fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OptimizationStatus::Optimal => "optimal",
            OptimizationStatus::Feasible => "feasible",
            OptimizationStatus::Infeasible => "infeasible",
            OptimizationStatus::Unbounded => "unbounded",
            OptimizationStatus::NotSolved => "not solved",
        };
        write!(f, "{}", s)
    }
}

/// Reason a solver returned
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The search ran to completion
    Completed,
    /// The time budget was exhausted
    TimeLimit,
    /// The node (or iteration) budget was exhausted
    NodeLimit,
    /// The caller raised the interrupt flag
    Interrupted,
}

impl TerminationReason {
    /// Whether the search was cut short by a limit
    pub fn is_limit(&self) -> bool {
        !matches!(self, TerminationReason::Completed)
    }
}
