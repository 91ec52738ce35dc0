//! Implements a solver interface on top of microlp
//!
//! microlp solves the continuous relaxation at each node, integrality is enforced by a
//! depth first branch and bound driven from here. Limits are checked before every node,
//! and the best integral point found so far is returned when one is hit.
use ::microlp::{ComparisonOp, OptimizationDirection};
use tracing::{debug, warn};

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{SolveLimits, Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution, TerminationReason};

/// Branch and bound solver using microlp for the node relaxations
#[derive(Debug, Clone)]
pub struct MicrolpSolver {
    /// Distance from an integer below which a value counts as integral
    tolerance: f64,
}

impl MicrolpSolver {
    /// Create a new solver with the default tolerance of 1e-6
    pub fn new() -> Self {
        Self { tolerance: 1e-6 }
    }

    /// Create a new solver with a custom integrality tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for MicrolpSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// A node of the search tree, the variable bounds in force at that node
#[derive(Debug, Clone)]
struct Node {
    lower: Vec<f64>,
    upper: Vec<f64>,
    depth: usize,
}

/// Outcome of solving a node relaxation
enum Relaxation {
    Optimal { values: Vec<f64>, objective: f64 },
    Infeasible,
    Unbounded,
}

impl Solver for MicrolpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn integer_variable_capable(&self) -> bool {
        true
    }

    fn solve(&self, problem: &Problem, limits: &SolveLimits) -> Result<ProblemSolution, SolverError> {
        let mut monitor = limits.start();
        let sense = problem.sense();
        let integral: Vec<bool> = problem.variables().map(|v| v.is_integral()).collect();

        // Integer variables get their bounds rounded inwards up front
        let root = Node {
            lower: problem
                .variables()
                .map(|v| {
                    if v.is_integral() {
                        (v.lower_bound - self.tolerance).ceil()
                    } else {
                        v.lower_bound
                    }
                })
                .collect(),
            upper: problem
                .variables()
                .map(|v| {
                    if v.is_integral() {
                        (v.upper_bound + self.tolerance).floor()
                    } else {
                        v.upper_bound
                    }
                })
                .collect(),
            depth: 0,
        };
        if root.lower.iter().zip(&root.upper).any(|(l, u)| l > u) {
            debug!("integer variable with no integral value in its bounds");
            return Ok(ProblemSolution::without_point(
                OptimizationStatus::Infeasible,
                TerminationReason::Completed,
            ));
        }

        let mut stack = vec![root];
        let mut incumbent: Option<(Vec<f64>, f64)> = None;
        let mut halted = None;

        while let Some(node) = stack.pop() {
            if let Some(reason) = monitor.exhausted() {
                halted = Some(reason);
                break;
            }
            monitor.on_node();

            let (values, bound) = match self.solve_relaxation(problem, &node)? {
                Relaxation::Infeasible => continue,
                Relaxation::Unbounded => {
                    debug!(depth = node.depth, "relaxation is unbounded");
                    let mut solution = ProblemSolution::without_point(
                        OptimizationStatus::Unbounded,
                        TerminationReason::Completed,
                    );
                    solution.nodes_explored = monitor.nodes();
                    return Ok(solution);
                }
                Relaxation::Optimal { values, objective } => (values, objective),
            };

            // Prune nodes which can't beat the incumbent
            if let Some((_, best)) = &incumbent {
                if !sense.improves(bound, *best, self.tolerance) {
                    continue;
                }
            }

            match self.most_fractional(&values, &integral) {
                None => {
                    let point: Vec<f64> = values
                        .iter()
                        .zip(&integral)
                        .map(|(v, is_int)| if *is_int { v.round() } else { *v })
                        .collect();
                    let objective = problem.objective_value(&point);
                    debug!(
                        depth = node.depth,
                        objective,
                        nodes = monitor.nodes(),
                        "new incumbent"
                    );
                    incumbent = Some((point, objective));
                }
                Some(index) => {
                    let value = values[index];
                    let floor = value.floor();
                    let mut down = node.clone();
                    down.upper[index] = floor;
                    down.depth += 1;
                    let mut up = node;
                    up.lower[index] = floor + 1.;
                    up.depth += 1;
                    // Dive towards the nearer integer first, it is popped first
                    if value - floor >= 0.5 {
                        stack.push(down);
                        stack.push(up);
                    } else {
                        stack.push(up);
                        stack.push(down);
                    }
                }
            }
        }

        let nodes_explored = monitor.nodes();
        let (status, termination) = match (halted, incumbent.is_some()) {
            (Some(reason), true) => (OptimizationStatus::Feasible, reason),
            (Some(reason), false) => (OptimizationStatus::NotSolved, reason),
            (None, true) => (OptimizationStatus::Optimal, TerminationReason::Completed),
            (None, false) => (OptimizationStatus::Infeasible, TerminationReason::Completed),
        };
        if let Some(reason) = halted {
            warn!(
                ?reason,
                nodes_explored,
                elapsed = ?monitor.elapsed(),
                has_incumbent = incumbent.is_some(),
                "branch and bound stopped early"
            );
        }
        let (variable_values, objective_value) = match incumbent {
            Some((values, objective)) => (Some(values), Some(objective)),
            None => (None, None),
        };
        Ok(ProblemSolution {
            status,
            objective_value,
            variable_values,
            termination,
            nodes_explored,
        })
    }
}

impl MicrolpSolver {
    /// Solve the continuous relaxation of `problem` under the bounds of `node`
    fn solve_relaxation(&self, problem: &Problem, node: &Node) -> Result<Relaxation, SolverError> {
        // microlp has no use for constraints without terms, check them directly
        if problem
            .constraints()
            .filter(|c| c.get_terms().is_empty())
            .any(|c| !c.is_satisfied(&[], self.tolerance))
        {
            return Ok(Relaxation::Infeasible);
        }
        if problem.num_variables() == 0 {
            return Ok(Relaxation::Optimal {
                values: Vec::new(),
                objective: 0.,
            });
        }

        let direction = match problem.sense() {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let mut lp = ::microlp::Problem::new(direction);
        let vars: Vec<::microlp::Variable> = problem
            .objective()
            .coefficients(problem.num_variables())
            .into_iter()
            .zip(node.lower.iter().zip(&node.upper))
            .map(|(coef, (lower, upper))| lp.add_var(coef, (*lower, *upper)))
            .collect();

        for constraint in problem.constraints() {
            let terms = constraint.get_terms();
            if terms.is_empty() {
                continue;
            }
            let expr: Vec<(::microlp::Variable, f64)> = terms
                .iter()
                .map(|t| (vars[t.variable], t.coefficient))
                .collect();
            let (lower, upper) = constraint.get_bounds();
            if lower == upper {
                lp.add_constraint(expr, ComparisonOp::Eq, lower);
            } else {
                if lower.is_finite() {
                    lp.add_constraint(expr.clone(), ComparisonOp::Ge, lower);
                }
                if upper.is_finite() {
                    lp.add_constraint(expr, ComparisonOp::Le, upper);
                }
            }
        }

        match lp.solve() {
            Ok(solution) => Ok(Relaxation::Optimal {
                values: vars.iter().map(|v| solution[*v]).collect(),
                objective: solution.objective(),
            }),
            Err(::microlp::Error::Infeasible) => Ok(Relaxation::Infeasible),
            Err(::microlp::Error::Unbounded) => Ok(Relaxation::Unbounded),
            Err(err) => Err(SolverError::Internal(err.to_string())),
        }
    }

    /// Index of the integer variable whose value is furthest from integral, if any
    fn most_fractional(&self, values: &[f64], integral: &[bool]) -> Option<usize> {
        values
            .iter()
            .zip(integral)
            .enumerate()
            .filter(|(_, (_, is_int))| **is_int)
            .map(|(i, (v, _))| (i, (v - v.round()).abs()))
            .filter(|(_, frac)| *frac > self.tolerance)
            // Ties go to the lowest index, keeping the search deterministic
            .fold(None, |best: Option<(usize, f64)>, (i, frac)| match best {
                Some((_, best_frac)) if best_frac >= frac => best,
                _ => Some((i, frac)),
            })
            .map(|(i, _)| i)
    }
}
