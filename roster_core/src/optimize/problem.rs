//! Provides struct representing an optimization problem
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense, ObjectiveTerm};
use crate::optimize::variable::{Variable, VariableType};
use indexmap::IndexMap;
use thiserror::Error;

/// An optimization problem
#[derive(Debug, Clone)]
pub struct Problem {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem, keyed by id, in index order
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem, keyed by id
    constraints: IndexMap<String, Constraint>,
    /// Type of problem
    problem_type: ProblemType,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            problem_type: ProblemType::LinearContinuous,
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }
    // endregion Creation Functions

    // region Update Objective Sense
    /// Update the objective sense of the problem
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective.set_sense(sense);
    }
    // endregion Update Objective Sense

    // region Adding Variables
    /// Add a variable to the optimization problem
    ///
    /// # Returns
    /// The index assigned to the variable
    pub fn add_variable(&mut self, mut variable: Variable) -> Result<usize, ProblemError> {
        // Validate that the variable can in fact be added to the problem
        self.validate_variable(&variable)?;
        if variable.variable_type == VariableType::Binary {
            variable.lower_bound = variable.lower_bound.max(0.);
            variable.upper_bound = variable.upper_bound.min(1.);
        }
        let index = self.variables.len();
        variable.index = index;
        if variable.is_integral() {
            self.problem_type = ProblemType::LinearMixedInteger;
        }
        self.variables.insert(variable.id.clone(), variable);
        Ok(index)
    }

    /// Create a new variable and add it to the optimization problem
    pub fn add_new_variable(
        &mut self,
        id: &str,
        name: Option<&str>,
        variable_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<usize, ProblemError> {
        self.add_variable(Variable {
            id: id.to_string(),
            name: name.map(str::to_string),
            variable_type,
            lower_bound,
            upper_bound,
            index: 0,
        })
    }

    /// Create a new binary variable and add it to the optimization problem
    pub fn add_new_binary_variable(&mut self, id: &str) -> Result<usize, ProblemError> {
        self.add_variable(Variable::new_binary(id))
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ProblemError> {
        self.validate_constraint(&constraint)?;
        self.constraints
            .insert(constraint.get_id().to_string(), constraint);
        Ok(())
    }

    /// Create a new equality constraint and add it to the model
    pub fn add_new_equality_constraint(
        &mut self,
        id: &str,
        variables: &[usize],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        self.add_constraint(Constraint::new_equality(id, variables, coefficients, equals))
    }

    /// Create a new equality constraint using variable ids rather than variable indices, and add it to the model
    pub fn add_new_equality_constraint_by_id(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        let variables = self.resolve_ids(variables, ProblemError::NonExistentVariablesInConstraint)?;
        self.add_new_equality_constraint(id, &variables, coefficients, equals)
    }

    /// Create a new inequality constraint and add it to the model
    pub fn add_new_inequality_constraint(
        &mut self,
        id: &str,
        variables: &[usize],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        self.add_constraint(Constraint::new_inequality(
            id,
            variables,
            coefficients,
            lower_bound,
            upper_bound,
        ))
    }

    /// Create a new inequality constraint using variable ids rather than variable indices, and add it to the model
    pub fn add_new_inequality_constraint_by_id(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let variables = self.resolve_ids(variables, ProblemError::NonExistentVariablesInConstraint)?;
        self.add_new_inequality_constraint(id, &variables, coefficients, lower_bound, upper_bound)
    }
    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new term to the objective
    pub fn add_objective_term(&mut self, objective_term: ObjectiveTerm) -> Result<(), ProblemError> {
        if objective_term.variable >= self.variables.len() {
            return Err(ProblemError::NonExistentVariablesInObjective);
        }
        self.objective.add_term(objective_term);
        Ok(())
    }

    /// Add a new linear term to the objective
    pub fn add_new_linear_objective_term(
        &mut self,
        variable: usize,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        self.add_objective_term(ObjectiveTerm::new(variable, coefficient))
    }

    /// Add a new linear term to the objective using the variable id
    pub fn add_new_linear_objective_term_by_id(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        let variable = match self.variables.get_index_of(variable_id) {
            Some(index) => index,
            None => return Err(ProblemError::NonExistentVariablesInObjective),
        };
        self.add_new_linear_objective_term(variable, coefficient)
    }

    /// Remove all terms from the objective
    pub fn remove_all_objective_terms(&mut self) {
        self.objective.remove_all_terms();
    }
    // endregion Adding Objective Terms

    // region Fixing Variables
    /// Fix a variable (by index) to a single value
    pub fn fix_variable(&mut self, index: usize, value: f64) -> Result<(), ProblemError> {
        match self.variables.get_index_mut(index) {
            Some((_, var)) => {
                if value < var.lower_bound || value > var.upper_bound {
                    return Err(ProblemError::InvalidVariableBounds);
                }
                var.lower_bound = value;
                var.upper_bound = value;
                Ok(())
            }
            None => Err(ProblemError::NonExistentVariable),
        }
    }
    // endregion Fixing Variables

    // region Accessors
    /// Objective of the problem
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Sense of the objective
    pub fn sense(&self) -> ObjectiveSense {
        self.objective.sense()
    }

    /// Type of the problem
    pub fn problem_type(&self) -> ProblemType {
        self.problem_type
    }

    /// Variables in index order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Look up a variable by id
    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    /// Look up a variable by index
    pub fn variable_at(&self, index: usize) -> Option<&Variable> {
        self.variables.get_index(index).map(|(_, v)| v)
    }

    /// Constraints in insertion order
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    /// Look up a constraint by id
    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    /// Current number of variables in the problem
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Current number of constraints in the problem
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
    // endregion Accessors

    // region Check Problem
    /*
    Functions for checking properties of the Problem, such as if integer variables are
    present, or if a point is feasible
    */
    /// Whether any variable must take an integral value
    pub fn has_integer_variables(&self) -> bool {
        self.variables.values().any(|v| v.is_integral())
    }

    /// Check whether `values` satisfies every variable bound, integrality requirement,
    /// and constraint, within `tolerance`
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.variables.len() {
            return false;
        }
        let bounds_ok = self.variables.values().zip(values).all(|(var, val)| {
            *val >= var.lower_bound - tolerance
                && *val <= var.upper_bound + tolerance
                && (!var.is_integral() || (val - val.round()).abs() <= tolerance)
        });
        bounds_ok
            && self
                .constraints
                .values()
                .all(|c| c.is_satisfied(values, tolerance))
    }

    /// Value of the objective at the given point
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }
    // endregion Check Problem

    // region Validation Functions
    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        // Check if there is already a variable with this id
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists);
        };
        // Check if the variable bounds are valid
        if variable.lower_bound.is_nan()
            || variable.upper_bound.is_nan()
            || variable.lower_bound > variable.upper_bound
        {
            return Err(ProblemError::InvalidVariableBounds);
        }
        Ok(())
    }

    /// Check that a constraint to be added is valid to add to this Problem
    fn validate_constraint(&self, constraint: &Constraint) -> Result<(), ProblemError> {
        // Check that a constraint with the same id doesn't already exist
        if self.constraints.contains_key(constraint.get_id()) {
            return Err(ProblemError::ConstraintAlreadyExists);
        }
        // Check that for inequality constraints the bounds make sense
        let (lower, upper) = constraint.get_bounds();
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(ProblemError::InvalidConstraintBounds);
        }
        // Check that the variables in this constraint are in the model
        if constraint
            .get_variables()
            .any(|index| index >= self.variables.len())
        {
            return Err(ProblemError::NonExistentVariablesInConstraint);
        }
        Ok(())
    }

    /// Map variable ids to their indices
    fn resolve_ids(&self, ids: &[&str], missing: ProblemError) -> Result<Vec<usize>, ProblemError> {
        ids.iter()
            .map(|id| self.variables.get_index_of(*id).ok_or(missing.clone()))
            .collect()
    }
    // endregion Validation Functions
}

/// Types of optimization problems
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemType {
    /// Problem with linear objectives and constraints, and continuous variables
    LinearContinuous,
    /// Problem with linear objective and constraints, with integer and continuous variables
    LinearMixedInteger,
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add a variable with the same id as an existing variable")]
    VariableIdAlreadyExists,
    /// Error when trying to add variable with invalid bounds
    #[error("Tried to add a variable with lower_bound>upper_bound")]
    InvalidVariableBounds,
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add a constraint with the same id as an existing constraint")]
    ConstraintAlreadyExists,
    /// Error when trying to add a constraint with invalid bounds
    #[error("Tried to add an inequality constraint with lower_bound > upper_bound")]
    InvalidConstraintBounds,
    /// Error when trying to add a constraint that contains variables not in the model
    #[error("Tried to add a constraint with variables not in the model")]
    NonExistentVariablesInConstraint,
    /// Error when trying to add an objective term which includes variables not in the model
    #[error("Tried adding an objective term with variables not in the model")]
    NonExistentVariablesInObjective,
    /// Error when trying to perform an update on a variable that doesn't exist
    #[error("Tried to access a variable that doesn't exist")]
    NonExistentVariable,
}
