//! Provides struct for representing an optimization problem's objective

/// Represents the Objective of an optimization problem
///
/// Only linear terms are supported, the objective is the sum of
/// `coefficient * variable` over all of its terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    pub(crate) sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    /// Create a new empty maximization objective
    pub fn new_maximize() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Sense of the objective
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Change the sense of the objective
    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    /// Terms currently in the objective
    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Add a new term to the objective
    pub fn add_term(&mut self, term: ObjectiveTerm) {
        self.terms.push(term);
    }

    /// Add a new Linear term to the objective
    pub fn add_linear_term(&mut self, variable: usize, coefficient: f64) {
        self.terms.push(ObjectiveTerm::new(variable, coefficient));
    }

    /// Add a series of linear terms to the objective function
    pub fn add_linear_terms(&mut self, variables: &[usize], coefficients: &[f64]) {
        self.terms.extend(
            variables
                .iter()
                .zip(coefficients)
                .map(|(var, coef)| ObjectiveTerm::new(*var, *coef)),
        );
    }

    /// Remove all terms from the objective
    pub fn remove_all_terms(&mut self) {
        self.terms.clear();
    }

    /// Collapse the terms into a dense vector of coefficients, one per variable
    ///
    /// Repeated terms on the same variable are summed.
    pub fn coefficients(&self, num_variables: usize) -> Vec<f64> {
        let mut coefficients = vec![0.; num_variables];
        for term in &self.terms {
            if let Some(c) = coefficients.get_mut(term.variable) {
                *c += term.coefficient;
            }
        }
        coefficients
    }

    /// Value of the objective for the given variable values
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(t.variable).copied().unwrap_or(0.))
            .sum()
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

impl ObjectiveSense {
    /// Whether `candidate` is strictly better than `incumbent` by more than `tolerance`
    pub fn improves(&self, candidate: f64, incumbent: f64, tolerance: f64) -> bool {
        match self {
            ObjectiveSense::Maximize => candidate > incumbent + tolerance,
            ObjectiveSense::Minimize => candidate < incumbent - tolerance,
        }
    }
}

/// A linear term in the objective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveTerm {
    /// Index of the variable in the problem
    pub variable: usize,
    /// Coefficient for the term
    pub coefficient: f64,
}

impl ObjectiveTerm {
    /// Create a new linear objective term
    pub fn new(variable: usize, coefficient: f64) -> Self {
        ObjectiveTerm {
            variable,
            coefficient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_coefficients() {
        let mut objective = Objective::new_maximize();
        objective.add_linear_terms(&[0, 2], &[0.5, 1.5]);
        objective.add_linear_term(0, 0.25);
        assert_eq!(objective.coefficients(3), vec![0.75, 0., 1.5]);
        assert_eq!(objective.evaluate(&[1., 1., 0.]), 0.75);
    }

    #[test]
    fn sense_improves() {
        assert!(ObjectiveSense::Maximize.improves(2., 1., 1e-9));
        assert!(!ObjectiveSense::Maximize.improves(1., 1., 1e-9));
        assert!(ObjectiveSense::Minimize.improves(1., 2., 1e-9));
        assert!(!ObjectiveSense::Minimize.improves(2., 1., 1e-9));
    }
}
