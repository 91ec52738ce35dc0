//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A decision variable in an optimization problem
///
/// Variables are created with a [`VariableBuilder`], and receive their dense index
/// once they are added to a [`Problem`](crate::optimize::problem::Problem).
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Variable {
    /// Used to identify the variable, must be unique within a problem
    pub id: String,
    /// Human-readable variable name
    #[builder(default = "None", setter(into, strip_option))]
    pub name: Option<String>,
    /// Type of the variable, see [`VariableType`]
    #[builder(default = "VariableType::Continuous")]
    pub variable_type: VariableType,
    /// Lowest value the variable can take
    #[builder(default = "0.")]
    pub lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "f64::INFINITY")]
    pub upper_bound: f64,
    /// Position of the variable in the problem
    #[builder(setter(skip), default = "0")]
    pub(crate) index: usize,
}

impl Variable {
    /// Create a new binary variable, bounded by 0 and 1
    pub fn new_binary(id: &str) -> Self {
        Variable {
            id: id.to_string(),
            name: None,
            variable_type: VariableType::Binary,
            lower_bound: 0.,
            upper_bound: 1.,
            index: 0,
        }
    }

    /// Position of the variable in the problem it was added to
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the variable must take an integral value
    pub fn is_integral(&self) -> bool {
        !matches!(self.variable_type, VariableType::Continuous)
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}", name, self.variable_type),
            None => write!(f, "{}:{}", self.id, self.variable_type),
        }
    }
}

/// Represents the type of variable in an optimization problem
///
/// # Notes:
/// Binary variables are integer variables whose bounds are clamped to [0, 1]
#[derive(Debug, PartialEq, Clone, Copy, Hash, Eq)]
pub enum VariableType {
    /// Continuous variable
    Continuous,
    /// Integer variable
    Integer,
    /// Binary Variable
    Binary,
}

impl Display for VariableType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::Continuous => write!(f, "CONTINUOUS"),
            VariableType::Integer => write!(f, "INTEGER"),
            VariableType::Binary => write!(f, "BINARY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let x = VariableBuilder::default().id("x").build().unwrap();
        assert_eq!(x.variable_type, VariableType::Continuous);
        assert_eq!(x.lower_bound, 0.);
        assert!(x.upper_bound.is_infinite());
        assert!(!x.is_integral());
    }

    #[test]
    fn display() {
        let x = VariableBuilder::default()
            .id("x")
            .name("shift")
            .variable_type(VariableType::Integer)
            .build()
            .unwrap();
        assert_eq!(format!("{}", x), "shift:INTEGER");
        let y = Variable::new_binary("y");
        assert_eq!(format!("{}", y), "y:BINARY");
        assert!(y.is_integral());
    }
}
