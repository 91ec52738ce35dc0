//! This module provides the Staff struct, representing a member of staff who can be
//! assigned to days
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Structure representing a member of staff
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Staff {
    /// Used to identify the staff member (must be unique)
    pub id: String,
    /// Human readable name
    #[builder(default = "None", setter(into, strip_option))]
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the staff member can supervise a shift
    #[builder(default = "false")]
    #[serde(default)]
    pub is_responsible: bool,
    /// Personal bounds on the number of assigned days, overriding the global bounds
    #[builder(default = "None", setter(into, strip_option))]
    #[serde(default)]
    pub load: Option<LoadBounds>,
}

impl Staff {
    /// Create a new staff member without personal load bounds
    pub fn new(id: &str, is_responsible: bool) -> Staff {
        Staff {
            id: id.to_string(),
            name: None,
            is_responsible,
            load: None,
        }
    }
}

impl Display for Staff {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Bounds on the total number of days a staff member is assigned over the period
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBounds {
    /// Fewest days the staff member must work, no floor if None
    #[serde(default)]
    pub min: Option<u32>,
    /// Most days the staff member may work, no cap if None
    #[serde(default)]
    pub max: Option<u32>,
}

impl LoadBounds {
    /// Create new load bounds
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        LoadBounds { min, max }
    }

    /// Bounds which place no restriction on the load
    pub fn unbounded() -> Self {
        LoadBounds::default()
    }

    /// Only cap the load
    pub fn at_most(max: u32) -> Self {
        LoadBounds::new(None, Some(max))
    }

    /// Whether these bounds restrict anything
    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Whether min <= max, when both are present
    pub fn is_valid(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    /// Whether `load` lies within the bounds
    pub fn contains(&self, load: u32) -> bool {
        self.min.map_or(true, |min| load >= min) && self.max.map_or(true, |max| load <= max)
    }
}
