//! This module provides the Day struct, a calendar date staff can be assigned to
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A calendar day of the roster
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    /// The date, must be unique within a roster
    pub date: NaiveDate,
    /// Coverage required on this day, overriding the global coverage range
    #[serde(default)]
    pub coverage: Option<CoverageRange>,
}

impl Day {
    /// Create a new day using the global coverage range
    pub fn new(date: NaiveDate) -> Self {
        Day {
            date,
            coverage: None,
        }
    }

    /// Set a coverage range for this day only
    pub fn with_coverage(mut self, coverage: CoverageRange) -> Self {
        self.coverage = Some(coverage);
        self
    }
}

impl From<NaiveDate> for Day {
    fn from(date: NaiveDate) -> Self {
        Day::new(date)
    }
}

impl Display for Day {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.date)
    }
}

/// Allowed number of staff scheduled on a day
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRange {
    /// Fewest staff on the day
    pub min: u32,
    /// Most staff on the day, no cap if None
    #[serde(default)]
    pub max: Option<u32>,
}

impl CoverageRange {
    /// Create a new coverage range
    pub fn new(min: u32, max: Option<u32>) -> Self {
        CoverageRange { min, max }
    }

    /// Exactly `count` staff
    pub fn exactly(count: u32) -> Self {
        CoverageRange::new(count, Some(count))
    }

    /// At least `count` staff
    pub fn at_least(count: u32) -> Self {
        CoverageRange::new(count, None)
    }

    /// Whether min <= max
    pub fn is_valid(&self) -> bool {
        self.max.map_or(true, |max| self.min <= max)
    }

    /// Whether `count` staff satisfies the range
    pub fn contains(&self, count: u32) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl Default for CoverageRange {
    fn default() -> Self {
        CoverageRange::at_least(1)
    }
}
