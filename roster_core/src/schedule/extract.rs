//! Turns solver values into an assignment table, and checks tables against a roster
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::configuration::SchedulerConfig;
use crate::optimize::ProblemSolution;
use crate::roster::model::RosterModel;
use crate::schedule::builder::ShiftModel;

/// Staff × day table of assignments, rows and columns in roster order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTable {
    /// Staff ids, one per row
    staff: Vec<String>,
    /// Whether each row's staff member is responsible
    responsible: Vec<bool>,
    /// Dates, one per column
    days: Vec<NaiveDate>,
    /// Assignments as [row][column]
    cells: Vec<Vec<bool>>,
}

impl AssignmentTable {
    /// Create a table with nobody assigned
    pub fn empty(roster: &RosterModel) -> Self {
        AssignmentTable {
            staff: roster.staff().map(|s| s.id.clone()).collect(),
            responsible: roster.staff().map(|s| s.is_responsible).collect(),
            days: roster.days().map(|d| d.date).collect(),
            cells: vec![vec![false; roster.num_days()]; roster.num_staff()],
        }
    }

    /// Staff ids in row order
    pub fn staff_ids(&self) -> &[String] {
        &self.staff
    }

    /// Dates in column order
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Whether `staff_id` works on `day`, None if either is not in the table
    pub fn get(&self, staff_id: &str, day: NaiveDate) -> Option<bool> {
        let s = self.row_of(staff_id)?;
        let d = self.column_of(day)?;
        Some(self.cells[s][d])
    }

    /// Cell at (row, column)
    ///
    /// # Panics
    /// If either index is out of range
    pub fn cell(&self, staff_index: usize, day_index: usize) -> bool {
        self.cells[staff_index][day_index]
    }

    pub(crate) fn set(&mut self, staff_index: usize, day_index: usize, assigned: bool) {
        self.cells[staff_index][day_index] = assigned;
    }

    /// Assignments of one staff member as 0/1 values, in column order
    pub fn row(&self, staff_id: &str) -> Option<Vec<u8>> {
        let s = self.row_of(staff_id)?;
        Some(self.cells[s].iter().map(|c| u8::from(*c)).collect())
    }

    /// Number of days a staff member works
    pub fn staff_total(&self, staff_id: &str) -> Option<u32> {
        let s = self.row_of(staff_id)?;
        Some(self.row_total(s))
    }

    /// Number of staff working on a day
    pub fn day_total(&self, day: NaiveDate) -> Option<u32> {
        let d = self.column_of(day)?;
        Some(self.column_count(d, |_| true))
    }

    /// Number of responsible staff working on a day
    pub fn responsible_on(&self, day: NaiveDate) -> Option<u32> {
        let d = self.column_of(day)?;
        Some(self.column_count(d, |s| self.responsible[s]))
    }

    /// Total number of assignments in the table
    pub fn total_assignments(&self) -> u32 {
        (0..self.staff.len()).map(|s| self.row_total(s)).sum()
    }

    /// Per staff and per day counts of the table
    pub fn summary(&self) -> RosterSummary {
        let staff_totals = self
            .staff
            .iter()
            .enumerate()
            .map(|(s, id)| (id.clone(), self.row_total(s)))
            .collect();
        let day_counts = self
            .days
            .iter()
            .enumerate()
            .map(|(d, day)| {
                let responsible = self.column_count(d, |s| self.responsible[s]);
                let total = self.column_count(d, |_| true);
                (
                    *day,
                    DayCount {
                        responsible,
                        non_responsible: total - responsible,
                    },
                )
            })
            .collect();
        RosterSummary {
            staff_totals,
            day_counts,
        }
    }

    /// Check the table against the hard rules of a roster
    ///
    /// # Returns
    /// The first violated rule, if any. A table whose rows or columns differ from the
    /// roster's staff and days is reported as [`Violation::Mismatch`].
    pub fn check(&self, roster: &RosterModel, config: &SchedulerConfig) -> Result<(), Violation> {
        self.check_shape(roster)?;
        for (s, staff) in roster.staff().enumerate() {
            for (d, day) in roster.days().enumerate() {
                if self.cells[s][d] && !roster.is_available(s, d) {
                    return Err(Violation::DayOff {
                        staff: staff.id.clone(),
                        day: day.date,
                    });
                }
            }
            let load = self.row_total(s);
            if !roster.load_for(s, config.load).contains(load) {
                return Err(Violation::Load {
                    staff: staff.id.clone(),
                    load,
                });
            }
        }
        for (d, day) in roster.days().enumerate() {
            let staffed = self.column_count(d, |_| true);
            if !roster.coverage_for(d, config.coverage).contains(staffed) {
                return Err(Violation::Coverage {
                    day: day.date,
                    staffed,
                });
            }
            let responsible = self.column_count(d, |s| self.responsible[s]);
            if responsible < config.responsible_minimum {
                return Err(Violation::Responsibility {
                    day: day.date,
                    responsible,
                });
            }
        }
        Ok(())
    }

    fn check_shape(&self, roster: &RosterModel) -> Result<(), Violation> {
        if !self.staff.iter().eq(roster.staff().map(|s| &s.id)) {
            return Err(Violation::Mismatch("staff differ".to_string()));
        }
        if !self.days.iter().eq(roster.days().map(|d| &d.date)) {
            return Err(Violation::Mismatch("days differ".to_string()));
        }
        if self.responsible.len() != self.staff.len() || self.cells.len() != self.staff.len() {
            return Err(Violation::Mismatch("row count differs from staff count".to_string()));
        }
        if let Some(s) = self.cells.iter().position(|row| row.len() != self.days.len()) {
            return Err(Violation::Mismatch(format!(
                "row of {} has {} cells for {} days",
                self.staff[s],
                self.cells[s].len(),
                self.days.len()
            )));
        }
        Ok(())
    }

    fn row_of(&self, staff_id: &str) -> Option<usize> {
        self.staff.iter().position(|id| id == staff_id)
    }

    fn column_of(&self, day: NaiveDate) -> Option<usize> {
        self.days.iter().position(|d| *d == day)
    }

    fn row_total(&self, staff_index: usize) -> u32 {
        self.cells[staff_index].iter().filter(|c| **c).count() as u32
    }

    fn column_count(&self, day_index: usize, include: impl Fn(usize) -> bool) -> u32 {
        self.cells
            .iter()
            .enumerate()
            .filter(|(s, row)| row[day_index] && include(*s))
            .count() as u32
    }
}

impl Display for AssignmentTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "staff")?;
        for day in &self.days {
            write!(f, "\t{}", day)?;
        }
        for (id, row) in self.staff.iter().zip(&self.cells) {
            write!(f, "\n{}", id)?;
            for cell in row {
                write!(f, "\t{}", u8::from(*cell))?;
            }
        }
        Ok(())
    }
}

/// Counts derived from an [`AssignmentTable`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSummary {
    /// Days worked by each staff member
    pub staff_totals: IndexMap<String, u32>,
    /// Staff working on each day
    pub day_counts: IndexMap<NaiveDate, DayCount>,
}

/// Staff working on one day, split by responsibility
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub responsible: u32,
    pub non_responsible: u32,
}

impl DayCount {
    /// All staff working on the day
    pub fn total(&self) -> u32 {
        self.responsible + self.non_responsible
    }
}

/// Hard rule broken by an assignment table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("staff {staff} is assigned on requested day off {day}")]
    DayOff { staff: String, day: NaiveDate },
    #[error("{staffed} staff assigned on {day}, outside of the coverage range")]
    Coverage { day: NaiveDate, staffed: u32 },
    #[error("only {responsible} responsible staff assigned on {day}")]
    Responsibility { day: NaiveDate, responsible: u32 },
    #[error("staff {staff} works {load} days, outside of the load bounds")]
    Load { staff: String, load: u32 },
    #[error("table does not match the roster: {0}")]
    Mismatch(String),
}

/// Read the assignment table out of a solution
///
/// # Parameters
/// - `model`: The model the solution belongs to
/// - `roster`: The roster the model was built from
/// - `solution`: Solver result
/// - `tolerance`: Largest distance from 0 or 1 accepted without a warning
///
/// # Returns
/// None unless the status is optimal or feasible and the solution carries values for
/// every assignment variable
pub fn extract_assignment(
    model: &ShiftModel,
    roster: &RosterModel,
    solution: &ProblemSolution,
    tolerance: f64,
) -> Option<AssignmentTable> {
    if !solution.has_point() {
        return None;
    }
    let values = solution.variable_values.as_ref()?;
    let mut table = AssignmentTable::empty(roster);
    for s in 0..roster.num_staff() {
        for d in 0..roster.num_days() {
            let value = *values.get(model.assignment_variable(s, d)?)?;
            let assigned = value.round() >= 1.;
            let deviation = (value - value.round()).abs();
            if deviation > tolerance {
                warn!(staff = s, day = d, value, "assignment value is not integral");
            }
            table.set(s, d, assigned);
        }
    }
    Some(table)
}
