//! Row level representation of the roster input tables and of the assignment table
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::roster::calendar::{CoverageRange, Day};
use crate::roster::model::{RosterModel, ValidationError};
use crate::roster::preference::{Availability, PreferenceWeights};
use crate::roster::staff::{LoadBounds, Staff};
use crate::schedule::extract::AssignmentTable;

// region Input rows
/// One row of the staff table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffRow {
    pub staff_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub is_responsible: bool,
    /// Fewest days this staff member should work
    #[serde(default)]
    pub min_shifts: Option<u32>,
    /// Most days this staff member may work
    #[serde(default)]
    pub max_shifts: Option<u32>,
}

/// One row of the calendar table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub date: NaiveDate,
    /// Fewest staff needed on this date, the global range applies when both bounds are absent
    #[serde(default)]
    pub min_staff: Option<u32>,
    /// Most staff allowed on this date
    #[serde(default)]
    pub max_staff: Option<u32>,
}

/// One row of the preference weight table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightRow {
    pub staff_id: String,
    pub weight: f64,
}

/// One row of the availability table, `available` is 1 when the staff member can work
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub staff_id: String,
    pub date: NaiveDate,
    pub available: u8,
}
// endregion Input rows

/// All input tables of a run
///
/// Availability comes either as complete rows, or as day off requests. When
/// `days_off` is present every pair not requested off is available, and explicit
/// rows override the result. Without `days_off` the rows must cover every pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterTables {
    pub staff: Vec<StaffRow>,
    pub calendar: Vec<CalendarRow>,
    #[serde(default)]
    pub weights: Vec<WeightRow>,
    #[serde(default)]
    pub availability: Vec<AvailabilityRow>,
    #[serde(default)]
    pub days_off: Option<IndexMap<String, Vec<NaiveDate>>>,
}

impl RosterTables {
    /// Validate the tables and turn them into a [`RosterModel`]
    ///
    /// # Returns
    /// The model, or the first [`ValidationError`] found. Repeated weight or
    /// availability rows and flags other than 0 or 1 are rejected here, everything else
    /// is checked by [`RosterModel::new`].
    pub fn to_model(&self) -> Result<RosterModel, ValidationError> {
        let staff = self.staff.iter().map(Staff::from).collect();
        let days = self.calendar.iter().map(Day::from).collect();

        let mut weights = PreferenceWeights::new();
        for row in &self.weights {
            if weights.get(&row.staff_id).is_some() {
                return Err(ValidationError::DuplicateWeight(row.staff_id.clone()));
            }
            weights.set(&row.staff_id, row.weight);
        }

        let mut availability = match &self.days_off {
            Some(days_off) => {
                let dates: Vec<NaiveDate> = self.calendar.iter().map(|c| c.date).collect();
                Availability::from_days_off(
                    self.staff.iter().map(|s| s.staff_id.as_str()),
                    &dates,
                    days_off,
                )
            }
            None => Availability::new(),
        };
        let mut seen = IndexMap::new();
        for row in &self.availability {
            let available = match row.available {
                0 => false,
                1 => true,
                flag => {
                    return Err(ValidationError::InvalidAvailabilityFlag {
                        staff: row.staff_id.clone(),
                        day: row.date,
                        flag,
                    })
                }
            };
            if seen.insert((row.staff_id.as_str(), row.date), ()).is_some() {
                return Err(ValidationError::DuplicateAvailability {
                    staff: row.staff_id.clone(),
                    day: row.date,
                });
            }
            availability.set(&row.staff_id, row.date, available);
        }

        RosterModel::new(staff, days, &weights, &availability)
    }
}

impl From<&StaffRow> for Staff {
    fn from(row: &StaffRow) -> Self {
        let load = LoadBounds::new(row.min_shifts, row.max_shifts);
        Staff {
            id: row.staff_id.clone(),
            name: row.name.clone(),
            is_responsible: row.is_responsible,
            load: load.is_bounded().then_some(load),
        }
    }
}

impl From<&CalendarRow> for Day {
    fn from(row: &CalendarRow) -> Self {
        let day = Day::new(row.date);
        match (row.min_staff, row.max_staff) {
            (None, None) => day,
            (min, max) => day.with_coverage(CoverageRange::new(min.unwrap_or(0), max)),
        }
    }
}

// region Output rows
/// One row of the assignment table, `shifts` holds a 0/1 value per date
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub staff_id: String,
    pub shifts: Vec<u8>,
}

impl AssignmentTable {
    /// Rows of the table in staff order, the dates of the columns are [`AssignmentTable::days`]
    pub fn rows(&self) -> Vec<AssignmentRow> {
        self.staff_ids()
            .iter()
            .enumerate()
            .map(|(s, id)| AssignmentRow {
                staff_id: id.clone(),
                shifts: (0..self.days().len())
                    .map(|d| u8::from(self.cell(s, d)))
                    .collect(),
            })
            .collect()
    }
}
// endregion Output rows

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn tables() -> RosterTables {
        RosterTables {
            staff: vec![
                StaffRow {
                    staff_id: "A".to_string(),
                    name: Some("Aiko".to_string()),
                    is_responsible: true,
                    min_shifts: None,
                    max_shifts: Some(1),
                },
                StaffRow {
                    staff_id: "B".to_string(),
                    name: None,
                    is_responsible: false,
                    min_shifts: None,
                    max_shifts: None,
                },
            ],
            calendar: vec![
                CalendarRow {
                    date: date(1),
                    min_staff: Some(2),
                    max_staff: Some(2),
                },
                CalendarRow {
                    date: date(2),
                    min_staff: None,
                    max_staff: None,
                },
            ],
            weights: vec![WeightRow {
                staff_id: "A".to_string(),
                weight: 0.7,
            }],
            availability: vec![],
            days_off: Some(IndexMap::from([("B".to_string(), vec![date(2)])])),
        }
    }

    #[test]
    fn tables_to_model() {
        let model = tables().to_model().unwrap();
        assert_eq!(model.num_staff(), 2);
        assert_eq!(model.weight(0), 0.7);
        assert_eq!(model.weight(1), 0.5);
        assert_eq!(model.availability_of("B", date(2)), Some(false));
        assert_eq!(model.availability_of("A", date(2)), Some(true));
        assert_eq!(model.load_for(0, LoadBounds::unbounded()), LoadBounds::at_most(1));
        assert_eq!(model.load_for(1, LoadBounds::at_most(3)), LoadBounds::at_most(3));
        assert_eq!(
            model.coverage_for(0, CoverageRange::default()),
            CoverageRange::exactly(2)
        );
        assert_eq!(
            model.coverage_for(1, CoverageRange::default()),
            CoverageRange::default()
        );
    }

    #[test]
    fn explicit_rows_override_days_off() {
        let mut tables = tables();
        tables.availability.push(AvailabilityRow {
            staff_id: "B".to_string(),
            date: date(2),
            available: 1,
        });
        let model = tables.to_model().unwrap();
        assert_eq!(model.availability_of("B", date(2)), Some(true));
    }

    #[test]
    fn rows_must_be_total_without_days_off() {
        let mut tables = tables();
        tables.days_off = None;
        tables.availability = vec![AvailabilityRow {
            staff_id: "A".to_string(),
            date: date(1),
            available: 1,
        }];
        assert!(matches!(
            tables.to_model(),
            Err(ValidationError::MissingAvailability { .. })
        ));
    }

    #[test]
    fn row_level_errors() {
        let mut duplicated = tables();
        duplicated.weights.push(WeightRow {
            staff_id: "A".to_string(),
            weight: 0.1,
        });
        assert_eq!(
            duplicated.to_model(),
            Err(ValidationError::DuplicateWeight("A".to_string()))
        );

        let mut flagged = tables();
        flagged.availability.push(AvailabilityRow {
            staff_id: "A".to_string(),
            date: date(1),
            available: 2,
        });
        assert!(matches!(
            flagged.to_model(),
            Err(ValidationError::InvalidAvailabilityFlag { flag: 2, .. })
        ));

        let mut repeated = tables();
        let row = AvailabilityRow {
            staff_id: "A".to_string(),
            date: date(1),
            available: 1,
        };
        repeated.availability = vec![row.clone(), row];
        assert!(matches!(
            repeated.to_model(),
            Err(ValidationError::DuplicateAvailability { .. })
        ));

        let mut unknown = tables();
        unknown.days_off = Some(IndexMap::from([("Z".to_string(), vec![date(1)])]));
        assert_eq!(
            unknown.to_model(),
            Err(ValidationError::UnknownStaff("Z".to_string()))
        );
    }

    #[test]
    fn assignment_rows() {
        let model = tables().to_model().unwrap();
        let mut table = AssignmentTable::empty(&model);
        table.set(0, 0, true);
        table.set(1, 0, true);
        table.set(0, 1, true);
        let rows = table.rows();
        assert_eq!(
            rows,
            vec![
                AssignmentRow {
                    staff_id: "A".to_string(),
                    shifts: vec![1, 1]
                },
                AssignmentRow {
                    staff_id: "B".to_string(),
                    shifts: vec![1, 0]
                },
            ]
        );
    }
}
