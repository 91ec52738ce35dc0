//! This module provides the RosterModel struct, a validated snapshot of everything one
//! optimization run needs to know about staff, days, weights, and availability
use chrono::NaiveDate;
use indexmap::IndexMap;
use thiserror::Error;

use crate::roster::calendar::{CoverageRange, Day};
use crate::roster::preference::{Availability, PreferenceWeights};
use crate::roster::staff::{LoadBounds, Staff};

/// Validated, immutable input of an optimization run
///
/// Staff and days keep the order they were supplied in, which is also the row and
/// column order of the resulting assignment table.
#[derive(Clone, Debug, PartialEq)]
pub struct RosterModel {
    /// Map of staff ids to Staff
    staff: IndexMap<String, Staff>,
    /// Map of dates to Days
    days: IndexMap<NaiveDate, Day>,
    /// Resolved weight of each staff member, by staff index
    weights: Vec<f64>,
    /// Availability grid, indexed by [staff index][day index]
    availability: Vec<Vec<bool>>,
}

impl RosterModel {
    /// Validate the inputs of a run and take a snapshot of them
    ///
    /// # Parameters
    /// - `staff`: All staff members
    /// - `days`: All days of the period
    /// - `weights`: Preference weights, staff without a weight get the neutral weight
    /// - `availability`: Availability relation, must hold an entry for every (staff, day) pair
    ///
    /// # Returns
    /// The validated model, or the first [`ValidationError`] found
    ///
    /// # Examples
    /// ```rust
    /// use chrono::NaiveDate;
    /// use roster_core::roster::calendar::Day;
    /// use roster_core::roster::model::RosterModel;
    /// use roster_core::roster::preference::{Availability, PreferenceWeights};
    /// use roster_core::roster::staff::Staff;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    /// let mut availability = Availability::new();
    /// availability.set("A", day, true);
    /// let model = RosterModel::new(
    ///     vec![Staff::new("A", true)],
    ///     vec![Day::new(day)],
    ///     &PreferenceWeights::new(),
    ///     &availability,
    /// ).unwrap();
    /// assert_eq!(model.weight(0), 0.5);
    /// ```
    pub fn new(
        staff: Vec<Staff>,
        days: Vec<Day>,
        weights: &PreferenceWeights,
        availability: &Availability,
    ) -> Result<Self, ValidationError> {
        let mut staff_map = IndexMap::with_capacity(staff.len());
        for member in staff {
            if let Some(load) = member.load {
                if !load.is_valid() {
                    return Err(ValidationError::InvalidLoadBounds {
                        staff: Some(member.id.clone()),
                        bounds: load,
                    });
                }
            }
            if staff_map.contains_key(&member.id) {
                return Err(ValidationError::DuplicateStaff(member.id));
            }
            staff_map.insert(member.id.clone(), member);
        }

        let mut day_map = IndexMap::with_capacity(days.len());
        for day in days {
            if let Some(coverage) = day.coverage {
                if !coverage.is_valid() {
                    return Err(ValidationError::InvalidCoverage {
                        day: Some(day.date),
                        range: coverage,
                    });
                }
            }
            if day_map.contains_key(&day.date) {
                return Err(ValidationError::DuplicateDay(day.date));
            }
            day_map.insert(day.date, day);
        }

        for (staff_id, weight) in weights.iter() {
            if !staff_map.contains_key(staff_id) {
                return Err(ValidationError::UnknownStaff(staff_id.to_string()));
            }
            if !(0. ..=1.).contains(&weight) {
                return Err(ValidationError::WeightOutOfRange {
                    staff: staff_id.to_string(),
                    weight,
                });
            }
        }
        let resolved_weights = staff_map.keys().map(|id| weights.weight(id)).collect();

        for (staff_id, day, _) in availability.iter() {
            if !staff_map.contains_key(staff_id) {
                return Err(ValidationError::UnknownStaff(staff_id.to_string()));
            }
            if !day_map.contains_key(&day) {
                return Err(ValidationError::UnknownDay(day));
            }
        }
        let mut grid = Vec::with_capacity(staff_map.len());
        for staff_id in staff_map.keys() {
            let mut row = Vec::with_capacity(day_map.len());
            for day in day_map.keys() {
                match availability.get(staff_id, *day) {
                    Some(available) => row.push(available),
                    None => {
                        return Err(ValidationError::MissingAvailability {
                            staff: staff_id.clone(),
                            day: *day,
                        })
                    }
                }
            }
            grid.push(row);
        }

        Ok(RosterModel {
            staff: staff_map,
            days: day_map,
            weights: resolved_weights,
            availability: grid,
        })
    }

    // region Accessors
    /// Number of staff
    pub fn num_staff(&self) -> usize {
        self.staff.len()
    }

    /// Number of days
    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    /// Staff in the order supplied
    pub fn staff(&self) -> impl Iterator<Item = &Staff> {
        self.staff.values()
    }

    /// Days in the order supplied
    pub fn days(&self) -> impl Iterator<Item = &Day> {
        self.days.values()
    }

    /// Staff member at an index
    pub fn staff_at(&self, index: usize) -> Option<&Staff> {
        self.staff.get_index(index).map(|(_, s)| s)
    }

    /// Day at an index
    pub fn day_at(&self, index: usize) -> Option<&Day> {
        self.days.get_index(index).map(|(_, d)| d)
    }

    /// Index of a staff member
    pub fn staff_index(&self, staff_id: &str) -> Option<usize> {
        self.staff.get_index_of(staff_id)
    }

    /// Index of a day
    pub fn day_index(&self, day: NaiveDate) -> Option<usize> {
        self.days.get_index_of(&day)
    }

    /// Preference weight of the staff member at `staff_index`
    ///
    /// # Panics
    /// If `staff_index` is out of range
    pub fn weight(&self, staff_index: usize) -> f64 {
        self.weights[staff_index]
    }

    /// Whether the staff member at `staff_index` is available on the day at `day_index`
    ///
    /// # Panics
    /// If either index is out of range
    pub fn is_available(&self, staff_index: usize, day_index: usize) -> bool {
        self.availability[staff_index][day_index]
    }

    /// Availability looked up by staff id and date, None if either is unknown
    pub fn availability_of(&self, staff_id: &str, day: NaiveDate) -> Option<bool> {
        let s = self.staff_index(staff_id)?;
        let d = self.day_index(day)?;
        Some(self.availability[s][d])
    }

    /// Coverage range of the day at `day_index`, falling back to `default`
    pub fn coverage_for(&self, day_index: usize, default: CoverageRange) -> CoverageRange {
        self.day_at(day_index)
            .and_then(|d| d.coverage)
            .unwrap_or(default)
    }

    /// Load bounds of the staff member at `staff_index`, falling back to `default`
    pub fn load_for(&self, staff_index: usize, default: LoadBounds) -> LoadBounds {
        self.staff_at(staff_index)
            .and_then(|s| s.load)
            .unwrap_or(default)
    }
    // endregion Accessors
}

/// Errors raised while validating the input of a run
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Two staff members share an id
    #[error("staff id {0} appears more than once")]
    DuplicateStaff(String),
    /// A date appears twice in the calendar
    #[error("day {0} appears more than once")]
    DuplicateDay(NaiveDate),
    /// A weight lies outside of [0, 1]
    #[error("weight {weight} of staff {staff} is outside of [0, 1]")]
    WeightOutOfRange {
        /// Staff id
        staff: String,
        /// Offending weight
        weight: f64,
    },
    /// A weight or availability entry refers to a staff member not in the roster
    #[error("unknown staff id {0}")]
    UnknownStaff(String),
    /// An availability entry refers to a day not in the calendar
    #[error("unknown day {0}")]
    UnknownDay(NaiveDate),
    /// The availability relation has no entry for a (staff, day) pair
    #[error("no availability entry for staff {staff} on {day}")]
    MissingAvailability {
        /// Staff id
        staff: String,
        /// Date without entry
        day: NaiveDate,
    },
    /// A coverage range has min > max
    #[error("invalid coverage range {range:?} (day: {day:?})")]
    InvalidCoverage {
        /// Day the range belongs to, None for the global range
        day: Option<NaiveDate>,
        /// Offending range
        range: CoverageRange,
    },
    /// Load bounds have min > max
    #[error("invalid load bounds {bounds:?} (staff: {staff:?})")]
    InvalidLoadBounds {
        /// Staff the bounds belong to, None for the global bounds
        staff: Option<String>,
        /// Offending bounds
        bounds: LoadBounds,
    },
    /// A staff member has more than one weight row
    #[error("staff {0} has more than one weight")]
    DuplicateWeight(String),
    /// A (staff, day) pair has more than one availability row
    #[error("staff {staff} has more than one availability entry on {day}")]
    DuplicateAvailability {
        /// Staff id
        staff: String,
        /// Repeated date
        day: NaiveDate,
    },
    /// An availability flag is neither 0 nor 1
    #[error("availability flag {flag} of staff {staff} on {day} is not 0 or 1")]
    InvalidAvailabilityFlag {
        /// Staff id
        staff: String,
        /// Date of the entry
        day: NaiveDate,
        /// Offending flag
        flag: u8,
    },
    /// A numeric setting of the configuration is out of range
    #[error("invalid configuration value for {name}: {value}")]
    InvalidSetting {
        /// Name of the setting
        name: &'static str,
        /// Offending value
        value: f64,
    },
}
