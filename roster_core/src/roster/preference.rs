//! This module provides the per staff preference weights, and the per staff per day
//! availability relation
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Weight used for staff without an explicit preference weight
pub const NEUTRAL_WEIGHT: f64 = 0.5;

/// Priority of each staff member for being scheduled, each weight lies in [0, 1]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWeights {
    weights: IndexMap<String, f64>,
}

impl PreferenceWeights {
    /// Create an empty set of weights, every staff member gets [`NEUTRAL_WEIGHT`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight of a staff member, replacing any previous weight
    pub fn set(&mut self, staff_id: &str, weight: f64) {
        self.weights.insert(staff_id.to_string(), weight);
    }

    /// Builder style version of [`PreferenceWeights::set`]
    pub fn with(mut self, staff_id: &str, weight: f64) -> Self {
        self.set(staff_id, weight);
        self
    }

    /// Explicit weight of a staff member, if one was set
    pub fn get(&self, staff_id: &str) -> Option<f64> {
        self.weights.get(staff_id).copied()
    }

    /// Weight of a staff member, [`NEUTRAL_WEIGHT`] if none was set
    pub fn weight(&self, staff_id: &str) -> f64 {
        self.get(staff_id).unwrap_or(NEUTRAL_WEIGHT)
    }

    /// Iterate over the explicitly set (staff id, weight) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(id, w)| (id.as_str(), *w))
    }
}

impl FromIterator<(String, f64)> for PreferenceWeights {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        PreferenceWeights {
            weights: iter.into_iter().collect(),
        }
    }
}

/// Availability of staff on days, `true` is available and `false` is a day off request
///
/// When handed to a [`RosterModel`](crate::roster::model::RosterModel) the relation must
/// be total over staff × days, [`Availability::from_days_off`] builds such a relation from
/// day off requests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Availability {
    entries: IndexMap<(String, NaiveDate), bool>,
}

impl Availability {
    /// Create an empty relation
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a staff member is available on a day
    pub fn set(&mut self, staff_id: &str, day: NaiveDate, available: bool) {
        self.entries.insert((staff_id.to_string(), day), available);
    }

    /// Look up a (staff, day) pair, None if the pair has no entry
    pub fn get(&self, staff_id: &str, day: NaiveDate) -> Option<bool> {
        // IndexMap lookups need an owned key of the same type
        self.entries.get(&(staff_id.to_string(), day)).copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over ((staff id, day), available) entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, NaiveDate, bool)> {
        self.entries
            .iter()
            .map(|((id, day), available)| (id.as_str(), *day, *available))
    }

    /// Build a total relation over `staff_ids` × `days`, where every pair is available
    /// unless listed in `days_off`
    ///
    /// # Parameters
    /// - `staff_ids`: Identifiers of all staff
    /// - `days`: All days of the roster
    /// - `days_off`: Day off requests, keyed by staff id
    ///
    /// # Note:
    /// Requests for staff or days outside of `staff_ids` and `days` are kept as
    /// explicit entries, so that validation can report them
    pub fn from_days_off<'a>(
        staff_ids: impl IntoIterator<Item = &'a str>,
        days: &[NaiveDate],
        days_off: &IndexMap<String, Vec<NaiveDate>>,
    ) -> Self {
        let mut availability = Availability::new();
        for staff_id in staff_ids {
            for day in days {
                availability.set(staff_id, *day, true);
            }
        }
        for (staff_id, requested) in days_off {
            for day in requested {
                availability.set(staff_id, *day, false);
            }
        }
        availability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    #[test]
    fn weights_default_to_neutral() {
        let weights = PreferenceWeights::new().with("A", 0.9);
        assert_eq!(weights.weight("A"), 0.9);
        assert_eq!(weights.weight("B"), NEUTRAL_WEIGHT);
        assert_eq!(weights.get("B"), None);
    }

    #[test]
    fn days_off_join() {
        let mut days_off = IndexMap::new();
        days_off.insert("B".to_string(), vec![date(2)]);
        let availability =
            Availability::from_days_off(["A", "B"], &[date(1), date(2), date(3)], &days_off);
        assert_eq!(availability.len(), 6);
        assert_eq!(availability.get("A", date(2)), Some(true));
        assert_eq!(availability.get("B", date(2)), Some(false));
        assert_eq!(availability.get("B", date(3)), Some(true));
        assert_eq!(availability.get("C", date(1)), None);
    }
}
