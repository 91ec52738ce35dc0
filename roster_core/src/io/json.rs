//! Module providing JSON IO for roster inputs and results
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configuration::SchedulerConfig;
use crate::io::tables::{AssignmentRow, RosterTables};
use crate::roster::model::{RosterModel, ValidationError};
use crate::schedule::extract::RosterSummary;
use crate::schedule::ScheduleResult;

// region JSON Roster
/// Represents a JSON serialized roster run: the input tables, optionally with the settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonRoster {
    #[serde(flatten)]
    pub tables: RosterTables,
    #[serde(default)]
    pub config: Option<SchedulerConfig>,
}

impl JsonRoster {
    /// Read a JSON roster file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<JsonRoster, JsonError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        JsonRoster::from_json_str(&data)
    }

    /// Parse a JSON roster from a string
    pub fn from_json_str(data: &str) -> Result<JsonRoster, JsonError> {
        match serde_json::from_str::<JsonRoster>(data) {
            Ok(roster) => Ok(roster),
            Err(err) => Err(JsonError::UnableToParse(format!("{:?}", err))),
        }
    }

    /// Validate the tables into a [`RosterModel`]
    pub fn to_model(&self) -> Result<RosterModel, JsonError> {
        Ok(self.tables.to_model()?)
    }
}
// endregion JSON Roster

// region JSON Result
/// Represents a JSON serialized run result, with the assignment table in row form
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonResult {
    pub status: String,
    pub timed_out: bool,
    pub objective_value: Option<f64>,
    pub days: Vec<NaiveDate>,
    pub assignment: Option<Vec<AssignmentRow>>,
    pub summary: Option<RosterSummary>,
}

impl From<&ScheduleResult> for JsonResult {
    fn from(result: &ScheduleResult) -> Self {
        let table = result.assignment.as_ref();
        JsonResult {
            status: result.status.to_string(),
            timed_out: result.timed_out(),
            objective_value: result.objective_value,
            days: table.map(|t| t.days().to_vec()).unwrap_or_default(),
            assignment: table.map(|t| t.rows()),
            summary: table.map(|t| t.summary()),
        }
    }
}

impl ScheduleResult {
    /// Write the result as JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        let result_string = serde_json::to_string_pretty(&JsonResult::from(self))?;
        fs::write(path, result_string)?;
        Ok(())
    }
}
// endregion JSON Result

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Invalid roster tables")]
    InvalidRoster(#[from] ValidationError),
    #[error("Serde json parse error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}

#[cfg(test)]
mod json_tests {
    use super::*;
    use std::time::Duration;

    const ROSTER: &str = r#"{
"staff":[
{"staff_id":"A","is_responsible":true,"max_shifts":2},
{"staff_id":"B","name":"Ben","is_responsible":false}
],
"calendar":[
{"date":"2024-04-01"},
{"date":"2024-04-02","min_staff":1,"max_staff":1}
],
"weights":[{"staff_id":"B","weight":0.9}],
"days_off":{"B":["2024-04-02"]},
"config":{"time_limit":{"secs":5,"nanos":0},"fairness_weight":0.1}
}"#;

    #[test]
    fn json_roster() {
        let roster = JsonRoster::from_json_str(ROSTER).unwrap();
        assert_eq!(roster.tables.staff.len(), 2);
        assert_eq!(roster.tables.staff[0].max_shifts, Some(2));
        assert_eq!(roster.tables.staff[1].name.as_deref(), Some("Ben"));
        assert_eq!(roster.tables.calendar[1].min_staff, Some(1));
        assert!(roster.tables.availability.is_empty());
        let config = roster.config.clone().unwrap();
        assert_eq!(config.time_limit, Duration::from_secs(5));
        assert_eq!(config.fairness_weight, 0.1);

        let model = roster.to_model().unwrap();
        assert_eq!(model.weight(1), 0.9);
        assert_eq!(model.availability_of("B", "2024-04-02".parse().unwrap()), Some(false));
    }

    #[test]
    fn json_errors() {
        assert!(matches!(
            JsonRoster::from_json_str(r#"{"staff":[]}"#),
            Err(JsonError::UnableToParse(_))
        ));
        assert!(matches!(
            JsonRoster::read_json("does/not/exist.json"),
            Err(JsonError::UnableToRead(_))
        ));
        let invalid = JsonRoster::from_json_str(
            r#"{"staff":[{"staff_id":"A","is_responsible":true}],"calendar":[{"date":"2024-04-01"}],"weights":[{"staff_id":"A","weight":1.5}],"days_off":{}}"#,
        )
        .unwrap();
        assert!(matches!(
            invalid.to_model(),
            Err(JsonError::InvalidRoster(ValidationError::WeightOutOfRange { .. }))
        ));
    }
}
