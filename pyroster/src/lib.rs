use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use indexmap::IndexMap;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use roster_core::configuration::SchedulerConfig;
use roster_core::roster::calendar::{CoverageRange, Day};
use roster_core::roster::model::RosterModel;
use roster_core::roster::preference::{Availability, PreferenceWeights};
use roster_core::roster::staff::{LoadBounds, Staff};
use roster_core::schedule::{optimize, ScheduleError, ScheduleResult};

/// Result of an optimization run
#[pyclass]
struct RosterResult {
    inner: ScheduleResult,
}

#[pymethods]
impl RosterResult {
    /// One of "optimal", "feasible", "infeasible", "unbounded", "not solved"
    #[getter]
    fn status(&self) -> String {
        self.inner.status.to_string()
    }

    #[getter]
    fn objective_value(&self) -> Option<f64> {
        self.inner.objective_value
    }

    /// True if the time limit ended the solve, the roster may then not be optimal
    #[getter]
    fn timed_out(&self) -> bool {
        self.inner.timed_out()
    }

    /// Dates of the assignment columns, as ISO strings
    #[getter]
    fn days(&self) -> Vec<String> {
        self.inner
            .assignment
            .as_ref()
            .map(|t| t.days().iter().map(|d| d.to_string()).collect())
            .unwrap_or_default()
    }

    /// Rows of (staff id, 0/1 per day), None without a feasible roster
    fn assignment(&self) -> Option<Vec<(String, Vec<u8>)>> {
        self.inner.assignment.as_ref().map(|t| {
            t.rows()
                .into_iter()
                .map(|row| (row.staff_id, row.shifts))
                .collect()
        })
    }

    /// Days worked per staff member, and (date, responsible, non responsible) per day
    #[allow(clippy::type_complexity)]
    fn summary(&self) -> Option<(Vec<(String, u32)>, Vec<(String, u32, u32)>)> {
        let summary = self.inner.assignment.as_ref()?.summary();
        let staff = summary.staff_totals.into_iter().collect();
        let days = summary
            .day_counts
            .into_iter()
            .map(|(day, count)| (day.to_string(), count.responsible, count.non_responsible))
            .collect();
        Some((staff, days))
    }

    fn __repr__(&self) -> String {
        format!(
            "RosterResult(status={}, objective_value={:?}, timed_out={})",
            self.inner.status,
            self.inner.objective_value,
            self.inner.timed_out()
        )
    }
}

fn parse_date(date: &str) -> PyResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|err| PyValueError::new_err(format!("invalid date {}: {}", date, err)))
}

fn to_py_err(err: ScheduleError) -> PyErr {
    match err {
        ScheduleError::Validation(_) => PyValueError::new_err(err.to_string()),
        ScheduleError::Model(_) | ScheduleError::SolverUnavailable(_) => {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

/// Assign staff to days, maximizing the sum of the preference weights of all assignments
///
/// `staff` holds (staff id, is responsible) pairs and `days` ISO dates. Staff missing
/// from `weights` get the neutral weight 0.5, `days_off` maps staff ids to the ISO
/// dates they cannot work.
#[pyfunction]
#[pyo3(signature = (
    staff,
    days,
    time_limit_secs,
    weights = None,
    days_off = None,
    coverage_min = 1,
    coverage_max = None,
    responsible_minimum = 1,
    min_shifts = None,
    max_shifts = None,
    fairness_weight = 0.0
))]
#[allow(clippy::too_many_arguments)]
fn optimize_roster(
    py: Python<'_>,
    staff: Vec<(String, bool)>,
    days: Vec<String>,
    time_limit_secs: f64,
    weights: Option<BTreeMap<String, f64>>,
    days_off: Option<BTreeMap<String, Vec<String>>>,
    coverage_min: u32,
    coverage_max: Option<u32>,
    responsible_minimum: u32,
    min_shifts: Option<u32>,
    max_shifts: Option<u32>,
    fairness_weight: f64,
) -> PyResult<RosterResult> {
    let time_limit = Duration::try_from_secs_f64(time_limit_secs)
        .map_err(|err| PyValueError::new_err(format!("invalid time limit: {}", err)))?;
    let dates = days
        .iter()
        .map(|d| parse_date(d))
        .collect::<PyResult<Vec<NaiveDate>>>()?;
    let mut requested = IndexMap::new();
    for (staff_id, off) in days_off.unwrap_or_default() {
        let off = off
            .iter()
            .map(|d| parse_date(d))
            .collect::<PyResult<Vec<NaiveDate>>>()?;
        requested.insert(staff_id, off);
    }
    let availability =
        Availability::from_days_off(staff.iter().map(|(id, _)| id.as_str()), &dates, &requested);
    let weights: PreferenceWeights = weights.unwrap_or_default().into_iter().collect();
    let staff = staff
        .iter()
        .map(|(id, responsible)| Staff::new(id, *responsible))
        .collect();
    let days = dates.into_iter().map(Day::new).collect();
    let roster = RosterModel::new(staff, days, &weights, &availability)
        .map_err(|err| to_py_err(err.into()))?;

    let mut config = SchedulerConfig::with_time_limit(time_limit);
    config.coverage = CoverageRange::new(coverage_min, coverage_max);
    config.responsible_minimum = responsible_minimum;
    config.load = LoadBounds::new(min_shifts, max_shifts);
    config.fairness_weight = fairness_weight;

    let result = py
        .allow_threads(|| optimize(&roster, &config))
        .map_err(to_py_err)?;
    Ok(RosterResult { inner: result })
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(optimize_roster, m)?)?;
    m.add_class::<RosterResult>()?;
    Ok(())
}
