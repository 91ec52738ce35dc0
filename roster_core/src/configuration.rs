//! Configuration of an optimization run
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::optimize::solvers::SolverBackend;
use crate::roster::calendar::CoverageRange;
use crate::roster::model::ValidationError;
use crate::roster::staff::LoadBounds;

/// Settings of a single optimization run
///
/// There is no process wide configuration, every run is handed its own.
/// The time limit has no default, [`SchedulerConfigBuilder::build`] fails without it.
///
/// # Examples
/// ```rust
/// use std::time::Duration;
/// use roster_core::configuration::SchedulerConfigBuilder;
/// use roster_core::roster::calendar::CoverageRange;
///
/// let config = SchedulerConfigBuilder::default()
///     .time_limit(Duration::from_secs(10))
///     .coverage(CoverageRange::new(2, Some(3)))
///     .build()
///     .unwrap();
/// assert_eq!(config.responsible_minimum, 1);
/// assert!(SchedulerConfigBuilder::default().build().is_err());
/// ```
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Staff required per day, for days without their own range
    #[builder(default = "CoverageRange::default()")]
    #[serde(default)]
    pub coverage: CoverageRange,
    /// Responsible staff required per day
    #[builder(default = "1")]
    #[serde(default = "default_responsible_minimum")]
    pub responsible_minimum: u32,
    /// Bounds on the number of days per staff member, for staff without their own bounds
    #[builder(default = "LoadBounds::unbounded()")]
    #[serde(default)]
    pub load: LoadBounds,
    /// Weight of the fairness term, which penalizes the largest individual load
    ///
    /// The term is left out of the objective when this is 0
    #[builder(default = "0.")]
    #[serde(default)]
    pub fairness_weight: f64,
    /// Distance from 0 or 1 tolerated in solver values of assignment variables
    #[builder(default = "1e-6")]
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Wall clock budget of the solve
    pub time_limit: Duration,
    /// Budget of branch and bound nodes, unlimited if None
    #[builder(default = "None")]
    #[serde(default)]
    pub node_limit: Option<usize>,
    /// Solver backend to run
    #[builder(default = "SolverBackend::default()")]
    #[serde(default)]
    pub backend: SolverBackend,
}

fn default_responsible_minimum() -> u32 {
    1
}

fn default_tolerance() -> f64 {
    1e-6
}

impl SchedulerConfig {
    /// Create a configuration with default settings and the given time limit
    pub fn with_time_limit(time_limit: Duration) -> Self {
        SchedulerConfig {
            coverage: CoverageRange::default(),
            responsible_minimum: default_responsible_minimum(),
            load: LoadBounds::unbounded(),
            fairness_weight: 0.,
            tolerance: default_tolerance(),
            time_limit,
            node_limit: None,
            backend: SolverBackend::default(),
        }
    }

    /// Check the settings before any solver work is done
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.coverage.is_valid() {
            return Err(ValidationError::InvalidCoverage {
                day: None,
                range: self.coverage,
            });
        }
        if !self.load.is_valid() {
            return Err(ValidationError::InvalidLoadBounds {
                staff: None,
                bounds: self.load,
            });
        }
        if !(self.fairness_weight >= 0. && self.fairness_weight.is_finite()) {
            return Err(ValidationError::InvalidSetting {
                name: "fairness_weight",
                value: self.fairness_weight,
            });
        }
        if !(self.tolerance > 0. && self.tolerance < 0.5) {
            return Err(ValidationError::InvalidSetting {
                name: "tolerance",
                value: self.tolerance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SchedulerConfig::with_time_limit(Duration::from_secs(5));
        let built = SchedulerConfigBuilder::default()
            .time_limit(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(config, built);
        assert_eq!(config.coverage, CoverageRange::at_least(1));
        assert_eq!(config.backend, SolverBackend::Microlp);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_settings() {
        let mut config = SchedulerConfig::with_time_limit(Duration::from_secs(5));
        config.coverage = CoverageRange::new(2, Some(1));
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCoverage { day: None, .. })
        ));

        let mut config = SchedulerConfig::with_time_limit(Duration::from_secs(5));
        config.fairness_weight = -1.;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSetting { name: "fairness_weight", .. })
        ));

        let mut config = SchedulerConfig::with_time_limit(Duration::from_secs(5));
        config.tolerance = 0.;
        assert!(config.validate().is_err());
    }

    #[test]
    fn time_limit_required_when_deserializing() {
        let res: Result<SchedulerConfig, _> = serde_json::from_str(r#"{"responsible_minimum": 2}"#);
        assert!(res.is_err());
        let config: SchedulerConfig = serde_json::from_str(
            r#"{"time_limit": {"secs": 3, "nanos": 0}, "coverage": {"min": 2, "max": 2}}"#,
        )
        .unwrap();
        assert_eq!(config.time_limit, Duration::from_secs(3));
        assert_eq!(config.coverage, CoverageRange::exactly(2));
        assert_eq!(config.responsible_minimum, 1);
    }
}
