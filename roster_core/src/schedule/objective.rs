//! Objective of the roster problem
use tracing::debug;

use crate::configuration::SchedulerConfig;
use crate::optimize::problem::ProblemError;
use crate::optimize::variable::VariableType;
use crate::roster::model::RosterModel;
use crate::schedule::builder::ShiftModel;

/// Id of the auxiliary variable bounding every staff member's load from above
pub const MAX_LOAD_ID: &str = "max_load";

impl ShiftModel {
    /// Set the objective: maximize the sum of preference weight times assignment
    ///
    /// When `config.fairness_weight` is positive an auxiliary variable `max_load` is
    /// added, constrained to be at least every staff member's load, and
    /// `fairness_weight * max_load` is subtracted from the objective.
    ///
    /// # Parameters
    /// - `roster`: The roster the model was built from
    /// - `config`: Settings of the run
    ///
    /// # Note:
    /// Any existing objective terms are removed first
    pub fn compose_objective(
        &mut self,
        roster: &RosterModel,
        config: &SchedulerConfig,
    ) -> Result<(), ProblemError> {
        self.problem.remove_all_objective_terms();
        for (s, row) in self.assignments.iter().enumerate() {
            let weight = roster.weight(s);
            for index in row {
                self.problem.add_new_linear_objective_term(*index, weight)?;
            }
        }

        if config.fairness_weight > 0. && !self.assignments.is_empty() {
            let max_load = match self.max_load {
                Some(index) => index,
                None => self.problem.add_new_variable(
                    MAX_LOAD_ID,
                    None,
                    VariableType::Continuous,
                    0.,
                    roster.num_days() as f64,
                )?,
            };
            for (s, row) in self.assignments.iter().enumerate() {
                let id = format!("fair_{}", s);
                if self.problem.constraint(&id).is_some() {
                    continue;
                }
                let mut vars = row.clone();
                vars.push(max_load);
                let mut coefs = vec![1.; row.len()];
                coefs.push(-1.);
                self.problem
                    .add_new_inequality_constraint(&id, &vars, &coefs, f64::NEG_INFINITY, 0.)?;
            }
            self.problem
                .add_new_linear_objective_term(max_load, -config.fairness_weight)?;
            self.max_load = Some(max_load);
        }
        debug!(
            terms = self.problem.objective().terms().len(),
            fairness = self.max_load.is_some(),
            "composed roster objective"
        );
        Ok(())
    }

    /// Index of the auxiliary largest load variable, if the fairness term is in use
    pub fn max_load_variable(&self) -> Option<usize> {
        self.max_load
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::objective::ObjectiveSense;
    use crate::roster::calendar::Day;
    use crate::roster::preference::{Availability, PreferenceWeights};
    use crate::roster::staff::Staff;
    use chrono::NaiveDate;
    use indexmap::IndexMap;
    use std::time::Duration;

    fn roster() -> RosterModel {
        let dates: Vec<NaiveDate> = (1..=2)
            .map(|d| NaiveDate::from_ymd_opt(2024, 4, d).unwrap())
            .collect();
        let availability = Availability::from_days_off(["A", "B"], &dates, &IndexMap::new());
        RosterModel::new(
            vec![Staff::new("A", true), Staff::new("B", false)],
            dates.into_iter().map(Day::new).collect(),
            &PreferenceWeights::new().with("A", 0.9),
            &availability,
        )
        .unwrap()
    }

    #[test]
    fn preference_terms() {
        let roster = roster();
        let config = SchedulerConfig::with_time_limit(Duration::from_secs(1));
        let mut model = ShiftModel::build(&roster, &config).unwrap();
        model.compose_objective(&roster, &config).unwrap();
        let problem = model.problem();
        assert_eq!(problem.sense(), ObjectiveSense::Maximize);
        assert_eq!(problem.objective().coefficients(4), vec![0.9, 0.9, 0.5, 0.5]);
        assert!(model.max_load_variable().is_none());
        assert!((problem.objective_value(&[1., 0., 1., 1.]) - 1.9).abs() < 1e-12);
    }

    #[test]
    fn fairness_term() {
        let roster = roster();
        let mut config = SchedulerConfig::with_time_limit(Duration::from_secs(1));
        config.fairness_weight = 0.25;
        let mut model = ShiftModel::build(&roster, &config).unwrap();
        model.compose_objective(&roster, &config).unwrap();
        let max_load = model.max_load_variable().unwrap();
        assert_eq!(max_load, 4);
        let problem = model.problem();
        assert_eq!(problem.variable_at(max_load).unwrap().upper_bound, 2.);
        assert_eq!(problem.constraint("fair_1").unwrap().get_bounds().1, 0.);
        assert_eq!(problem.objective().coefficients(5)[4], -0.25);
        // Load of A is 2, so max_load must be at least 2
        assert!(!problem.is_feasible(&[1., 1., 0., 1., 1.], 1e-9));
        assert!(problem.is_feasible(&[1., 1., 0., 1., 2.], 1e-9));
    }

    #[test]
    fn composing_twice_does_not_duplicate() {
        let roster = roster();
        let mut config = SchedulerConfig::with_time_limit(Duration::from_secs(1));
        config.fairness_weight = 1.;
        let mut model = ShiftModel::build(&roster, &config).unwrap();
        model.compose_objective(&roster, &config).unwrap();
        let first = model.problem().clone();
        model.compose_objective(&roster, &config).unwrap();
        assert_eq!(model.problem().num_variables(), first.num_variables());
        assert_eq!(model.problem().num_constraints(), first.num_constraints());
        assert_eq!(model.problem().objective().terms(), first.objective().terms());
    }
}
