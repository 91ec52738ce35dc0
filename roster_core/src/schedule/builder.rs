//! Translates a [`RosterModel`] into the variables and constraints of an integer program
use tracing::debug;

use crate::configuration::SchedulerConfig;
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::variable::VariableType;
use crate::roster::model::RosterModel;

/// The integer program of one run, plus the mapping from (staff, day) to variables
#[derive(Debug, Clone)]
pub struct ShiftModel {
    /// Underlying optimization problem
    pub(super) problem: Problem,
    /// Index of the assignment variable of each (staff, day), as [staff][day]
    pub(super) assignments: Vec<Vec<usize>>,
    /// Index of the auxiliary largest load variable, if the fairness term is used
    pub(super) max_load: Option<usize>,
}

impl ShiftModel {
    /// Create the assignment variables and the constraint set of a roster
    ///
    /// Constraints that contradict each other are still added, infeasibility is left
    /// for the solver to detect.
    ///
    /// # Parameters
    /// - `roster`: The validated roster
    /// - `config`: Coverage, responsibility, and load settings of the run
    ///
    /// # Returns
    /// A model with an empty objective, see [`ShiftModel::compose_objective`]
    pub fn build(roster: &RosterModel, config: &SchedulerConfig) -> Result<Self, ProblemError> {
        let mut problem = Problem::new_maximization();
        let mut assignments = Vec::with_capacity(roster.num_staff());

        for (s, staff) in roster.staff().enumerate() {
            let mut row = Vec::with_capacity(roster.num_days());
            for (d, day) in roster.days().enumerate() {
                let index = problem.add_new_variable(
                    &assignment_id(s, d),
                    Some(&format!("{}@{}", staff.id, day.date)),
                    VariableType::Binary,
                    0.,
                    1.,
                )?;
                // Day off requests are hard exclusions
                if !roster.is_available(s, d) {
                    problem.fix_variable(index, 0.)?;
                }
                row.push(index);
            }
            assignments.push(row);
        }
        debug!(
            variables = problem.num_variables(),
            "created assignment variables"
        );

        let mut model = ShiftModel {
            problem,
            assignments,
            max_load: None,
        };
        model.add_coverage_constraints(roster, config)?;
        model.add_responsibility_constraints(roster, config)?;
        model.add_load_constraints(roster, config)?;
        debug!(
            constraints = model.problem.num_constraints(),
            "created roster constraints"
        );
        Ok(model)
    }

    /// Staff on each day must fall within the day's coverage range
    fn add_coverage_constraints(
        &mut self,
        roster: &RosterModel,
        config: &SchedulerConfig,
    ) -> Result<(), ProblemError> {
        for d in 0..roster.num_days() {
            let range = roster.coverage_for(d, config.coverage);
            let vars = self.day_variables(d);
            let ones = vec![1.; vars.len()];
            self.problem.add_new_inequality_constraint(
                &format!("coverage_{}", d),
                &vars,
                &ones,
                f64::from(range.min),
                range.max.map_or(f64::INFINITY, f64::from),
            )?;
        }
        Ok(())
    }

    /// At least the configured number of responsible staff on each day
    fn add_responsibility_constraints(
        &mut self,
        roster: &RosterModel,
        config: &SchedulerConfig,
    ) -> Result<(), ProblemError> {
        if config.responsible_minimum == 0 {
            return Ok(());
        }
        let responsible: Vec<usize> = roster
            .staff()
            .enumerate()
            .filter(|(_, staff)| staff.is_responsible)
            .map(|(s, _)| s)
            .collect();
        for d in 0..roster.num_days() {
            let vars: Vec<usize> = responsible
                .iter()
                .map(|s| self.assignments[*s][d])
                .collect();
            let ones = vec![1.; vars.len()];
            self.problem.add_new_inequality_constraint(
                &format!("responsible_{}", d),
                &vars,
                &ones,
                f64::from(config.responsible_minimum),
                f64::INFINITY,
            )?;
        }
        Ok(())
    }

    /// Each staff member's total days must lie within their load bounds
    fn add_load_constraints(
        &mut self,
        roster: &RosterModel,
        config: &SchedulerConfig,
    ) -> Result<(), ProblemError> {
        for s in 0..roster.num_staff() {
            let bounds = roster.load_for(s, config.load);
            if !bounds.is_bounded() {
                continue;
            }
            let vars = self.assignments[s].clone();
            let ones = vec![1.; vars.len()];
            self.problem.add_new_inequality_constraint(
                &format!("load_{}", s),
                &vars,
                &ones,
                bounds.min.map_or(f64::NEG_INFINITY, f64::from),
                bounds.max.map_or(f64::INFINITY, f64::from),
            )?;
        }
        Ok(())
    }

    /// Assignment variables of one day, in staff order
    fn day_variables(&self, day_index: usize) -> Vec<usize> {
        self.assignments.iter().map(|row| row[day_index]).collect()
    }

    /// The underlying optimization problem
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Index of the variable assigning staff `staff_index` to day `day_index`
    pub fn assignment_variable(&self, staff_index: usize, day_index: usize) -> Option<usize> {
        self.assignments.get(staff_index)?.get(day_index).copied()
    }
}

/// Id of the assignment variable of (staff, day)
fn assignment_id(staff_index: usize, day_index: usize) -> String {
    format!("x_{}_{}", staff_index, day_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::constraint::Constraint;
    use crate::roster::calendar::{CoverageRange, Day};
    use crate::roster::preference::{Availability, PreferenceWeights};
    use crate::roster::staff::{LoadBounds, Staff};
    use chrono::NaiveDate;
    use indexmap::IndexMap;
    use std::time::Duration;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn roster() -> RosterModel {
        let dates = vec![date(1), date(2), date(3)];
        let mut days_off = IndexMap::new();
        days_off.insert("B".to_string(), vec![date(2)]);
        let availability = Availability::from_days_off(["A", "B", "C"], &dates, &days_off);
        let mut staff = vec![
            Staff::new("A", true),
            Staff::new("B", false),
            Staff::new("C", false),
        ];
        staff[2].load = Some(LoadBounds::new(Some(1), Some(2)));
        let days = vec![
            Day::new(date(1)),
            Day::new(date(2)).with_coverage(CoverageRange::exactly(2)),
            Day::new(date(3)),
        ];
        RosterModel::new(staff, days, &PreferenceWeights::new(), &availability).unwrap()
    }

    fn config() -> SchedulerConfig {
        let mut config = SchedulerConfig::with_time_limit(Duration::from_secs(5));
        config.coverage = CoverageRange::new(1, Some(3));
        config
    }

    #[test]
    fn one_variable_per_pair() {
        let model = ShiftModel::build(&roster(), &config()).unwrap();
        assert_eq!(model.problem().num_variables(), 9);
        assert_eq!(model.assignment_variable(1, 2), Some(5));
        assert_eq!(model.assignment_variable(3, 0), None);
        assert!(model.problem().has_integer_variables());
        let var = model.problem().variable_at(5).unwrap();
        assert_eq!(var.name.as_deref(), Some("B@2024-04-03"));
    }

    #[test]
    fn day_off_is_fixed_to_zero() {
        let model = ShiftModel::build(&roster(), &config()).unwrap();
        let index = model.assignment_variable(1, 1).unwrap();
        let var = model.problem().variable_at(index).unwrap();
        assert_eq!((var.lower_bound, var.upper_bound), (0., 0.));
        let free = model.problem().variable_at(model.assignment_variable(0, 1).unwrap()).unwrap();
        assert_eq!((free.lower_bound, free.upper_bound), (0., 1.));
    }

    #[test]
    fn coverage_uses_day_override() {
        let model = ShiftModel::build(&roster(), &config()).unwrap();
        let global = model.problem().constraint("coverage_0").unwrap();
        assert_eq!(global.get_bounds(), (1., 3.));
        assert_eq!(global.get_terms().len(), 3);
        let day = model.problem().constraint("coverage_1").unwrap();
        assert_eq!(day.get_bounds(), (2., 2.));
    }

    #[test]
    fn responsibility_counts_responsible_staff_only() {
        let model = ShiftModel::build(&roster(), &config()).unwrap();
        let cons = model.problem().constraint("responsible_2").unwrap();
        assert_eq!(cons.get_variables().collect::<Vec<_>>(), vec![2]);
        assert_eq!(cons.get_bounds(), (1., f64::INFINITY));

        let mut config = config();
        config.responsible_minimum = 0;
        let model = ShiftModel::build(&roster(), &config).unwrap();
        assert!(model.problem().constraint("responsible_0").is_none());
    }

    #[test]
    fn load_constraints() {
        let model = ShiftModel::build(&roster(), &config()).unwrap();
        // Only C has personal bounds, the global bounds are unbounded
        assert!(model.problem().constraint("load_0").is_none());
        match model.problem().constraint("load_2").unwrap() {
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => assert_eq!((*lower_bound, *upper_bound), (1., 2.)),
            Constraint::Equality { .. } => panic!("load bound added as equality"),
        }

        let mut config = config();
        config.load = LoadBounds::at_most(2);
        let model = ShiftModel::build(&roster(), &config).unwrap();
        let cons = model.problem().constraint("load_0").unwrap();
        assert_eq!(cons.get_bounds(), (f64::NEG_INFINITY, 2.));
    }

    #[test]
    fn contradictory_input_still_builds() {
        let dates = vec![date(1)];
        let mut days_off = IndexMap::new();
        days_off.insert("A".to_string(), vec![date(1)]);
        let availability = Availability::from_days_off(["A", "B"], &dates, &days_off);
        let roster = RosterModel::new(
            vec![Staff::new("A", true), Staff::new("B", false)],
            vec![Day::new(date(1))],
            &PreferenceWeights::new(),
            &availability,
        )
        .unwrap();
        // The only responsible member is off, the model is built anyway
        assert!(ShiftModel::build(&roster, &config()).is_ok());
    }
}
