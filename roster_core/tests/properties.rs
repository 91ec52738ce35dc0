use std::time::Duration;

use chrono::NaiveDate;
use proptest::prelude::*;

use roster_core::configuration::SchedulerConfig;
use roster_core::optimize::OptimizationStatus;
use roster_core::roster::calendar::{CoverageRange, Day};
use roster_core::roster::model::RosterModel;
use roster_core::roster::preference::{Availability, PreferenceWeights};
use roster_core::roster::staff::Staff;
use roster_core::schedule::optimize;

/// A small random roster, small enough to enumerate every assignment
#[derive(Debug, Clone)]
struct Instance {
    responsible: Vec<bool>,
    weights: Vec<f64>,
    available: Vec<Vec<bool>>,
    coverage: CoverageRange,
}

impl Instance {
    fn num_staff(&self) -> usize {
        self.responsible.len()
    }

    fn num_days(&self) -> usize {
        self.available.first().map_or(0, Vec::len)
    }

    fn id(s: usize) -> String {
        format!("S{}", s)
    }

    fn date(d: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1 + d as u32).unwrap()
    }

    fn roster(&self) -> RosterModel {
        let mut availability = Availability::new();
        let mut weights = PreferenceWeights::new();
        for s in 0..self.num_staff() {
            weights.set(&Self::id(s), self.weights[s]);
            for d in 0..self.num_days() {
                availability.set(&Self::id(s), Self::date(d), self.available[s][d]);
            }
        }
        RosterModel::new(
            (0..self.num_staff())
                .map(|s| Staff::new(&Self::id(s), self.responsible[s]))
                .collect(),
            (0..self.num_days()).map(|d| Day::new(Self::date(d))).collect(),
            &weights,
            &availability,
        )
        .unwrap()
    }

    /// Same instance with weights that differ between every pair of staff members
    fn with_distinct_weights(&self) -> Instance {
        let mut instance = self.clone();
        for (s, weight) in instance.weights.iter_mut().enumerate() {
            *weight = 0.9 * *weight + 0.01 * (s + 1) as f64;
        }
        instance
    }

    fn config(&self) -> SchedulerConfig {
        let mut config = SchedulerConfig::with_time_limit(Duration::from_secs(30));
        config.coverage = self.coverage;
        config
    }

    /// Best objective over every assignment, None if no assignment is feasible
    fn brute_force(&self) -> Option<f64> {
        let (n, m) = (self.num_staff(), self.num_days());
        let mut best: Option<f64> = None;
        for mask in 0u32..(1 << (n * m)) {
            let cell = |s: usize, d: usize| mask & (1 << (s * m + d)) != 0;
            let feasible = (0..m).all(|d| {
                let staffed = (0..n).filter(|s| cell(*s, d)).count() as u32;
                let responsible = (0..n)
                    .filter(|s| cell(*s, d) && self.responsible[*s])
                    .count();
                (0..n).all(|s| !cell(s, d) || self.available[s][d])
                    && self.coverage.contains(staffed)
                    && responsible >= 1
            });
            if feasible {
                let value: f64 = (0..n)
                    .flat_map(|s| (0..m).map(move |d| (s, d)))
                    .filter(|(s, d)| cell(*s, *d))
                    .map(|(s, _)| self.weights[s])
                    .sum();
                best = Some(best.map_or(value, |b| b.max(value)));
            }
        }
        best
    }
}

fn instance() -> impl Strategy<Value = Instance> {
    (1usize..=3, 1usize..=3).prop_flat_map(|(n, m)| {
        (
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec((0u32..=10).prop_map(|w| f64::from(w) / 10.), n),
            prop::collection::vec(prop::collection::vec(prop::bool::weighted(0.75), m), n),
            (0u32..=2, prop::option::of(0u32..=2)),
        )
            .prop_map(|(responsible, weights, available, (min, extra))| Instance {
                responsible,
                weights,
                available,
                coverage: CoverageRange::new(min, extra.map(|e| min + e)),
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matches_exhaustive_search(instance in instance()) {
        let roster = instance.roster();
        let config = instance.config();
        let result = optimize(&roster, &config).unwrap();
        match instance.brute_force() {
            Some(best) => {
                prop_assert_eq!(result.status, OptimizationStatus::Optimal);
                prop_assert!((result.objective_value.unwrap() - best).abs() < 1e-6);
            }
            None => {
                prop_assert_eq!(result.status, OptimizationStatus::Infeasible);
                prop_assert!(result.assignment.is_none());
            }
        }
    }

    #[test]
    fn rosters_respect_hard_rules(instance in instance()) {
        let roster = instance.roster();
        let config = instance.config();
        let result = optimize(&roster, &config).unwrap();
        if let Some(table) = result.assignment {
            prop_assert!(table.check(&roster, &config).is_ok());
            for s in 0..instance.num_staff() {
                for d in 0..instance.num_days() {
                    if !instance.available[s][d] {
                        prop_assert!(!table.cell(s, d));
                    }
                }
            }
            for day in table.days() {
                prop_assert!(instance.coverage.contains(table.day_total(*day).unwrap()));
            }
            // The objective is the weight sum of the assignments
            let weighted: f64 = (0..instance.num_staff())
                .map(|s| instance.weights[s] * f64::from(table.staff_total(&Instance::id(s)).unwrap()))
                .sum();
            prop_assert!((result.objective_value.unwrap() - weighted).abs() < 1e-6);
        }
    }

    #[test]
    fn days_off_never_help(instance in instance(), s in 0usize..3, d in 0usize..3) {
        let base = optimize(&instance.roster(), &instance.config()).unwrap();
        let mut reduced = instance.clone();
        if s < reduced.num_staff() && d < reduced.num_days() {
            reduced.available[s][d] = false;
        }
        let after = optimize(&reduced.roster(), &reduced.config()).unwrap();
        match (base.objective_value, after.objective_value) {
            (Some(before), Some(after)) => prop_assert!(after <= before + 1e-6),
            (None, Some(_)) => prop_assert!(false, "a day off made an infeasible roster feasible"),
            _ => {}
        }
    }

    #[test]
    fn raising_a_weight_never_costs_shifts(instance in instance(), s in 0usize..3, raise in 1u32..=5) {
        let base = instance.with_distinct_weights();
        let s = s % base.num_staff();
        let mut raised = base.clone();
        raised.weights[s] = (raised.weights[s] + 0.015 * f64::from(raise)).min(1.);
        let before = optimize(&base.roster(), &base.config()).unwrap();
        let after = optimize(&raised.roster(), &raised.config()).unwrap();
        prop_assert_eq!(before.status, after.status);
        if let (Some(before), Some(after)) = (before.assignment, after.assignment) {
            let id = Instance::id(s);
            prop_assert!(after.staff_total(&id).unwrap() >= before.staff_total(&id).unwrap());
        }
    }
}
