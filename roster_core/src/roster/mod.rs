//! Module providing the domain model of a roster: staff, calendar days, preference
//! weights, and availability, validated together into a [`model::RosterModel`].

pub mod calendar;
pub mod model;
pub mod preference;
pub mod staff;
