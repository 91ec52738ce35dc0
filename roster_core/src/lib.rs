//! Core rust implementation of the roster optimizer, a crate for assigning staff to days
//! as a binary integer program.
//!
//! - [`roster`]: validated domain model (staff, days, weights, availability)
//! - [`optimize`]: generic linear and mixed integer problem layer with its solvers
//! - [`schedule`]: builds the roster problem, solves it, and extracts the assignment table
//! - [`io`]: row tables and JSON files
pub mod configuration;
pub mod io;
pub mod optimize;
pub mod roster;
pub mod schedule;
