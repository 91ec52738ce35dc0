//! Module for reading roster tables and writing assignment tables
pub mod json;
pub mod tables;
