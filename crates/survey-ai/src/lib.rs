//! Backend core for the two-variant AI-likeness email survey.

pub mod config;
pub mod error;
pub mod survey;
pub mod telemetry;
