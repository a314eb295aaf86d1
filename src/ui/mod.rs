//! CodeFlux CLI output styling.

pub mod style;
