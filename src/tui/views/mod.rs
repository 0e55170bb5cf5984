//! Panels of the main screen

pub mod chart;
pub mod results;
