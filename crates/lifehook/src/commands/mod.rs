//! Command implementations

pub mod gates;
pub mod run;
