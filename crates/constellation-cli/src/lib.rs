//! Command-line front end for star selection

pub mod input;
pub mod output;
