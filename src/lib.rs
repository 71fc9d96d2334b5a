//! Shape and geographic sanity checks for the NYC 311 service-request
//! extract (January 2022).
//!
//! Load the table with [`data::loader::load_file`], then run
//! [`check::nyc_311_checks`] through [`report::run_checks`].

pub mod check;
pub mod data;
pub mod report;
pub mod sample;
pub mod schema;

/// Path of the extract, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "311_jan_2022.csv";
