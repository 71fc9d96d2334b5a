use std::fmt;

use thiserror::Error;

use crate::data::model::{CellValue, Column, Dataset};
use crate::data::stats::{median, tolerance_bound, within_relative_tolerance};

/// Column count of the January 2022 311 extract.
pub const EXPECTED_COLUMNS: usize = 41;
/// Reference latitude of New York City.
pub const NYC_LATITUDE: f64 = 40.730610;
/// Reference longitude of New York City.
pub const NYC_LONGITUDE: f64 = -73.935242;
pub const RELATIVE_TOLERANCE: f64 = 1e-3;

/// Why a check did not pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    #[error("expected {expected} columns, found {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{column}' row {row}: '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column '{0}' has no numeric values")]
    NoNumericValues(String),

    #[error(
        "median of '{column}' is {median}, expected {expected} ± {bound} (rel {rel_tol})"
    )]
    MedianOutOfTolerance {
        column: String,
        median: f64,
        expected: f64,
        rel_tol: f64,
        bound: f64,
    },
}

/// Pass iff the dataset has exactly `expected` columns.
pub fn check_column_count(dataset: &Dataset, expected: usize) -> Result<(), CheckError> {
    let actual = dataset.num_columns();
    if actual == expected {
        Ok(())
    } else {
        Err(CheckError::ColumnCountMismatch { expected, actual })
    }
}

/// Numeric values of a column.  Missing cells are skipped; any other
/// non-numeric cell is an error.
pub fn numeric_values(column: &Column) -> Result<Vec<f64>, CheckError> {
    let mut out = Vec::with_capacity(column.len());
    for (row, cell) in column.values.iter().enumerate() {
        match cell {
            CellValue::Null => continue,
            other => match other.as_f64() {
                Some(v) => out.push(v),
                None => {
                    return Err(CheckError::NonNumeric {
                        column: column.name.clone(),
                        row,
                        value: other.to_string(),
                    })
                }
            },
        }
    }
    Ok(out)
}

/// Pass iff the median of `column_name` lies within `rel_tol * |expected|`
/// of `expected`.  Returns the median on success.
pub fn check_median_within_tolerance(
    dataset: &Dataset,
    column_name: &str,
    expected: f64,
    rel_tol: f64,
) -> Result<f64, CheckError> {
    let column = dataset
        .column(column_name)
        .ok_or_else(|| CheckError::ColumnNotFound(column_name.to_string()))?;

    let values = numeric_values(column)?;
    let skipped = column.len() - values.len();
    if skipped > 0 {
        log::debug!("'{column_name}': skipped {skipped} missing values");
    }

    let median =
        median(&values).ok_or_else(|| CheckError::NoNumericValues(column_name.to_string()))?;

    if within_relative_tolerance(median, expected, rel_tol) {
        Ok(median)
    } else {
        Err(CheckError::MedianOutOfTolerance {
            column: column_name.to_string(),
            median,
            expected,
            rel_tol,
            bound: tolerance_bound(expected, rel_tol),
        })
    }
}

// ---------------------------------------------------------------------------
// Check – a named, runnable check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    ColumnCount {
        expected: usize,
    },
    MedianWithinTolerance {
        column: String,
        expected: f64,
        rel_tol: f64,
    },
}

impl Check {
    pub fn median(column: impl Into<String>, expected: f64, rel_tol: f64) -> Self {
        Check::MedianWithinTolerance {
            column: column.into(),
            expected,
            rel_tol,
        }
    }

    /// Run against a dataset.  On success, returns the measured median for
    /// median checks and `None` otherwise.
    pub fn run(&self, dataset: &Dataset) -> Result<Option<f64>, CheckError> {
        match self {
            Check::ColumnCount { expected } => {
                check_column_count(dataset, *expected).map(|()| None)
            }
            Check::MedianWithinTolerance {
                column,
                expected,
                rel_tol,
            } => check_median_within_tolerance(dataset, column, *expected, *rel_tol).map(Some),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::ColumnCount { expected } => write!(f, "column count == {expected}"),
            Check::MedianWithinTolerance {
                column,
                expected,
                rel_tol,
            } => write!(f, "median({column}) ≈ {expected} (rel {rel_tol})"),
        }
    }
}

/// The checks run against the 311 January 2022 extract.
pub fn nyc_311_checks() -> Vec<Check> {
    vec![
        Check::ColumnCount {
            expected: EXPECTED_COLUMNS,
        },
        Check::median("Latitude", NYC_LATITUDE, RELATIVE_TOLERANCE),
        Check::median("Longitude", NYC_LONGITUDE, RELATIVE_TOLERANCE),
    ]
}
