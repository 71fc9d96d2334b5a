use std::fmt;

use serde::Serialize;

use crate::check::Check;
use crate::data::model::Dataset;

/// Process exit status for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed = 0,
    Failed = 1,
    /// The dataset could not be loaded; no check ran.
    SetupError = 2,
}

impl Status {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    /// Measured median for a passing median check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Failure diagnostic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rows: usize,
    pub columns: usize,
    pub outcomes: Vec<CheckOutcome>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn status(&self) -> Status {
        if self.failed() == 0 {
            Status::Passed
        } else {
            Status::Failed
        }
    }
}

/// Run every check; a failing check never stops the others.
pub fn run_checks(dataset: &Dataset, checks: &[Check]) -> Report {
    let outcomes = checks
        .iter()
        .map(|check| {
            let name = check.to_string();
            match check.run(dataset) {
                Ok(value) => {
                    log::debug!("PASS {name}");
                    CheckOutcome {
                        name,
                        passed: true,
                        value,
                        message: None,
                    }
                }
                Err(e) => {
                    log::warn!("FAIL {name}: {e}");
                    CheckOutcome {
                        name,
                        passed: false,
                        value: None,
                        message: Some(e.to_string()),
                    }
                }
            }
        })
        .collect();

    Report {
        rows: dataset.num_rows(),
        columns: dataset.num_columns(),
        outcomes,
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for o in &self.outcomes {
            if o.passed {
                write!(f, "PASS  {}", o.name)?;
                if let Some(v) = o.value {
                    write!(f, "  [{v:.6}]")?;
                }
                writeln!(f)?;
            } else {
                writeln!(f, "FAIL  {}", o.name)?;
                if let Some(msg) = &o.message {
                    writeln!(f, "      {msg}")?;
                }
            }
        }
        write!(
            f,
            "{} passed, {} failed ({} rows x {} columns)",
            self.passed(),
            self.failed(),
            self.rows,
            self.columns
        )
    }
}
