//! Failure and anomaly types shared by the scanning, transform, and merge stages.
//!
//! Fatal conditions are [`StarError`] values and abort the whole operation
//! before any output is written. Per-row problems that should not block a
//! large file are recorded as [`Anomaly`] values and returned alongside the
//! result so callers can count or inspect them.

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StarError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StarError {
    #[error("Section '{marker}' not found")]
    SectionNotFound { marker: String },
    #[error("No '{loop_token}' block found in section '{marker}'")]
    LoopNotFound { marker: String, loop_token: String },
    #[error("Column {column} not found in section '{section}'")]
    RequiredColumnMissing { column: String, section: String },
    #[error(
        "Target has {target} data row(s) but the sorted source provides {source_rows}; rows would be misaligned"
    )]
    RowCountMismatch { target: usize, source_rows: usize },
    #[error("Column {column} is targeted by more than one transform")]
    ConflictingTransforms { column: String },
}

impl StarError {
    /// True for the structural kinds (missing section or loop marker).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            StarError::SectionNotFound { .. } | StarError::LoopNotFound { .. }
        )
    }
}

/// A tolerated, row-local problem. `line` is the zero-based line index in the
/// document the row came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    TokenConversion {
        line: usize,
        column: String,
        token: String,
    },
    RowShortfall {
        line: usize,
        column: String,
        width: usize,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::TokenConversion {
                line,
                column,
                token,
            } => write!(
                f,
                "line {}: '{}' in {} is not a number; left unchanged",
                line + 1,
                token,
                column
            ),
            Anomaly::RowShortfall {
                line,
                column,
                width,
            } => write!(
                f,
                "line {}: row has {} field(s), too few for {}",
                line + 1,
                width,
                column
            ),
        }
    }
}
