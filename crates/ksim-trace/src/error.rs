//! Error types for input decoding.

use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Errors from decoding one trace line.
///
/// Line numbers are 1-based. A bad line never becomes an event; the caller
/// decides whether to skip it (the CLI reports and continues) or abort.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceError {
    /// Activity name not one of the known event forms
    UnknownActivity {
        /// 1-based trace line
        line: usize,
        /// The unrecognized activity token
        activity: String,
    },
    /// Activity requires a numeric value and none was given
    MissingValue {
        /// 1-based trace line
        line: usize,
        /// Activity that needed the value
        activity: String,
    },
    /// Value present but not a non-negative integer
    BadValue {
        /// 1-based trace line
        line: usize,
        /// The offending value token
        value: String,
    },
    /// EXEC with nothing after the keyword
    EmptyProgramName {
        /// 1-based trace line
        line: usize,
    },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::UnknownActivity { line, activity } => {
                write!(f, "line {}: unknown activity '{}'", line, activity)
            }
            TraceError::MissingValue { line, activity } => {
                write!(f, "line {}: {} requires a numeric value", line, activity)
            }
            TraceError::BadValue { line, value } => {
                write!(f, "line {}: bad numeric value '{}'", line, value)
            }
            TraceError::EmptyProgramName { line } => {
                write!(f, "line {}: EXEC without a program name", line)
            }
        }
    }
}

/// Errors from decoding the static tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableError {
    /// Delay table line is not a non-negative integer
    BadDelay {
        /// 1-based line in the delay file
        line: usize,
        /// The offending token
        value: String,
    },
    /// Catalog line is not `name,size_mb`
    BadCatalogEntry {
        /// 1-based line in the catalog file
        line: usize,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::BadDelay { line, value } => {
                write!(f, "delay table line {}: bad duration '{}'", line, value)
            }
            TableError::BadCatalogEntry { line } => {
                write!(f, "catalog line {}: expected 'name,size_mb'", line)
            }
        }
    }
}
