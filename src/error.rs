//! Error types for rule learning and prediction.

use core::fmt;

/// # Overview
///
/// Errors that can occur when building datasets, training a ruleset or
/// applying a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    NoAttributes,
    ContinuousClass,
    EmptyClassDomain,
    DuplicateLabel(String),
    DimensionMismatch { expected: usize, got: usize },
    AttributeMissing(String),
    EmptyDataset,
    InvalidFolds,
    InvalidMinNo,
    NumericAnomaly
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAttributes => write!(f, "schema must contain at least the class attribute"),
            Self::ContinuousClass => write!(f, "class attribute must be discrete"),
            Self::EmptyClassDomain => write!(f, "class attribute must have a non-empty domain"),
            Self::DuplicateLabel(label) => {
                write!(f, "duplicate label {label:?} in a discrete domain")
            }
            Self::DimensionMismatch {
                expected,
                got
            } => {
                write!(f, "row length mismatch: expected {expected}, got {got}")
            }
            Self::AttributeMissing(name) => {
                write!(f, "input data has no attribute equivalent to {name:?}")
            }
            Self::EmptyDataset => write!(f, "dataset cannot be empty"),
            Self::InvalidFolds => write!(f, "folds must be at least 2"),
            Self::InvalidMinNo => write!(f, "min_no must be a positive finite number"),
            Self::NumericAnomaly => {
                write!(f, "description length became NaN or infinite during training")
            }
        }
    }
}

impl std::error::Error for Error {}

/// # Overview
///
/// Result type for rule learning operations.
pub type Result<T> = core::result::Result<T, Error>;
