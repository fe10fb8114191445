//! Error types for numerical primitives.

use thiserror::Error;

pub type NumericsResult<T> = Result<T, NumericsError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NumericsError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid limits: min {min} is greater than max {max}")]
    InvalidLimits { min: f64, max: f64 },

    #[error("Singular transfer function: {what}")]
    Singular { what: &'static str },

    #[error("Lookup table is empty")]
    EmptyTable,

    #[error("Lookup table columns differ in length (index {index}, values {values})")]
    LengthMismatch { index: usize, values: usize },

    #[error("Lookup table index is not strictly increasing")]
    NonMonotonicTable,

    #[error("Lookup table index could not be sorted into strictly increasing order")]
    UnsortableTable,

    #[error("CSV error at line {line}: {what}")]
    Csv { line: usize, what: String },

    #[error("CSV column {column} is missing on line {line}")]
    MissingColumn { column: usize, line: usize },

    #[error("Could not read {path}: {message}")]
    Io { path: String, message: String },
}
