use std::borrow::Cow;
use std::fmt;
use std::io;

/// Result type alias for salesq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for salesq operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Polars errors raised while reading the source table
    #[error("CSV error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// A row could not be turned into a record
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A percentage or growth figure has a zero denominator
    #[error("Division error: {0}")]
    Division(#[from] DivisionError),

    /// The source table lacks a required column
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The source table is larger than the configured ceiling
    #[error("Row limit exceeded: {rows} rows, limit is {limit}")]
    RowLimit {
        /// Rows in the source table
        rows: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// Lookup of a group key that is not part of the result
    #[error("Unknown group key: {0}")]
    KeyNotFound(String),

    /// Caller passed an argument outside the accepted range
    #[error("Invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A malformed or missing field in one source row
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Zero-based index of the data row (header excluded)
    pub row: usize,
    /// Source column name
    pub column: &'static str,
    /// What was wrong with the field
    pub reason: ParseReason,
}

/// Why a field failed to parse
#[derive(Debug, Clone, PartialEq)]
pub enum ParseReason {
    /// The field was empty or null
    Missing,
    /// The field did not match the expected date format
    InvalidDate(String),
    /// The field is not a number
    InvalidAmount(String),
    /// The amount is below zero
    NegativeAmount(f64),
}

/// Zero denominator in a percentage or growth computation
#[derive(Debug, Clone, PartialEq)]
pub struct DivisionError {
    /// Which figure was being computed
    pub context: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column '{}': ", self.row, self.column)?;
        match &self.reason {
            ParseReason::Missing => write!(f, "value is missing"),
            ParseReason::InvalidDate(value) => write!(f, "invalid date '{value}'"),
            ParseReason::InvalidAmount(value) => write!(f, "invalid amount '{value}'"),
            ParseReason::NegativeAmount(value) => write!(f, "negative amount {value}"),
        }
    }
}

impl fmt::Display for DivisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zero denominator in {}", self.context)
    }
}

impl std::error::Error for ParseError {}
impl std::error::Error for DivisionError {}

// Helper functions for creating common errors
impl Error {
    /// Create an invalid argument error with a custom message
    pub fn invalid_argument(msg: impl Into<Cow<'static, str>>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a configuration error with a custom message
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a division error for the named figure
    pub fn division(context: impl Into<String>) -> Self {
        Error::Division(DivisionError {
            context: context.into(),
        })
    }

    /// Whether this error only invalidates a single figure
    #[must_use]
    pub fn is_division(&self) -> bool {
        matches!(self, Error::Division(_))
    }
}

impl ParseError {
    /// Create a parse error for a missing field
    pub fn missing(row: usize, column: &'static str) -> Self {
        ParseError {
            row,
            column,
            reason: ParseReason::Missing,
        }
    }
}
