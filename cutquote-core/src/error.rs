//! Error types for cut-report extraction and workbook layout generation.

use crate::parser::ReportField;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for report processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// File not found (-1)
    FileNotFound = -1,
    /// Empty file (-2)
    EmptyFile = -2,
    /// General parse error (-3)
    ParseError = -3,
    /// Required report field missing (-11)
    MissingField = -11,
    /// Per-part field sequences of different lengths (-12)
    FieldCountMismatch = -12,
    /// Material code has no reference entry (E100)
    UnresolvedMaterial = 100,
    /// Gauge code has no reference entry (E101)
    UnresolvedGauge = 101,
    /// Material/gauge pair has no price entry (E102)
    UnresolvedPrice = 102,
    /// Review edit names a part that is not in the catalogue (E200)
    UnknownPart = 200,
    /// Review state lists a part name twice (E201)
    DuplicatePart = 201,
    /// Review state failed validation (E202)
    ValidationFailed = 202,
    /// Pricing configuration rejected (E300)
    InvalidConfig = 300,
}

/// Top-level category of an error, as surfaced to an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The report text deviates from the documented format.
    MalformedReport,
    /// A material or gauge code, or their price pair, is missing from the
    /// reference tables.
    UnresolvedReference,
    /// A review edit could not be applied.
    Review,
    /// The pricing configuration is unusable.
    Config,
    /// Reading or writing a file failed.
    Io,
}

/// Main error type for the converter.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Empty file: {path}")]
    EmptyFile { path: PathBuf },

    #[error("{file}: missing required field {field}")]
    MissingField { file: String, field: ReportField },

    #[error("{file}: invalid value for {field}: '{value}'")]
    InvalidValue {
        file: String,
        field: ReportField,
        value: String,
    },

    #[error("{file}: {field} matched {observed} time(s), expected {expected} (one per part)")]
    FieldCountMismatch {
        file: String,
        field: ReportField,
        observed: usize,
        expected: usize,
    },

    #[error("{file}: programme run count must be at least 1, got {runs}")]
    InvalidRunCount { file: String, runs: u32 },

    #[error("{file}: material code '{code}' has no entry in the material table")]
    UnresolvedMaterial { file: String, code: String },

    #[error("{file}: gauge code '{code}' has no entry in the gauge table")]
    UnresolvedGauge { file: String, code: String },

    #[error("{file}: no price entry for {material} / {gauge}")]
    UnresolvedPrice {
        file: String,
        material: String,
        gauge: String,
    },

    #[error("{file}: part count {quantity} x {runs} run(s) overflows for {name}")]
    QuantityOverflow {
        file: String,
        name: String,
        quantity: u32,
        runs: u32,
    },

    #[error("Invalid sheet dimensions '{value}': expected 'W x H'")]
    InvalidSheetDimensions { value: String },

    #[error("Part not found in catalogue: {name}")]
    UnknownPart { name: String },

    #[error("Part listed more than once in review state: {name}")]
    DuplicatePart { name: String },

    #[error("Validation failed: {}", errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    #[error("Invalid pricing configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl QuoteError {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            QuoteError::FileNotFound { .. } => ErrorCode::FileNotFound,
            QuoteError::EmptyFile { .. } => ErrorCode::EmptyFile,
            QuoteError::MissingField { .. } => ErrorCode::MissingField,
            QuoteError::InvalidValue { .. } => ErrorCode::ParseError,
            QuoteError::FieldCountMismatch { .. } => ErrorCode::FieldCountMismatch,
            QuoteError::InvalidRunCount { .. } => ErrorCode::ParseError,
            QuoteError::UnresolvedMaterial { .. } => ErrorCode::UnresolvedMaterial,
            QuoteError::UnresolvedGauge { .. } => ErrorCode::UnresolvedGauge,
            QuoteError::UnresolvedPrice { .. } => ErrorCode::UnresolvedPrice,
            QuoteError::QuantityOverflow { .. } => ErrorCode::ParseError,
            QuoteError::InvalidSheetDimensions { .. } => ErrorCode::ParseError,
            QuoteError::UnknownPart { .. } => ErrorCode::UnknownPart,
            QuoteError::DuplicatePart { .. } => ErrorCode::DuplicatePart,
            QuoteError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            QuoteError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            QuoteError::Io(_) => ErrorCode::FileNotFound,
            QuoteError::Json(_) => ErrorCode::ParseError,
            QuoteError::Toml(_) => ErrorCode::InvalidConfig,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }

    /// Get the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuoteError::MissingField { .. }
            | QuoteError::InvalidValue { .. }
            | QuoteError::FieldCountMismatch { .. }
            | QuoteError::InvalidRunCount { .. }
            | QuoteError::QuantityOverflow { .. }
            | QuoteError::InvalidSheetDimensions { .. } => ErrorKind::MalformedReport,
            QuoteError::UnresolvedMaterial { .. }
            | QuoteError::UnresolvedGauge { .. }
            | QuoteError::UnresolvedPrice { .. } => ErrorKind::UnresolvedReference,
            QuoteError::UnknownPart { .. }
            | QuoteError::DuplicatePart { .. }
            | QuoteError::ValidationFailed { .. }
            | QuoteError::Json(_) => ErrorKind::Review,
            QuoteError::InvalidConfig { .. } | QuoteError::Toml(_) => ErrorKind::Config,
            QuoteError::FileNotFound { .. } | QuoteError::EmptyFile { .. } | QuoteError::Io(_) => {
                ErrorKind::Io
            }
        }
    }

    /// Whether this error means the report text itself is malformed.
    pub fn is_malformed_report(&self) -> bool {
        self.kind() == ErrorKind::MalformedReport
    }
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, QuoteError>;
