//! Review state validation.

mod validate;

pub use validate::{validate_part, validate_review, validate_sheet_run, ValidationResult};
