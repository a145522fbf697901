//! cutquote-core - Core library for turning laser cut reports into priced quotes.
//!
//! This library extracts part data from the text of CAM nesting reports (one
//! report per sheet program), aggregates it into a part catalogue, and lays the
//! catalogue out as a declarative quote or work-order workbook model.
//!
//! # Example
//!
//! ```no_run
//! use cutquote_core::{convert_reports, load_reports, OutputMode, PricingConfig};
//!
//! let reports = load_reports(&["sheet1.txt", "sheet2.txt"]).unwrap();
//! let config = PricingConfig::default();
//! let model = convert_reports(&reports, &config, OutputMode::Quote).unwrap();
//! println!("{}", model.to_json_pretty().unwrap());
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod pricing;
pub mod review;
pub mod transform;
pub mod validation;

use std::path::Path;

// Re-exports for convenience
pub use config::{OutputMode, PricingConfig};
pub use error::{ErrorCode, ErrorKind, QuoteError, Result};
pub use generator::{generate_workbook, CellRef, CellValue, WorkbookModel};
pub use model::{PartCatalogue, PartRecord, SheetDimensions, SheetRun};
pub use parser::{extract, parse_report, ReportField, ReportText};
pub use pricing::{ceil_to, QuoteTotals, RowCosts};
pub use review::ReviewState;
pub use transform::{aggregate, Aggregation, Aggregator};
pub use validation::{validate_review, ValidationResult};

/// Read report text files in the given order.
pub fn load_reports<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ReportText>> {
    paths
        .iter()
        .map(|p| ReportText::load(p.as_ref()))
        .collect()
}

/// Generate a workbook from a review state.
///
/// Validation warnings are logged. Validation errors are logged and stop
/// generation with [`QuoteError::ValidationFailed`].
pub fn generate_from_review(
    state: &ReviewState,
    config: &PricingConfig,
    mode: OutputMode,
) -> Result<WorkbookModel> {
    let validation = validate_review(state, config)?;
    for warning in &validation.warnings {
        tracing::warn!("{}", warning);
    }
    for error in &validation.errors {
        tracing::error!("{}", error);
    }
    if !validation.passed {
        return Err(QuoteError::ValidationFailed {
            errors: validation.errors,
        });
    }

    generate_workbook(&state.parts, &state.sheet_runs, config, mode)
}

/// Convert report texts straight to a workbook model.
///
/// This is the high-level pipeline without a review pause:
/// 1. Aggregate the reports in order
/// 2. Validate the resulting state
/// 3. Generate the layout
pub fn convert_reports(
    reports: &[ReportText],
    config: &PricingConfig,
    mode: OutputMode,
) -> Result<WorkbookModel> {
    let state = ReviewState::from(aggregate(reports, config)?);
    generate_from_review(&state, config, mode)
}
