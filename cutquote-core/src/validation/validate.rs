//! Validation of a review state before layout generation.

use crate::config::float_cmp::approx_zero;
use crate::config::PricingConfig;
use crate::error::Result;
use crate::model::{PartRecord, SheetRun};
use crate::review::ReviewState;

/// Validation result with warnings.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Whether validation passed.
    pub passed: bool,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Error messages.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn ok() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    /// Add a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Add an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.passed = false;
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        if !other.passed {
            self.passed = false;
        }
    }
}

/// Validate a review state against the pricing tables it will be laid out with.
///
/// An empty catalogue passes; it renders as an empty table.
pub fn validate_review(state: &ReviewState, config: &PricingConfig) -> Result<ValidationResult> {
    let mut result = ValidationResult::ok();

    for run in &state.sheet_runs {
        result.merge(validate_sheet_run(run, config));
    }

    for part in state.parts.iter() {
        result.merge(validate_part(part, config));
    }

    // Image indices must be exactly 0..N in some order.
    let mut indices: Vec<usize> = state.parts.iter().map(|p| p.image_index).collect();
    indices.sort_unstable();
    if indices.iter().enumerate().any(|(i, &idx)| i != idx) {
        result.add_error(format!(
            "Image indices are not a dense 0-based sequence: {:?}",
            indices
        ));
    }

    if state.parts.is_empty() {
        tracing::info!("No parts to validate");
    }

    Ok(result)
}

/// Validate one sheet run.
pub fn validate_sheet_run(run: &SheetRun, config: &PricingConfig) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if config.price(&run.material, &run.gauge).is_none() {
        result.add_error(format!(
            "Sheet run {}: No price entry for '{}' / '{}'",
            run.source, run.material, run.gauge
        ));
    }

    if run.quantity_multiplier == 0 {
        result.add_error(format!("Sheet run {}: Run count is zero", run.source));
    }

    if run.scrap_percent >= 100.0 {
        result.add_warning(format!(
            "Sheet run {}: Scrap {:.2}% leaves no usable material",
            run.source, run.scrap_percent
        ));
    }

    if let Err(e) = run.dimensions() {
        result.add_warning(format!("Sheet run {}: {}", run.source, e));
    }

    result
}

/// Validate a single part.
///
/// A material/gauge pair without a price entry is an error: the row would
/// otherwise price its stock at nothing.
pub fn validate_part(part: &PartRecord, config: &PricingConfig) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if config.price(&part.material, &part.gauge).is_none() {
        result.add_error(format!(
            "Part {}: No price entry for '{}' / '{}'",
            part.name, part.material, part.gauge
        ));
    }

    if part.quantity == 0 {
        result.add_warning(format!("Part {}: Quantity is zero", part.name));
    }

    if approx_zero(part.weight_lb) {
        result.add_warning(format!("Part {}: Missing or zero weight", part.name));
    }

    if part.material.trim().is_empty() {
        result.add_warning(format!("Part {}: No material", part.name));
    }

    result
}
