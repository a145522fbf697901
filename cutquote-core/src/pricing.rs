//! Native evaluation of the quote cost algebra.
//!
//! Mirrors the formulas emitted by the layout generator so a quote can be
//! summarized without a spreadsheet engine.

use crate::config::{PricingConfig, CENT, SQ_IN_PER_SQ_FT};
use crate::error::{QuoteError, Result};
use crate::model::{PartCatalogue, PartRecord, SheetRun};
use crate::transform::Aggregation;
use serde::Serialize;

/// Round `value` up to the next multiple of `step`.
///
/// Float noise just above a multiple (e.g. `20.000000000004`) does not bump the
/// result to the next step.
pub fn ceil_to(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    let steps = value / step;
    let nearest = steps.round();
    if (steps - nearest).abs() < 1e-9 {
        nearest * step
    } else {
        steps.ceil() * step
    }
}

/// Cost breakdown of one catalogue row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RowCosts {
    pub cost_for_weight: f64,
    pub cost_for_time: f64,
    pub cogs: f64,
    pub overhead: f64,
    pub unit_price: f64,
    pub price: f64,
    pub total_cost: f64,
}

impl RowCosts {
    /// Price one part with the given assist gas.
    ///
    /// A material/gauge pair without a price entry costs nothing for weight and
    /// an unknown gas costs nothing for time. Review validation rejects the
    /// former before a workbook is generated.
    pub fn compute(part: &PartRecord, config: &PricingConfig, gas: &str) -> Self {
        let per_pound = config
            .price(&part.material, &part.gauge)
            .map(|p| p.per_pound)
            .unwrap_or_default();
        let per_hour = config.gas_rate(gas).unwrap_or_default();

        let cost_for_weight = per_pound * part.weight_lb;
        let cost_for_time = (per_hour / 60.0) * part.machine_time_min;
        let cogs = cost_for_weight + cost_for_time;
        let overhead = cogs * config.overhead;
        let unit_price = ceil_to((cogs + overhead) / (1.0 - config.profit_margin), CENT);
        let price = ceil_to(part.quantity as f64 * unit_price, CENT);
        let total_cost = ceil_to(cogs + overhead, CENT);

        Self {
            cost_for_weight,
            cost_for_time,
            cogs,
            overhead,
            unit_price,
            price,
            total_cost,
        }
    }
}

/// Totals row of a quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QuoteTotals {
    pub machine_time_min: f64,
    pub weight_lb: f64,
    pub quantity: u64,
    pub cogs: f64,
    pub overhead: f64,
    pub price: f64,
    pub total_cost: f64,
    pub surface_area_in2: f64,
    pub cutting_length_in: f64,
    pub piercing_time_sec: f64,
    pub sheet_count: u32,
    pub sheet_cost: f64,
}

impl QuoteTotals {
    /// Evaluate the totals row over every part.
    pub fn compute(
        catalogue: &PartCatalogue,
        sheet_runs: &[SheetRun],
        config: &PricingConfig,
        gas: &str,
    ) -> Result<Self> {
        let mut totals = QuoteTotals::default();

        for part in catalogue {
            let qty = part.quantity as f64;
            let costs = RowCosts::compute(part, config, gas);
            totals.machine_time_min += part.total_machine_time();
            totals.weight_lb += part.total_weight();
            totals.quantity += part.quantity as u64;
            totals.cogs += costs.cogs;
            totals.overhead += costs.overhead;
            totals.price += costs.price;
            totals.total_cost += costs.total_cost;
            totals.surface_area_in2 += part.surface_area_in2 * qty;
            totals.cutting_length_in += part.cutting_length_in * qty;
            totals.piercing_time_sec += part.piercing_time_sec * qty;
        }

        totals.sheet_count = crate::transform::total_sheet_count(sheet_runs);
        totals.sheet_cost = sheet_cost(sheet_runs, config)?;
        Ok(totals)
    }

    /// Evaluate the totals row of an aggregation.
    pub fn for_aggregation(
        aggregation: &Aggregation,
        config: &PricingConfig,
        gas: &str,
    ) -> Result<Self> {
        Self::compute(&aggregation.catalogue, &aggregation.sheet_runs, config, gas)
    }
}

/// Stock cost of every sheet, priced from the last run's blank and material.
///
/// Fails when the last run's material/gauge pair has no price entry.
pub fn sheet_cost(sheet_runs: &[SheetRun], config: &PricingConfig) -> Result<f64> {
    let Some(last) = sheet_runs.last() else {
        return Ok(0.0);
    };
    let dims = last.dimensions()?;
    let per_square_foot = config
        .price(&last.material, &last.gauge)
        .map(|p| p.per_square_foot)
        .ok_or_else(|| QuoteError::UnresolvedPrice {
            file: last.source.clone(),
            material: last.material.clone(),
            gauge: last.gauge.clone(),
        })?;
    let sheets = crate::transform::total_sheet_count(sheet_runs) as f64;
    Ok(ceil_to(
        dims.area_sq_in() / SQ_IN_PER_SQ_FT * per_square_foot * sheets,
        CENT,
    ))
}
