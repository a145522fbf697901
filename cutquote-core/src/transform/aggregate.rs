//! Part aggregation across sheet-run reports.

use crate::config::PricingConfig;
use crate::error::{QuoteError, Result};
use crate::model::{PartCatalogue, PartRecord, SheetRun};
use crate::parser::{parse_report, ReportText, SheetHeader};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Part catalogue plus one sheet run per input report, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub catalogue: PartCatalogue,
    pub sheet_runs: Vec<SheetRun>,
}

impl Aggregation {
    /// Number of sheets cut across every run.
    pub fn total_sheet_count(&self) -> u32 {
        total_sheet_count(&self.sheet_runs)
    }

    /// Scrap percentage averaged over sheets.
    pub fn weighted_scrap_percent(&self) -> f64 {
        weighted_scrap_percent(&self.sheet_runs)
    }
}

/// Number of sheets cut across every run.
pub(crate) fn total_sheet_count(runs: &[SheetRun]) -> u32 {
    runs.iter().map(|r| r.quantity_multiplier).sum()
}

/// Scrap percentage averaged over sheets; zero without runs.
pub(crate) fn weighted_scrap_percent(runs: &[SheetRun]) -> f64 {
    let sheets = total_sheet_count(runs);
    if sheets == 0 {
        return 0.0;
    }
    let weighted: f64 = runs
        .iter()
        .map(|r| r.scrap_percent * r.quantity_multiplier as f64)
        .sum();
    weighted / sheets as f64
}

/// Builds the part catalogue one report at a time.
///
/// Reports must be added in file-selection order: quantities of a repeated part
/// are summed, while every other attribute is taken from the last report that
/// lists it.
pub struct Aggregator<'a> {
    config: &'a PricingConfig,
    catalogue: PartCatalogue,
    sheet_runs: Vec<SheetRun>,
    next_image_index: usize,
}

impl<'a> Aggregator<'a> {
    /// Create an empty aggregator resolving codes against `config`.
    pub fn new(config: &'a PricingConfig) -> Self {
        Self {
            config,
            catalogue: PartCatalogue::new(),
            sheet_runs: Vec::new(),
            next_image_index: 0,
        }
    }

    /// Parse one report and merge its parts into the catalogue.
    ///
    /// On error nothing from this report is merged.
    pub fn add_report(&mut self, report: &ReportText) -> Result<&SheetRun> {
        let parsed = parse_report(report)?;
        let run = resolve_sheet_run(&parsed.source, &parsed.header, self.config)?;

        tracing::info!(
            "{}: {} part(s), {} run(s), {} {}",
            run.source,
            parsed.parts.len(),
            run.quantity_multiplier,
            run.material,
            run.gauge
        );

        // Quantities are settled up front so an overflow leaves the catalogue untouched.
        let mut pending: HashMap<&str, u32> = HashMap::new();
        let mut quantities = Vec::with_capacity(parsed.parts.len());
        for row in &parsed.parts {
            let current = pending
                .get(row.name.as_str())
                .copied()
                .or_else(|| self.catalogue.get(&row.name).map(|p| p.quantity))
                .unwrap_or(0);
            let total = row
                .quantity
                .checked_mul(run.quantity_multiplier)
                .and_then(|added| current.checked_add(added))
                .ok_or_else(|| QuoteError::QuantityOverflow {
                    file: run.source.clone(),
                    name: row.name.clone(),
                    quantity: row.quantity,
                    runs: run.quantity_multiplier,
                })?;
            pending.insert(row.name.as_str(), total);
            quantities.push(total);
        }

        for (row, quantity) in parsed.parts.into_iter().zip(quantities) {
            let next_index = self.next_image_index;
            let (part, created) = self
                .catalogue
                .entry_or_insert_with(&row.name, || PartRecord::new(&row.name, next_index, &run));
            if created {
                self.next_image_index += 1;
            } else {
                tracing::debug!("{}: {} seen again, summing quantity", run.source, row.name);
            }

            part.quantity = quantity;
            part.machine_time_min = row.machine_time_min;
            part.weight_lb = row.weight_lb;
            part.surface_area_in2 = row.surface_area_in2;
            part.cutting_length_in = row.cutting_length_in;
            part.piercing_time_sec = row.piercing_time_sec;
            part.part_number = row.part_number;
            part.set_sheet_run(&run);
        }

        self.sheet_runs.push(run);
        Ok(&self.sheet_runs[self.sheet_runs.len() - 1])
    }

    /// Number of reports merged so far.
    pub fn report_count(&self) -> usize {
        self.sheet_runs.len()
    }

    /// Finish aggregation.
    pub fn finish(self) -> Aggregation {
        if self.catalogue.is_empty() {
            tracing::warn!("No parts found in {} report(s)", self.sheet_runs.len());
        }
        Aggregation {
            catalogue: self.catalogue,
            sheet_runs: self.sheet_runs,
        }
    }
}

/// Resolve a report's sheet header against the material and gauge tables.
///
/// A gauge at or above the plate threshold is labelled with the plate material
/// whatever the material code resolves to. The resolved pair must have a price
/// entry.
pub fn resolve_sheet_run(
    source: &str,
    header: &SheetHeader,
    config: &PricingConfig,
) -> Result<SheetRun> {
    let material = config
        .material_name(&header.material_code)
        .ok_or_else(|| QuoteError::UnresolvedMaterial {
            file: source.to_string(),
            code: header.material_code.clone(),
        })?;
    let gauge = config
        .gauge_label(&header.gauge_code)
        .ok_or_else(|| QuoteError::UnresolvedGauge {
            file: source.to_string(),
            code: header.gauge_code.clone(),
        })?;

    let material = if config.is_plate_gauge(&header.gauge_code) {
        config.plate_label.as_str()
    } else {
        material
    };

    if config.price(material, gauge).is_none() {
        return Err(QuoteError::UnresolvedPrice {
            file: source.to_string(),
            material: material.to_string(),
            gauge: gauge.to_string(),
        });
    }

    Ok(SheetRun {
        source: source.to_string(),
        quantity_multiplier: header.runs,
        scrap_percent: header.scrap_percent,
        material: material.to_string(),
        gauge: gauge.to_string(),
        sheet_dim: header.sheet_dim.clone(),
    })
}

/// Aggregate reports in the given order into a part catalogue and sheet runs.
pub fn aggregate(reports: &[ReportText], config: &PricingConfig) -> Result<Aggregation> {
    let mut aggregator = Aggregator::new(config);
    for report in reports {
        aggregator.add_report(report)?;
    }
    Ok(aggregator.finish())
}
