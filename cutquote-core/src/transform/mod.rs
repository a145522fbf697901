//! Transformations from parsed reports into the part catalogue.

mod aggregate;

pub use aggregate::{aggregate, resolve_sheet_run, Aggregation, Aggregator};
pub(crate) use aggregate::{total_sheet_count, weighted_scrap_percent};
