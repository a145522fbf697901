//! Data model for extracted sheet runs and cut parts.

mod catalogue;
mod part;
mod sheet;

pub use catalogue::PartCatalogue;
pub use part::PartRecord;
pub use sheet::{SheetDimensions, SheetRun};
