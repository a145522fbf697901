//! Cut-report text parsing module.

mod fields;
mod report;

pub use fields::{
    coerce, extract, extract_all, normalize, part_name_from_path, FieldError, FieldValue,
    ReportField, ValueKind,
};
pub use report::{parse_header, parse_report, ParsedReport, PartRow, ReportText, SheetHeader};
