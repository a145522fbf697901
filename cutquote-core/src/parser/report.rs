//! Per-file report parsing: sheet header fields and positionally aligned part rows.

use crate::error::{QuoteError, Result};
use std::path::Path;

use super::fields::{extract, part_name_from_path, FieldValue, ReportField};

/// Normalized text of one cut report, tagged with its source file name.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportText {
    /// Source file name; identifies the sheet run.
    pub source: String,
    /// Normalized report text.
    pub text: String,
}

impl ReportText {
    /// Wrap raw converter output, normalizing line-wrap artifacts.
    pub fn new(source: impl Into<String>, raw: &str) -> Self {
        Self {
            source: source.into(),
            text: super::fields::normalize(raw),
        }
    }

    /// Read a text report from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QuoteError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Err(QuoteError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        let source = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("report.txt");
        Ok(Self::new(source, &content))
    }
}

/// Once-per-report fields, before reference resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetHeader {
    pub runs: u32,
    pub scrap_percent: f64,
    pub material_code: String,
    pub gauge_code: String,
    pub sheet_dim: String,
}

/// One part's values as printed in a single report.
#[derive(Debug, Clone, PartialEq)]
pub struct PartRow {
    pub name: String,
    /// Quantity per sheet, before the run multiplier.
    pub quantity: u32,
    pub machine_time_min: f64,
    pub weight_lb: f64,
    pub part_number: u32,
    pub surface_area_in2: f64,
    pub cutting_length_in: f64,
    pub piercing_time_sec: f64,
}

/// Everything extracted from one report file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub source: String,
    pub header: SheetHeader,
    pub parts: Vec<PartRow>,
}

/// Parse one report into its header and aligned part rows.
///
/// Every per-part field must match exactly as many times as there are part
/// file paths; the Nth match of each field belongs to the Nth part.
pub fn parse_report(report: &ReportText) -> Result<ParsedReport> {
    let file = report.source.as_str();
    let header = parse_header(report)?;

    let names: Vec<String> = extract_field(report, ReportField::PartFilePath)?
        .iter()
        .filter_map(FieldValue::as_str)
        .map(part_name_from_path)
        .collect();
    let expected = names.len();

    let mut columns = Vec::with_capacity(ReportField::PER_PART.len() - 1);
    for field in ReportField::PER_PART
        .into_iter()
        .filter(|f| *f != ReportField::PartFilePath)
    {
        let values = extract_field(report, field)?;
        if values.len() != expected {
            return Err(QuoteError::FieldCountMismatch {
                file: file.to_string(),
                field,
                observed: values.len(),
                expected,
            });
        }
        columns.push((field, values));
    }

    let floats = |field: ReportField, i: usize| {
        column_value(&columns, field, i)
            .and_then(FieldValue::as_f64)
            .unwrap_or_default()
    };
    let ints = |field: ReportField, i: usize| {
        column_value(&columns, field, i)
            .and_then(FieldValue::as_u32)
            .unwrap_or_default()
    };

    let parts = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| PartRow {
            name,
            quantity: ints(ReportField::PartQuantity, i),
            machine_time_min: floats(ReportField::MachiningTimeMinutes, i),
            weight_lb: floats(ReportField::WeightPounds, i),
            part_number: ints(ReportField::PartNumber, i),
            surface_area_in2: floats(ReportField::SurfaceAreaSqIn, i),
            cutting_length_in: floats(ReportField::CuttingLengthIn, i),
            piercing_time_sec: floats(ReportField::PiercingTimeSec, i),
        })
        .collect();

    Ok(ParsedReport {
        source: report.source.clone(),
        header,
        parts,
    })
}

/// Parse the once-per-report sheet fields.
pub fn parse_header(report: &ReportText) -> Result<SheetHeader> {
    let runs = first_value(report, ReportField::SheetRunCount)?
        .as_u32()
        .unwrap_or_default();
    if runs == 0 {
        return Err(QuoteError::InvalidRunCount {
            file: report.source.clone(),
            runs,
        });
    }

    let scrap_percent = first_value(report, ReportField::SheetScrapPercent)?
        .as_f64()
        .unwrap_or_default();
    let material_code = first_text(report, ReportField::MaterialIdCode)?;
    let gauge_code = first_text(report, ReportField::GaugeCode)?;
    let sheet_dim = first_text(report, ReportField::SheetBlankDimensions)?;

    Ok(SheetHeader {
        runs,
        scrap_percent,
        material_code,
        gauge_code,
        sheet_dim,
    })
}

fn column_value(
    columns: &[(ReportField, Vec<FieldValue>)],
    field: ReportField,
    i: usize,
) -> Option<&FieldValue> {
    columns
        .iter()
        .find(|(f, _)| *f == field)
        .and_then(|(_, values)| values.get(i))
}

fn extract_field(report: &ReportText, field: ReportField) -> Result<Vec<FieldValue>> {
    let values = extract(field, &report.text).map_err(|e| e.in_file(&report.source))?;
    tracing::debug!("{}: {} matched {} time(s)", report.source, field, values.len());
    Ok(values)
}

/// First match of a once-per-report field; later matches are ignored.
fn first_value(report: &ReportText, field: ReportField) -> Result<FieldValue> {
    let mut values = extract_field(report, field)?;
    if values.len() > 1 {
        tracing::warn!(
            "{}: {} appears {} times, using the first",
            report.source,
            field,
            values.len()
        );
    }
    if values.is_empty() {
        return Err(QuoteError::MissingField {
            file: report.source.clone(),
            field,
        });
    }
    Ok(values.swap_remove(0))
}

fn first_text(report: &ReportText, field: ReportField) -> Result<String> {
    match first_value(report, field)? {
        FieldValue::Text(text) => Ok(text),
        other => Ok(other.as_f64().map(|v| v.to_string()).unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "PROGRAMME RUNS:  /  SCRAP: 2  /  18.40 %\n\
                          MATERIAL ID (SHEET): ST-16\n\
                          BLANK: 48.000 x 96.000 x 0.060\n";

    fn part_block(path: &str, qty: u32, weight: f64) -> String {
        format!(
            "GEOFILE NAME: C:\\Parts\\{path}\n\
             PART NUMBER: 1\n  NUMBER: {qty}\n\
             MACHINING TIME: 1.25 min\nWEIGHT: {weight} lb\n\
             SURFACE: 20.00  in2\nCUTTING LENGTH: 30.50  in\nPIERCING TIME 2.00  s\n"
        )
    }

    #[test]
    fn test_parse_report_aligned() {
        let text = format!(
            "{HEADER}{}{}",
            part_block("A.GEO", 3, 1.5),
            part_block("B.GEO", 1, 0.5)
        );
        let parsed = parse_report(&ReportText::new("sheet.txt", &text)).expect("valid");
        assert_eq!(parsed.header.runs, 2);
        assert_eq!(parsed.header.material_code, "ST");
        assert_eq!(parsed.header.gauge_code, "16");
        assert_eq!(parsed.header.sheet_dim, "48.000 x 96.000");
        assert_eq!(parsed.parts.len(), 2);
        assert_eq!(parsed.parts[0].name, "A");
        assert_eq!(parsed.parts[0].quantity, 3);
        assert_eq!(parsed.parts[1].name, "B");
        assert!((parsed.parts[1].weight_lb - 0.5).abs() < 1e-9);
        assert!((parsed.parts[1].cutting_length_in - 30.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_report_without_parts() {
        let parsed = parse_report(&ReportText::new("empty.txt", HEADER)).expect("valid");
        assert!(parsed.parts.is_empty());
    }

    #[test]
    fn test_parse_report_count_mismatch() {
        let text = format!(
            "{HEADER}{}GEOFILE NAME: C:\\Parts\\C.GEO\n",
            part_block("A.GEO", 3, 1.5)
        );
        let err = parse_report(&ReportText::new("bad.txt", &text)).unwrap_err();
        match err {
            QuoteError::FieldCountMismatch {
                file,
                observed,
                expected,
                ..
            } => {
                assert_eq!(file, "bad.txt");
                assert_eq!(observed, 1);
                assert_eq!(expected, 2);
            }
            other => panic!("Expected FieldCountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_run_count_is_missing_field() {
        let text = "MATERIAL ID (SHEET): ST-16\nBLANK: 48 x 96\n";
        let err = parse_report(&ReportText::new("x.txt", text)).unwrap_err();
        assert!(matches!(
            err,
            QuoteError::MissingField {
                field: ReportField::SheetRunCount,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_runs_rejected() {
        let text = HEADER.replace("SCRAP: 2", "SCRAP: 0");
        let err = parse_report(&ReportText::new("x.txt", &text)).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidRunCount { runs: 0, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ReportText::load(Path::new("/nonexistent/report.txt")).unwrap_err();
        assert!(matches!(err, QuoteError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "  \n").expect("write");
        let err = ReportText::load(&path).unwrap_err();
        assert!(matches!(err, QuoteError::EmptyFile { .. }));
    }
}
