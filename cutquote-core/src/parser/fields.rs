//! Field patterns and value coercion for CAM cut-report text.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::error::QuoteError;

/// Kind of extractable datum in a cut report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    PartFilePath,
    MachiningTimeMinutes,
    WeightPounds,
    SurfaceAreaSqIn,
    CuttingLengthIn,
    PiercingTimeSec,
    PartQuantity,
    PartNumber,
    SheetRunCount,
    SheetScrapPercent,
    MaterialIdCode,
    GaugeCode,
    SheetBlankDimensions,
}

/// How a matched value is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Non-negative whole number.
    Integer,
    /// Decimal number.
    Float,
    /// Text, whitespace-collapsed.
    Text,
}

impl ReportField {
    /// Every field, in report order.
    pub const ALL: [ReportField; 13] = [
        ReportField::SheetRunCount,
        ReportField::SheetScrapPercent,
        ReportField::MaterialIdCode,
        ReportField::GaugeCode,
        ReportField::SheetBlankDimensions,
        ReportField::PartFilePath,
        ReportField::MachiningTimeMinutes,
        ReportField::WeightPounds,
        ReportField::PartQuantity,
        ReportField::PartNumber,
        ReportField::SurfaceAreaSqIn,
        ReportField::CuttingLengthIn,
        ReportField::PiercingTimeSec,
    ];

    /// Fields that occur once per part, aligned by position.
    pub const PER_PART: [ReportField; 8] = [
        ReportField::PartFilePath,
        ReportField::MachiningTimeMinutes,
        ReportField::WeightPounds,
        ReportField::PartQuantity,
        ReportField::PartNumber,
        ReportField::SurfaceAreaSqIn,
        ReportField::CuttingLengthIn,
        ReportField::PiercingTimeSec,
    ];

    /// Label printed in front of the value in the report.
    pub fn label(&self) -> &'static str {
        match self {
            ReportField::PartFilePath => "GEOFILE NAME",
            ReportField::MachiningTimeMinutes => "MACHINING TIME",
            ReportField::WeightPounds => "WEIGHT",
            ReportField::SurfaceAreaSqIn => "SURFACE",
            ReportField::CuttingLengthIn => "CUTTING LENGTH",
            ReportField::PiercingTimeSec => "PIERCING TIME",
            ReportField::PartQuantity => "NUMBER",
            ReportField::PartNumber => "PART NUMBER",
            ReportField::SheetRunCount => "PROGRAMME RUNS",
            ReportField::SheetScrapPercent => "SCRAP",
            ReportField::MaterialIdCode => "MATERIAL ID",
            ReportField::GaugeCode => "MATERIAL ID GAUGE",
            ReportField::SheetBlankDimensions => "BLANK",
        }
    }

    /// Coercion applied to this field's matches.
    pub fn kind(&self) -> ValueKind {
        match self {
            ReportField::PartFilePath
            | ReportField::MaterialIdCode
            | ReportField::GaugeCode
            | ReportField::SheetBlankDimensions => ValueKind::Text,
            ReportField::PartQuantity | ReportField::PartNumber | ReportField::SheetRunCount => {
                ValueKind::Integer
            }
            ReportField::MachiningTimeMinutes
            | ReportField::WeightPounds
            | ReportField::SurfaceAreaSqIn
            | ReportField::CuttingLengthIn
            | ReportField::PiercingTimeSec
            | ReportField::SheetScrapPercent => ValueKind::Float,
        }
    }

    /// Whether the field is expected once per part rather than once per report.
    pub fn is_per_part(&self) -> bool {
        Self::PER_PART.contains(self)
    }

    fn pattern(&self) -> &'static Regex {
        &PATTERNS[*self as usize]
    }
}

impl std::fmt::Display for ReportField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Patterns indexed by `ReportField` discriminant. Each has one `v` capture group.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // PartFilePath
        r"GEOFILE NAME:\s*(?P<v>[A-Za-z]:\\(?s:.){1,300}?\.(?i:GEO))\b",
        // MachiningTimeMinutes
        r"MACHINING TIME:\s*(?P<v>\S+)\s*min\b",
        // WeightPounds
        r"WEIGHT:\s*(?P<v>\S+)\s*lb\b",
        // SurfaceAreaSqIn
        r"SURFACE:\s*(?P<v>\S+)\s*in2\b",
        // CuttingLengthIn
        r"CUTTING LENGTH:\s*(?P<v>\S+)\s*in\b",
        // PiercingTimeSec
        r"PIERCING TIME:?\s*(?P<v>\S+)\s*s\b",
        // PartQuantity: two leading spaces keep "PART NUMBER:" out
        r"(?m)(?:^|  )NUMBER:\s*(?P<v>\S+)",
        // PartNumber
        r"PART NUMBER:\s*(?P<v>\S+)",
        // SheetRunCount
        r"PROGRAMME RUNS:\s*/\s*SCRAP:\s*(?P<v>[^\s/]+)",
        // SheetScrapPercent
        r"PROGRAMME RUNS:\s*/\s*SCRAP:\s*[^\s/]+\s*/\s*(?P<v>[^\s%]+)\s*%",
        // MaterialIdCode
        r"MATERIAL ID \(SHEET\):\s*(?P<v>[A-Za-z0-9]+)-\d+",
        // GaugeCode
        r"MATERIAL ID \(SHEET\):\s*[A-Za-z0-9]+-(?P<v>\d+)",
        // SheetBlankDimensions
        r"BLANK:\s*(?P<v>\d+(?:\.\d+)?\s*[xX]\s*\d+(?:\.\d+)?)(?:\s*[xX]\s*\d+(?:\.\d+)?)?",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid report field regex"))
    .collect()
});

/// Typed value extracted from a report.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(u32),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Integer value, if this is one.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Text value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// A matched value that could not be coerced to its field's type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid value for {field}: '{value}'")]
pub struct FieldError {
    pub field: ReportField,
    pub value: String,
}

impl FieldError {
    /// Attach the report file the value came from.
    pub fn in_file(self, file: &str) -> QuoteError {
        QuoteError::InvalidValue {
            file: file.to_string(),
            field: self.field,
            value: self.value,
        }
    }
}

/// Collapse line-continuation artifacts left by the text converter.
///
/// A trailing space before a line break means the line was wrapped mid-value.
pub fn normalize(text: &str) -> String {
    text.replace(" \r\n", " ").replace(" \n", " ")
}

/// Extract every occurrence of `field` from normalized text, in document order.
///
/// An empty result is valid and means the field is absent.
pub fn extract(field: ReportField, text: &str) -> Result<Vec<FieldValue>, FieldError> {
    field
        .pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.name("v").map(|m| coerce(field, m.as_str())))
        .collect()
}

/// Extract every field from normalized text.
pub fn extract_all(text: &str) -> Result<Vec<(ReportField, Vec<FieldValue>)>, FieldError> {
    ReportField::ALL
        .iter()
        .map(|&field| Ok((field, extract(field, text)?)))
        .collect()
}

/// Coerce one raw match into its field's value kind.
pub fn coerce(field: ReportField, raw: &str) -> Result<FieldValue, FieldError> {
    let invalid = || FieldError {
        field,
        value: raw.to_string(),
    };
    match field.kind() {
        ValueKind::Integer => strip_number(raw)
            .parse::<u32>()
            .map(FieldValue::Integer)
            .map_err(|_| invalid()),
        ValueKind::Float => {
            let value = strip_number(raw).parse::<f64>().map_err(|_| invalid())?;
            if value.is_finite() && value >= 0.0 {
                Ok(FieldValue::Float(value))
            } else {
                Err(invalid())
            }
        }
        ValueKind::Text => Ok(FieldValue::Text(
            raw.split_whitespace().collect::<Vec<_>>().join(" "),
        )),
    }
}

/// Drop thousands separators from a numeric token.
fn strip_number(raw: &str) -> String {
    raw.trim().replace(',', "")
}

/// Derive a part name from its GEO file path.
///
/// Keeps the last path segment, drops line breaks, the `.GEO` extension and
/// surrounding whitespace.
pub fn part_name_from_path(path: &str) -> String {
    let segment = path.rsplit(['\\', '/']).next().unwrap_or(path);
    let segment: String = segment.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let trimmed = segment.trim();
    let stem = match trimmed.len().checked_sub(4) {
        Some(cut) if trimmed.is_char_boundary(cut) && trimmed[cut..].eq_ignore_ascii_case(".geo") => {
            &trimmed[..cut]
        }
        _ => trimmed,
    };
    stem.trim().to_string()
}
