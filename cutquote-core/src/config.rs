//! Configuration constants and pricing settings for the converter.

use crate::error::{QuoteError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Floating-point comparison epsilon.
pub const EPS: f64 = 0.0001;

/// Smallest money increment; prices round up to it.
pub const CENT: f64 = 0.01;

/// Square inches per square foot.
pub const SQ_IN_PER_SQ_FT: f64 = 144.0;

/// First worksheet row holding a part (1-based).
pub const STARTING_ROW: u32 = 6;

/// Row holding the table header labels.
pub const HEADER_ROW: u32 = STARTING_ROW - 1;

/// Visible worksheet name.
pub const MAIN_SHEET: &str = "Sheet";

/// Hidden worksheet holding the reference block.
pub const INFO_SHEET: &str = "info";

/// Structured table name used by the totals formulas.
pub const TABLE_NAME: &str = "Parts";

/// Table style applied by the workbook sink.
pub const TABLE_STYLE: &str = "TableStyleLight8";

/// Number format for money cells.
pub const CURRENCY_FORMAT: &str = "$#,##0.00";

/// Number format for rate cells.
pub const PERCENT_FORMAT: &str = "0%";

/// Number format for measured quantities.
pub const DECIMAL_FORMAT: &str = "0.00";

/// Gauge codes at or above this value are cut from plate stock.
pub const DEFAULT_PLATE_THRESHOLD: u32 = 125;

/// Material label forced on plate-gauge sheets.
pub const DEFAULT_PLATE_LABEL: &str = "Plate";

/// Thumbnail edge length in pixels.
pub const DEFAULT_PICTURE_SIZE: u32 = 80;

/// Output shape of the generated workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Customer-facing price breakdown.
    #[default]
    Quote,
    /// Internal production packet.
    WorkOrder,
}

impl OutputMode {
    /// Title written in the first row of the main sheet.
    pub fn title(&self) -> &'static str {
        match self {
            OutputMode::Quote => "Laser Quote",
            OutputMode::WorkOrder => "Work Order",
        }
    }

    /// Folder the generated workbook belongs in.
    pub fn folder(&self) -> &'static str {
        match self {
            OutputMode::Quote => "quotes",
            OutputMode::WorkOrder => "work orders",
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Quote => write!(f, "quote"),
            OutputMode::WorkOrder => write!(f, "work-order"),
        }
    }
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quote" => Ok(OutputMode::Quote),
            "work-order" | "workorder" | "work_order" => Ok(OutputMode::WorkOrder),
            other => Err(format!(
                "unknown output mode '{}', expected 'quote' or 'work-order'",
                other
            )),
        }
    }
}

/// Material code as printed in the report, and the name shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub code: String,
    pub name: String,
}

/// Gauge code as printed in the report, and its thickness label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeEntry {
    pub code: String,
    pub label: String,
}

/// Sheet stock price for one material/gauge pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub material: String,
    pub gauge: String,
    pub per_pound: f64,
    #[serde(default)]
    pub per_square_foot: f64,
}

/// Assist gas hourly cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasRate {
    pub name: String,
    pub cost_per_hour: f64,
}

/// Reference tables and rates used to resolve reports and price parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub materials: Vec<MaterialEntry>,
    pub gauges: Vec<GaugeEntry>,
    pub prices: Vec<PriceEntry>,
    pub gases: Vec<GasRate>,
    /// Gas selected in the generated workbook.
    pub default_gas: String,
    /// Overhead as a fraction of COGS.
    pub overhead: f64,
    /// Profit margin as a fraction of the selling price.
    pub profit_margin: f64,
    pub plate_threshold: u32,
    pub plate_label: String,
    /// Thumbnail edge length in pixels.
    pub picture_size: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let materials = [
            ("ST", "Mild Steel"),
            ("SS", "304 SS"),
            ("AL", "Aluminium"),
            ("GA", "Galvanized"),
        ]
        .iter()
        .map(|(code, name)| MaterialEntry {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect();

        Self {
            materials,
            gauges: DEFAULT_GAUGES
                .iter()
                .map(|(code, label, _)| GaugeEntry {
                    code: code.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            prices: default_prices(),
            gases: vec![
                GasRate {
                    name: "Nitrogen".to_string(),
                    cost_per_hour: 150.0,
                },
                GasRate {
                    name: "CO2".to_string(),
                    cost_per_hour: 60.0,
                },
            ],
            default_gas: "Nitrogen".to_string(),
            overhead: 0.2,
            profit_margin: 0.3,
            plate_threshold: DEFAULT_PLATE_THRESHOLD,
            plate_label: DEFAULT_PLATE_LABEL.to_string(),
            picture_size: DEFAULT_PICTURE_SIZE,
        }
    }
}

/// Built-in gauges: (report code, label, thickness in inches).
const DEFAULT_GAUGES: [(&str, &str, f64); 11] = [
    ("16", "16 GA", 0.0598),
    ("14", "14 GA", 0.0747),
    ("12", "12 GA", 0.1046),
    ("11", "11 GA", 0.1196),
    ("10", "10 GA", 0.1345),
    ("7", "7 GA", 0.1793),
    ("125", "1/8\"", 0.125),
    ("187", "3/16\"", 0.1875),
    ("250", "1/4\"", 0.25),
    ("375", "3/8\"", 0.375),
    ("500", "1/2\"", 0.5),
];

/// Built-in price per pound and areal density (lb/ft² per inch of thickness).
const DEFAULT_MATERIAL_PRICES: [(&str, f64, f64); 5] = [
    ("Mild Steel", 0.55, 40.8),
    ("304 SS", 2.10, 41.2),
    ("Aluminium", 2.40, 14.1),
    ("Galvanized", 0.70, 40.8),
    (DEFAULT_PLATE_LABEL, 0.60, 40.8),
];

fn default_prices() -> Vec<PriceEntry> {
    let mut prices = Vec::with_capacity(DEFAULT_MATERIAL_PRICES.len() * DEFAULT_GAUGES.len());
    for (material, per_pound, density) in DEFAULT_MATERIAL_PRICES {
        for (_, label, thickness) in DEFAULT_GAUGES {
            let per_square_foot = (per_pound * density * thickness * 100.0).round() / 100.0;
            prices.push(PriceEntry {
                material: material.to_string(),
                gauge: label.to_string(),
                per_pound,
                per_square_foot,
            });
        }
    }
    prices
}

impl PricingConfig {
    /// Load a pricing configuration from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(QuoteError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a pricing configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PricingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the tables are usable for resolution and pricing.
    pub fn validate(&self) -> Result<()> {
        if self.materials.is_empty() {
            return Err(invalid("material table is empty"));
        }
        if self.gauges.is_empty() {
            return Err(invalid("gauge table is empty"));
        }
        if self.gases.is_empty() {
            return Err(invalid("gas table is empty"));
        }
        if !(0.0..1.0).contains(&self.profit_margin) {
            return Err(invalid(format!(
                "profit margin {} must be in [0, 1)",
                self.profit_margin
            )));
        }
        if self.overhead < 0.0 {
            return Err(invalid(format!(
                "overhead {} must not be negative",
                self.overhead
            )));
        }
        if self.gas_rate(&self.default_gas).is_none() {
            return Err(invalid(format!(
                "default gas '{}' is not in the gas table",
                self.default_gas
            )));
        }
        check_unique("material code", self.materials.iter().map(|m| m.code.as_str()))?;
        check_unique("gauge code", self.gauges.iter().map(|g| g.code.as_str()))?;
        check_unique("gas", self.gases.iter().map(|g| g.name.as_str()))?;
        Ok(())
    }

    /// Display name for a report material code.
    pub fn material_name(&self, code: &str) -> Option<&str> {
        self.materials
            .iter()
            .find(|m| m.code.eq_ignore_ascii_case(code.trim()))
            .map(|m| m.name.as_str())
    }

    /// Thickness label for a report gauge code.
    pub fn gauge_label(&self, code: &str) -> Option<&str> {
        self.gauges
            .iter()
            .find(|g| g.code == code.trim())
            .map(|g| g.label.as_str())
    }

    /// Whether a gauge code denotes plate stock.
    pub fn is_plate_gauge(&self, code: &str) -> bool {
        code.trim()
            .parse::<u32>()
            .is_ok_and(|value| value >= self.plate_threshold)
    }

    /// Ordered, de-duplicated material names, including the plate label.
    pub fn material_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.materials.len() + 1);
        for material in &self.materials {
            if !names.contains(&material.name.as_str()) {
                names.push(&material.name);
            }
        }
        if !names.contains(&self.plate_label.as_str()) {
            names.push(&self.plate_label);
        }
        names
    }

    /// Ordered gauge labels.
    pub fn gauge_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::with_capacity(self.gauges.len());
        for gauge in &self.gauges {
            if !labels.contains(&gauge.label.as_str()) {
                labels.push(&gauge.label);
            }
        }
        labels
    }

    /// Price entry for a material name and gauge label.
    pub fn price(&self, material: &str, gauge: &str) -> Option<&PriceEntry> {
        self.prices
            .iter()
            .find(|p| p.material == material && p.gauge == gauge)
    }

    /// Hourly cost of an assist gas.
    pub fn gas_rate(&self, gas: &str) -> Option<f64> {
        self.gases
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(gas))
            .map(|g| g.cost_per_hour)
    }
}

fn invalid(message: impl Into<String>) -> QuoteError {
    QuoteError::InvalidConfig {
        message: message.into(),
    }
}

fn check_unique<'a>(what: &str, values: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(invalid(format!("duplicate {} '{}'", what, value)));
        }
    }
    Ok(())
}

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    use super::EPS;

    /// Check if two floats are approximately equal.
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// Check if a float is approximately zero.
    #[inline]
    pub fn approx_zero(a: f64) -> bool {
        a.abs() < EPS
    }
}
