//! Sheet run - metadata of one nested sheet program report.

use crate::error::{QuoteError, Result};
use serde::{Deserialize, Serialize};

/// One input report file's sheet metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetRun {
    /// Source report file name.
    pub source: String,
    /// Number of times the nested sheet program runs.
    pub quantity_multiplier: u32,
    /// Scrap percentage of the sheet.
    pub scrap_percent: f64,
    /// Resolved material name.
    pub material: String,
    /// Resolved gauge label.
    pub gauge: String,
    /// Raw "W x H" blank dimensions.
    pub sheet_dim: String,
}

impl SheetRun {
    /// Parse the blank dimensions.
    pub fn dimensions(&self) -> Result<SheetDimensions> {
        self.sheet_dim.parse()
    }
}

/// Sheet blank size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetDimensions {
    pub width: f64,
    pub height: f64,
}

impl SheetDimensions {
    /// Blank area in square inches.
    pub fn area_sq_in(&self) -> f64 {
        self.width * self.height
    }
}

impl std::str::FromStr for SheetDimensions {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || QuoteError::InvalidSheetDimensions {
            value: s.to_string(),
        };
        let (width, height) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: f64 = width.trim().parse().map_err(|_| invalid())?;
        let height: f64 = height.trim().parse().map_err(|_| invalid())?;
        if width <= 0.0 || height <= 0.0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl std::fmt::Display for SheetDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} x {:.3}", self.width, self.height)
    }
}
