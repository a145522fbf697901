//! Review state - the aggregation persisted between extraction and layout.
//!
//! A reviewer may change quantities, recut flags and materials before the
//! workbook is generated. The layout generator always reads a freshly loaded
//! state.

use crate::error::{QuoteError, Result};
use crate::model::{PartCatalogue, PartRecord, SheetRun};
use crate::transform::Aggregation;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editable snapshot of one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub sheet_runs: Vec<SheetRun>,
    pub parts: PartCatalogue,
}

impl ReviewState {
    /// Load a review state from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
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
        let state: ReviewState = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded review state: {} part(s), {} sheet run(s)",
            state.parts.len(),
            state.sheet_runs.len()
        );
        Ok(state)
    }

    /// Write the review state as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Number of sheets cut across every run.
    pub fn total_sheet_count(&self) -> u32 {
        crate::transform::total_sheet_count(&self.sheet_runs)
    }

    /// Scrap percentage averaged over sheets.
    pub fn weighted_scrap_percent(&self) -> f64 {
        crate::transform::weighted_scrap_percent(&self.sheet_runs)
    }

    /// Replace a part's quantity.
    pub fn set_quantity(&mut self, name: &str, quantity: u32) -> Result<()> {
        self.part_mut(name)?.quantity = quantity;
        Ok(())
    }

    /// Flip a part's recut flag and return the new value.
    pub fn toggle_recut(&mut self, name: &str) -> Result<bool> {
        let part = self.part_mut(name)?;
        part.recut = !part.recut;
        Ok(part.recut)
    }

    pub fn set_recut(&mut self, name: &str, recut: bool) -> Result<()> {
        self.part_mut(name)?.recut = recut;
        Ok(())
    }

    /// Apply one material to every part.
    pub fn set_material_for_all(&mut self, material: &str) {
        for part in self.parts.iter_mut() {
            part.material = material.to_string();
        }
    }

    fn part_mut(&mut self, name: &str) -> Result<&mut PartRecord> {
        self.parts
            .get_mut(name)
            .ok_or_else(|| QuoteError::UnknownPart {
                name: name.to_string(),
            })
    }
}

impl From<Aggregation> for ReviewState {
    fn from(aggregation: Aggregation) -> Self {
        Self {
            sheet_runs: aggregation.sheet_runs,
            parts: aggregation.catalogue,
        }
    }
}
