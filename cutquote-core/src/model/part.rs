//! Part record - one distinct cut part accumulated across sheet runs.

use serde::{Deserialize, Serialize};

use super::SheetRun;

/// A single distinct cut part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    /// Part name derived from its GEO file path.
    pub name: String,
    /// Parts to cut, summed across every sheet run.
    pub quantity: u32,
    /// Machining time per part in minutes.
    pub machine_time_min: f64,
    /// Weight per part in pounds.
    pub weight_lb: f64,
    /// Surface area per part in square inches.
    pub surface_area_in2: f64,
    /// Cutting length per part in inches.
    pub cutting_length_in: f64,
    /// Piercing time per part in seconds.
    pub piercing_time_sec: f64,
    /// Part number within the nesting program.
    pub part_number: u32,
    /// Thumbnail index, dense in first-seen order.
    pub image_index: usize,
    /// Resolved material name.
    pub material: String,
    /// Resolved gauge label.
    pub gauge: String,
    /// Raw "W x H" sheet blank dimensions.
    pub sheet_dim: String,
    /// Report file the descriptive attributes were last taken from.
    #[serde(default)]
    pub source_file: String,
    /// Marked for recut during review.
    #[serde(default)]
    pub recut: bool,
}

impl PartRecord {
    /// Create an empty record for a newly observed part.
    pub fn new(name: impl Into<String>, image_index: usize, run: &SheetRun) -> Self {
        Self {
            name: name.into(),
            image_index,
            material: run.material.clone(),
            gauge: run.gauge.clone(),
            sheet_dim: run.sheet_dim.clone(),
            source_file: run.source.clone(),
            ..Default::default()
        }
    }

    /// Copy the owning sheet run's attributes onto this part.
    pub fn set_sheet_run(&mut self, run: &SheetRun) {
        self.material = run.material.clone();
        self.gauge = run.gauge.clone();
        self.sheet_dim = run.sheet_dim.clone();
        self.source_file = run.source.clone();
    }

    /// Total machining time for every copy of the part.
    pub fn total_machine_time(&self) -> f64 {
        self.machine_time_min * self.quantity as f64
    }

    /// Total weight for every copy of the part.
    pub fn total_weight(&self) -> f64 {
        self.weight_lb * self.quantity as f64
    }

    /// File name of the part's thumbnail as emitted by the image extractor.
    pub fn image_file_name(&self) -> String {
        format!("{}.jpeg", self.image_index)
    }
}
