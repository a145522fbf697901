//! Declarative workbook model and the writer that builds it.
//!
//! The model is a flat, ordered list of instructions. A workbook sink replays
//! it against a spreadsheet library; nothing here knows about file formats.

use super::cell::{range, CellRef};
use crate::config::OutputMode;
use serde::{Deserialize, Serialize};

/// Literal value or formula stored in one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
    /// Formula text including the leading `=`.
    Formula(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn formula(s: impl Into<String>) -> Self {
        CellValue::Formula(s.into())
    }

    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::Formula(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// One cell write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellAssignment {
    pub sheet: String,
    pub cell: CellRef,
    pub value: CellValue,
    /// Number format applied to the cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Worksheet declared by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetDeclaration {
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
}

/// The structured table spanning the header row and every data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDeclaration {
    pub name: String,
    pub sheet: String,
    pub style: String,
    /// Row holding the header labels.
    pub header_row: u32,
    /// 0-based index of the leftmost table column.
    pub first_column: u32,
    pub columns: Vec<String>,
    pub data_rows: u32,
}

impl TableDeclaration {
    /// Last row covered by the table; the header row when it has no data.
    pub fn last_row(&self) -> u32 {
        self.header_row + self.data_rows
    }

    /// Cell range covered by the table, header included.
    pub fn range(&self) -> String {
        let width = self.columns.len().saturating_sub(1) as u32;
        range(
            CellRef::new(self.first_column, self.header_row),
            CellRef::new(self.first_column + width, self.last_row()),
        )
    }
}

/// Thumbnail to insert at a row anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub sheet: String,
    pub anchor: CellRef,
    /// Image file name as emitted by the image extractor.
    pub image: String,
    pub image_index: usize,
    /// Edge length in pixels.
    pub size: u32,
}

/// Dropdown list constraint over a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListValidation {
    pub sheet: String,
    pub range: String,
    /// Absolute reference to the allowed values.
    pub source: String,
}

/// Workbook-level name bound to a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedName {
    pub name: String,
    pub refers_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFormat {
    pub sheet: String,
    pub column: u32,
    pub width: f64,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFormat {
    pub sheet: String,
    pub row: u32,
    pub height: f64,
}

/// Complete, renderable description of one quote or work-order workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookModel {
    pub mode: OutputMode,
    pub title: String,
    /// Folder the sink should save the workbook into.
    pub folder: String,
    pub sheets: Vec<SheetDeclaration>,
    pub cells: Vec<CellAssignment>,
    pub table: Option<TableDeclaration>,
    pub images: Vec<ImagePlacement>,
    pub validations: Vec<ListValidation>,
    pub defined_names: Vec<DefinedName>,
    pub columns: Vec<ColumnFormat>,
    pub rows: Vec<RowFormat>,
    /// First unfrozen row of the main sheet.
    pub freeze_row: Option<u32>,
    pub print_area: Option<String>,
}

impl WorkbookModel {
    /// Last assignment made to `cell` (A1 text) on `sheet`.
    pub fn cell(&self, sheet: &str, cell: &str) -> Option<&CellAssignment> {
        let target = CellRef::parse(cell)?;
        self.cells
            .iter()
            .rev()
            .find(|a| a.sheet == sheet && a.cell == target)
    }

    /// Value last written to `cell` on `sheet`.
    pub fn value(&self, sheet: &str, cell: &str) -> Option<&CellValue> {
        self.cell(sheet, cell).map(|a| &a.value)
    }

    /// Look up a defined name.
    pub fn defined_name(&self, name: &str) -> Option<&DefinedName> {
        self.defined_names.iter().find(|d| d.name == name)
    }

    /// Whether a column of `sheet` is hidden.
    pub fn is_column_hidden(&self, sheet: &str, column: u32) -> bool {
        self.columns
            .iter()
            .any(|c| c.sheet == sheet && c.column == column && c.hidden)
    }

    /// Serialize the model as pretty JSON for a workbook sink.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Builder for a [`WorkbookModel`], writing to one current sheet at a time.
pub struct WorkbookWriter {
    model: WorkbookModel,
    sheet: String,
}

impl WorkbookWriter {
    /// Create an empty model for `mode`.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            model: WorkbookModel {
                mode,
                title: mode.title().to_string(),
                folder: mode.folder().to_string(),
                sheets: Vec::new(),
                cells: Vec::new(),
                table: None,
                images: Vec::new(),
                validations: Vec::new(),
                defined_names: Vec::new(),
                columns: Vec::new(),
                rows: Vec::new(),
                freeze_row: None,
                print_area: None,
            },
            sheet: String::new(),
        }
    }

    /// Declare a sheet and make it current.
    pub fn add_sheet(&mut self, name: &str, hidden: bool) {
        self.model.sheets.push(SheetDeclaration {
            name: name.to_string(),
            hidden,
        });
        self.sheet = name.to_string();
    }

    /// Switch the current sheet.
    pub fn select_sheet(&mut self, name: &str) {
        self.sheet = name.to_string();
    }

    /// Get the model built so far.
    pub fn model(&self) -> &WorkbookModel {
        &self.model
    }

    /// Take the finished model.
    pub fn take_model(self) -> WorkbookModel {
        self.model
    }

    // === Cell writes ===

    /// Write a value without a number format.
    pub fn write(&mut self, cell: CellRef, value: CellValue) {
        self.push(cell, value, None);
    }

    /// Write a value with a number format.
    pub fn write_formatted(&mut self, cell: CellRef, value: CellValue, format: &str) {
        self.push(cell, value, Some(format));
    }

    pub fn write_text(&mut self, cell: CellRef, text: &str) {
        self.write(cell, CellValue::text(text));
    }

    /// Write a formula; a missing leading `=` is added.
    pub fn write_formula(&mut self, cell: CellRef, formula: &str, format: Option<&str>) {
        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        self.push(cell, CellValue::Formula(formula), format);
    }

    /// Write values left to right starting at `start`; returns the last cell.
    pub fn write_row<I>(&mut self, start: CellRef, values: I, format: Option<&str>) -> CellRef
    where
        I: IntoIterator<Item = CellValue>,
    {
        let mut last = start;
        for (i, value) in values.into_iter().enumerate() {
            last = start.right(i as u32);
            self.push(last, value, format);
        }
        last
    }

    /// Write values top to bottom starting at `start`; returns the last cell.
    pub fn write_column<I>(&mut self, start: CellRef, values: I, format: Option<&str>) -> CellRef
    where
        I: IntoIterator<Item = CellValue>,
    {
        let mut last = start;
        for (i, value) in values.into_iter().enumerate() {
            last = start.down(i as u32);
            self.push(last, value, format);
        }
        last
    }

    fn push(&mut self, cell: CellRef, value: CellValue, format: Option<&str>) {
        self.model.cells.push(CellAssignment {
            sheet: self.sheet.clone(),
            cell,
            value,
            format: format.map(str::to_string),
        });
    }

    // === Declarations ===

    /// Bind a workbook name to a cell of the current sheet.
    pub fn define_name(&mut self, name: &str, cell: CellRef) {
        self.model.defined_names.push(DefinedName {
            name: name.to_string(),
            refers_to: super::cell::sheet_cell(&self.sheet, cell),
        });
    }

    /// Restrict `range` on the current sheet to the values at `source`.
    pub fn add_list_validation(&mut self, range: String, source: String) {
        self.model.validations.push(ListValidation {
            sheet: self.sheet.clone(),
            range,
            source,
        });
    }

    pub fn set_table(&mut self, table: TableDeclaration) {
        self.model.table = Some(table);
    }

    pub fn add_image(&mut self, anchor: CellRef, image: String, image_index: usize, size: u32) {
        self.model.images.push(ImagePlacement {
            sheet: self.sheet.clone(),
            anchor,
            image,
            image_index,
            size,
        });
    }

    pub fn set_column(&mut self, column: u32, width: f64, hidden: bool) {
        self.model.columns.push(ColumnFormat {
            sheet: self.sheet.clone(),
            column,
            width,
            hidden,
        });
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.model.rows.push(RowFormat {
            sheet: self.sheet.clone(),
            row,
            height,
        });
    }

    pub fn freeze_at(&mut self, row: u32) {
        self.model.freeze_row = Some(row);
    }

    pub fn set_print_area(&mut self, area: String) {
        self.model.print_area = Some(area);
    }
}
