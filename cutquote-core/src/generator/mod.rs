//! Workbook model generation.

mod cell;
mod layout;
mod workbook;

pub use cell::{column_index, column_letter, CellRef};
pub use layout::{
    generate_workbook, Column, GAS_TYPE_NAME, OVERHEAD_RATE_NAME, PROFIT_MARGIN_NAME,
};
pub use workbook::{
    CellAssignment, CellValue, ColumnFormat, DefinedName, ImagePlacement, ListValidation,
    RowFormat, SheetDeclaration, TableDeclaration, WorkbookModel, WorkbookWriter,
};
