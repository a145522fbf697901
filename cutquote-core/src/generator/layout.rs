//! Quote and work-order layout.
//!
//! Produces the main sheet (controls, part table, totals, sheet-cost block)
//! and the hidden reference sheet its lookup formulas read from.

use super::cell::{range, sheet_range, CellRef};
use super::workbook::{CellValue, TableDeclaration, WorkbookModel, WorkbookWriter};
use crate::config::{
    OutputMode, PriceEntry, PricingConfig, CENT, CURRENCY_FORMAT, DECIMAL_FORMAT, HEADER_ROW,
    INFO_SHEET, MAIN_SHEET, PERCENT_FORMAT, SQ_IN_PER_SQ_FT, STARTING_ROW, TABLE_NAME,
    TABLE_STYLE,
};
use crate::error::Result;
use crate::model::{PartCatalogue, PartRecord, SheetRun};
use crate::transform::{total_sheet_count, weighted_scrap_percent};

/// Named cell holding the selected assist gas.
pub const GAS_TYPE_NAME: &str = "GasType";
/// Named cell holding the overhead rate.
pub const OVERHEAD_RATE_NAME: &str = "OverheadRate";
/// Named cell holding the profit margin.
pub const PROFIT_MARGIN_NAME: &str = "ProfitMargin";

const CONTROL_LABEL_COLUMN: u32 = 20;
const CONTROL_VALUE_COLUMN: u32 = 21;
const GAS_ROW: u32 = 2;
const OVERHEAD_ROW: u32 = 3;
const MARGIN_ROW: u32 = 4;

/// First row of the price matrices on the reference sheet.
const PRICE_MATRIX_TOP: u32 = 6;

/// Main sheet columns, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Image,
    PartName,
    MachiningTime,
    Weight,
    Quantity,
    Material,
    Gauge,
    WeightCost,
    TimeCost,
    Cogs,
    Overhead,
    UnitPrice,
    Price,
    TotalCost,
    SurfaceArea,
    CuttingLength,
    PiercingTime,
    PartNumber,
    Recut,
}

impl Column {
    /// Columns covered by the part table (everything but the thumbnail).
    pub const TABLE: [Column; 18] = [
        Column::PartName,
        Column::MachiningTime,
        Column::Weight,
        Column::Quantity,
        Column::Material,
        Column::Gauge,
        Column::WeightCost,
        Column::TimeCost,
        Column::Cogs,
        Column::Overhead,
        Column::UnitPrice,
        Column::Price,
        Column::TotalCost,
        Column::SurfaceArea,
        Column::CuttingLength,
        Column::PiercingTime,
        Column::PartNumber,
        Column::Recut,
    ];

    /// 0-based column index.
    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn letter(self) -> String {
        super::cell::column_letter(self.index())
    }

    pub fn cell(self, row: u32) -> CellRef {
        CellRef::new(self.index(), row)
    }

    /// Header label for this column.
    pub fn header(self, mode: OutputMode) -> &'static str {
        match (self, mode) {
            (Column::Image, _) => "",
            (Column::PartName, _) => "Part name",
            (Column::MachiningTime, _) => "Machining time (min)",
            (Column::Weight, _) => "Weight (lb)",
            (Column::Quantity, _) => "Quantity",
            (Column::Material, _) => "Material",
            (Column::Gauge, _) => "Gauge",
            (Column::WeightCost, _) => "Weight cost",
            (Column::TimeCost, _) => "Time cost",
            (Column::Cogs, _) => "COGS",
            (Column::Overhead, _) => "Overhead",
            (Column::UnitPrice, OutputMode::Quote) => "Unit price",
            (Column::UnitPrice, OutputMode::WorkOrder) => "Unit value",
            (Column::Price, OutputMode::Quote) => "Price",
            (Column::Price, OutputMode::WorkOrder) => "Order value",
            (Column::TotalCost, _) => "Total cost",
            (Column::SurfaceArea, _) => "Surface area (in2)",
            (Column::CuttingLength, _) => "Cutting length (in)",
            (Column::PiercingTime, _) => "Piercing time (s)",
            (Column::PartNumber, _) => "Part number",
            (Column::Recut, _) => "Recut",
        }
    }

    fn format(self) -> Option<&'static str> {
        match self {
            Column::MachiningTime
            | Column::Weight
            | Column::SurfaceArea
            | Column::CuttingLength
            | Column::PiercingTime => Some(DECIMAL_FORMAT),
            Column::WeightCost
            | Column::TimeCost
            | Column::Cogs
            | Column::Overhead
            | Column::UnitPrice
            | Column::Price
            | Column::TotalCost => Some(CURRENCY_FORMAT),
            _ => None,
        }
    }

    /// Whether the column is hidden for `mode`.
    pub fn is_hidden(self, mode: OutputMode) -> bool {
        match mode {
            // Customers see prices, not the cost build-up.
            OutputMode::Quote => matches!(
                self,
                Column::MachiningTime
                    | Column::Weight
                    | Column::WeightCost
                    | Column::TimeCost
                    | Column::Cogs
                    | Column::Overhead
                    | Column::PartNumber
                    | Column::Recut
            ),
            OutputMode::WorkOrder => matches!(
                self,
                Column::WeightCost
                    | Column::TimeCost
                    | Column::Cogs
                    | Column::Overhead
                    | Column::UnitPrice
                    | Column::Price
                    | Column::TotalCost
            ),
        }
    }

    fn width(self) -> f64 {
        match self {
            Column::PartName => 28.0,
            Column::Material | Column::Gauge => 14.0,
            Column::Recut | Column::Quantity => 10.0,
            _ => 13.0,
        }
    }

    /// Structured reference to this column of the part table.
    pub fn structured(self, mode: OutputMode) -> String {
        format!("{}[{}]", TABLE_NAME, escape_structured(self.header(mode)))
    }

    /// Row-relative, column-absolute reference, e.g. `$F6`.
    fn at(self, row: u32) -> String {
        format!("${}{}", self.letter(), row)
    }
}

/// Escape the characters that are special inside a structured-reference column name.
fn escape_structured(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    for c in header.chars() {
        if matches!(c, '[' | ']' | '#' | '\'') {
            out.push('\'');
        }
        out.push(c);
    }
    out
}

/// Two-dimensional price table on the reference sheet.
struct PriceMatrix {
    values: String,
    materials: String,
    gauges: String,
}

impl PriceMatrix {
    fn lookup(&self, material: &str, gauge: &str) -> String {
        format!(
            "INDEX({},MATCH({},{},0),MATCH({},{},0))",
            self.values, material, self.materials, gauge, self.gauges
        )
    }
}

/// Absolute ranges of the reference block.
struct ReferenceBlock {
    materials: String,
    gauges: String,
    gas_names: String,
    gas_rates: String,
    per_pound: PriceMatrix,
    per_square_foot: PriceMatrix,
}

impl ReferenceBlock {
    fn gas_rate_lookup(&self) -> String {
        format!(
            "INDEX({},MATCH({},{},0))",
            self.gas_rates, GAS_TYPE_NAME, self.gas_names
        )
    }
}

/// Generate the workbook model for a reviewed catalogue.
///
/// Rows follow catalogue order starting at [`STARTING_ROW`]. An empty catalogue
/// still yields the controls, a header-only table and a totals row.
pub fn generate_workbook(
    catalogue: &PartCatalogue,
    sheet_runs: &[SheetRun],
    config: &PricingConfig,
    mode: OutputMode,
) -> Result<WorkbookModel> {
    let mut w = WorkbookWriter::new(mode);
    w.add_sheet(MAIN_SHEET, false);
    let block = write_reference_block(&mut w, config, sheet_runs);

    w.select_sheet(MAIN_SHEET);
    write_controls(&mut w, config, mode, &block);

    let data_rows = catalogue.len() as u32;
    w.write_row(
        Column::PartName.cell(HEADER_ROW),
        Column::TABLE.map(|c| CellValue::text(c.header(mode))),
        None,
    );
    for (i, part) in catalogue.iter().enumerate() {
        write_part_row(&mut w, part, STARTING_ROW + i as u32, &block, config.picture_size);
    }
    w.set_table(TableDeclaration {
        name: TABLE_NAME.to_string(),
        sheet: MAIN_SHEET.to_string(),
        style: TABLE_STYLE.to_string(),
        header_row: HEADER_ROW,
        first_column: Column::PartName.index(),
        columns: Column::TABLE.iter().map(|c| c.header(mode).to_string()).collect(),
        data_rows,
    });

    if data_rows > 0 {
        let last = STARTING_ROW + data_rows - 1;
        for (column, source) in [
            (Column::Material, &block.materials),
            (Column::Gauge, &block.gauges),
        ] {
            w.add_list_validation(
                range(column.cell(STARTING_ROW), column.cell(last)),
                source.clone(),
            );
        }
    }

    let totals_row = STARTING_ROW + data_rows;
    write_totals(&mut w, mode, totals_row);
    let last_row = write_sheet_block(&mut w, sheet_runs, &block, totals_row + 2)?;

    w.set_column(Column::Image.index(), config.picture_size as f64 / 6.0, false);
    for column in Column::TABLE {
        w.set_column(column.index(), column.width(), column.is_hidden(mode));
    }
    w.freeze_at(STARTING_ROW);
    w.set_print_area(sheet_range(
        MAIN_SHEET,
        CellRef::new(0, 1),
        Column::Recut.cell(last_row),
    ));

    tracing::info!(
        "Generated {} layout: {} part row(s), {} sheet run(s)",
        mode,
        data_rows,
        sheet_runs.len()
    );
    Ok(w.take_model())
}

fn write_reference_block(
    w: &mut WorkbookWriter,
    config: &PricingConfig,
    sheet_runs: &[SheetRun],
) -> ReferenceBlock {
    w.add_sheet(INFO_SHEET, true);
    let materials = config.material_names();
    let gauges = config.gauge_labels();

    let mut list = |row: u32, values: Vec<CellValue>, format: Option<&str>| {
        let start = CellRef::new(0, row);
        let end = w.write_row(start, values, format);
        sheet_range(INFO_SHEET, start, end)
    };
    let materials_range = list(1, materials.iter().map(|m| CellValue::text(*m)).collect(), None);
    let gauges_range = list(2, gauges.iter().map(|g| CellValue::text(*g)).collect(), None);
    let gas_names = list(
        3,
        config.gases.iter().map(|g| CellValue::text(&g.name)).collect(),
        None,
    );
    let gas_rates = list(
        4,
        config
            .gases
            .iter()
            .map(|g| CellValue::Number(g.cost_per_hour))
            .collect(),
        Some(CURRENCY_FORMAT),
    );

    let per_pound = write_price_matrix(
        w,
        config,
        &materials,
        &gauges,
        PRICE_MATRIX_TOP,
        "Price per lb",
        |p| p.per_pound,
    );
    let sqft_top = PRICE_MATRIX_TOP + materials.len() as u32 + 2;
    let per_square_foot = write_price_matrix(
        w,
        config,
        &materials,
        &gauges,
        sqft_top,
        "Price per sq ft",
        |p| p.per_square_foot,
    );

    let files_top = sqft_top + materials.len() as u32 + 2;
    w.write_text(
        CellRef::new(0, files_top),
        &format!("{} files loaded", sheet_runs.len()),
    );
    w.write_column(
        CellRef::new(0, files_top + 1),
        sheet_runs.iter().map(|r| CellValue::text(&r.source)),
        None,
    );

    ReferenceBlock {
        materials: materials_range,
        gauges: gauges_range,
        gas_names,
        gas_rates,
        per_pound,
        per_square_foot,
    }
}

/// Write a material-by-gauge price table with its row and column keys.
fn write_price_matrix(
    w: &mut WorkbookWriter,
    config: &PricingConfig,
    materials: &[&str],
    gauges: &[&str],
    top: u32,
    label: &str,
    price: impl Fn(&PriceEntry) -> f64,
) -> PriceMatrix {
    w.write_text(CellRef::new(0, top), label);
    let header_start = CellRef::new(1, top);
    let header_end = w.write_row(
        header_start,
        gauges.iter().map(|g| CellValue::text(*g)),
        None,
    );

    for (i, material) in materials.iter().enumerate() {
        let row = top + 1 + i as u32;
        w.write_text(CellRef::new(0, row), material);
        // Unpriced pairs stay blank.
        for (col, gauge) in gauges.iter().enumerate() {
            if let Some(entry) = config.price(material, gauge) {
                w.write_formatted(
                    CellRef::new(1 + col as u32, row),
                    CellValue::Number(price(entry)),
                    CURRENCY_FORMAT,
                );
            }
        }
    }

    let last_row = top + materials.len().max(1) as u32;
    PriceMatrix {
        values: sheet_range(
            INFO_SHEET,
            CellRef::new(1, top + 1),
            CellRef::new(header_end.col, last_row),
        ),
        materials: sheet_range(INFO_SHEET, CellRef::new(0, top + 1), CellRef::new(0, last_row)),
        gauges: sheet_range(INFO_SHEET, header_start, header_end),
    }
}

/// Title row and the editable gas/overhead/margin controls.
fn write_controls(
    w: &mut WorkbookWriter,
    config: &PricingConfig,
    mode: OutputMode,
    block: &ReferenceBlock,
) {
    w.write_text(Column::PartName.cell(1), mode.title());
    let name_label = match mode {
        OutputMode::Quote => "Quote Name:",
        OutputMode::WorkOrder => "Job Name:",
    };
    w.write_text(Column::Material.cell(1), name_label);

    let gas = CellRef::new(CONTROL_VALUE_COLUMN, GAS_ROW);
    w.write_text(CellRef::new(CONTROL_LABEL_COLUMN, GAS_ROW), "Laser cutting:");
    w.write_text(gas, &config.default_gas);
    w.define_name(GAS_TYPE_NAME, gas);
    w.add_list_validation(gas.to_string(), block.gas_names.clone());

    let overhead = CellRef::new(CONTROL_VALUE_COLUMN, OVERHEAD_ROW);
    w.write_text(CellRef::new(CONTROL_LABEL_COLUMN, OVERHEAD_ROW), "Overhead:");
    w.write_formatted(overhead, CellValue::Number(config.overhead), PERCENT_FORMAT);
    w.define_name(OVERHEAD_RATE_NAME, overhead);

    let margin = CellRef::new(CONTROL_VALUE_COLUMN, MARGIN_ROW);
    w.write_text(CellRef::new(CONTROL_LABEL_COLUMN, MARGIN_ROW), "Profit Margin:");
    w.write_formatted(margin, CellValue::Number(config.profit_margin), PERCENT_FORMAT);
    w.define_name(PROFIT_MARGIN_NAME, margin);
}

fn write_part_row(
    w: &mut WorkbookWriter,
    part: &PartRecord,
    row: u32,
    block: &ReferenceBlock,
    picture_size: u32,
) {
    use Column::*;

    let number = |w: &mut WorkbookWriter, column: Column, value: f64| match column.format() {
        Some(format) => w.write_formatted(column.cell(row), CellValue::Number(value), format),
        None => w.write(column.cell(row), CellValue::Number(value)),
    };
    let formula = |w: &mut WorkbookWriter, column: Column, expr: String| {
        w.write_formula(column.cell(row), &expr, column.format());
    };

    w.write_text(PartName.cell(row), &part.name);
    number(w, MachiningTime, part.machine_time_min);
    number(w, Weight, part.weight_lb);
    w.write(Quantity.cell(row), CellValue::Integer(part.quantity as i64));
    w.write_text(Material.cell(row), &part.material);
    w.write_text(Gauge.cell(row), &part.gauge);

    let (h, i, j, k, l) = (
        WeightCost.at(row),
        TimeCost.at(row),
        Cogs.at(row),
        Overhead.at(row),
        UnitPrice.at(row),
    );
    formula(
        w,
        WeightCost,
        format!(
            "{}*{}",
            block.per_pound.lookup(&Material.at(row), &Gauge.at(row)),
            Weight.at(row)
        ),
    );
    formula(
        w,
        TimeCost,
        format!("({}/60)*{}", block.gas_rate_lookup(), MachiningTime.at(row)),
    );
    formula(w, Cogs, format!("{h}+{i}"));
    formula(w, Overhead, format!("{j}*{OVERHEAD_RATE_NAME}"));
    formula(
        w,
        UnitPrice,
        format!("CEILING(({j}+{k})/(1-{PROFIT_MARGIN_NAME}),{CENT})"),
    );
    formula(
        w,
        Price,
        format!("CEILING({}*{l},{CENT})", Quantity.at(row)),
    );
    formula(w, TotalCost, format!("CEILING({j}+{k},{CENT})"));

    number(w, SurfaceArea, part.surface_area_in2);
    number(w, CuttingLength, part.cutting_length_in);
    number(w, PiercingTime, part.piercing_time_sec);
    w.write(PartNumber.cell(row), CellValue::Integer(part.part_number as i64));
    w.write(Recut.cell(row), CellValue::Bool(part.recut));

    w.add_image(
        Image.cell(row),
        part.image_file_name(),
        part.image_index,
        picture_size,
    );
    w.set_row_height(row, picture_size as f64 / 1.2);
}

/// Totals row directly below the part table.
fn write_totals(w: &mut WorkbookWriter, mode: OutputMode, row: u32) {
    w.write_text(Column::PartName.cell(row), "Total:");

    let quantity = Column::Quantity.structured(mode);
    for column in [
        Column::MachiningTime,
        Column::Weight,
        Column::SurfaceArea,
        Column::CuttingLength,
        Column::PiercingTime,
    ] {
        w.write_formula(
            column.cell(row),
            &format!("SUMPRODUCT({},{})", column.structured(mode), quantity),
            column.format(),
        );
    }

    w.write_formula(
        Column::Quantity.cell(row),
        &format!("SUM({})", quantity),
        None,
    );
    for column in [
        Column::Cogs,
        Column::Overhead,
        Column::Price,
        Column::TotalCost,
    ] {
        w.write_formula(
            column.cell(row),
            &format!("SUM({})", column.structured(mode)),
            column.format(),
        );
    }
}

/// Sheet count, blank size, stock and cost below the totals row.
///
/// Returns the last row written.
fn write_sheet_block(
    w: &mut WorkbookWriter,
    sheet_runs: &[SheetRun],
    block: &ReferenceBlock,
    top: u32,
) -> Result<u32> {
    let label = Column::PartName;
    let first = Column::Quantity;
    let second = Column::Material;

    let count_cell = first.cell(top);
    w.write_text(label.cell(top), "Total sheets:");
    w.write(count_cell, CellValue::Integer(total_sheet_count(sheet_runs) as i64));

    let size_row = top + 1;
    let stock_row = top + 2;
    let cost_row = top + 3;
    let scrap_row = top + 4;

    w.write_text(label.cell(size_row), "Sheet size (in):");
    w.write_text(label.cell(stock_row), "Sheet stock:");
    w.write_text(label.cell(cost_row), "Sheet cost:");

    match sheet_runs.last() {
        Some(last) => {
            let dims = last.dimensions()?;
            w.write(first.cell(size_row), CellValue::Number(dims.width));
            w.write(second.cell(size_row), CellValue::Number(dims.height));
            w.write_text(first.cell(stock_row), &last.material);
            w.write_text(second.cell(stock_row), &last.gauge);

            let lookup = block.per_square_foot.lookup(
                &first.cell(stock_row).absolute(),
                &second.cell(stock_row).absolute(),
            );
            w.write_formula(
                first.cell(cost_row),
                &format!(
                    "CEILING(({}*{}/{})*{}*{},{})",
                    first.cell(size_row).absolute(),
                    second.cell(size_row).absolute(),
                    SQ_IN_PER_SQ_FT,
                    lookup,
                    count_cell.absolute(),
                    CENT
                ),
                Some(CURRENCY_FORMAT),
            );
        }
        None => {
            w.write(first.cell(size_row), CellValue::Number(0.0));
            w.write(second.cell(size_row), CellValue::Number(0.0));
            w.write_formatted(first.cell(cost_row), CellValue::Number(0.0), CURRENCY_FORMAT);
        }
    }

    w.write_text(label.cell(scrap_row), "Scrap (%):");
    w.write_formatted(
        first.cell(scrap_row),
        CellValue::Number(weighted_scrap_percent(sheet_runs)),
        DECIMAL_FORMAT,
    );

    Ok(scrap_row)
}
