//! Integration tests for report to workbook conversion.
//!
//! These tests run the whole pipeline over report fixtures and small in-memory
//! reports, and check the emitted workbook model structurally: which cells
//! hold which values and formulas, rather than a byte-for-byte snapshot.

use cutquote_core::config::{GasRate, PriceEntry, INFO_SHEET, MAIN_SHEET};
use cutquote_core::pricing::sheet_cost;
use cutquote_core::{
    aggregate, ceil_to, convert_reports, generate_from_review, generate_workbook, load_reports,
    CellValue, ErrorKind, OutputMode, PartRecord, PricingConfig, QuoteError, QuoteTotals,
    ReportField, ReportText, ReviewState, RowCosts,
};
use pretty_assertions::assert_eq;
use std::path::Path;

/// Fixture directory for integration tests
const FIXTURE_DIR: &str = "tests/fixtures/reports";

fn fixture_reports(names: &[&str]) -> Vec<ReportText> {
    let paths: Vec<_> = names.iter().map(|n| Path::new(FIXTURE_DIR).join(n)).collect();
    load_reports(&paths).expect("fixtures load")
}

/// Minimal report text with one line per field.
fn report(source: &str, runs: u32, material: &str, parts: &[(&str, u32, f64)]) -> ReportText {
    let mut text = format!(
        "PROGRAMME RUNS:  /  SCRAP: {runs}  /  5.00 %\n\
         MATERIAL ID (SHEET): {material}\n\
         BLANK: 60.000 x 120.000 x 0.060\n"
    );
    for (i, (name, qty, weight)) in parts.iter().enumerate() {
        text.push_str(&format!(
            "GEOFILE NAME: C:\\Parts\\{name}.GEO\nPART NUMBER: {}\n  NUMBER: {qty}\n\
             MACHINING TIME: 1.00 min\nWEIGHT: {weight} lb\nSURFACE: 10.00  in2\n\
             CUTTING LENGTH: 20.00  in\nPIERCING TIME 1.00  s\n",
            i + 1
        ));
    }
    ReportText::new(source, &text)
}

fn text_at<'a>(model: &'a cutquote_core::WorkbookModel, sheet: &str, cell: &str) -> Option<&'a str> {
    model.value(sheet, cell).and_then(CellValue::as_text)
}

// ==================== Fixture aggregation ====================

#[test]
fn test_fixture_aggregation() {
    let config = PricingConfig::default();
    let reports = fixture_reports(&["sheet1.txt", "sheet2.txt", "plate.txt"]);
    let result = aggregate(&reports, &config).expect("valid reports");

    let names: Vec<_> = result.catalogue.names().collect();
    assert_eq!(
        names,
        vec!["BRACKET-01", "LONG NAME-PLATE", "GUSSET-03", "BASE-PLATE"]
    );

    // 3 x 2 runs from sheet1, then 2 x 1 run from sheet2.
    let bracket = result.catalogue.get("BRACKET-01").expect("bracket");
    assert_eq!(bracket.quantity, 8);
    assert!((bracket.weight_lb - 1.5).abs() < 1e-9);
    assert!((bracket.machine_time_min - 1.3).abs() < 1e-9);
    assert_eq!(bracket.sheet_dim, "48.000 x 96.000");
    assert_eq!(bracket.source_file, "sheet2.txt");
    assert_eq!(bracket.image_index, 0);

    assert_eq!(result.catalogue.get("LONG NAME-PLATE").map(|p| p.quantity), Some(2));
    assert_eq!(result.catalogue.get("GUSSET-03").map(|p| p.image_index), Some(2));

    assert_eq!(result.sheet_runs.len(), 3);
    assert_eq!(result.total_sheet_count(), 4);
    assert!((result.weighted_scrap_percent() - 21.075).abs() < 1e-9);
}

#[test]
fn test_fixture_plate_sheet() {
    let config = PricingConfig::default();
    let result = aggregate(&fixture_reports(&["plate.txt"]), &config).expect("valid report");
    let run = &result.sheet_runs[0];
    assert_eq!(run.material, "Plate");
    assert_eq!(run.gauge, "1/4\"");
    assert_eq!(run.source, "plate.txt");
    let part = result.catalogue.get("BASE-PLATE").expect("part");
    assert_eq!(part.material, "Plate");
    assert_eq!(part.quantity, 2);
}

// ==================== Alignment ====================

#[test]
fn test_aligned_report_yields_one_contribution_per_part() {
    let config = PricingConfig::default();
    let parts = [("A", 1, 1.0), ("B", 2, 2.0), ("C", 3, 3.0), ("D", 4, 4.0)];
    let result = aggregate(&[report("r.txt", 1, "ST-16", &parts)], &config).expect("valid");
    assert_eq!(result.catalogue.len(), 4);
    assert_eq!(result.catalogue.total_quantity(), 10);
}

#[test]
fn test_missing_weight_is_malformed_report() {
    let config = PricingConfig::default();
    let good = report("bad.txt", 1, "ST-16", &[("A", 1, 1.0), ("B", 1, 1.0)]);
    let text = good.text.replacen("WEIGHT: 1 lb\n", "", 1);
    let err = aggregate(&[ReportText::new("bad.txt", &text)], &config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedReport);
    match err {
        QuoteError::FieldCountMismatch {
            file,
            field,
            observed,
            expected,
        } => {
            assert_eq!(file, "bad.txt");
            assert_eq!(field, ReportField::WeightPounds);
            assert_eq!(observed, 1);
            assert_eq!(expected, 2);
        }
        other => panic!("Expected FieldCountMismatch, got {other:?}"),
    }
}

#[test]
fn test_non_numeric_weight_is_malformed_report() {
    let config = PricingConfig::default();
    let good = report("bad.txt", 1, "ST-16", &[("A", 1, 1.0)]);
    let text = good.text.replace("WEIGHT: 1 lb", "WEIGHT: n/a lb");
    let err = aggregate(&[ReportText::new("bad.txt", &text)], &config).unwrap_err();
    assert!(err.is_malformed_report());
    assert!(matches!(err, QuoteError::InvalidValue { .. }));
}

#[test]
fn test_unresolved_gauge_names_file() {
    let config = PricingConfig::default();
    let err = aggregate(&[report("odd.txt", 1, "ST-99", &[("A", 1, 1.0)])], &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
    assert!(err.to_string().contains("odd.txt"));
}

// ==================== Quantity and overwrite semantics ====================

#[test]
fn test_quantity_sums_across_runs() {
    let config = PricingConfig::default();
    for (q1, m1, q2, m2) in [(1, 1, 1, 1), (3, 2, 5, 4), (0, 3, 7, 1)] {
        let reports = [
            report("r1.txt", m1, "ST-16", &[("P", q1, 1.0)]),
            report("r2.txt", m2, "ST-16", &[("P", q2, 1.0)]),
        ];
        let result = aggregate(&reports, &config).expect("valid");
        assert_eq!(
            result.catalogue.get("P").map(|p| p.quantity),
            Some(q1 * m1 + q2 * m2)
        );
    }
}

#[test]
fn test_scenario_a_run_multiplier() {
    let config = PricingConfig::default();
    let result =
        aggregate(&[report("a.txt", 2, "ST-16", &[("PART", 3, 1.0)])], &config).expect("valid");
    assert_eq!(result.catalogue.get("PART").map(|p| p.quantity), Some(6));
}

#[test]
fn test_scenario_b_last_write_wins() {
    let config = PricingConfig::default();
    let reports = [
        report("r1.txt", 1, "ST-16", &[("BRACKET-01", 1, 1.2)]),
        report("r2.txt", 1, "AL-12", &[("BRACKET-01", 2, 1.5)]),
    ];
    let result = aggregate(&reports, &config).expect("valid");
    let part = result.catalogue.get("BRACKET-01").expect("part");
    assert_eq!(part.quantity, 3);
    assert!((part.weight_lb - 1.5).abs() < 1e-9);
    assert_eq!(part.material, "Aluminium");
    assert_eq!(part.gauge, "12 GA");
}

#[test]
fn test_scenario_c_plate_override() {
    let config = PricingConfig::default();
    let result =
        aggregate(&[report("p.txt", 1, "AL-125", &[("THICK", 1, 5.0)])], &config).expect("valid");
    assert_eq!(result.catalogue.get("THICK").map(|p| p.material.as_str()), Some("Plate"));

    // Below the threshold the resolved name stays.
    let result =
        aggregate(&[report("t.txt", 1, "AL-11", &[("THIN", 1, 5.0)])], &config).expect("valid");
    assert_eq!(
        result.catalogue.get("THIN").map(|p| p.material.as_str()),
        Some("Aluminium")
    );
}

#[test]
fn test_image_indices_dense() {
    let config = PricingConfig::default();
    let reports = [
        report("r1.txt", 1, "ST-16", &[("A", 1, 1.0), ("B", 1, 1.0)]),
        report("r2.txt", 1, "ST-16", &[("A", 1, 1.0), ("C", 1, 1.0)]),
        report("r3.txt", 1, "ST-16", &[("D", 1, 1.0), ("B", 1, 1.0)]),
    ];
    let result = aggregate(&reports, &config).expect("valid");
    let indices: Vec<_> = result.catalogue.iter().map(|p| p.image_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

// ==================== Pricing ====================

#[test]
fn test_unit_price_rounds_up_to_cent() {
    let mut config = PricingConfig::default();
    config.overhead = 0.0;
    config.profit_margin = 0.5;
    config.gases = vec![GasRate {
        name: "Air".to_string(),
        cost_per_hour: 0.0,
    }];
    config.prices = vec![PriceEntry {
        material: "Mild Steel".to_string(),
        gauge: "16 GA".to_string(),
        per_pound: 1.0,
        per_square_foot: 0.0,
    }];
    let part = PartRecord {
        name: "P".to_string(),
        quantity: 1,
        weight_lb: 10.001,
        material: "Mild Steel".to_string(),
        gauge: "16 GA".to_string(),
        ..Default::default()
    };

    let costs = RowCosts::compute(&part, &config, "Air");
    assert!((costs.cogs - 10.001).abs() < 1e-9);
    assert!((costs.unit_price - 20.01).abs() < 1e-9);
    assert!((costs.price - 20.01).abs() < 1e-9);
    assert!((costs.total_cost - 10.01).abs() < 1e-9);
    assert!((ceil_to(10.001 / 0.5, 0.01) - 20.01).abs() < 1e-9);
}

#[test]
fn test_fixture_totals() {
    let config = PricingConfig::default();
    let result = aggregate(&fixture_reports(&["sheet1.txt", "sheet2.txt"]), &config)
        .expect("valid");
    let totals = QuoteTotals::for_aggregation(&result, &config, "Nitrogen").expect("valid");

    assert_eq!(totals.quantity, 14);
    assert_eq!(totals.sheet_count, 3);
    // 8 x 1.30 + 2 x 4.10 + 4 x 0.80
    assert!((totals.machine_time_min - 21.8).abs() < 1e-9);
    assert!(totals.price >= totals.total_cost);
    assert!((totals.sheet_cost - sheet_cost(&result.sheet_runs, &config).expect("dims")).abs() < 1e-9);
}

// ==================== Layout ====================

#[test]
fn test_convert_fixtures_to_quote() {
    let config = PricingConfig::default();
    let model = convert_reports(
        &fixture_reports(&["sheet1.txt", "sheet2.txt", "plate.txt"]),
        &config,
        OutputMode::Quote,
    )
    .expect("converted");

    assert_eq!(text_at(&model, MAIN_SHEET, "B1"), Some("Laser Quote"));
    assert_eq!(text_at(&model, MAIN_SHEET, "B6"), Some("BRACKET-01"));
    assert_eq!(text_at(&model, MAIN_SHEET, "B9"), Some("BASE-PLATE"));
    assert_eq!(model.value(MAIN_SHEET, "E6"), Some(&CellValue::Integer(8)));
    assert_eq!(text_at(&model, MAIN_SHEET, "F9"), Some("Plate"));

    let table = model.table.as_ref().expect("table");
    assert_eq!(table.name, "Parts");
    assert_eq!(table.data_rows, 4);
    assert_eq!(table.range(), "B5:S9");

    // Totals directly below the last row.
    assert_eq!(
        model.value(MAIN_SHEET, "E10").and_then(CellValue::as_formula),
        Some("=SUM(Parts[Quantity])")
    );
    assert_eq!(model.value(MAIN_SHEET, "E12"), Some(&CellValue::Integer(4)));

    let images: Vec<_> = model.images.iter().map(|i| i.image.as_str()).collect();
    assert_eq!(images, vec!["0.jpeg", "1.jpeg", "2.jpeg", "3.jpeg"]);
    assert_eq!(model.validations.len(), 3);

    assert_eq!(text_at(&model, INFO_SHEET, "A3"), Some("Nitrogen"));
    assert!(model.is_column_hidden(MAIN_SHEET, 9));
    assert_eq!(model.freeze_row, Some(6));
}

#[test]
fn test_work_order_differs_only_in_presentation() {
    let config = PricingConfig::default();
    let reports = fixture_reports(&["sheet1.txt"]);
    let quote = convert_reports(&reports, &config, OutputMode::Quote).expect("quote");
    let order = convert_reports(&reports, &config, OutputMode::WorkOrder).expect("work order");

    assert_eq!(order.folder, "work orders");
    assert_eq!(text_at(&order, MAIN_SHEET, "M5"), Some("Order value"));
    assert_eq!(text_at(&quote, MAIN_SHEET, "M5"), Some("Price"));
    for cell in ["H6", "I6", "J6", "K6", "L6", "M6", "N6"] {
        assert_eq!(quote.value(MAIN_SHEET, cell), order.value(MAIN_SHEET, cell));
    }
    assert!(order.is_column_hidden(MAIN_SHEET, 12));
    assert!(!quote.is_column_hidden(MAIN_SHEET, 12));
}

#[test]
fn test_empty_catalogue_layout() {
    let config = PricingConfig::default();
    let model = convert_reports(&[report("empty.txt", 1, "ST-16", &[])], &config, OutputMode::Quote)
        .expect("converted");

    let table = model.table.as_ref().expect("table");
    assert_eq!(table.data_rows, 0);
    assert!(model.images.is_empty());
    for cell in ["C6", "D6", "E6", "J6", "K6", "M6", "N6", "O6", "P6", "Q6"] {
        let formula = model
            .value(MAIN_SHEET, cell)
            .and_then(CellValue::as_formula)
            .unwrap_or_else(|| panic!("no totals formula at {cell}"));
        assert!(formula.contains("Parts["), "{cell}: {formula}");
    }

    let state = ReviewState::default();
    let totals = QuoteTotals::compute(&state.parts, &state.sheet_runs, &config, "Nitrogen")
        .expect("valid");
    assert_eq!(totals, QuoteTotals::default());
}

// ==================== Review round trip ====================

#[test]
fn test_review_edits_reach_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("review.json");
    let config = PricingConfig::default();

    let result = aggregate(&fixture_reports(&["sheet1.txt", "sheet2.txt"]), &config)
        .expect("valid");
    ReviewState::from(result).save(&path).expect("save");

    let mut state = ReviewState::load(&path).expect("load");
    state.set_quantity("GUSSET-03", 40).expect("known part");
    state.toggle_recut("BRACKET-01").expect("known part");
    state.save(&path).expect("save");

    let state = ReviewState::load(&path).expect("reload");
    let model = generate_workbook(&state.parts, &state.sheet_runs, &config, OutputMode::WorkOrder)
        .expect("generated");
    assert_eq!(model.value(MAIN_SHEET, "E8"), Some(&CellValue::Integer(40)));
    assert_eq!(model.value(MAIN_SHEET, "S6"), Some(&CellValue::Bool(true)));
    assert_eq!(model.value(MAIN_SHEET, "S7"), Some(&CellValue::Bool(false)));
}

#[test]
fn test_review_with_repeated_name_fails_to_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("review.json");
    let config = PricingConfig::default();

    let result =
        aggregate(&[report("a.txt", 1, "ST-16", &[("A", 5, 1.0)])], &config).expect("valid");
    let mut json: serde_json::Value =
        serde_json::to_value(ReviewState::from(result)).expect("json");
    let parts = json["parts"].as_array_mut().expect("parts list");
    let mut repeat = parts[0].clone();
    repeat["quantity"] = serde_json::json!(7);
    parts.push(repeat);
    std::fs::write(&path, json.to_string()).expect("write");

    let err = ReviewState::load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Review);
    assert!(err.to_string().contains("more than once"), "{err}");
}

#[test]
fn test_invalid_review_stops_generation() {
    let config = PricingConfig::default();
    let result = aggregate(&fixture_reports(&["sheet1.txt"]), &config).expect("valid");
    let mut state = ReviewState::from(result);
    state.set_material_for_all("Unobtainium");

    let err = generate_from_review(&state, &config, OutputMode::Quote).unwrap_err();
    match err {
        QuoteError::ValidationFailed { errors } => {
            assert!(errors.iter().all(|e| e.contains("Unobtainium")));
        }
        other => panic!("Expected ValidationFailed, got {other:?}"),
    }
}

// ==================== Configuration ====================

#[test]
fn test_toml_config_drives_resolution() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pricing.toml");
    std::fs::write(
        &path,
        r#"
default_gas = "Oxygen"
overhead = 0.1
profit_margin = 0.25

[[materials]]
code = "CU"
name = "Copper"

[[gauges]]
code = "20"
label = "20 GA"

[[gases]]
name = "Oxygen"
cost_per_hour = 40.0

[[prices]]
material = "Copper"
gauge = "20 GA"
per_pound = 5.5
per_square_foot = 12.0
"#,
    )
    .expect("write");

    let config = PricingConfig::load(&path).expect("valid config");
    let result =
        aggregate(&[report("cu.txt", 1, "CU-20", &[("TAB", 2, 0.5)])], &config).expect("valid");
    let part = result.catalogue.get("TAB").expect("part");
    assert_eq!(part.material, "Copper");
    assert_eq!(part.gauge, "20 GA");

    let model = generate_workbook(
        &result.catalogue,
        &result.sheet_runs,
        &config,
        OutputMode::Quote,
    )
    .expect("generated");
    assert_eq!(text_at(&model, MAIN_SHEET, "V2"), Some("Oxygen"));
    assert_eq!(
        model.value(MAIN_SHEET, "V4").and_then(CellValue::as_number),
        Some(0.25)
    );
}

#[test]
fn test_example_config_is_valid() {
    let config = PricingConfig::load("../pricing.example.toml").expect("valid example config");
    assert_eq!(config.material_name("SS"), Some("304 SS"));
    assert!(config.is_plate_gauge("250"));
    assert_eq!(config.price("Plate", "1/4\"").map(|p| p.per_square_foot), Some(6.12));
}

#[test]
fn test_example_config_rejects_unpriced_sheet() {
    let config = PricingConfig::load("../pricing.example.toml").expect("valid example config");
    let err = aggregate(&[report("ss.txt", 1, "SS-16", &[("A", 1, 10.0)])], &config)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
    assert!(matches!(
        err,
        QuoteError::UnresolvedPrice { ref material, ref gauge, .. }
            if material == "304 SS" && gauge == "16 GA"
    ));

    // Priced pairs still convert, and the missing pair stays blank in the reference block.
    let model = convert_reports(
        &[report("st.txt", 1, "ST-16", &[("A", 1, 10.0)])],
        &config,
        OutputMode::Quote,
    )
    .expect("converted");
    assert_eq!(model.value(INFO_SHEET, "A8").and_then(CellValue::as_text), Some("304 SS"));
    assert_eq!(model.value(INFO_SHEET, "B8"), None);
}
