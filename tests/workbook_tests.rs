//! Integration tests for the SQL-backed workbook facade.

use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use sheetbridge::{report, BridgeError, CellValue, SqlWorkbook};
use std::path::Path;
use tempfile::TempDir;

/// Sheet1: Name/Age header plus three data rows.
fn write_people_xlsx(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1").unwrap();
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_string(0, 1, "Age").unwrap();
    for (i, (name, age)) in [("Ann", 30.0), ("Bo", 41.0), ("Cy", 25.0)].iter().enumerate() {
        sheet.write_string((i + 1) as u32, 0, *name).unwrap();
        sheet.write_number((i + 1) as u32, 1, *age).unwrap();
    }
    workbook.save(path).unwrap();
}

fn open_mapped(path: &Path) -> SqlWorkbook {
    let mut workbook = SqlWorkbook::open(path).unwrap();
    workbook.map_sheets_to_tables(None).unwrap();
    workbook
}

#[test]
fn open_missing_file_fails_with_file_not_found() {
    let err = SqlWorkbook::open("/nonexistent/missing.xlsx").unwrap_err();
    assert!(matches!(err, BridgeError::FileNotFound(_)));
}

#[test]
fn open_unparseable_file_fails_with_format_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.xlsx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let err = SqlWorkbook::open(&path).unwrap_err();
    assert!(matches!(err, BridgeError::Format(_)));
}

#[test]
fn query_before_mapping_fails_with_table_not_mapped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);

    let workbook = SqlWorkbook::open(&path).unwrap();
    let err = workbook.run_query("SELECT COUNT(*) FROM Sheet1").unwrap_err();
    assert!(matches!(err, BridgeError::TableNotMapped(ref t) if t == "Sheet1"));
}

#[test]
fn count_and_filter_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);
    let workbook = open_mapped(&path);

    let count = workbook.run_query("SELECT COUNT(*) AS n FROM Sheet1").unwrap();
    assert_eq!(count.cell(0, "n"), Some(&CellValue::Int(3)));

    let adults = workbook
        .run_query("SELECT Name FROM Sheet1 WHERE Age > 28")
        .unwrap();
    let names: Vec<String> = adults.rows.iter().map(|r| r[0].to_string()).collect();
    assert_eq!(names, vec!["Ann".to_string(), "Bo".to_string()]);
}

#[test]
fn mapping_reports_tables_and_columns_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);
    let mut workbook = SqlWorkbook::open(&path).unwrap();

    let created = workbook.map_sheets_to_tables(None).unwrap();
    assert_eq!(created, vec!["Sheet1".to_string()]);
    assert_eq!(workbook.list_tables().unwrap(), vec!["Sheet1".to_string()]);

    let info = workbook.describe_table("Sheet1").unwrap();
    let columns: Vec<&str> = info.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["Name", "Age"]);
    assert_eq!(info.row_count, 3);
}

#[test]
fn sheet_names_with_special_characters_are_sanitized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pnl.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("P&L 2025").unwrap();
    sheet.write_string(0, 0, "Item").unwrap();
    sheet.write_string(1, 0, "Revenue").unwrap();
    workbook.save(&path).unwrap();

    let workbook = open_mapped(&path);
    assert_eq!(workbook.list_tables().unwrap(), vec!["P_L_2025".to_string()]);
    assert_eq!(
        workbook
            .run_query("SELECT COUNT(*) AS n FROM P_L_2025")
            .unwrap()
            .cell(0, "n"),
        Some(&CellValue::Int(1))
    );
}

#[test]
fn colliding_sanitized_names_keep_the_first_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("collide.xlsx");

    // "A B" and "A-B" both sanitize to "A_B".
    let mut workbook = Workbook::new();
    let first = workbook.add_worksheet();
    first.set_name("A B").unwrap();
    first.write_string(0, 0, "v").unwrap();
    first.write_number(1, 0, 1.0).unwrap();
    first.write_number(2, 0, 2.0).unwrap();
    let second = workbook.add_worksheet();
    second.set_name("A-B").unwrap();
    second.write_string(0, 0, "v").unwrap();
    second.write_number(1, 0, 9.0).unwrap();
    workbook.save(&path).unwrap();

    let mut workbook = SqlWorkbook::open(&path).unwrap();
    let created = workbook.map_sheets_to_tables(None).unwrap();
    assert_eq!(created, vec!["A_B".to_string()]);

    // The later sheet is skipped, not silently overwriting the first.
    let count = workbook.run_query("SELECT COUNT(*) AS n FROM A_B").unwrap();
    assert_eq!(count.cell(0, "n"), Some(&CellValue::Int(2)));
}

#[test]
fn mapping_a_selection_leaves_other_sheets_unmapped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multi.xlsx");

    let mut workbook = Workbook::new();
    for name in ["First", "Second"] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).unwrap();
        sheet.write_string(0, 0, "v").unwrap();
        sheet.write_number(1, 0, 1.0).unwrap();
    }
    workbook.save(&path).unwrap();

    let mut workbook = SqlWorkbook::open(&path).unwrap();
    // "Missing" is warned about and skipped, not an error.
    let created = workbook
        .map_sheets_to_tables(Some(&["Second", "Missing"]))
        .unwrap();
    assert_eq!(created, vec!["Second".to_string()]);

    assert!(workbook.run_query("SELECT * FROM Second").is_ok());
    assert!(matches!(
        workbook.run_query("SELECT * FROM First"),
        Err(BridgeError::TableNotMapped(_))
    ));
}

#[test]
fn empty_sheet_is_skipped_without_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.xlsx");

    let mut workbook = Workbook::new();
    workbook.add_worksheet().set_name("Blank").unwrap();
    workbook.save(&path).unwrap();

    let mut workbook = SqlWorkbook::open(&path).unwrap();
    let created = workbook.map_sheets_to_tables(None).unwrap();
    assert!(created.is_empty());
    assert!(workbook.list_tables().unwrap().is_empty());
}

#[test]
fn mutation_returns_affected_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);
    let workbook = open_mapped(&path);

    let affected = workbook
        .run_mutation("UPDATE Sheet1 SET Age = Age + 1 WHERE Age < 40")
        .unwrap();
    assert_eq!(affected, 2);

    let deleted = workbook.run_mutation("DELETE FROM Sheet1 WHERE Age > 40").unwrap();
    assert_eq!(deleted, 2);
}

#[test]
fn select_star_round_trip_preserves_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);
    let mut workbook = open_mapped(&path);

    workbook
        .rewrite_sheet_from_query("Sheet1", "SELECT * FROM Sheet1")
        .unwrap();
    let out = dir.path().join("out.xlsx");
    workbook.save(Some(out.as_path())).unwrap();

    let reloaded = SqlWorkbook::open(&out).unwrap();
    let sheet = reloaded.sheet("Sheet1").unwrap();
    assert_eq!(sheet.columns, vec!["Name", "Age"]);
    assert_eq!(sheet.row_count(), 3);
}

#[test]
fn rewrite_fully_replaces_prior_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);
    let mut workbook = open_mapped(&path);

    // 3 rows in, 2 rows out: prior contents must be discarded entirely.
    workbook
        .rewrite_sheet_from_query("Sheet1", "SELECT Name FROM Sheet1 WHERE Age > 28")
        .unwrap();

    let sheet = workbook.sheet("Sheet1").unwrap();
    assert_eq!(sheet.columns, vec!["Name"]);
    assert_eq!(sheet.row_count(), 2);
}

#[test]
fn rewrite_creates_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);
    let mut workbook = open_mapped(&path);

    workbook
        .rewrite_sheet_from_query("Summary", "SELECT AVG(Age) AS avg_age FROM Sheet1")
        .unwrap();

    assert_eq!(workbook.sheet_names(), vec!["Sheet1", "Summary"]);
    assert_eq!(workbook.sheet("Summary").unwrap().columns, vec!["avg_age"]);
}

#[test]
fn backup_keeps_original_bytes_across_a_mutating_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);
    let original_bytes = std::fs::read(&path).unwrap();

    let mut workbook = open_mapped(&path);
    let backup_path = workbook.backup_original(None).unwrap();
    assert_eq!(backup_path, dir.path().join("people_backup.xlsx"));

    workbook
        .rewrite_sheet_from_query("Sheet1", "SELECT Name FROM Sheet1 WHERE Age > 28")
        .unwrap();
    workbook.save(None).unwrap();

    assert_eq!(std::fs::read(&backup_path).unwrap(), original_bytes);
    assert_ne!(std::fs::read(&path).unwrap(), original_bytes);
}

#[test]
fn preview_limits_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);
    let workbook = open_mapped(&path);

    let preview = workbook.preview("Sheet1", 2).unwrap();
    assert_eq!(preview.row_count(), 2);
    assert_eq!(preview.columns, vec!["Name", "Age"]);
}

#[test]
fn quick_query_is_a_one_shot_load_and_select() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);

    let result = sheetbridge::quick_query(&path, "SELECT MAX(Age) AS oldest FROM Sheet1").unwrap();
    assert_eq!(result.cell(0, "oldest"), Some(&CellValue::Int(41)));
}

#[test]
fn update_with_query_backs_up_and_rewrites() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    write_people_xlsx(&path);
    let original_bytes = std::fs::read(&path).unwrap();

    sheetbridge::update_with_query(
        &path,
        "Sheet1",
        "SELECT Name FROM Sheet1 WHERE Age > 28",
        None,
        true,
    )
    .unwrap();

    let backup = dir.path().join("people_backup.xlsx");
    assert_eq!(std::fs::read(&backup).unwrap(), original_bytes);

    let reloaded = SqlWorkbook::open(&path).unwrap();
    let sheet = reloaded.sheet("Sheet1").unwrap();
    assert_eq!(sheet.columns, vec!["Name"]);
    assert_eq!(sheet.row_count(), 2);
}

#[test]
fn file_backed_store_persists_tables() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");
    let db_path = dir.path().join("people.db");
    write_people_xlsx(&path);

    {
        let mut workbook = SqlWorkbook::open_with_db(&path, &db_path).unwrap();
        workbook.map_sheets_to_tables(None).unwrap();
    }

    // Tables survive the facade: the database file holds them.
    let store = sheetbridge::sql::SqlStore::open(&db_path).unwrap();
    let count = store.query("SELECT COUNT(*) AS n FROM Sheet1").unwrap();
    assert_eq!(count.cell(0, "n"), Some(&CellValue::Int(3)));
}

#[test]
fn data_quality_report_counts_missing_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gaps.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Data").unwrap();
    sheet.write_string(0, 0, "name").unwrap();
    sheet.write_string(0, 1, "score").unwrap();
    sheet.write_string(1, 0, "a").unwrap();
    sheet.write_number(1, 1, 10.0).unwrap();
    sheet.write_string(2, 0, "b").unwrap();
    // score missing on row 2
    sheet.write_string(3, 0, "a").unwrap();
    sheet.write_number(3, 1, 30.0).unwrap();
    workbook.save(&path).unwrap();

    let workbook = open_mapped(&path);
    let report = report::data_quality(&workbook, "Data").unwrap();

    assert_eq!(report.table.row_count, 3);
    let score = report.columns.iter().find(|c| c.name == "score").unwrap();
    assert_eq!(score.non_null_count, 2);
    assert_eq!(score.null_count, 1);
    assert_eq!(score.distinct_count, 2);
    assert!((score.completeness_pct - 66.67).abs() < 0.01);

    let name = report.columns.iter().find(|c| c.name == "name").unwrap();
    assert_eq!(name.distinct_count, 2);
    assert_eq!(name.completeness_pct, 100.0);

    // Report serializes for callers that want JSON output.
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"completeness_pct\""));
}
