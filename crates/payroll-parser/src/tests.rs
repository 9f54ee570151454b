use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use crate::errors::ParserError;
use crate::formats::{infer_cell, normalize_headers, serial_to_datetime, CsvTableParser};
use crate::model::{Cell, TableFormat};
use crate::parse_tabular;
use crate::registry::{parse_with_parsers, TabularParser};

fn fixture(path: &str) -> Vec<u8> {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn staff_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let time_format = Format::new().set_num_format("hh:mm");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Staff").unwrap();
    for (col, header) in ["name", "employeeId", "salaryPerDay", "isActive", "dob", "startTime"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "Asha Menon").unwrap();
    sheet.write_string(1, 1, "EMP010").unwrap();
    sheet.write_number(1, 2, 500).unwrap();
    sheet.write_boolean(1, 3, false).unwrap();
    sheet
        .write_datetime_with_format(1, 4, &ExcelDateTime::from_ymd(2024, 8, 15).unwrap(), &date_format)
        .unwrap();
    sheet
        .write_datetime_with_format(1, 5, &ExcelDateTime::from_hms(9, 0, 0).unwrap(), &time_format)
        .unwrap();
    sheet.write_string(3, 0, "Ravi Shankar").unwrap();
    sheet.write_string(3, 1, "EMP011").unwrap();

    let other = workbook.add_worksheet();
    other.set_name("Ignored").unwrap();
    other.write_string(0, 0, "unrelated").unwrap();
    other.write_string(1, 0, "value").unwrap();

    workbook.save_to_buffer().expect("workbook should serialize")
}

#[test]
fn parses_employee_csv_with_typed_cells() {
    let parsed = parse_tabular(&fixture("employees.csv")).expect("employee csv parse failed");

    assert_eq!(parsed.format, TableFormat::Csv);
    assert!(parsed.sheet_name.is_none());
    assert_eq!(
        parsed.headers,
        vec![
            "name",
            "employeeId",
            "employeeType",
            "designation",
            "phone",
            "salaryPerDay",
            "salaryPerMonth",
            "esaPf"
        ]
    );
    assert_eq!(parsed.rows.len(), 3, "blank row should be skipped");

    let first = &parsed.rows[0];
    assert_eq!(first.get("name"), Some(&Cell::Text("John Doe".into())));
    assert_eq!(first.get("employeeId"), Some(&Cell::Text("EMP001".into())));
    assert_eq!(first.get("phone"), Some(&Cell::Number(9_876_543_210.0)));
    assert_eq!(first.get("salaryPerDay"), Some(&Cell::Number(500.0)));
    assert_eq!(first.get("esaPf"), Some(&Cell::Bool(true)));

    let second = &parsed.rows[1];
    assert_eq!(second.get("employeeType"), Some(&Cell::Text("Labour".into())));
    assert_eq!(second.get("phone"), Some(&Cell::Empty));
    assert_eq!(second.get("esaPf"), Some(&Cell::Bool(false)));

    let third = &parsed.rows[2];
    assert_eq!(third.get("employeeId"), Some(&Cell::Text("007".into())));
    assert_eq!(third.get("salaryPerDay"), Some(&Cell::Text("abc".into())));
}

#[test]
fn rows_keep_header_order() {
    let parsed = parse_tabular(&fixture("shifts.csv")).expect("shift csv parse failed");
    let keys: Vec<&str> = parsed.rows[1].keys().collect();
    assert_eq!(keys, parsed.headers.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(parsed.rows[1].get("duration"), Some(&Cell::Empty));
    assert_eq!(parsed.rows.len(), 2);
}

#[test]
fn header_only_file_is_reported_as_empty() {
    let err = parse_tabular(&fixture("headers_only.csv")).expect_err("expected empty data");
    assert!(err.is_empty_file(), "unexpected error: {err}");
}

#[test]
fn zero_byte_file_is_reported_as_empty() {
    let err = parse_tabular(&[]).expect_err("expected empty data");
    assert!(err.is_empty_file(), "unexpected error: {err}");
}

#[test]
fn binary_buffer_is_rejected_by_every_parser() {
    let garbage = [0u8, 159, 146, 150, 0, 1];
    match parse_tabular(&garbage) {
        Err(ParserError::NoMatchingParser { attempts }) => {
            let names: Vec<&str> = attempts.iter().map(|attempt| attempt.parser).collect();
            assert_eq!(names, vec!["workbook", "csv_table"]);
        }
        other => panic!("expected NoMatchingParser, got {other:?}"),
    }
}

#[test]
fn awkward_headers_are_normalized() {
    let parsed = parse_tabular(&fixture("awkward_headers.csv")).expect("csv parse failed");
    assert_eq!(parsed.headers, vec!["name", "name_1", "__EMPTY", "designation"]);
    assert_eq!(parsed.rows[0].get("name_1"), Some(&Cell::Text("B".into())));
}

#[test]
fn cells_past_the_last_header_get_empty_keys() {
    let content = b"name,code\nAcme,1,extra,\nGlobex,2\n";
    let parsed = CsvTableParser.parse(content).expect("csv parse failed");

    assert_eq!(parsed.headers, vec!["name", "code", "__EMPTY"]);
    assert_eq!(parsed.rows[0].get("__EMPTY"), Some(&Cell::Text("extra".into())));
    assert_eq!(parsed.rows[1].get("__EMPTY"), Some(&Cell::Empty));
}

#[test]
fn normalize_headers_avoids_collisions_with_existing_suffixes() {
    let headers = normalize_headers(vec![
        "a".to_string(),
        "a_1".to_string(),
        "a".to_string(),
        "".to_string(),
        " ".to_string(),
    ]);
    assert_eq!(headers, vec!["a", "a_1", "a_2", "__EMPTY", "__EMPTY_1"]);
}

#[test]
fn infer_cell_follows_spreadsheet_typing() {
    assert_eq!(infer_cell(""), Cell::Empty);
    assert_eq!(infer_cell("  "), Cell::Empty);
    assert_eq!(infer_cell("TRUE"), Cell::Bool(true));
    assert_eq!(infer_cell("false"), Cell::Bool(false));
    assert_eq!(infer_cell("42"), Cell::Number(42.0));
    assert_eq!(infer_cell("-3.5"), Cell::Number(-3.5));
    assert_eq!(infer_cell("0.25"), Cell::Number(0.25));
    assert_eq!(infer_cell("0"), Cell::Number(0.0));
    assert_eq!(infer_cell("0042"), Cell::Text("0042".into()));
    assert_eq!(infer_cell("09:00"), Cell::Text("09:00".into()));
    assert_eq!(infer_cell("2024-08-15"), Cell::Text("2024-08-15".into()));
    assert_eq!(infer_cell("inf"), Cell::Text("inf".into()));
}

#[test]
fn serial_dates_use_the_1900_system() {
    let timestamp = serial_to_datetime(45519.0).expect("valid serial");
    assert_eq!(timestamp.date(), NaiveDate::from_ymd_opt(2024, 8, 15).unwrap());

    let half_day = serial_to_datetime(45519.5).expect("valid serial");
    assert_eq!(half_day.format("%H:%M").to_string(), "12:00");

    assert!(serial_to_datetime(-1.0).is_none());
    assert!(serial_to_datetime(f64::NAN).is_none());
}

#[test]
fn parses_first_sheet_of_workbook() {
    let parsed = parse_tabular(&staff_workbook()).expect("workbook parse failed");

    assert_eq!(parsed.format, TableFormat::Workbook);
    assert_eq!(parsed.sheet_name.as_deref(), Some("Staff"));
    assert_eq!(
        parsed.headers,
        vec!["name", "employeeId", "salaryPerDay", "isActive", "dob", "startTime"]
    );
    assert_eq!(parsed.rows.len(), 2, "blank row between records is skipped");

    let first = &parsed.rows[0];
    assert_eq!(first.get("name"), Some(&Cell::Text("Asha Menon".into())));
    assert_eq!(first.get("salaryPerDay"), Some(&Cell::Number(500.0)));
    assert_eq!(first.get("isActive"), Some(&Cell::Bool(false)));
    assert_eq!(first.get("dob"), Some(&Cell::Text("2024-08-15".into())));
    assert_eq!(first.get("startTime"), Some(&Cell::Text("09:00".into())));

    let second = &parsed.rows[1];
    assert_eq!(second.get("employeeId"), Some(&Cell::Text("EMP011".into())));
    assert_eq!(second.get("dob"), Some(&Cell::Empty));
}

#[test]
fn registry_stops_at_first_hard_failure() {
    struct AlwaysMismatch;
    impl TabularParser for AlwaysMismatch {
        fn name(&self) -> &'static str {
            "always_mismatch"
        }
        fn parse(&self, _content: &[u8]) -> Result<crate::ParsedTable, ParserError> {
            Err(ParserError::FormatMismatch {
                parser: "always_mismatch",
                reason: "never matches".to_string(),
            })
        }
    }

    let mismatch = AlwaysMismatch;
    let csv_table = CsvTableParser;
    let parsers: [&dyn TabularParser; 2] = [&mismatch, &csv_table];

    let parsed = parse_with_parsers(&fixture("holidays.csv"), &parsers).expect("csv fallback");
    assert_eq!(parsed.rows.len(), 2);

    let err = parse_with_parsers(&fixture("headers_only.csv"), &parsers).expect_err("empty");
    assert!(matches!(err, ParserError::EmptyData { parser: "csv_table" }));
}

#[test]
fn raw_rows_serialize_as_json_objects() {
    let parsed = parse_tabular(&fixture("holidays.csv")).expect("holiday csv parse failed");
    let json = serde_json::to_string(&parsed.rows[0]).expect("serialize row");
    assert_eq!(
        json,
        r#"{"name":"Independence Day","date":"2024-08-15","type":"national","applicableTo":"both","isRecurring":true}"#
    );
}
