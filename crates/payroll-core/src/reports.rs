//! Monthly allowance report: one sheet per calendar month with a totals row.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use futures::future::try_join;
use serde_json::Value;
use tracing::info;

use crate::dates::parse_date_value;
use crate::error::Result;
use crate::export::ExportFile;
use crate::sheet::{value_text, write_xlsx, Sheet};
use crate::store::{Document, DocumentStore};

pub const REPORT_FILENAME: &str = "Allowance_Report.xlsx";
const UNDATED_SHEET: &str = "Undated";
const HEADERS: [&str; 5] = ["Employee Name", "Employee ID", "Date", "Type", "Amount"];

pub async fn allowance_report(store: &dyn DocumentStore) -> Result<ExportFile> {
    let (allowances, employees) = try_join(
        store.get_all("allowances", Some("date")),
        store.get_all("employees", None),
    )
    .await?;

    let sheets = monthly_sheets(&allowances, &employees);
    let bytes = write_xlsx(&sheets)?;

    info!(
        allowances = allowances.len(),
        months = sheets.len(),
        "allowance report written"
    );
    Ok(ExportFile {
        filename: REPORT_FILENAME.to_string(),
        bytes,
    })
}

/// Group allowances by month in chronological order; allowances whose date
/// cannot be read go to a trailing `Undated` sheet.
pub fn monthly_sheets(allowances: &[Document], employees: &[Document]) -> Vec<Sheet> {
    let by_id: HashMap<&str, &Document> = employees
        .iter()
        .filter_map(|employee| Some((employee.get("id")?.as_str()?, employee)))
        .collect();

    let mut months: BTreeMap<(i32, u32), Vec<&Document>> = BTreeMap::new();
    let mut undated = Vec::new();
    for allowance in allowances {
        match allowance.get("date").and_then(parse_date_value) {
            Some(date) => months
                .entry((date.year(), date.month()))
                .or_default()
                .push(allowance),
            None => undated.push(allowance),
        }
    }

    let mut sheets: Vec<Sheet> = months
        .into_iter()
        .map(|((year, month), records)| {
            let name = NaiveDate::from_ymd_opt(year, month, 1)
                .map(|first| first.format("%B %Y").to_string())
                .unwrap_or_else(|| format!("{year}-{month:02}"));
            month_sheet(name, &records, &by_id)
        })
        .collect();

    if !undated.is_empty() {
        sheets.push(month_sheet(UNDATED_SHEET.to_string(), &undated, &by_id));
    }

    sheets
}

fn month_sheet(name: String, records: &[&Document], employees: &HashMap<&str, &Document>) -> Sheet {
    let mut sheet = Sheet::new(name, HEADERS.iter().map(|header| header.to_string()).collect());
    let mut total = 0.0;

    for record in records {
        let employee = record
            .get("employeeId")
            .and_then(Value::as_str)
            .and_then(|id| employees.get(id));

        let employee_name = employee
            .and_then(|employee| employee.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown");
        let employee_code = employee
            .and_then(|employee| employee.get("employeeId"))
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));

        let date = match record.get("date") {
            Some(raw) => match parse_date_value(raw) {
                Some(date) => date.format("%d/%m/%Y").to_string(),
                None => value_text(raw),
            },
            None => String::new(),
        };

        let kind = match record.get("type").and_then(Value::as_str) {
            Some("food") => "Food",
            _ => "Advance",
        };

        let amount = record.get("amount").cloned().unwrap_or(Value::Null);
        total += amount.as_f64().unwrap_or(0.0);

        sheet.push_row(vec![
            Value::from(employee_name),
            employee_code,
            Value::from(date),
            Value::from(kind),
            amount,
        ]);
    }

    sheet.push_blank_row();
    sheet.push_row(vec![
        Value::from("Total Records"),
        Value::from(records.len()),
        Value::Null,
        Value::Null,
        Value::from(total),
    ]);

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn groups_by_month_with_totals() {
        let employees = vec![doc(json!({"id": "e1", "name": "Asha", "employeeId": "EMP001"}))];
        let allowances = vec![
            doc(json!({"employeeId": "e1", "date": "2024-01-05", "type": "food", "amount": 50})),
            doc(json!({"employeeId": "e1", "date": "2024-01-20", "type": "advance", "amount": 200})),
            doc(json!({"employeeId": "gone", "date": "2024-02-01T00:00:00Z", "type": "food", "amount": 25.5})),
            doc(json!({"employeeId": "e1", "date": "someday", "type": "food", "amount": 5})),
        ];

        let sheets = monthly_sheets(&allowances, &employees);
        let names: Vec<_> = sheets.iter().map(|sheet| sheet.name.as_str()).collect();
        assert_eq!(names, ["January 2024", "February 2024", "Undated"]);

        let january = &sheets[0];
        assert_eq!(january.headers, HEADERS);
        assert_eq!(
            january.rows[0],
            vec![json!("Asha"), json!("EMP001"), json!("05/01/2024"), json!("Food"), json!(50)]
        );
        assert_eq!(january.rows[1][3], json!("Advance"));
        assert!(january.rows[2].is_empty());
        assert_eq!(
            january.rows[3],
            vec![json!("Total Records"), json!(2), Value::Null, Value::Null, json!(250.0)]
        );

        let february = &sheets[1];
        assert_eq!(february.rows[0][0], json!("Unknown"));
        assert_eq!(february.rows[0][1], json!(""));

        assert_eq!(sheets[2].rows[0][2], json!("someday"));
    }
}
