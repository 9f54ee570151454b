use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use payroll_core::schema::SchemaEntry;
use payroll_core::{ImportResult, RawRow};

pub fn preview_table(headers: &[String], rows: &[RawRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());

    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| row.get(header).map(ToString::to_string).unwrap_or_default())
            .collect();
        table.add_row(cells);
    }

    table
}

pub fn result_table(result: &ImportResult) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Import result"]);
    for line in result.summary_lines() {
        table.add_row(vec![line]);
    }
    table
}

pub fn schema_table(schemas: &[SchemaEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Type", "Name", "Description", "Required columns"]);

    for entry in schemas {
        table.add_row(vec![
            entry.import_type.to_string(),
            entry.display_name.to_string(),
            entry.description.to_string(),
            entry.required_fields.join(", "),
        ]);
    }

    table
}
