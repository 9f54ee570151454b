use once_cell::sync::Lazy;
use payroll_parser::{Cell, RawRow};

use crate::types::ImportableType;

/// Static description of one importable record type.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub import_type: ImportableType,
    pub display_name: &'static str,
    pub description: &'static str,
    pub required_fields: &'static [&'static str],
    /// Example record written to the downloadable template.
    pub sample: RawRow,
}

fn sample(fields: Vec<(&'static str, Cell)>) -> RawRow {
    fields.into_iter().collect()
}

static SCHEMAS: Lazy<Vec<SchemaEntry>> = Lazy::new(|| {
    vec![
        SchemaEntry {
            import_type: ImportableType::Employees,
            display_name: "Employees",
            description: "Import employee records with personal and job information",
            required_fields: &["name", "employeeId", "employeeType", "designation"],
            sample: sample(vec![
                ("name", "John Doe".into()),
                ("employeeId", "EMP001".into()),
                ("employeeType", "staff".into()),
                ("designation", "Manager".into()),
                ("phone", "9876543210".into()),
                ("address", "123 Main St".into()),
                ("salaryPerDay", 500.0.into()),
                ("salaryPerMonth", 15000.0.into()),
            ]),
        },
        SchemaEntry {
            import_type: ImportableType::Companies,
            display_name: "Companies",
            description: "Import company master data",
            required_fields: &["name"],
            sample: sample(vec![("name", "ABC Corporation".into())]),
        },
        SchemaEntry {
            import_type: ImportableType::Shifts,
            display_name: "Shifts",
            description: "Import shift timings and configurations",
            required_fields: &["name", "startTime", "endTime"],
            sample: sample(vec![
                ("name", "Morning Shift".into()),
                ("startTime", "09:00".into()),
                ("endTime", "17:00".into()),
                ("duration", 8.0.into()),
                ("applicableTo", "both".into()),
            ]),
        },
        SchemaEntry {
            import_type: ImportableType::Holidays,
            display_name: "Holidays",
            description: "Import holiday calendar",
            required_fields: &["name", "date"],
            sample: sample(vec![
                ("name", "Independence Day".into()),
                ("date", "2024-08-15".into()),
                ("type", "national".into()),
                ("applicableTo", "both".into()),
            ]),
        },
    ]
});

pub fn all_schemas() -> &'static [SchemaEntry] {
    SCHEMAS.as_slice()
}

pub fn schema_for(import_type: ImportableType) -> &'static SchemaEntry {
    SCHEMAS
        .iter()
        .find(|entry| entry.import_type == import_type)
        .unwrap_or_else(|| unreachable!("every importable type has a schema entry"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_exactly_one_entry() {
        for import_type in ImportableType::ALL {
            let matches = all_schemas()
                .iter()
                .filter(|entry| entry.import_type == import_type)
                .count();
            assert_eq!(matches, 1, "{import_type}");
        }
    }

    #[test]
    fn samples_satisfy_their_required_fields() {
        for entry in all_schemas() {
            for field in entry.required_fields {
                assert!(
                    entry.sample.value(field).is_some(),
                    "{} sample is missing {field}",
                    entry.import_type
                );
            }
        }
    }
}
