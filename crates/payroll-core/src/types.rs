use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use payroll_parser::RawRow;
use serde::Serialize;

use crate::error::UnknownVariant;
use crate::store::Document;

/// The closed set of record kinds the import pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportableType {
    Employees,
    Companies,
    Shifts,
    Holidays,
}

impl ImportableType {
    pub const ALL: [ImportableType; 4] = [
        ImportableType::Employees,
        ImportableType::Companies,
        ImportableType::Shifts,
        ImportableType::Holidays,
    ];

    /// Identifier used in template file names; also the store collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportableType::Employees => "employees",
            ImportableType::Companies => "companies",
            ImportableType::Shifts => "shifts",
            ImportableType::Holidays => "holidays",
        }
    }

    pub fn collection(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ImportableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportableType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "employees" | "employee" => Ok(ImportableType::Employees),
            "companies" | "company" => Ok(ImportableType::Companies),
            "shifts" | "shift" => Ok(ImportableType::Shifts),
            "holidays" | "holiday" => Ok(ImportableType::Holidays),
            _ => Err(UnknownVariant::new("import type", value)),
        }
    }
}

/// Lower-cased enumerated field with a fixed vocabulary.
pub trait Vocabulary: Sized + Copy {
    const FIELD: &'static str;
    fn parse(value: &str) -> Option<Self>;
}

macro_rules! vocabulary {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Vocabulary for $name {
            const FIELD: &'static str = $field;

            fn parse(value: &str) -> Option<Self> {
                match value.trim().to_lowercase().as_str() {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(EmployeeType, "employeeType", { Staff => "staff", Labour => "labour" });
vocabulary!(MaritalStatus, "maritalStatus", {
    Single => "single",
    Married => "married",
    Divorced => "divorced",
    Widowed => "widowed",
});
vocabulary!(SalaryMode, "salaryMode", { Cash => "cash", Bank => "bank", Cheque => "cheque" });
vocabulary!(HolidayType, "type", {
    National => "national",
    Company => "company",
    Festival => "festival",
    Optional => "optional",
});
vocabulary!(ApplicableTo, "applicableTo", { Staff => "staff", Labour => "labour", Both => "both" });

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub name: String,
    pub employee_id: String,
    pub employee_type: EmployeeType,
    pub designation: String,
    pub dob: DateTime<Utc>,
    pub date_of_joining: DateTime<Utc>,
    pub salary_per_day: f64,
    pub salary_per_month: f64,
    pub is_active: bool,
    pub esa_pf: bool,
    pub marital_status: MaritalStatus,
    pub salary_mode: SalaryMode,
    /// Foreign keys stay empty until mapped by hand after import.
    pub company_id: String,
    pub unit_id: String,
    pub group_id: String,
    pub shift_id: String,
    #[serde(flatten)]
    pub extra: RawRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRecord {
    pub name: String,
    /// `None` when the source value could not be read as a date.
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub holiday_type: HolidayType,
    pub applicable_to: ApplicableTo,
    pub is_recurring: bool,
    #[serde(flatten)]
    pub extra: RawRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: f64,
    pub applicable_to: ApplicableTo,
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: RawRow,
}

/// Persistence-ready shape of one imported row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalRecord {
    Employee(EmployeeRecord),
    Holiday(HolidayRecord),
    Shift(ShiftRecord),
    Passthrough(RawRow),
}

impl CanonicalRecord {
    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "record serialized to {other} instead of an object"
            ))),
        }
    }
}
