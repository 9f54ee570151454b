use chrono::{DateTime, Utc};
use payroll_parser::{Cell, RawRow};
use tracing::warn;

use crate::dates::parse_date_cell;
use crate::types::{
    ApplicableTo, CanonicalRecord, EmployeeRecord, EmployeeType, HolidayRecord, HolidayType,
    ImportableType, MaritalStatus, SalaryMode, ShiftRecord, Vocabulary,
};

const DEFAULT_SHIFT_HOURS: f64 = 8.0;

/// Coerce a validated row into the record shape the store expects.
pub fn transform(row: &RawRow, import_type: ImportableType) -> CanonicalRecord {
    transform_at(row, import_type, Utc::now())
}

/// Same as [`transform`] with an explicit "now" for absent employee dates.
pub fn transform_at(row: &RawRow, import_type: ImportableType, now: DateTime<Utc>) -> CanonicalRecord {
    match import_type {
        ImportableType::Employees => CanonicalRecord::Employee(employee(row, now)),
        ImportableType::Holidays => CanonicalRecord::Holiday(holiday(row)),
        ImportableType::Shifts => CanonicalRecord::Shift(shift(row)),
        ImportableType::Companies => CanonicalRecord::Passthrough(row.clone()),
    }
}

fn employee(row: &RawRow, now: DateTime<Utc>) -> EmployeeRecord {
    let mut fields = row.clone();

    EmployeeRecord {
        name: take_text(&mut fields, "name"),
        employee_id: take_text(&mut fields, "employeeId"),
        employee_type: take_vocabulary(&mut fields, EmployeeType::Staff),
        designation: take_text(&mut fields, "designation"),
        dob: take_date(&mut fields, "dob").unwrap_or(now),
        date_of_joining: take_date(&mut fields, "dateOfJoining").unwrap_or(now),
        salary_per_day: take_number(&mut fields, "salaryPerDay", 0.0),
        salary_per_month: take_number(&mut fields, "salaryPerMonth", 0.0),
        is_active: take_active(&mut fields, "isActive"),
        esa_pf: take_flag(&mut fields, "esaPf"),
        marital_status: take_vocabulary(&mut fields, MaritalStatus::Single),
        salary_mode: take_vocabulary(&mut fields, SalaryMode::Cash),
        company_id: clear(&mut fields, "companyId"),
        unit_id: clear(&mut fields, "unitId"),
        group_id: clear(&mut fields, "groupId"),
        shift_id: clear(&mut fields, "shiftId"),
        extra: fields,
    }
}

fn holiday(row: &RawRow) -> HolidayRecord {
    let mut fields = row.clone();

    HolidayRecord {
        name: take_text(&mut fields, "name"),
        date: take_date(&mut fields, "date"),
        holiday_type: take_vocabulary(&mut fields, HolidayType::Company),
        applicable_to: take_vocabulary(&mut fields, ApplicableTo::Both),
        is_recurring: take_flag(&mut fields, "isRecurring"),
        extra: fields,
    }
}

fn shift(row: &RawRow) -> ShiftRecord {
    let mut fields = row.clone();

    ShiftRecord {
        name: take_text(&mut fields, "name"),
        start_time: take_text(&mut fields, "startTime"),
        end_time: take_text(&mut fields, "endTime"),
        duration: take_number(&mut fields, "duration", DEFAULT_SHIFT_HOURS),
        applicable_to: take_vocabulary(&mut fields, ApplicableTo::Both),
        is_active: take_active(&mut fields, "isActive"),
        extra: fields,
    }
}

fn take_text(fields: &mut RawRow, key: &str) -> String {
    fields.remove(key).map(|cell| cell.to_string()).unwrap_or_default()
}

fn take_date(fields: &mut RawRow, key: &str) -> Option<DateTime<Utc>> {
    fields.remove(key).as_ref().and_then(parse_date_cell)
}

// Zero counts as missing, so it also falls back to the default.
fn take_number(fields: &mut RawRow, key: &str, default: f64) -> f64 {
    fields
        .remove(key)
        .and_then(|cell| cell.as_number())
        .filter(|value| *value != 0.0)
        .unwrap_or(default)
}

fn take_flag(fields: &mut RawRow, key: &str) -> bool {
    fields.remove(key).is_some_and(|cell| cell.is_true())
}

fn take_active(fields: &mut RawRow, key: &str) -> bool {
    !fields.remove(key).is_some_and(|cell| cell.is_false())
}

fn clear(fields: &mut RawRow, key: &str) -> String {
    fields.remove(key);
    String::new()
}

fn take_vocabulary<T: Vocabulary>(fields: &mut RawRow, default: T) -> T {
    let Some(cell) = fields.remove(T::FIELD) else {
        return default;
    };
    if cell.is_blank() {
        return default;
    }

    match &cell {
        Cell::Text(text) => T::parse(text).unwrap_or_else(|| {
            warn!(field = T::FIELD, value = %text, "unknown value, using default");
            default
        }),
        other => {
            warn!(field = T::FIELD, value = %other, "non-text value, using default");
            default
        }
    }
}
