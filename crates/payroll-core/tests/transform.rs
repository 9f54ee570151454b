use chrono::{TimeZone, Utc};
use payroll_core::transform::transform_at;
use payroll_core::types::{
    ApplicableTo, CanonicalRecord, EmployeeType, HolidayType, MaritalStatus, SalaryMode,
};
use payroll_core::validation::validate;
use payroll_core::{Cell, ImportableType, RawRow};
use serde_json::json;

fn row(fields: Vec<(&str, Cell)>) -> RawRow {
    fields.into_iter().collect()
}

#[test]
fn employee_defaults_are_injected() {
    let source = row(vec![
        ("name", "A".into()),
        ("employeeId", "E3".into()),
        ("employeeType", "STAFF".into()),
        ("designation", "X".into()),
    ]);
    let outcome = validate(std::slice::from_ref(&source), ImportableType::Employees);
    assert_eq!(outcome.valid.len(), 1);

    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let CanonicalRecord::Employee(employee) =
        transform_at(&outcome.valid[0], ImportableType::Employees, now)
    else {
        panic!("expected an employee record");
    };

    assert_eq!(employee.employee_type, EmployeeType::Staff);
    assert_eq!(employee.salary_per_day, 0.0);
    assert_eq!(employee.salary_per_month, 0.0);
    assert!(employee.is_active);
    assert!(!employee.esa_pf);
    assert_eq!(employee.marital_status, MaritalStatus::Single);
    assert_eq!(employee.salary_mode, SalaryMode::Cash);
    assert_eq!(employee.dob, now);
    assert_eq!(employee.date_of_joining, now);

    let document = CanonicalRecord::Employee(employee).to_document().unwrap();
    assert_eq!(document["employeeType"], json!("staff"));
    assert_eq!(document["salaryPerDay"], json!(0.0));
    assert_eq!(document["isActive"], json!(true));
    assert_eq!(document["companyId"], json!(""));
    assert_eq!(document["dob"], json!("2024-03-01T12:00:00Z"));
}

#[test]
fn transform_is_deterministic_for_a_fixed_clock() {
    let source = row(vec![
        ("name", "Ravi".into()),
        ("employeeId", "E7".into()),
        ("employeeType", "labour".into()),
        ("designation", "Welder".into()),
        ("salaryPerDay", 650.0.into()),
        ("esaPf", true.into()),
        ("isActive", false.into()),
        ("maritalStatus", "Married".into()),
        ("salaryMode", "bank".into()),
        ("companyId", "c-1".into()),
        ("phone", "9876543210".into()),
    ]);
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let first = transform_at(&source, ImportableType::Employees, now);
    let second = transform_at(&source, ImportableType::Employees, now);
    assert_eq!(first, second);

    let document = first.to_document().unwrap();
    assert_eq!(document["employeeType"], json!("labour"));
    assert_eq!(document["salaryPerDay"], json!(650.0));
    assert_eq!(document["esaPf"], json!(true));
    assert_eq!(document["isActive"], json!(false));
    assert_eq!(document["maritalStatus"], json!("married"));
    assert_eq!(document["salaryMode"], json!("bank"));
    assert_eq!(document["companyId"], json!(""));
    assert_eq!(document["phone"], json!("9876543210"));
}

#[test]
fn holiday_values_fall_back_to_defaults() {
    let source = row(vec![
        ("name", "Founders Day".into()),
        ("date", "15th of May".into()),
        ("type", "Bank Holiday".into()),
        ("isRecurring", "yes".into()),
    ]);
    let now = Utc::now();

    let CanonicalRecord::Holiday(holiday) = transform_at(&source, ImportableType::Holidays, now)
    else {
        panic!("expected a holiday record");
    };
    assert_eq!(holiday.date, None);
    assert_eq!(holiday.holiday_type, HolidayType::Company);
    assert_eq!(holiday.applicable_to, ApplicableTo::Both);
    assert!(!holiday.is_recurring);

    let document = CanonicalRecord::Holiday(holiday).to_document().unwrap();
    assert_eq!(document["date"], json!(null));
    assert_eq!(document["type"], json!("company"));
}

#[test]
fn holiday_serial_dates_are_read() {
    let source = row(vec![
        ("name", "Independence Day".into()),
        ("date", 45519.0.into()),
        ("type", "national".into()),
        ("isRecurring", true.into()),
    ]);

    let document = transform_at(&source, ImportableType::Holidays, Utc::now())
        .to_document()
        .unwrap();
    assert_eq!(document["date"], json!("2024-08-15T00:00:00Z"));
    assert_eq!(document["type"], json!("national"));
    assert_eq!(document["isRecurring"], json!(true));
}

#[test]
fn shift_duration_defaults_to_eight_hours() {
    let source = row(vec![
        ("name", "Night".into()),
        ("startTime", "22:00".into()),
        ("endTime", "06:00".into()),
        ("duration", Cell::Empty),
        ("applicableTo", "Labour".into()),
    ]);

    let CanonicalRecord::Shift(shift) = transform_at(&source, ImportableType::Shifts, Utc::now())
    else {
        panic!("expected a shift record");
    };
    assert_eq!(shift.duration, 8.0);
    assert_eq!(shift.applicable_to, ApplicableTo::Labour);
    assert!(shift.is_active);
    assert_eq!(shift.start_time, "22:00");
}

#[test]
fn companies_pass_through_unchanged() {
    let source = row(vec![("name", "ABC Corporation".into()), ("code", 12.0.into())]);

    let record = transform_at(&source, ImportableType::Companies, Utc::now());
    assert_eq!(record, CanonicalRecord::Passthrough(source));
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({"name": "ABC Corporation", "code": 12})
    );
}
