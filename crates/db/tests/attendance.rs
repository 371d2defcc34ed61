//! Attendance, holidays and biometric punch storage.

use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::PgPool;
use studio_core::attendance::{AttendanceStatus, DayRecord};
use studio_db::models::attendance::CorrectAttendance;
use studio_db::models::biometric::{CreateBiometricMachine, NewPunch};
use studio_db::models::employee::CreateEmployee;
use studio_db::models::holiday::CreateHoliday;
use studio_db::repositories::{
    AttendanceLogRepo, AttendanceRepo, BiometricMachineRepo, EmployeeRepo, HolidayRepo,
};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

async fn employee(pool: &PgPool, number: &str, pin: Option<&str>) -> i64 {
    EmployeeRepo::create(
        pool,
        &CreateEmployee {
            user_id: None,
            employee_number: number.to_string(),
            full_name: format!("Employee {number}"),
            department: None,
            position: None,
            biometric_pin: pin.map(str::to_string),
            hire_date: None,
            annual_leave_quota: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn day_record(check_in_hour: u32) -> DayRecord {
    DayRecord {
        work_date: d(16),
        check_in: Utc.with_ymd_and_hms(2026, 10, 16, check_in_hour, 0, 0).unwrap(),
        check_out: None,
        status: AttendanceStatus::Present,
        late_minutes: 0,
        work_minutes: 0,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_employee_gets_default_quota(pool: PgPool) {
    let id = employee(&pool, "EMP-001", None).await;
    let emp = EmployeeRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(emp.annual_leave_quota, 12);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn machine_upsert_does_not_override_manual_correction(pool: PgPool) {
    let id = employee(&pool, "EMP-001", None).await;

    assert!(AttendanceRepo::upsert_from_punches(&pool, id, &day_record(1))
        .await
        .unwrap());
    let row = AttendanceRepo::find_for_day(&pool, id, d(16)).await.unwrap().unwrap();
    assert_eq!(row.source, "machine");

    AttendanceRepo::correct(
        &pool,
        row.id,
        &CorrectAttendance {
            notes: Some("Badge forgotten".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let updated = AttendanceRepo::upsert_from_punches(&pool, id, &day_record(2))
        .await
        .unwrap();
    assert!(!updated);
    let row = AttendanceRepo::find_for_day(&pool, id, d(16)).await.unwrap().unwrap();
    assert_eq!(row.source, "manual");
    assert_eq!(row.check_in, Some(day_record(1).check_in));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_in_only_once_per_day(pool: PgPool) {
    let id = employee(&pool, "EMP-001", None).await;
    let at = Utc.with_ymd_and_hms(2026, 10, 16, 1, 0, 0).unwrap();

    let first = AttendanceRepo::record_check_in(&pool, id, d(16), at, "present", 0)
        .await
        .unwrap();
    assert!(first.is_some());
    let second = AttendanceRepo::record_check_in(&pool, id, d(16), at, "present", 0)
        .await
        .unwrap();
    assert!(second.is_none());

    let out = Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap();
    let row = AttendanceRepo::record_check_out(&pool, first.unwrap().id, out, 540)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.work_minutes, 540);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn employees_without_record_skips_inactive_and_recorded(pool: PgPool) {
    let present = employee(&pool, "EMP-001", None).await;
    let missing = employee(&pool, "EMP-002", None).await;
    let inactive = employee(&pool, "EMP-003", None).await;
    sqlx::query("UPDATE employees SET is_active = false WHERE id = $1")
        .bind(inactive)
        .execute(&pool)
        .await
        .unwrap();
    AttendanceRepo::upsert_from_punches(&pool, present, &day_record(1))
        .await
        .unwrap();

    let ids = AttendanceRepo::employees_without_record(&pool, d(16)).await.unwrap();
    assert_eq!(ids, vec![missing]);

    assert!(AttendanceRepo::insert_status_if_missing(&pool, missing, d(16), "absent", "system")
        .await
        .unwrap());
    assert!(!AttendanceRepo::insert_status_if_missing(&pool, missing, d(16), "absent", "system")
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn holiday_dates_and_year_filter(pool: PgPool) {
    for (date, name) in [(d(20), "Founders Day"), (d(28), "Youth Pledge")] {
        HolidayRepo::create(
            &pool,
            &CreateHoliday {
                holiday_date: date,
                name: name.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let dates = HolidayRepo::dates_between(&pool, d(1), d(25)).await.unwrap();
    assert!(dates.contains(&d(20)));
    assert!(!dates.contains(&d(28)));
    assert_eq!(HolidayRepo::list(&pool, Some(2026)).await.unwrap().len(), 2);
    assert!(HolidayRepo::list(&pool, Some(2027)).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn punches_are_deduplicated_and_linked_to_employees(pool: PgPool) {
    let emp = employee(&pool, "EMP-001", Some("1001")).await;
    let machine = BiometricMachineRepo::create(
        &pool,
        &CreateBiometricMachine {
            name: "Lobby".to_string(),
            ip_address: "10.0.0.20".to_string(),
            port: None,
            location: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(machine.port, 80);

    let punch = |h: u32, pin: &str| NewPunch {
        biometric_pin: pin.to_string(),
        punched_at: Utc.with_ymd_and_hms(2026, 10, 16, h, 0, 0).unwrap(),
        verify_mode: Some("fingerprint".to_string()),
    };
    let batch = vec![punch(1, "1001"), punch(10, "1001"), punch(2, "9999")];

    let inserted = AttendanceLogRepo::insert_batch(&pool, machine.id, &batch).await.unwrap();
    assert_eq!(inserted, 3);
    let again = AttendanceLogRepo::insert_batch(&pool, machine.id, &batch).await.unwrap();
    assert_eq!(again, 0);

    let from = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap();
    let punches = AttendanceLogRepo::punches_for_employee(&pool, emp, from, to)
        .await
        .unwrap();
    assert_eq!(punches.len(), 2);

    let logs = AttendanceLogRepo::list_for_machine(&pool, machine.id, 10, 0).await.unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs.iter().any(|l| l.employee_id.is_none()));
}
