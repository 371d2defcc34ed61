use std::time::Duration;

use anyhow::Context;
use chrono::NaiveTime;
use studio_core::attendance::WorkSchedule;

/// Worker configuration loaded from environment variables.
///
/// | Env Var                         | Default |
/// |---------------------------------|---------|
/// | `DATABASE_URL`                  | required |
/// | `ATTENDANCE_SYNC_INTERVAL_SECS` | `300`   |
/// | `DEVICE_TIMEOUT_SECS`           | `10`    |
/// | `NOTIFICATION_RETENTION_DAYS`   | `90`    |
///
/// plus the work schedule variables read by [`schedule_from_env`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub schedule: WorkSchedule,
    pub sync_interval: Duration,
    pub device_timeout: Duration,
    pub notification_retention_days: i64,
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;
        let sync_secs: u64 = parse_or(&get, "ATTENDANCE_SYNC_INTERVAL_SECS", 300)?;
        let timeout_secs: u64 = parse_or(&get, "DEVICE_TIMEOUT_SECS", 10)?;
        let notification_retention_days = parse_or(&get, "NOTIFICATION_RETENTION_DAYS", 90)?;

        if sync_secs == 0 {
            anyhow::bail!("ATTENDANCE_SYNC_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            database_url,
            schedule: schedule_from_vars(&get)?,
            sync_interval: Duration::from_secs(sync_secs),
            device_timeout: Duration::from_secs(timeout_secs),
            notification_retention_days,
        })
    }
}

/// Office schedule from the environment.
///
/// | Env Var            | Default |
/// |--------------------|---------|
/// | `WORK_START_TIME`  | `08:00` |
/// | `WORK_END_TIME`    | `17:00` |
/// | `LATE_GRACE_MINS`  | `15`    |
/// | `UTC_OFFSET_MINS`  | `420`   |
pub fn schedule_from_env() -> anyhow::Result<WorkSchedule> {
    schedule_from_vars(|key| std::env::var(key).ok())
}

pub fn schedule_from_vars(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<WorkSchedule> {
    let start = parse_time(get("WORK_START_TIME").as_deref().unwrap_or("08:00"), "WORK_START_TIME")?;
    let end = parse_time(get("WORK_END_TIME").as_deref().unwrap_or("17:00"), "WORK_END_TIME")?;
    let grace: i64 = parse_or(&get, "LATE_GRACE_MINS", 15)?;
    let offset: i32 = parse_or(&get, "UTC_OFFSET_MINS", 420)?;
    Ok(WorkSchedule::new(start, end, grace, offset)?)
}

fn parse_time(value: &str, key: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .with_context(|| format!("{key} must be HH:MM, got '{value}'"))
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = WorkerConfig::from_vars(vars(&[("DATABASE_URL", "postgres://x")])).unwrap();
        assert_eq!(config.sync_interval, Duration::from_secs(300));
        assert_eq!(config.device_timeout, Duration::from_secs(10));
        assert_eq!(config.notification_retention_days, 90);
        assert_eq!(config.schedule, WorkSchedule::default());
    }

    #[test]
    fn database_url_is_required() {
        assert!(WorkerConfig::from_vars(vars(&[])).is_err());
    }

    #[test]
    fn schedule_overrides() {
        let schedule = schedule_from_vars(vars(&[
            ("WORK_START_TIME", "09:30"),
            ("WORK_END_TIME", "18:00"),
            ("LATE_GRACE_MINS", "5"),
            ("UTC_OFFSET_MINS", "480"),
        ]))
        .unwrap();
        assert_eq!(schedule.start, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(schedule.late_grace_mins, 5);
        assert_eq!(schedule.utc_offset_mins, 480);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(schedule_from_vars(vars(&[("WORK_START_TIME", "8am")])).is_err());
        assert!(schedule_from_vars(vars(&[("WORK_END_TIME", "07:00")])).is_err());
        assert!(WorkerConfig::from_vars(vars(&[
            ("DATABASE_URL", "postgres://x"),
            ("ATTENDANCE_SYNC_INTERVAL_SECS", "0"),
        ]))
        .is_err());
    }
}
