//! Periodic job loops for `studio-worker run`.
//!
//! Each job gets its own task on a `tokio::time::interval`; every loop
//! stops when the shared [`CancellationToken`] is cancelled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;
use crate::jobs::{self, Job};

/// How often the date-driven jobs (absences, leave expiry, cleanup) run.
/// They are idempotent for a given day.
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(3600);

pub fn spawn_all(
    pool: PgPool,
    config: Arc<WorkerConfig>,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    [
        (Job::SyncAttendance, config.sync_interval),
        (Job::MarkAbsences, HOUSEKEEPING_INTERVAL),
        (Job::ExpireLeave, HOUSEKEEPING_INTERVAL),
        (Job::CleanupNotifications, HOUSEKEEPING_INTERVAL),
    ]
    .into_iter()
    .map(|(job, period)| {
        let pool = pool.clone();
        let config = Arc::clone(&config);
        tokio::spawn(every(job.name(), period, cancel.clone(), move || {
            let pool = pool.clone();
            let config = Arc::clone(&config);
            async move { run_scheduled(&pool, &config, job).await }
        }))
    })
    .collect()
}

async fn run_scheduled(pool: &PgPool, config: &WorkerConfig, job: Job) -> anyhow::Result<()> {
    if job == Job::MarkAbsences {
        // Yesterday is final; today's employees may still check in.
        let yesterday = config.schedule.local_date(Utc::now()) - chrono::Duration::days(1);
        return jobs::absence::mark_absences(pool, yesterday).await.map(|_| ());
    }
    jobs::run_once(pool, config, job, None).await
}

/// Run `job` every `period` until `cancel` fires. Failures are logged and
/// the loop keeps going.
pub async fn every<F, Fut>(name: &'static str, period: Duration, cancel: CancellationToken, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    tracing::info!(job = name, interval_secs = period.as_secs(), "Scheduled job started");

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job = name, "Scheduled job stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = job().await {
                    tracing::error!(job = name, error = %format!("{e:#}"), "Scheduled job failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn loop_runs_until_cancelled() {
        let runs = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let counter = Arc::clone(&runs);
        let handle = tokio::spawn(every("test", Duration::from_secs(10), cancel.clone(), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(anyhow::anyhow!("keeps going after errors"))
            }
        }));

        tokio::time::sleep(Duration::from_secs(25)).await;
        cancel.cancel();
        handle.await.unwrap();

        // Ticks at 0s, 10s and 20s.
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
