//! C8: cron-driven schedule evaluation.
//!
//! `next_run_after` evaluates a schedule's cron expression in its own
//! timezone but always hands back a UTC instant — `schedules.next_run_at`
//! and `last_run_at` are stored in UTC, matching every other timestamp
//! column in the platform; the timezone only matters for picking *which*
//! wall-clock instant the expression means.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use dq_schemas::JobTrigger;
use sqlx::PgPool;
use tracing::{error, info};

use crate::manager;
use crate::worker::JobSubmitter;

#[derive(Debug)]
pub enum SchedulerError {
    InvalidCron(String),
    InvalidTimezone(String),
    NoUpcomingRun,
}

impl std::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerError::InvalidCron(e) => write!(f, "invalid cron expression: {e}"),
            SchedulerError::InvalidTimezone(tz) => write!(f, "invalid schedule timezone: {tz}"),
            SchedulerError::NoUpcomingRun => write!(f, "cron expression has no upcoming run"),
        }
    }
}

impl std::error::Error for SchedulerError {}

pub fn next_run_after(
    cron_expression: &str,
    timezone: &str,
    after: DateTime<Utc>,
) -> Result<DateTime<Utc>, SchedulerError> {
    let tz: Tz = Tz::from_str(timezone).map_err(|_| SchedulerError::InvalidTimezone(timezone.to_string()))?;
    let schedule =
        CronSchedule::from_str(cron_expression).map_err(|e| SchedulerError::InvalidCron(e.to_string()))?;

    let after_in_tz = after.with_timezone(&tz);
    let next = schedule.after(&after_in_tz).next().ok_or(SchedulerError::NoUpcomingRun)?;
    Ok(next.with_timezone(&Utc))
}

/// One poll cycle: create and submit a job for every schedule that is due,
/// then advance its `next_run_at`. Returns the number of schedules fired.
pub async fn tick(pool: &PgPool, submit: &JobSubmitter) -> anyhow::Result<usize> {
    let now = Utc::now();
    let due = dq_db::due_schedules(pool, now).await?;
    let mut fired = 0;

    for schedule in due {
        let job = manager::create_job(pool, schedule.check_id, JobTrigger::Schedule, Some(schedule.id)).await?;
        submit.submit(job.id).await;

        match next_run_after(&schedule.cron_expression, &schedule.timezone, now) {
            Ok(next) => dq_db::record_run(pool, schedule.id, now, next).await?,
            Err(e) => error!(schedule_id = %schedule.id, "failed to compute next run: {e}"),
        }
        fired += 1;
    }

    Ok(fired)
}

/// Spawns the poll loop. `poll_interval` is the scheduler's granularity —
/// a schedule can fire up to `poll_interval` late, same tradeoff as any
/// polling cron runner.
pub fn spawn(pool: PgPool, submit: JobSubmitter, poll_interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            ticker.tick().await;
            match tick(&pool, &submit).await {
                Ok(0) => {}
                Ok(n) => info!("scheduler dispatched {n} due job(s)"),
                Err(e) => error!("scheduler tick failed: {e}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn next_run_after_advances_past_the_given_instant() {
        let after = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let next = next_run_after("0 0 * * * *", "UTC", after).unwrap();
        assert!(next > after);
    }

    #[test]
    fn invalid_timezone_is_rejected() {
        let after = Utc::now();
        let err = next_run_after("0 0 * * * *", "Not/AZone", after).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidTimezone(_)));
    }

    #[test]
    fn invalid_cron_expression_is_rejected() {
        let after = Utc::now();
        let err = next_run_after("not a cron", "UTC", after).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidCron(_)));
    }
}
