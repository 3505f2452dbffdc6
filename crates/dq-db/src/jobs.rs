use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dq_schemas::{Job, JobStatus, JobTrigger};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_job(pool: &PgPool, job: &Job) -> Result<()> {
    sqlx::query(
        r#"
        insert into jobs (id, check_id, status, triggered_by, schedule_id, queued_at, metadata)
        values ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(job.id)
    .bind(job.check_id)
    .bind(job.status)
    .bind(job.triggered_by)
    .bind(job.schedule_id)
    .bind(job.queued_at)
    .bind(&job.metadata)
    .execute(pool)
    .await
    .context("insert_job failed")?;
    Ok(())
}

pub async fn mark_job_running(pool: &PgPool, id: Uuid, started_at: DateTime<Utc>) -> Result<()> {
    sqlx::query("update jobs set status = $1, started_at = $2 where id = $3")
        .bind(JobStatus::Running)
        .bind(started_at)
        .bind(id)
        .execute(pool)
        .await
        .context("mark_job_running failed")?;
    Ok(())
}

pub async fn mark_job_completed(pool: &PgPool, id: Uuid, completed_at: DateTime<Utc>) -> Result<()> {
    sqlx::query("update jobs set status = $1, completed_at = $2 where id = $3")
        .bind(JobStatus::Completed)
        .bind(completed_at)
        .bind(id)
        .execute(pool)
        .await
        .context("mark_job_completed failed")?;
    Ok(())
}

pub async fn mark_job_failed(
    pool: &PgPool,
    id: Uuid,
    completed_at: DateTime<Utc>,
    error_message: &str,
) -> Result<()> {
    sqlx::query("update jobs set status = $1, completed_at = $2, error_message = $3 where id = $4")
        .bind(JobStatus::Failed)
        .bind(completed_at)
        .bind(error_message)
        .bind(id)
        .execute(pool)
        .await
        .context("mark_job_failed failed")?;
    Ok(())
}

pub async fn mark_job_cancelled(pool: &PgPool, id: Uuid, completed_at: DateTime<Utc>) -> Result<()> {
    sqlx::query("update jobs set status = $1, completed_at = $2 where id = $3")
        .bind(JobStatus::Cancelled)
        .bind(completed_at)
        .bind(id)
        .execute(pool)
        .await
        .context("mark_job_cancelled failed")?;
    Ok(())
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Option<Job>> {
    let row = sqlx::query_as::<_, JobRow>(
        r#"select id, check_id, status, triggered_by, schedule_id, queued_at, started_at,
                  completed_at, error_message, metadata
           from jobs where id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("get_job failed")?;
    Ok(row.map(Into::into))
}

pub async fn list_jobs_for_check(pool: &PgPool, check_id: Uuid, limit: i64) -> Result<Vec<Job>> {
    let rows = sqlx::query_as::<_, JobRow>(
        r#"select id, check_id, status, triggered_by, schedule_id, queued_at, started_at,
                  completed_at, error_message, metadata
           from jobs where check_id = $1 order by queued_at desc limit $2"#,
    )
    .bind(check_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("list_jobs_for_check failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    check_id: Uuid,
    status: JobStatus,
    triggered_by: JobTrigger,
    schedule_id: Option<Uuid>,
    queued_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
    metadata: serde_json::Value,
}

impl From<JobRow> for Job {
    fn from(r: JobRow) -> Self {
        Job {
            id: r.id,
            check_id: r.check_id,
            status: r.status,
            triggered_by: r.triggered_by,
            schedule_id: r.schedule_id,
            queued_at: r.queued_at,
            started_at: r.started_at,
            completed_at: r.completed_at,
            error_message: r.error_message,
            metadata: r.metadata,
        }
    }
}
