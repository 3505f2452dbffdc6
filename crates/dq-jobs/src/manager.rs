//! C6: job lifecycle. A job's status only ever moves forward —
//! `pending -> running -> {completed, failed, cancelled}` — enforced here by
//! refusing to cancel a job that has already left `pending`, and nowhere else
//! writing a status backwards.

use chrono::Utc;
use dq_schemas::{Job, JobStatus, JobTrigger};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug)]
pub enum JobError {
    NotFound(Uuid),
    InvalidTransition { job_id: Uuid, from: JobStatus, attempted: &'static str },
    Db(String),
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobError::NotFound(id) => write!(f, "job {id} not found"),
            JobError::InvalidTransition { job_id, from, attempted } => {
                write!(f, "job {job_id} cannot {attempted} from status {from:?}")
            }
            JobError::Db(msg) => write!(f, "job store error: {msg}"),
        }
    }
}

impl std::error::Error for JobError {}

impl From<anyhow::Error> for JobError {
    fn from(e: anyhow::Error) -> Self {
        JobError::Db(e.to_string())
    }
}

pub async fn create_job(
    pool: &PgPool,
    check_id: Uuid,
    triggered_by: JobTrigger,
    schedule_id: Option<Uuid>,
) -> Result<Job, JobError> {
    let job = Job::new_pending(check_id, triggered_by, schedule_id);
    dq_db::insert_job(pool, &job).await?;
    Ok(job)
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Job, JobError> {
    dq_db::get_job(pool, id).await?.ok_or(JobError::NotFound(id))
}

pub async fn list_for_check(pool: &PgPool, check_id: Uuid, limit: i64) -> Result<Vec<Job>, JobError> {
    Ok(dq_db::list_jobs_for_check(pool, check_id, limit).await?)
}

/// Only a job still in `pending` (not yet picked up by a worker) can be
/// cancelled; a running job must be allowed to reach a terminal state on its
/// own so the worker pool's bookkeeping never contradicts the store.
pub async fn cancel_job(pool: &PgPool, id: Uuid) -> Result<(), JobError> {
    let job = get_job(pool, id).await?;
    if job.status != JobStatus::Pending {
        return Err(JobError::InvalidTransition { job_id: id, from: job.status, attempted: "cancel" });
    }
    dq_db::mark_job_cancelled(pool, id, Utc::now()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_the_blocked_status() {
        let id = Uuid::new_v4();
        let err = JobError::InvalidTransition { job_id: id, from: JobStatus::Running, attempted: "cancel" };
        assert!(err.to_string().contains("Running"));
    }
}
