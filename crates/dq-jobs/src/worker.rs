//! C7: the worker pool that actually runs checks.
//!
//! Job ids arrive over a bounded channel shared by every worker task behind
//! one `tokio::sync::Mutex<Receiver>` — the standard fan-out-from-one-queue
//! shape for a fixed worker count. Each job gets a wall-clock timeout and up
//! to `max_attempts` tries with a fixed backoff between them; exhausting
//! retries is the only way a job reaches `failed`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dq_crypto::EncryptionKey;
use sqlx::PgPool;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    pub concurrency: usize,
    pub execution_timeout: Duration,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        WorkerPoolConfig {
            concurrency: 4,
            execution_timeout: Duration::from_secs(300),
            max_attempts: 3,
            retry_backoff: Duration::from_secs(60),
        }
    }
}

#[derive(Clone)]
pub struct JobSubmitter(mpsc::Sender<Uuid>);

impl JobSubmitter {
    pub async fn submit(&self, job_id: Uuid) {
        if self.0.send(job_id).await.is_err() {
            error!(job_id = %job_id, "worker pool channel closed; job not dispatched");
        }
    }
}

pub fn submit_channel(capacity: usize) -> (JobSubmitter, mpsc::Receiver<Uuid>) {
    let (tx, rx) = mpsc::channel(capacity);
    (JobSubmitter(tx), rx)
}

/// Spawns `config.concurrency` worker tasks draining `rx`. Returns the
/// `JoinHandle`s so callers can await clean shutdown.
pub fn spawn_pool(
    pool: PgPool,
    encryption_key: Arc<EncryptionKey>,
    notify: dq_notify::NotifySender,
    rx: mpsc::Receiver<Uuid>,
    config: WorkerPoolConfig,
) -> Vec<tokio::task::JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));
    (0..config.concurrency.max(1))
        .map(|worker_id| {
            let pool = pool.clone();
            let encryption_key = encryption_key.clone();
            let notify = notify.clone();
            let rx = rx.clone();
            let config = config.clone();
            tokio::spawn(async move {
                loop {
                    let job_id = {
                        let mut rx = rx.lock().await;
                        rx.recv().await
                    };
                    let Some(job_id) = job_id else {
                        info!(worker_id, "worker pool channel closed, shutting down");
                        return;
                    };
                    run_job_with_retry(&pool, &encryption_key, &notify, job_id, &config).await;
                }
            })
        })
        .collect()
}

async fn run_job_with_retry(
    pool: &PgPool,
    encryption_key: &EncryptionKey,
    notify: &dq_notify::NotifySender,
    job_id: Uuid,
    config: &WorkerPoolConfig,
) {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match run_job_once(pool, encryption_key, notify, job_id, config.execution_timeout).await {
            Ok(()) => return,
            Err(e) if attempt >= config.max_attempts => {
                error!(job_id = %job_id, attempt, "job failed after max attempts: {e}");
                let _ = dq_db::mark_job_failed(pool, job_id, Utc::now(), &e.to_string()).await;
                return;
            }
            Err(e) => {
                warn!(job_id = %job_id, attempt, "job attempt failed, retrying: {e}");
                tokio::time::sleep(config.retry_backoff).await;
            }
        }
    }
}

async fn run_job_once(
    pool: &PgPool,
    encryption_key: &EncryptionKey,
    notify: &dq_notify::NotifySender,
    job_id: Uuid,
    timeout: Duration,
) -> anyhow::Result<()> {
    let job = dq_db::get_job(pool, job_id).await?.ok_or_else(|| anyhow::anyhow!("job {job_id} not found"))?;
    let check = dq_db::get_check(pool, job.check_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("check {} not found", job.check_id))?;
    let connection = dq_db::get_connection(pool, check.connection_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("connection {} not found", check.connection_id))?;

    let cross_source_connection = match cross_source_connection_id(&check) {
        Some(id) => Some(
            dq_db::get_connection(pool, id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("cross-source connection {id} not found"))?,
        ),
        None => None,
    };

    dq_db::mark_job_running(pool, job_id, Utc::now()).await?;

    let request = dq_checks::ExecutionRequest {
        check: &check,
        job_id,
        connection: &connection,
        cross_source_connection: cross_source_connection.as_ref(),
        encryption_key,
        pool,
    };

    let result = tokio::time::timeout(timeout, dq_checks::execute(request))
        .await
        .map_err(|_| anyhow::anyhow!("check execution timed out after {:?}", timeout))??;

    dq_db::mark_job_completed(pool, job_id, Utc::now()).await?;

    if result.severity.is_failure() {
        notify_incident_opened(pool, notify, check.id).await;
    }
    Ok(())
}

async fn notify_incident_opened(pool: &PgPool, notify: &dq_notify::NotifySender, check_id: Uuid) {
    match dq_db::open_incident_for_check(pool, check_id).await {
        Ok(Some(incident)) => dq_notify::enqueue(
            notify,
            dq_notify::NotificationJob {
                event: dq_schemas::NotificationEvent::IncidentOpened,
                incident,
                occurred_at: Utc::now(),
            },
        ),
        Ok(None) => {}
        Err(e) => error!("failed to look up incident after failing check: {e}"),
    }
}

/// A check takes the dual-connection path whenever
/// `check.parameters.reference_connection_id` is set — there is no
/// dedicated column for it since only a handful of check types need it, and
/// the presence of the parameter, not a registry tag, decides the path.
fn cross_source_connection_id(check: &dq_schemas::Check) -> Option<Uuid> {
    check
        .parameters
        .get("reference_connection_id")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}
