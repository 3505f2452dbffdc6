use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

/// One execution attempt of a `Check`. A job is created whether the trigger
/// was a schedule, a manual run, or an API-initiated preview; `metadata`
/// records which.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub check_id: Uuid,
    pub status: JobStatus,
    pub triggered_by: JobTrigger,
    pub schedule_id: Option<Uuid>,
    pub queued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub metadata: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "job_trigger", rename_all = "snake_case")]
pub enum JobTrigger {
    Manual,
    Schedule,
    Api,
}

impl Job {
    pub fn new_pending(check_id: Uuid, triggered_by: JobTrigger, schedule_id: Option<Uuid>) -> Self {
        Job {
            id: Uuid::new_v4(),
            check_id,
            status: JobStatus::Pending,
            triggered_by,
            schedule_id,
            queued_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error_message: None,
            metadata: Value::Null,
        }
    }
}
