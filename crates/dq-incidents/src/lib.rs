//! Incident lifecycle on top of `dq-db`'s failure ledger.
//!
//! `dq_db::record_failure` already enforces "one open incident per check" at
//! the storage layer (a partial unique index plus a `SELECT ... FOR UPDATE`
//! transaction) and fixes severity at open time; this crate adds the policy
//! pieces that sit above that: acknowledge/resolve state transitions.

use anyhow::Result;
use chrono::Utc;
use dq_schemas::{Incident, IncidentStatus};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn acknowledge(pool: &PgPool, id: Uuid, by: &str) -> Result<()> {
    dq_db::acknowledge_incident(pool, id, by, Utc::now()).await
}

pub async fn resolve(pool: &PgPool, id: Uuid, by: &str, notes: Option<&str>) -> Result<()> {
    dq_db::resolve_incident(pool, id, by, notes, Utc::now()).await
}

pub async fn list(pool: &PgPool, status: Option<IncidentStatus>, limit: i64) -> Result<Vec<Incident>> {
    dq_db::list_incidents(pool, status, limit).await
}

pub async fn open_for_check(pool: &PgPool, check_id: Uuid) -> Result<Option<Incident>> {
    dq_db::open_incident_for_check(pool, check_id).await
}
