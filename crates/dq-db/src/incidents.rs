use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dq_schemas::{Incident, IncidentSeverity, IncidentStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Opens a new incident or, if one is already open for `check_id`, bumps its
/// `failure_count`/`last_failure_at`/`result_id` in place. Relies on the
/// partial unique index `idx_incidents_one_open_per_check` rather than a
/// read-then-write race: the insert is attempted first and only falls back
/// to an update on conflict, all inside one transaction so a concurrent
/// worker sees either the fresh incident or the bumped one, never both.
pub async fn record_failure(
    pool: &PgPool,
    check_id: Uuid,
    result_id: Uuid,
    severity: IncidentSeverity,
    title: &str,
    description: Option<&str>,
    occurred_at: DateTime<Utc>,
) -> Result<Incident> {
    let mut tx = pool.begin().await.context("record_failure: begin tx")?;

    let existing = sqlx::query_as::<_, IncidentRow>(
        r#"select id, check_id, result_id, status, severity, title, description,
                  first_failure_at, last_failure_at, failure_count,
                  acknowledged_at, acknowledged_by, resolved_at, resolved_by, resolution_notes
           from incidents where check_id = $1 and status in ('open', 'acknowledged')
           for update"#,
    )
    .bind(check_id)
    .fetch_optional(&mut *tx)
    .await
    .context("record_failure: select existing")?;

    let incident = if let Some(existing) = existing {
        // Severity and status are fixed at the incident's open/ack time;
        // repeat failures only bump the count and the last-seen timestamp.
        sqlx::query(
            r#"update incidents
               set result_id = $1, last_failure_at = $2, failure_count = failure_count + 1
               where id = $3"#,
        )
        .bind(result_id)
        .bind(occurred_at)
        .bind(existing.id)
        .execute(&mut *tx)
        .await
        .context("record_failure: update existing")?;

        Incident {
            id: existing.id,
            check_id,
            result_id,
            status: existing.status,
            severity: existing.severity,
            title: existing.title,
            description: existing.description,
            first_failure_at: existing.first_failure_at,
            last_failure_at: occurred_at,
            failure_count: existing.failure_count + 1,
            acknowledged_at: existing.acknowledged_at,
            acknowledged_by: existing.acknowledged_by,
            resolved_at: None,
            resolved_by: None,
            resolution_notes: None,
        }
    } else {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"insert into incidents (
                 id, check_id, result_id, status, severity, title, description,
                 first_failure_at, last_failure_at, failure_count
               ) values ($1, $2, $3, 'open', $4, $5, $6, $7, $7, 1)"#,
        )
        .bind(id)
        .bind(check_id)
        .bind(result_id)
        .bind(severity)
        .bind(title)
        .bind(description)
        .bind(occurred_at)
        .execute(&mut *tx)
        .await
        .context("record_failure: insert new")?;

        Incident {
            id,
            check_id,
            result_id,
            status: IncidentStatus::Open,
            severity,
            title: title.to_string(),
            description: description.map(String::from),
            first_failure_at: occurred_at,
            last_failure_at: occurred_at,
            failure_count: 1,
            acknowledged_at: None,
            acknowledged_by: None,
            resolved_at: None,
            resolved_by: None,
            resolution_notes: None,
        }
    };

    tx.commit().await.context("record_failure: commit")?;
    Ok(incident)
}

pub async fn acknowledge_incident(pool: &PgPool, id: Uuid, by: &str, at: DateTime<Utc>) -> Result<()> {
    sqlx::query(
        "update incidents set status = 'acknowledged', acknowledged_at = $1, acknowledged_by = $2 where id = $3",
    )
    .bind(at)
    .bind(by)
    .bind(id)
    .execute(pool)
    .await
    .context("acknowledge_incident failed")?;
    Ok(())
}

pub async fn resolve_incident(
    pool: &PgPool,
    id: Uuid,
    by: &str,
    notes: Option<&str>,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"update incidents
           set status = 'resolved', resolved_at = $1, resolved_by = $2, resolution_notes = $3
           where id = $4"#,
    )
    .bind(at)
    .bind(by)
    .bind(notes)
    .bind(id)
    .execute(pool)
    .await
    .context("resolve_incident failed")?;
    Ok(())
}

pub async fn get_incident(pool: &PgPool, id: Uuid) -> Result<Option<Incident>> {
    let row = sqlx::query_as::<_, IncidentRow>(
        r#"select id, check_id, result_id, status, severity, title, description,
                  first_failure_at, last_failure_at, failure_count,
                  acknowledged_at, acknowledged_by, resolved_at, resolved_by, resolution_notes
           from incidents where id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("get_incident failed")?;
    Ok(row.map(Into::into))
}

/// Filtered listing for the API's `GET /incidents` — `list_incidents` above
/// only takes a status, which is all the notification dispatch path needs;
/// the API surface additionally filters by check and severity.
pub async fn list_incidents_filtered(
    pool: &PgPool,
    check_id: Option<Uuid>,
    status: Option<IncidentStatus>,
    severity: Option<IncidentSeverity>,
    limit: i64,
) -> Result<Vec<Incident>> {
    let rows = sqlx::query_as::<_, IncidentRow>(
        r#"select id, check_id, result_id, status, severity, title, description,
                  first_failure_at, last_failure_at, failure_count,
                  acknowledged_at, acknowledged_by, resolved_at, resolved_by, resolution_notes
           from incidents
           where ($1::uuid is null or check_id = $1)
             and ($2::incident_status is null or status = $2)
             and ($3::incident_severity is null or severity = $3)
           order by last_failure_at desc
           limit $4"#,
    )
    .bind(check_id)
    .bind(status)
    .bind(severity)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("list_incidents_filtered failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn open_incident_for_check(pool: &PgPool, check_id: Uuid) -> Result<Option<Incident>> {
    let row = sqlx::query_as::<_, IncidentRow>(
        r#"select id, check_id, result_id, status, severity, title, description,
                  first_failure_at, last_failure_at, failure_count,
                  acknowledged_at, acknowledged_by, resolved_at, resolved_by, resolution_notes
           from incidents where check_id = $1 and status in ('open', 'acknowledged')"#,
    )
    .bind(check_id)
    .fetch_optional(pool)
    .await
    .context("open_incident_for_check failed")?;
    Ok(row.map(Into::into))
}

pub async fn list_incidents(pool: &PgPool, status: Option<IncidentStatus>, limit: i64) -> Result<Vec<Incident>> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, IncidentRow>(
                r#"select id, check_id, result_id, status, severity, title, description,
                          first_failure_at, last_failure_at, failure_count,
                          acknowledged_at, acknowledged_by, resolved_at, resolved_by, resolution_notes
                   from incidents where status = $1 order by last_failure_at desc limit $2"#,
            )
            .bind(status)
            .bind(limit)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, IncidentRow>(
                r#"select id, check_id, result_id, status, severity, title, description,
                          first_failure_at, last_failure_at, failure_count,
                          acknowledged_at, acknowledged_by, resolved_at, resolved_by, resolution_notes
                   from incidents order by last_failure_at desc limit $1"#,
            )
            .bind(limit)
            .fetch_all(pool)
            .await
        }
    }
    .context("list_incidents failed")?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(sqlx::FromRow)]
struct IncidentRow {
    id: Uuid,
    check_id: Uuid,
    result_id: Uuid,
    status: IncidentStatus,
    severity: IncidentSeverity,
    title: String,
    description: Option<String>,
    first_failure_at: DateTime<Utc>,
    last_failure_at: DateTime<Utc>,
    failure_count: i64,
    acknowledged_at: Option<DateTime<Utc>>,
    acknowledged_by: Option<String>,
    resolved_at: Option<DateTime<Utc>>,
    resolved_by: Option<String>,
    resolution_notes: Option<String>,
}

impl From<IncidentRow> for Incident {
    fn from(r: IncidentRow) -> Self {
        Incident {
            id: r.id,
            check_id: r.check_id,
            result_id: r.result_id,
            status: r.status,
            severity: r.severity,
            title: r.title,
            description: r.description,
            first_failure_at: r.first_failure_at,
            last_failure_at: r.last_failure_at,
            failure_count: r.failure_count,
            acknowledged_at: r.acknowledged_at,
            acknowledged_by: r.acknowledged_by,
            resolved_at: r.resolved_at,
            resolved_by: r.resolved_by,
            resolution_notes: r.resolution_notes,
        }
    }
}
