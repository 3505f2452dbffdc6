use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dq_schemas::{NewSchedule, Schedule};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_schedule(pool: &PgPool, new_schedule: &NewSchedule) -> Result<Schedule> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    sqlx::query(
        r#"insert into schedules (id, check_id, cron_expression, timezone, is_active, created_at, updated_at)
           values ($1, $2, $3, $4, true, $5, $5)"#,
    )
    .bind(id)
    .bind(new_schedule.check_id)
    .bind(&new_schedule.cron_expression)
    .bind(&new_schedule.timezone)
    .bind(now)
    .execute(pool)
    .await
    .context("insert_schedule failed")?;

    Ok(Schedule {
        id,
        check_id: new_schedule.check_id,
        cron_expression: new_schedule.cron_expression.clone(),
        timezone: new_schedule.timezone.clone(),
        is_active: true,
        last_run_at: None,
        next_run_at: None,
        created_at: now,
        updated_at: now,
    })
}

pub async fn due_schedules(pool: &PgPool, as_of: DateTime<Utc>) -> Result<Vec<Schedule>> {
    let rows = sqlx::query_as::<_, ScheduleRow>(
        r#"select id, check_id, cron_expression, timezone, is_active, last_run_at, next_run_at,
                  created_at, updated_at
           from schedules
           where is_active and (next_run_at is null or next_run_at <= $1)"#,
    )
    .bind(as_of)
    .fetch_all(pool)
    .await
    .context("due_schedules failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn record_run(
    pool: &PgPool,
    id: Uuid,
    last_run_at: DateTime<Utc>,
    next_run_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "update schedules set last_run_at = $1, next_run_at = $2, updated_at = $1 where id = $3",
    )
    .bind(last_run_at)
    .bind(next_run_at)
    .bind(id)
    .execute(pool)
    .await
    .context("record_run failed")?;
    Ok(())
}

pub async fn get_schedule(pool: &PgPool, id: Uuid) -> Result<Option<Schedule>> {
    let row = sqlx::query_as::<_, ScheduleRow>(
        r#"select id, check_id, cron_expression, timezone, is_active, last_run_at, next_run_at,
                  created_at, updated_at
           from schedules where id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("get_schedule failed")?;
    Ok(row.map(Into::into))
}

pub async fn update_schedule(
    pool: &PgPool,
    id: Uuid,
    cron_expression: &str,
    timezone: &str,
    is_active: bool,
) -> Result<()> {
    sqlx::query(
        r#"update schedules set cron_expression = $1, timezone = $2, is_active = $3, updated_at = now()
           where id = $4"#,
    )
    .bind(cron_expression)
    .bind(timezone)
    .bind(is_active)
    .bind(id)
    .execute(pool)
    .await
    .context("update_schedule failed")?;
    Ok(())
}

pub async fn delete_schedule(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("delete from schedules where id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("delete_schedule failed")?;
    Ok(())
}

pub async fn list_schedules(pool: &PgPool) -> Result<Vec<Schedule>> {
    let rows = sqlx::query_as::<_, ScheduleRow>(
        r#"select id, check_id, cron_expression, timezone, is_active, last_run_at, next_run_at,
                  created_at, updated_at
           from schedules order by created_at"#,
    )
    .fetch_all(pool)
    .await
    .context("list_schedules failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(sqlx::FromRow)]
struct ScheduleRow {
    id: Uuid,
    check_id: Uuid,
    cron_expression: String,
    timezone: String,
    is_active: bool,
    last_run_at: Option<DateTime<Utc>>,
    next_run_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ScheduleRow> for Schedule {
    fn from(r: ScheduleRow) -> Self {
        Schedule {
            id: r.id,
            check_id: r.check_id,
            cron_expression: r.cron_expression,
            timezone: r.timezone,
            is_active: r.is_active,
            last_run_at: r.last_run_at,
            next_run_at: r.next_run_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
