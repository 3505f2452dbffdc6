use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dq_schemas::{CheckResult, CheckType, ResultSeverity};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_result(pool: &PgPool, r: &CheckResult) -> Result<()> {
    sqlx::query(
        r#"
        insert into check_results (
          id, executed_at, check_id, job_id, connection_id, target_schema, target_table,
          target_column, check_type, actual_value, expected_value, passed, severity,
          execution_time_ms, rows_scanned, result_details, error_message, executed_sql
        ) values ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)
        "#,
    )
    .bind(r.id)
    .bind(r.executed_at)
    .bind(r.check_id)
    .bind(r.job_id)
    .bind(r.connection_id)
    .bind(&r.target_schema)
    .bind(&r.target_table)
    .bind(&r.target_column)
    .bind(r.check_type)
    .bind(r.actual_value)
    .bind(r.expected_value)
    .bind(r.passed)
    .bind(r.severity)
    .bind(r.execution_time_ms)
    .bind(r.rows_scanned)
    .bind(&r.result_details)
    .bind(&r.error_message)
    .bind(&r.executed_sql)
    .execute(pool)
    .await
    .context("insert_result failed")?;
    Ok(())
}

pub async fn latest_result_for_check(pool: &PgPool, check_id: Uuid) -> Result<Option<CheckResult>> {
    let row = sqlx::query_as::<_, ResultRow>(
        r#"select id, executed_at, check_id, job_id, connection_id, target_schema, target_table,
                  target_column, check_type, actual_value, expected_value, passed, severity,
                  execution_time_ms, rows_scanned, result_details, error_message, executed_sql
           from check_results where check_id = $1 order by executed_at desc limit 1"#,
    )
    .bind(check_id)
    .fetch_optional(pool)
    .await
    .context("latest_result_for_check failed")?;
    Ok(row.map(Into::into))
}

/// Results for a check within a lookback window, oldest first — the shape
/// the anomaly-detection rule and the historical-comparison checks both need
/// (current value plus prior observations of the same sensor).
pub async fn history_for_check(
    pool: &PgPool,
    check_id: Uuid,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<CheckResult>> {
    let rows = sqlx::query_as::<_, ResultRow>(
        r#"select id, executed_at, check_id, job_id, connection_id, target_schema, target_table,
                  target_column, check_type, actual_value, expected_value, passed, severity,
                  execution_time_ms, rows_scanned, result_details, error_message, executed_sql
           from check_results
           where check_id = $1 and executed_at >= $2
           order by executed_at asc
           limit $3"#,
    )
    .bind(check_id)
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("history_for_check failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_results_for_check(pool: &PgPool, check_id: Uuid, limit: i64) -> Result<Vec<CheckResult>> {
    let rows = sqlx::query_as::<_, ResultRow>(
        r#"select id, executed_at, check_id, job_id, connection_id, target_schema, target_table,
                  target_column, check_type, actual_value, expected_value, passed, severity,
                  execution_time_ms, rows_scanned, result_details, error_message, executed_sql
           from check_results where check_id = $1 order by executed_at desc limit $2"#,
    )
    .bind(check_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("list_results_for_check failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[allow(clippy::too_many_arguments)]
pub async fn list_results(
    pool: &PgPool,
    check_id: Option<Uuid>,
    connection_id: Option<Uuid>,
    passed: Option<bool>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<CheckResult>> {
    let rows = sqlx::query_as::<_, ResultRow>(
        r#"select id, executed_at, check_id, job_id, connection_id, target_schema, target_table,
                  target_column, check_type, actual_value, expected_value, passed, severity,
                  execution_time_ms, rows_scanned, result_details, error_message, executed_sql
           from check_results
           where ($1::uuid is null or check_id = $1)
             and ($2::uuid is null or connection_id = $2)
             and ($3::bool is null or passed = $3)
             and ($4::timestamptz is null or executed_at >= $4)
             and ($5::timestamptz is null or executed_at <= $5)
           order by executed_at desc
           limit $6"#,
    )
    .bind(check_id)
    .bind(connection_id)
    .bind(passed)
    .bind(from_date)
    .bind(to_date)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("list_results failed")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResultSummaryRow {
    pub total: i64,
    pub passed: i64,
    pub avg_execution_time_ms: Option<f64>,
    pub warning: i64,
    pub error: i64,
    pub fatal: i64,
}

/// Backs `GET /results/summary`. `check_id`/`connection_id`/date-range are
/// all optional so the same query serves an unfiltered dashboard summary or
/// a check-scoped one.
#[allow(clippy::too_many_arguments)]
pub async fn result_summary(
    pool: &PgPool,
    check_id: Option<Uuid>,
    connection_id: Option<Uuid>,
    passed: Option<bool>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
) -> Result<ResultSummaryRow> {
    let row = sqlx::query_as::<_, ResultSummaryRow>(
        r#"select
             count(*) as total,
             count(*) filter (where passed) as passed,
             avg(execution_time_ms) as avg_execution_time_ms,
             count(*) filter (where severity = 'warning') as warning,
             count(*) filter (where severity = 'error') as error,
             count(*) filter (where severity = 'fatal') as fatal
           from check_results
           where ($1::uuid is null or check_id = $1)
             and ($2::uuid is null or connection_id = $2)
             and ($3::bool is null or passed = $3)
             and ($4::timestamptz is null or executed_at >= $4)
             and ($5::timestamptz is null or executed_at <= $5)"#,
    )
    .bind(check_id)
    .bind(connection_id)
    .bind(passed)
    .bind(from_date)
    .bind(to_date)
    .fetch_one(pool)
    .await
    .context("result_summary failed")?;
    Ok(row)
}

#[derive(sqlx::FromRow)]
struct ResultRow {
    id: Uuid,
    executed_at: DateTime<Utc>,
    check_id: Uuid,
    job_id: Uuid,
    connection_id: Uuid,
    target_schema: Option<String>,
    target_table: String,
    target_column: Option<String>,
    check_type: CheckType,
    actual_value: Option<f64>,
    expected_value: Option<f64>,
    passed: bool,
    severity: ResultSeverity,
    execution_time_ms: i64,
    rows_scanned: Option<i64>,
    result_details: serde_json::Value,
    error_message: Option<String>,
    executed_sql: Option<String>,
}

impl From<ResultRow> for CheckResult {
    fn from(r: ResultRow) -> Self {
        CheckResult {
            id: r.id,
            executed_at: r.executed_at,
            check_id: r.check_id,
            job_id: r.job_id,
            connection_id: r.connection_id,
            target_schema: r.target_schema,
            target_table: r.target_table,
            target_column: r.target_column,
            check_type: r.check_type,
            actual_value: r.actual_value,
            expected_value: r.expected_value,
            passed: r.passed,
            severity: r.severity,
            execution_time_ms: r.execution_time_ms,
            rows_scanned: r.rows_scanned,
            result_details: r.result_details,
            error_message: r.error_message,
            executed_sql: r.executed_sql,
        }
    }
}
