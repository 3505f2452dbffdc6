use anyhow::{Context, Result};
use chrono::Utc;
use dq_schemas::{Check, CheckMode, CheckType, NewCheck, TimeScale};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_check(pool: &PgPool, new_check: &NewCheck) -> Result<Check> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        insert into checks (
          id, connection_id, check_type, check_mode, time_scale,
          target_schema, target_table, target_column, partition_by_column,
          parameters, rule_parameters, is_active, created_at, updated_at
        ) values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, true, $12, $12)
        "#,
    )
    .bind(id)
    .bind(new_check.connection_id)
    .bind(new_check.check_type)
    .bind(new_check.check_mode)
    .bind(new_check.time_scale)
    .bind(&new_check.target_schema)
    .bind(&new_check.target_table)
    .bind(&new_check.target_column)
    .bind(&new_check.partition_by_column)
    .bind(&new_check.parameters)
    .bind(&new_check.rule_parameters)
    .bind(now)
    .execute(pool)
    .await
    .context("insert_check failed")?;

    Ok(Check {
        id,
        connection_id: new_check.connection_id,
        check_type: new_check.check_type,
        check_mode: new_check.check_mode,
        time_scale: new_check.time_scale,
        target_schema: new_check.target_schema.clone(),
        target_table: new_check.target_table.clone(),
        target_column: new_check.target_column.clone(),
        partition_by_column: new_check.partition_by_column.clone(),
        parameters: new_check.parameters.clone(),
        rule_parameters: new_check.rule_parameters.clone(),
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

pub async fn get_check(pool: &PgPool, id: Uuid) -> Result<Option<Check>> {
    let row = sqlx::query_as::<_, CheckRow>(
        r#"select id, connection_id, check_type, check_mode, time_scale, target_schema,
                  target_table, target_column, partition_by_column, parameters, rule_parameters,
                  is_active, created_at, updated_at
           from checks where id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("get_check failed")?;

    Ok(row.map(Into::into))
}

pub async fn list_active_checks(pool: &PgPool) -> Result<Vec<Check>> {
    let rows = sqlx::query_as::<_, CheckRow>(
        r#"select id, connection_id, check_type, check_mode, time_scale, target_schema,
                  target_table, target_column, partition_by_column, parameters, rule_parameters,
                  is_active, created_at, updated_at
           from checks where is_active order by created_at"#,
    )
    .fetch_all(pool)
    .await
    .context("list_active_checks failed")?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_checks_for_connection(pool: &PgPool, connection_id: Uuid) -> Result<Vec<Check>> {
    let rows = sqlx::query_as::<_, CheckRow>(
        r#"select id, connection_id, check_type, check_mode, time_scale, target_schema,
                  target_table, target_column, partition_by_column, parameters, rule_parameters,
                  is_active, created_at, updated_at
           from checks where connection_id = $1 order by created_at"#,
    )
    .bind(connection_id)
    .fetch_all(pool)
    .await
    .context("list_checks_for_connection failed")?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Filter inputs for `GET /checks`; every field is optional, mirroring the
/// query-string shape the API handler builds from request params.
#[derive(Debug, Clone, Default)]
pub struct CheckFilter {
    pub connection_id: Option<Uuid>,
    pub check_type: Option<CheckType>,
    pub check_mode: Option<CheckMode>,
    pub target_table: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn list_checks(pool: &PgPool, filter: &CheckFilter, limit: i64) -> Result<Vec<Check>> {
    let rows = sqlx::query_as::<_, CheckRow>(
        r#"select id, connection_id, check_type, check_mode, time_scale, target_schema,
                  target_table, target_column, partition_by_column, parameters, rule_parameters,
                  is_active, created_at, updated_at
           from checks
           where ($1::uuid is null or connection_id = $1)
             and ($2::check_type is null or check_type = $2)
             and ($3::check_mode is null or check_mode = $3)
             and ($4::text is null or target_table = $4)
             and ($5::bool is null or is_active = $5)
           order by created_at desc
           limit $6"#,
    )
    .bind(filter.connection_id)
    .bind(filter.check_type)
    .bind(filter.check_mode)
    .bind(&filter.target_table)
    .bind(filter.is_active)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("list_checks failed")?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(Debug, Clone, Default)]
pub struct CheckUpdate {
    pub target_schema: Option<String>,
    pub target_table: Option<String>,
    pub target_column: Option<String>,
    pub partition_by_column: Option<String>,
    pub parameters: Option<serde_json::Value>,
    pub rule_parameters: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

pub async fn update_check(pool: &PgPool, id: Uuid, update: &CheckUpdate) -> Result<()> {
    sqlx::query(
        r#"update checks set
             target_schema = coalesce($1, target_schema),
             target_table = coalesce($2, target_table),
             target_column = coalesce($3, target_column),
             partition_by_column = coalesce($4, partition_by_column),
             parameters = coalesce($5, parameters),
             rule_parameters = coalesce($6, rule_parameters),
             is_active = coalesce($7, is_active),
             updated_at = now()
           where id = $8"#,
    )
    .bind(&update.target_schema)
    .bind(&update.target_table)
    .bind(&update.target_column)
    .bind(&update.partition_by_column)
    .bind(&update.parameters)
    .bind(&update.rule_parameters)
    .bind(update.is_active)
    .bind(id)
    .execute(pool)
    .await
    .context("update_check failed")?;
    Ok(())
}

pub async fn deactivate_check(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("update checks set is_active = false, updated_at = now() where id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("deactivate_check failed")?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct CheckRow {
    id: Uuid,
    connection_id: Uuid,
    check_type: CheckType,
    check_mode: CheckMode,
    time_scale: Option<TimeScale>,
    target_schema: Option<String>,
    target_table: String,
    target_column: Option<String>,
    partition_by_column: Option<String>,
    parameters: serde_json::Value,
    rule_parameters: serde_json::Value,
    is_active: bool,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl From<CheckRow> for Check {
    fn from(r: CheckRow) -> Self {
        Check {
            id: r.id,
            connection_id: r.connection_id,
            check_type: r.check_type,
            check_mode: r.check_mode,
            time_scale: r.time_scale,
            target_schema: r.target_schema,
            target_table: r.target_table,
            target_column: r.target_column,
            partition_by_column: r.partition_by_column,
            parameters: r.parameters,
            rule_parameters: r.rule_parameters,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
