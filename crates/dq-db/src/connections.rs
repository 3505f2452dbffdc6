use anyhow::{Context, Result};
use chrono::Utc;
use dq_schemas::{Connection, ConnectionType};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_connection(
    pool: &PgPool,
    name: &str,
    connection_type: ConnectionType,
    encrypted_config: &str,
) -> Result<Connection> {
    let now = Utc::now();
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        insert into connections (id, name, connection_type, encrypted_config, is_active, created_at, updated_at)
        values ($1, $2, $3, $4, true, $5, $5)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(connection_type)
    .bind(encrypted_config)
    .bind(now)
    .execute(pool)
    .await
    .context("insert_connection failed")?;

    Ok(Connection {
        id,
        name: name.to_string(),
        connection_type,
        encrypted_config: encrypted_config.to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

pub async fn get_connection(pool: &PgPool, id: Uuid) -> Result<Option<Connection>> {
    let row = sqlx::query_as::<_, ConnectionRow>(
        "select id, name, connection_type, encrypted_config, is_active, created_at, updated_at
         from connections where id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("get_connection failed")?;

    Ok(row.map(Into::into))
}

pub async fn list_connections(pool: &PgPool, only_active: bool) -> Result<Vec<Connection>> {
    let rows = if only_active {
        sqlx::query_as::<_, ConnectionRow>(
            "select id, name, connection_type, encrypted_config, is_active, created_at, updated_at
             from connections where is_active order by name",
        )
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as::<_, ConnectionRow>(
            "select id, name, connection_type, encrypted_config, is_active, created_at, updated_at
             from connections order by name",
        )
        .fetch_all(pool)
        .await
    }
    .context("list_connections failed")?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn deactivate_connection(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("update connections set is_active = false, updated_at = now() where id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("deactivate_connection failed")?;
    Ok(())
}

/// `name`/`encrypted_config`/`is_active` are independently optional so a
/// `PATCH`-style partial update only touches the fields the caller sent.
pub async fn update_connection(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    encrypted_config: Option<&str>,
    is_active: Option<bool>,
) -> Result<()> {
    sqlx::query(
        r#"update connections set
             name = coalesce($1, name),
             encrypted_config = coalesce($2, encrypted_config),
             is_active = coalesce($3, is_active),
             updated_at = now()
           where id = $4"#,
    )
    .bind(name)
    .bind(encrypted_config)
    .bind(is_active)
    .bind(id)
    .execute(pool)
    .await
    .context("update_connection failed")?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct ConnectionRow {
    id: Uuid,
    name: String,
    connection_type: ConnectionType,
    encrypted_config: String,
    is_active: bool,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl From<ConnectionRow> for Connection {
    fn from(r: ConnectionRow) -> Self {
        Connection {
            id: r.id,
            name: r.name,
            connection_type: r.connection_type,
            encrypted_config: r.encrypted_config,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
