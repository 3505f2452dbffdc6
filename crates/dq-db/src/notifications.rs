use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dq_schemas::{ChannelType, NotificationChannel, NotificationEvent, ResultSeverity, WebhookConfig};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_channel(
    pool: &PgPool,
    name: &str,
    channel_type: ChannelType,
    config: &WebhookConfig,
    events: &[NotificationEvent],
    min_severity: Option<ResultSeverity>,
) -> Result<NotificationChannel> {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let config_json = serde_json::to_value(config).context("serialize webhook config")?;

    sqlx::query(
        r#"insert into notification_channels
             (id, name, channel_type, config, events, min_severity, is_active, created_at, updated_at)
           values ($1, $2, $3, $4, $5, $6, true, $7, $7)"#,
    )
    .bind(id)
    .bind(name)
    .bind(channel_type)
    .bind(&config_json)
    .bind(events)
    .bind(min_severity)
    .bind(now)
    .execute(pool)
    .await
    .context("insert_channel failed")?;

    Ok(NotificationChannel {
        id,
        name: name.to_string(),
        channel_type,
        config: config.clone(),
        events: events.to_vec(),
        min_severity,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

pub async fn list_active_channels(pool: &PgPool) -> Result<Vec<NotificationChannel>> {
    let rows = sqlx::query_as::<_, ChannelRow>(
        r#"select id, name, channel_type, config, events, min_severity, is_active, created_at, updated_at
           from notification_channels where is_active"#,
    )
    .fetch_all(pool)
    .await
    .context("list_active_channels failed")?;

    rows.into_iter().map(TryInto::try_into).collect()
}

pub async fn list_channels(pool: &PgPool) -> Result<Vec<NotificationChannel>> {
    let rows = sqlx::query_as::<_, ChannelRow>(
        r#"select id, name, channel_type, config, events, min_severity, is_active, created_at, updated_at
           from notification_channels order by name"#,
    )
    .fetch_all(pool)
    .await
    .context("list_channels failed")?;

    rows.into_iter().map(TryInto::try_into).collect()
}

pub async fn get_channel(pool: &PgPool, id: Uuid) -> Result<Option<NotificationChannel>> {
    let row = sqlx::query_as::<_, ChannelRow>(
        r#"select id, name, channel_type, config, events, min_severity, is_active, created_at, updated_at
           from notification_channels where id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("get_channel failed")?;

    row.map(TryInto::try_into).transpose()
}

pub async fn update_channel(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    config: &WebhookConfig,
    events: &[NotificationEvent],
    min_severity: Option<ResultSeverity>,
    is_active: bool,
) -> Result<()> {
    let config_json = serde_json::to_value(config).context("serialize webhook config")?;
    sqlx::query(
        r#"update notification_channels set
             name = $1, config = $2, events = $3, min_severity = $4, is_active = $5, updated_at = now()
           where id = $6"#,
    )
    .bind(name)
    .bind(&config_json)
    .bind(events)
    .bind(min_severity)
    .bind(is_active)
    .bind(id)
    .execute(pool)
    .await
    .context("update_channel failed")?;
    Ok(())
}

pub async fn delete_channel(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("delete from notification_channels where id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("delete_channel failed")?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct ChannelRow {
    id: Uuid,
    name: String,
    channel_type: ChannelType,
    config: serde_json::Value,
    events: Vec<NotificationEvent>,
    min_severity: Option<ResultSeverity>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ChannelRow> for NotificationChannel {
    type Error = anyhow::Error;

    fn try_from(r: ChannelRow) -> Result<Self> {
        let config: WebhookConfig =
            serde_json::from_value(r.config).context("deserialize webhook config")?;
        Ok(NotificationChannel {
            id: r.id,
            name: r.name,
            channel_type: r.channel_type,
            config,
            events: r.events,
            min_severity: r.min_severity,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
