use async_trait::async_trait;
use dq_schemas::ConnectionType;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, PgPool, Row as SqlxRow, TypeInfo};

use crate::{ConnectorError, QueryOutcome, Row, SqlWireConfig};

pub struct PostgresConnector {
    pool: PgPool,
}

impl PostgresConnector {
    pub async fn connect(config: &SqlWireConfig) -> Result<Self, ConnectorError> {
        let url = build_url(config);
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .map_err(|e| ConnectorError::Connect(e.to_string()))?;
        Ok(PostgresConnector { pool })
    }
}

fn build_url(config: &SqlWireConfig) -> String {
    let port = config.port.unwrap_or(5432);
    let user = config.username.as_deref().unwrap_or("postgres");
    let password = config.password.as_deref().unwrap_or("");
    let sslmode = config.sslmode.as_deref().unwrap_or("prefer");
    format!(
        "postgres://{user}:{password}@{host}:{port}/{db}?sslmode={sslmode}",
        host = config.host,
        db = config.database,
    )
}

#[async_trait]
impl crate::Connector for PostgresConnector {
    fn dialect(&self) -> ConnectionType {
        ConnectionType::Postgresql
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryOutcome, ConnectorError> {
        let rows: Vec<PgRow> = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ConnectorError::Query(e.to_string()))?;

        let rows_scanned = Some(rows.len() as i64);
        let decoded = rows.iter().map(decode_row).collect();
        Ok(QueryOutcome { rows: decoded, rows_scanned })
    }

    async fn test_connection(&self) -> Result<(), ConnectorError> {
        sqlx::query("select 1")
            .execute(&self.pool)
            .await
            .map_err(|e| ConnectorError::Connect(e.to_string()))?;
        Ok(())
    }
}

/// Decodes a row to JSON using the column's reported type name. Covers the
/// scalar types sensors actually aggregate on (counts, sums, ratios,
/// timestamps, text); anything else falls back to a string cast.
fn decode_row(row: &PgRow) -> Row {
    let mut out = Row::new();
    for col in row.columns() {
        let name = col.name().to_string();
        let type_name = col.type_info().name();
        let value = match type_name {
            "INT2" | "INT4" => row
                .try_get::<i32, _>(col.ordinal())
                .map(|v| Value::from(v))
                .unwrap_or(Value::Null),
            "INT8" => row
                .try_get::<i64, _>(col.ordinal())
                .map(Value::from)
                .unwrap_or(Value::Null),
            "FLOAT4" | "FLOAT8" | "NUMERIC" => row
                .try_get::<f64, _>(col.ordinal())
                .map(Value::from)
                .unwrap_or(Value::Null),
            "BOOL" => row
                .try_get::<bool, _>(col.ordinal())
                .map(Value::from)
                .unwrap_or(Value::Null),
            "TIMESTAMPTZ" | "TIMESTAMP" => row
                .try_get::<chrono::DateTime<chrono::Utc>, _>(col.ordinal())
                .map(|v| Value::from(v.to_rfc3339()))
                .unwrap_or(Value::Null),
            _ => row
                .try_get::<String, _>(col.ordinal())
                .map(Value::from)
                .unwrap_or(Value::Null),
        };
        out.insert(name, value);
    }
    out
}
