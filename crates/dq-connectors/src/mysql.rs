use async_trait::async_trait;
use dq_schemas::ConnectionType;
use serde_json::Value;
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{Column, MySqlPool, Row as SqlxRow, TypeInfo};

use crate::{ConnectorError, QueryOutcome, Row, SqlWireConfig};

pub struct MysqlConnector {
    pool: MySqlPool,
}

impl MysqlConnector {
    pub async fn connect(config: &SqlWireConfig) -> Result<Self, ConnectorError> {
        let url = build_url(config);
        let pool = MySqlPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .map_err(|e| ConnectorError::Connect(e.to_string()))?;
        Ok(MysqlConnector { pool })
    }
}

fn build_url(config: &SqlWireConfig) -> String {
    let port = config.port.unwrap_or(3306);
    let user = config.username.as_deref().unwrap_or("root");
    let password = config.password.as_deref().unwrap_or("");
    format!(
        "mysql://{user}:{password}@{host}:{port}/{db}",
        host = config.host,
        db = config.database,
    )
}

#[async_trait]
impl crate::Connector for MysqlConnector {
    fn dialect(&self) -> ConnectionType {
        ConnectionType::Mysql
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryOutcome, ConnectorError> {
        let rows: Vec<MySqlRow> = sqlx::query(sql)
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

fn decode_row(row: &MySqlRow) -> Row {
    let mut out = Row::new();
    for col in row.columns() {
        let name = col.name().to_string();
        let type_name = col.type_info().name();
        let value = match type_name {
            "TINYINT" | "SMALLINT" | "INT" | "MEDIUMINT" => row
                .try_get::<i32, _>(col.ordinal())
                .map(Value::from)
                .unwrap_or(Value::Null),
            "BIGINT" => row
                .try_get::<i64, _>(col.ordinal())
                .map(Value::from)
                .unwrap_or(Value::Null),
            "FLOAT" | "DOUBLE" | "DECIMAL" => row
                .try_get::<f64, _>(col.ordinal())
                .map(Value::from)
                .unwrap_or(Value::Null),
            "TIMESTAMP" | "DATETIME" => row
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
