use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dialects the connector registry can speak to. Closed set — adding a
/// dialect is a code change (new connector adapter + factory arm), not data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "connection_type", rename_all = "snake_case")]
pub enum ConnectionType {
    Postgresql,
    Mysql,
    Sqlserver,
    Bigquery,
    Snowflake,
    Redshift,
    Duckdb,
    Oracle,
    Databricks,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Postgresql => "postgresql",
            ConnectionType::Mysql => "mysql",
            ConnectionType::Sqlserver => "sqlserver",
            ConnectionType::Bigquery => "bigquery",
            ConnectionType::Snowflake => "snowflake",
            ConnectionType::Redshift => "redshift",
            ConnectionType::Duckdb => "duckdb",
            ConnectionType::Oracle => "oracle",
            ConnectionType::Databricks => "databricks",
        }
    }
}

impl std::str::FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "postgresql" => ConnectionType::Postgresql,
            "mysql" => ConnectionType::Mysql,
            "sqlserver" => ConnectionType::Sqlserver,
            "bigquery" => ConnectionType::Bigquery,
            "snowflake" => ConnectionType::Snowflake,
            "redshift" => ConnectionType::Redshift,
            "duckdb" => ConnectionType::Duckdb,
            "oracle" => ConnectionType::Oracle,
            "databricks" => ConnectionType::Databricks,
            other => return Err(format!("unknown connection_type: {other}")),
        })
    }
}

/// A registered connection to a heterogeneous SQL data source.
///
/// `encrypted_config` is an opaque blob produced by `dq-crypto`; this crate
/// never sees the plaintext. Connection owns the encrypted config
/// exclusively — no other entity persists credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    pub name: String,
    pub connection_type: ConnectionType,
    pub encrypted_config: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload accepted on `POST /connections`. `config` is plaintext here; the
/// API layer encrypts it before it ever reaches `dq-db`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConnection {
    pub name: String,
    pub connection_type: ConnectionType,
    pub config: serde_json::Value,
}
