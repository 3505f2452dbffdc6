//! Connector boundary: turns a registered [`dq_schemas::Connection`] into a
//! live handle that can run a rendered SQL string and return rows.
//!
//! This module defines only the trait, the error type, and the row shape.
//! Concrete dialect adapters live in sibling modules; `factory` is the only
//! place that matches on [`ConnectionType`] to pick one.

use async_trait::async_trait;
use dq_schemas::ConnectionType;
use serde_json::Value;
use std::fmt;

pub mod factory;
pub mod postgres;
pub mod mysql;
pub mod sqlserver;
pub mod duckdb_adapter;
pub mod rest_sql;
pub mod introspect;

pub use factory::connect;

/// One row of a query result, decoded to JSON. Column types vary per
/// dialect; sensors that need a specific type (count, timestamp, ratio)
/// pull it out of the JSON value rather than the connector imposing a
/// fixed schema.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub rows: Vec<Row>,
    pub rows_scanned: Option<i64>,
}

impl QueryOutcome {
    /// Sensors typically render an aggregate query that returns exactly one
    /// row; this is the common accessor for that shape.
    pub fn single_row(&self) -> Option<&Row> {
        self.rows.first()
    }
}

#[derive(Debug)]
pub enum ConnectorError {
    Config(String),
    Connect(String),
    Query(String),
    Timeout,
    UnsupportedDialect(ConnectionType),
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorError::Config(msg) => write!(f, "connector config error: {msg}"),
            ConnectorError::Connect(msg) => write!(f, "connector connect error: {msg}"),
            ConnectorError::Query(msg) => write!(f, "connector query error: {msg}"),
            ConnectorError::Timeout => write!(f, "connector query timed out"),
            ConnectorError::UnsupportedDialect(d) => {
                write!(f, "no connector adapter registered for dialect {:?}", d)
            }
        }
    }
}

impl std::error::Error for ConnectorError {}

/// Live handle to a data source capable of running a rendered SQL string.
///
/// Implementations must be object-safe so the executor can hold a
/// `Box<dyn Connector>` without knowing the concrete dialect, and
/// `Send + Sync` so one handle can be shared across worker tasks.
#[async_trait]
pub trait Connector: Send + Sync {
    fn dialect(&self) -> ConnectionType;

    /// Runs `sql` and returns its result rows as JSON. Sensors are
    /// responsible for rendering dialect-correct SQL; this layer does not
    /// rewrite or validate the query text.
    async fn execute_query(&self, sql: &str) -> Result<QueryOutcome, ConnectorError>;

    /// Cheap connectivity probe used by `POST /connections/{id}/test`.
    async fn test_connection(&self) -> Result<(), ConnectorError>;
}

/// Config fields common to the SQL-wire dialects (Postgres, MySQL,
/// SQL Server, DuckDB-over-file). Cloud warehouse dialects use
/// [`rest_sql::RestSqlConfig`] instead.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SqlWireConfig {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub sslmode: Option<String>,
}

pub fn parse_wire_config(config: &Value) -> Result<SqlWireConfig, ConnectorError> {
    serde_json::from_value(config.clone())
        .map_err(|e| ConnectorError::Config(format!("invalid connection config: {e}")))
}
