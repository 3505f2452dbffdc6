use async_trait::async_trait;
use dq_schemas::ConnectionType;
use duckdb::types::ValueRef;
use duckdb::Connection as DuckConnection;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::{ConnectorError, QueryOutcome, Row};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DuckDbConfig {
    /// Path to a `.duckdb` file, or `:memory:` for an ephemeral database.
    pub path: String,
}

/// `duckdb::Connection` is a blocking, single-threaded handle; every call
/// runs inside `spawn_blocking` so it never stalls the async executor the
/// job worker pool shares with everything else.
pub struct DuckDbConnector {
    conn: Arc<Mutex<DuckConnection>>,
}

impl DuckDbConnector {
    pub async fn connect(config: &DuckDbConfig) -> Result<Self, ConnectorError> {
        let path = config.path.clone();
        let conn = tokio::task::spawn_blocking(move || {
            if path == ":memory:" {
                DuckConnection::open_in_memory()
            } else {
                DuckConnection::open(&path)
            }
        })
        .await
        .map_err(|e| ConnectorError::Connect(e.to_string()))?
        .map_err(|e| ConnectorError::Connect(e.to_string()))?;

        Ok(DuckDbConnector { conn: Arc::new(Mutex::new(conn)) })
    }
}

#[async_trait]
impl crate::Connector for DuckDbConnector {
    fn dialect(&self) -> ConnectionType {
        ConnectionType::Duckdb
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryOutcome, ConnectorError> {
        let conn = self.conn.clone();
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().expect("duckdb connection mutex poisoned");
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| ConnectorError::Query(e.to_string()))?;

            let column_names: Vec<String> = stmt.column_names();
            let mut rows_out = Vec::new();

            let mut rows = stmt
                .query([])
                .map_err(|e| ConnectorError::Query(e.to_string()))?;
            while let Some(row) = rows.next().map_err(|e| ConnectorError::Query(e.to_string()))? {
                let mut out = Row::new();
                for (idx, name) in column_names.iter().enumerate() {
                    let value = match row.get_ref(idx) {
                        Ok(ValueRef::Null) => Value::Null,
                        Ok(ValueRef::Boolean(b)) => Value::from(b),
                        Ok(ValueRef::BigInt(i)) => Value::from(i),
                        Ok(ValueRef::Int(i)) => Value::from(i),
                        Ok(ValueRef::Double(f)) => Value::from(f),
                        Ok(ValueRef::Text(t)) => Value::from(String::from_utf8_lossy(t).to_string()),
                        _ => Value::Null,
                    };
                    out.insert(name.clone(), value);
                }
                rows_out.push(out);
            }

            let rows_scanned = Some(rows_out.len() as i64);
            Ok(QueryOutcome { rows: rows_out, rows_scanned })
        })
        .await
        .map_err(|e| ConnectorError::Query(e.to_string()))?
    }

    async fn test_connection(&self) -> Result<(), ConnectorError> {
        self.execute_query("select 1").await.map(|_| ())
    }
}
