//! Deterministic stand-in for a live `Connector`. No network I/O — scenario
//! tests configure the value a sensor query should return and assert on the
//! rule/executor behavior downstream of it, not on connectivity.

use std::sync::Mutex;

use async_trait::async_trait;
use dq_connectors::{Connector, ConnectorError, QueryOutcome, Row};
use dq_schemas::ConnectionType;
use serde_json::Value;

enum FakeResponse {
    Value(f64),
    Error(String),
}

/// Replays a fixed sequence of query results, one per `execute_query` call,
/// repeating the last entry once the sequence is exhausted — enough to drive
/// both a single-check test and a multi-call history backfill.
pub struct FakeConnector {
    dialect: ConnectionType,
    responses: Mutex<Vec<FakeResponse>>,
    calls: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(dialect: ConnectionType) -> Self {
        FakeConnector { dialect, responses: Mutex::new(Vec::new()), calls: Mutex::new(Vec::new()) }
    }

    /// Queues a single-row `{"value": value}` response — the shape sensors
    /// expect back from `execute_query`.
    pub fn with_value(self, value: f64) -> Self {
        self.responses.lock().unwrap().push(FakeResponse::Value(value));
        self
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(FakeResponse::Error(message.into()));
        self
    }

    /// SQL strings passed to `execute_query`, in call order — for asserting
    /// a sensor rendered the expected query.
    pub fn executed_queries(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn single_row_outcome(value: f64) -> QueryOutcome {
    let mut row = Row::new();
    row.insert("value".to_string(), Value::from(value));
    QueryOutcome { rows: vec![row], rows_scanned: Some(1) }
}

#[async_trait]
impl Connector for FakeConnector {
    fn dialect(&self) -> ConnectionType {
        self.dialect
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryOutcome, ConnectorError> {
        self.calls.lock().unwrap().push(sql.to_string());
        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 { responses.remove(0) } else { responses.pop().unwrap_or(FakeResponse::Error(
            "FakeConnector has no queued response".to_string(),
        )) };
        // Put the last response back so repeated calls past the configured
        // sequence keep returning it instead of erroring out.
        match &next {
            FakeResponse::Value(v) => responses.push(FakeResponse::Value(*v)),
            FakeResponse::Error(m) => responses.push(FakeResponse::Error(m.clone())),
        }
        match next {
            FakeResponse::Value(v) => Ok(single_row_outcome(v)),
            FakeResponse::Error(m) => Err(ConnectorError::Query(m)),
        }
    }

    async fn test_connection(&self) -> Result<(), ConnectorError> {
        Ok(())
    }
}
