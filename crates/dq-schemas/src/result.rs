use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::check::CheckType;

/// Severity graded `passed < warning < error < fatal`. Ord is derived in
/// declaration order so `max()`/`cmp()` over a set of thresholds picks the
/// most severe one without a separate rank table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "result_severity", rename_all = "snake_case")]
pub enum ResultSeverity {
    Passed,
    Warning,
    Error,
    Fatal,
}

impl ResultSeverity {
    pub fn is_failure(&self) -> bool {
        !matches!(self, ResultSeverity::Passed)
    }
}

/// The outcome of running one sensor + rule pair for one check, at one
/// instant. Append-only: a `CheckResult` is never updated after insert, only
/// superseded by a later row for the same `check_id`. `(id, executed_at)` is
/// the natural key; storage partitions on `executed_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: Uuid,
    pub executed_at: DateTime<Utc>,
    pub check_id: Uuid,
    pub job_id: Uuid,
    pub connection_id: Uuid,
    pub target_schema: Option<String>,
    pub target_table: String,
    pub target_column: Option<String>,
    pub check_type: CheckType,
    pub actual_value: Option<f64>,
    pub expected_value: Option<f64>,
    pub passed: bool,
    pub severity: ResultSeverity,
    pub execution_time_ms: i64,
    pub rows_scanned: Option<i64>,
    pub result_details: Value,
    pub error_message: Option<String>,
    pub executed_sql: Option<String>,
}
