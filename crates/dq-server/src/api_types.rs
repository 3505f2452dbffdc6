//! Request and response types for the HTTP API. Plain `Serialize +
//! Deserialize` structs; no business logic lives here.

use chrono::{DateTime, Utc};
use dq_schemas::{
    CheckMode, CheckType, Connection, ConnectionType, IncidentSeverity, IncidentStatus, ResultSeverity, TimeScale,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
    pub database: bool,
    pub job_queue: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConnectionRequest {
    pub name: String,
    pub connection_type: ConnectionType,
    pub config: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConnectionRequest {
    pub name: Option<String>,
    pub config: Option<Value>,
    pub is_active: Option<bool>,
}

/// `Connection` as returned over the wire never carries `encrypted_config` —
/// the API is the boundary past which ciphertext shouldn't travel.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionResponse {
    pub id: Uuid,
    pub name: String,
    pub connection_type: ConnectionType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Connection> for ConnectionResponse {
    fn from(c: Connection) -> Self {
        ConnectionResponse {
            id: c.id,
            name: c.name,
            connection_type: c.connection_type,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestConnectionResponse {
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaListResponse {
    pub schemas: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableListResponse {
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnListResponse {
    pub columns: Vec<dq_connectors::introspect::ColumnInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckRequest {
    pub connection_id: Uuid,
    pub check_type: CheckType,
    pub check_mode: CheckMode,
    pub time_scale: Option<TimeScale>,
    pub target_schema: Option<String>,
    pub target_table: String,
    pub target_column: Option<String>,
    pub partition_by_column: Option<String>,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub rule_parameters: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCheckRequest {
    pub target_schema: Option<String>,
    pub target_table: Option<String>,
    pub target_column: Option<String>,
    pub partition_by_column: Option<String>,
    pub parameters: Option<Value>,
    pub rule_parameters: Option<Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListChecksQuery {
    pub connection_id: Option<Uuid>,
    pub check_type: Option<CheckType>,
    pub check_mode: Option<CheckMode>,
    pub target_table: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Clone, Serialize)]
pub struct RunCheckResponse {
    pub job_id: Uuid,
    pub task_id: Uuid,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewCheckRequest {
    #[serde(flatten)]
    pub check: CreateCheckRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRunRequest {
    pub check_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchRunResponse {
    pub jobs: Vec<RunCheckResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListJobsQuery {
    pub check_id: Uuid,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListResultsQuery {
    pub check_id: Option<Uuid>,
    pub connection_id: Option<Uuid>,
    pub passed: Option<bool>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSummaryQuery {
    pub check_id: Option<Uuid>,
    pub connection_id: Option<Uuid>,
    pub passed: Option<bool>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultSummaryResponse {
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub pass_rate: f64,
    pub avg_execution_time_ms: f64,
    pub by_severity: BySeverity,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BySeverity {
    pub passed: i64,
    pub warning: i64,
    pub error: i64,
    pub fatal: i64,
}

impl From<dq_db::ResultSummaryRow> for ResultSummaryResponse {
    fn from(r: dq_db::ResultSummaryRow) -> Self {
        let failed = r.total - r.passed;
        let pass_rate = if r.total > 0 { r.passed as f64 / r.total as f64 } else { 0.0 };
        ResultSummaryResponse {
            total: r.total,
            passed: r.passed,
            failed,
            pass_rate,
            avg_execution_time_ms: r.avg_execution_time_ms.unwrap_or(0.0),
            by_severity: BySeverity { passed: r.passed, warning: r.warning, error: r.error, fatal: r.fatal },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListIncidentsQuery {
    pub check_id: Option<Uuid>,
    pub status: Option<IncidentStatus>,
    pub severity: Option<IncidentSeverity>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateIncidentRequest {
    pub status: IncidentStatus,
    pub by: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateScheduleRequest {
    pub check_id: Uuid,
    pub cron_expression: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChannelRequest {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: std::collections::BTreeMap<String, String>,
    pub events: Vec<dq_schemas::NotificationEvent>,
    #[serde(default)]
    pub min_severity: Option<ResultSeverity>,
}

pub use dq_schemas::{
    Check as CheckDto, CheckResult as CheckResultDto, Incident as IncidentDto, Job as JobDto,
    NotificationChannel as ChannelDto, Schedule as ScheduleDto,
};
