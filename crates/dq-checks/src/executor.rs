//! C5: ties the registry, connector factory, sensor renderer, and rule
//! evaluator into one `execute()` call per spec §4.5.
//!
//! Steps: resolve the registry entry (or fall through to `legacy`), render
//! the sensor SQL, run it through the connector, evaluate the rule against
//! the selected threshold, and (unless this is a preview run) persist the
//! result and, on failure, hand off to the incident ledger.

use chrono::{DateTime, Duration, Utc};
use dq_connectors::{Connector, ConnectorError};
use dq_crypto::EncryptionKey;
use dq_schemas::{Check, CheckResult, Connection, IncidentSeverity, ResultSeverity};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::legacy;
use crate::registry::{self, CheckEntry};

/// History lookback window for the anomaly-percentile rule. Matches the
/// default retention the scheduler assumes elsewhere in the platform.
const ANOMALY_HISTORY_LOOKBACK_DAYS: i64 = 90;
const ANOMALY_HISTORY_LIMIT: i64 = 1000;

#[derive(Debug)]
pub enum ExecutionError {
    Connector(ConnectorError),
    Db(String),
    Validation(String),
    MissingCrossSourceConnection,
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionError::Connector(e) => write!(f, "{e}"),
            ExecutionError::Db(msg) => write!(f, "db error: {msg}"),
            ExecutionError::Validation(msg) => write!(f, "check validation failed: {msg}"),
            ExecutionError::MissingCrossSourceConnection => {
                write!(f, "this check type compares two connections but only one was supplied")
            }
        }
    }
}

impl std::error::Error for ExecutionError {}

impl From<ConnectorError> for ExecutionError {
    fn from(e: ConnectorError) -> Self {
        ExecutionError::Connector(e)
    }
}

/// Everything `execute` needs to run one check once. `cross_source_connection`
/// is only consulted for checks the registry marks `category == "cross_source"`.
pub struct ExecutionRequest<'a> {
    pub check: &'a Check,
    pub job_id: Uuid,
    pub connection: &'a Connection,
    pub cross_source_connection: Option<&'a Connection>,
    pub encryption_key: &'a EncryptionKey,
    pub pool: &'a PgPool,
}

/// Runs `request.check` once and returns the resulting `CheckResult`, with
/// the result row inserted and (on failure) an incident recorded.
pub async fn execute(request: ExecutionRequest<'_>) -> Result<CheckResult, ExecutionError> {
    let outcome = run(&request).await?;
    persist(&request, &outcome).await?;
    Ok(outcome)
}

/// Same evaluation path as `execute`, but neither the `CheckResult` nor any
/// incident is written — used by `POST /checks/{id}/preview`.
pub async fn preview(request: ExecutionRequest<'_>) -> Result<CheckResult, ExecutionError> {
    run(&request).await
}

async fn run(request: &ExecutionRequest<'_>) -> Result<CheckResult, ExecutionError> {
    let check = request.check;
    let started = Utc::now();

    let connector = dq_connectors::connect(request.connection, request.encryption_key).await?;

    let Some(entry) = registry::lookup(check.check_type) else {
        return run_legacy(request, connector.as_ref(), started).await;
    };

    check
        .validate_shape(entry.is_column_level)
        .map_err(ExecutionError::Validation)?;

    if entry.category == "cross_source" {
        return run_cross_source(request, entry, connector.as_ref(), started).await;
    }

    let params = render_params(check, entry);
    let sql = dq_sensors::render(entry.sensor_type, &params)
        .map_err(|e| ExecutionError::Validation(e.to_string()))?;

    let query = connector.execute_query(&sql).await?;
    let (sensor_value, observed_value) = extract_value(&query);

    let historical = if entry.rule_type == dq_rules::RuleType::AnomalyPercentile {
        fetch_history(request.pool, check.id).await?
    } else {
        Vec::new()
    };

    let (severity, rule_params) = match dq_rules::select_threshold(&check.rule_parameters) {
        Some(pair) => pair,
        None => {
            return Ok(build_result(
                request,
                check,
                Some(sql),
                query.rows_scanned,
                sensor_value,
                None,
                ResultSeverity::Passed,
                true,
                "no threshold configured for this check".to_string(),
                started,
                observed_value,
            ));
        }
    };

    let rule_result = dq_rules::evaluate(entry.rule_type, sensor_value, severity, &rule_params, &historical);

    Ok(build_result(
        request,
        check,
        Some(sql),
        query.rows_scanned,
        rule_result.actual,
        rule_result.expected,
        rule_result.severity,
        rule_result.passed,
        rule_result.message,
        started,
        observed_value,
    ))
}

async fn run_legacy(
    request: &ExecutionRequest<'_>,
    connector: &dyn Connector,
    started: DateTime<Utc>,
) -> Result<CheckResult, ExecutionError> {
    let check = request.check;
    let outcome = legacy::run(check, connector).await?;
    let severity = legacy::severity_for(&outcome);

    Ok(build_result(
        request,
        check,
        outcome.executed_sql,
        None,
        outcome.observed_value,
        None,
        severity,
        outcome.passed,
        outcome.comment,
        started,
        None,
    ))
}

/// Runs the sensor against `connection` and `cross_source_connection` and
/// grades the pair on `match_percent` rather than a fixed threshold (spec
/// §4.5a). The sensor is rendered twice — once per connection — since the
/// reference side may point at a differently-named schema/table/column via
/// `check.parameters.reference_schema`/`reference_table`/`reference_column`.
async fn run_cross_source(
    request: &ExecutionRequest<'_>,
    entry: &CheckEntry,
    primary: &dyn Connector,
    started: DateTime<Utc>,
) -> Result<CheckResult, ExecutionError> {
    let check = request.check;
    let Some(other_connection) = request.cross_source_connection else {
        return Err(ExecutionError::MissingCrossSourceConnection);
    };
    let other = dq_connectors::connect(other_connection, request.encryption_key).await?;

    let source_params = render_params(check, entry);
    let source_sql = dq_sensors::render(entry.sensor_type, &source_params)
        .map_err(|e| ExecutionError::Validation(e.to_string()))?;

    let reference_params = render_reference_params(check, entry);
    let reference_sql = dq_sensors::render(entry.sensor_type, &reference_params)
        .map_err(|e| ExecutionError::Validation(e.to_string()))?;

    let primary_outcome = primary.execute_query(&source_sql).await?;
    let other_outcome = other.execute_query(&reference_sql).await?;

    let (a, _) = extract_value(&primary_outcome);
    let (b, _) = extract_value(&other_outcome);
    let match_value = dq_rules::match_percent(a, b);

    let (severity, rule_params) = dq_rules::select_threshold(&check.rule_parameters)
        .unwrap_or((ResultSeverity::Error, serde_json::json!({"min_percent": 100.0})));

    let rule_result = dq_rules::evaluate(dq_rules::RuleType::MinPercent, match_value, severity, &rule_params, &[]);

    let executed_sql = format!("-- source\n{source_sql}\n-- reference\n{reference_sql}");

    Ok(build_result(
        request,
        check,
        Some(executed_sql),
        primary_outcome.rows_scanned,
        rule_result.actual,
        rule_result.expected,
        rule_result.severity,
        rule_result.passed,
        format!("cross-source match: {}", rule_result.message),
        started,
        None,
    ))
}

/// `render_params` for the reference connection's side of a cross-source
/// check, applying the optional `reference_schema`/`reference_table`/
/// `reference_column` overrides over the primary-side defaults.
fn render_reference_params(check: &Check, entry: &CheckEntry) -> Value {
    let mut params = render_params(check, entry);
    let Some(obj) = params.as_object_mut() else { return params };

    if let Some(schema) = check.parameters.get("reference_schema").and_then(Value::as_str) {
        obj.insert("schema_name".into(), Value::String(schema.to_string()));
    }
    if let Some(table) = check.parameters.get("reference_table").and_then(Value::as_str) {
        obj.insert("table_name".into(), Value::String(table.to_string()));
    }
    if let Some(column) = check.parameters.get("reference_column").and_then(Value::as_str) {
        obj.insert("column_name".into(), Value::String(column.to_string()));
    }
    params
}

async fn fetch_history(pool: &PgPool, check_id: Uuid) -> Result<Vec<f64>, ExecutionError> {
    let since = Utc::now() - Duration::days(ANOMALY_HISTORY_LOOKBACK_DAYS);
    let rows = dq_db::history_for_check(pool, check_id, since, ANOMALY_HISTORY_LIMIT)
        .await
        .map_err(|e| ExecutionError::Db(e.to_string()))?;
    Ok(rows.into_iter().filter_map(|r| r.actual_value).collect())
}

/// Pulls the sensor's `value` column out of the query result and coerces it
/// to the single float `actual_value` carries, per the documented
/// non-numeric mapping. Returns the coerced value plus, when the raw
/// observation wasn't already a plain number, its stringified form for
/// `result_details.observed_value`.
fn extract_value(outcome: &dq_connectors::QueryOutcome) -> (Option<f64>, Option<String>) {
    match outcome.single_row().and_then(|row| row.get("value")) {
        Some(value) => coerce_actual(value),
        None => (None, None),
    }
}

/// Booleans become 0/1, datetimes become epoch seconds, sequences become
/// their length; anything else that isn't already a number is dropped to
/// `None` but kept verbatim as the observed value.
fn coerce_actual(value: &Value) -> (Option<f64>, Option<String>) {
    match value {
        Value::Null => (None, None),
        Value::Bool(b) => (Some(if *b { 1.0 } else { 0.0 }), Some(b.to_string())),
        Value::Number(_) => (value.as_f64(), None),
        Value::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => (Some(dt.timestamp() as f64), Some(s.clone())),
            Err(_) => (None, Some(s.clone())),
        },
        Value::Array(items) => (Some(items.len() as f64), Some(value.to_string())),
        Value::Object(_) => (None, Some(value.to_string())),
    }
}

/// Builds the minijinja params object for a sensor template: the target
/// location plus any check-specific parameters, with `check.parameters`
/// taking precedence over the registry entry's defaults.
fn render_params(check: &Check, entry: &CheckEntry) -> Value {
    let mut params = entry.default_params.clone();
    if !params.is_object() {
        params = serde_json::json!({});
    }
    let obj = params.as_object_mut().expect("coerced to object above");

    obj.insert("schema_name".into(), Value::String(check.target_schema.clone().unwrap_or_default()));
    obj.insert("table_name".into(), Value::String(check.target_table.clone()));
    if let Some(column) = &check.target_column {
        obj.insert("column_name".into(), Value::String(column.clone()));
    }
    obj.insert("partition_filter".into(), Value::String(partition_filter(check)));

    if let Some(overrides) = check.parameters.as_object() {
        for (k, v) in overrides {
            obj.insert(k.clone(), v.clone());
        }
    }

    params
}

fn partition_filter(check: &Check) -> String {
    use dq_schemas::{CheckMode, TimeScale};

    if check.check_mode != CheckMode::Partitioned {
        return String::new();
    }
    let Some(column) = &check.partition_by_column else {
        return String::new();
    };
    match check.time_scale {
        Some(TimeScale::Monthly) => format!("and {column} >= date_trunc('month', now())"),
        _ => format!("and {column} >= date_trunc('day', now())"),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_result(
    request: &ExecutionRequest<'_>,
    check: &Check,
    executed_sql: Option<String>,
    rows_scanned: Option<i64>,
    actual_value: Option<f64>,
    expected_value: Option<f64>,
    severity: ResultSeverity,
    passed: bool,
    message: String,
    started: DateTime<Utc>,
    observed_value: Option<String>,
) -> CheckResult {
    let executed_at = Utc::now();
    let execution_time_ms = (executed_at - started).num_milliseconds().max(0);

    let mut result_details = serde_json::json!({"message": message});
    if let Some(observed) = observed_value {
        result_details["observed_value"] = Value::String(observed);
    }

    CheckResult {
        id: Uuid::new_v4(),
        executed_at,
        check_id: check.id,
        job_id: request.job_id,
        connection_id: request.connection.id,
        target_schema: check.target_schema.clone(),
        target_table: check.target_table.clone(),
        target_column: check.target_column.clone(),
        check_type: check.check_type,
        actual_value,
        expected_value,
        passed,
        severity,
        execution_time_ms,
        rows_scanned,
        result_details,
        error_message: if passed { None } else { Some(message) },
        executed_sql,
    }
}

async fn persist(request: &ExecutionRequest<'_>, result: &CheckResult) -> Result<(), ExecutionError> {
    dq_db::insert_result(request.pool, result)
        .await
        .map_err(|e| ExecutionError::Db(e.to_string()))?;

    if result.severity.is_failure() {
        dq_db::record_failure(
            request.pool,
            result.check_id,
            result.id,
            incident_severity_for(result.severity),
            &incident_title(result),
            result.error_message.as_deref(),
            result.executed_at,
        )
        .await
        .map_err(|e| ExecutionError::Db(e.to_string()))?;
    }

    Ok(())
}

/// `ResultSeverity` is the rule-evaluation scale; `IncidentSeverity` is the
/// operator-facing triage scale an incident is opened at and keeps for its
/// whole lifetime. `Critical` is reserved for operator escalation and is
/// never assigned here.
fn incident_severity_for(severity: ResultSeverity) -> IncidentSeverity {
    match severity {
        ResultSeverity::Passed => IncidentSeverity::Low,
        ResultSeverity::Warning => IncidentSeverity::Low,
        ResultSeverity::Error => IncidentSeverity::Medium,
        ResultSeverity::Fatal => IncidentSeverity::High,
    }
}

fn incident_title(result: &CheckResult) -> String {
    format!("{:?} failed on {}", result.check_type, result.target_table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_severity_tracks_result_severity() {
        assert_eq!(incident_severity_for(ResultSeverity::Warning), IncidentSeverity::Low);
        assert_eq!(incident_severity_for(ResultSeverity::Error), IncidentSeverity::Medium);
        assert_eq!(incident_severity_for(ResultSeverity::Fatal), IncidentSeverity::High);
    }

    #[test]
    fn partition_filter_is_empty_outside_partitioned_mode() {
        let check = sample_check(dq_schemas::CheckMode::Monitoring, None);
        assert_eq!(partition_filter(&check), "");
    }

    #[test]
    fn partition_filter_uses_partition_column_when_partitioned() {
        let check = sample_check(dq_schemas::CheckMode::Partitioned, Some("ingested_at".to_string()));
        assert!(partition_filter(&check).contains("ingested_at"));
    }

    fn sample_check(mode: dq_schemas::CheckMode, partition_by_column: Option<String>) -> Check {
        Check {
            id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            check_type: dq_schemas::CheckType::RowCount,
            check_mode: mode,
            time_scale: None,
            target_schema: Some("public".into()),
            target_table: "orders".into(),
            target_column: None,
            partition_by_column,
            parameters: serde_json::json!({}),
            rule_parameters: serde_json::json!({}),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
