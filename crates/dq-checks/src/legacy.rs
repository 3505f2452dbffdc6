//! Fallback path for `CheckType` variants with no row in `registry`.
//!
//! The structured registry covers the sensor/rule pairs that are common
//! enough to template once and reuse. A handful of check types (schema-drift
//! comparisons, the narrower numeric/format variants) don't have a
//! structured sensor yet; rather than reject them outright this runs a
//! Great-Expectations-style "expectation": an optional custom SQL condition
//! supplied in `check.parameters.sql_condition`, counted directly against the
//! target table, with no template indirection. A check type in this path
//! with no `sql_condition` configured always passes — there is nothing to
//! check without one.

use dq_connectors::{Connector, ConnectorError};
use dq_schemas::{Check, ResultSeverity};
use serde_json::json;

pub struct FallbackOutcome {
    pub passed: bool,
    pub observed_value: Option<f64>,
    pub comment: String,
    pub executed_sql: Option<String>,
}

pub async fn run(check: &Check, connector: &dyn Connector) -> Result<FallbackOutcome, ConnectorError> {
    let condition = check.parameters.get("sql_condition").and_then(|v| v.as_str());

    let Some(condition) = condition else {
        return Ok(FallbackOutcome {
            passed: true,
            observed_value: None,
            comment: format!(
                "{:?} has no structured sensor; no sql_condition configured, so this check always passes",
                check.check_type
            ),
            executed_sql: None,
        });
    };

    let table = match &check.target_schema {
        Some(schema) => format!("{schema}.{}", check.target_table),
        None => check.target_table.clone(),
    };
    let sql = format!("select count(*) as value from {table} where not ({condition})");

    let outcome = connector.execute_query(&sql).await?;
    let failing = outcome
        .single_row()
        .and_then(|row| row.get("value"))
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    Ok(FallbackOutcome {
        passed: failing == 0.0,
        observed_value: Some(failing),
        comment: format!("{failing} row(s) failed legacy condition"),
        executed_sql: Some(sql),
    })
}

/// Legacy outcomes carry no threshold config, so severity is fixed: a
/// failing legacy check is always graded `Error`, never `Warning`/`Fatal`.
pub fn severity_for(outcome: &FallbackOutcome) -> ResultSeverity {
    if outcome.passed {
        ResultSeverity::Passed
    } else {
        ResultSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_fallback_without_condition_is_passed_severity() {
        let outcome = FallbackOutcome {
            passed: true,
            observed_value: None,
            comment: "no sql_condition".into(),
            executed_sql: None,
        };
        assert_eq!(severity_for(&outcome), ResultSeverity::Passed);
    }

    #[test]
    fn failing_fallback_is_error_severity() {
        let outcome = FallbackOutcome {
            passed: false,
            observed_value: Some(3.0),
            comment: "3 row(s) failed legacy condition".into(),
            executed_sql: Some("select ...".into()),
        };
        assert_eq!(severity_for(&outcome), ResultSeverity::Error);
    }

    #[test]
    fn fallback_params_helper_smoke() {
        let _ = json!({"sql_condition": "x > 0"});
    }
}
