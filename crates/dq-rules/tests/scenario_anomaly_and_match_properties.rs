//! A1-A4 (anomaly-percentile Tukey fence) and X1-X3 (cross-source match
//! percent), fixed inputs from the documented property table.

use dq_rules::{evaluate, match_percent, RuleType};
use dq_schemas::ResultSeverity;
use serde_json::json;

fn params(anomaly_percent: f64) -> serde_json::Value {
    json!({ "anomaly_percent": anomaly_percent })
}

#[test]
fn a1_value_within_stable_history_passes() {
    let history = vec![19.0, 20.0, 21.0, 20.0, 19.0, 21.0, 20.0, 20.0, 19.0, 21.0];
    let result = evaluate(RuleType::AnomalyPercentile, Some(20.0), ResultSeverity::Error, &params(5.0), &history);
    assert!(result.passed);
    assert_eq!(result.severity, ResultSeverity::Passed);
}

#[test]
fn a2_value_far_outside_history_fails_at_configured_severity() {
    let history = vec![1000.0, 1005.0, 1010.0, 995.0, 1002.0, 1008.0, 997.0, 1003.0, 1001.0, 998.0];
    let result = evaluate(RuleType::AnomalyPercentile, Some(20.0), ResultSeverity::Error, &params(5.0), &history);
    assert!(!result.passed);
    assert_eq!(result.severity, ResultSeverity::Error);
}

#[test]
fn a3_short_history_always_passes_with_insufficient_history_message() {
    let history = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    assert_eq!(history.len(), 6, "must stay below the 7-entry threshold");
    let result = evaluate(RuleType::AnomalyPercentile, Some(20.0), ResultSeverity::Error, &params(5.0), &history);
    assert!(result.passed);
    assert_eq!(result.message, "insufficient history");
}

#[test]
fn a4_zero_iqr_baseline_only_matches_exact_value() {
    let history = vec![5.0; 10];
    let passing = evaluate(RuleType::AnomalyPercentile, Some(5.0), ResultSeverity::Error, &params(5.0), &history);
    assert!(passing.passed);

    let failing = evaluate(RuleType::AnomalyPercentile, Some(6.0), ResultSeverity::Error, &params(5.0), &history);
    assert!(!failing.passed);
}

#[test]
fn x1_equal_nonzero_counts_match_at_100_percent() {
    assert_eq!(match_percent(Some(1000.0), Some(1000.0)), Some(100.0));
}

#[test]
fn x2_both_zero_counts_as_a_full_match() {
    assert_eq!(match_percent(Some(0.0), Some(0.0)), Some(100.0));
}

#[test]
fn x3_zero_against_nonzero_is_a_complete_mismatch() {
    assert_eq!(match_percent(Some(0.0), Some(5.0)), Some(0.0));
}
