//! Pure rule evaluation: `(sensor_value, params) -> RuleResult`.
//!
//! Nothing in this crate touches a database or a connector — it is the one
//! piece of the check-execution path that is trivially unit-testable in
//! isolation, mirroring how the portfolio math and reconciliation diff in
//! the teacher codebase are kept as pure functions over typed state.

use dq_schemas::ResultSeverity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    MinValue,
    MaxValue,
    MinMaxValue,
    MinPercent,
    MaxPercent,
    MinMaxPercent,
    MinCount,
    MaxCount,
    MinMaxCount,
    MaxChangePercent,
    EqualTo,
    NotEqualTo,
    IsTrue,
    IsFalse,
    AnomalyPercentile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleResult {
    pub severity: ResultSeverity,
    pub passed: bool,
    pub message: String,
    pub expected: Option<f64>,
    pub actual: Option<f64>,
}

impl RuleResult {
    fn pass(actual: Option<f64>, expected: Option<f64>, message: impl Into<String>) -> Self {
        RuleResult {
            severity: ResultSeverity::Passed,
            passed: true,
            message: message.into(),
            expected,
            actual,
        }
    }

    fn fail(severity: ResultSeverity, actual: Option<f64>, expected: Option<f64>, message: impl Into<String>) -> Self {
        RuleResult { severity, passed: false, message: message.into(), expected, actual }
    }
}

/// Of the `warning`/`error`/`fatal` threshold records in `rule_parameters`,
/// picks the highest-severity one present. Returns `None` if none are set —
/// callers should treat that as "always passes" rather than erroring.
pub fn select_threshold(rule_parameters: &Value) -> Option<(ResultSeverity, Value)> {
    for (key, severity) in [
        ("fatal", ResultSeverity::Fatal),
        ("error", ResultSeverity::Error),
        ("warning", ResultSeverity::Warning),
    ] {
        if let Some(params) = rule_parameters.get(key) {
            if !params.is_null() {
                return Some((severity, params.clone()));
            }
        }
    }
    None
}

fn num(params: &Value, key: &str) -> Option<f64> {
    params.get(key).and_then(Value::as_f64)
}

/// Evaluates `rule_type` against `sensor_value` using the already-selected
/// `(severity, params)` threshold pair. `historical_values` is only
/// consulted by `AnomalyPercentile`.
pub fn evaluate(
    rule_type: RuleType,
    sensor_value: Option<f64>,
    severity: ResultSeverity,
    params: &Value,
    historical_values: &[f64],
) -> RuleResult {
    if rule_type == RuleType::AnomalyPercentile {
        return evaluate_anomaly(sensor_value, severity, params, historical_values);
    }

    let Some(value) = sensor_value else {
        return RuleResult::fail(severity, None, None, "sensor returned null");
    };

    match rule_type {
        RuleType::MinValue => {
            let min = num(params, "min_value").unwrap_or(f64::NEG_INFINITY);
            if value >= min {
                RuleResult::pass(Some(value), Some(min), "value within bounds")
            } else {
                RuleResult::fail(severity, Some(value), Some(min), format!("{value} is below minimum {min}"))
            }
        }
        RuleType::MaxValue => {
            let max = num(params, "max_value").unwrap_or(f64::INFINITY);
            if value <= max {
                RuleResult::pass(Some(value), Some(max), "value within bounds")
            } else {
                RuleResult::fail(severity, Some(value), Some(max), format!("{value} exceeds maximum {max}"))
            }
        }
        RuleType::MinMaxValue => {
            let min = num(params, "min_value").unwrap_or(f64::NEG_INFINITY);
            let max = num(params, "max_value").unwrap_or(f64::INFINITY);
            if value >= min && value <= max {
                RuleResult::pass(Some(value), None, "value within bounds")
            } else {
                RuleResult::fail(severity, Some(value), None, format!("{value} is outside [{min}, {max}]"))
            }
        }
        RuleType::MinCount => {
            let min = num(params, "min_count").unwrap_or(f64::NEG_INFINITY);
            if value >= min {
                RuleResult::pass(Some(value), Some(min), "count within bounds")
            } else {
                RuleResult::fail(severity, Some(value), Some(min), format!("{value} is below minimum count {min}"))
            }
        }
        RuleType::MaxCount => {
            let max = num(params, "max_count").unwrap_or(f64::INFINITY);
            if value <= max {
                RuleResult::pass(Some(value), Some(max), "count within bounds")
            } else {
                RuleResult::fail(severity, Some(value), Some(max), format!("{value} exceeds maximum count {max}"))
            }
        }
        RuleType::MinMaxCount => {
            let min = num(params, "min_count").unwrap_or(f64::NEG_INFINITY);
            let max = num(params, "max_count").unwrap_or(f64::INFINITY);
            if value >= min && value <= max {
                RuleResult::pass(Some(value), None, "count within bounds")
            } else {
                RuleResult::fail(severity, Some(value), None, format!("{value} is outside [{min}, {max}]"))
            }
        }
        RuleType::MinPercent => {
            let min = num(params, "min_percent").unwrap_or(0.0);
            if value >= min {
                RuleResult::pass(Some(value), Some(min), "percent within bounds")
            } else {
                RuleResult::fail(severity, Some(value), Some(min), format!("{value}% is below minimum {min}%"))
            }
        }
        RuleType::MaxPercent => {
            let max = num(params, "max_percent").unwrap_or(100.0);
            if value <= max {
                RuleResult::pass(Some(value), Some(max), "percent within bounds")
            } else {
                RuleResult::fail(severity, Some(value), Some(max), format!("{value}% exceeds maximum {max}%"))
            }
        }
        RuleType::MinMaxPercent => {
            let min = num(params, "min_percent").unwrap_or(0.0);
            let max = num(params, "max_percent").unwrap_or(100.0);
            if value >= min && value <= max {
                RuleResult::pass(Some(value), None, "percent within bounds")
            } else {
                RuleResult::fail(severity, Some(value), None, format!("{value}% is outside [{min}%, {max}%]"))
            }
        }
        RuleType::MaxChangePercent => {
            let max_change = num(params, "max_change_percent").unwrap_or(0.0);
            if value.abs() <= max_change {
                RuleResult::pass(Some(value), Some(max_change), "change within bounds")
            } else {
                RuleResult::fail(
                    severity,
                    Some(value),
                    Some(max_change),
                    format!("change of {value}% exceeds maximum {max_change}%"),
                )
            }
        }
        RuleType::EqualTo => {
            let expected = num(params, "expected_value").unwrap_or(0.0);
            if (value - expected).abs() < f64::EPSILON {
                RuleResult::pass(Some(value), Some(expected), "value matches expected")
            } else {
                RuleResult::fail(severity, Some(value), Some(expected), format!("{value} != expected {expected}"))
            }
        }
        RuleType::NotEqualTo => {
            let expected = num(params, "expected_value").unwrap_or(0.0);
            if (value - expected).abs() >= f64::EPSILON {
                RuleResult::pass(Some(value), Some(expected), "value differs from excluded value")
            } else {
                RuleResult::fail(severity, Some(value), Some(expected), format!("{value} equals excluded value {expected}"))
            }
        }
        RuleType::IsTrue => {
            if value != 0.0 {
                RuleResult::pass(Some(value), Some(1.0), "value is true")
            } else {
                RuleResult::fail(severity, Some(value), Some(1.0), "value is false, expected true")
            }
        }
        RuleType::IsFalse => {
            if value == 0.0 {
                RuleResult::pass(Some(value), Some(0.0), "value is false")
            } else {
                RuleResult::fail(severity, Some(value), Some(0.0), "value is true, expected false")
            }
        }
        RuleType::AnomalyPercentile => unreachable!("handled above"),
    }
}

fn evaluate_anomaly(
    sensor_value: Option<f64>,
    severity: ResultSeverity,
    params: &Value,
    historical_values: &[f64],
) -> RuleResult {
    if historical_values.len() < 7 {
        return RuleResult::pass(sensor_value, None, "insufficient history");
    }

    let Some(value) = sensor_value else {
        return RuleResult::fail(severity, None, None, "sensor returned null");
    };

    let p = num(params, "anomaly_percent").unwrap_or(5.0);
    let mut sorted = historical_values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("historical values must not be NaN"));

    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let k = 1.5 * (1.0 + p / 100.0);

    if iqr == 0.0 {
        return if (value - q1).abs() < f64::EPSILON {
            RuleResult::pass(Some(value), Some(q1), "value matches stable baseline")
        } else {
            RuleResult::fail(severity, Some(value), Some(q1), format!("{value} deviates from stable baseline {q1}"))
        };
    }

    let lower = q1 - k * iqr;
    let upper = q3 + k * iqr;

    if value >= lower && value <= upper {
        RuleResult::pass(Some(value), None, format!("within expected range [{lower:.4}, {upper:.4}]"))
    } else {
        RuleResult::fail(
            severity,
            Some(value),
            None,
            format!("{value} is outside expected range [{lower:.4}, {upper:.4}]"),
        )
    }
}

/// Linear-interpolation percentile over an already-sorted slice (numpy's
/// default `"linear"` method).
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;
    if lower_idx == upper_idx {
        sorted[lower_idx]
    } else {
        let frac = rank - lower_idx as f64;
        sorted[lower_idx] + (sorted[upper_idx] - sorted[lower_idx]) * frac
    }
}

/// Cross-source match percent, per the dual-connection rule (§4.5a).
pub fn match_percent(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    let (a, b) = (a?, b?);
    let (a, b) = (a.abs(), b.abs());
    if a == 0.0 && b == 0.0 {
        Some(100.0)
    } else if a.max(b) == 0.0 {
        Some(0.0)
    } else {
        Some(a.min(b) / a.max(b) * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_threshold_prefers_fatal_over_error_and_warning() {
        let params = json!({"warning": {"min_value": 1}, "error": {"min_value": 2}, "fatal": {"min_value": 3}});
        let (severity, chosen) = select_threshold(&params).unwrap();
        assert_eq!(severity, ResultSeverity::Fatal);
        assert_eq!(chosen, json!({"min_value": 3}));
    }

    #[test]
    fn null_sensor_value_fails_at_tagged_severity() {
        let result = evaluate(RuleType::MinValue, None, ResultSeverity::Error, &json!({}), &[]);
        assert!(!result.passed);
        assert_eq!(result.severity, ResultSeverity::Error);
        assert_eq!(result.message, "sensor returned null");
    }

    #[test]
    fn min_value_rule_passes_at_boundary() {
        let result = evaluate(RuleType::MinValue, Some(10.0), ResultSeverity::Error, &json!({"min_value": 10.0}), &[]);
        assert!(result.passed);
    }

    #[test]
    fn anomaly_rule_passes_with_insufficient_history() {
        let result = evaluate(RuleType::AnomalyPercentile, Some(100.0), ResultSeverity::Error, &json!({}), &[1.0, 2.0]);
        assert!(result.passed);
        assert_eq!(result.message, "insufficient history");
    }

    #[test]
    fn anomaly_rule_flags_value_outside_tukey_fence() {
        let history: Vec<f64> = vec![10.0, 11.0, 10.0, 9.0, 10.0, 11.0, 10.0, 9.0, 10.0];
        let result = evaluate(RuleType::AnomalyPercentile, Some(1000.0), ResultSeverity::Error, &json!({"anomaly_percent": 5}), &history);
        assert!(!result.passed);
        assert_eq!(result.severity, ResultSeverity::Error);
    }

    #[test]
    fn anomaly_rule_zero_iqr_requires_exact_match() {
        let history = vec![5.0; 10];
        let passing = evaluate(RuleType::AnomalyPercentile, Some(5.0), ResultSeverity::Error, &json!({}), &history);
        assert!(passing.passed);

        let failing = evaluate(RuleType::AnomalyPercentile, Some(6.0), ResultSeverity::Error, &json!({}), &history);
        assert!(!failing.passed);
    }

    #[test]
    fn match_percent_null_on_either_side() {
        assert_eq!(match_percent(None, Some(1.0)), None);
        assert_eq!(match_percent(Some(1.0), None), None);
    }

    #[test]
    fn match_percent_both_zero_is_full_match() {
        assert_eq!(match_percent(Some(0.0), Some(0.0)), Some(100.0));
    }

    #[test]
    fn match_percent_one_zero_is_no_match() {
        assert_eq!(match_percent(Some(0.0), Some(5.0)), Some(0.0));
    }

    #[test]
    fn match_percent_ratio_of_smaller_to_larger() {
        assert_eq!(match_percent(Some(50.0), Some(100.0)), Some(50.0));
    }
}
