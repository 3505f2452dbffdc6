use dq_rules::RuleType;
use dq_schemas::CheckType;
use dq_sensors::SensorType;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;

/// One row of the static check → (sensor, rule) table. `category` groups
/// checks for the `GET /checks?category=` filter; `is_column_level` feeds
/// `Check::validate_shape`.
#[derive(Debug, Clone)]
pub struct CheckEntry {
    pub sensor_type: SensorType,
    pub rule_type: RuleType,
    pub category: &'static str,
    pub is_column_level: bool,
    pub default_params: Value,
}

pub fn lookup(check_type: CheckType) -> Option<&'static CheckEntry> {
    REGISTRY.get(&check_type)
}

pub fn is_column_level(check_type: CheckType) -> Option<bool> {
    lookup(check_type).map(|e| e.is_column_level)
}

macro_rules! entry {
    ($sensor:expr, $rule:expr, $category:literal, $col:expr) => {
        CheckEntry { sensor_type: $sensor, rule_type: $rule, category: $category, is_column_level: $col, default_params: json!({}) }
    };
    ($sensor:expr, $rule:expr, $category:literal, $col:expr, $defaults:expr) => {
        CheckEntry { sensor_type: $sensor, rule_type: $rule, category: $category, is_column_level: $col, default_params: $defaults }
    };
}

static REGISTRY: Lazy<HashMap<CheckType, CheckEntry>> = Lazy::new(|| {
    use dq_rules::RuleType::*;
    use dq_sensors::SensorType as S;
    use CheckType::*;

    let mut m = HashMap::new();

    m.insert(RowCount, entry!(S::RowCount, MinMaxCount, "volume", false));
    m.insert(RowCountChange1Day, entry!(S::RowCountChange, MaxChangePercent, "volume", false));
    m.insert(RowCountAnomaly, entry!(S::RowCount, AnomalyPercentile, "volume", false));
    m.insert(ColumnCount, entry!(S::ColumnCount, MinMaxCount, "schema", false));
    m.insert(ColumnExists, entry!(S::ColumnExists, MinValue, "schema", false, json!({"min_value": 1})));
    m.insert(DataFreshness, entry!(S::DataFreshness, MaxValue, "timeliness", false));
    m.insert(DataStaleness, entry!(S::DataStaleness, MaxValue, "timeliness", false));

    m.insert(NullsCount, entry!(S::NullsCount, MaxCount, "nulls", true));
    m.insert(NullsPercent, entry!(S::NullsPercent, MaxPercent, "nulls", true));
    m.insert(NotNullsPercent, entry!(S::NotNullsPercent, MinPercent, "nulls", true));
    m.insert(NullsPercentAnomaly, entry!(S::NullsPercent, AnomalyPercentile, "nulls", true));

    m.insert(DistinctCount, entry!(S::DistinctCount, MinMaxCount, "uniqueness", true));
    m.insert(DistinctPercent, entry!(S::DistinctPercent, MinMaxPercent, "uniqueness", true));
    m.insert(DuplicateCount, entry!(S::DuplicateCount, MaxCount, "uniqueness", true));
    m.insert(DuplicatePercent, entry!(S::DuplicatePercent, MaxPercent, "uniqueness", true));
    m.insert(DistinctCountAnomaly, entry!(S::DistinctCount, AnomalyPercentile, "uniqueness", true));
    m.insert(DistinctPercentAnomaly, entry!(S::DistinctPercent, AnomalyPercentile, "uniqueness", true));
    m.insert(DuplicateRecordCount, entry!(S::DuplicateRecordCount, MaxCount, "uniqueness", false));
    m.insert(DuplicateRecordPercent, entry!(S::DuplicateRecordPercent, MaxPercent, "uniqueness", false));

    m.insert(MinInRange, entry!(S::MinValue, MinMaxValue, "numeric", true));
    m.insert(MaxInRange, entry!(S::MaxValue, MinMaxValue, "numeric", true));
    m.insert(SumInRange, entry!(S::SumValue, MinMaxValue, "numeric", true));
    m.insert(MeanInRange, entry!(S::MeanValue, MinMaxValue, "numeric", true));
    m.insert(MedianInRange, entry!(S::MedianValue, MinMaxValue, "numeric", true));
    m.insert(SampleStddevInRange, entry!(S::StddevSample, MinMaxValue, "numeric", true));
    m.insert(SumAnomaly, entry!(S::SumValue, AnomalyPercentile, "numeric", true));
    m.insert(MeanAnomaly, entry!(S::MeanValue, AnomalyPercentile, "numeric", true));
    m.insert(MedianAnomaly, entry!(S::MedianValue, AnomalyPercentile, "numeric", true));
    m.insert(MinAnomaly, entry!(S::MinValue, AnomalyPercentile, "numeric", true));
    m.insert(MaxAnomaly, entry!(S::MaxValue, AnomalyPercentile, "numeric", true));

    m.insert(PercentileInRange, entry!(S::Percentile, MinMaxValue, "percentile", true));
    m.insert(Percentile10InRange, entry!(S::Percentile, MinMaxValue, "percentile", true, json!({"percentile": 0.10})));
    m.insert(Percentile25InRange, entry!(S::Percentile, MinMaxValue, "percentile", true, json!({"percentile": 0.25})));
    m.insert(Percentile75InRange, entry!(S::Percentile, MinMaxValue, "percentile", true, json!({"percentile": 0.75})));
    m.insert(Percentile90InRange, entry!(S::Percentile, MinMaxValue, "percentile", true, json!({"percentile": 0.90})));

    m.insert(TextMinLength, entry!(S::TextMinLength, MinValue, "text", true));
    m.insert(TextMaxLength, entry!(S::TextMaxLength, MaxValue, "text", true));
    m.insert(TextMeanLength, entry!(S::TextMeanLength, MinMaxValue, "text", true));
    m.insert(EmptyTextPercent, entry!(S::EmptyTextPercent, MaxPercent, "text", true));
    m.insert(WhitespaceTextPercent, entry!(S::WhitespaceTextPercent, MaxPercent, "text", true));
    m.insert(TextsNotMatchingRegexPercent, entry!(S::RegexNotMatchPercent, MaxPercent, "text", true));
    m.insert(TextMatchingRegexPercent, entry!(S::RegexMatchPercent, MinPercent, "text", true));

    m.insert(InvalidEmailFormatPercent, entry!(S::InvalidEmailFormatPercent, MaxPercent, "pattern", true));
    m.insert(InvalidUuidFormatFound, entry!(S::InvalidUuidFormatPercent, MaxPercent, "pattern", true));
    m.insert(ContainsEmailPercent, entry!(S::ContainsEmailPercent, MaxPercent, "pii", true));

    m.insert(TextFoundInSetPercent, entry!(S::TextInSetPercent, MinPercent, "accepted_values", true));
    m.insert(NumberFoundInSetPercent, entry!(S::NumberInSetPercent, MinPercent, "accepted_values", true));

    m.insert(InvalidLatitude, entry!(S::InvalidLatitudePercent, MaxPercent, "geographic", true));
    m.insert(InvalidLongitude, entry!(S::InvalidLongitudePercent, MaxPercent, "geographic", true));

    m.insert(TruePercent, entry!(S::TruePercent, MinMaxPercent, "boolean", true));
    m.insert(FalsePercent, entry!(S::FalsePercent, MinMaxPercent, "boolean", true));

    m.insert(DateValuesInFuturePercent, entry!(S::FutureDatePercent, MaxPercent, "datetime", true));
    m.insert(DateInRangePercent, entry!(S::DateInRangePercent, MinPercent, "datetime", true));

    m.insert(ForeignKeyFoundPercent, entry!(S::ForeignKeyNotFoundPercent, MaxPercent, "referential", true));

    m.insert(SqlConditionFailedOnTable, entry!(S::SqlConditionFailedCount, MaxCount, "custom_sql", false));
    m.insert(SqlConditionPassedPercentOnTable, entry!(S::SqlConditionPassedPercent, MinPercent, "custom_sql", false));
    m.insert(SqlAggregateExpressionOnTable, entry!(S::SqlAggregateValue, MinMaxValue, "custom_sql", false));
    m.insert(SqlConditionFailedOnColumn, entry!(S::SqlConditionFailedCount, MaxCount, "custom_sql", true));
    m.insert(SqlConditionPassedPercentOnColumn, entry!(S::SqlConditionPassedPercent, MinPercent, "custom_sql", true));
    m.insert(SqlAggregateExpressionOnColumn, entry!(S::SqlAggregateValue, MinMaxValue, "custom_sql", true));

    m.insert(RowCountMatch, entry!(S::RowCountMatchPercent, MinPercent, "cross_source", false));
    m.insert(SumMatch, entry!(S::SumMatchPercent, MinPercent, "cross_source", true));
    m.insert(NotNullCountMatch, entry!(S::NotNullCountMatchPercent, MinPercent, "cross_source", true));

    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_count_is_table_level() {
        assert_eq!(is_column_level(CheckType::RowCount), Some(false));
    }

    #[test]
    fn nulls_percent_is_column_level() {
        assert_eq!(is_column_level(CheckType::NullsPercent), Some(true));
    }

    #[test]
    fn unregistered_check_type_falls_through_to_none() {
        // ColumnTypeChanged has no registry entry in this slice; the executor
        // routes it to the legacy fallback instead of panicking here.
        assert!(lookup(CheckType::ColumnTypeChanged).is_none());
    }
}
