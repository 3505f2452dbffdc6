use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Closed set of ~200 check definitions (see `dq-checks` for the registry
/// table). Mirrors `DQOpsCheckType` from the original implementation;
/// variants are grouped by family with a comment per section, matching the
/// source ordering so the two can be diffed by eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "check_type", rename_all = "snake_case")]
pub enum CheckType {
    // Volume (table-level)
    RowCount,
    RowCountChange1Day,
    RowCountChange7Days,
    RowCountChange30Days,
    RowCountAnomaly,

    // Schema (table-level)
    ColumnCount,
    ColumnExists,
    ColumnCountChanged,
    ColumnListChanged,
    ColumnTypeChanged,

    // Timeliness (table-level)
    DataFreshness,
    DataStaleness,
    DataFreshnessAnomaly,

    // Nulls / completeness (column-level)
    NullsCount,
    NullsPercent,
    NotNullsCount,
    NotNullsPercent,
    EmptyColumnFound,
    NullsPercentChange1Day,
    NullsPercentAnomaly,

    // Uniqueness (column-level)
    DistinctCount,
    DistinctPercent,
    DuplicateCount,
    DuplicatePercent,
    DistinctCountChange1Day,
    DistinctCountAnomaly,
    DistinctPercentAnomaly,

    // Table-level uniqueness
    DuplicateRecordCount,
    DuplicateRecordPercent,

    // Numeric / statistical (column-level)
    NumberBelowMinValue,
    NumberAboveMaxValue,
    NumberBelowMinValuePercent,
    NumberAboveMaxValuePercent,
    NumberInRangePercent,
    IntegerInRangePercent,
    MinInRange,
    MaxInRange,
    SumInRange,
    MeanInRange,
    MedianInRange,
    SampleStddevInRange,
    PopulationStddevInRange,
    SampleVarianceInRange,
    PopulationVarianceInRange,
    NegativeValues,
    NegativeValuesPercent,
    NonNegativeValues,
    NonNegativeValuesPercent,
    SumAnomaly,
    MeanAnomaly,
    MedianAnomaly,
    MinAnomaly,
    MaxAnomaly,

    // Percentile (column-level)
    PercentileInRange,
    Percentile10InRange,
    Percentile25InRange,
    Percentile75InRange,
    Percentile90InRange,

    // Text / pattern (column-level)
    TextMinLength,
    TextMaxLength,
    TextMeanLength,
    TextLengthBelowMinLength,
    TextLengthAboveMaxLength,
    TextLengthInRangePercent,
    EmptyTextFound,
    EmptyTextPercent,
    WhitespaceTextFound,
    WhitespaceTextPercent,
    NullPlaceholderTextFound,
    TextsNotMatchingRegexPercent,
    TextMatchingRegexPercent,
    MinWordCount,
    MaxWordCount,

    // Pattern / format (column-level)
    InvalidEmailFormatFound,
    InvalidEmailFormatPercent,
    InvalidUuidFormatFound,
    InvalidIp4FormatFound,
    InvalidIp4FormatPercent,
    InvalidUsaPhoneFormatFound,
    InvalidUsaZipcodeFormatFound,

    // PII detection (column-level)
    ContainsUsaPhonePercent,
    ContainsEmailPercent,
    ContainsUsaZipcodePercent,
    ContainsIp4Percent,

    // Accepted values (column-level)
    TextFoundInSetPercent,
    NumberFoundInSetPercent,
    ExpectedTextValuesInUseCount,

    // Geographic (column-level)
    InvalidLatitude,
    InvalidLongitude,
    ValidLatitudePercent,
    ValidLongitudePercent,

    // Boolean (column-level)
    TruePercent,
    FalsePercent,

    // DateTime (column-level)
    DateValuesInFuturePercent,
    DateInRangePercent,

    // Referential (column-level)
    ForeignKeyNotFound,
    ForeignKeyFoundPercent,

    // Custom SQL
    SqlConditionFailedOnTable,
    SqlConditionPassedPercentOnTable,
    SqlAggregateExpressionOnTable,
    SqlConditionFailedOnColumn,
    SqlConditionPassedPercentOnColumn,
    SqlAggregateExpressionOnColumn,

    // Cross-table comparison (single connection, two tables)
    TotalRowCountMatchPercent,
    TotalSumMatchPercent,
    TotalNotNullCountMatchPercent,

    // Cross-source comparison (two connections)
    RowCountMatch,
    ColumnCountMatch,
    SumMatch,
    MinMatch,
    MaxMatch,
    MeanMatch,
    NotNullCountMatch,
    NullCountMatch,
    DistinctCountMatch,
}

/// `CheckMode` gates how `target_schema`/`target_table`/`partition_by_column`
/// are interpreted by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "check_mode", rename_all = "snake_case")]
pub enum CheckMode {
    Profiling,
    Monitoring,
    Partitioned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "time_scale", rename_all = "snake_case")]
pub enum TimeScale {
    Daily,
    Monthly,
}

/// A persistent data-quality assertion against a table or column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub check_type: CheckType,
    pub check_mode: CheckMode,
    pub time_scale: Option<TimeScale>,
    pub target_schema: Option<String>,
    pub target_table: String,
    pub target_column: Option<String>,
    pub partition_by_column: Option<String>,
    pub parameters: Value,
    pub rule_parameters: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Check {
    /// Structural invariants from spec §3: column-level ⇒ target_column set,
    /// partitioned ⇒ partition_by_column set. `is_column_level` comes from
    /// the check-registry entry, not from the `Check` row itself, so this is
    /// a cross-cutting validator the API/registry calls, not a method that
    /// can stand alone.
    pub fn validate_shape(&self, is_column_level: bool) -> Result<(), String> {
        if is_column_level && self.target_column.is_none() {
            return Err("column-level check requires target_column".to_string());
        }
        if self.check_mode == CheckMode::Partitioned && self.partition_by_column.is_none() {
            return Err("partitioned check requires partition_by_column".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheck {
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
