//! Schema/table/column listing for the connection-browsing API endpoints.
//!
//! All dialects this crate speaks to expose (or approximate) the ANSI
//! `information_schema` views, so introspection is implemented once here
//! against the `Connector` trait rather than per-adapter. Dialect-specific
//! catalog quirks (e.g. Snowflake's `information_schema` being
//! database-scoped) are not chased; this covers the common case the API
//! needs to populate a connection-browsing tree.

use crate::{Connector, ConnectorError};

pub async fn list_schemas(connector: &dyn Connector) -> Result<Vec<String>, ConnectorError> {
    let outcome = connector
        .execute_query(
            "select schema_name from information_schema.schemata order by schema_name",
        )
        .await?;
    Ok(outcome
        .rows
        .iter()
        .filter_map(|row| row.get("schema_name").and_then(|v| v.as_str()).map(str::to_string))
        .collect())
}

pub async fn list_tables(connector: &dyn Connector, schema: &str) -> Result<Vec<String>, ConnectorError> {
    let sql = format!(
        "select table_name from information_schema.tables where table_schema = '{}' order by table_name",
        escape_literal(schema)
    );
    let outcome = connector.execute_query(&sql).await?;
    Ok(outcome
        .rows
        .iter()
        .filter_map(|row| row.get("table_name").and_then(|v| v.as_str()).map(str::to_string))
        .collect())
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

pub async fn list_columns(
    connector: &dyn Connector,
    schema: &str,
    table: &str,
) -> Result<Vec<ColumnInfo>, ConnectorError> {
    let sql = format!(
        "select column_name, data_type, is_nullable from information_schema.columns \
         where table_schema = '{}' and table_name = '{}' order by ordinal_position",
        escape_literal(schema),
        escape_literal(table)
    );
    let outcome = connector.execute_query(&sql).await?;
    Ok(outcome
        .rows
        .iter()
        .filter_map(|row| {
            let name = row.get("column_name")?.as_str()?.to_string();
            let data_type = row.get("data_type")?.as_str().unwrap_or("unknown").to_string();
            let is_nullable = row
                .get("is_nullable")
                .and_then(|v| v.as_str())
                .map(|s| s.eq_ignore_ascii_case("yes"))
                .unwrap_or(true);
            Some(ColumnInfo { name, data_type, is_nullable })
        })
        .collect())
}

/// Schema/table identifiers are interpolated into catalog SQL (not bound as
/// parameters — not every dialect's catalog query form supports bind
/// params); this is the minimal guard against breaking out of the literal.
fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}
