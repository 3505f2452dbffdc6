use dq_crypto::EncryptionKey;
use dq_schemas::{Connection, ConnectionType};

use crate::duckdb_adapter::{DuckDbConfig, DuckDbConnector};
use crate::mysql::MysqlConnector;
use crate::postgres::PostgresConnector;
use crate::rest_sql::{RestSqlConfig, RestSqlConnector};
use crate::sqlserver::SqlServerConnector;
use crate::{parse_wire_config, Connector, ConnectorError};

/// Decrypts `connection.encrypted_config` and dispatches to the adapter for
/// its dialect. This is the only function in the crate that matches on
/// `ConnectionType` — adding a dialect means adding one arm here plus its
/// adapter module, nothing else in the executor changes.
pub async fn connect(
    connection: &Connection,
    key: &EncryptionKey,
) -> Result<Box<dyn Connector>, ConnectorError> {
    let config = key
        .decrypt_config(&connection.encrypted_config)
        .map_err(|e| ConnectorError::Config(e.to_string()))?;

    match connection.connection_type {
        ConnectionType::Postgresql => {
            let wire = parse_wire_config(&config)?;
            Ok(Box::new(PostgresConnector::connect(&wire).await?))
        }
        ConnectionType::Mysql => {
            let wire = parse_wire_config(&config)?;
            Ok(Box::new(MysqlConnector::connect(&wire).await?))
        }
        ConnectionType::Sqlserver => {
            let wire = parse_wire_config(&config)?;
            Ok(Box::new(SqlServerConnector::connect(&wire).await?))
        }
        ConnectionType::Duckdb => {
            let duck: DuckDbConfig = serde_json::from_value(config)
                .map_err(|e| ConnectorError::Config(format!("invalid duckdb config: {e}")))?;
            Ok(Box::new(DuckDbConnector::connect(&duck).await?))
        }
        ConnectionType::Bigquery
        | ConnectionType::Snowflake
        | ConnectionType::Redshift
        | ConnectionType::Databricks
        | ConnectionType::Oracle => {
            let rest: RestSqlConfig = serde_json::from_value(config)
                .map_err(|e| ConnectorError::Config(format!("invalid rest sql config: {e}")))?;
            Ok(Box::new(RestSqlConnector::new(connection.connection_type, rest)?))
        }
    }
}
