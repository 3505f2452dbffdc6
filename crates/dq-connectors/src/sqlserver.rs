use async_trait::async_trait;
use dq_schemas::ConnectionType;
use serde_json::Value;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::TokioAsyncWriteCompatExt;

use crate::{ConnectorError, QueryOutcome, Row, SqlWireConfig};

/// `tiberius::Client` is `!Sync` (it owns a mutable socket), so the
/// connector wraps it in a tokio mutex rather than requiring callers to
/// serialize access themselves.
pub struct SqlServerConnector {
    client: Mutex<Client<tokio_util::compat::Compat<TcpStream>>>,
}

impl SqlServerConnector {
    pub async fn connect(config: &SqlWireConfig) -> Result<Self, ConnectorError> {
        let mut tiberius_config = Config::new();
        tiberius_config.host(&config.host);
        tiberius_config.port(config.port.unwrap_or(1433));
        tiberius_config.database(&config.database);
        tiberius_config.trust_cert();

        let user = config.username.clone().unwrap_or_default();
        let password = config.password.clone().unwrap_or_default();
        tiberius_config.authentication(AuthMethod::sql_server(user, password));

        let tcp = TcpStream::connect(tiberius_config.get_addr())
            .await
            .map_err(|e| ConnectorError::Connect(e.to_string()))?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(tiberius_config, tcp.compat_write())
            .await
            .map_err(|e| ConnectorError::Connect(e.to_string()))?;

        Ok(SqlServerConnector { client: Mutex::new(client) })
    }
}

#[async_trait]
impl crate::Connector for SqlServerConnector {
    fn dialect(&self) -> ConnectionType {
        ConnectionType::Sqlserver
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryOutcome, ConnectorError> {
        let mut client = self.client.lock().await;
        let stream = client
            .simple_query(sql)
            .await
            .map_err(|e| ConnectorError::Query(e.to_string()))?;
        let results = stream
            .into_results()
            .await
            .map_err(|e| ConnectorError::Query(e.to_string()))?;

        let mut rows = Vec::new();
        for result_set in results {
            for row in result_set {
                rows.push(decode_row(&row));
            }
        }
        let rows_scanned = Some(rows.len() as i64);
        Ok(QueryOutcome { rows, rows_scanned })
    }

    async fn test_connection(&self) -> Result<(), ConnectorError> {
        let mut client = self.client.lock().await;
        client
            .simple_query("select 1")
            .await
            .map_err(|e| ConnectorError::Connect(e.to_string()))?
            .into_results()
            .await
            .map_err(|e| ConnectorError::Connect(e.to_string()))?;
        Ok(())
    }
}

fn decode_row(row: &tiberius::Row) -> Row {
    let mut out = Row::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let name = col.name().to_string();
        let value = match row.try_get::<i64, _>(idx) {
            Ok(Some(v)) => Value::from(v),
            _ => match row.try_get::<f64, _>(idx) {
                Ok(Some(v)) => Value::from(v),
                _ => match row.try_get::<&str, _>(idx) {
                    Ok(Some(v)) => Value::from(v),
                    _ => Value::Null,
                },
            },
        };
        out.insert(name, value);
    }
    out
}
