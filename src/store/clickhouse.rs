use std::env;

use ::clickhouse::Client;
use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;

use crate::render_plan::CompiledQuery;
use crate::sql_generator;

use super::{EntityStore, Row, StoreError};

fn read_env_var(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Client configured from `CLICKHOUSE_URL`, `CLICKHOUSE_USER`,
/// `CLICKHOUSE_PASSWORD` and `CLICKHOUSE_DATABASE`; `None` if any is unset.
pub fn try_get_client() -> Option<Client> {
    let url = read_env_var("CLICKHOUSE_URL")?;
    let user = read_env_var("CLICKHOUSE_USER")?;
    let password = read_env_var("CLICKHOUSE_PASSWORD")?;
    let database = read_env_var("CLICKHOUSE_DATABASE")?;

    log::info!("Using ClickHouse at {}", url);
    Some(
        Client::default()
            .with_url(url)
            .with_user(user)
            .with_password(password)
            .with_database(database)
            .with_option("join_use_nulls", "1") // Return NULL for unmatched LEFT JOIN columns
            .with_option("output_format_json_quote_64bit_integers", "0"),
    )
}

/// Store backed by ClickHouse; rows are fetched as `JSONEachRow`.
#[derive(Clone)]
pub struct ClickHouseStore {
    client: Client,
}

impl ClickHouseStore {
    pub fn new(client: Client) -> Self {
        ClickHouseStore { client }
    }

    pub fn from_env() -> Option<Self> {
        try_get_client().map(Self::new)
    }
}

#[async_trait]
impl EntityStore for ClickHouseStore {
    async fn execute(&self, query: &CompiledQuery) -> Result<Vec<Row>, StoreError> {
        let sql = sql_generator::generate_sql(query)?;
        log::debug!("Executing SQL:\n{}", sql);

        let mut lines = self
            .client
            .query(&sql)
            .fetch_bytes("JSONEachRow")
            .map_err(|e| {
                log::error!("ClickHouse query failed. SQL was:\n{}\nError: {}", sql, e);
                StoreError::ClickHouse(e.to_string())
            })?
            .lines();

        let mut rows = Vec::new();
        while let Some(line) = lines.next_line().await.map_err(|e| {
            log::error!(
                "ClickHouse response parsing failed. SQL was:\n{}\nError: {}",
                sql,
                e
            );
            StoreError::ClickHouse(e.to_string())
        })? {
            match serde_json::from_str::<Value>(&line) {
                Ok(Value::Object(row)) => rows.push(row),
                Ok(other) => return Err(StoreError::MalformedRow(other.to_string())),
                Err(e) => return Err(StoreError::MalformedRow(e.to_string())),
            }
        }
        Ok(rows)
    }
}
