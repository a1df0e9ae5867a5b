//! Entity Store collaborator: executes a compiled query and returns flat rows
//! keyed by the query's select aliases.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::render_plan::CompiledQuery;
use crate::sql_generator::ParameterSubstitutionError;

pub mod clickhouse;
pub mod memory;

pub use self::clickhouse::ClickHouseStore;
pub use self::memory::MemoryStore;

/// One result row: select alias to stored value
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Clickhouse Error: {0}")]
    ClickHouse(String),
    #[error("SQL generation failed: {0}")]
    SqlGeneration(#[from] ParameterSubstitutionError),
    #[error("Store returned a malformed row: {0}")]
    MalformedRow(String),
    #[error("Unknown table '{0}'")]
    UnknownTable(String),
    #[error("Cannot evaluate query: {0}")]
    Evaluation(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Run the query once; no retries.
    async fn execute(&self, query: &CompiledQuery) -> Result<Vec<Row>, StoreError>;
}
