//! Query Executor: parse, plan, execute and reshape one query document.
//!
//! Every failure is reported through [`ExecutionResult::errors`]; a failing
//! root field yields `null` under its key while other roots still run.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::graphql_parser::ast::Field;
use crate::graphql_parser::parse_document;
use crate::query_planner::{bind_variables, plan_root_field, CompileError, Variables};
use crate::query_schema::QuerySchema;
use crate::store::EntityStore;

pub mod errors;
pub mod reshape;
pub mod result;

pub use errors::ExecutionError;
pub use result::{ExecutionErrorEntry, ExecutionResult};

#[derive(Clone)]
pub struct QueryExecutor {
    schema: Arc<QuerySchema>,
    store: Arc<dyn EntityStore>,
    max_result_rows: Option<u64>,
}

impl QueryExecutor {
    pub fn new(schema: Arc<QuerySchema>, store: Arc<dyn EntityStore>) -> Self {
        QueryExecutor {
            schema,
            store,
            max_result_rows: None,
        }
    }

    /// Cap on joined rows per root field. A root whose result would exceed it
    /// fails instead of returning truncated collections.
    pub fn with_max_result_rows(mut self, limit: u64) -> Self {
        self.max_result_rows = Some(limit);
        self
    }

    pub fn schema(&self) -> &QuerySchema {
        &self.schema
    }

    pub async fn execute(&self, document: &str, variables: &Variables) -> ExecutionResult {
        self.execute_operation(document, None, variables).await
    }

    /// Like [`execute`](Self::execute), additionally checking the document's
    /// operation against the name a client asked for.
    pub async fn execute_operation(
        &self,
        document: &str,
        operation_name: Option<&str>,
        variables: &Variables,
    ) -> ExecutionResult {
        let parsed = match parse_document(document) {
            Ok(parsed) => parsed,
            Err(e) => {
                let message = e.describe(document);
                log::debug!("Rejected query document: {}", message);
                return ExecutionResult::from_error(ExecutionError::QueryParse(message));
            }
        };
        let operation = &parsed.operation;
        if let Some(requested) = operation_name {
            if operation.name != Some(requested) {
                return ExecutionResult::from_error(ExecutionError::UnknownOperation(
                    requested.to_string(),
                ));
            }
        }
        let variables = bind_variables(&operation.variable_definitions, variables);

        let mut data = Map::new();
        let mut errors = Vec::new();

        for field in &operation.selection_set {
            let key = field.response_key().to_string();
            if data.contains_key(&key) {
                let error = ExecutionError::from(CompileError::DuplicateResponseKey(key.clone()));
                errors.push(ExecutionErrorEntry::new(&error, vec![key]));
                continue;
            }

            match self.execute_root(field, &variables).await {
                Ok(value) => {
                    data.insert(key, value);
                }
                Err(e) => {
                    match &e {
                        ExecutionError::StoreExecution(_) => {
                            log::error!("Root '{}' failed: {}", key, e)
                        }
                        _ => log::debug!("Root '{}' rejected: {}", key, e),
                    }
                    errors.push(ExecutionErrorEntry::new(&e, vec![key.clone()]));
                    data.insert(key, Value::Null);
                }
            }
        }

        ExecutionResult {
            data: Some(data),
            errors,
        }
    }

    async fn execute_root(
        &self,
        field: &Field<'_>,
        variables: &Variables,
    ) -> Result<Value, ExecutionError> {
        let mut planned = plan_root_field(&self.schema, field, variables)?;
        // one row past the cap tells a complete result from a truncated one
        planned.compiled.limit = self.max_result_rows.map(|limit| limit.saturating_add(1));

        let rows = self.store.execute(&planned.compiled).await?;
        log::debug!(
            "Root '{}' fetched {} rows",
            planned.selection.response_key,
            rows.len()
        );
        if let Some(limit) = self.max_result_rows {
            if rows.len() as u64 > limit {
                return Err(ExecutionError::RowLimitExceeded { limit });
            }
        }

        let objects = reshape::reshape_rows(self.schema.registry(), &planned.selection.node, &rows)?;

        let mut wrapper = Map::new();
        wrapper.insert(planned.selection.select_key, Value::Array(objects));
        Ok(Value::Object(wrapper))
    }
}
