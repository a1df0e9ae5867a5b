use thiserror::Error;

use crate::query_planner::CompileError;
use crate::store::StoreError;

/// Failure of one request (or one root field of it). Never fatal to the process.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExecutionError {
    #[error("Query parse error: {0}")]
    QueryParse(String),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("Store execution failed: {0}")]
    StoreExecution(#[from] StoreError),
    #[error("Cannot decode value of '{field}': {message}")]
    Decode { field: String, message: String },
    #[error("Unknown operation named '{0}'")]
    UnknownOperation(String),
    #[error("Result exceeds the limit of {limit} rows; narrow the filter")]
    RowLimitExceeded { limit: u64 },
}

impl ExecutionError {
    pub fn classification(&self) -> &'static str {
        match self {
            ExecutionError::QueryParse(_) => "InvalidSyntax",
            ExecutionError::Compile(_) | ExecutionError::UnknownOperation(_) => "ValidationError",
            ExecutionError::StoreExecution(_) | ExecutionError::RowLimitExceeded { .. } => {
                "ExecutionAborted"
            }
            ExecutionError::Decode { .. } => "DataFetchingException",
        }
    }
}
