use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::ExecutionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionErrorEntry {
    pub message: String,
    /// Response keys leading to the failed field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    pub classification: String,
}

impl ExecutionErrorEntry {
    pub fn new(error: &ExecutionError, path: Vec<String>) -> Self {
        ExecutionErrorEntry {
            message: error.to_string(),
            path,
            classification: error.classification().to_string(),
        }
    }
}

/// `{data, errors}` as returned to the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ExecutionErrorEntry>,
}

impl ExecutionResult {
    /// A request that failed before any root field ran.
    pub fn from_error(error: ExecutionError) -> Self {
        ExecutionResult {
            data: None,
            errors: vec![ExecutionErrorEntry::new(&error, Vec::new())],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The `select` list under a root response key, if present.
    pub fn selected(&self, root: &str) -> Option<&Vec<Value>> {
        self.data
            .as_ref()?
            .get(root)?
            .as_object()?
            .values()
            .next()?
            .as_array()
    }
}
