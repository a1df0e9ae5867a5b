use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    /// Variable values keyed by name, without the `$`
    #[serde(default)]
    pub variables: Option<HashMap<String, Value>>,
    /// Must name the document's operation when given
    #[serde(default)]
    pub operation_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub schema: String,
    pub roots: Vec<String>,
}
