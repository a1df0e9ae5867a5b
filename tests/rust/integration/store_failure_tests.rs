//! Store failures surface as execution errors on the affected root only.

use std::sync::Arc;

use async_trait::async_trait;
use gqlbridge::executor::QueryExecutor;
use gqlbridge::render_plan::CompiledQuery;
use gqlbridge::store::{EntityStore, Row, StoreError};
use mockall::mock;
use mockall::predicate::function;
use serde_json::json;

use super::common::*;

mock! {
    pub Store {}

    #[async_trait]
    impl EntityStore for Store {
        async fn execute(&self, query: &CompiledQuery) -> Result<Vec<Row>, StoreError>;
    }
}

#[tokio::test]
async fn test_store_failure_surfaces_once_without_retry() {
    let mut store = MockStore::new();
    store
        .expect_execute()
        .times(1)
        .returning(|_| Err(StoreError::ClickHouse("Code: 241. Memory limit exceeded".to_string())));
    let executor = QueryExecutor::new(payload_schema(), Arc::new(store));

    let result = run(&executor, "{ JsonEntities { select { id } } }").await;

    assert_eq!(result.data.as_ref().unwrap()["JsonEntities"], json!(null));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].classification, "ExecutionAborted");
    assert!(result.errors[0].message.contains("Memory limit exceeded"));
}

#[tokio::test]
async fn test_failure_on_one_root_keeps_the_other() {
    let mut store = MockStore::new();
    store
        .expect_execute()
        .with(function(|q: &CompiledQuery| q.root_entity == "TaskVariable"))
        .returning(|_| Err(StoreError::ClickHouse("timeout".to_string())));
    store
        .expect_execute()
        .with(function(|q: &CompiledQuery| q.root_entity == "JsonEntity"))
        .returning(|_| {
            let mut row = Row::new();
            row.insert("id".to_string(), json!(7));
            Ok(vec![row])
        });
    let executor = QueryExecutor::new(payload_schema(), Arc::new(store));

    let result = run(
        &executor,
        "{ JsonEntities { select { id } } TaskVariables { select { id } } }",
    )
    .await;

    let data = result.data.as_ref().unwrap();
    assert_eq!(data["JsonEntities"], json!({"select": [{"id": 7}]}));
    assert_eq!(data["TaskVariables"], json!(null));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, vec!["TaskVariables".to_string()]);
}

#[tokio::test]
async fn test_compile_errors_never_reach_the_store() {
    let mut store = MockStore::new();
    store.expect_execute().never();
    let executor = QueryExecutor::new(payload_schema(), Arc::new(store));

    let result = run(
        &executor,
        r#"{ JsonEntities(where: {attributes: {STARTS_WITH: "x"}}) { select { id } } }"#,
    )
    .await;
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].classification, "ValidationError");
}

#[tokio::test]
async fn test_parse_error_returns_no_data() {
    let mut store = MockStore::new();
    store.expect_execute().never();
    let executor = QueryExecutor::new(payload_schema(), Arc::new(store));

    let result = run(&executor, "{ JsonEntities(where: {attributes: }) { select { id } } }").await;
    assert!(result.data.is_none());
    assert_eq!(result.errors[0].classification, "InvalidSyntax");
}
