//! Shared fixtures: the payload model (JSON attributes, task and process
//! variables) and a small library model with associations.

use std::sync::Arc;

use gqlbridge::entity_catalog::{EntityDescriptor, EntityModelConfig};
use gqlbridge::executor::{ExecutionResult, QueryExecutor};
use gqlbridge::query_planner::Variables;
use gqlbridge::query_schema::QuerySchema;
use gqlbridge::scalars::{ScalarBinding, ScalarRegistry};
use gqlbridge::store::MemoryStore;
use serde_json::{json, Value};

pub fn payload_registry() -> ScalarRegistry {
    let mut registry = ScalarRegistry::new();
    registry.register(
        "JsonNode",
        ScalarBinding::opaque("Json", "Json type").with_containment(),
    );
    registry.register(
        "VariableValue",
        ScalarBinding::opaque("VariableValue", "VariableValue type"),
    );
    registry
}

pub fn payload_schema() -> Arc<QuerySchema> {
    let json_entity = EntityDescriptor::new("JsonEntity", "json_entity")
        .id("id", "Long")
        .scalar("firstName", "String")
        .scalar("lastName", "String")
        .scalar("attributes", "JsonNode");
    let task_variable = EntityDescriptor::new("TaskVariable", "task_variable")
        .id("id", "Long")
        .scalar("name", "String")
        .scalar("value", "VariableValue");
    let process_variable = EntityDescriptor::new("ProcessVariable", "process_variable")
        .id("id", "Long")
        .scalar("name", "String")
        .scalar("value", "VariableValue");

    Arc::new(
        QuerySchema::build(
            "HashMapSchema",
            vec![json_entity, task_variable, process_variable],
            payload_registry(),
        )
        .unwrap(),
    )
}

pub fn payload_executor() -> QueryExecutor {
    let schema = payload_schema();
    let store = MemoryStore::new();
    let seed = [
        (
            "JsonEntity",
            json!({"id": 1, "firstName": "john", "lastName": "doe",
                   "attributes": {"attr": {"key": ["1", "2", "3", "4", "5"]}}}),
        ),
        (
            "JsonEntity",
            json!({"id": 2, "firstName": "joe", "lastName": "smith",
                   "attributes": {"attr": ["1", "2", "3", "4", "5"]}}),
        ),
        ("TaskVariable", json!({"id": 1, "name": "variable1", "value": false})),
        ("TaskVariable", json!({"id": 2, "name": "variable2", "value": true})),
        ("TaskVariable", json!({"id": 3, "name": "variable3", "value": "not set"})),
        (
            "ProcessVariable",
            json!({"id": 1, "name": "document", "value": {"key": ["1", "2", "3", "4", "5"]}}),
        ),
        ("ProcessVariable", json!({"id": 2, "name": "counter", "value": 42})),
    ];
    for (entity, object) in seed {
        store.insert_entity(&schema, entity, &object).unwrap();
    }
    QueryExecutor::new(schema, Arc::new(store))
}

pub const LIBRARY_MODEL: &str = r#"
database: library
entities:
  - name: Author
    table: author
    id: id
    fields:
      - { name: id, type: Long }
      - { name: name, type: String }
      - { name: profile, type: JsonNode }
    associations:
      - { name: books, target: Book, kind: many, mapped_by: author_id }
  - name: Book
    table: book
    id: id
    fields:
      - { name: id, type: Long }
      - { name: title, type: String }
      - { name: year, type: Int }
    associations:
      - { name: author, target: Author, kind: one, join_column: author_id }
"#;

pub fn library_schema() -> Arc<QuerySchema> {
    let model = EntityModelConfig::from_yaml_str(LIBRARY_MODEL).unwrap();
    Arc::new(
        QuerySchema::build("library", model.to_descriptors().unwrap(), payload_registry()).unwrap(),
    )
}

pub fn library_executor() -> QueryExecutor {
    let schema = library_schema();
    let store = MemoryStore::new();
    store
        .insert_entity(&schema, "Author", &json!({"id": 1, "name": "Le Guin", "profile": {"born": 1929}}))
        .unwrap();
    store
        .insert_entity(&schema, "Author", &json!({"id": 2, "name": "Banks", "profile": null}))
        .unwrap();
    store
        .insert_entity(&schema, "Author", &json!({"id": 3, "name": "Herbert"}))
        .unwrap();
    // author_id is a join column with no field of its own
    for (id, title, year, author) in [
        (10, "The Dispossessed", 1974, Some(1)),
        (11, "The Lathe of Heaven", 1971, Some(1)),
        (12, "Consider Phlebas", 1987, Some(2)),
        (13, "Anonymous Pamphlet", 1901, None),
    ] {
        let mut row = serde_json::Map::new();
        row.insert("id".to_string(), json!(id));
        row.insert("title".to_string(), json!(title));
        row.insert("year".to_string(), json!(year));
        row.insert("author_id".to_string(), json!(author));
        store.insert_row("library.book", row);
    }
    QueryExecutor::new(schema, Arc::new(store))
}

pub async fn run(executor: &QueryExecutor, document: &str) -> ExecutionResult {
    executor.execute(document, &Variables::new()).await
}

pub async fn run_with(executor: &QueryExecutor, document: &str, variables: Value) -> ExecutionResult {
    let variables: Variables = serde_json::from_value(variables).unwrap();
    executor.execute(document, &variables).await
}

pub fn data(result: &ExecutionResult) -> Value {
    assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
    Value::Object(result.data.clone().unwrap())
}

pub fn ids(result: &ExecutionResult, root: &str) -> Vec<i64> {
    result
        .selected(root)
        .unwrap_or_else(|| panic!("no select list under {}: {:?}", root, result))
        .iter()
        .map(|o| o["id"].as_i64().unwrap())
        .collect()
}
