//! Query documents planned and rendered as ClickHouse SQL

use gqlbridge::entity_catalog::EntityDescriptor;
use gqlbridge::graphql_parser::parse_document;
use gqlbridge::query_planner::{plan_root_field, Variables};
use gqlbridge::query_schema::QuerySchema;
use gqlbridge::scalars::{ScalarBinding, ScalarRegistry};
use gqlbridge::sql_generator::generate_sql;
use serde_json::json;

fn schema() -> QuerySchema {
    let mut registry = ScalarRegistry::new();
    registry.register("JsonNode", ScalarBinding::opaque("Json", "Json type").with_containment());
    registry.register("VariableValue", ScalarBinding::opaque("VariableValue", "VariableValue type"));

    let json_entity = EntityDescriptor::new("JsonEntity", "json_entity")
        .id("id", "Long")
        .scalar("firstName", "String")
        .scalar("attributes", "JsonNode");
    let task_variable = EntityDescriptor::new("TaskVariable", "task_variable")
        .id("id", "Long")
        .scalar("value", "VariableValue")
        .to_one("task", "Task", "task_id");
    let task = EntityDescriptor::new("Task", "task")
        .id("id", "Long")
        .scalar("name", "String")
        .to_many("variables", "TaskVariable", "task_id");
    QuerySchema::build("sql", vec![json_entity, task_variable, task], registry).unwrap()
}

fn sql_for(document: &str, variables: Variables) -> String {
    let schema = schema();
    let doc = parse_document(document).unwrap();
    let planned = plan_root_field(&schema, &doc.operation.selection_set[0], &variables).unwrap();
    generate_sql(&planned.compiled).unwrap()
}

#[test]
fn test_locate_renders_position_over_text_cast() {
    let sql = sql_for(
        r#"{ JsonEntities(where: {attributes: {LOCATE: "key"}}) { select { id firstName } } }"#,
        Variables::new(),
    );
    assert!(sql.contains("FROM json_entity AS t0"));
    assert!(sql.contains("WHERE position(toString(t0.attributes), 'key') > 0"));
    assert!(!sql.contains("LIKE"));
}

#[test]
fn test_opaque_equality_compares_encoded_text() {
    let sql = sql_for(
        "query($v: VariableValue) { TaskVariables(where: {value: {EQ: $v}}) { select { id } } }",
        Variables::from([("v".to_string(), json!(true))]),
    );
    assert!(sql.contains("WHERE toString(t0.value) = 'true'"), "{}", sql);
}

#[test]
fn test_containment_renders_structural_equality() {
    let sql = sql_for(
        r#"{ JsonEntities(where: {attributes: {CONTAINS: {attr: ["1", "2"]}}}) { select { id } } }"#,
        Variables::new(),
    );
    assert!(
        sql.contains(r#"JSONExtractRaw(toString(t0.attributes)) = JSONExtractRaw('{"attr":["1","2"]}')"#),
        "{}",
        sql
    );
}

#[test]
fn test_association_filter_joins_once() {
    let sql = sql_for(
        r#"{ TaskVariables(where: {task: {name: {EQ: "review"}}}) {
              select { id task { name } }
           } }"#,
        Variables::new(),
    );
    assert_eq!(sql.matches("LEFT JOIN").count(), 1);
    assert!(sql.contains("LEFT JOIN task AS t1 ON t0.task_id = t1.id"));
    assert!(sql.contains("t1.name AS \"task.name\""));
    assert!(sql.contains("WHERE t1.name = 'review'"));
}

#[test]
fn test_to_many_join_uses_mapped_by_column() {
    let sql = sql_for(
        "{ Tasks { select { name variables { id } } } }",
        Variables::new(),
    );
    assert!(sql.contains("LEFT JOIN task_variable AS t1 ON t1.task_id = t0.id"));
    assert!(sql.contains("t1.id AS \"variables.id\""));
    assert!(sql.contains("t0.id AS \"id\""));
}
