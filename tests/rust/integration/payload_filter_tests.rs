//! Filters over opaque payload fields: JSON attributes and dynamically typed
//! variable values persisted as JSON text.

use serde_json::json;

use super::common::*;

#[tokio::test]
async fn test_select_all_json_entities() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"query {
          JsonEntities {
            select {
              id
              firstName
              lastName
              attributes
            }
          }
        }"#,
    )
    .await;

    assert_eq!(
        data(&result),
        json!({"JsonEntities": {"select": [
            {"id": 1, "firstName": "john", "lastName": "doe",
             "attributes": {"attr": {"key": ["1", "2", "3", "4", "5"]}}},
            {"id": 2, "firstName": "joe", "lastName": "smith",
             "attributes": {"attr": ["1", "2", "3", "4", "5"]}}
        ]}})
    );
}

#[tokio::test]
async fn test_locate_on_json_attributes() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"query {
          JsonEntities(where: {attributes: {LOCATE: "key"}}) {
            select { id firstName lastName attributes }
          }
        }"#,
    )
    .await;

    assert_eq!(
        data(&result),
        json!({"JsonEntities": {"select": [
            {"id": 1, "firstName": "john", "lastName": "doe",
             "attributes": {"attr": {"key": ["1", "2", "3", "4", "5"]}}}
        ]}})
    );
}

#[tokio::test]
async fn test_locate_absent_needle_returns_nothing() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"{ JsonEntities(where: {attributes: {LOCATE: "missing"}}) { select { id } } }"#,
    )
    .await;
    assert_eq!(data(&result), json!({"JsonEntities": {"select": []}}));
}

#[tokio::test]
async fn test_locate_on_task_variable_literal() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"query {
          TaskVariables(where: {value: {LOCATE: "true"}}) {
            select { id name value }
          }
        }"#,
    )
    .await;
    assert_eq!(
        data(&result),
        json!({"TaskVariables": {"select": [{"id": 2, "name": "variable2", "value": true}]}})
    );
}

#[tokio::test]
async fn test_locate_on_task_variable_bound_variable() {
    let executor = payload_executor();
    let result = run_with(
        &executor,
        r#"query($value: VariableValue!) {
          TaskVariables(where: {value: {LOCATE: $value }}) {
            select { id name value }
          }
        }"#,
        json!({"value": true}),
    )
    .await;
    assert_eq!(
        data(&result),
        json!({"TaskVariables": {"select": [{"id": 2, "name": "variable2", "value": true}]}})
    );
}

#[tokio::test]
async fn test_locate_json_array_needle_as_variable() {
    let executor = payload_executor();
    let result = run_with(
        &executor,
        r#"query($value: VariableValue!) {
          ProcessVariables(where: {value: {LOCATE: $value}}) {
            select { id name value }
          }
        }"#,
        json!({"value": "[\"1\",\"2\",\"3\",\"4\",\"5\"]"}),
    )
    .await;
    assert_eq!(
        data(&result),
        json!({"ProcessVariables": {"select": [
            {"id": 1, "name": "document", "value": {"key": ["1", "2", "3", "4", "5"]}}
        ]}})
    );
}

#[tokio::test]
async fn test_locate_json_array_needle_as_literal() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"query {
          ProcessVariables(where: {value: {LOCATE: "[\"1\",\"2\",\"3\",\"4\",\"5\"]"}}) {
            select { id name value }
          }
        }"#,
    )
    .await;
    assert_eq!(
        data(&result),
        json!({"ProcessVariables": {"select": [
            {"id": 1, "name": "document", "value": {"key": ["1", "2", "3", "4", "5"]}}
        ]}})
    );
}

#[tokio::test]
async fn test_containment_matches_exact_five_element_list() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"{ JsonEntities(where: {attributes: {CONTAINS: {attr: ["1", "2", "3", "4", "5"]}}}) {
              select { id }
           } }"#,
    )
    .await;
    assert_eq!(ids(&result, "JsonEntities"), vec![2]);

    let differs_by_one = run(
        &executor,
        r#"{ JsonEntities(where: {attributes: {CONTAINS: {attr: ["1", "2", "3", "4"]}}}) {
              select { id }
           } }"#,
    )
    .await;
    assert_eq!(ids(&differs_by_one, "JsonEntities"), Vec::<i64>::new());
}

#[tokio::test]
async fn test_containment_variable_matches_literal() {
    let executor = payload_executor();
    let result = run_with(
        &executor,
        r#"query($doc: Json) { JsonEntities(where: {attributes: {CONTAINS: $doc}}) {
              select { id }
           } }"#,
        json!({"doc": {"attr": ["1", "2", "3", "4", "5"]}}),
    )
    .await;
    assert_eq!(ids(&result, "JsonEntities"), vec![2]);
}

#[tokio::test]
async fn test_variable_and_literal_filters_agree() {
    let executor = payload_executor();
    let cases = [
        (json!("variable2"), r#""variable2""#),
        (json!("variable"), r#""variable""#),
    ];
    for (value, literal) in cases {
        let by_variable = run_with(
            &executor,
            r#"query($n: String) { TaskVariables(where: {name: {LOCATE: $n}}) { select { id } } }"#,
            json!({"n": value}),
        )
        .await;
        let by_literal = run(
            &executor,
            &format!(
                "{{ TaskVariables(where: {{name: {{LOCATE: {}}}}}) {{ select {{ id }} }} }}",
                literal
            ),
        )
        .await;
        assert_eq!(data(&by_variable), data(&by_literal));
    }
}

#[tokio::test]
async fn test_opaque_equality_compares_encoded_values() {
    let executor = payload_executor();
    let boolean = run(
        &executor,
        "{ TaskVariables(where: {value: {EQ: true}}) { select { id } } }",
    )
    .await;
    assert_eq!(ids(&boolean, "TaskVariables"), vec![2]);

    // the string "true" is a different payload than the boolean
    let text = run(
        &executor,
        r#"{ TaskVariables(where: {value: {EQ: "true"}}) { select { id } } }"#,
    )
    .await;
    assert_eq!(ids(&text, "TaskVariables"), Vec::<i64>::new());

    let number = run(
        &executor,
        "{ ProcessVariables(where: {value: {EQ: 42}}) { select { id name } } }",
    )
    .await;
    assert_eq!(
        data(&number),
        json!({"ProcessVariables": {"select": [{"id": 2, "name": "counter"}]}})
    );
}

#[tokio::test]
async fn test_unknown_field_fails_compilation() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"{ JsonEntities(where: {nickname: {EQ: "jd"}}) { select { id } } }"#,
    )
    .await;
    assert_eq!(result.data.as_ref().unwrap()["JsonEntities"], json!(null));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].classification, "ValidationError");
    assert!(result.errors[0].message.contains("nickname"));
}

#[tokio::test]
async fn test_empty_criteria_do_not_match_all_rows() {
    let executor = payload_executor();
    for document in [
        r#"{ JsonEntities(where: {nickname: {}}) { select { id } } }"#,
        r#"{ JsonEntities(where: {nickname: {}, attributes: {LOCATE: "key"}}) { select { id } } }"#,
        r#"{ JsonEntities(where: {OR: []}) { select { id } } }"#,
    ] {
        let result = run(&executor, document).await;
        assert_eq!(result.data.as_ref().unwrap()["JsonEntities"], json!(null), "{}", document);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].classification, "ValidationError");
    }
}

#[tokio::test]
async fn test_unbound_variable_fails_compilation() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"query($value: VariableValue!) {
          TaskVariables(where: {value: {LOCATE: $value}}) { select { id } }
        }"#,
    )
    .await;
    assert_eq!(result.data.as_ref().unwrap()["TaskVariables"], json!(null));
    assert_eq!(result.errors[0].message, "Variable '$value' is not defined");
    assert_eq!(result.errors[0].path, vec!["TaskVariables".to_string()]);
}

#[tokio::test]
async fn test_unsupported_operator_names_the_scalar() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"{ TaskVariables(where: {value: {GT: 1}}) { select { id } } }"#,
    )
    .await;
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("GT"));
    assert!(result.errors[0].message.contains("VariableValue"));
}

#[tokio::test]
async fn test_or_grouping_of_payload_filters() {
    let executor = payload_executor();
    let result = run(
        &executor,
        r#"{ TaskVariables(where: {OR: [{value: {LOCATE: "true"}}, {name: {EQ: "variable3"}}]}) {
              select { id(orderBy: DESC) }
           } }"#,
    )
    .await;
    assert_eq!(ids(&result, "TaskVariables"), vec![3, 2]);
}
