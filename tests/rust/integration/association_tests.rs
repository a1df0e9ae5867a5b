//! Nested selections and filters across to-one and to-many associations.

use serde_json::json;

use super::common::*;

#[tokio::test]
async fn test_to_many_selection_nests_collections() {
    let executor = library_executor();
    let result = run(
        &executor,
        r#"{ Authors {
              select {
                name
                books { title(orderBy: ASC) }
              }
           } }"#,
    )
    .await;

    // ordering by the nested title sorts the joined rows; authors keep first-seen order
    assert_eq!(
        data(&result),
        json!({"Authors": {"select": [
            {"name": "Banks", "books": [{"title": "Consider Phlebas"}]},
            {"name": "Le Guin", "books": [
                {"title": "The Dispossessed"},
                {"title": "The Lathe of Heaven"}
            ]},
            {"name": "Herbert", "books": []}
        ]}})
    );
}

#[tokio::test]
async fn test_to_one_selection_is_null_when_absent() {
    let executor = library_executor();
    let result = run(
        &executor,
        r#"{ Books { select { id(orderBy: ASC) author { name } } } }"#,
    )
    .await;
    assert_eq!(
        data(&result),
        json!({"Books": {"select": [
            {"id": 10, "author": {"name": "Le Guin"}},
            {"id": 11, "author": {"name": "Le Guin"}},
            {"id": 12, "author": {"name": "Banks"}},
            {"id": 13, "author": null}
        ]}})
    );
}

#[tokio::test]
async fn test_filter_through_to_one_association() {
    let executor = library_executor();
    let result = run(
        &executor,
        r#"{ Books(where: {author: {name: {EQ: "Le Guin"}}}) { select { id title } } }"#,
    )
    .await;
    assert_eq!(ids(&result, "Books"), vec![10, 11]);
}

#[tokio::test]
async fn test_filter_through_to_many_association() {
    let executor = library_executor();
    let result = run(
        &executor,
        r#"{ Authors(where: {books: {year: {GT: 1980}}}) { select { id name } } }"#,
    )
    .await;
    assert_eq!(
        data(&result),
        json!({"Authors": {"select": [{"id": 2, "name": "Banks"}]}})
    );
}

#[tokio::test]
async fn test_filter_and_selection_share_the_join() {
    let executor = library_executor();
    let result = run(
        &executor,
        r#"{ Authors(where: {books: {year: {LT: 1972}}}) {
              select { name books { title } }
           } }"#,
    )
    .await;
    assert_eq!(
        data(&result),
        json!({"Authors": {"select": [
            {"name": "Le Guin", "books": [{"title": "The Lathe of Heaven"}]}
        ]}})
    );
}

#[tokio::test]
async fn test_null_checks_and_membership() {
    let executor = library_executor();
    let no_profile = run(
        &executor,
        "{ Authors(where: {profile: {IS_NULL: true}}) { select { id } } }",
    )
    .await;
    assert_eq!(ids(&no_profile, "Authors"), vec![2, 3]);

    let chosen = run(
        &executor,
        "{ Books(where: {id: {IN: [10, 13]}, title: {LIKE: \"The%\"}}) { select { id } } }",
    )
    .await;
    assert_eq!(ids(&chosen, "Books"), vec![10]);
}

#[tokio::test]
async fn test_not_negates_a_subtree() {
    let executor = library_executor();
    let result = run(
        &executor,
        r#"{ Books(where: {NOT: {author: {name: {EQ: "Le Guin"}}}}) { select { id } } }"#,
    )
    .await;
    // an unmatched author compares as NULL, so NOT keeps it out too
    assert_eq!(ids(&result, "Books"), vec![12]);
}

#[tokio::test]
async fn test_aliases_and_multiple_roots() {
    let executor = library_executor();
    let result = run(
        &executor,
        r#"query Shelf {
          recent: Books(where: {year: {GE: 1980}}) { rows: select { heading: title } }
          Authors(where: {name: {EQ: "Herbert"}}) { select { id } }
        }"#,
    )
    .await;
    assert_eq!(
        data(&result),
        json!({
            "recent": {"rows": [{"heading": "Consider Phlebas"}]},
            "Authors": {"select": [{"id": 3}]}
        })
    );
}

#[tokio::test]
async fn test_variable_default_applies() {
    let executor = library_executor();
    let document = r#"query($year: Int = 1974) {
        Books(where: {year: {EQ: $year}}) { select { id } }
    }"#;

    let defaulted = run(&executor, document).await;
    assert_eq!(ids(&defaulted, "Books"), vec![10]);

    let supplied = run_with(&executor, document, json!({"year": 1987})).await;
    assert_eq!(ids(&supplied, "Books"), vec![12]);
}

#[tokio::test]
async fn test_schema_sdl_lists_roots_and_criteria() {
    let schema = library_schema();
    let sdl = schema.to_sdl();
    assert!(sdl.contains("Authors(where: AuthorsCriteriaExpression): Authors"));
    assert!(sdl.contains("Books(where: BooksCriteriaExpression): Books"));
    assert!(sdl.contains("scalar Json"));
}

#[tokio::test]
async fn test_row_cap_never_truncates_collections() {
    let document = r#"{ Authors { select { name books { title } } } }"#;

    // four joined rows: two for Le Guin, one each for Banks and Herbert
    let capped = library_executor().with_max_result_rows(1);
    let result = run(&capped, document).await;
    assert_eq!(result.data.as_ref().unwrap()["Authors"], json!(null));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].classification, "ExecutionAborted");
    assert_eq!(result.errors[0].path, vec!["Authors".to_string()]);

    let exact = library_executor().with_max_result_rows(4);
    let result = run(&exact, document).await;
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let authors = result.selected("Authors").unwrap();
    let le_guin = authors.iter().find(|a| a["name"] == "Le Guin").unwrap();
    assert_eq!(le_guin["books"].as_array().unwrap().len(), 2);
}
