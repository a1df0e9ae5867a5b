//! `where` argument parsing into filter trees

use gqlbridge::graphql_parser::parse_document;
use gqlbridge::query_planner::{CompileError, FilterNode, InputValue, Variables};
use serde_json::json;

fn filter(document: &str, variables: &Variables) -> Result<FilterNode, CompileError> {
    let doc = parse_document(document).unwrap();
    let where_arg = doc.operation.selection_set[0].argument("where").unwrap();
    FilterNode::from_where(where_arg, variables).map(|node| node.unwrap())
}

fn paths(node: &FilterNode) -> Vec<String> {
    node.leaves()
        .iter()
        .map(|leaf| format!("{}:{}", leaf.path.join("."), leaf.operator))
        .collect()
}

#[test]
fn test_sibling_fields_form_a_conjunction() {
    let node = filter(
        r#"{ Books(where: {title: {EQ: "Dune"}, year: {GT: 1960, LT: 1970}}) { select { id } } }"#,
        &Variables::new(),
    )
    .unwrap();
    assert!(matches!(node, FilterNode::And(_)));
    assert_eq!(paths(&node), vec!["title:EQ", "year:GT", "year:LT"]);
}

#[test]
fn test_nested_association_paths() {
    let node = filter(
        r#"{ Books(where: {author: {profile: {LOCATE: "born"}}}) { select { id } } }"#,
        &Variables::new(),
    )
    .unwrap();
    assert_eq!(paths(&node), vec!["author.profile:LOCATE"]);
}

#[test]
fn test_or_groupings_nest() {
    let node = filter(
        r#"{ Books(where: {OR: [{title: {EQ: "a"}}, {AND: [{year: {EQ: 1}}, {NOT: {year: {EQ: 2}}}]}]}) {
              select { id }
           } }"#,
        &Variables::new(),
    )
    .unwrap();
    let FilterNode::Or(children) = &node else {
        panic!("expected OR, got {:?}", node);
    };
    assert_eq!(children.len(), 2);
    assert!(matches!(&children[1], FilterNode::And(inner) if matches!(inner[1], FilterNode::Not(_))));
    assert_eq!(paths(&node), vec!["title:EQ", "year:EQ", "year:EQ"]);
}

#[test]
fn test_variable_operands_stay_symbolic() {
    let node = filter(
        r#"query($v: VariableValue) { P(where: {value: {LOCATE: $v}}) { select { id } } }"#,
        &Variables::new(),
    )
    .unwrap();
    let leaves = node.leaves();
    assert_eq!(leaves[0].value, InputValue::Variable("v".to_string()));
    assert!(leaves[0].value.has_variables());
}

#[test]
fn test_where_given_as_variable() {
    let mut variables = Variables::new();
    variables.insert("criteria".to_string(), json!({"title": {"EQ": "Dune"}}));
    let node = filter(
        "query($criteria: BooksCriteriaExpression) { Books(where: $criteria) { select { id } } }",
        &variables,
    )
    .unwrap();
    assert_eq!(paths(&node), vec!["title:EQ"]);

    let unbound = filter(
        "query($criteria: BooksCriteriaExpression) { Books(where: $criteria) { select { id } } }",
        &Variables::new(),
    );
    assert_eq!(unbound.unwrap_err(), CompileError::UnboundVariable("criteria".to_string()));
}

#[test]
fn test_empty_criteria_never_match_everything() {
    let unknown_field = filter(
        r#"{ JsonEntities(where: {nickname: {}, attributes: {LOCATE: "key"}}) { select { id } } }"#,
        &Variables::new(),
    );
    assert!(matches!(
        unknown_field,
        Err(CompileError::InvalidValue { ref field, .. }) if field == "nickname"
    ));

    for document in [
        "{ Books(where: {AND: []}) { select { id } } }",
        "{ Books(where: {OR: []}) { select { id } } }",
        "{ Books(where: {NOT: {}}) { select { id } } }",
    ] {
        assert!(filter(document, &Variables::new()).is_err(), "{}", document);
    }
}

#[test]
fn test_empty_where_is_no_filter() {
    let doc = parse_document("{ Books(where: {}) { select { id } } }").unwrap();
    let where_arg = doc.operation.selection_set[0].argument("where").unwrap();
    assert_eq!(FilterNode::from_where(where_arg, &Variables::new()), Ok(None));
}
