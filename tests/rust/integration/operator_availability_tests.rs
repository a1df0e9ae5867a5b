//! Operators offered per field are derived from the field's scalar binding.

use gqlbridge::scalars::FilterOperator;
use test_case::test_case;

use super::common::*;

fn offers(entity: &str, field: &str, operator: &str) -> bool {
    let schema = library_schema();
    let op = FilterOperator::parse(operator).unwrap();
    schema
        .entity(entity)
        .and_then(|e| e.field(field))
        .map(|f| f.operators().contains(&op))
        .unwrap()
}

#[test_case("Book", "title", "EQ", true; "string equality")]
#[test_case("Book", "title", "LIKE", true; "string pattern")]
#[test_case("Book", "title", "LOCATE", true; "string locate")]
#[test_case("Book", "title", "CONTAINS", false; "string has no containment")]
#[test_case("Book", "year", "GT", true; "int ordering")]
#[test_case("Book", "year", "IN", true; "int membership")]
#[test_case("Book", "year", "LIKE", false; "int has no pattern")]
#[test_case("Book", "year", "LOCATE", false; "int has no locate")]
#[test_case("Author", "profile", "EQ", true; "json equality")]
#[test_case("Author", "profile", "LOCATE", true; "json locate")]
#[test_case("Author", "profile", "CONTAINS", true; "json containment")]
#[test_case("Author", "profile", "GT", false; "json has no ordering")]
#[test_case("Author", "profile", "NOT_NULL", true; "json null check")]
fn test_operator_availability(entity: &str, field: &str, operator: &str, expected: bool) {
    assert_eq!(offers(entity, field, operator), expected);
}

#[test]
fn test_variable_value_has_no_containment() {
    let schema = payload_schema();
    let value = schema.entity("TaskVariable").unwrap().field("value").unwrap();
    assert!(value.operators().contains(&FilterOperator::Locate));
    assert!(!value.operators().contains(&FilterOperator::Contains));
}

#[test]
fn test_associations_offer_no_operators() {
    let schema = library_schema();
    let books = schema.entity("Author").unwrap().field("books").unwrap();
    assert!(books.operators().is_empty());
}
