//! Unit tests for query document parsing edge cases and error handling
//!
//! Tests malformed documents, edge cases, and error conditions to ensure
//! robust parsing without panics.

#[cfg(test)]
mod parser_robustness_tests {
    use gqlbridge::graphql_parser::ast::Value;
    use gqlbridge::graphql_parser::parse_document;

    /// Malformed documents return errors rather than panicking
    #[test]
    fn test_malformed_documents_rejected() {
        let malformed = vec![
            "",
            "{",
            "}",
            "{ Books",
            "{ Books { select { id }",
            "{ Books(where: ) { select { id } } }",
            "{ Books(where: {title: }) { select { id } } }",
            "{ Books(where: {title: {EQ: \"unterminated}}) { select { id } } }",
            "{ Books(where: {title: {EQ: [1, 2}}) { select { id } } }",
            "query($) { Books { select { id } } }",
            "query($v Int) { Books { select { id } } }",
            "query($v: ) { Books { select { id } } }",
            "mutation { Books { select { id } } }",
            "{ Books { select { id } } } trailing",
            "{ : Books { select { id } } }",
        ];

        for document in malformed {
            assert!(
                parse_document(document).is_err(),
                "expected a parse error for: {:?}",
                document
            );
        }
    }

    /// Errors point at the failing line and column
    #[test]
    fn test_error_position_reported() {
        let document = "query {\n  Books(where: {title: }) {\n    select { id }\n  }\n}";
        let err = parse_document(document).unwrap_err();
        let message = err.describe(document);
        assert!(message.contains("line 2"), "{}", message);
    }

    #[test]
    fn test_valid_documents_parse() {
        let valid = vec![
            "{ Books { select { id } } }",
            "query { Books { select { id title } } }",
            "query Named { Books { select { id } } }",
            "query($t: String) { Books(where: {title: {EQ: $t}}) { select { id } } }",
            "query($ids: [Long!]! = [1, 2]) { Books(where: {id: {IN: $ids}}) { select { id } } }",
            "{ Books(where: {OR: [{id: {EQ: 1}}, {id: {EQ: 2}}]}) { select { id } } }",
            "{ Books(where: {title: {IS_NULL: false}}) { select { id(orderBy: DESC) } } }",
            "{ b: Books { s: select { t: title } } }",
            "{ Books { select { id } } Authors { select { name books { title } } } }",
            "{ Books(where: {price: {GT: -1.5e2}}) { select { id } } }",
            "# comment\n{ Books { select { id } } } # trailing comment",
        ];

        for document in valid {
            let result = parse_document(document);
            assert!(result.is_ok(), "failed to parse {:?}: {:?}", document, result);
        }
    }

    #[test]
    fn test_string_escapes_decode() {
        let doc = parse_document(
            r#"{ P(where: {value: {LOCATE: "[\"1\",\"2\"]\nA"}}) { select { id } } }"#,
        )
        .unwrap();
        let where_arg = doc.operation.selection_set[0].argument("where").unwrap();
        let Value::Object(fields) = where_arg else {
            panic!("where must be an object");
        };
        let Value::Object(criteria) = &fields[0].1 else {
            panic!("criteria must be an object");
        };
        assert_eq!(criteria[0].1, Value::String("[\"1\",\"2\"]\nA".to_string()));
    }

    #[test]
    fn test_values_of_every_kind() {
        let doc = parse_document(
            r#"{ P(where: {a: {EQ: 1}, b: {EQ: 2.5}, c: {EQ: true}, d: {EQ: null}, e: {EQ: ASC}, f: {IN: []}, g: {EQ: $v}}) { select { id } } }"#,
        )
        .unwrap();
        let Some(Value::Object(fields)) = doc.operation.selection_set[0].argument("where") else {
            panic!("where must be an object");
        };
        let operands: Vec<&Value> = fields
            .iter()
            .map(|(_, criteria)| match criteria {
                Value::Object(ops) => &ops[0].1,
                other => panic!("unexpected criteria {:?}", other),
            })
            .collect();
        assert_eq!(operands[0], &Value::Int(1));
        assert_eq!(operands[1], &Value::Float(2.5));
        assert_eq!(operands[2], &Value::Boolean(true));
        assert_eq!(operands[3], &Value::Null);
        assert_eq!(operands[4], &Value::Enum("ASC"));
        assert_eq!(operands[5], &Value::List(vec![]));
        assert_eq!(operands[6], &Value::Variable("v"));
    }

    /// Deeply nested filters parse up to the nesting cap
    #[test]
    fn test_deeply_nested_filter() {
        let depth = 30;
        let mut filter = "{id: {EQ: 1}}".to_string();
        for _ in 0..depth {
            filter = format!("{{AND: [{}]}}", filter);
        }
        let document = format!("{{ Books(where: {}) {{ select {{ id }} }} }}", filter);
        assert!(parse_document(&document).is_ok());
    }

    /// Nesting past the cap is a syntax error, not a stack overflow
    #[test]
    fn test_excessive_nesting_rejected() {
        let depth = 50_000;
        let list = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        let document = format!(
            "{{ TaskVariables(where: {{id: {{IN: {}}}}}) {{ select {{ id }} }} }}",
            list
        );
        let err = parse_document(&document).unwrap_err();
        assert!(err.describe(&document).starts_with("Nesting too deep"));

        let objects = format!("{}1{}", "{a: ".repeat(100), "}".repeat(100));
        let document = format!("{{ Books(where: {}) {{ select {{ id }} }} }}", objects);
        assert!(parse_document(&document).is_err());

        let selections = format!("{}id{}", "{ a ".repeat(100), " }".repeat(100));
        let document = format!("{{ Books {} }}", selections);
        let err = parse_document(&document).unwrap_err();
        assert!(err.describe(&document).starts_with("Nesting too deep"));

        let list_type = format!("{}Int{}", "[".repeat(100), "]".repeat(100));
        let document = format!("query($v: {}) {{ Books {{ select {{ id }} }} }}", list_type);
        assert!(parse_document(&document).is_err());
    }
}
