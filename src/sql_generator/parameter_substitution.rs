/// Parameter substitution and SQL escaping for ClickHouse
///
/// Replaces `$name` placeholders produced by the SQL generator with escaped
/// literals taken from the compiled query's parameter map.
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterSubstitutionError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Unsupported parameter type for value: {0}")]
    UnsupportedType(String),
}

/// Escape a string value for use in a ClickHouse string literal
pub(crate) fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\") // Must be first!
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('\0', "\\0")
}

/// Format a parameter value as SQL literal
fn format_parameter(value: &Value) -> Result<String, ParameterSubstitutionError> {
    match value {
        Value::String(s) => Ok(format!("'{}'", escape_string(s))),

        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() => Ok(f.to_string()),
                    _ => Err(ParameterSubstitutionError::UnsupportedType(format!(
                        "Non-finite number: {}",
                        n
                    ))),
                }
            }
        }

        Value::Bool(b) => Ok(if *b { "1".to_string() } else { "0".to_string() }),

        Value::Array(arr) => {
            let items: Result<Vec<String>, _> = arr.iter().map(format_parameter).collect();
            Ok(format!("[{}]", items?.join(", ")))
        }

        Value::Null => Ok("NULL".to_string()),

        // Documents travel as their JSON text
        Value::Object(_) => Ok(format!("'{}'", escape_string(&value.to_string()))),
    }
}

/// Substitute `$name` placeholders with escaped values.
///
/// Substituted text is never rescanned, so a `$` inside a value stays literal.
pub fn substitute_parameters(
    sql: &str,
    parameters: &BTreeMap<String, Value>,
) -> Result<String, ParameterSubstitutionError> {
    let mut result = String::with_capacity(sql.len() * 2);
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let mut param_name = String::new();
        while let Some(&next_ch) = chars.peek() {
            if next_ch.is_alphanumeric() || next_ch == '_' {
                param_name.push(next_ch);
                chars.next();
            } else {
                break;
            }
        }

        if param_name.is_empty() {
            result.push('$');
            continue;
        }

        match parameters.get(&param_name) {
            Some(value) => result.push_str(&format_parameter(value)?),
            None => return Err(ParameterSubstitutionError::MissingParameter(param_name)),
        }
    }

    Ok(result)
}
