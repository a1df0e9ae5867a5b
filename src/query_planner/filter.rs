//! Filter Node: the `where` argument as a predicate tree.
//!
//! Parsing is purely syntactic. A field key whose value holds only operator
//! tokens (`{EQ: ..}`, `{LOCATE: .., NOT_NULL: true}`) yields one leaf per
//! operator; any other object value continues the path into an association.
//! Path and operator validity are checked by the predicate compiler.

use serde_json::{Map, Number, Value as Json};

use crate::graphql_parser::ast::Value;
use crate::scalars::operators::is_operator_token;
use crate::scalars::FilterOperator;

use super::errors::CompileError;
use super::Variables;

/// An input value as written in the document, with variable references kept
/// symbolic until compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Variable(String),
    /// A non-container constant
    Scalar(Json),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

impl InputValue {
    pub fn from_ast(value: &Value<'_>) -> Self {
        match value {
            Value::Variable(name) => InputValue::Variable(name.to_string()),
            Value::Int(i) => InputValue::Scalar(Json::from(*i)),
            Value::Float(f) => InputValue::Scalar(
                Number::from_f64(*f)
                    .map(Json::Number)
                    .unwrap_or(Json::Null),
            ),
            Value::String(s) => InputValue::Scalar(Json::String(s.clone())),
            Value::Boolean(b) => InputValue::Scalar(Json::Bool(*b)),
            Value::Null => InputValue::Scalar(Json::Null),
            Value::Enum(e) => InputValue::Scalar(Json::String(e.to_string())),
            Value::List(items) => InputValue::List(items.iter().map(Self::from_ast).collect()),
            Value::Object(entries) => InputValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), Self::from_ast(v)))
                    .collect(),
            ),
        }
    }

    pub fn from_json(value: &Json) -> Self {
        match value {
            Json::Array(items) => InputValue::List(items.iter().map(Self::from_json).collect()),
            Json::Object(entries) => InputValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
            other => InputValue::Scalar(other.clone()),
        }
    }

    pub fn has_variables(&self) -> bool {
        match self {
            InputValue::Variable(_) => true,
            InputValue::Scalar(_) => false,
            InputValue::List(items) => items.iter().any(Self::has_variables),
            InputValue::Object(entries) => entries.iter().any(|(_, v)| v.has_variables()),
        }
    }

    /// Materialize the value, substituting bound variables.
    pub fn resolve(&self, variables: &Variables) -> Result<Json, CompileError> {
        match self {
            InputValue::Variable(name) => variables
                .get(name)
                .cloned()
                .ok_or_else(|| CompileError::UnboundVariable(name.clone())),
            InputValue::Scalar(value) => Ok(value.clone()),
            InputValue::List(items) => items
                .iter()
                .map(|item| item.resolve(variables))
                .collect::<Result<Vec<_>, _>>()
                .map(Json::Array),
            InputValue::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.resolve(variables)?);
                }
                Ok(Json::Object(map))
            }
        }
    }

    /// Object entries, looking through a variable holding an object.
    fn entries(
        &self,
        variables: &Variables,
        context: &str,
    ) -> Result<Vec<(String, InputValue)>, CompileError> {
        match self {
            InputValue::Object(entries) => Ok(entries.clone()),
            InputValue::Variable(_) => match self.resolve(variables)? {
                Json::Object(map) => Ok(map
                    .iter()
                    .map(|(k, v)| (k.clone(), InputValue::from_json(v)))
                    .collect()),
                _ => Err(expected(context, "an input object")),
            },
            _ => Err(expected(context, "an input object")),
        }
    }

    /// List items, looking through a variable holding a list.
    pub fn items(&self, variables: &Variables) -> Option<Result<Vec<InputValue>, CompileError>> {
        match self {
            InputValue::List(items) => Some(Ok(items.clone())),
            InputValue::Variable(_) => match self.resolve(variables) {
                Ok(Json::Array(items)) => Some(Ok(items.iter().map(Self::from_json).collect())),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            },
            _ => None,
        }
    }
}

fn expected(context: &str, what: &str) -> CompileError {
    CompileError::InvalidValue {
        field: context.to_string(),
        message: format!("expected {}", what),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterLeaf {
    /// Field path from the root entity; all but the last segment are associations
    pub path: Vec<String>,
    /// Operator token as written; validated against the field's scalar binding
    pub operator: String,
    pub value: InputValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Leaf(FilterLeaf),
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    Not(Box<FilterNode>),
}

impl FilterNode {
    pub fn leaf(path: &[&str], operator: FilterOperator, value: InputValue) -> Self {
        FilterNode::Leaf(FilterLeaf {
            path: path.iter().map(|s| s.to_string()).collect(),
            operator: operator.as_str().to_string(),
            value,
        })
    }

    fn all(mut children: Vec<FilterNode>) -> Self {
        if children.len() == 1 {
            children.remove(0)
        } else {
            FilterNode::And(children)
        }
    }

    /// Parse a `where` argument. A variable standing for the whole argument
    /// is resolved against the binding map first. An empty `where: {}` places
    /// no restriction and yields `None`; empty criteria anywhere below it are
    /// rejected.
    pub fn from_where(
        value: &Value<'_>,
        variables: &Variables,
    ) -> Result<Option<Self>, CompileError> {
        let criteria = InputValue::from_ast(value);
        if criteria.entries(variables, "where")?.is_empty() {
            return Ok(None);
        }
        parse_criteria(&criteria, &[], variables, 0).map(Some)
    }

    pub fn leaves(&self) -> Vec<&FilterLeaf> {
        match self {
            FilterNode::Leaf(leaf) => vec![leaf],
            FilterNode::And(children) | FilterNode::Or(children) => {
                children.iter().flat_map(|c| c.leaves()).collect()
            }
            FilterNode::Not(child) => child.leaves(),
        }
    }
}

const COMBINATORS: [&str; 3] = ["AND", "OR", "NOT"];

/// Cap on criteria nesting; `where` values bound through variables bypass
/// the document parser's own nesting cap.
const MAX_CRITERIA_DEPTH: usize = 64;

/// Operator entries of a field criteria object. An operator-shaped key that
/// is not a known operator still counts when its value is not an object, so
/// the compiler can reject it against the field's scalar.
fn is_leaf_group(entries: &[(String, InputValue)]) -> bool {
    !entries.is_empty()
        && entries.iter().all(|(key, value)| {
            is_operator_token(key)
                && !COMBINATORS.contains(&key.as_str())
                && (FilterOperator::parse(key).is_some() || !matches!(value, InputValue::Object(_)))
        })
}

fn parse_criteria(
    value: &InputValue,
    prefix: &[String],
    variables: &Variables,
    depth: usize,
) -> Result<FilterNode, CompileError> {
    let context = context_of(prefix);
    if depth > MAX_CRITERIA_DEPTH {
        return Err(CompileError::InvalidValue {
            field: context,
            message: "criteria nested too deeply".to_string(),
        });
    }

    let entries = value.entries(variables, &context)?;
    if entries.is_empty() {
        // an empty object would otherwise compile to `true` and match every row
        return Err(CompileError::InvalidValue {
            field: context,
            message: "criteria must name at least one field or operator".to_string(),
        });
    }

    let mut children = Vec::new();
    for (key, inner) in entries {
        match key.as_str() {
            "AND" => children.push(FilterNode::And(parse_group(
                &inner, prefix, variables, depth, "AND",
            )?)),
            "OR" => children.push(FilterNode::Or(parse_group(
                &inner, prefix, variables, depth, "OR",
            )?)),
            "NOT" => children.push(FilterNode::Not(Box::new(parse_criteria(
                &inner,
                prefix,
                variables,
                depth + 1,
            )?))),
            field => {
                let mut path = prefix.to_vec();
                path.push(field.to_string());
                let entries = inner.entries(variables, &path.join("."))?;

                if is_leaf_group(&entries) {
                    for (operator, operand) in entries {
                        children.push(FilterNode::Leaf(FilterLeaf {
                            path: path.clone(),
                            operator,
                            value: operand,
                        }));
                    }
                } else {
                    children.push(parse_criteria(
                        &InputValue::Object(entries),
                        &path,
                        variables,
                        depth + 1,
                    )?);
                }
            }
        }
    }

    Ok(FilterNode::all(children))
}

fn context_of(prefix: &[String]) -> String {
    if prefix.is_empty() {
        "where".to_string()
    } else {
        prefix.join(".")
    }
}

/// Operands of `AND`/`OR`: a list of criteria objects, or one object whose
/// entries each form a separate operand. At least one operand is required.
fn parse_group(
    value: &InputValue,
    prefix: &[String],
    variables: &Variables,
    depth: usize,
    combinator: &str,
) -> Result<Vec<FilterNode>, CompileError> {
    let operands = match value.items(variables) {
        Some(items) => items?,
        None => value
            .entries(variables, &context_of(prefix))?
            .into_iter()
            .map(|entry| InputValue::Object(vec![entry]))
            .collect(),
    };
    if operands.is_empty() {
        return Err(CompileError::InvalidValue {
            field: context_of(prefix),
            message: format!("{} requires at least one operand", combinator),
        });
    }
    operands
        .iter()
        .map(|operand| parse_criteria(operand, prefix, variables, depth + 1))
        .collect()
}
