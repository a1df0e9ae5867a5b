//! In-process store that evaluates compiled queries over tables of JSON rows.
//!
//! Follows the same semantics the SQL rendering targets: LEFT joins bind
//! NULLs when nothing matches, comparisons involving NULL are not true,
//! `Locate` is a 1-based byte position and `ToText` yields the stored text.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::query_schema::QuerySchema;
use crate::render_plan::render_expr::{Literal, Operator, RenderExpr};
use crate::render_plan::{CompiledQuery, JoinType, OrderByOrder};

use super::{EntityStore, Row, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

/// Table alias to the row bound to it; `None` for an unmatched LEFT join.
type Binding<'r> = HashMap<&'r str, Option<&'r Row>>;

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw row (column name to stored value) to a table.
    pub fn insert_row(&self, table: &str, row: Row) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.entry(table.to_string()).or_default().push(row);
    }

    /// Store an entity given by field name, mapping fields to columns and
    /// encoding values the way their scalar bindings persist them.
    pub fn insert_entity(
        &self,
        schema: &QuerySchema,
        entity: &str,
        object: &Value,
    ) -> Result<(), StoreError> {
        let entity_type = schema
            .entity(entity)
            .ok_or_else(|| StoreError::UnknownTable(entity.to_string()))?;
        let Value::Object(fields) = object else {
            return Err(StoreError::MalformedRow(format!(
                "{} must be given as an object",
                entity
            )));
        };

        let mut row = Row::new();
        for (name, value) in fields {
            let field = entity_type.field(name).ok_or_else(|| {
                StoreError::MalformedRow(format!("{} has no field '{}'", entity, name))
            })?;
            let stored = match &field.binding {
                Some(binding) if !value.is_null() => binding.coercing().encode_for_store(value),
                _ => value.clone(),
            };
            row.insert(field.descriptor.column.clone(), stored);
        }
        self.insert_row(&entity_type.descriptor.qualified_table(), row);
        Ok(())
    }

    pub fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.get(table).map(Vec::len).unwrap_or(0)
    }

    fn evaluate(
        &self,
        query: &CompiledQuery,
        tables: &HashMap<String, Vec<Row>>,
    ) -> Result<Vec<Row>, StoreError> {
        let params = &query.parameters;
        let root_rows = tables
            .get(&query.from.table_name)
            .ok_or_else(|| StoreError::UnknownTable(query.from.table_name.clone()))?;

        let mut bindings: Vec<Binding<'_>> = root_rows
            .iter()
            .map(|row| HashMap::from([(query.from.table_alias.as_str(), Some(row))]))
            .collect();

        for join in &query.joins {
            let rows = tables
                .get(&join.table_name)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let on = RenderExpr::OperatorApplicationExp(join.joining_on.clone());

            let mut next = Vec::with_capacity(bindings.len());
            for binding in bindings {
                let mut matched = false;
                for row in rows {
                    let mut candidate = binding.clone();
                    candidate.insert(join.table_alias.as_str(), Some(row));
                    if is_true(&eval(&on, &candidate, params)?) {
                        next.push(candidate);
                        matched = true;
                    }
                }
                if !matched && join.join_type == JoinType::Left {
                    let mut candidate = binding;
                    candidate.insert(join.table_alias.as_str(), None);
                    next.push(candidate);
                }
            }
            bindings = next;
        }

        if let Some(filter) = &query.filter {
            let mut kept = Vec::with_capacity(bindings.len());
            for binding in bindings {
                if is_true(&eval(filter, &binding, params)?) {
                    kept.push(binding);
                }
            }
            bindings = kept;
        }

        if !query.order_by.is_empty() {
            let mut keyed = Vec::with_capacity(bindings.len());
            for binding in bindings {
                let keys = query
                    .order_by
                    .iter()
                    .map(|item| eval(&item.expression, &binding, params))
                    .collect::<Result<Vec<_>, _>>()?;
                keyed.push((keys, binding));
            }
            keyed.sort_by(|(a, _), (b, _)| {
                for (item, (x, y)) in query.order_by.iter().zip(a.iter().zip(b)) {
                    let ordering = sort_order(x, y);
                    let ordering = match item.order {
                        OrderByOrder::Asc => ordering,
                        // NULLs stay last either way
                        OrderByOrder::Desc if x.is_null() || y.is_null() => ordering,
                        OrderByOrder::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
            bindings = keyed.into_iter().map(|(_, binding)| binding).collect();
        }

        if let Some(limit) = query.limit {
            bindings.truncate(limit as usize);
        }

        bindings
            .iter()
            .map(|binding| {
                let mut row = Map::new();
                for item in &query.select {
                    row.insert(item.col_alias.clone(), eval(&item.expression, binding, params)?);
                }
                Ok(row)
            })
            .collect()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn execute(&self, query: &CompiledQuery) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let rows = self.evaluate(query, &tables)?;
        log::debug!("MemoryStore returned {} rows for {}", rows.len(), query.root_entity);
        Ok(rows)
    }
}

fn is_true(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Integer(i) => Value::from(*i),
        Literal::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Literal::Boolean(b) => Value::Bool(*b),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Null => Value::Null,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn eval(
    expr: &RenderExpr,
    binding: &Binding<'_>,
    params: &BTreeMap<String, Value>,
) -> Result<Value, StoreError> {
    match expr {
        RenderExpr::Literal(literal) => Ok(literal_value(literal)),
        RenderExpr::PropertyAccessExp(pa) => {
            let bound = binding.get(pa.table_alias.0.as_str()).ok_or_else(|| {
                StoreError::Evaluation(format!("unknown table alias '{}'", pa.table_alias.0))
            })?;
            Ok(bound
                .and_then(|row| row.get(&pa.column))
                .cloned()
                .unwrap_or(Value::Null))
        }
        RenderExpr::Parameter(name) => params
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::Evaluation(format!("missing parameter '{}'", name))),
        RenderExpr::List(items) => items
            .iter()
            .map(|item| eval(item, binding, params))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        RenderExpr::ToText(inner) => {
            Ok(text_of(&eval(inner, binding, params)?).map_or(Value::Null, Value::String))
        }
        RenderExpr::Locate(locate) => {
            let haystack = text_of(&eval(&locate.haystack, binding, params)?);
            let needle = text_of(&eval(&locate.needle, binding, params)?);
            Ok(match (haystack, needle) {
                (Some(h), Some(n)) => Value::from(h.find(&n).map_or(0, |pos| pos + 1)),
                _ => Value::Null,
            })
        }
        RenderExpr::StructuralEquals(eq) => {
            let left = eval(&eq.left, binding, params)?;
            let right = eval(&eq.right, binding, params)?;
            if left.is_null() || right.is_null() {
                return Ok(Value::Null);
            }
            Ok(Value::Bool(as_document(&left) == as_document(&right)))
        }
        RenderExpr::OperatorApplicationExp(app) => {
            let operands = app
                .operands
                .iter()
                .map(|operand| eval(operand, binding, params))
                .collect::<Result<Vec<_>, _>>()?;
            apply_operator(app.operator, &operands)
        }
    }
}

/// Parse JSON text into a document; anything else compares as itself.
fn as_document(value: &Value) -> Value {
    match value {
        Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_| value.clone()),
        other => other.clone(),
    }
}

fn apply_operator(operator: Operator, operands: &[Value]) -> Result<Value, StoreError> {
    let arity_error = || {
        StoreError::Evaluation(format!(
            "operator {:?} applied to {} operands",
            operator,
            operands.len()
        ))
    };

    match operator {
        Operator::And => {
            if operands.iter().any(|v| matches!(v, Value::Bool(false))) {
                Ok(Value::Bool(false))
            } else if operands.iter().all(is_true) {
                Ok(Value::Bool(true))
            } else {
                Ok(Value::Null)
            }
        }
        Operator::Or => {
            if operands.iter().any(is_true) {
                Ok(Value::Bool(true))
            } else if operands.iter().all(|v| matches!(v, Value::Bool(false))) {
                Ok(Value::Bool(false))
            } else {
                Ok(Value::Null)
            }
        }
        Operator::Not => match operands {
            [Value::Bool(b)] => Ok(Value::Bool(!b)),
            [_] => Ok(Value::Null),
            _ => Err(arity_error()),
        },
        Operator::IsNull => match operands {
            [v] => Ok(Value::Bool(v.is_null())),
            _ => Err(arity_error()),
        },
        Operator::IsNotNull => match operands {
            [v] => Ok(Value::Bool(!v.is_null())),
            _ => Err(arity_error()),
        },
        Operator::In | Operator::NotIn => match operands {
            [left, Value::Array(candidates)] => {
                if left.is_null() {
                    return Ok(Value::Null);
                }
                let found = candidates
                    .iter()
                    .any(|c| compare(left, c) == Some(Ordering::Equal));
                Ok(Value::Bool(found == (operator == Operator::In)))
            }
            _ => Err(arity_error()),
        },
        Operator::Like => match operands {
            [Value::Null, _] | [_, Value::Null] => Ok(Value::Null),
            [text, pattern] => {
                let text = text_of(text).unwrap_or_default();
                let pattern = text_of(pattern).unwrap_or_default();
                Ok(Value::Bool(like_match(&text, &pattern)))
            }
            _ => Err(arity_error()),
        },
        Operator::Equal
        | Operator::NotEqual
        | Operator::LessThan
        | Operator::GreaterThan
        | Operator::LessThanEqual
        | Operator::GreaterThanEqual => match operands {
            [left, right] => {
                if left.is_null() || right.is_null() {
                    return Ok(Value::Null);
                }
                let ordering = compare(left, right);
                let result = match operator {
                    Operator::Equal => ordering == Some(Ordering::Equal),
                    Operator::NotEqual => ordering != Some(Ordering::Equal),
                    Operator::LessThan => ordering == Some(Ordering::Less),
                    Operator::GreaterThan => ordering == Some(Ordering::Greater),
                    Operator::LessThanEqual => {
                        matches!(ordering, Some(Ordering::Less | Ordering::Equal))
                    }
                    _ => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                };
                Ok(Value::Bool(result))
            }
            _ => Err(arity_error()),
        },
    }
}

/// Ordering between two non-null values of compatible types.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        // booleans are commonly stored as 0/1
        (Value::Bool(a), Value::Number(n)) => n.as_i64().map(|n| (*a as i64).cmp(&n)),
        (Value::Number(n), Value::Bool(b)) => n.as_i64().map(|n| n.cmp(&(*b as i64))),
        _ if left == right => Some(Ordering::Equal),
        _ => None,
    }
}

/// Sort order with NULLs last.
fn sort_order(left: &Value, right: &Value) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare(left, right).unwrap_or(Ordering::Equal),
    }
}

/// SQL LIKE with `%`, `_` and backslash escapes.
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    fn matches(t: &[char], p: &[char]) -> bool {
        match p.first() {
            None => t.is_empty(),
            Some('%') => (0..=t.len()).any(|skip| matches(&t[skip..], &p[1..])),
            Some('_') => !t.is_empty() && matches(&t[1..], &p[1..]),
            Some('\\') if p.len() > 1 => t.first() == Some(&p[1]) && matches(&t[1..], &p[2..]),
            Some(c) => t.first() == Some(c) && matches(&t[1..], &p[1..]),
        }
    }

    matches(&text, &pattern)
}
