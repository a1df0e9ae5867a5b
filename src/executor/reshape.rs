//! Reshapes flat joined rows into the nested selection shape.
//!
//! Rows are grouped by the node's identifier in first-seen order; each group
//! becomes one object. A to-one association whose identifier is NULL in every
//! row is `null`, an empty to-many association is `[]`.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::query_planner::{Cardinality, SelectedField, SelectionNode};
use crate::scalars::ScalarRegistry;
use crate::store::Row;

use super::errors::ExecutionError;

pub fn reshape_rows(
    registry: &ScalarRegistry,
    node: &SelectionNode,
    rows: &[Row],
) -> Result<Vec<Value>, ExecutionError> {
    let rows: Vec<&Row> = rows.iter().collect();
    reshape_group(registry, node, &rows)
}

fn reshape_group(
    registry: &ScalarRegistry,
    node: &SelectionNode,
    rows: &[&Row],
) -> Result<Vec<Value>, ExecutionError> {
    let mut groups: Vec<Vec<&Row>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for &row in rows {
        let id = row.get(&node.id_alias).unwrap_or(&Value::Null);
        if id.is_null() {
            // unmatched LEFT join
            continue;
        }
        let key = id.to_string();
        match index.get(&key) {
            Some(pos) => groups[*pos].push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![row]);
            }
        }
    }

    groups
        .iter()
        .map(|group| build_object(registry, node, group))
        .collect()
}

fn build_object(
    registry: &ScalarRegistry,
    node: &SelectionNode,
    group: &[&Row],
) -> Result<Value, ExecutionError> {
    let mut object = Map::new();
    let first = group.first().copied();

    for field in &node.fields {
        match field {
            SelectedField::Scalar {
                response_key,
                col_alias,
                binding,
            } => {
                let stored = first
                    .and_then(|row| row.get(col_alias))
                    .unwrap_or(&Value::Null);
                let value = registry
                    .serialize(binding, stored)
                    .map_err(|e| ExecutionError::Decode {
                        field: col_alias.clone(),
                        message: e.to_string(),
                    })?;
                object.insert(response_key.clone(), value);
            }
            SelectedField::Association {
                response_key,
                cardinality,
                node: child,
            } => {
                let mut children = reshape_group(registry, child, group)?;
                let value = match cardinality {
                    Cardinality::Many => Value::Array(children),
                    Cardinality::One if children.is_empty() => Value::Null,
                    Cardinality::One => children.swap_remove(0),
                };
                object.insert(response_key.clone(), value);
            }
        }
    }

    Ok(Value::Object(object))
}
