//! Compiled Query: the relational skeleton of one root field with its
//! attached predicate, ready for a store to render or evaluate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use render_expr::{OperatorApplication, RenderExpr};

pub mod join_builder;
pub mod render_expr;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FromTable {
    pub table_name: String,
    pub table_alias: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Join {
    /// Association path from the root entity, e.g. `["books", "publisher"]`
    pub path: Vec<String>,
    pub table_name: String,
    pub table_alias: String,
    pub joining_on: OperatorApplication,
    pub join_type: JoinType,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SelectItem {
    pub expression: RenderExpr,
    /// Stable output key: `field` for root columns, `path.field` for joined ones
    pub col_alias: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OrderByItem {
    pub expression: RenderExpr,
    pub order: OrderByOrder,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum OrderByOrder {
    Asc,
    Desc,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub root_entity: String,
    pub from: FromTable,
    pub joins: Vec<Join>,
    pub select: Vec<SelectItem>,
    pub filter: Option<RenderExpr>,
    pub order_by: Vec<OrderByItem>,
    /// Bind values keyed by parameter name (`p0`, `p1`, ...)
    pub parameters: BTreeMap<String, Value>,
    pub limit: Option<u64>,
}

impl CompiledQuery {
    pub fn select_aliases(&self) -> impl Iterator<Item = &str> {
        self.select.iter().map(|item| item.col_alias.as_str())
    }
}

/// Allocates parameter names for bind values in compile order.
#[derive(Debug, Default)]
pub struct ParameterSet {
    values: BTreeMap<String, Value>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, value: Value) -> RenderExpr {
        let name = format!("p{}", self.values.len());
        self.values.insert(name.clone(), value);
        RenderExpr::Parameter(name)
    }

    pub fn into_values(self) -> BTreeMap<String, Value> {
        self.values
    }
}
