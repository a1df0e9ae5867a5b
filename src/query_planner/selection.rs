//! Selection Node: the requested output shape of one root field, planned
//! against the schema into projected columns and joins.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::entity_catalog::FieldKind;
use crate::graphql_parser::ast::{Field, Value};
use crate::query_schema::{EntityType, QuerySchema};
use crate::render_plan::join_builder::{JoinBuilder, ROOT_ALIAS};
use crate::render_plan::render_expr::RenderExpr;
use crate::render_plan::{OrderByItem, OrderByOrder, SelectItem};
use crate::scalars::ScalarBinding;

use super::errors::CompileError;
use super::{join_field, Variables};

pub const SELECT_FIELD: &str = "select";
const ORDER_BY_ARGUMENT: &str = "orderBy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

#[derive(Debug, Clone)]
pub enum SelectedField {
    Scalar {
        response_key: String,
        col_alias: String,
        binding: Arc<ScalarBinding>,
    },
    Association {
        response_key: String,
        cardinality: Cardinality,
        node: SelectionNode,
    },
}

impl SelectedField {
    pub fn response_key(&self) -> &str {
        match self {
            SelectedField::Scalar { response_key, .. }
            | SelectedField::Association { response_key, .. } => response_key,
        }
    }
}

/// Requested fields of one entity in the output tree.
#[derive(Debug, Clone)]
pub struct SelectionNode {
    pub entity: String,
    /// Association path from the root entity
    pub path: Vec<String>,
    pub table_alias: String,
    /// Column alias of the identifier, always projected
    pub id_alias: String,
    pub fields: Vec<SelectedField>,
}

/// A root field: `Root(where: ..) { select { .. } }`
#[derive(Debug, Clone)]
pub struct RootSelection {
    pub root_name: String,
    /// Key under which the root field is returned (its alias, if any)
    pub response_key: String,
    /// Key under which the projection list is returned
    pub select_key: String,
    pub node: SelectionNode,
}

/// Output key of a projected column: `field` at the root, `path.field` below.
pub fn column_alias(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", path.join("."), field)
    }
}

pub struct SelectionPlanner<'a> {
    schema: &'a QuerySchema,
    variables: &'a Variables,
    joins: &'a mut JoinBuilder,
    select: Vec<SelectItem>,
    projected: HashSet<String>,
    order_by: Vec<OrderByItem>,
}

impl<'a> SelectionPlanner<'a> {
    pub fn new(
        schema: &'a QuerySchema,
        variables: &'a Variables,
        joins: &'a mut JoinBuilder,
    ) -> Self {
        SelectionPlanner {
            schema,
            variables,
            joins,
            select: Vec::new(),
            projected: HashSet::new(),
            order_by: Vec::new(),
        }
    }

    /// Plan the `select { .. }` block of a root field.
    pub fn plan_root(
        &mut self,
        entity: &'a EntityType,
        root_field: &Field<'_>,
    ) -> Result<RootSelection, CompileError> {
        let mut select_field = None;
        for sub in &root_field.selection_set {
            if sub.name != SELECT_FIELD {
                return Err(CompileError::UnknownField {
                    entity: entity.root_name.clone(),
                    field: sub.name.to_string(),
                });
            }
            if select_field.replace(sub).is_some() {
                return Err(CompileError::InvalidSelection(format!(
                    "'{}' may select '{}' only once",
                    entity.root_name, SELECT_FIELD
                )));
            }
        }
        let select_field = select_field.ok_or_else(|| {
            CompileError::InvalidSelection(format!(
                "'{}' must select '{}'",
                entity.root_name, SELECT_FIELD
            ))
        })?;
        if select_field.selection_set.is_empty() {
            return Err(CompileError::InvalidSelection(format!(
                "'{}.{}' needs a selection of fields",
                entity.root_name, SELECT_FIELD
            )));
        }

        let node = self.plan_node(
            entity,
            ROOT_ALIAS.to_string(),
            Vec::new(),
            &select_field.selection_set,
        )?;

        Ok(RootSelection {
            root_name: entity.root_name.clone(),
            response_key: root_field.response_key().to_string(),
            select_key: select_field.response_key().to_string(),
            node,
        })
    }

    fn plan_node(
        &mut self,
        entity: &'a EntityType,
        table_alias: String,
        path: Vec<String>,
        fields: &[Field<'_>],
    ) -> Result<SelectionNode, CompileError> {
        let mut selected = Vec::with_capacity(fields.len());

        for requested in fields {
            let field = entity
                .field(requested.name)
                .ok_or_else(|| CompileError::UnknownField {
                    entity: entity.name().to_string(),
                    field: requested.name.to_string(),
                })?;

            match (&field.binding, &field.descriptor.kind) {
                (Some(binding), _) => {
                    if !requested.selection_set.is_empty() {
                        return Err(CompileError::InvalidSelection(format!(
                            "scalar field '{}.{}' cannot have a sub-selection",
                            entity.name(),
                            requested.name
                        )));
                    }
                    let col_alias = column_alias(&path, requested.name);
                    let column = RenderExpr::column(table_alias.as_str(), field.descriptor.column.as_str());
                    self.project(column.clone(), &col_alias);

                    for (argument, value) in &requested.arguments {
                        if *argument != ORDER_BY_ARGUMENT {
                            return Err(CompileError::UnknownArgument {
                                field: requested.name.to_string(),
                                argument: argument.to_string(),
                            });
                        }
                        let order = self.order_direction(requested.name, value)?;
                        self.order_by.push(OrderByItem {
                            expression: column.clone(),
                            order,
                        });
                    }

                    selected.push(SelectedField::Scalar {
                        response_key: requested.response_key().to_string(),
                        col_alias,
                        binding: binding.clone(),
                    });
                }
                (None, kind) => {
                    if let Some((argument, _)) = requested.arguments.first() {
                        return Err(CompileError::UnknownArgument {
                            field: requested.name.to_string(),
                            argument: argument.to_string(),
                        });
                    }
                    if requested.selection_set.is_empty() {
                        return Err(CompileError::InvalidSelection(format!(
                            "association '{}.{}' needs a selection of fields",
                            entity.name(),
                            requested.name
                        )));
                    }
                    let cardinality = if matches!(kind, FieldKind::ToMany { .. }) {
                        Cardinality::Many
                    } else {
                        Cardinality::One
                    };

                    let mut child_path = path.clone();
                    child_path.push(requested.name.to_string());
                    let (child_alias, target) = join_field(
                        self.schema,
                        self.joins,
                        entity,
                        &table_alias,
                        &child_path,
                        field,
                    )?;
                    let node =
                        self.plan_node(target, child_alias, child_path, &requested.selection_set)?;

                    selected.push(SelectedField::Association {
                        response_key: requested.response_key().to_string(),
                        cardinality,
                        node,
                    });
                }
            }
        }

        // identifiers drive regrouping of joined rows
        let id = entity.id_field();
        let id_alias = column_alias(&path, id.name());
        self.project(
            RenderExpr::column(table_alias.as_str(), id.descriptor.column.as_str()),
            &id_alias,
        );

        Ok(SelectionNode {
            entity: entity.name().to_string(),
            path,
            table_alias,
            id_alias,
            fields: selected,
        })
    }

    fn project(&mut self, expression: RenderExpr, col_alias: &str) {
        if self.projected.insert(col_alias.to_string()) {
            self.select.push(SelectItem {
                expression,
                col_alias: col_alias.to_string(),
            });
        }
    }

    fn order_direction(&self, field: &str, value: &Value<'_>) -> Result<OrderByOrder, CompileError> {
        let direction = match value {
            Value::Enum(name) => Json::String(name.to_string()),
            Value::String(s) => Json::String(s.clone()),
            Value::Variable(name) => self
                .variables
                .get(*name)
                .cloned()
                .ok_or_else(|| CompileError::UnboundVariable(name.to_string()))?,
            _ => Json::Null,
        };
        match direction.as_str() {
            Some("ASC") => Ok(OrderByOrder::Asc),
            Some("DESC") => Ok(OrderByOrder::Desc),
            _ => Err(CompileError::InvalidValue {
                field: field.to_string(),
                message: format!("{} expects ASC or DESC", ORDER_BY_ARGUMENT),
            }),
        }
    }

    pub fn finish(self) -> (Vec<SelectItem>, Vec<OrderByItem>) {
        (self.select, self.order_by)
    }
}
