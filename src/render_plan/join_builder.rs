use std::collections::HashMap;

use crate::entity_catalog::{FieldDescriptor, FieldKind};

use super::render_expr::{Operator, OperatorApplication, RenderExpr};
use super::{Join, JoinType};

pub const ROOT_ALIAS: &str = "t0";

/// Tracks the joins of one compiled query, one per association path.
///
/// Selection and filter share the builder, so `books.title` in the projection
/// and `books: {title: {EQ: ..}}` in the filter land on the same table alias.
#[derive(Debug, Default)]
pub struct JoinBuilder {
    joins: Vec<Join>,
    by_path: HashMap<Vec<String>, usize>,
}

/// The parent side of an association hop.
pub struct JoinSource<'a> {
    pub alias: &'a str,
    pub id_column: &'a str,
}

/// The target side of an association hop.
pub struct JoinTarget<'a> {
    pub table_name: String,
    pub id_column: &'a str,
}

impl JoinBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias bound to an association path; the empty path is the root table.
    pub fn alias_for(&self, path: &[String]) -> Option<&str> {
        if path.is_empty() {
            return Some(ROOT_ALIAS);
        }
        self.by_path
            .get(path)
            .map(|idx| self.joins[*idx].table_alias.as_str())
    }

    /// Join `field` (an association of the entity at `source`) reached through `path`.
    /// Returns the existing alias when the path has already been joined.
    pub fn join_association(
        &mut self,
        path: &[String],
        source: JoinSource<'_>,
        field: &FieldDescriptor,
        target: JoinTarget<'_>,
    ) -> String {
        if let Some(idx) = self.by_path.get(path) {
            return self.joins[*idx].table_alias.clone();
        }

        let alias = format!("t{}", self.joins.len() + 1);
        let (left, right) = match &field.kind {
            FieldKind::ToOne { join_column, .. } => (
                RenderExpr::column(source.alias, join_column.as_str()),
                RenderExpr::column(alias.as_str(), target.id_column),
            ),
            FieldKind::ToMany { mapped_by, .. } => (
                RenderExpr::column(alias.as_str(), mapped_by.as_str()),
                RenderExpr::column(source.alias, source.id_column),
            ),
            FieldKind::Scalar { .. } => {
                // not an association; callers resolve paths before joining
                log::warn!("Refusing to join scalar field '{}'", field.name);
                return source.alias.to_string();
            }
        };

        log::debug!(
            "Join {} AS {} for path '{}'",
            target.table_name,
            alias,
            path.join(".")
        );

        self.joins.push(Join {
            path: path.to_vec(),
            table_name: target.table_name,
            table_alias: alias.clone(),
            joining_on: OperatorApplication {
                operator: Operator::Equal,
                operands: vec![left, right],
            },
            join_type: JoinType::Left,
        });
        self.by_path.insert(path.to_vec(), self.joins.len() - 1);
        alias
    }

    pub fn into_joins(self) -> Vec<Join> {
        self.joins
    }
}
