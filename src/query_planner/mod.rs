//! Plans one root field of a query document into a [`CompiledQuery`]:
//! selection planning, filter parsing and predicate compilation.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::graphql_parser::ast::{Field, Value, VariableDefinition};
use crate::query_schema::{EntityType, QuerySchema, SchemaField};
use crate::render_plan::join_builder::{JoinBuilder, JoinSource, JoinTarget, ROOT_ALIAS};
use crate::render_plan::{CompiledQuery, FromTable, ParameterSet};

pub mod errors;
pub mod filter;
pub mod predicate_compiler;
pub mod selection;

pub use errors::CompileError;
pub use filter::{FilterLeaf, FilterNode, InputValue};
pub use predicate_compiler::PredicateCompiler;
pub use selection::{Cardinality, RootSelection, SelectedField, SelectionNode};

/// Variable Binding Map: variable name to raw value
pub type Variables = HashMap<String, Json>;

const WHERE_ARGUMENT: &str = "where";

#[derive(Debug, Clone)]
pub struct PlannedQuery {
    pub selection: RootSelection,
    pub filter: Option<FilterNode>,
    pub compiled: CompiledQuery,
}

/// Supplied variables plus declared defaults for anything not supplied.
pub fn bind_variables(definitions: &[VariableDefinition<'_>], supplied: &Variables) -> Variables {
    let mut bound = supplied.clone();
    for definition in definitions {
        if bound.contains_key(definition.name) {
            continue;
        }
        if let Some(default) = &definition.default_value {
            let empty = Variables::new();
            // defaults are constants, so resolution cannot fail
            if let Ok(value) = InputValue::from_ast(default).resolve(&empty) {
                bound.insert(definition.name.to_string(), value);
            }
        }
    }
    bound
}

pub fn plan_root_field(
    schema: &QuerySchema,
    field: &Field<'_>,
    variables: &Variables,
) -> Result<PlannedQuery, CompileError> {
    let entity = schema
        .root(field.name)
        .ok_or_else(|| CompileError::UnknownRootField(field.name.to_string()))?;

    if let Some((argument, _)) = field.arguments.iter().find(|(a, _)| *a != WHERE_ARGUMENT) {
        return Err(CompileError::UnknownArgument {
            field: field.name.to_string(),
            argument: argument.to_string(),
        });
    }

    let mut joins = JoinBuilder::new();
    let mut parameters = ParameterSet::new();

    let mut planner = selection::SelectionPlanner::new(schema, variables, &mut joins);
    let root_selection = planner.plan_root(entity, field)?;
    let (select, order_by) = planner.finish();

    let filter = match field.argument(WHERE_ARGUMENT) {
        None | Some(Value::Null) => None,
        Some(value) => FilterNode::from_where(value, variables)?,
    };
    let predicate = match &filter {
        Some(node) => Some(
            PredicateCompiler::new(schema, entity, variables, &mut joins, &mut parameters)
                .compile(node)?,
        ),
        None => None,
    };

    let compiled = CompiledQuery {
        root_entity: entity.name().to_string(),
        from: FromTable {
            table_name: entity.descriptor.qualified_table(),
            table_alias: ROOT_ALIAS.to_string(),
        },
        joins: joins.into_joins(),
        select,
        filter: predicate,
        order_by,
        parameters: parameters.into_values(),
        limit: None,
    };
    log::debug!(
        "Planned '{}': {} joins, {} columns, {} parameters",
        root_selection.response_key,
        compiled.joins.len(),
        compiled.select.len(),
        compiled.parameters.len()
    );

    Ok(PlannedQuery {
        selection: root_selection,
        filter,
        compiled,
    })
}

/// Join the association `field` of `parent` (bound to `parent_alias`),
/// reached through `path`. Returns the target alias and entity.
pub(crate) fn join_field<'s>(
    schema: &'s QuerySchema,
    joins: &mut JoinBuilder,
    parent: &EntityType,
    parent_alias: &str,
    path: &[String],
    field: &SchemaField,
) -> Result<(String, &'s EntityType), CompileError> {
    let unknown = || CompileError::UnknownField {
        entity: parent.name().to_string(),
        field: field.name().to_string(),
    };
    let target = field
        .descriptor
        .target()
        .and_then(|name| schema.entity(name))
        .ok_or_else(unknown)?;

    let alias = joins.join_association(
        path,
        JoinSource {
            alias: parent_alias,
            id_column: &parent.id_field().descriptor.column,
        },
        &field.descriptor,
        JoinTarget {
            table_name: target.descriptor.qualified_table(),
            id_column: &target.id_field().descriptor.column,
        },
    );
    Ok((alias, target))
}
