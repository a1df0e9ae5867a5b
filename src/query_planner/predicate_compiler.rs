//! Predicate Compiler: turns a Filter Node into a store predicate.
//!
//! Each leaf resolves its path (joining associations on the way), checks the
//! operator against the field's scalar binding, coerces the operand through
//! that binding and hands off to [`OperatorTable`] for the store fragment.

use serde_json::Value as Json;

use crate::query_schema::{EntityType, QuerySchema};
use crate::render_plan::join_builder::{JoinBuilder, ROOT_ALIAS};
use crate::render_plan::render_expr::{Literal, Locate, Operator, RenderExpr, StructuralEquals};
use crate::render_plan::ParameterSet;
use crate::scalars::operators::is_operator_token;
use crate::scalars::{FilterOperator, ScalarBinding, StorageRepr};

use super::errors::CompileError;
use super::filter::{FilterLeaf, FilterNode, InputValue};
use super::{join_field, Variables};

pub struct PredicateCompiler<'a> {
    schema: &'a QuerySchema,
    root: &'a EntityType,
    variables: &'a Variables,
    joins: &'a mut JoinBuilder,
    parameters: &'a mut ParameterSet,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(
        schema: &'a QuerySchema,
        root: &'a EntityType,
        variables: &'a Variables,
        joins: &'a mut JoinBuilder,
        parameters: &'a mut ParameterSet,
    ) -> Self {
        PredicateCompiler {
            schema,
            root,
            variables,
            joins,
            parameters,
        }
    }

    pub fn compile(&mut self, node: &FilterNode) -> Result<RenderExpr, CompileError> {
        match node {
            FilterNode::Leaf(leaf) => self.compile_leaf(leaf),
            FilterNode::And(children) => Ok(RenderExpr::and(self.compile_all(children)?)),
            FilterNode::Or(children) => Ok(RenderExpr::or(self.compile_all(children)?)),
            FilterNode::Not(child) => Ok(RenderExpr::not(self.compile(child)?)),
        }
    }

    fn compile_all(&mut self, children: &[FilterNode]) -> Result<Vec<RenderExpr>, CompileError> {
        children.iter().map(|child| self.compile(child)).collect()
    }

    fn compile_leaf(&mut self, leaf: &FilterLeaf) -> Result<RenderExpr, CompileError> {
        let schema = self.schema;
        let path = &leaf.path;
        if path.is_empty() {
            return Err(CompileError::InvalidValue {
                field: String::new(),
                message: "empty filter path".to_string(),
            });
        }

        let mut entity = self.root;
        let mut alias = ROOT_ALIAS.to_string();

        for (idx, segment) in path.iter().enumerate() {
            let field = entity
                .field(segment)
                .ok_or_else(|| CompileError::UnknownField {
                    entity: entity.name().to_string(),
                    field: segment.clone(),
                })?;
            let field_path = path[..=idx].join(".");
            let is_last = idx + 1 == path.len();

            match &field.binding {
                Some(binding) => {
                    if !is_last {
                        // `{title: {STARTS: {..}}}` reads as a path through a scalar
                        let next = &path[idx + 1];
                        if idx + 2 == path.len() && is_operator_token(next) {
                            return Err(CompileError::UnsupportedOperator {
                                field: field_path,
                                operator: next.clone(),
                                scalar: binding.name.clone(),
                            });
                        }
                        return Err(CompileError::UnknownField {
                            entity: entity.name().to_string(),
                            field: path[idx..].join("."),
                        });
                    }

                    let operator = FilterOperator::parse(&leaf.operator)
                        .filter(|op| binding.supports(*op))
                        .ok_or_else(|| CompileError::UnsupportedOperator {
                            field: field_path.clone(),
                            operator: leaf.operator.clone(),
                            scalar: binding.name.clone(),
                        })?;

                    let column = RenderExpr::column(alias.as_str(), field.descriptor.column.as_str());
                    return self.compile_comparison(&field_path, column, binding, operator, &leaf.value);
                }
                None => {
                    if is_last {
                        return Err(CompileError::UnsupportedOperator {
                            field: field_path,
                            operator: leaf.operator.clone(),
                            scalar: field.descriptor.target().unwrap_or_default().to_string(),
                        });
                    }
                    let (next_alias, target) =
                        join_field(schema, self.joins, entity, &alias, &path[..=idx], field)?;
                    alias = next_alias;
                    entity = target;
                }
            }
        }

        Err(CompileError::UnknownField {
            entity: entity.name().to_string(),
            field: path.join("."),
        })
    }

    fn compile_comparison(
        &mut self,
        field_path: &str,
        column: RenderExpr,
        binding: &ScalarBinding,
        operator: FilterOperator,
        value: &InputValue,
    ) -> Result<RenderExpr, CompileError> {
        if operator.takes_flag() {
            let flag = value.resolve(self.variables)?;
            let flag = flag.as_bool().ok_or_else(|| CompileError::InvalidValue {
                field: field_path.to_string(),
                message: format!("{} expects a Boolean", operator),
            })?;
            return Ok(OperatorTable::null_check(
                column,
                (operator == FilterOperator::IsNull) == flag,
            ));
        }

        if operator.takes_list() {
            let items = match value.items(self.variables) {
                Some(items) => items?,
                None => vec![value.clone()],
            };
            let mut operands = Vec::with_capacity(items.len());
            for item in &items {
                let coerced = self.coerce(field_path, binding, item)?;
                operands.push(coerced);
            }
            return Ok(OperatorTable::membership(
                self.parameters,
                column,
                binding,
                operands,
                operator == FilterOperator::Nin,
            ));
        }

        let coerced = self.coerce(field_path, binding, value)?;
        Ok(OperatorTable::translate(
            self.parameters,
            column,
            binding,
            operator,
            coerced,
        ))
    }

    /// Literals go through `parse_literal`; anything touching a variable
    /// through the more lenient `parse_value`.
    fn coerce(
        &self,
        field_path: &str,
        binding: &ScalarBinding,
        value: &InputValue,
    ) -> Result<Json, CompileError> {
        let resolved = value.resolve(self.variables)?;
        let registry = self.schema.registry();
        let coerced = if value.has_variables() {
            registry.coerce_variable(binding, &resolved)
        } else {
            registry.coerce_literal(binding, &resolved)
        };
        coerced.map_err(|e| CompileError::InvalidValue {
            field: field_path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Operator-to-expression table. Store quirks live here: opaque payloads are
/// compared in their encoded text form, and substring search is a position
/// test over a text projection rather than a pattern match.
pub struct OperatorTable;

impl OperatorTable {
    fn stored_column(column: RenderExpr, binding: &ScalarBinding) -> RenderExpr {
        match binding.storage {
            StorageRepr::EncodedText => column.to_text(),
            StorageRepr::Native => column,
        }
    }

    fn stored_value(binding: &ScalarBinding, value: &Json) -> Json {
        match binding.storage {
            StorageRepr::EncodedText => binding.coercing().encode_for_store(value),
            StorageRepr::Native => value.clone(),
        }
    }

    pub fn null_check(column: RenderExpr, is_null: bool) -> RenderExpr {
        let operator = if is_null {
            Operator::IsNull
        } else {
            Operator::IsNotNull
        };
        RenderExpr::apply(operator, vec![column])
    }

    pub fn membership(
        parameters: &mut ParameterSet,
        column: RenderExpr,
        binding: &ScalarBinding,
        values: Vec<Json>,
        negated: bool,
    ) -> RenderExpr {
        let list = values
            .iter()
            .map(|v| parameters.bind(Self::stored_value(binding, v)))
            .collect();
        let operator = if negated { Operator::NotIn } else { Operator::In };
        RenderExpr::binary(
            operator,
            Self::stored_column(column, binding),
            RenderExpr::List(list),
        )
    }

    pub fn translate(
        parameters: &mut ParameterSet,
        column: RenderExpr,
        binding: &ScalarBinding,
        operator: FilterOperator,
        value: Json,
    ) -> RenderExpr {
        let comparison = match operator {
            FilterOperator::Eq => Operator::Equal,
            FilterOperator::Ne => Operator::NotEqual,
            FilterOperator::Gt => Operator::GreaterThan,
            FilterOperator::Ge => Operator::GreaterThanEqual,
            FilterOperator::Lt => Operator::LessThan,
            FilterOperator::Le => Operator::LessThanEqual,
            FilterOperator::Like => Operator::Like,
            FilterOperator::Locate => {
                let needle = binding.coercing().text_projection(&value);
                return RenderExpr::binary(
                    Operator::GreaterThan,
                    RenderExpr::Locate(Locate {
                        needle: Box::new(parameters.bind(Json::String(needle))),
                        haystack: Box::new(column.to_text()),
                    }),
                    RenderExpr::Literal(Literal::Integer(0)),
                );
            }
            FilterOperator::Contains => {
                let candidate = binding.coercing().encode_for_store(&value);
                return RenderExpr::StructuralEquals(StructuralEquals {
                    left: Box::new(column.to_text()),
                    right: Box::new(parameters.bind(candidate)),
                });
            }
            FilterOperator::In | FilterOperator::Nin => {
                return Self::membership(
                    parameters,
                    column,
                    binding,
                    vec![value],
                    operator == FilterOperator::Nin,
                );
            }
            FilterOperator::IsNull | FilterOperator::NotNull => {
                return Self::null_check(column, operator == FilterOperator::IsNull);
            }
        };

        // EQ null / NE null are null checks
        if value.is_null() {
            match comparison {
                Operator::Equal => return Self::null_check(column, true),
                Operator::NotEqual => return Self::null_check(column, false),
                _ => {}
            }
        }

        RenderExpr::binary(
            comparison,
            Self::stored_column(column, binding),
            parameters.bind(Self::stored_value(binding, &value)),
        )
    }
}
