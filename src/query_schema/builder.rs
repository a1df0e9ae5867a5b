use std::collections::{HashMap, HashSet};

use crate::entity_catalog::{EntityDescriptor, FieldKind};
use crate::scalars::ScalarRegistry;

use super::errors::SchemaBuildError;
use super::types::{CriteriaType, EntityType, OutputType, QuerySchema, SchemaField};

pub(crate) fn criteria_type_name(root_name: &str) -> String {
    format!("{}CriteriaExpression", root_name)
}

pub(crate) fn scalar_criteria_name(scalar: &str) -> String {
    format!("{}Criteria", scalar)
}

impl QuerySchema {
    /// Build the query schema for a set of entity descriptors.
    ///
    /// Every entity becomes a root field named after its plural name, exposing
    /// a `select` projection and a `where` criteria input.
    pub fn build(
        name: impl Into<String>,
        descriptors: Vec<EntityDescriptor>,
        registry: ScalarRegistry,
    ) -> Result<Self, SchemaBuildError> {
        if descriptors.is_empty() {
            return Err(SchemaBuildError::EmptySchema);
        }

        let mut by_entity: HashMap<String, usize> = HashMap::new();
        for (idx, descriptor) in descriptors.iter().enumerate() {
            if by_entity.insert(descriptor.name.clone(), idx).is_some() {
                return Err(SchemaBuildError::DuplicateEntity(descriptor.name.clone()));
            }
        }

        let mut by_root: HashMap<String, usize> = HashMap::new();
        let mut entities = Vec::with_capacity(descriptors.len());

        for (idx, descriptor) in descriptors.iter().enumerate() {
            let entity_type = build_entity_type(descriptor, &descriptors, &by_entity, &registry)?;

            if let Some(existing) = by_root.get(&entity_type.root_name) {
                return Err(SchemaBuildError::RootNameCollision {
                    root: entity_type.root_name.clone(),
                    first: descriptors[*existing].name.clone(),
                    second: descriptor.name.clone(),
                });
            }
            by_root.insert(entity_type.root_name.clone(), idx);
            entities.push(entity_type);
        }

        let schema = QuerySchema {
            name: name.into(),
            entities,
            by_entity,
            by_root,
            registry,
        };

        log::info!(
            "Built query schema '{}' with roots: {}",
            schema.name,
            schema.root_names().join(", ")
        );
        Ok(schema)
    }
}

fn build_entity_type(
    descriptor: &EntityDescriptor,
    all: &[EntityDescriptor],
    by_entity: &HashMap<String, usize>,
    registry: &ScalarRegistry,
) -> Result<EntityType, SchemaBuildError> {
    let Some(id_name) = descriptor.id_field.as_deref() else {
        return Err(SchemaBuildError::MissingIdentifier {
            entity: descriptor.name.clone(),
        });
    };

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(descriptor.fields.len());

    for field in &descriptor.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaBuildError::DuplicateField {
                entity: descriptor.name.clone(),
                field: field.name.clone(),
            });
        }

        let schema_field = match &field.kind {
            FieldKind::Scalar { value_class } => {
                let binding = registry.resolve(value_class).ok_or_else(|| {
                    SchemaBuildError::UnresolvedScalar {
                        entity: descriptor.name.clone(),
                        field: field.name.clone(),
                        value_class: value_class.clone(),
                    }
                })?;
                SchemaField {
                    descriptor: field.clone(),
                    output: OutputType::Scalar(binding.name.clone()),
                    criteria: CriteriaType::Scalar {
                        type_name: scalar_criteria_name(&binding.name),
                        operators: binding.operators(),
                    },
                    binding: Some(binding),
                }
            }
            FieldKind::ToOne { target, .. } | FieldKind::ToMany { target, .. } => {
                let Some(target_idx) = by_entity.get(target) else {
                    return Err(SchemaBuildError::UnknownAssociationTarget {
                        entity: descriptor.name.clone(),
                        field: field.name.clone(),
                        target: target.clone(),
                    });
                };
                let target_root = all[*target_idx].root_name();
                let output = if matches!(field.kind, FieldKind::ToMany { .. }) {
                    OutputType::List(target.clone())
                } else {
                    OutputType::Object(target.clone())
                };
                SchemaField {
                    descriptor: field.clone(),
                    binding: None,
                    output,
                    criteria: CriteriaType::Association {
                        type_name: criteria_type_name(&target_root),
                    },
                }
            }
        };
        fields.push(schema_field);
    }

    let id_index = fields
        .iter()
        .position(|f| f.name() == id_name)
        .ok_or_else(|| SchemaBuildError::MissingIdentifier {
            entity: descriptor.name.clone(),
        })?;
    if fields[id_index].binding.is_none() {
        return Err(SchemaBuildError::NonScalarIdentifier {
            entity: descriptor.name.clone(),
            field: id_name.to_string(),
        });
    }

    let root_name = descriptor.root_name();
    log::debug!(
        "Entity '{}' -> root '{}' ({} fields)",
        descriptor.name,
        root_name,
        fields.len()
    );

    Ok(EntityType {
        descriptor: descriptor.clone(),
        criteria_type_name: criteria_type_name(&root_name),
        root_name,
        fields,
        id_index,
    })
}
