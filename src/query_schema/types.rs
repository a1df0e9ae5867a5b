use std::collections::HashMap;
use std::sync::Arc;

use crate::entity_catalog::{EntityDescriptor, FieldDescriptor, FieldKind};
use crate::scalars::{FilterOperator, ScalarBinding, ScalarRegistry};

/// Output type of an object field
#[derive(Debug, Clone, PartialEq)]
pub enum OutputType {
    Scalar(String),
    Object(String),
    List(String),
}

/// How a field can be filtered inside a `where` input object
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaType {
    /// `<Scalar>Criteria { EQ: .. LOCATE: .. }`
    Scalar {
        type_name: String,
        operators: Vec<FilterOperator>,
    },
    /// Nested criteria expression of the associated entity
    Association { type_name: String },
}

#[derive(Debug, Clone)]
pub struct SchemaField {
    pub descriptor: FieldDescriptor,
    pub binding: Option<Arc<ScalarBinding>>,
    pub output: OutputType,
    pub criteria: CriteriaType,
}

impl SchemaField {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Operators offered for this field; empty for associations
    pub fn operators(&self) -> &[FilterOperator] {
        match &self.criteria {
            CriteriaType::Scalar { operators, .. } => operators,
            CriteriaType::Association { .. } => &[],
        }
    }
}

/// One queryable entity: its root field, object type and where-input type.
#[derive(Debug, Clone)]
pub struct EntityType {
    pub descriptor: EntityDescriptor,
    pub root_name: String,
    pub criteria_type_name: String,
    pub fields: Vec<SchemaField>,
    pub(crate) id_index: usize,
}

impl EntityType {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn id_field(&self) -> &SchemaField {
        &self.fields[self.id_index]
    }

    pub fn scalar_fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields
            .iter()
            .filter(|f| matches!(f.descriptor.kind, FieldKind::Scalar { .. }))
    }
}

/// Query-capable graph schema built from the entity model.
///
/// Immutable once built; shared across concurrently executing requests.
#[derive(Debug, Clone)]
pub struct QuerySchema {
    pub(crate) name: String,
    pub(crate) entities: Vec<EntityType>,
    pub(crate) by_entity: HashMap<String, usize>,
    pub(crate) by_root: HashMap<String, usize>,
    pub(crate) registry: ScalarRegistry,
}

impl QuerySchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entities(&self) -> &[EntityType] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.by_entity.get(name).map(|idx| &self.entities[*idx])
    }

    /// Resolve a root query field (e.g. `JsonEntities`) to its entity
    pub fn root(&self, root_name: &str) -> Option<&EntityType> {
        self.by_root.get(root_name).map(|idx| &self.entities[*idx])
    }

    pub fn root_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.root_name.as_str()).collect()
    }

    pub fn registry(&self) -> &ScalarRegistry {
        &self.registry
    }
}
