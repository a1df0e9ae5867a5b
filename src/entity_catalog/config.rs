/// Entity model configuration.
///
/// Entity models are defined in YAML:
///
/// ```yaml
/// database: library          # optional default database
/// entities:
///   - name: Author
///     table: author
///     id: id
///     fields:
///       - { name: id, type: Long }
///       - { name: name, type: String, column: author_name }
///     associations:
///       - { name: books, target: Book, kind: many, mapped_by: author_id }
///   - name: Book
///     table: book
///     id: id
///     fields:
///       - { name: id, type: Long }
///       - { name: title, type: String }
///     associations:
///       - { name: author, target: Author, kind: one, join_column: author_id }
/// ```
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::entity::{to_snake_case, EntityDescriptor};
use super::errors::EntityModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityModelConfig {
    #[serde(default)]
    pub database: Option<String>,
    pub entities: Vec<EntityDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    pub table: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub associations: Vec<AssociationDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub value_class: String,
    #[serde(default)]
    pub column: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    One,
    Many,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationDefinition {
    pub name: String,
    pub target: String,
    pub kind: AssociationKind,
    #[serde(default)]
    pub join_column: Option<String>,
    #[serde(default)]
    pub mapped_by: Option<String>,
}

impl EntityModelConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, EntityModelError> {
        let contents = fs::read_to_string(path).map_err(|e| EntityModelError::ConfigReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, EntityModelError> {
        serde_yaml::from_str(yaml).map_err(|e| EntityModelError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Structural checks that do not need scalar bindings
    pub fn validate(&self) -> Result<(), EntityModelError> {
        if self.entities.is_empty() {
            return Err(EntityModelError::InvalidConfig {
                message: "Entity model must contain at least one entity".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(&entity.name) {
                return Err(EntityModelError::InvalidConfig {
                    message: format!("Duplicate entity name: {}", entity.name),
                });
            }

            for assoc in &entity.associations {
                let column = match assoc.kind {
                    AssociationKind::One => &assoc.join_column,
                    AssociationKind::Many => &assoc.mapped_by,
                };
                if column.is_none() {
                    let expected = match assoc.kind {
                        AssociationKind::One => "join_column",
                        AssociationKind::Many => "mapped_by",
                    };
                    return Err(EntityModelError::invalid_entity(
                        &entity.name,
                        format!("association '{}' requires '{}'", assoc.name, expected),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn to_descriptors(&self) -> Result<Vec<EntityDescriptor>, EntityModelError> {
        self.validate()?;

        let mut descriptors = Vec::with_capacity(self.entities.len());
        for def in &self.entities {
            let mut entity = EntityDescriptor::new(&def.name, &def.table);
            entity.plural = def.plural.clone();
            entity.database = def.database.clone().or_else(|| self.database.clone());
            entity.id_field = def.id.clone();

            for field in &def.fields {
                let column = field
                    .column
                    .clone()
                    .unwrap_or_else(|| to_snake_case(&field.name));
                entity = entity.scalar_column(&field.name, &field.value_class, column);
            }

            for assoc in &def.associations {
                // validate() guarantees the column is present
                entity = match (assoc.kind, &assoc.join_column, &assoc.mapped_by) {
                    (AssociationKind::One, Some(join_column), _) => {
                        entity.to_one(&assoc.name, &assoc.target, join_column)
                    }
                    (AssociationKind::Many, _, Some(mapped_by)) => {
                        entity.to_many(&assoc.name, &assoc.target, mapped_by)
                    }
                    _ => entity,
                };
            }
            descriptors.push(entity);
        }

        log::info!("Loaded {} entity descriptors", descriptors.len());
        Ok(descriptors)
    }
}
