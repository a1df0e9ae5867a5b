use thiserror::Error;

/// Failures while turning the entity model into a query schema. These are
/// bootstrap errors: the entity model itself is malformed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaBuildError {
    #[error("Entity '{entity}' has no identifier field")]
    MissingIdentifier { entity: String },
    #[error("Identifier '{field}' of entity '{entity}' must be a scalar field")]
    NonScalarIdentifier { entity: String, field: String },
    #[error("Field '{entity}.{field}' has type '{value_class}' with no registered scalar binding")]
    UnresolvedScalar {
        entity: String,
        field: String,
        value_class: String,
    },
    #[error("Root field '{root}' is produced by both '{first}' and '{second}'")]
    RootNameCollision {
        root: String,
        first: String,
        second: String,
    },
    #[error("Association '{entity}.{field}' targets unknown entity '{target}'")]
    UnknownAssociationTarget {
        entity: String,
        field: String,
        target: String,
    },
    #[error("Field '{field}' is declared more than once on entity '{entity}'")]
    DuplicateField { entity: String, field: String },
    #[error("Entity '{0}' is declared more than once")]
    DuplicateEntity(String),
    #[error("Schema contains no entities")]
    EmptySchema,
}
