//! Schema Builder: maps the entity model to a query-capable graph schema.

mod builder;
pub mod errors;
mod sdl;
pub mod types;

pub use errors::SchemaBuildError;
pub use types::{CriteriaType, EntityType, OutputType, QuerySchema, SchemaField};
