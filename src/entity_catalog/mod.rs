pub mod config;
pub mod entity;
pub mod errors;

pub use config::EntityModelConfig;
pub use entity::{EntityDescriptor, FieldDescriptor, FieldKind};
pub use errors::EntityModelError;
