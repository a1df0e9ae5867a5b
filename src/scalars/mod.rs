//! Scalar coercion: per-type encode/decode/compare contracts and the
//! registry that resolves them by value class.

pub mod coercing;
pub mod operators;
pub mod registry;

pub use coercing::{Coercing, CoercingError, ObjectCoercing, ScalarKind, StorageRepr};
pub use operators::FilterOperator;
pub use registry::{global_registry, register, ScalarBinding, ScalarRegistry};
