use thiserror::Error;

/// Per-request failures detected before anything reaches the store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("Unknown root field '{0}'")]
    UnknownRootField(String),
    #[error("Unknown field '{field}' on entity '{entity}'")]
    UnknownField { entity: String, field: String },
    #[error("Variable '${0}' is not defined")]
    UnboundVariable(String),
    #[error("Operator '{operator}' is not supported for field '{field}' of type '{scalar}'")]
    UnsupportedOperator {
        field: String,
        operator: String,
        scalar: String,
    },
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    #[error("Response key '{0}' is used by more than one root field")]
    DuplicateResponseKey(String),
    #[error("Unknown argument '{argument}' on field '{field}'")]
    UnknownArgument { field: String, argument: String },
}
