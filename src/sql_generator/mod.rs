//! ClickHouse SQL rendering of compiled queries.

use crate::render_plan::CompiledQuery;

pub mod parameter_substitution;
mod to_sql;

pub use parameter_substitution::{substitute_parameters, ParameterSubstitutionError};
pub use to_sql::ToSql;

/// SQL with every parameter inlined as an escaped literal.
pub fn generate_sql(query: &CompiledQuery) -> Result<String, ParameterSubstitutionError> {
    let template = query.to_sql();
    log::debug!("SQL template:\n{}", template);
    substitute_parameters(&template, &query.parameters)
}
