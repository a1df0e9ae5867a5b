//! Parser for the query document grammar: a `query` operation (or `{ ... }`
//! shorthand) whose root fields take a `where` argument and expose a `select`
//! projection, with optional `$variable` definitions.

use errors::GraphQLParsingError;

pub mod ast;
mod common;
pub mod errors;
mod operation;
mod selection;
mod value;

pub use ast::Document;

/// Parse a complete query document; all input must be consumed.
pub fn parse_document(input: &'_ str) -> Result<Document<'_>, GraphQLParsingError<'_>> {
    match operation::parse_operation(input) {
        Ok((remainder, operation)) => {
            let trimmed = remainder.trim();
            if !trimmed.is_empty() {
                return Err(GraphQLParsingError {
                    errors: vec![
                        (remainder, "Unexpected tokens after query"),
                        (trimmed, "Unparsed input"),
                    ],
                });
            }
            Ok(Document { operation })
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
        Err(nom::Err::Incomplete(_)) => Err(GraphQLParsingError::new(input, "Incomplete input")),
    }
}
