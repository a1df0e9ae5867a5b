use nom::error::{ContextError, ParseError};
use std::fmt;

#[derive(Debug, PartialEq)]
pub struct GraphQLParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> GraphQLParsingError<'a> {
    pub fn new(input: &'a str, message: &'static str) -> Self {
        GraphQLParsingError {
            errors: vec![(input, message)],
        }
    }

    /// Human readable message with the line and column of the innermost failure.
    pub fn describe(&self, source: &str) -> String {
        let Some((input, ctx)) = self
            .errors
            .iter()
            .find(|(_, ctx)| !ctx.starts_with("unknown error"))
            .or(self.errors.first())
        else {
            return "Syntax error".to_string();
        };
        let offset = source.len().saturating_sub(input.len());
        let consumed = &source[..offset.min(source.len())];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        let near: String = input.chars().take(20).collect();
        if near.trim().is_empty() {
            format!("{} at line {}, column {} (end of input)", ctx, line, column)
        } else {
            format!("{} at line {}, column {} near '{}'", ctx, line, column, near.trim())
        }
    }
}

impl<'a> ParseError<&'a str> for GraphQLParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        GraphQLParsingError {
            errors: vec![(input, "unknown error")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unknown error (appended)"));
        other
    }
}

impl<'a> ContextError<&'a str> for GraphQLParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for GraphQLParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {:}", ctx, input)?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for GraphQLParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        GraphQLParsingError {
            errors: vec![(err.input, "Unable to parse")],
        }
    }
}
