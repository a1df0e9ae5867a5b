use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, multispace1},
    combinator::{recognize, value},
    error::ParseError,
    multi::{many0, many0_count},
    sequence::{delimited, pair},
    IResult, Parser,
};

use super::errors::GraphQLParsingError;

// Whitespace, commas and `#` comments are insignificant between tokens
fn ignored<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, (), E> {
    value(
        (),
        many0_count(alt((
            value((), multispace1),
            value((), char(',')),
            value((), pair(char('#'), take_while(|c| c != '\n'))),
        ))),
    )
    .parse(input)
}

pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(ignored, inner, ignored)
}

/// A single punctuation character surrounded by ignored tokens.
pub fn punct<'a>(
    c: char,
) -> impl Parser<&'a str, Output = char, Error = GraphQLParsingError<'a>> {
    ws(char(c))
}

/// Maximum nesting of list/object values, and separately of selection sets.
/// Each level is a recursive descent, so a cap keeps adversarial documents
/// like `[[[[...]]]]` from overflowing the stack.
pub const MAX_NESTING_DEPTH: usize = 64;

pub fn check_depth(input: &str, depth: usize) -> Result<(), nom::Err<GraphQLParsingError<'_>>> {
    if depth > MAX_NESTING_DEPTH {
        return Err(nom::Err::Failure(GraphQLParsingError::new(
            input,
            "Nesting too deep",
        )));
    }
    Ok(())
}

/// GraphQL name: `[_A-Za-z][_0-9A-Za-z]*`
pub fn parse_name(input: &str) -> IResult<&str, &str, GraphQLParsingError<'_>> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}
