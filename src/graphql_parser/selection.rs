use nom::{
    character::complete::char,
    combinator::{cut, opt},
    error::context,
    multi::many1,
    sequence::{delimited, preceded, separated_pair},
    IResult, Parser,
};

use super::ast::{Field, Value};
use super::common::{check_depth, parse_name, punct, ws};
use super::errors::GraphQLParsingError;
use super::value::parse_value;

fn parse_argument(input: &str) -> IResult<&str, (&str, Value<'_>), GraphQLParsingError<'_>> {
    separated_pair(
        ws(parse_name),
        context("Expected ':' after argument name", cut(ws(char(':')))),
        context("Expected argument value", cut(parse_value)),
    )
    .parse(input)
}

fn parse_arguments(input: &str) -> IResult<&str, Vec<(&str, Value<'_>)>, GraphQLParsingError<'_>> {
    delimited(
        ws(char('(')),
        many1(parse_argument),
        context("Expected ')' to close arguments", cut(ws(char(')')))),
    )
    .parse(input)
}

/// `{ field field(arg: value) alias: field { ... } }`
pub fn parse_selection_set(input: &str) -> IResult<&str, Vec<Field<'_>>, GraphQLParsingError<'_>> {
    parse_selection_set_at(input, 0)
}

fn parse_selection_set_at(
    input: &str,
    depth: usize,
) -> IResult<&str, Vec<Field<'_>>, GraphQLParsingError<'_>> {
    let (rest, _) = punct('{').parse(input)?;
    check_depth(input, depth + 1)?;
    cut((
        context(
            "Selection set must contain at least one field",
            many1(|i| parse_field_at(i, depth + 1)),
        ),
        context("Expected '}' to close selection set", ws(char('}'))),
    ))
    .map(|(fields, _)| fields)
    .parse(rest)
}

pub fn parse_field(input: &str) -> IResult<&str, Field<'_>, GraphQLParsingError<'_>> {
    parse_field_at(input, 0)
}

fn parse_field_at(input: &str, depth: usize) -> IResult<&str, Field<'_>, GraphQLParsingError<'_>> {
    let (input, first) = ws(parse_name).parse(input)?;
    let (input, aliased) = opt(preceded(ws(char(':')), cut(ws(parse_name)))).parse(input)?;

    let (alias, name) = match aliased {
        Some(name) => (Some(first), name),
        None => (None, first),
    };

    let (input, arguments) = opt(parse_arguments).parse(input)?;
    let (input, selection_set) = opt(|i| parse_selection_set_at(i, depth)).parse(input)?;

    Ok((
        input,
        Field {
            alias,
            name,
            arguments: arguments.unwrap_or_default(),
            selection_set: selection_set.unwrap_or_default(),
        },
    ))
}
