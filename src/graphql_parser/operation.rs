use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, satisfy},
    combinator::{cut, not, opt},
    error::context,
    multi::many1,
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

use super::ast::{OperationDefinition, TypeRef, VariableDefinition};
use super::common::{check_depth, parse_name, punct, ws};
use super::errors::GraphQLParsingError;
use super::selection::parse_selection_set;
use super::value::parse_value;

type PResult<'a, O> = IResult<&'a str, O, GraphQLParsingError<'a>>;

fn parse_list_type(input: &str, depth: usize) -> PResult<'_, TypeRef<'_>> {
    let (rest, _) = punct('[').parse(input)?;
    check_depth(input, depth + 1)?;
    let (rest, inner) = terminated(
        |i| parse_type_ref_at(i, depth + 1),
        context("Expected ']' in list type", cut(ws(char(']')))),
    )
    .parse(rest)?;
    Ok((rest, TypeRef::List(Box::new(inner))))
}

fn parse_named_type(input: &str) -> PResult<'_, TypeRef<'_>> {
    let (input, name) = ws(parse_name).parse(input)?;
    Ok((input, TypeRef::Named(name)))
}

/// `Name`, `[Type]`, `Type!`
pub fn parse_type_ref(input: &str) -> PResult<'_, TypeRef<'_>> {
    parse_type_ref_at(input, 0)
}

fn parse_type_ref_at(input: &str, depth: usize) -> PResult<'_, TypeRef<'_>> {
    let (input, base) = alt((|i| parse_list_type(i, depth), parse_named_type)).parse(input)?;

    let (input, bang) = opt(ws(char('!'))).parse(input)?;
    let type_ref = match bang {
        Some(_) => TypeRef::NonNull(Box::new(base)),
        None => base,
    };
    Ok((input, type_ref))
}

fn parse_variable_definition(input: &str) -> PResult<'_, VariableDefinition<'_>> {
    let (input, name) = ws(preceded(char('$'), cut(parse_name))).parse(input)?;
    let (input, _) = context("Expected ':' after variable name", cut(ws(char(':')))).parse(input)?;
    let (input, var_type) = context("Expected variable type", cut(parse_type_ref)).parse(input)?;
    let (input, default_value) =
        opt(preceded(ws(char('=')), context("Expected default value", cut(parse_value))))
            .parse(input)?;

    Ok((
        input,
        VariableDefinition {
            name,
            var_type,
            default_value,
        },
    ))
}

fn parse_variable_definitions(input: &str) -> PResult<'_, Vec<VariableDefinition<'_>>> {
    delimited(
        ws(char('(')),
        many1(parse_variable_definition),
        context("Expected ')' after variable definitions", cut(ws(char(')')))),
    )
    .parse(input)
}

fn keyword<'a>(
    word: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = GraphQLParsingError<'a>> {
    // keyword must not run into a longer name (`queryX`)
    ws(terminated(
        tag(word),
        not(satisfy(|c: char| c.is_alphanumeric() || c == '_')),
    ))
}

/// `query Name($v: T) { ... }` or the `{ ... }` shorthand.
pub fn parse_operation(input: &str) -> PResult<'_, OperationDefinition<'_>> {
    if alt((keyword("mutation"), keyword("subscription")))
        .parse(input)
        .is_ok()
    {
        return Err(nom::Err::Failure(GraphQLParsingError::new(
            input,
            "Only query operations are supported",
        )));
    }

    let (input, is_named_form) = opt(keyword("query")).parse(input)?;

    let (input, name, variable_definitions) = if is_named_form.is_some() {
        let (input, name) = opt(ws(parse_name)).parse(input)?;
        let (input, defs) = opt(parse_variable_definitions).parse(input)?;
        (input, name, defs.unwrap_or_default())
    } else {
        (input, None, Vec::new())
    };

    let (input, selection_set) =
        context("Expected selection set", cut(parse_selection_set)).parse(input)?;

    Ok((
        input,
        OperationDefinition {
            name,
            variable_definitions,
            selection_set,
        },
    ))
}
