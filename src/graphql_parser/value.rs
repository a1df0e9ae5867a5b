use nom::{
    branch::alt,
    character::complete::{char, digit1, one_of},
    combinator::{cut, map, opt, recognize},
    error::context,
    multi::many0,
    sequence::{pair, preceded, separated_pair},
    IResult, Parser,
};

use super::ast::Value;
use super::common::{check_depth, parse_name, punct, ws};
use super::errors::GraphQLParsingError;

type PResult<'a, O> = IResult<&'a str, O, GraphQLParsingError<'a>>;

pub fn parse_value(input: &str) -> PResult<'_, Value<'_>> {
    parse_value_at(input, 0)
}

fn parse_value_at(input: &str, depth: usize) -> PResult<'_, Value<'_>> {
    ws(alt((
        parse_variable,
        map(parse_string_literal, Value::String),
        parse_number,
        |i| parse_list(i, depth),
        |i| parse_object(i, depth),
        parse_keyword_or_enum,
    )))
    .parse(input)
}

pub fn parse_variable(input: &str) -> PResult<'_, Value<'_>> {
    map(preceded(char('$'), cut(parse_name)), Value::Variable).parse(input)
}

fn parse_keyword_or_enum(input: &str) -> PResult<'_, Value<'_>> {
    let (rest, name) = parse_name(input)?;
    let value = match name {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "null" => Value::Null,
        other => Value::Enum(other),
    };
    Ok((rest, value))
}

/// Int or Float: `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn parse_number(input: &str) -> PResult<'_, Value<'_>> {
    let (rest, text) = recognize((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)?;

    if text.contains(['.', 'e', 'E']) {
        match text.parse::<f64>() {
            Ok(f) => Ok((rest, Value::Float(f))),
            Err(_) => Err(nom::Err::Failure(GraphQLParsingError::new(
                input,
                "Invalid float literal",
            ))),
        }
    } else {
        match text.parse::<i64>() {
            Ok(i) => Ok((rest, Value::Int(i))),
            Err(_) => Err(nom::Err::Failure(GraphQLParsingError::new(
                input,
                "Integer literal out of range",
            ))),
        }
    }
}

fn parse_list(input: &str, depth: usize) -> PResult<'_, Value<'_>> {
    let (inner, _) = punct('[').parse(input)?;
    check_depth(input, depth + 1)?;
    map(
        cut(context(
            "Unterminated list value",
            (many0(|i| parse_value_at(i, depth + 1)), ws(char(']'))),
        )),
        |(values, _)| Value::List(values),
    )
    .parse(inner)
}

fn parse_object_field(input: &str, depth: usize) -> PResult<'_, (&str, Value<'_>)> {
    separated_pair(
        ws(parse_name),
        context("Expected ':' after object field name", cut(ws(char(':')))),
        context("Expected value", cut(|i| parse_value_at(i, depth))),
    )
    .parse(input)
}

fn parse_object(input: &str, depth: usize) -> PResult<'_, Value<'_>> {
    let (inner, _) = punct('{').parse(input)?;
    check_depth(input, depth + 1)?;
    map(
        pair(
            many0(|i| parse_object_field(i, depth + 1)),
            context("Unterminated object value", cut(ws(char('}')))),
        ),
        |(fields, _)| Value::Object(fields),
    )
    .parse(inner)
}

/// Double-quoted string with JSON-style escapes.
pub fn parse_string_literal(input: &str) -> PResult<'_, String> {
    let Some(body) = input.strip_prefix('"') else {
        return Err(nom::Err::Error(GraphQLParsingError::new(
            input,
            "Expected string literal",
        )));
    };

    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => return Ok((&body[idx + 1..], out)),
            '\n' => break,
            '\\' => {
                let escaped = chars.next().map(|(_, c)| c);
                match escaped {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('/') => out.push('/'),
                    Some('b') => out.push('\u{0008}'),
                    Some('f') => out.push('\u{000C}'),
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some('u') => {
                        let hex: String = (0..4).filter_map(|_| chars.next().map(|(_, c)| c)).collect();
                        let decoded = u32::from_str_radix(&hex, 16)
                            .ok()
                            .filter(|_| hex.len() == 4)
                            .and_then(char::from_u32);
                        match decoded {
                            Some(c) => out.push(c),
                            None => {
                                return Err(nom::Err::Failure(GraphQLParsingError::new(
                                    &body[idx..],
                                    "Invalid unicode escape",
                                )))
                            }
                        }
                    }
                    _ => {
                        return Err(nom::Err::Failure(GraphQLParsingError::new(
                            &body[idx..],
                            "Invalid escape sequence",
                        )))
                    }
                }
            }
            c => out.push(c),
        }
    }

    Err(nom::Err::Failure(GraphQLParsingError::new(
        input,
        "Unterminated string literal",
    )))
}
