use super::*;
use crate::ast::{Directive, PipedValue};

/// A value, optionally piped through directives in one direction.
///
/// Left pipes (`@b <| @a <| v`) are reversed so the stored chain is always in
/// application order.
pub(super) fn parse_value_expr(parser: &mut Parser) -> Result<Node, KyoError> {
    if parser.arguments > 0 {
        return parse_argument(parser);
    }

    if *parser.peek() == Token::At {
        return parse_left_pipe(parser);
    }

    let raw = value::parse_value(parser)?;
    let mut directives = Vec::new();

    while *parser.peek_past_newlines() == Token::PipeRight {
        parser.skip_newlines()?;
        parser.bump()?;
        parser.skip_newlines()?;
        directives.push(parse_directive(parser)?);
    }

    if *parser.peek_past_newlines() == Token::PipeLeft {
        return Err(mixed_pipe_error(parser));
    }

    Ok(piped(raw, directives))
}

fn parse_left_pipe(parser: &mut Parser) -> Result<Node, KyoError> {
    let mut directives = Vec::new();

    loop {
        directives.push(parse_directive(parser)?);

        if *parser.peek_past_newlines() != Token::PipeLeft {
            return Err(parser.unexpected(
                "Expected '<|' after directive in value position",
                "Pipe a value into the directive, e.g. `@double <| 4`",
                213,
            ));
        }
        parser.skip_newlines()?;
        parser.bump()?;
        parser.skip_newlines()?;

        if *parser.peek() != Token::At {
            break;
        }
    }

    let raw = value::parse_value(parser)?;

    if *parser.peek_past_newlines() == Token::PipeRight {
        return Err(mixed_pipe_error(parser));
    }

    directives.reverse();
    Ok(piped(raw, directives))
}

/// `@name` or `@name(arg, ...)`.
pub(super) fn parse_directive(parser: &mut Parser) -> Result<Directive, KyoError> {
    parser.expect(Token::At, "Directives start with '@'", 215)?;

    let key = match parser.peek() {
        Token::Ident(_) => match parser.bump()?.token {
            Token::Ident(name) => name,
            _ => unreachable!(),
        },
        _ => {
            return Err(parser.unexpected(
                "Expected directive name after '@'",
                "Directive names are identifiers, e.g. `@env`",
                216,
            ));
        }
    };

    let mut args = Vec::new();
    if *parser.peek() == Token::LParen {
        parser.bump()?;
        parser.skip_newlines()?;
        parser.arguments += 1;
        let parsed = parse_arguments(parser, &key, &mut args);
        parser.arguments -= 1;
        parsed?;
    }

    Ok(Directive::new(key, args))
}

fn parse_arguments(parser: &mut Parser, key: &str, args: &mut Vec<Node>) -> Result<(), KyoError> {
    if *parser.peek() == Token::RParen {
        parser.bump()?;
        return Ok(());
    }

    loop {
        args.push(parse_value_expr(parser)?);
        parser.skip_newlines()?;

        match parser.peek() {
            Token::Comma => {
                parser.bump()?;
                parser.skip_newlines()?;
                if *parser.peek() == Token::RParen {
                    parser.bump()?;
                    return Ok(());
                }
            }
            Token::RParen => {
                parser.bump()?;
                return Ok(());
            }
            _ => {
                return Err(parser.unexpected(
                    &format!("Expected ',' or ')' in arguments of @{}", key),
                    "Separate directive arguments with commas",
                    217,
                ));
            }
        }
    }
}

/// A directive argument: a plain value, never piped.
fn parse_argument(parser: &mut Parser) -> Result<Node, KyoError> {
    if *parser.peek() != Token::At {
        let value = value::parse_value(parser)?;
        if !matches!(parser.peek_past_newlines(), Token::PipeRight | Token::PipeLeft) {
            return Ok(value);
        }
    }

    Err(parser.unexpected(
        "Directive arguments cannot be piped",
        "Pipe the value into the directive instead, e.g. `value |> @a |> @b`",
        218,
    ))
}

fn piped(raw: Node, directives: Vec<Directive>) -> Node {
    if directives.is_empty() {
        raw
    } else {
        Node::PipedValue(PipedValue {
            raw: Box::new(raw),
            directives,
        })
    }
}

fn mixed_pipe_error(parser: &Parser) -> KyoError {
    parser.unexpected(
        "Cannot pipe a value in both directions",
        "Use either `value |> @a` or `@a <| value`, not both",
        214,
    )
}
