use super::*;
use crate::ast::Entry;

pub(super) fn parse_value(parser: &mut Parser) -> Result<Node, KyoError> {
    match parser.peek() {
        Token::LBracket => parse_array_value(parser),
        Token::LBrace => parse_map_value(parser),
        Token::RawString(_) | Token::ComplexString(_) | Token::Number(_) | Token::Bool(_) => {
            match parser.bump()?.token {
                Token::RawString(s) => Ok(Node::RawString(s)),
                Token::ComplexString(s) => Ok(Node::ComplexString(s)),
                Token::Number(n) => Ok(Node::Numeric(n)),
                Token::Bool(b) => Ok(Node::Boolean(b)),
                _ => unreachable!(),
            }
        }
        _ => Err(parser.unexpected(
            "Expected a value",
            "Values are strings, numbers, booleans, arrays or maps",
            210,
        )),
    }
}

fn parse_array_value(parser: &mut Parser) -> Result<Node, KyoError> {
    parser.bump()?; // consume [
    parser.skip_newlines()?;

    let mut items = Vec::new();
    if *parser.peek() == Token::RBracket {
        parser.bump()?;
        return Ok(Node::Array(items));
    }

    loop {
        items.push(pipe::parse_value_expr(parser)?);
        parser.skip_newlines()?;

        match parser.peek() {
            Token::Comma => {
                parser.bump()?;
                parser.skip_newlines()?;
                if *parser.peek() == Token::RBracket {
                    parser.bump()?;
                    break;
                }
            }
            Token::RBracket => {
                parser.bump()?;
                break;
            }
            _ => {
                return Err(parser.unexpected(
                    "Expected ',' or ']' in array",
                    "Separate array items with commas",
                    209,
                ));
            }
        }
    }

    Ok(Node::Array(items))
}

fn parse_map_value(parser: &mut Parser) -> Result<Node, KyoError> {
    parser.bump()?; // consume {
    parser.skip_newlines()?;

    let mut entries = Vec::new();
    if *parser.peek() == Token::RBrace {
        parser.bump()?;
        return Ok(Node::Map(entries));
    }

    loop {
        let key = match parser.peek() {
            Token::RawString(_) | Token::ComplexString(_) => match parser.bump()?.token {
                Token::RawString(k) | Token::ComplexString(k) => k,
                _ => unreachable!(),
            },
            _ => {
                return Err(parser.unexpected(
                    "Expected a quoted key in map",
                    "Map keys are quoted strings, e.g. { \"key\": 1 }",
                    211,
                ));
            }
        };

        parser.skip_newlines()?;
        parser.expect(Token::Colon, "Maps use ':' between keys and values", 211)?;
        parser.skip_newlines()?;

        let value = pipe::parse_value_expr(parser)?;
        entries.push(Entry::new(key, value));
        parser.skip_newlines()?;

        match parser.peek() {
            Token::Comma => {
                parser.bump()?;
                parser.skip_newlines()?;
                if *parser.peek() == Token::RBrace {
                    parser.bump()?;
                    break;
                }
            }
            Token::RBrace => {
                parser.bump()?;
                break;
            }
            _ => {
                return Err(parser.unexpected(
                    "Expected ',' or '}' in map",
                    "Separate map entries with commas",
                    212,
                ));
            }
        }
    }

    Ok(Node::Map(entries))
}
