use super::*;
use crate::ast::Entry;

pub(super) fn parse_document(parser: &mut Parser) -> Result<Node, KyoError> {
    let entries = parse_block_body(parser, &Token::Eof)?;
    Ok(Node::Block(entries))
}

/// Statements up to (not including) `closing`.
pub(super) fn parse_block_body(parser: &mut Parser, closing: &Token) -> Result<Vec<Entry>, KyoError> {
    let mut entries = Vec::new();

    loop {
        parser.skip_newlines()?;

        let tok = parser.peek();
        if tok == closing {
            break;
        }
        if *tok == Token::Eof {
            return Err(KyoError::syntax(
                "Unexpected end of input inside block",
                parser.line(),
                parser.column(),
                Some("Close the block with '}'"),
                206,
            ));
        }

        entries.push(parse_statement(parser)?);
        parse_terminator(parser, closing)?;
    }

    Ok(entries)
}

fn parse_statement(parser: &mut Parser) -> Result<Entry, KyoError> {
    let key = match parser.peek() {
        Token::At => {
            let directive = pipe::parse_directive(parser)?;
            return Ok(Entry::directive(directive));
        }
        Token::Ident(_) | Token::RawString(_) | Token::ComplexString(_) => {
            match parser.bump()?.token {
                Token::Ident(k) | Token::RawString(k) | Token::ComplexString(k) => k,
                _ => unreachable!(),
            }
        }
        _ => {
            return Err(parser.unexpected(
                "Expected a key or a directive",
                "Block statements are `key = value`, `key { ... }` or `@directive`",
                205,
            ));
        }
    };

    match parser.peek() {
        Token::Equals => {
            parser.bump()?;
            parser.skip_newlines()?;
            let value = pipe::parse_value_expr(parser)?;
            Ok(Entry::new(key, value))
        }
        Token::LBrace => {
            parser.bump()?;
            let body = parse_block_body(parser, &Token::RBrace)?;
            parser.expect(Token::RBrace, "Close the block with '}'", 206)?;
            Ok(Entry::new(key, Node::Block(body)))
        }
        _ => Err(parser.unexpected(
            &format!("Expected '=' or '{{' after key '{}'", key),
            "Assign with `key = value` or open a sub-block with `key {`",
            207,
        )),
    }
}

/// A statement ends with an optional comma, then a line break or the end of its block.
fn parse_terminator(parser: &mut Parser, closing: &Token) -> Result<(), KyoError> {
    if *parser.peek() == Token::Comma {
        parser.bump()?;
    }

    match parser.peek() {
        Token::Newline | Token::Eof => Ok(()),
        tok if tok == closing => Ok(()),
        _ => Err(parser.unexpected(
            "Expected a line break after statement",
            "Each key/value pair and sub-block must end with a line break",
            208,
        )),
    }
}
