use super::*;
use super::scanner::{bump, peek_second, skip_whitespace_and_comments};

pub(super) fn next_token(lexer: &mut Lexer) -> Result<Spanned, KyoError> {
    skip_whitespace_and_comments(lexer);

    let line = lexer.line;
    let column = lexer.column + 1;

    let token = match lexer.peek {
        Some('\n') => tokenize_symbol(lexer, Token::Newline),
        Some('=') => tokenize_symbol(lexer, Token::Equals),
        Some(':') => tokenize_symbol(lexer, Token::Colon),
        Some(',') => tokenize_symbol(lexer, Token::Comma),
        Some('{') => tokenize_symbol(lexer, Token::LBrace),
        Some('}') => tokenize_symbol(lexer, Token::RBrace),
        Some('[') => tokenize_symbol(lexer, Token::LBracket),
        Some(']') => tokenize_symbol(lexer, Token::RBracket),
        Some('(') => tokenize_symbol(lexer, Token::LParen),
        Some(')') => tokenize_symbol(lexer, Token::RParen),
        Some('@') => tokenize_symbol(lexer, Token::At),
        Some('|') => tokenize_pipe(lexer, '|', '>', Token::PipeRight),
        Some('<') => tokenize_pipe(lexer, '<', '|', Token::PipeLeft),
        Some('"') | Some('\'') => tokenize_string(lexer),
        Some(c) if c.is_ascii_digit() => tokenize_number(lexer),
        Some('.') | Some('-') if starts_number(lexer) => tokenize_number(lexer),
        Some(c) if c.is_alphabetic() || c == '_' => tokenize_identifier_or_keyword(lexer),
        Some(ch) => tokenize_unexpected_char(lexer, ch),
        None => Ok(Token::Eof),
    }?;

    Ok(Spanned { token, line, column })
}

fn tokenize_symbol(lexer: &mut Lexer, token: Token) -> Result<Token, KyoError> {
    bump(lexer);
    Ok(token)
}

fn tokenize_pipe(lexer: &mut Lexer, first: char, second: char, token: Token) -> Result<Token, KyoError> {
    if peek_second(lexer) != Some(second) {
        return tokenize_unexpected_char(lexer, first);
    }
    bump(lexer);
    bump(lexer);
    Ok(token)
}

fn starts_number(lexer: &Lexer) -> bool {
    match (lexer.peek, peek_second(lexer)) {
        (Some('.'), Some(next)) => next.is_ascii_digit(),
        (Some('-'), Some(next)) => next.is_ascii_digit() || next == '.',
        _ => false,
    }
}

fn tokenize_string(lexer: &mut Lexer) -> Result<Token, KyoError> {
    let line = lexer.line;
    let column = lexer.column + 1;
    let Some(quote) = bump(lexer) else {
        return Ok(Token::Eof);
    };
    let mut content = String::new();
    let mut closed = false;

    while let Some(ch) = lexer.peek {
        if ch == quote {
            bump(lexer); // consume the closing quote
            closed = true;
            break;
        }

        if ch == '\\' {
            bump(lexer); // consume '\'
            if let Some(next_ch) = bump(lexer) {
                let escaped = match next_ch {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                };
                content.push(escaped);
            } else {
                break;
            }
        } else {
            content.push(ch);
            bump(lexer);
        }
    }

    if !closed {
        return Err(KyoError::syntax(
            format!("Unclosed string starting with {}", quote),
            line,
            column,
            Some("String literal not closed"),
            103,
        ));
    }

    if quote == '"' {
        Ok(Token::ComplexString(content))
    } else {
        Ok(Token::RawString(content))
    }
}

fn tokenize_number(lexer: &mut Lexer) -> Result<Token, KyoError> {
    let line = lexer.line;
    let column = lexer.column + 1;
    let mut num = String::new();

    if lexer.peek == Some('-') {
        num.push('-');
        bump(lexer);
    }

    while let Some(ch) = lexer.peek {
        if ch.is_ascii_digit() || ch == '.' {
            num.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    num.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| KyoError::syntax(
            format!("Invalid number '{}'", num),
            line,
            column,
            Some("Numbers use a single '.' as decimal separator"),
            102,
        ))
}

fn tokenize_identifier_or_keyword(lexer: &mut Lexer) -> Result<Token, KyoError> {
    let mut ident = String::new();

    while let Some(ch) = lexer.peek {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            ident.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    let token = match ident.as_str() {
        "true" | "yes" => Token::Bool(true),
        "false" | "no" => Token::Bool(false),
        _ => Token::Ident(ident),
    };

    Ok(token)
}

fn tokenize_unexpected_char(lexer: &mut Lexer, ch: char) -> Result<Token, KyoError> {
    let line = lexer.line;
    let column = lexer.column + 1;
    bump(lexer);
    Err(KyoError::syntax(
        format!("Unexpected character '{}'", ch),
        line,
        column,
        Some("Unexpected character in input"),
        104,
    ))
}
