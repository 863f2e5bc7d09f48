// Author: Dustin Pilgrim
// License: MIT

use std::str::Chars;
use crate::KyoError;

mod scanner;
mod tokenizer;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- literals ---
    Ident(String),
    /// `'...'`
    RawString(String),
    /// `"..."`
    ComplexString(String),
    Number(f64),
    Bool(bool),

    // --- structure ---
    Equals,
    Colon,
    Comma,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,

    // --- directives ---
    At,
    PipeRight,
    PipeLeft,

    // --- layout ---
    Newline,
    Eof,
}

/// A token with the position it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer<'a> {
    input: Chars<'a>,
    peek: Option<char>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer {
            input: input.chars(),
            peek: None,
            line: 1,
            column: 0,
        };
        lexer.peek = lexer.input.next();
        lexer
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Next token. Newlines are significant and always reported.
    pub fn next_token(&mut self) -> Result<Spanned, KyoError> {
        tokenizer::next_token(self)
    }

    /// Tokenize the whole input, `Eof` included.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, KyoError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }
}
