use crate::ast::Node;
use crate::lexer::{Lexer, Spanned, Token};
use crate::KyoError;

mod block;
mod pipe;
mod value;

/// Recursive-descent parser turning KyoML text into a [`Node::Block`] tree.
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Depth of directive argument lists being parsed. Pipes are not allowed there.
    arguments: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, KyoError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            arguments: 0,
        })
    }

    /// Parse the whole input as the root block.
    pub fn parse_document(&mut self) -> Result<Node, KyoError> {
        block::parse_document(self)
    }

    pub(crate) fn bump(&mut self) -> Result<Spanned, KyoError> {
        let curr = self.tokens.get(self.pos).cloned().ok_or_else(|| {
            KyoError::syntax("Unexpected end of input", self.line(), self.column(), None, 201)
        })?;
        if curr.token != Token::Eof {
            self.pos += 1;
        }
        Ok(curr)
    }

    pub(crate) fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .or_else(|| self.tokens.last())
            .map_or(&Token::Eof, |s| &s.token)
    }

    /// First token after any run of newlines, without consuming anything.
    pub(crate) fn peek_past_newlines(&self) -> &Token {
        let mut offset = 0;
        while *self.peek_at(offset) == Token::Newline {
            offset += 1;
        }
        self.peek_at(offset)
    }

    pub(crate) fn skip_newlines(&mut self) -> Result<(), KyoError> {
        while *self.peek() == Token::Newline {
            self.bump()?;
        }
        Ok(())
    }

    pub(crate) fn expect(&mut self, expected: Token, hint: &str, code: u32) -> Result<Spanned, KyoError> {
        if *self.peek() != expected {
            return Err(self.unexpected(&format!("Expected {:?}", expected), hint, code));
        }
        self.bump()
    }

    pub(crate) fn unexpected(&self, context: &str, hint: &str, code: u32) -> KyoError {
        KyoError::syntax(
            format!("{}, got {:?}", context, self.peek()),
            self.line(),
            self.column(),
            Some(hint),
            code,
        )
    }

    pub(crate) fn line(&self) -> usize {
        self.current().map_or(0, |s| s.line)
    }

    pub(crate) fn column(&self) -> usize {
        self.current().map_or(0, |s| s.column)
    }

    fn current(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos).or_else(|| self.tokens.last())
    }
}

/// Parse KyoML text into its parse tree.
pub fn parse(input: &str) -> Result<Node, KyoError> {
    Parser::new(input)?.parse_document()
}
