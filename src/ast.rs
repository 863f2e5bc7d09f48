/// A node of the KyoML parse tree.
///
/// This is the contract between the grammar and the compiler core: the
/// in-crate parser produces it, and [`crate::compile_tree`] accepts trees
/// built by any other grammar engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Numeric(f64),
    Boolean(bool),
    /// Single-quoted string, never interpolated.
    RawString(String),
    /// Double-quoted string, may contain `${path}` tokens.
    ComplexString(String),
    /// `key { ... }` body. May contain directive entries.
    Block(Vec<Entry>),
    /// `{ "key": value }` literal. Never contains directives.
    Map(Vec<Entry>),
    Array(Vec<Node>),
    Directive(Directive),
    PipedValue(PipedValue),
}

/// A keyed member of a Block or Map.
///
/// Directive entries of a Block use the directive name as key.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub key: String,
    pub args: Vec<Node>,
}

/// A value followed by the directives it is piped through.
///
/// `directives` is always in application order, whichever pipe direction the
/// source used.
#[derive(Debug, Clone, PartialEq)]
pub struct PipedValue {
    pub raw: Box<Node>,
    pub directives: Vec<Directive>,
}

impl Node {
    /// Tag name of the node, as the grammar contract spells it.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Numeric(_) => "Numeric",
            Node::Boolean(_) => "Boolean",
            Node::RawString(_) => "RawString",
            Node::ComplexString(_) => "ComplexString",
            Node::Block(_) => "Block",
            Node::Map(_) => "Map",
            Node::Array(_) => "Array",
            Node::Directive(_) => "Directive",
            Node::PipedValue(_) => "PipedValue",
        }
    }

    pub fn as_entries(&self) -> Option<&[Entry]> {
        match self {
            Node::Block(entries) | Node::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl Entry {
    pub fn new(key: impl Into<String>, value: Node) -> Self {
        Self { key: key.into(), value }
    }

    /// Block entry holding a directive invocation.
    pub fn directive(directive: Directive) -> Self {
        Self {
            key: directive.key.clone(),
            value: Node::Directive(directive),
        }
    }
}

impl Directive {
    pub fn new(key: impl Into<String>, args: Vec<Node>) -> Self {
        Self { key: key.into(), args }
    }
}
