//! KyoML: a configuration language that compiles to a JSON-like document.
//!
//! Host code hooks into a compile with directives (`@name(args)`) that rewrite
//! the node they are attached to, and with mappers that map a piped value.
//! Double-quoted strings may reference other parts of the document with
//! `${path}` tokens.
//!
//! ```
//! use kyoml::{CompileOptions, Registry, Value};
//!
//! let text = r#"
//! name = 'kyo'
//! greeting = "hello ${name}" |> @upper
//! "#;
//!
//! let options = CompileOptions::new()
//!     .mapper("upper", |v, _| Ok(Value::from(v.to_string().to_uppercase())));
//!
//! let doc = kyoml::compile(text, options).unwrap();
//! assert_eq!(doc.get_as::<String>("greeting").unwrap(), "HELLO KYO");
//! ```

pub mod ast;
pub mod compiler;
pub mod config;
pub mod error;
pub mod export;
pub mod handler;
pub mod interpolate;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod pathref;
pub mod scheduler;
pub mod utils;
pub mod value;

use std::fs;
use std::path::Path;

pub use ast::Node;
pub use compiler::Compiler;
pub use config::{register_plugin, CompileOptions, CompilerConfig, Plugin, Plugins};
pub use error::KyoError;
pub use handler::{DirectiveHandler, Handlers, Mapped, MapperHandler, Outcome, Registry};
pub use interpolate::InterpolatedString;
pub use pathref::{NodeHandle, PathRef};
pub use value::Value;

/// Compile KyoML text synchronously.
///
/// # Errors
/// Configuration errors are reported before the text is parsed. Any handler
/// returning a pending result fails with `AsyncMisuse`, even when
/// `options.asynchronous` is set. Use [`compile_async`] for such handlers.
pub fn compile(text: &str, options: CompileOptions) -> Result<Value, KyoError> {
    Compiler::new(options)?.compile(text)
}

/// Compile KyoML text, awaiting asynchronous handlers one after the other.
///
/// Async mode is switched on regardless of `options.asynchronous`.
pub async fn compile_async(text: &str, options: CompileOptions) -> Result<Value, KyoError> {
    Compiler::new(options.asynchronous(true))?.compile_async(text).await
}

/// Compile a parse tree built by another grammar engine.
pub fn compile_tree(tree: &Node, options: CompileOptions) -> Result<Value, KyoError> {
    Compiler::new(options)?.compile_tree(tree)
}

/// Read and compile a KyoML file. A leading `~/` is expanded to the home directory.
pub fn compile_file<P: AsRef<Path>>(path: P, options: CompileOptions) -> Result<Value, KyoError> {
    let path = path.as_ref();
    let path = match path.to_str() {
        Some(s) => utils::expand_home(s)?,
        None => path.to_path_buf(),
    };

    let text = fs::read_to_string(&path).map_err(|e| KyoError::File {
        path: path.display().to_string(),
        message: format!("Failed to read file: {}", e),
    })?;

    compile(&text, options)
}

/// Parse KyoML text into its parse tree without compiling it.
pub fn parse(text: &str) -> Result<Node, KyoError> {
    parser::parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_compile_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("app.kyo");
        fs::write(&path, "server {\n  port = 8080\n}\n").expect("Failed to write file");

        let doc = compile_file(&path, CompileOptions::new().plugins(Plugins::Disabled))
            .expect("Failed to compile file");
        assert_eq!(doc.get_as::<u16>("server.port").unwrap(), 8080);
    }

    #[test]
    fn test_compile_missing_file() {
        let err = compile_file("/definitely/not/here.kyo", CompileOptions::default()).unwrap_err();
        match err {
            KyoError::File { path, message } => {
                assert_eq!(path, "/definitely/not/here.kyo");
                assert!(message.starts_with("Failed to read file"));
            }
            other => panic!("Expected file error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_exposes_the_tree() {
        let tree = parse("a = 1").expect("Failed to parse");
        assert_eq!(tree, Node::Block(vec![ast::Entry::new("a", Node::Numeric(1.0))]));
    }
}
