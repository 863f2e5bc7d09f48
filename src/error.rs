// Author: Dustin Pilgrim
// License: MIT

/// The main error type for KyoML compilation.
///
/// Every stage of a compile reports through this enum: grammar errors carry a
/// position, a hint and a numeric code, while the errors raised by the compiler
/// core reproduce the messages hosts match against.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KyoError {
    /// Raised by the lexer (codes 1xx) and the parser (codes 2xx).
    #[error("Syntax error at {line}:{column}: {message}{}{}", hint_suffix(.hint), code_suffix(.code))]
    Syntax {
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },

    /// A directive or mapper name has no registered handler.
    #[error("Unknown directive {name}")]
    UnknownDirective { name: String },

    /// A mapper shares its name with a directive.
    #[error("Directives and mappers cannot share the same key ({name})")]
    NameConflict { name: String },

    /// The same handler name was registered twice while merging plugins and host handlers.
    #[error("Name conflict detected: {name} already defined")]
    DuplicateHandler { name: String },

    /// A handler returned a pending result while the compile runs in synchronous mode.
    #[error("Async directive {name} used outside of async mode")]
    AsyncMisuse { name: String },

    /// Interpolation revisited a key that is still being resolved.
    #[error("Circular interpolation detected -> {}", .chain.join(" -> "))]
    CircularInterpolation { chain: Vec<String> },

    #[error("Cannot normalize {kind} node")]
    InvalidNode { kind: &'static str },

    /// A path reference points into a container that does not exist.
    #[error("Invalid reference at {path}: {message}")]
    InvalidReference { path: String, message: String },

    /// A host directive or mapper failed on its own terms.
    #[error("Directive {name} failed: {message}")]
    Handler { name: String, message: String },

    #[error("Type error: {message}{}", hint_suffix(.hint))]
    Type { message: String, hint: Option<String> },

    #[error("Path '{path}' not found in document")]
    MissingPath { path: String },

    #[error("File error '{path}': {message}")]
    File { path: String, message: String },
}

impl KyoError {
    /// Convenience constructor for host handlers reporting their own failures.
    pub fn handler(name: impl Into<String>, message: impl Into<String>) -> Self {
        KyoError::Handler {
            name: name.into(),
            message: message.into(),
        }
    }

    pub(crate) fn syntax(
        message: impl Into<String>,
        line: usize,
        column: usize,
        hint: Option<&str>,
        code: u32,
    ) -> Self {
        KyoError::Syntax {
            message: message.into(),
            line,
            column,
            hint: hint.map(str::to_string),
            code: Some(code),
        }
    }

    /// Numeric code of a syntax error, if any.
    pub fn code(&self) -> Option<u32> {
        match self {
            KyoError::Syntax { code, .. } => *code,
            _ => None,
        }
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h))
}

fn code_suffix(code: &Option<u32>) -> String {
    code.map_or(String::new(), |c| format!(" Code: {}", c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_message_lists_chain() {
        let err = KyoError::CircularInterpolation {
            chain: vec!["c".into(), "b".into(), "c".into()],
        };
        assert_eq!(err.to_string(), "Circular interpolation detected -> c -> b -> c");
    }

    #[test]
    fn test_syntax_message_includes_hint_and_code() {
        let err = KyoError::syntax("Unexpected token", 3, 7, Some("Check your syntax"), 202);
        assert_eq!(
            err.to_string(),
            "Syntax error at 3:7: Unexpected token Hint: Check your syntax Code: 202"
        );
        assert_eq!(err.code(), Some(202));
    }

    #[test]
    fn test_core_messages() {
        assert_eq!(
            KyoError::AsyncMisuse { name: "test".into() }.to_string(),
            "Async directive test used outside of async mode"
        );
        assert_eq!(
            KyoError::NameConflict { name: "double".into() }.to_string(),
            "Directives and mappers cannot share the same key (double)"
        );
        assert_eq!(
            KyoError::UnknownDirective { name: "nope".into() }.to_string(),
            "Unknown directive nope"
        );
    }
}
