// ABOUTME: Error types shared by the lexer, parser, and evaluator

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElangError {
    /// Lexical error: unknown character, unterminated string or interpolation
    #[error("{message}")]
    Syntax {
        message: String,
        line: u32,
        column: u32,
        hint: Option<String>,
    },

    /// Parse error: unexpected token, missing closer, invalid construct
    #[error("{message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
        hint: Option<String>,
    },

    /// Runtime error: bad types, bad arity, missing names, division by zero
    #[error("{message}")]
    Runtime {
        message: String,
        line: u32,
        column: u32,
        hint: Option<String>,
    },
}

impl ElangError {
    pub fn syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        ElangError::Syntax {
            message: message.into(),
            line,
            column,
            hint: None,
        }
    }

    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        ElangError::Parse {
            message: message.into(),
            line,
            column,
            hint: None,
        }
    }

    pub fn runtime(message: impl Into<String>, line: u32, column: u32) -> Self {
        ElangError::Runtime {
            message: message.into(),
            line,
            column,
            hint: None,
        }
    }

    /// Attach a hint shown under the caret in diagnostics
    pub fn with_hint(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            ElangError::Syntax { hint, .. }
            | ElangError::Parse { hint, .. }
            | ElangError::Runtime { hint, .. } => *hint = Some(text.into()),
        }
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ElangError::Syntax { .. } => "syntax error",
            ElangError::Parse { .. } => "parse error",
            ElangError::Runtime { .. } => "runtime error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ElangError::Syntax { message, .. }
            | ElangError::Parse { message, .. }
            | ElangError::Runtime { message, .. } => message,
        }
    }

    pub fn position(&self) -> (u32, u32) {
        match self {
            ElangError::Syntax { line, column, .. }
            | ElangError::Parse { line, column, .. }
            | ElangError::Runtime { line, column, .. } => (*line, *column),
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            ElangError::Syntax { hint, .. }
            | ElangError::Parse { hint, .. }
            | ElangError::Runtime { hint, .. } => hint.as_deref(),
        }
    }
}
