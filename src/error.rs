use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// A point in the source text. `line` and `column` are 1-based, `offset` is a
/// byte index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open `[start, end)` source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// `startLine:startCol:endLine:endCol`
    pub fn compact(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("syntax error at {at}: expected {expected}")]
    Syntax { expected: String, at: Position },
    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String, span: Span },
    #[error("ill-formed expression")]
    IllFormedExpression { span: Option<Span> },
    #[error("operator is not a procedure")]
    NotAProcedure { span: Option<Span> },
    #[error("ill-formed parameter: {message}")]
    IllFormedParameter { message: String, span: Span },
    #[error("ill-formed special form '{form}'")]
    IllFormedSpecialForm { form: String, span: Option<Span> },
    #[error("wrong number of arguments passed to procedure: expected {expected}, got {got}")]
    WrongArity { expected: String, got: usize },
    #[error("expected 'number', got '{got}'")]
    Type { got: String },
    #[error("'{name}' is already declared in this scope")]
    Redeclaration { name: String },
}

impl ScriptError {
    /// Source range responsible for the error, if one is known.
    pub fn span(&self) -> Option<Span> {
        match self {
            ScriptError::Syntax { at, .. } => Some(Span::new(*at, *at)),
            ScriptError::UnboundVariable { span, .. } => Some(*span),
            ScriptError::IllFormedParameter { span, .. } => Some(*span),
            ScriptError::IllFormedExpression { span }
            | ScriptError::NotAProcedure { span }
            | ScriptError::IllFormedSpecialForm { span, .. } => *span,
            ScriptError::WrongArity { .. }
            | ScriptError::Type { .. }
            | ScriptError::Redeclaration { .. } => None,
        }
    }

    /// Message with the starting `line:column` appended when positioned.
    pub fn report(&self) -> String {
        match self {
            // the position is already part of the message
            ScriptError::Syntax { .. } => self.to_string(),
            _ => match self.span() {
                Some(span) => format!("{} at {}", self, span.start),
                None => self.to_string(),
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}", .0.report())]
    Script(#[from] ScriptError),
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn syntax_error<T>(expected: &str, at: Position) -> std::result::Result<T, ScriptError> {
    Err(ScriptError::Syntax {
        expected: expected.to_string(),
        at,
    })
}
