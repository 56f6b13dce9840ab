use crate::cue::lexer::Keyword;
use std::num::ParseIntError;
use thiserror::Error;

/// A fatal parse failure, reported with the physical line it happened on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind} (`{content}`)")]
pub struct CueError {
    /// 1-based physical line number.
    pub line: usize,
    /// The offending line with surrounding whitespace trimmed.
    pub content: String,
    #[source]
    pub kind: CueErrorKind,
}

impl CueError {
    pub fn new(line: usize, content: impl Into<String>, kind: CueErrorKind) -> Self {
        Self {
            line,
            content: content.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CueErrorKind {
    #[error("Unterminated quoted string")]
    UnterminatedQuote,

    #[error("{keyword} must appear inside a {required}")]
    MissingContext {
        keyword: Keyword,
        required: &'static str,
    },

    /// A directive lacks a required argument. This also covers scalar
    /// directives such as a bare `TITLE` or `PERFORMER`, so an optional field
    /// is never set to an empty string unless `""` was written.
    #[error("{0} is missing an argument")]
    MissingArgument(Keyword),

    #[error("Invalid MSF format: {0}")]
    InvalidMsfFormat(String),

    /// An integer field, or a time component too large for `u64`.
    #[error("Invalid number {0}: {1}")]
    InvalidNumber(String, #[source] ParseIntError),
}

impl CueErrorKind {
    pub fn is_tokenize(&self) -> bool {
        matches!(self, Self::UnterminatedQuote)
    }

    pub fn is_structural(&self) -> bool {
        !self.is_tokenize()
    }
}

pub type CueResult<T> = Result<T, CueError>;
