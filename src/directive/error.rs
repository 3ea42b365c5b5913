use {
    crate::matcher::PatternError,
    std::{fmt, sync::Arc},
    thiserror::Error,
};

/// Source position of a token in a directive file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<Arc<str>>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// First error found while parsing a directive file.
///
/// Every variant carries the location of the offending statement or token.
/// Parsing stops at the first error and no scope of the file is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("Missing mount path argument for {directive} directive ({location})")]
    MissingMountPath { directive: String, location: Location },

    #[error("Too many arguments for {directive} directive {args:?} ({location})")]
    TooManyArguments {
        directive: String,
        args: Vec<String>,
        location: Location,
    },

    #[error("Wrong number of arguments for {statement}: {args:?} ({location})")]
    WrongArity {
        statement: String,
        args: Vec<String>,
        location: Location,
    },

    #[error("Invalid duration {value:?} in {statement} {args:?}: {reason} ({location})")]
    InvalidDuration {
        statement: String,
        args: Vec<String>,
        value: String,
        reason: String,
        location: Location,
    },

    #[error("Invalid path pattern {pattern:?}: {reason} ({location})")]
    InvalidPattern {
        pattern: String,
        reason: PatternError,
        location: Location,
    },

    #[error("Invalid placeholder in {url:?}: {reason} ({location})")]
    InvalidPlaceholder {
        url: String,
        reason: String,
        location: Location,
    },

    #[error("Empty URL in {statement} ({location})")]
    EmptyUrl { statement: String, location: Location },

    #[error("Unknown option within {directive}: {option} ({location})")]
    UnknownOption {
        directive: String,
        option: String,
        location: Location,
    },

    #[error("Unknown directive {name:?}, expected {expected:?} ({location})")]
    UnknownDirective {
        name: String,
        expected: String,
        location: Location,
    },

    #[error("Unexpected {token:?} ({location})")]
    UnexpectedToken { token: String, location: Location },

    #[error("Block of {directive} directive opened at {location} is never closed")]
    UnclosedBlock { directive: String, location: Location },

    #[error("Unterminated quoted string ({location})")]
    UnterminatedQuote { location: Location },
}

impl DirectiveError {
    /// Location of the statement or token that caused the error.
    pub fn location(&self) -> &Location {
        match self {
            Self::MissingMountPath { location, .. }
            | Self::TooManyArguments { location, .. }
            | Self::WrongArity { location, .. }
            | Self::InvalidDuration { location, .. }
            | Self::InvalidPattern { location, .. }
            | Self::InvalidPlaceholder { location, .. }
            | Self::EmptyUrl { location, .. }
            | Self::UnknownOption { location, .. }
            | Self::UnknownDirective { location, .. }
            | Self::UnexpectedToken { location, .. }
            | Self::UnclosedBlock { location, .. }
            | Self::UnterminatedQuote { location } => location,
        }
    }
}
