//! Classification of the statements inside a directive block.
//!
//! Each non-empty line of a block becomes one [`Statement`]. Arity and
//! duration checks happen here, as pure functions of the tokens, so that the
//! block state machine in the parser only has to apply the result.

use {
    super::{DirectiveError, Token},
    std::{sync::Arc, time::Duration},
};

pub const FETCH: &str = "fetch";
pub const EXCEPT: &str = "except";
pub const DEFAULT_TIMEOUT: &str = "default_timeout";

/// `fetch [<name>] <url> [<timeout>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStatement {
    pub name: Option<String>,
    pub url: String,
    pub timeout: Option<Duration>,
}

/// `except <pattern>...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptStatement {
    /// Raw patterns with their tokens, validated by the parser.
    pub patterns: Vec<Token>,
}

/// One classified block statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Fetch(FetchStatement),
    Except(ExceptStatement),
    DefaultTimeout(Duration),
    /// A keyword this block does not know. Carries the keyword token.
    Unknown(Token),
}

impl Statement {
    /// Classifies a block line given its first token and the remaining ones.
    pub fn classify(
        keyword: &Token,
        args: &[Token],
        file: &Arc<str>,
    ) -> Result<Statement, DirectiveError> {
        if keyword.quoted {
            return Ok(Statement::Unknown(keyword.clone()));
        }

        match keyword.text.as_str() {
            FETCH => fetch(keyword, args, file).map(Statement::Fetch),
            EXCEPT => Ok(Statement::Except(ExceptStatement {
                patterns: args.to_vec(),
            })),
            DEFAULT_TIMEOUT => default_timeout(keyword, args, file).map(Statement::DefaultTimeout),
            _ => Ok(Statement::Unknown(keyword.clone())),
        }
    }
}

fn texts(args: &[Token]) -> Vec<String> {
    args.iter().map(|t| t.text.clone()).collect()
}

fn fetch(keyword: &Token, args: &[Token], file: &Arc<str>) -> Result<FetchStatement, DirectiveError> {
    match args {
        [url] => Ok(FetchStatement {
            name: None,
            url: url.text.clone(),
            timeout: None,
        }),
        [name, url] => Ok(FetchStatement {
            name: Some(name.text.clone()),
            url: url.text.clone(),
            timeout: None,
        }),
        [name, url, timeout] => Ok(FetchStatement {
            name: Some(name.text.clone()),
            url: url.text.clone(),
            timeout: Some(parse_timeout(FETCH, args, timeout, file)?),
        }),
        _ => Err(DirectiveError::WrongArity {
            statement: FETCH.to_string(),
            args: texts(args),
            location: keyword.location(file),
        }),
    }
}

fn default_timeout(
    keyword: &Token,
    args: &[Token],
    file: &Arc<str>,
) -> Result<Duration, DirectiveError> {
    match args {
        [value] => parse_timeout(DEFAULT_TIMEOUT, args, value, file),
        _ => Err(DirectiveError::WrongArity {
            statement: DEFAULT_TIMEOUT.to_string(),
            args: texts(args),
            location: keyword.location(file),
        }),
    }
}

/// Parses a duration such as `5000ms`, `20s` or `1m 30s`.
fn parse_timeout(
    statement: &str,
    args: &[Token],
    value: &Token,
    file: &Arc<str>,
) -> Result<Duration, DirectiveError> {
    humantime::parse_duration(&value.text).map_err(|e| DirectiveError::InvalidDuration {
        statement: statement.to_string(),
        args: texts(args),
        value: value.text.clone(),
        reason: e.to_string(),
        location: value.location(file),
    })
}
