//! Splits directive text into positioned tokens.
//!
//! Tokens are separated by whitespace. A `#` at the start of a token begins
//! a comment running to the end of the line. Double quotes group text with
//! spaces into one token; inside quotes `\"` and `\\` are escapes. Braces are
//! only structural when they form a whole unquoted token, so URL placeholders
//! like `{path}` stay ordinary text.

use {
    super::{DirectiveError, Location},
    std::sync::Arc,
};

/// A token with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub quoted: bool,
}

impl Token {
    /// Returns true for an unquoted `{`.
    pub fn is_open_brace(&self) -> bool {
        !self.quoted && self.text == "{"
    }

    /// Returns true for an unquoted `}`.
    pub fn is_close_brace(&self) -> bool {
        !self.quoted && self.text == "}"
    }

    pub fn location(&self, file: &Arc<str>) -> Location {
        Location::new(file.clone(), self.line, self.column)
    }
}

/// Tokenizes `source`. `file` is only used for error locations.
pub fn tokenize(source: &str, file: &Arc<str>) -> Result<Vec<Token>, DirectiveError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let (mut line, mut column) = (1usize, 0usize);

    while let Some(c) = chars.next() {
        column += 1;

        if c == '\n' {
            line += 1;
            column = 0;
            continue;
        }
        if c.is_whitespace() {
            continue;
        }

        let (start_line, start_column) = (line, column);

        if c == '#' {
            while chars.peek().is_some_and(|&next| next != '\n') {
                chars.next();
            }
            continue;
        }

        if c == '"' {
            let mut text = String::new();
            let mut closed = false;
            while let Some(q) = chars.next() {
                column += 1;
                match q {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' if matches!(chars.peek(), Some('"') | Some('\\')) => {
                        if let Some(escaped) = chars.next() {
                            column += 1;
                            text.push(escaped);
                        }
                    }
                    '\n' => {
                        line += 1;
                        column = 0;
                        text.push(q);
                    }
                    other => text.push(other),
                }
            }
            if !closed {
                return Err(DirectiveError::UnterminatedQuote {
                    location: Location::new(file.clone(), start_line, start_column),
                });
            }
            tokens.push(Token {
                text,
                line: start_line,
                column: start_column,
                quoted: true,
            });
            continue;
        }

        let mut text = String::from(c);
        while let Some(&next) = chars.peek() {
            if next.is_whitespace() {
                break;
            }
            text.push(next);
            chars.next();
            column += 1;
        }
        tokens.push(Token {
            text,
            line: start_line,
            column: start_column,
            quoted: false,
        });
    }

    Ok(tokens)
}

/// The tokens of one source line. A line always has at least its keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub keyword: Token,
    pub args: Vec<Token>,
}

/// Groups tokens into lines, keyed by the line each token starts on.
pub fn split_lines(tokens: Vec<Token>) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    for token in tokens {
        let continues = lines
            .last()
            .is_some_and(|current| current.keyword.line == token.line);
        match lines.last_mut() {
            Some(current) if continues => current.args.push(token),
            _ => lines.push(Line {
                keyword: token,
                args: Vec::new(),
            }),
        }
    }
    lines
}
