//! Block state machine turning directive lines into [`RoutingConfig`]s.
//!
//! ```text
//! Start ──line──> OuterArgs ──'{'──> Block ──'}'──> Start
//!   │                 │                │
//!   │                 └──no block──────┼──────────> Start
//!   └──end of input──> Done            └──statement──> Block
//! ```
//!
//! Any error leaves the machine immediately; scopes parsed before the error
//! are discarded together with the rest.

use {
    super::{
        DirectiveError, Location, Statement, statement,
        normalize::{local_root_url, normalize_url},
        tokenizer::{Line, Token, split_lines, tokenize},
    },
    crate::{
        matcher::PathPattern,
        rules::{DEFAULT_TIMEOUT, FragmentRule, RoutingConfig},
        template,
    },
    std::{sync::Arc, time::Duration, vec::IntoIter},
};

/// Settings the parser needs from the surrounding configuration.
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Name used in error locations.
    pub file: String,
    /// Keyword of the outer directive.
    pub directive: String,
    /// Document root for `file://` resolution.
    pub root: String,
    /// Initial default timeout of every scope.
    pub default_timeout: Duration,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self {
            file: "Composefile".to_string(),
            directive: "compose".to_string(),
            root: ".".to_string(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ParseContext {
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}

enum State {
    Start,
    OuterArgs(Line),
    Block { scope: RoutingConfig, opened: Location },
    Done,
}

/// Parses every outer directive in `source` into its own scope.
///
/// Scopes are returned in declaration order. The first malformed statement
/// aborts parsing and is returned with its location.
///
/// ```
/// use axum_compose::{ParseContext, parse_directives};
///
/// let scopes = parse_directives(
///     "compose / {\n  fetch http://example.com/header.html\n}",
///     &ParseContext::default(),
/// ).unwrap();
/// assert_eq!(scopes.len(), 1);
/// assert_eq!(scopes[0].fragment_rules().len(), 1);
/// ```
pub fn parse_directives(
    source: &str,
    ctx: &ParseContext,
) -> Result<Vec<RoutingConfig>, DirectiveError> {
    let file: Arc<str> = Arc::from(ctx.file.as_str());
    let lines = split_lines(tokenize(source, &file)?);
    Parser {
        ctx,
        file,
        lines: lines.into_iter(),
        scopes: Vec::new(),
    }
    .run()
}

struct Parser<'a> {
    ctx: &'a ParseContext,
    file: Arc<str>,
    lines: IntoIter<Line>,
    scopes: Vec<RoutingConfig>,
}

impl Parser<'_> {
    fn run(mut self) -> Result<Vec<RoutingConfig>, DirectiveError> {
        let mut state = State::Start;
        loop {
            state = match state {
                State::Start => match self.lines.next() {
                    Some(line) => State::OuterArgs(line),
                    None => State::Done,
                },
                State::OuterArgs(line) => match self.outer(line)? {
                    (scope, Some(opened)) => State::Block { scope, opened },
                    (scope, None) => {
                        self.finish(scope);
                        State::Start
                    }
                },
                State::Block { mut scope, opened } => match self.lines.next() {
                    None => {
                        return Err(DirectiveError::UnclosedBlock {
                            directive: self.ctx.directive.clone(),
                            location: opened,
                        });
                    }
                    Some(line) if line.keyword.is_close_brace() => {
                        if let Some(extra) = line.args.first() {
                            return Err(self.unexpected(extra));
                        }
                        self.finish(scope);
                        State::Start
                    }
                    Some(line) => {
                        self.statement(&mut scope, &line)?;
                        State::Block { scope, opened }
                    }
                },
                State::Done => return Ok(self.scopes),
            };
        }
    }

    /// Handles `<directive> <mount> [<upstream>] [{]`. Returns the new scope and
    /// the location of the opening brace if a block follows.
    fn outer(&self, line: Line) -> Result<(RoutingConfig, Option<Location>), DirectiveError> {
        let Line { keyword, args: rest } = line;

        if keyword.is_open_brace() || keyword.is_close_brace() {
            return Err(self.unexpected(&keyword));
        }
        if keyword.text != self.ctx.directive {
            return Err(DirectiveError::UnknownDirective {
                name: keyword.text.clone(),
                expected: self.ctx.directive.clone(),
                location: keyword.location(&self.file),
            });
        }

        let (args, opened) = match rest.split_last() {
            Some((last, args)) if last.is_open_brace() => (args, Some(last.location(&self.file))),
            _ => (rest.as_slice(), None),
        };
        if let Some(stray) = args.iter().find(|t| t.is_open_brace() || t.is_close_brace()) {
            return Err(self.unexpected(stray));
        }

        let location = keyword.location(&self.file);
        let (mount, upstream) = match args {
            [] => {
                return Err(DirectiveError::MissingMountPath {
                    directive: self.ctx.directive.clone(),
                    location,
                });
            }
            [mount] => (mount, local_root_url(&self.ctx.root)),
            [mount, upstream] => {
                if upstream.text.is_empty() {
                    return Err(DirectiveError::EmptyUrl {
                        statement: self.ctx.directive.clone(),
                        location: upstream.location(&self.file),
                    });
                }
                self.placeholders(upstream)?;
                (mount, normalize_url(&upstream.text, &self.ctx.root))
            }
            _ => {
                return Err(DirectiveError::TooManyArguments {
                    directive: self.ctx.directive.clone(),
                    args: args.iter().map(|t| t.text.clone()).collect(),
                    location,
                });
            }
        };

        let mount_path = self.pattern(mount)?;
        // Normalized upstreams always carry a scheme.
        let mut scope = RoutingConfig::new(mount_path, upstream)
            .map_err(|_| self.unexpected(mount))?;
        scope.set_default_timeout(self.ctx.default_timeout);

        Ok((scope, opened))
    }

    fn statement(&self, scope: &mut RoutingConfig, line: &Line) -> Result<(), DirectiveError> {
        let Line { keyword, args } = line;
        if keyword.is_open_brace() {
            return Err(self.unexpected(keyword));
        }
        if let Some(stray) = args.iter().find(|t| t.is_open_brace() || t.is_close_brace()) {
            return Err(self.unexpected(stray));
        }

        match Statement::classify(keyword, args, &self.file)? {
            Statement::Fetch(fetch) => {
                if fetch.url.is_empty() {
                    return Err(DirectiveError::EmptyUrl {
                        statement: statement::FETCH.to_string(),
                        location: keyword.location(&self.file),
                    });
                }
                // The url is the first argument of `fetch <url>` and the second otherwise.
                let url = args.get(usize::from(args.len() > 1)).unwrap_or(keyword);
                self.placeholders(url)?;
                let rule = FragmentRule::new(normalize_url(&fetch.url, &self.ctx.root))
                    .with_name(fetch.name.unwrap_or_default())
                    .with_timeout(fetch.timeout.unwrap_or(scope.default_timeout()));
                scope.add_fragment_rule(rule);
            }
            Statement::Except(except) => {
                let patterns = except
                    .patterns
                    .iter()
                    .map(|token| self.pattern(token))
                    .collect::<Result<Vec<_>, _>>()?;
                scope.set_exclusions(patterns);
            }
            Statement::DefaultTimeout(timeout) => scope.set_default_timeout(timeout),
            Statement::Unknown(token) => {
                return Err(DirectiveError::UnknownOption {
                    directive: self.ctx.directive.clone(),
                    location: token.location(&self.file),
                    option: token.text,
                });
            }
        }
        Ok(())
    }

    fn pattern(&self, token: &Token) -> Result<PathPattern, DirectiveError> {
        PathPattern::parse(&token.text).map_err(|reason| DirectiveError::InvalidPattern {
            pattern: token.text.clone(),
            reason,
            location: token.location(&self.file),
        })
    }

    fn placeholders(&self, url: &Token) -> Result<(), DirectiveError> {
        template::validate(&url.text).map_err(|reason| DirectiveError::InvalidPlaceholder {
            url: url.text.clone(),
            reason,
            location: url.location(&self.file),
        })
    }

    fn finish(&mut self, scope: RoutingConfig) {
        tracing::debug!(
            file = %self.file,
            mount = %scope.mount_path(),
            upstream = %scope.upstream(),
            fragments = scope.fragment_rules().len(),
            exclusions = scope.exclusions().len(),
            "Parsed composition scope"
        );
        self.scopes.push(scope);
    }

    fn unexpected(&self, token: &Token) -> DirectiveError {
        DirectiveError::UnexpectedToken {
            token: token.text.clone(),
            location: token.location(&self.file),
        }
    }
}
