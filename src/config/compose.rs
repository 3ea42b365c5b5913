use {
    crate::{Error, ParseContext, Result, rules::DEFAULT_TIMEOUT},
    serde::Deserialize,
    std::{path::PathBuf, time::Duration},
};

///
/// Configuration of the composition router.
///
/// The directives can be given inline or in a separate file, but not both.
/// Without any directives no scope is configured and every request is passed
/// through.
///
/// # Examples
///
/// In TOML configuration:
/// ```toml
/// [compose]
/// root = "/srv/www"
/// default_timeout = "5s"
/// directives = """
/// compose / http://backend/ {
///     fetch header /header.html
/// }
/// """
/// ```
///
#[derive(Debug, Clone, Deserialize)]
pub struct ComposeConfig {
    /// Document root used to resolve relative fragment and upstream URLs.
    /// The default `root` is ".".
    #[serde(default = "ComposeConfig::default_root")]
    pub root: String,

    /// Keyword that opens a scope in the directives.
    /// The default `directive` is "compose".
    #[serde(default = "ComposeConfig::default_directive")]
    pub directive: String,

    /// Timeout every scope starts with, until a `default_timeout` statement
    /// changes it. By default `default_timeout` is set to 10 seconds.
    #[serde(
        default = "ComposeConfig::default_default_timeout",
        with = "humantime_serde"
    )]
    pub default_timeout: Duration,

    /// Inline directive text.
    #[serde(default)]
    pub directives: Option<String>,

    /// Path of a file containing the directives.
    #[serde(default)]
    pub directives_file: Option<PathBuf>,
}

impl ComposeConfig {
    fn default_root() -> String {
        ".".into()
    }

    fn default_directive() -> String {
        "compose".into()
    }

    fn default_default_timeout() -> Duration {
        DEFAULT_TIMEOUT
    }

    pub fn validate(&self) -> Result<()> {
        if self.root.trim().is_empty() {
            return Err(Error::config("compose.root must not be empty"));
        }
        if self.directive.trim().is_empty() {
            return Err(Error::config("compose.directive must not be empty"));
        }
        if self.directive.chars().any(char::is_whitespace) {
            return Err(Error::config(format!(
                "compose.directive {:?} must be a single word",
                self.directive
            )));
        }
        if self.default_timeout.is_zero() {
            return Err(Error::config("compose.default_timeout must be greater than zero"));
        }
        if self.directives.is_some() && self.directives_file.is_some() {
            return Err(Error::config(
                "compose.directives and compose.directives_file are mutually exclusive",
            ));
        }
        Ok(())
    }

    /// Parser settings for directives read from `file`.
    pub fn parse_context(&self, file: impl Into<String>) -> ParseContext {
        ParseContext::default()
            .with_file(file)
            .with_directive(self.directive.clone())
            .with_root(self.root.clone())
            .with_default_timeout(self.default_timeout)
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        ComposeConfig {
            root: Self::default_root(),
            directive: Self::default_directive(),
            default_timeout: Self::default_default_timeout(),
            directives: None,
            directives_file: None,
        }
    }
}
