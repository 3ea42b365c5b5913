//!
//! Configuration structures and utilities for wiring up the composition router.
//!
//! A configuration can be created in many ways:
//! - From an environment-specific TOML file via `Config::from_rust_env` or `Config::from_toml_file`
//! - From a TOML string via `Config::from_toml`
//! - Constructed programmatically via the builder methods on `Config`
//!
//! In both TOML-based methods, environment variables can be referenced in the TOML
//! using the {{ VAR_NAME }} syntax, and they will be substituted with the corresponding
//! environment variable value. This is done via the `replace_handlebars_with_env`
//! function and keeps hosts and credentials out of the TOML files.
//!
//! Configuration is split into logical sections, each represented by their own struct:
//!
//! - `ComposeConfig` for the document root, defaults and the directive source
//! - `LoggingConfig` for logging and tracing settings
//!
mod compose;
mod logging;

pub use compose::*;
pub use logging::*;

use {
    crate::{
        Error, ErrorKind, Result, parse_directives, rules::RoutingConfig,
        utils::replace_handlebars_with_env,
    },
    serde::Deserialize,
    std::{env, fs, path::PathBuf, str::FromStr, time::Duration},
};

/// File name reported in error locations for inline directives.
pub const INLINE_DIRECTIVES: &str = "compose.directives";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compose: ComposeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    ///
    /// Creates a default configuration.
    /// This will attempt to load configuration from the file based on the RUST_ENV
    /// environment variable falling back to a default configuration if the environment
    /// variable is not set. Configuration files should be located in the "config/"
    /// directory of your project.
    ///
    fn default() -> Self {
        match Self::from_rust_env() {
            Ok(config) => config,
            Err(_) => Config {
                compose: ComposeConfig::default(),
                logging: LoggingConfig::default(),
            },
        }
    }
}

impl Config {
    ///
    /// Loads the configuration from a file based on the RUST_ENV environment variable.
    ///
    pub fn from_rust_env() -> Result<Config> {
        Self::from_toml_file(env::var("RUST_ENV")?)
    }

    ///
    /// Given an environment name, loads the corresponding configuration file,
    /// substitutes any environment variables, and returns a Config struct.
    /// The configuration file is expected to be located at "config/{env}.toml"
    /// where {env} is the provided environment name (e.g., "dev", "prod").
    ///
    pub fn from_toml_file(env: impl AsRef<str>) -> Result<Config> {
        let path = format!("config/{}.toml", env.as_ref());
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    ///
    /// Parses a configuration string in TOML format into a Config struct.
    ///
    pub fn from_toml(toml_str: &str) -> Result<Config> {
        replace_handlebars_with_env(toml_str).parse()
    }

    /// Sets the document root of the ComposeConfig.
    pub fn with_root<S: AsRef<str>>(mut self, root: S) -> Self {
        self.compose.root = root.as_ref().into();
        self
    }

    /// Sets the timeout every scope starts with.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.compose.default_timeout = timeout;
        self
    }

    /// Sets inline directives, replacing any directives file.
    pub fn with_directives<S: AsRef<str>>(mut self, directives: S) -> Self {
        self.compose.directives = Some(directives.as_ref().into());
        self.compose.directives_file = None;
        self
    }

    /// Sets the directives file, replacing any inline directives.
    pub fn with_directives_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.compose.directives_file = Some(path.into());
        self.compose.directives = None;
        self
    }

    /// Sets the keyword that opens a scope in the directives.
    pub fn with_directive_name<S: AsRef<str>>(mut self, name: S) -> Self {
        self.compose.directive = name.as_ref().into();
        self
    }

    /// Sets the log format of the LoggingConfig.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    /// Ensures that the configuration is valid.
    /// Every value has a sensible default, so this only rejects values that
    /// were set to something unusable.
    pub fn validate(&self) -> Result<()> {
        self.compose.validate()?;
        Ok(())
    }

    ///
    /// Reads and parses the configured directives into their scopes, in
    /// declaration order.
    ///
    /// The first malformed statement fails the whole load. The returned error
    /// is of kind `Configuration` and wraps a `DirectiveError` with the file
    /// and line of the statement.
    ///
    pub fn load_scopes(&self) -> Result<Vec<RoutingConfig>> {
        self.validate()?;
        let compose = &self.compose;

        let scopes = match (&compose.directives, &compose.directives_file) {
            (Some(text), _) => parse_directives(text, &compose.parse_context(INLINE_DIRECTIVES))?,
            (None, Some(path)) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    Error::new(
                        ErrorKind::Io,
                        format!("Failed to read directives file {}: {e}", path.display()),
                    )
                })?;
                parse_directives(&text, &compose.parse_context(path.display().to_string()))?
            }
            (None, None) => {
                tracing::warn!("No composition directives configured, all requests pass through");
                Vec::new()
            }
        };

        tracing::info!(scopes = scopes.len(), "Loaded composition scopes");
        Ok(scopes)
    }

    ///
    /// Sets up the tracing subscriber for logging based on the LoggingConfig.
    ///
    /// NOTE: This should be called early during startup to ensure logging is configured
    ///       before any log messages are emitted.
    ///
    pub fn setup_tracing(&self) {
        use tracing_subscriber::{EnvFilter, prelude::*};
        let env_filter = EnvFilter::from_default_env();
        match self.logging.format {
            LogFormat::Json => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().json())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Default => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Compact => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().compact())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Pretty => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .with(env_filter)
                    .try_init();
            }
        }
    }
}

///
/// Parses a configuration string with references to environment variables
/// into a Config struct by substituting the environment variables and then
/// parsing the resulting TOML.
///
impl FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let config_file = replace_handlebars_with_env(s);
        let config = toml::from_str::<Config>(&config_file)?;
        Ok(config)
    }
}
