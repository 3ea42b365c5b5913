//! Rule model for a single composition scope.
//!
//! A [`RoutingConfig`] is produced by the directive parser, one per outer
//! directive, and never changes once parsing of its block has finished. The
//! fragment rules keep their insertion order, which is also their priority.

use {
    crate::{Error, Result, matcher::PathPattern},
    std::time::Duration,
};

/// Timeout applied to fragment rules that do not specify their own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Scheme used for content read from the local document root.
pub const LOCAL_SCHEME: &str = "file://";

/// Returns true when `url` already carries one of the supported schemes.
pub fn has_explicit_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with(LOCAL_SCHEME)
}

/// One `fetch` statement of a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRule {
    /// Optional identifier. An empty name is an unnamed fragment.
    pub name: String,
    /// Normalized URL template with an explicit scheme.
    pub url: String,
    /// Timeout resolved at parse time.
    pub timeout: Duration,
}

impl FragmentRule {
    /// Creates an unnamed fragment rule with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the name of the fragment rule.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the timeout of the fragment rule.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

///
/// Configuration of one routing scope: where it is mounted, which upstream
/// provides the base document and which fragments get fetched alongside it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingConfig {
    mount_path: PathPattern,
    upstream: String,
    default_timeout: Duration,
    fragment_rules: Vec<FragmentRule>,
    exclusions: Vec<PathPattern>,
}

impl RoutingConfig {
    /// Creates an empty scope.
    ///
    /// The upstream must already be normalized: it is rejected when empty or
    /// when it lacks an `http://`, `https://` or `file://` scheme.
    pub fn new(mount_path: PathPattern, upstream: impl Into<String>) -> Result<Self> {
        let upstream = upstream.into();
        if upstream.is_empty() {
            return Err(Error::config(format!(
                "Upstream for scope {} must not be empty",
                mount_path
            )));
        }
        if !has_explicit_scheme(&upstream) {
            return Err(Error::config(format!(
                "Upstream {upstream:?} for scope {mount_path} has no http://, https:// or file:// scheme"
            )));
        }

        Ok(Self {
            mount_path,
            upstream,
            default_timeout: DEFAULT_TIMEOUT,
            fragment_rules: Vec::new(),
            exclusions: Vec::new(),
        })
    }

    /// Appends a fragment rule. Call order is priority order.
    pub fn add_fragment_rule(&mut self, rule: FragmentRule) {
        self.fragment_rules.push(rule);
    }

    /// Replaces the exclusion list of the scope.
    pub fn set_exclusions(&mut self, exclusions: Vec<PathPattern>) {
        self.exclusions = exclusions;
    }

    /// Changes the timeout given to fragment rules added from now on.
    /// Rules that were already added keep their timeout.
    pub fn set_default_timeout(&mut self, timeout: Duration) {
        self.default_timeout = timeout;
    }

    pub fn mount_path(&self) -> &PathPattern {
        &self.mount_path
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn fragment_rules(&self) -> &[FragmentRule] {
        &self.fragment_rules
    }

    pub fn exclusions(&self) -> &[PathPattern] {
        &self.exclusions
    }
}
