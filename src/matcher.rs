//! Request path matching for composition scopes.
//!
//! A request is handled by a scope when its path falls under the scope's
//! mount path and matches none of the scope's exclusions. Both checks use
//! [`PathPattern`]:
//!
//! - `/foo` is a plain prefix and matches `/foo`, `/foo/bar` and `/foobar`
//! - `/foo/*` matches `/foo` itself and everything below `/foo/`
//! - `/foo*` is the same as `/foo`
//!
//! Patterns are validated when the directive block is parsed, so matching
//! itself cannot fail.

use {
    crate::RoutingConfig,
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// Reasons a path pattern is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("path pattern must not be empty")]
    Empty,

    #[error("path pattern must start with '/'")]
    NotAbsolute,

    #[error("wildcard '*' is only allowed once, at the end of the pattern")]
    MisplacedWildcard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    /// Plain string prefix.
    Prefix,
    /// `<dir>/*`: the directory itself and everything below it.
    Subtree,
}

/// A validated mount or exclusion pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    prefix: String,
    kind: PatternKind,
}

impl PathPattern {
    /// Parses and validates a pattern.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        if !raw.starts_with('/') {
            return Err(PatternError::NotAbsolute);
        }

        let stem = raw.strip_suffix('*').unwrap_or(raw);
        if stem.contains('*') {
            return Err(PatternError::MisplacedWildcard);
        }

        let kind = if stem.len() != raw.len() && stem.ends_with('/') {
            PatternKind::Subtree
        } else {
            PatternKind::Prefix
        };

        Ok(Self {
            raw: raw.to_string(),
            prefix: stem.to_string(),
            kind,
        })
    }

    /// The pattern as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true when `path` falls under this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self.kind {
            PatternKind::Prefix => path.starts_with(&self.prefix),
            PatternKind::Subtree => {
                path.starts_with(&self.prefix)
                    || self
                        .prefix
                        .strip_suffix('/')
                        .is_some_and(|dir| !dir.is_empty() && path == dir)
            }
        }
    }
}

impl FromStr for PathPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decides whether a request path is handled by `config`.
///
/// The mount path is checked first and exclusions are only consulted when it
/// matches. Any matching exclusion vetoes the request.
pub fn matches(path: &str, config: &RoutingConfig) -> bool {
    if !config.mount_path().matches(path) {
        return false;
    }

    if let Some(exclusion) = config.exclusions().iter().find(|e| e.matches(path)) {
        tracing::trace!(
            path = %path,
            mount = %config.mount_path(),
            exclusion = %exclusion,
            "Request excluded from composition scope"
        );
        return false;
    }

    true
}

impl RoutingConfig {
    /// See [`matches`].
    pub fn matches(&self, path: &str) -> bool {
        matches(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scope(mount: &str, exclusions: &[&str]) -> RoutingConfig {
        let mut config = RoutingConfig::new(mount.parse().unwrap(), "file://.").unwrap();
        config.set_exclusions(exclusions.iter().map(|e| e.parse().unwrap()).collect());
        config
    }

    #[test]
    fn test_pattern_validation() {
        assert_eq!(PathPattern::parse(""), Err(PatternError::Empty));
        assert_eq!(PathPattern::parse("foo"), Err(PatternError::NotAbsolute));
        assert_eq!(
            PathPattern::parse("/a/*/b"),
            Err(PatternError::MisplacedWildcard)
        );
        assert_eq!(
            PathPattern::parse("/a/**"),
            Err(PatternError::MisplacedWildcard)
        );
        assert!(PathPattern::parse("/a/*").is_ok());
        assert!(PathPattern::parse("/*").is_ok());
    }

    #[test]
    fn test_plain_prefix_pattern() {
        let pattern = PathPattern::parse("/foo").unwrap();
        assert!(pattern.matches("/foo"));
        assert!(pattern.matches("/foo/x"));
        assert!(pattern.matches("/foobar"));
        assert!(!pattern.matches("/fo"));
        assert!(!pattern.matches("/bar/foo"));
    }

    #[test]
    fn test_subtree_pattern() {
        let pattern = PathPattern::parse("/foo/*").unwrap();
        assert!(pattern.matches("/foo"));
        assert!(pattern.matches("/foo/"));
        assert!(pattern.matches("/foo/x/y"));
        assert!(!pattern.matches("/foobar"));
    }

    #[test]
    fn test_trailing_wildcard_without_slash_is_prefix() {
        let pattern = PathPattern::parse("/foo*").unwrap();
        assert!(pattern.matches("/foobar"));
        assert!(pattern.matches("/foo/x"));
        assert!(!pattern.matches("/fo"));
    }

    #[test]
    fn test_root_subtree_matches_everything() {
        let pattern = PathPattern::parse("/*").unwrap();
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
    }

    #[test]
    fn test_matches_with_exclusions() {
        let config = scope("/", &["/foo", "/bar"]);
        assert!(!matches("/foo/x", &config));
        assert!(!matches("/bar", &config));
        assert!(matches("/baz", &config));
    }

    #[test]
    fn test_matches_outside_mount_path() {
        let config = scope("/shop", &[]);
        assert!(!matches("/blog", &config));
        assert!(config.matches("/shop/cart"));
    }

    #[test]
    fn test_matches_without_exclusions() {
        let config = scope("/", &[]);
        assert!(matches("/any/path", &config));
    }

    proptest! {
        /// A path outside the mount path never matches, whatever the exclusions are
        #[test]
        fn outside_mount_never_matches(
            suffix in "[a-z/]{0,12}",
            exclusions in proptest::collection::vec("/[a-z]{0,4}\\*?", 0..4)
        ) {
            let excl: Vec<&str> = exclusions.iter().map(String::as_str).collect();
            let config = scope("/mounted", &excl);
            let path = format!("/other{suffix}");
            prop_assert!(!matches(&path, &config));
        }

        /// Inside the mount path with no exclusions always matches
        #[test]
        fn inside_mount_without_exclusions_matches(suffix in "[a-z/]{0,12}") {
            let config = scope("/mounted", &[]);
            let path = format!("/mounted{suffix}");
            prop_assert!(matches(&path, &config));
        }
    }
}
