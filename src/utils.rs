//!
//! Utility functions shared by the configuration and directive layers.
//!
//! This module provides:
//! - [`replace_handlebars_with_env`] - Template substitution for environment variables
//! - [`join_clean`] - Lexical path joining used to resolve files against the document root
//!

use {
    regex::{Captures, Regex},
    std::{env, sync::LazyLock},
};

/// Regular expression pattern for matching handlebars-style environment variable references.
/// Matches patterns like `{{ VAR_NAME }}` with optional whitespace around the variable name.
/// Variable names must be uppercase letters, digits, or underscores (standard env var naming).
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// Replaces handlebars-style placeholders with environment variable values.
///
/// Searches through the input string for patterns like `{{ VAR_NAME }}` and replaces
/// them with the corresponding environment variable value. Variable names are
/// case-sensitive and must consist of uppercase letters, digits, or underscores.
///
/// Whitespace around the variable name is allowed: `{{VAR}}`, `{{ VAR }}`, and
/// `{{  VAR  }}` are all valid and equivalent.
///
/// Single-brace request placeholders such as `{path}` used in directive URLs are
/// left alone.
///
/// # Examples
///
/// ```
/// use axum_compose::replace_handlebars_with_env;
///
/// // Missing variables become empty strings
/// let template = "Value: {{ MISSING_VAR }}";
/// let result = replace_handlebars_with_env(template);
/// assert_eq!(result, "Value: ");
///
/// // Request placeholders pass through
/// assert_eq!(replace_handlebars_with_env("/{path}"), "/{path}");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}

/// Joins `rel` onto `root` and lexically cleans the result.
///
/// `.` segments and empty segments are dropped, `..` removes the previous
/// segment when there is one. Rooted paths stay rooted; an empty result is
/// `"."` (or `"/"` when rooted). No filesystem access takes place.
///
/// ```
/// use axum_compose::join_clean;
///
/// assert_eq!(join_clean(".", "footer.html"), "footer.html");
/// assert_eq!(join_clean("/var/www", "a/../b.html"), "/var/www/b.html");
/// assert_eq!(join_clean(".", ""), ".");
/// ```
pub fn join_clean(root: &str, rel: &str) -> String {
    let rooted = root.starts_with('/') || (root.is_empty() && rel.starts_with('/'));
    let mut segments: Vec<&str> = Vec::new();

    for segment in root.split('/').chain(rel.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
