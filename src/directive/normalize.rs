use crate::{
    rules::{LOCAL_SCHEME, has_explicit_scheme},
    utils::join_clean,
};

/// Normalizes a fragment or upstream URL so that it carries an explicit scheme.
///
/// - `http://`, `https://` and `file://` URLs are returned unchanged
/// - absolute paths get the `file://` scheme
/// - anything else is resolved against `root` and gets the `file://` scheme
///
/// Applying it twice gives the same result as applying it once.
///
/// ```
/// use axum_compose::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com/a", "."), "https://example.com/a");
/// assert_eq!(normalize_url("/footer.html", "."), "file:///footer.html");
/// assert_eq!(normalize_url("footer.html", "."), "file://footer.html");
/// assert_eq!(normalize_url("footer.html", "/srv/www"), "file:///srv/www/footer.html");
/// ```
pub fn normalize_url(raw: &str, root: &str) -> String {
    if has_explicit_scheme(raw) {
        raw.to_string()
    } else if raw.starts_with('/') {
        format!("{LOCAL_SCHEME}{raw}")
    } else {
        format!("{LOCAL_SCHEME}{}", join_clean(root, raw))
    }
}

/// Upstream used when a directive names only a mount path: the document root.
pub fn local_root_url(root: &str) -> String {
    format!("{LOCAL_SCHEME}{}", join_clean(root, ""))
}
