//! Expansion of request placeholders in fragment and upstream URLs.
//!
//! A placeholder is a `{name}` with no whitespace or nested braces inside.
//! Known placeholders:
//!
//! | Placeholder      | Expands to                                          |
//! |------------------|-----------------------------------------------------|
//! | `{path}`         | request path                                        |
//! | `{query}`        | raw query string, empty if none                     |
//! | `{uri}`          | path plus `?query` when a query is present          |
//! | `{method}`       | request method                                      |
//! | `{host}`         | `Host` header, or the URI authority                 |
//! | `{path.N}`       | N-th non-empty path segment, 0-based                |
//! | `{?name}`        | first value of query parameter `name`, URL-encoded  |
//! | `{>Header-Name}` | value of a forwarded header, URL-encoded            |
//!
//! Path and query values are copied as received: the request URI only holds
//! characters that are valid in a URL. Decoded query values and header values
//! may contain anything and are form-encoded before insertion.
//!
//! Header placeholders are limited to [`FORWARDED_HEADERS`], the same headers
//! fragment fetches receive. Any other header name is rejected.
//!
//! Missing values expand to the empty string. Any other name inside braces is
//! rejected by [`validate`] when directives are parsed, and by [`expand`] as a
//! [`ErrorKind::Template`](crate::ErrorKind::Template) error. Text with an
//! opening brace but no closing one is copied as is.

use {
    crate::{Error, Result, plan::FORWARDED_HEADERS},
    http::{HeaderMap, HeaderName, Method, Request, Uri, header},
    regex::Regex,
    std::{borrow::Cow, sync::LazyLock},
    url::form_urlencoded,
};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}\s]+)\}").unwrap());

enum Placeholder<'t> {
    Path,
    Query,
    Uri,
    Method,
    Host,
    Segment(usize),
    QueryParam(&'t str),
    Header(HeaderName),
}

impl<'t> Placeholder<'t> {
    fn parse(name: &'t str) -> std::result::Result<Self, String> {
        let placeholder = match name {
            "path" => Self::Path,
            "query" => Self::Query,
            "uri" => Self::Uri,
            "method" => Self::Method,
            "host" => Self::Host,
            _ => {
                if let Some(index) = name.strip_prefix("path.") {
                    let index = index.parse::<usize>().map_err(|_| {
                        format!("Invalid path segment index in placeholder {{{name}}}")
                    })?;
                    Self::Segment(index)
                } else if let Some(param) = name.strip_prefix('?') {
                    Self::QueryParam(param)
                } else if let Some(header) = name.strip_prefix('>') {
                    let header = HeaderName::from_bytes(header.as_bytes())
                        .map_err(|_| format!("Invalid header name in placeholder {{{name}}}"))?;
                    if !FORWARDED_HEADERS.contains(&header) {
                        return Err(format!(
                            "Header {header} in placeholder {{{name}}} is not forwarded to fragments"
                        ));
                    }
                    Self::Header(header)
                } else {
                    return Err(format!("Unknown placeholder {{{name}}}"));
                }
            }
        };
        Ok(placeholder)
    }
}

/// The parts of an inbound request that placeholders can refer to.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    method: &'a Method,
    uri: &'a Uri,
    headers: &'a HeaderMap,
}

impl<'a> RequestContext<'a> {
    pub fn new(method: &'a Method, uri: &'a Uri, headers: &'a HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    pub fn from_request<B>(request: &'a Request<B>) -> Self {
        Self::new(request.method(), request.uri(), request.headers())
    }

    pub fn path(&self) -> &'a str {
        self.uri.path()
    }

    pub fn query(&self) -> &'a str {
        self.uri.query().unwrap_or_default()
    }

    pub fn host(&self) -> &'a str {
        self.headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| self.uri.authority().map(|a| a.as_str()))
            .unwrap_or_default()
    }

    /// Returns the `index`-th non-empty path segment.
    pub fn segment(&self, index: usize) -> &'a str {
        self.path()
            .split('/')
            .filter(|s| !s.is_empty())
            .nth(index)
            .unwrap_or_default()
    }

    /// Returns the first decoded value of query parameter `name`.
    pub fn query_param(&self, name: &str) -> Option<Cow<'a, str>> {
        form_urlencoded::parse(self.query().as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn header(&self, name: &str) -> Option<Cow<'a, str>> {
        self.headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
    }

    fn resolve(&self, placeholder: &Placeholder<'_>) -> String {
        match placeholder {
            Placeholder::Path => self.path().to_string(),
            Placeholder::Query => self.query().to_string(),
            Placeholder::Uri => match self.uri.query() {
                Some(query) => format!("{}?{query}", self.path()),
                None => self.path().to_string(),
            },
            Placeholder::Method => self.method.as_str().to_string(),
            Placeholder::Host => self.host().to_string(),
            Placeholder::Segment(index) => self.segment(*index).to_string(),
            Placeholder::QueryParam(name) => self
                .query_param(name)
                .map(|value| encode(&value))
                .unwrap_or_default(),
            Placeholder::Header(name) => self
                .header(name.as_str())
                .map(|value| encode(&value))
                .unwrap_or_default(),
        }
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>()
}

/// Checks every placeholder of `template` without a request.
///
/// Returns the reason of the first placeholder that [`expand`] would reject.
pub fn validate(template: &str) -> std::result::Result<(), String> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|captures| captures.get(1))
        .try_for_each(|name| Placeholder::parse(name.as_str()).map(|_| ()))
}

/// Replaces every placeholder in `template` with its value for `ctx`.
///
/// ```
/// use axum_compose::{RequestContext, expand};
/// use http::Request;
///
/// let request = Request::get("/shop/cart?id=42").body(()).unwrap();
/// let ctx = RequestContext::from_request(&request);
/// assert_eq!(
///     expand("http://fragments/{path.0}/nav.html?id={?id}", &ctx).unwrap(),
///     "http://fragments/shop/nav.html?id=42"
/// );
/// ```
pub fn expand(template: &str, ctx: &RequestContext<'_>) -> Result<String> {
    let mut expanded = String::with_capacity(template.len());
    let mut last = 0;

    for captures in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        expanded.push_str(&template[last..whole.start()]);
        let placeholder = Placeholder::parse(name.as_str()).map_err(Error::template)?;
        expanded.push_str(&ctx.resolve(&placeholder));
        last = whole.end();
    }
    expanded.push_str(&template[last..]);

    Ok(expanded)
}
