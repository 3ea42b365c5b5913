//! Per-request fetch plans.
//!
//! [`build_plan`] turns a matched [`RoutingConfig`] and the inbound request
//! into the ordered list of fetches the composition engine executes: one job
//! per fragment rule followed by the upstream job, which provides the base
//! document and is marked as the main job.

use {
    crate::{
        Result,
        rules::RoutingConfig,
        template::{RequestContext, expand},
    },
    http::{HeaderMap, HeaderName, Method, Request, header},
    std::{iter, time::Duration},
};

/// Headers forwarded from the inbound request to fragment fetches.
///
/// Fragment jobs carry no other header. The upstream job gets all of them.
pub static FORWARDED_HEADERS: [HeaderName; 8] = [
    header::AUTHORIZATION,
    header::CACHE_CONTROL,
    header::COOKIE,
    header::PRAGMA,
    header::REFERER,
    HeaderName::from_static("x-forwarded-host"),
    HeaderName::from_static("x-correlation-id"),
    HeaderName::from_static("x-feature-toggle"),
];

/// One fetch the composition engine has to perform.
#[derive(Debug, Clone)]
pub struct FetchJob {
    /// Fragment name, empty for unnamed fragments and for the upstream job.
    pub name: String,
    /// Expanded URL with an explicit scheme.
    pub url: String,
    pub method: Method,
    /// Advisory timeout for the engine.
    pub timeout: Duration,
    /// Position in the plan. Lower values come first.
    pub priority: usize,
    pub headers: HeaderMap,
    /// Whether the inbound request body goes along with this fetch.
    pub forward_body: bool,
    /// Set on the upstream job only.
    pub is_main: bool,
}

/// Ordered fetch jobs for one request: the fragments, then the main job.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    fragments: Vec<FetchJob>,
    main: FetchJob,
}

impl FetchPlan {
    /// The upstream job.
    pub fn main(&self) -> &FetchJob {
        &self.main
    }

    pub fn fragments(&self) -> &[FetchJob] {
        &self.fragments
    }

    /// All jobs in priority order. The main job is last.
    pub fn iter(&self) -> impl Iterator<Item = &FetchJob> {
        self.fragments.iter().chain(iter::once(&self.main))
    }

    /// Number of jobs including the main job. Never zero.
    pub fn len(&self) -> usize {
        self.fragments.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn into_jobs(self) -> Vec<FetchJob> {
        let mut jobs = self.fragments;
        jobs.push(self.main);
        jobs
    }
}

impl IntoIterator for FetchPlan {
    type Item = FetchJob;
    type IntoIter = std::vec::IntoIter<FetchJob>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_jobs().into_iter()
    }
}

/// Builds the fetch plan of `request` for a scope that matched it.
///
/// Does no I/O. Fails only when a URL template cannot be expanded.
///
/// ```
/// use axum_compose::{ParseContext, build_plan, parse_directives};
/// use http::Request;
///
/// let scopes = parse_directives(
///     "compose / http://backend/ {\n  fetch http://example.com/header.html\n}",
///     &ParseContext::default(),
/// ).unwrap();
/// let request = Request::get("/index.html").body(()).unwrap();
///
/// let plan = build_plan(&request, &scopes[0]).unwrap();
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan.main().url, "http://backend/");
/// assert_eq!(plan.main().priority, 1);
/// ```
pub fn build_plan<B>(request: &Request<B>, config: &RoutingConfig) -> Result<FetchPlan> {
    let ctx = RequestContext::from_request(request);
    let forwarded = forwarded_headers(request.headers());

    let fragments = config
        .fragment_rules()
        .iter()
        .enumerate()
        .map(|(priority, rule)| {
            Ok(FetchJob {
                name: rule.name.clone(),
                url: expand(&rule.url, &ctx)?,
                method: Method::GET,
                timeout: rule.timeout,
                priority,
                headers: forwarded.clone(),
                forward_body: false,
                is_main: false,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let main = FetchJob {
        name: String::new(),
        url: expand(config.upstream(), &ctx)?,
        method: request.method().clone(),
        timeout: config.default_timeout(),
        priority: fragments.len(),
        headers: request.headers().clone(),
        forward_body: true,
        is_main: true,
    };

    tracing::debug!(
        path = %request.uri().path(),
        mount = %config.mount_path(),
        jobs = fragments.len() + 1,
        "Built fetch plan"
    );

    Ok(FetchPlan { fragments, main })
}

/// Copies the whitelisted headers, keeping repeated values.
fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for name in &FORWARDED_HEADERS {
        for value in headers.get_all(name) {
            forwarded.append(name.clone(), value.clone());
        }
    }
    forwarded
}
