//! Boundary to the component that executes fetch plans.
//!
//! Fetching, caching and merging of fragments happen outside this crate. The
//! host implements [`CompositionEngine`] (typically around an HTTP client and
//! a fragment cache it owns) and hands it to
//! [`ComposeLayer`](crate::ComposeLayer).

use {
    crate::{Result, plan::FetchPlan},
    axum::{extract::Request, response::Response},
    std::{future::Future, sync::Arc},
};

/// Executes a [`FetchPlan`] and merges the results into one response.
///
/// Errors are returned to the middleware, which renders them through the
/// crate's error response. They are never retried.
///
/// ```
/// use axum::{extract::Request, response::{IntoResponse, Response}};
/// use axum_compose::{CompositionEngine, FetchPlan, Result};
///
/// struct Echo;
///
/// impl CompositionEngine for Echo {
///     async fn compose(&self, plan: FetchPlan, _request: Request) -> Result<Response> {
///         Ok(plan.main().url.clone().into_response())
///     }
/// }
/// ```
pub trait CompositionEngine: Send + Sync + 'static {
    /// Runs the jobs of `plan`. `request` is the inbound request,
    /// whose body belongs to the main job when it forwards the body.
    fn compose(
        &self,
        plan: FetchPlan,
        request: Request,
    ) -> impl Future<Output = Result<Response>> + Send;
}

impl<E: CompositionEngine> CompositionEngine for Arc<E> {
    fn compose(
        &self,
        plan: FetchPlan,
        request: Request,
    ) -> impl Future<Output = Result<Response>> + Send {
        (**self).compose(plan, request)
    }
}
