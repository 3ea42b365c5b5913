//! Composition middleware.
//!
//! Requests whose path falls under a configured scope are turned into a fetch
//! plan and handed to the [`CompositionEngine`]. Everything else goes to the
//! wrapped service untouched.

use {
    super::ScopeTable,
    crate::{Config, Result, engine::CompositionEngine, plan::build_plan},
    axum::{
        extract::Request,
        response::{IntoResponse, Response},
    },
    std::sync::Arc,
    tower::{Layer, Service},
};

/// Layer that applies the composition middleware.
pub struct ComposeLayer<E> {
    scopes: ScopeTable,
    engine: Arc<E>,
}

impl<E: CompositionEngine> ComposeLayer<E> {
    /// Creates the layer from a scope table and the engine that executes plans.
    ///
    /// Keep a clone of `scopes` to reload them while the layer is in use.
    pub fn new(scopes: ScopeTable, engine: E) -> Self {
        Self {
            scopes,
            engine: Arc::new(engine),
        }
    }

    /// Loads the scopes referenced by `config`.
    pub fn from_config(config: &Config, engine: E) -> Result<Self> {
        Ok(Self::new(ScopeTable::from_config(config)?, engine))
    }

    pub fn scopes(&self) -> &ScopeTable {
        &self.scopes
    }
}

impl<E> Clone for ComposeLayer<E> {
    fn clone(&self) -> Self {
        Self {
            scopes: self.scopes.clone(),
            engine: self.engine.clone(),
        }
    }
}

impl<S, E> Layer<S> for ComposeLayer<E> {
    type Service = ComposeService<S, E>;

    fn layer(&self, inner: S) -> Self::Service {
        ComposeService {
            inner,
            scopes: self.scopes.clone(),
            engine: self.engine.clone(),
        }
    }
}

/// Service that routes matching requests to the composition engine.
pub struct ComposeService<S, E> {
    inner: S,
    scopes: ScopeTable,
    engine: Arc<E>,
}

impl<S: Clone, E> Clone for ComposeService<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            scopes: self.scopes.clone(),
            engine: self.engine.clone(),
        }
    }
}

impl<S, E> Service<Request> for ComposeService<S, E>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    E: CompositionEngine,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let scope = self.scopes.find(req.uri().path());
        let engine = self.engine.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(scope) = scope else {
                return inner.call(req).await;
            };

            let plan = match build_plan(&req, &scope) {
                Ok(plan) => plan,
                Err(e) => return Ok(e.into_response()),
            };

            tracing::debug!(
                path = %req.uri().path(),
                mount = %scope.mount_path(),
                upstream = %plan.main().url,
                "Composing response"
            );

            match engine.compose(plan, req).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    tracing::error!(
                        mount = %scope.mount_path(),
                        error = %e,
                        "Composition engine failed"
                    );
                    Ok(e.into_response())
                }
            }
        })
    }
}
