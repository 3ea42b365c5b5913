//! # axum-compose
//!
//! Request-scoped content composition for Axum services.
//!
//! A set of directives declares which path prefixes are composed from
//! fragments. For each request under such a prefix the middleware builds a
//! fetch plan (the fragment fetches followed by the upstream fetch) and hands
//! it to a [`CompositionEngine`] supplied by the host. All other requests go
//! to the wrapped router untouched.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, extract::Request, response::{IntoResponse, Response}, routing::get};
//! use axum_compose::{ComposeLayer, CompositionEngine, Config, FetchPlan, Result};
//!
//! struct MyEngine;
//!
//! impl CompositionEngine for MyEngine {
//!     async fn compose(&self, plan: FetchPlan, _request: Request) -> Result<Response> {
//!         // fetch every job of the plan and merge the fragments here
//!         Ok(format!("{} jobs", plan.len()).into_response())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::default();  // Loads from config/{RUST_ENV}.toml
//!     config.setup_tracing();
//!
//!     let app = Router::new()
//!         .route("/health", get(|| async { "OK" }))
//!         .layer(ComposeLayer::from_config(&config, MyEngine)?);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! With `config/dev.toml`:
//! ```toml
//! [compose]
//! root = "/srv/www"
//! directives = """
//! compose /shop http://backend:8080{uri} {
//!     fetch header /fragments/header.html
//!     fetch footer http://cms/footer?lang={?lang} 2s
//!     default_timeout 5s
//!     except /shop/static /shop/api
//! }
//! """
//! ```
//!
//! # Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Configuration loading and validation ([`Config`]) |
//! | [`directive`] | Directive parsing ([`parse_directives`], [`DirectiveError`]) |
//! | [`rules`] | Scope rule model ([`RoutingConfig`], [`FragmentRule`]) |
//! | [`matcher`] | Path matching ([`PathPattern`], [`matches`]) |
//! | [`template`] | Request placeholders ([`expand`]) |
//! | [`plan`] | Fetch plans ([`build_plan`], [`FetchPlan`]) |
//! | [`engine`] | Engine boundary ([`CompositionEngine`]) |
//! | [`fluent`] | Middleware ([`ComposeLayer`], [`ScopeTable`]) |
//! | [`error`] | Error types and handling ([`Error`]) |

mod config;
mod directive;
mod engine;
mod error;
mod fluent;
mod matcher;
mod plan;
mod rules;
mod template;
mod utils;

pub use config::*;
pub use directive::*;
pub use engine::*;
pub use error::*;
pub use fluent::*;
pub use matcher::*;
pub use plan::*;
pub use rules::*;
pub use template::*;
pub use utils::*;

pub type Result<T> = std::result::Result<T, Error>;
