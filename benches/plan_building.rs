//! Benchmarks for the per-request work of the composition router.
//!
//! Measures directive parsing, scope lookup and plan building, plus the
//! latency the middleware adds in front of an engine that does nothing.

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::Request as HttpRequest,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_compose::{
    ComposeLayer, CompositionEngine, FetchPlan, ParseContext, Result, ScopeTable, build_plan,
    parse_directives,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tower::ServiceExt;

/// Engine that answers immediately
struct NoopEngine;

impl CompositionEngine for NoopEngine {
    async fn compose(&self, plan: FetchPlan, _request: Request) -> Result<Response> {
        Ok(plan.len().to_string().into_response())
    }
}

/// Directive text with `scopes` scopes of `fragments` fetches each
fn directives(scopes: usize, fragments: usize) -> String {
    let mut source = String::new();
    for s in 0..scopes {
        source.push_str(&format!("compose /scope{s} http://backend{{uri}} {{\n"));
        for f in 0..fragments {
            source.push_str(&format!(
                "    fetch f{f} http://fragments/{{path.0}}/{f}.html?lang={{?lang}} 2s\n"
            ));
        }
        source.push_str("    except /static\n}\n");
    }
    source
}

/// Creates a minimal request for benchmarking
fn test_request(path: &str) -> HttpRequest<Body> {
    HttpRequest::builder()
        .method("GET")
        .uri(path)
        .header("cookie", "session=abc")
        .header("x-correlation-id", "bench")
        .body(Body::empty())
        .unwrap()
}

/// Benchmark: parsing directive text
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_directives");
    for scopes in [1, 10, 100] {
        let source = directives(scopes, 5);
        group.bench_with_input(BenchmarkId::new("scopes", scopes), &source, |b, source| {
            b.iter(|| black_box(parse_directives(source, &ParseContext::default()).unwrap()))
        });
    }
    group.finish();
}

/// Benchmark: first-match lookup with the matching scope declared last
fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope_lookup");
    for scopes in [1, 10, 100] {
        let table = ScopeTable::load(&directives(scopes, 1), &ParseContext::default()).unwrap();
        let path = format!("/scope{}/page", scopes - 1);
        group.bench_with_input(BenchmarkId::new("scopes", scopes), &path, |b, path| {
            b.iter(|| black_box(table.find(path)))
        });
    }
    group.finish();
}

/// Benchmark: plan building for growing fragment counts
fn bench_build_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_plan");
    let request = test_request("/scope0/products/42?lang=en");
    for fragments in [0, 4, 16] {
        let scope = parse_directives(&directives(1, fragments), &ParseContext::default())
            .unwrap()
            .remove(0);
        group.bench_with_input(
            BenchmarkId::new("fragments", fragments),
            &scope,
            |b, scope| b.iter(|| black_box(build_plan(&request, scope).unwrap())),
        );
    }
    group.finish();
}

/// Benchmark: bare router against the same router behind the middleware
fn bench_middleware(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let table = ScopeTable::load(&directives(10, 4), &ParseContext::default()).unwrap();

    let bare = Router::new().route("/{*rest}", get(|| async { "OK" }));
    let composed = bare.clone().layer(ComposeLayer::new(table, NoopEngine));

    c.bench_function("bare_axum", |b| {
        b.to_async(&rt).iter(|| async {
            let response = bare.clone().oneshot(test_request("/scope9/page")).await.unwrap();
            black_box(response)
        })
    });

    c.bench_function("compose_passthrough", |b| {
        b.to_async(&rt).iter(|| async {
            let response = composed
                .clone()
                .oneshot(test_request("/elsewhere"))
                .await
                .unwrap();
            black_box(response)
        })
    });

    c.bench_function("compose_matched", |b| {
        b.to_async(&rt).iter(|| async {
            let response = composed
                .clone()
                .oneshot(test_request("/scope9/page"))
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_find,
    bench_build_plan,
    bench_middleware,
);
criterion_main!(benches);
