//! Tests for the composition middleware
use super::{FailingEngine, RecordingEngine, app_routes, get_body_string, get_request};
use crate::{
    ComposeLayer, Config, FragmentRule, ParseContext, PathPattern, RoutingConfig, ScopeTable,
    parse_directives,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

const DIRECTIVES: &str = r#"
compose /shop http://backend{path} {
    fetch header http://fragments/header.html
    fetch footer /footer.html 5000ms
    except /shop/static
}
"#;

fn scopes() -> ScopeTable {
    ScopeTable::load(DIRECTIVES, &ParseContext::default()).unwrap()
}

#[tokio::test]
async fn test_matching_request_is_composed() {
    let engine = RecordingEngine::default();
    let app = app_routes().layer(ComposeLayer::new(scopes(), engine.clone()));

    let response = app.oneshot(get_request("/shop/cart")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-composed").unwrap(), "true");
    let body = get_body_string(response).await;
    assert_eq!(
        body.lines().next().unwrap(),
        "0:http://fragments/header.html 1:file:///footer.html 2:http://backend/shop/cart"
    );

    let plans = engine.plans();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].fragments()[0].name, "header");
    assert_eq!(
        plans[0].fragments()[1].timeout,
        std::time::Duration::from_millis(5000)
    );
}

#[tokio::test]
async fn test_unmatched_request_passes_through() {
    let engine = RecordingEngine::default();
    let app = app_routes().layer(ComposeLayer::new(scopes(), engine.clone()));

    let response = app.oneshot(get_request("/about")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(get_body_string(response).await, "passthrough 404");
    assert!(engine.plans().is_empty());
}

#[tokio::test]
async fn test_excluded_request_passes_through() {
    let engine = RecordingEngine::default();
    let directives = "compose / {\n  fetch /header.html\n  except /static /api\n}";
    let scopes = ScopeTable::load(directives, &ParseContext::default()).unwrap();
    let app = app_routes().layer(ComposeLayer::new(scopes, engine.clone()));

    let response = app.oneshot(get_request("/static/app.js")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-composed").is_none());
    assert_eq!(get_body_string(response).await, "passthrough");
    assert!(engine.plans().is_empty());
}

#[tokio::test]
async fn test_request_body_reaches_engine() {
    let engine = RecordingEngine::default();
    let scopes = ScopeTable::load("compose /api http://backend/api", &ParseContext::default())
        .unwrap();
    let app = app_routes().layer(ComposeLayer::new(scopes, engine.clone()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/echo")
        .header("cookie", "session=1")
        .header("x-internal", "secret")
        .body(Body::from("payload"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let body = get_body_string(response).await;
    assert_eq!(body, "0:http://backend/api\npayload");

    let plans = engine.plans();
    let main = plans[0].main();
    assert!(main.forward_body);
    assert_eq!(main.method, "POST");
    assert_eq!(main.headers.get("x-internal").unwrap(), "secret");
}

#[tokio::test]
async fn test_engine_error_becomes_error_response() {
    let app = app_routes().layer(ComposeLayer::new(scopes(), FailingEngine));

    let response = app.oneshot(get_request("/shop")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = get_body_string(response).await;
    assert!(body.contains("ENGINE_ERROR"));
    assert!(body.contains("upstream unreachable"));
}

#[tokio::test]
async fn test_template_error_becomes_error_response() {
    let engine = RecordingEngine::default();
    // Scopes built in code skip the placeholder check of the directive parser.
    let mut scope = RoutingConfig::new(PathPattern::parse("/").unwrap(), "file://.").unwrap();
    scope.add_fragment_rule(FragmentRule::new("http://fragments/{unknown}.html"));
    let scopes = ScopeTable::new(vec![scope]);
    let app = app_routes().layer(ComposeLayer::new(scopes, engine.clone()));

    let response = app.oneshot(get_request("/page")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(get_body_string(response).await.contains("TEMPLATE_ERROR"));
    assert!(engine.plans().is_empty());
}

#[tokio::test]
async fn test_reload_is_seen_by_running_layer() {
    let engine = RecordingEngine::default();
    let layer = ComposeLayer::new(ScopeTable::default(), engine.clone());
    let scopes = layer.scopes().clone();
    let app = app_routes().layer(layer);

    let response = app.clone().oneshot(get_request("/news")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    scopes.reload(parse_directives("compose /news http://backend/", &ParseContext::default()).unwrap());

    let response = app.oneshot(get_request("/news")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(engine.plans().len(), 1);
}

#[tokio::test]
async fn test_layer_from_config() {
    let config = Config::default()
        .with_root("/srv/www")
        .with_directives("compose /docs {\n  fetch nav.html\n}");
    let engine = RecordingEngine::default();
    let app = app_routes().layer(ComposeLayer::from_config(&config, engine.clone()).unwrap());

    let response = app.oneshot(get_request("/docs/intro")).await.unwrap();

    let body = get_body_string(response).await;
    assert_eq!(
        body.lines().next().unwrap(),
        "0:file:///srv/www/nav.html 1:file:///srv/www"
    );
}

#[tokio::test]
async fn test_unknown_placeholder_fails_at_load() {
    let config = Config::default()
        .with_directives("compose / {\n  fetch http://fragments/{unknown}.html\n}");
    assert!(ComposeLayer::from_config(&config, RecordingEngine::default()).is_err());

    let err = ScopeTable::from_config(&config).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    assert!(err.to_string().contains("{unknown}"));
}

#[tokio::test]
async fn test_layer_from_invalid_config_fails() {
    let config = Config::default().with_directives("compose / {\n  fetch a b 1s extra\n}");
    let result = ComposeLayer::from_config(&config, RecordingEngine::default());
    assert!(result.is_err());
}
