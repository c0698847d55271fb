use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use silverfood::fetchers::{FetchStrategy, Fetcher, HtmlDocument};
use silverfood::{create_router, Analyzer, AppConfig, AppState, FetchError};

const RECIPE_PAGE: &str = r#"<html><head>
    <script type="application/ld+json">
    {"@type": "Recipe", "name": "Stamppot boerenkool",
     "recipeIngredient": ["1 kg aardappelen", "500 g boerenkool", "1 rookworst", "50 g roomboter", "snufje zout"]}
    </script></head><body><h1>Stamppot</h1></body></html>"#;

/// Serves a fixed page, or an error, and counts calls
struct StubFetcher {
    error: Option<FetchError>,
    calls: AtomicUsize,
}

impl StubFetcher {
    fn page() -> Arc<Self> {
        Arc::new(Self {
            error: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(error: FetchError) -> Arc<Self> {
        Arc::new(Self {
            error: Some(error),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<HtmlDocument, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        Ok(HtmlDocument {
            url: url.to_string(),
            html: RECIPE_PAGE.to_string(),
            strategy: FetchStrategy::Direct,
        })
    }
}

fn app(fetcher: Arc<StubFetcher>, requests: u32) -> Router {
    let mut config = AppConfig::default();
    config.rate_limit.requests = requests;
    app_with(fetcher, config)
}

fn app_with(fetcher: Arc<StubFetcher>, mut config: AppConfig) -> Router {
    config.nutrition.enabled = false;
    let analyzer = Analyzer::builder()
        .config(config.clone())
        .fetcher(fetcher)
        .build()
        .unwrap();
    create_router(AppState::new(Arc::new(analyzer), &config))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", "198.51.100.4")
        .body(Body::empty())
        .unwrap()
}

/// Request from a fixed peer address claiming to be forwarded for `client`
fn forwarded_get(uri: &str, client: &str) -> Request<Body> {
    let peer: SocketAddr = "192.0.2.10:50000".parse().unwrap();
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", client)
        .extension(ConnectInfo(peer))
        .body(Body::empty())
        .unwrap()
}

fn post_text(body: &'static str, content_type: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/analyse-text");
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const RECIPE_URL: &str = "url=https%3A%2F%2Fexample.com%2Frecept";

#[tokio::test]
async fn test_analyse_returns_full_analysis() {
    let app = app(StubFetcher::page(), 10);
    let response = app
        .oneshot(get(&format!("/analyse?{RECIPE_URL}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["recipe_title"], "Stamppot boerenkool");
    assert_eq!(body["all_ingredients"].as_array().unwrap().len(), 5);
    let score = body["health_score"].as_u64().unwrap();
    assert!(score <= 10);
    assert_eq!(body["portions"], 4);
    assert!(body["health_goals_scores"]["heart_health"].is_u64());
    for ingredient in body["all_ingredients"].as_array().unwrap() {
        assert!(ingredient["name"].is_string());
        assert!(ingredient["health_class"].is_string());
    }
    assert!(body["swaps"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["original"] == "roomboter"));
}

#[tokio::test]
async fn test_rate_limit_rejects_before_fetching() {
    let fetcher = StubFetcher::page();
    let app = app(fetcher.clone(), 1);

    let first = app
        .clone()
        .oneshot(get(&format!("/extension/quick-check?{RECIPE_URL}")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(get(&format!("/extension/quick-check?{RECIPE_URL}")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(json_body(second).await["reason"], "rate_limited");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let app = app(StubFetcher::page(), 1);
    for _ in 0..3 {
        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert!(body["openai_available"].is_boolean());
    }
}

#[tokio::test]
async fn test_short_text_is_bad_request() {
    let fetcher = StubFetcher::page();
    let app = app(fetcher.clone(), 10);
    let request = Request::builder()
        .method("POST")
        .uri("/analyse-text")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"text": "2 uien"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["reason"], "invalid_input");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_analyse_text_with_portions() {
    let app = app(StubFetcher::page(), 10);
    let request = Request::builder()
        .method("POST")
        .uri("/analyse-text")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"text": "- 2 uien\n- 300g gehakt\n- 1 blik tomaten\n- 200ml room", "portions": 2}"#,
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["portions"], 2);
    assert_eq!(body["all_ingredients"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_local_url_is_rejected_without_fetching() {
    let fetcher = StubFetcher::page();
    let app = app(fetcher.clone(), 10);
    let response = app
        .oneshot(get("/analyse?url=http%3A%2F%2F127.0.0.1%2Fadmin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_blocked_site_maps_to_forbidden() {
    let app = app(StubFetcher::failing(FetchError::Blocked("403".into())), 10);
    let response = app
        .oneshot(get(&format!("/analyse?{RECIPE_URL}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["reason"], "site_blocked");
    assert_eq!(body["detail"], "This site blocks automated access");
}

#[tokio::test]
async fn test_extension_envelopes() {
    let app = app(StubFetcher::page(), 10);
    let response = app
        .clone()
        .oneshot(get(&format!("/chrome/analyze?{RECIPE_URL}")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["recipe_title"], "Stamppot boerenkool");

    let response = app
        .oneshot(get(&format!("/extension/analyze?{RECIPE_URL}")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total_ingredients"], 5);
    assert!(body["quick_summary"].is_string());
    assert!(body["suggestions"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn test_extension_error_envelope() {
    let app = app(StubFetcher::failing(FetchError::Timeout("slow".into())), 10);
    let response = app
        .oneshot(get(&format!("/chrome/analyze?{RECIPE_URL}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["reason"], "timeout");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_quick_check_and_suggestions() {
    let app = app(StubFetcher::page(), 10);
    let response = app
        .clone()
        .oneshot(get(&format!("/extension/quick-check?{RECIPE_URL}")))
        .await
        .unwrap();
    let body = json_body(response).await;
    let score = body["health_score"].as_u64().unwrap();
    let expected = match score {
        8.. => "green",
        6..=7 => "yellow",
        4..=5 => "orange",
        _ => "red",
    };
    assert_eq!(body["badge_color"], expected);
    assert_eq!(body["ingredient_count"], 5);

    let response = app
        .oneshot(get(&format!("/extension/suggestions?{RECIPE_URL}")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert!(body["swaps"].as_array().unwrap().len() <= 3);
    assert!(body["total_possible_improvements"].as_u64().unwrap() >= 1);
    assert_eq!(body["current_score"], score);
}

#[tokio::test]
async fn test_ingredient_endpoints() {
    let app = app(StubFetcher::page(), 10);
    let response = app
        .clone()
        .oneshot(get("/ingredient-description?name=Rode%20Uien&healthy=true"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["name"], "rode uien");
    assert!(body["description"].as_str().unwrap().contains("quercetine"));

    let response = app
        .clone()
        .oneshot(get("/ingredient-substitutions?name=slagroom"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["substitutions"][0]["suggestion"], "Griekse yoghurt");

    let response = app
        .oneshot(get("/ingredient-substitutions?name="))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_info_endpoints() {
    let app = app(StubFetcher::page(), 10);
    let body = json_body(app.clone().oneshot(get("/supported-sites")).await.unwrap()).await;
    assert!(body["sites"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["domain"] == "ah.nl"));

    let body = json_body(app.clone().oneshot(get("/chrome/health-check")).await.unwrap()).await;
    assert_eq!(body["chrome_extension_ready"], true);

    let body = json_body(app.oneshot(get("/learned-patterns")).await.unwrap()).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_spoofed_forwarded_header_shares_peer_budget() {
    let fetcher = StubFetcher::page();
    let app = app(fetcher.clone(), 1);
    let uri = format!("/extension/quick-check?{RECIPE_URL}");

    let mut statuses = Vec::new();
    for i in 0..4 {
        let response = app
            .clone()
            .oneshot(forwarded_get(&uri, &format!("203.0.113.{i}")))
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(statuses[0], StatusCode::OK);
    assert!(statuses[1..]
        .iter()
        .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_forwarded_header_is_honoured_behind_proxy() {
    let fetcher = StubFetcher::page();
    let mut config = AppConfig::default();
    config.rate_limit.requests = 1;
    config.rate_limit.trust_proxy = true;
    let app = app_with(fetcher.clone(), config);
    let uri = format!("/extension/quick-check?{RECIPE_URL}");

    for client in ["203.0.113.1", "203.0.113.2"] {
        let response = app.clone().oneshot(forwarded_get(&uri, client)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let repeat = app.oneshot(forwarded_get(&uri, "203.0.113.1")).await.unwrap();
    assert_eq!(repeat.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_malformed_json_gets_json_error() {
    let app = app(StubFetcher::page(), 10);
    let response = app
        .oneshot(post_text("{text: 1", Some("application/json")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["reason"], "invalid_input");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_gets_json_error() {
    let app = app(StubFetcher::page(), 10);
    let response = app
        .oneshot(post_text(r#"{"text": "- 2 uien\n- 300g gehakt"}"#, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["reason"], "invalid_input");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Content-Type"));
}

#[tokio::test]
async fn test_bad_query_values_get_json_errors() {
    let fetcher = StubFetcher::page();
    let app = app(fetcher.clone(), 10);

    let response = app
        .clone()
        .oneshot(get(&format!("/analyse?{RECIPE_URL}&portions=abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["reason"], "invalid_input");
    assert!(body["detail"].as_str().unwrap().contains("portions"));

    let response = app
        .oneshot(get(&format!("/chrome/analyze?{RECIPE_URL}&portions=abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["reason"], "invalid_input");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}
