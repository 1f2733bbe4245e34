//! Challenge response tests.
//!
//! Tests for the `401` response and its `WWW-Authenticate` header.


use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::test;

use actix_apikey_core::http::security::api_key::ApiKeyConfig;
use actix_apikey_core::http::security::InMemoryEventStore;

use common::{basic_auth, create_app, test_listener, test_users, token};

async fn challenge_for(config: ApiKeyConfig, auth: Option<String>, uri: &str) -> (StatusCode, Option<String>) {
    let store = InMemoryEventStore::new();
    let app = create_app(test_listener(&config, Arc::new(test_users()), &store)).await;

    let mut req = test::TestRequest::get().uri(uri);
    if let Some(auth) = auth {
        req = req.insert_header(("Authorization", auth));
    }

    let resp = test::call_service(&app, req.to_request()).await;
    let challenge = resp
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap().to_string());
    (resp.status(), challenge)
}

#[actix_web::test]
async fn test_header_token_challenge() {
    let config = ApiKeyConfig::new("api").header_token("Token");

    let (status, challenge) =
        challenge_for(config, Some(token("Token", "unknown")), "/").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("Token realm=\"Secured API\""));
}

#[actix_web::test]
async fn test_basic_challenge_wins() {
    let config = ApiKeyConfig::new("api")
        .header_token("Token")
        .basic_auth(true)
        .realm("Internal");

    let (status, challenge) =
        challenge_for(config, Some(basic_auth("unknown", "")), "/").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("Basic realm=\"Internal\""));
}

#[actix_web::test]
async fn test_query_string_challenge() {
    let config = ApiKeyConfig::new("api").query_param("key");

    let (status, challenge) = challenge_for(config, None, "/?key=unknown").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("QueryString realm=\"Secured API\""));
}

#[actix_web::test]
async fn test_empty_realm_has_no_challenge_header() {
    let config = ApiKeyConfig::new("api").header_token("Token").realm("");

    let (status, challenge) =
        challenge_for(config, Some(token("Token", "unknown")), "/").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge, None);
}

#[actix_web::test]
async fn test_rejected_request_never_reaches_handler() {
    // /status accepts anonymous callers, a bad key must still be refused
    let config = ApiKeyConfig::new("api").header_token("Token");

    let (status, _) = challenge_for(config, Some(token("Token", "unknown")), "/status").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_config_from_json() {
    let config: ApiKeyConfig = serde_json::from_str(
        r#"{ "provider_key": "api", "query_param": true, "realm": "Json API" }"#,
    )
    .unwrap();

    let (status, challenge) = challenge_for(config, None, "/?api_key=unknown").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some("QueryString realm=\"Json API\""));
}
