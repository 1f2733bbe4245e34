//! Audit logging tests.


use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;

use actix_apikey_core::http::security::api_key::FetchType;
use actix_apikey_core::http::security::{InMemoryEventStore, SecurityEventSeverity, SecurityEventType};

use common::{create_app, test_config, test_listener, test_users, token};

#[actix_web::test]
async fn test_success_is_audited() {
    let store = InMemoryEventStore::new();
    let config = test_config().discriminator("mobile");
    let app = create_app(test_listener(&config, Arc::new(test_users()), &store)).await;

    let req = test::TestRequest::get()
        .uri("/api/items")
        .insert_header(("Authorization", token("Token", "shared-key")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // mobile-app lacks ROLE_API
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let events = store.get_events();
    assert_eq!(events.len(), 2);

    let extracted = &events[0];
    assert_eq!(extracted.event_type, SecurityEventType::KeyExtracted);
    assert_eq!(extracted.provider_key.as_deref(), Some("api"));
    assert_eq!(extracted.fetch_type.as_deref(), Some(FetchType::HeaderToken.as_str()));
    assert_eq!(extracted.check_value.as_deref(), Some("Token"));
    assert_eq!(extracted.discriminator.as_deref(), Some("mobile"));
    assert_eq!(extracted.path.as_deref(), Some("/api/items"));

    let success = &events[1];
    assert_eq!(success.event_type, SecurityEventType::AuthenticationSuccess);
    assert_eq!(success.username.as_deref(), Some("mobile-app"));
    assert_eq!(success.severity, SecurityEventSeverity::Info);
}

#[actix_web::test]
async fn test_rejection_is_audited() {
    let store = InMemoryEventStore::new();
    let app = create_app(test_listener(&test_config(), Arc::new(test_users()), &store)).await;

    let req = test::TestRequest::get().uri("/?api_key=expired-key").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let failures = store.get_events_by_type(&SecurityEventType::AuthenticationFailure);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].severity, SecurityEventSeverity::Warning);
    assert_eq!(failures[0].api_key.as_deref(), Some("expired-key"));
    assert_eq!(failures[0].fetch_type.as_deref(), Some(FetchType::QueryParam.as_str()));
    assert!(failures[0].username.is_none());
}

#[actix_web::test]
async fn test_events_serialize_to_json() {
    let store = InMemoryEventStore::new();
    let app = create_app(test_listener(&test_config(), Arc::new(test_users()), &store)).await;

    let req = test::TestRequest::get().uri("/?api_key=abc123").to_request();
    test::call_service(&app, req).await;

    for event in store.get_events() {
        let json: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();
        assert_eq!(json["provider_key"], "api");
        assert_eq!(json["fetch_type"], "query_param");
        assert_eq!(json["check_value"], "api_key");
    }
}
