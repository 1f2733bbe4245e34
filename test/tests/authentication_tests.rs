//! Authentication tests.
//!
//! Tests for key resolution, validity checks, error hiding and discriminators.


use std::sync::atomic::Ordering;
use std::sync::Arc;

use actix_web::dev::Service;
use actix_web::http::{header, StatusCode};
use actix_web::test;

use actix_apikey_core::http::security::api_key::{
    ApiKeyConfig, ApiKeyError, ChainUserProvider, Credential, Outcome,
};
use actix_apikey_core::http::security::{InMemoryEventStore, SecurityContext, SecurityEventType};

use common::{
    create_app, create_test_app, test_config, test_listener, test_users, token, FailingProvider,
    UsernameOnlyProvider,
};

// =============================================================================
// Success Tests
// =============================================================================

#[actix_web::test]
async fn test_token_scenario_grants_role() {
    let config = ApiKeyConfig::new("api").header_token("Token");
    let store = InMemoryEventStore::new();
    let listener = test_listener(&config, Arc::new(test_users()), &store);

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("Authorization", "Token abc123"))
        .to_http_request();
    let mut ctx = SecurityContext::new();

    let outcome = listener.handle(&req, &mut ctx).unwrap();

    assert!(outcome.is_authenticated());
    let credential = ctx.get_credential().unwrap();
    assert!(credential.is_authenticated());
    assert_eq!(credential.get_username(), "billing-service");
    assert!(credential.has_role("ROLE_API"));
    assert_eq!(credential.get_api_key(), Some("abc123"));
    assert_eq!(credential.get_provider_key(), "api");
}

#[actix_web::test]
async fn test_role_reaches_handler() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/api/items")
        .insert_header(("Authorization", token("Token", "abc123")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_same_key_twice_is_idempotent() {
    let app = create_test_app().await;

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Authorization", token("Token", "abc123")))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        bodies.push(test::read_body(resp).await);
    }

    assert_eq!(bodies[0], bodies[1]);
}

// =============================================================================
// Error Hiding Tests
// =============================================================================

#[actix_web::test]
async fn test_hidden_failures_are_indistinguishable() {
    let app = create_test_app().await;

    let mut responses = Vec::new();
    for key in ["unknown-key", "disabled-key", "expired-key"] {
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Authorization", token("Token", key)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let challenge = resp.headers().get(header::WWW_AUTHENTICATE).cloned();
        let body = test::read_body(resp).await;
        responses.push((status, challenge, body));
    }

    assert_eq!(responses[0].0, StatusCode::UNAUTHORIZED);
    assert_eq!(responses[0], responses[1]);
    assert_eq!(responses[1], responses[2]);
}

#[actix_web::test]
async fn test_hidden_failures_audit_the_same_reason() {
    let store = InMemoryEventStore::new();
    let listener = test_listener(&test_config(), Arc::new(test_users()), &store);

    for key in ["unknown-key", "disabled-key", "expired-key"] {
        let req = test::TestRequest::get()
            .uri(&format!("/?api_key={}", key))
            .to_http_request();
        let outcome = listener.handle(&req, &mut SecurityContext::new()).unwrap();
        assert!(outcome.is_rejected());
    }

    let failures = store.get_events_by_type(&SecurityEventType::AuthenticationFailure);
    assert_eq!(failures.len(), 3);
    assert!(failures.iter().all(|e| e.error == failures[0].error));
}

#[actix_web::test]
async fn test_unhidden_failures_report_their_reason() {
    let config = test_config().hide_errors(false);
    let store = InMemoryEventStore::new();
    let listener = test_listener(&config, Arc::new(test_users()), &store);

    for key in ["unknown-key", "disabled-key", "expired-key"] {
        let req = test::TestRequest::get()
            .uri(&format!("/?api_key={}", key))
            .to_http_request();
        listener.handle(&req, &mut SecurityContext::new()).unwrap();
    }

    let reasons: Vec<_> = store
        .get_events_by_type(&SecurityEventType::AuthenticationFailure)
        .into_iter()
        .filter_map(|e| e.error)
        .collect();

    assert_eq!(reasons.len(), 3);
    assert_ne!(reasons[0], reasons[1]);
    assert_ne!(reasons[1], reasons[2]);
    assert!(reasons[1].contains("not enabled"));
    assert!(reasons[2].contains("expired"));
}

#[actix_web::test]
async fn test_rejection_clears_credential_of_same_firewall() {
    let store = InMemoryEventStore::new();
    let listener = test_listener(&test_config(), Arc::new(test_users()), &store);
    let mut ctx = SecurityContext::new();

    let good = test::TestRequest::get().uri("/?api_key=abc123").to_http_request();
    listener.handle(&good, &mut ctx).unwrap();
    assert!(ctx.is_authenticated());

    let bad = test::TestRequest::get().uri("/?api_key=expired-key").to_http_request();
    let outcome = listener.handle(&bad, &mut ctx).unwrap();

    assert!(matches!(outcome, Outcome::Rejected(_)));
    assert!(ctx.get_credential().is_none());
}

// =============================================================================
// Discriminator Tests
// =============================================================================

#[actix_web::test]
async fn test_discriminator_selects_tenant() {
    for (discriminator, expected) in [("mobile", "mobile-app"), ("web", "web-app")] {
        let config = test_config().discriminator(discriminator);
        let store = InMemoryEventStore::new();
        let app = create_app(test_listener(&config, Arc::new(test_users()), &store)).await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Authorization", token("Token", "shared-key")))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains(expected));
    }
}

#[actix_web::test]
async fn test_key_of_other_tenant_is_rejected() {
    let config = test_config().discriminator("mobile");
    let store = InMemoryEventStore::new();
    let app = create_app(test_listener(&config, Arc::new(test_users()), &store)).await;

    // registered without discriminator
    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("Authorization", token("Token", "abc123")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_shared_key_without_discriminator_is_rejected() {
    let app = create_test_app().await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("Authorization", token("Token", "shared-key")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Provider Chain Tests
// =============================================================================

#[actix_web::test]
async fn test_chain_skips_non_capable_and_tries_next() {
    let chain = ChainUserProvider::new()
        .with_provider(UsernameOnlyProvider)
        .with_provider(test_users());
    let store = InMemoryEventStore::new();
    let app = create_app(test_listener(&test_config(), Arc::new(chain), &store)).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("Authorization", token("Token", "abc123")))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_chain_without_capable_provider_is_fatal() {
    let chain = ChainUserProvider::new().with_provider(UsernameOnlyProvider);
    let store = InMemoryEventStore::new();
    let listener = test_listener(&test_config(), Arc::new(chain), &store);

    let req = test::TestRequest::get().uri("/?api_key=abc123").to_http_request();
    let err = listener
        .handle(&req, &mut SecurityContext::new())
        .unwrap_err();

    assert!(matches!(err, ApiKeyError::UnsupportedResolver { .. }));
}

// =============================================================================
// Service Failure Tests
// =============================================================================

#[actix_web::test]
async fn test_service_failure_is_500_without_challenge() {
    let failing = Arc::new(FailingProvider::default());
    let store = InMemoryEventStore::new();
    let app = create_app(test_listener(&test_config(), failing.clone(), &store)).await;

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(("Authorization", token("Token", "abc123")))
        .to_request();

    let err = match app.call(req).await {
        Ok(resp) => panic!("expected an error, got {}", resp.status()),
        Err(err) => err,
    };

    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_none());
    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);

    assert!(store
        .get_events_by_type(&SecurityEventType::AuthenticationFailure)
        .is_empty());
    assert_eq!(
        store
            .get_events_by_type(&SecurityEventType::ServiceFailure)
            .len(),
        1
    );
}

#[actix_web::test]
async fn test_service_failure_leaves_context_untouched() {
    let store = InMemoryEventStore::new();
    let listener = test_listener(
        &test_config(),
        Arc::new(FailingProvider::default()),
        &store,
    );

    let previous = Credential::unauthenticated(Some("previous".into()), None, "api");
    let mut ctx = SecurityContext::with_credential(previous);

    let req = test::TestRequest::get().uri("/?api_key=abc123").to_http_request();
    let err = listener.handle(&req, &mut ctx).unwrap_err();

    assert!(matches!(err, ApiKeyError::ServiceFailure { .. }));
    assert_eq!(
        ctx.get_credential().and_then(Credential::get_api_key),
        Some("previous")
    );
}

#[actix_web::test]
async fn test_chain_stops_at_service_failure() {
    let chain = ChainUserProvider::new()
        .with_provider(FailingProvider::default())
        .with_provider(test_users());
    let store = InMemoryEventStore::new();
    let listener = test_listener(&test_config(), Arc::new(chain), &store);

    let req = test::TestRequest::get().uri("/?api_key=abc123").to_http_request();
    let err = listener
        .handle(&req, &mut SecurityContext::new())
        .unwrap_err();

    assert!(matches!(err, ApiKeyError::ServiceFailure { .. }));
}
