//! Actix API Key Demo Application
//!
//! Demonstrates API key pre-authentication with an in-memory user provider.

mod handlers;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use actix_apikey_core::http::security::api_key::{ApiKey, ApiKeyConfig, InMemoryUserProvider};
use actix_apikey_core::http::security::{ApiKeyTransform, User};

/// Creates the user provider with demo keys.
///
/// # Spring Security Equivalent
/// ```java
/// @Bean
/// public UserDetailsService userDetailsService() {
///     return new InMemoryUserDetailsManager(...);
/// }
/// ```
fn user_provider() -> InMemoryUserProvider {
    InMemoryUserProvider::new()
        .with_user(
            User::new("billing-service")
                .roles(&["ROLE_API".into()])
                .api_key(ApiKey::new("abc123").name("billing")),
        )
        .with_user(
            User::new("reporting-service")
                .roles(&["ROLE_REPORTS".into()])
                .api_key(ApiKey::new("rep456").expires_in(Duration::from_secs(3600))),
        )
        .with_user(
            User::new("retired-service")
                .roles(&["ROLE_API".into()])
                .api_key(ApiKey::new("old789").enabled(false)),
        )
}

/// Reads the firewall configuration from `APIKEY_CONFIG` (JSON), falling
/// back to header and query parameter extraction.
fn config() -> std::io::Result<ApiKeyConfig> {
    match std::env::var("APIKEY_CONFIG") {
        Ok(json) => serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e)),
        Err(_) => Ok(ApiKeyConfig::new("api")
            .header_token("Token")
            .query_param("api_key")),
    }
}

fn print_startup_info(config: &ApiKeyConfig) {
    println!("=== Actix API Key Demo ===");
    println!();
    println!("Server: http://127.0.0.1:8080");
    println!();
    println!("Firewall: {}", config.get_provider_key());
    println!("  header_token: {:?}", config.get_header_token());
    println!("  query_param:  {:?}", config.get_query_param());
    println!("  basic_auth:   {}", config.is_basic_auth());
    println!("  challenge:    {:?}", config.challenge());
    println!();
    println!("Keys:");
    println!("  abc123 - billing-service,   Roles: [ROLE_API]");
    println!("  rep456 - reporting-service, Roles: [ROLE_REPORTS], expires in 1h");
    println!("  old789 - retired-service,   disabled");
    println!();
    println!("Routes:");
    println!("  GET /          - requires a valid key");
    println!("  GET /status    - optional key");
    println!("  GET /api/items - requires ROLE_API");
    println!();
    println!("Examples:");
    println!("  curl -H 'Authorization: Token abc123' http://127.0.0.1:8080/");
    println!("  curl 'http://127.0.0.1:8080/api/items?api_key=abc123'");
    println!("  curl -i -H 'Authorization: Token old789' http://127.0.0.1:8080/  # 401");
    println!();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config()?;
    let listener = config
        .build_listener(Arc::new(user_provider()))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    print_startup_info(&config);

    HttpServer::new(move || {
        App::new().service(
            web::scope("")
                .wrap(ApiKeyTransform::new(listener.clone()))
                .service(handlers::home::index)
                .service(handlers::home::status)
                .service(handlers::api::api_items),
        )
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
