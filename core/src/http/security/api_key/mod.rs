//! API Key pre-authentication for Actix Web.
//!
//! # Overview
//!
//! Clients send a pre-shared key with each request. The key is resolved to a
//! principal, checked for enablement and expiry, and the request either
//! proceeds with an authenticated [`Credential`] or is answered with a
//! `401` challenge.
//!
//! # Key Locations
//!
//! Checked in this fixed order, the first hit wins:
//! 1. **Authorization header**: `Authorization: Token your-api-key`
//! 2. **Query parameter**: `?api_key=your-api-key`
//! 3. **HTTP Basic**: the username of `Authorization: Basic ...`
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use actix_apikey_core::http::security::api_key::{ApiKey, ApiKeyConfig, InMemoryUserProvider};
//! use actix_apikey_core::http::security::{ApiKeyTransform, User};
//!
//! let users = InMemoryUserProvider::new().with_user(
//!     User::new("billing-service")
//!         .roles(&["ROLE_API".into()])
//!         .api_key(ApiKey::new("abc123")),
//! );
//!
//! let listener = ApiKeyConfig::new("api")
//!     .header_token("Token")
//!     .query_param("api_key")
//!     .build_listener(Arc::new(users))?;
//!
//! App::new()
//!     .wrap(ApiKeyTransform::new(listener))
//!     .service(my_api_endpoint)
//! ```
//!
//! # Discriminators
//!
//! A listener configured with a discriminator only accepts keys registered
//! under the same discriminator, so one key value can exist in several
//! tenants without colliding.
//!
//! # Error Hiding
//!
//! By default unknown, disabled and expired keys all produce the same
//! `Bad credentials` rejection. Resolver failures are never hidden: they
//! surface as a `500` and the request is not challenged.
//!
//! # Spring Security Comparison
//!
//! | Spring Security | Actix API Key |
//! |-----------------|---------------|
//! | `AbstractPreAuthenticatedProcessingFilter` | [`ApiKeyListener`] |
//! | `PreAuthenticatedAuthenticationProvider` | [`ApiKeyProvider`] |
//! | `UserDetailsService` | [`UserProvider`] |
//! | `UserDetailsChecker` | [`UserChecker`] |
//! | `AuthenticationEntryPoint` | [`ApiKeyEntryPoint`] |

mod checker;
mod config;
mod credential;
mod entry_point;
mod error;
mod extractor;
mod key;
mod listener;
mod provider;
mod resolver;

pub use checker::{ApiKeyUserChecker, UserChecker};
pub use config::{ApiKeyConfig, DEFAULT_QUERY_PARAM, DEFAULT_REALM};
pub use credential::{
    AttemptState, AuthenticationAttempt, Credential, CredentialPrincipal, ANONYMOUS,
    DISCRIMINATOR_ATTRIBUTE,
};
pub use entry_point::ApiKeyEntryPoint;
pub use error::{ApiKeyError, CheckPhase};
pub use extractor::{extract_from, ApiKeyExtractor, CheckMapping, ExtractedKey, FetchType};
pub use key::ApiKey;
pub use listener::{ApiKeyListener, Outcome};
pub use provider::ApiKeyProvider;
pub use resolver::{ApiKeyUserProvider, ChainUserProvider, InMemoryUserProvider, UserProvider};
