//! # Actix API Key
//!
//! API key pre-authentication for Actix Web.
//!
//! A firewall ([`ApiKeyListener`](http::security::api_key::ApiKeyListener)) extracts
//! a key from the request, resolves it to a principal through a pluggable
//! [`UserProvider`](http::security::api_key::UserProvider), checks that the key is
//! enabled and not expired, and either installs an authenticated
//! [`Credential`](http::security::api_key::Credential) in the request's
//! [`SecurityContext`](http::security::SecurityContext) or answers with a
//! `401 Unauthorized` challenge.
//!
//! ## Modules
//!
//! - [`http::security`] - Authentication pipeline, middleware and extractors
//! - [`http::error`] - Error types

pub mod http;
