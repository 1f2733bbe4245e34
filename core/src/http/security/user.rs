//! User model for API key authentication.
//!
//! # Spring Equivalent
//! `UserDetails` interface

use std::fmt;

use crate::http::security::api_key::ApiKey;

/// Identity resolved from an API key.
///
/// # Spring Equivalent
/// `UserDetails`
///
/// Principals that also hold API key state expose it through
/// [`as_api_key_user`](Principal::as_api_key_user); the validity checks are
/// skipped for principals that return `None`.
pub trait Principal: fmt::Debug + Send + Sync {
    /// Returns the stable identity of the principal.
    fn get_username(&self) -> &str;

    /// Returns the role identifiers granted to the principal.
    fn get_roles(&self) -> &[String];

    /// Returns the API key capability, if the principal implements it.
    fn as_api_key_user(&self) -> Option<&dyn ApiKeyUser> {
        None
    }
}

/// Extended capability for principals that track API key state per discriminator.
pub trait ApiKeyUser: Principal {
    /// Returns the key value held for the discriminator.
    fn get_api_key(&self, discriminator: Option<&str>) -> Option<&str>;

    /// Whether the key for the discriminator is enabled.
    fn is_api_key_enabled(&self, discriminator: Option<&str>) -> bool;

    /// Whether the key for the discriminator is still valid in time.
    fn is_api_key_non_expired(&self, discriminator: Option<&str>) -> bool;
}

/// Represents a user holding one or more API keys.
///
/// # Example
/// ```
/// use actix_apikey_core::http::security::{ApiKeyUser, Principal, User};
/// use actix_apikey_core::http::security::api_key::ApiKey;
///
/// let user = User::new("service-account")
///     .roles(&["ROLE_API".into()])
///     .api_key(ApiKey::new("k-mobile").discriminator("mobile"))
///     .api_key(ApiKey::new("k-web").discriminator("web").enabled(false));
///
/// assert!(user.has_role("ROLE_API"));
/// assert!(user.is_api_key_enabled(Some("mobile")));
/// assert!(!user.is_api_key_enabled(Some("web")));
/// ```
#[derive(Clone, Debug)]
pub struct User {
    username: String,
    roles: Vec<String>,
    authorities: Vec<String>,
    api_keys: Vec<ApiKey>,
}

impl User {
    /// Creates a new user without roles or keys.
    pub fn new(username: impl Into<String>) -> Self {
        User {
            username: username.into(),
            roles: Vec::new(),
            authorities: Vec::new(),
            api_keys: Vec::new(),
        }
    }

    /// Returns the user's authorities.
    pub fn get_authorities(&self) -> &[String] {
        &self.authorities
    }

    /// Returns all keys held by the user.
    pub fn get_api_keys(&self) -> &[ApiKey] {
        &self.api_keys
    }

    /// Adds roles to the user (builder pattern).
    pub fn roles(mut self, roles: &[String]) -> Self {
        for role in roles {
            if !self.roles.contains(role) {
                self.roles.push(role.clone());
            }
        }
        self
    }

    /// Adds authorities to the user (builder pattern).
    pub fn authorities(mut self, authorities: &[String]) -> Self {
        for authority in authorities {
            if !self.authorities.contains(authority) {
                self.authorities.push(authority.clone());
            }
        }
        self
    }

    /// Adds an API key to the user (builder pattern).
    ///
    /// A key already present for the same discriminator is replaced.
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_keys
            .retain(|k| k.get_discriminator() != key.get_discriminator());
        self.api_keys.push(key);
        self
    }

    /// Returns the key held for the discriminator.
    pub fn find_key(&self, discriminator: Option<&str>) -> Option<&ApiKey> {
        self.api_keys.iter().find(|k| k.belongs_to(discriminator))
    }

    /// Checks whether the user holds `key` within `discriminator`.
    pub fn holds_key(&self, key: &str, discriminator: Option<&str>) -> bool {
        self.api_keys.iter().any(|k| k.matches(key, discriminator))
    }

    /// Checks if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Checks if the user has ANY of the specified roles (OR logic).
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    /// Checks if the user has a specific authority.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

impl Principal for User {
    fn get_username(&self) -> &str {
        &self.username
    }

    fn get_roles(&self) -> &[String] {
        &self.roles
    }

    fn as_api_key_user(&self) -> Option<&dyn ApiKeyUser> {
        Some(self)
    }
}

impl ApiKeyUser for User {
    fn get_api_key(&self, discriminator: Option<&str>) -> Option<&str> {
        self.find_key(discriminator).map(ApiKey::get_key)
    }

    fn is_api_key_enabled(&self, discriminator: Option<&str>) -> bool {
        self.find_key(discriminator).is_some_and(ApiKey::is_enabled)
    }

    fn is_api_key_non_expired(&self, discriminator: Option<&str>) -> bool {
        self.find_key(discriminator).is_some_and(|k| !k.is_expired())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User {{ username: {}, roles: {:?}, authorities: {:?} }}",
            self.username, self.roles, self.authorities
        )
    }
}
