//! API Key model.

use std::time::{Duration, SystemTime};

/// A single API key held by a [`User`](crate::http::security::User).
///
/// A user may hold several keys, one per discriminator (e.g. a `"mobile"` key
/// and a `"web"` key for the same account). A key without a discriminator
/// belongs to the default namespace.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use actix_apikey_core::http::security::api_key::ApiKey;
///
/// let key = ApiKey::new("sk_live_abc123")
///     .name("Mobile key")
///     .discriminator("mobile")
///     .expires_in(Duration::from_secs(86400 * 365));
///
/// assert!(key.matches("sk_live_abc123", Some("mobile")));
/// assert!(!key.matches("sk_live_abc123", None));
/// ```
#[derive(Debug, Clone)]
pub struct ApiKey {
    /// The API key value (e.g., "sk_live_abc123")
    key: String,
    /// Namespace the key belongs to
    discriminator: Option<String>,
    /// Human-readable name for the key
    name: Option<String>,
    /// Whether the key is enabled
    enabled: bool,
    /// When the key was created
    created_at: SystemTime,
    /// When the key expires (if set)
    expires_at: Option<SystemTime>,
}

impl ApiKey {
    /// Creates a new, enabled, non-expiring API key in the default namespace.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            discriminator: None,
            name: None,
            enabled: true,
            created_at: SystemTime::now(),
            expires_at: None,
        }
    }

    /// Sets the discriminator (namespace) of this key.
    pub fn discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    /// Sets the human-readable name for this key.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets whether the key is enabled.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the expiration time.
    pub fn expires_at(mut self, expires_at: SystemTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets expiration relative to now.
    ///
    /// A duration past the representable time range leaves the key
    /// non-expiring.
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expires_at = SystemTime::now().checked_add(duration);
        self
    }

    // Getters

    /// Returns the API key value.
    pub fn get_key(&self) -> &str {
        &self.key
    }

    /// Returns the discriminator.
    pub fn get_discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    /// Returns the human-readable name.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns whether the key is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns when the key was created.
    pub fn get_created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Returns when the key expires.
    pub fn get_expires_at(&self) -> Option<SystemTime> {
        self.expires_at
    }

    /// Checks if the key has expired.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => SystemTime::now() > expires_at,
            None => false,
        }
    }

    /// Checks whether this key belongs to the given discriminator.
    pub fn belongs_to(&self, discriminator: Option<&str>) -> bool {
        self.discriminator.as_deref() == discriminator
    }

    /// Checks whether this key has the given value within the given discriminator.
    pub fn matches(&self, key: &str, discriminator: Option<&str>) -> bool {
        self.key == key && self.belongs_to(discriminator)
    }
}
