//! API Key firewall configuration.

use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use super::entry_point::ApiKeyEntryPoint;
use super::error::ApiKeyError;
use super::extractor::CheckMapping;
use super::listener::ApiKeyListener;
use super::provider::ApiKeyProvider;
use super::resolver::UserProvider;

/// Query parameter used when `query_param` is enabled without a name.
pub const DEFAULT_QUERY_PARAM: &str = "api_key";

/// Realm used when none is configured.
pub const DEFAULT_REALM: &str = "Secured API";

/// Configuration of one API key firewall.
///
/// Can be built in code or deserialized with serde:
///
/// ```
/// use actix_apikey_core::http::security::api_key::ApiKeyConfig;
///
/// let config: ApiKeyConfig = serde_json::from_str(
///     r#"{ "provider_key": "api", "header_token": "Token", "query_param": true }"#,
/// ).unwrap();
///
/// assert_eq!(config.get_query_param(), Some("api_key"));
/// assert_eq!(config.challenge(), Some("Token"));
/// assert_eq!(config.get_realm(), "Secured API");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiKeyConfig {
    /// Firewall identifier.
    #[serde(default)]
    provider_key: String,
    /// `?<name>=<key>`; `true` means `api_key`, `false` or `null` disable it.
    #[serde(default, deserialize_with = "query_param_or_flag")]
    query_param: Option<String>,
    /// `Authorization: <scheme> <key>`; `false` disables it.
    #[serde(default, deserialize_with = "scheme_or_false")]
    header_token: Option<String>,
    /// Username of HTTP Basic credentials.
    #[serde(default)]
    basic_auth: bool,
    #[serde(default = "default_realm")]
    realm: String,
    #[serde(default)]
    discriminator: Option<String>,
    /// Collapse every credential problem to `Bad credentials`.
    #[serde(default = "default_hide_errors")]
    hide_errors: bool,
}

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

fn default_hide_errors() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NameOrFlag {
    Flag(bool),
    Name(String),
}

fn query_param_or_flag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NameOrFlag>::deserialize(deserializer)? {
        Some(NameOrFlag::Flag(true)) => Some(DEFAULT_QUERY_PARAM.to_string()),
        None | Some(NameOrFlag::Flag(false)) => None,
        Some(NameOrFlag::Name(name)) => Some(name),
    })
}

fn scheme_or_false<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NameOrFlag>::deserialize(deserializer)? {
        None | Some(NameOrFlag::Flag(false)) => Ok(None),
        Some(NameOrFlag::Flag(true)) => Err(serde::de::Error::custom(
            "header_token expects a scheme name or false",
        )),
        Some(NameOrFlag::Name(scheme)) => Ok(Some(scheme)),
    }
}

impl ApiKeyConfig {
    /// Creates a configuration with every extraction method disabled.
    pub fn new(provider_key: impl Into<String>) -> Self {
        Self {
            provider_key: provider_key.into(),
            query_param: None,
            header_token: None,
            basic_auth: false,
            realm: default_realm(),
            discriminator: None,
            hide_errors: true,
        }
    }

    /// Reads the key from the given query parameter.
    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = Some(name.into());
        self
    }

    /// Reads the key from `Authorization: <scheme> <key>`.
    pub fn header_token(mut self, scheme: impl Into<String>) -> Self {
        self.header_token = Some(scheme.into());
        self
    }

    /// Reads the key from the HTTP Basic username.
    pub fn basic_auth(mut self, enabled: bool) -> Self {
        self.basic_auth = enabled;
        self
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn hide_errors(mut self, hide: bool) -> Self {
        self.hide_errors = hide;
        self
    }

    pub fn get_provider_key(&self) -> &str {
        &self.provider_key
    }

    pub fn get_query_param(&self) -> Option<&str> {
        self.query_param.as_deref()
    }

    pub fn get_header_token(&self) -> Option<&str> {
        self.header_token.as_deref()
    }

    pub fn is_basic_auth(&self) -> bool {
        self.basic_auth
    }

    pub fn get_realm(&self) -> &str {
        &self.realm
    }

    pub fn get_discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn is_hiding_errors(&self) -> bool {
        self.hide_errors
    }

    /// Enabled extraction methods.
    pub fn check_mapping(&self) -> CheckMapping {
        let mut mapping = CheckMapping::new().basic_auth(self.basic_auth);
        if let Some(scheme) = &self.header_token {
            mapping = mapping.header_token(scheme.as_str());
        }
        if let Some(name) = &self.query_param {
            mapping = mapping.query_param(name.as_str());
        }
        mapping
    }

    /// Scheme advertised in `WWW-Authenticate`.
    ///
    /// `Basic` when basic auth is enabled, else the header scheme, else
    /// `QueryString` when a query parameter is configured.
    pub fn challenge(&self) -> Option<&str> {
        if self.basic_auth {
            return Some("Basic");
        }
        if let Some(scheme) = self.header_token.as_deref().filter(|s| !s.is_empty()) {
            return Some(scheme);
        }
        self.query_param
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|_| "QueryString")
    }

    pub fn entry_point(&self) -> ApiKeyEntryPoint {
        ApiKeyEntryPoint::new(self.challenge(), self.realm.as_str())
    }

    /// Checks the configuration.
    ///
    /// # Errors
    /// `InvalidConfiguration` when the provider key is empty or no extraction
    /// method is enabled.
    pub fn validate(&self) -> Result<(), ApiKeyError> {
        if self.provider_key.is_empty() {
            return Err(ApiKeyError::InvalidConfiguration {
                message: "provider key must not be empty".to_string(),
            });
        }
        if self.check_mapping().is_empty() {
            return Err(ApiKeyError::InvalidConfiguration {
                message: "At least one of [query_param, header_token, basic_auth] parameters must be configured.".to_string(),
            });
        }
        Ok(())
    }

    /// Authentication provider for this firewall.
    pub fn build_provider(&self, user_provider: Arc<dyn UserProvider>) -> ApiKeyProvider {
        ApiKeyProvider::with_shared_provider(user_provider, self.provider_key.as_str())
            .hide_errors(self.hide_errors)
    }

    /// Validates the configuration and assembles the listener.
    pub fn build_listener(
        &self,
        user_provider: Arc<dyn UserProvider>,
    ) -> Result<ApiKeyListener, ApiKeyError> {
        self.validate()?;

        tracing::debug!(
            provider_key = %self.provider_key,
            challenge = ?self.challenge(),
            discriminator = ?self.discriminator,
            "building API key listener"
        );

        Ok(
            ApiKeyListener::new(self.provider_key.as_str(), self.build_provider(user_provider))?
                .check_mapping(self.check_mapping())
                .entry_point(self.entry_point())
                .discriminator(self.discriminator.clone()),
        )
    }
}
