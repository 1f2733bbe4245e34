//! Per-attempt credential carried through the API key pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::http::security::user::Principal;

use super::extractor::FetchType;

/// Attribute under which the discriminator is recorded.
pub const DISCRIMINATOR_ATTRIBUTE: &str = "discriminator";

/// User name reported for a credential that has not been resolved yet.
pub const ANONYMOUS: &str = "anon.";

/// Principal slot of a [`Credential`].
#[derive(Debug, Clone)]
pub enum CredentialPrincipal {
    /// Placeholder used until the key is resolved.
    Anonymous,
    /// The principal the key resolved to.
    Resolved(Arc<dyn Principal>),
}

impl CredentialPrincipal {
    /// Returns the principal name, or `anon.` for the placeholder.
    pub fn get_username(&self) -> &str {
        match self {
            CredentialPrincipal::Anonymous => ANONYMOUS,
            CredentialPrincipal::Resolved(principal) => principal.get_username(),
        }
    }
}

/// Immutable API key credential.
///
/// # Spring Security Equivalent
/// `PreAuthenticatedAuthenticationToken`
///
/// An unauthenticated credential is built by the listener for each request.
/// Only [`ApiKeyProvider`](super::ApiKeyProvider) produces authenticated ones.
#[derive(Debug, Clone)]
pub struct Credential {
    principal: CredentialPrincipal,
    api_key: Option<String>,
    provider_key: String,
    roles: Vec<String>,
    attributes: BTreeMap<String, String>,
    authenticated: bool,
}

impl Credential {
    /// Creates an unauthenticated credential with the anonymous placeholder.
    pub fn unauthenticated(
        api_key: Option<String>,
        discriminator: Option<String>,
        provider_key: impl Into<String>,
    ) -> Self {
        let mut attributes = BTreeMap::new();
        if let Some(discriminator) = discriminator {
            attributes.insert(DISCRIMINATOR_ATTRIBUTE.to_string(), discriminator);
        }

        Credential {
            principal: CredentialPrincipal::Anonymous,
            api_key,
            provider_key: provider_key.into(),
            roles: Vec::new(),
            attributes,
            authenticated: false,
        }
    }

    /// Builds the authenticated successor of `unauthenticated`.
    ///
    /// Copies the key, discriminator, provider key and every attribute, and
    /// takes the roles from the principal.
    pub(crate) fn authenticated(unauthenticated: &Credential, principal: Arc<dyn Principal>) -> Self {
        Credential {
            roles: principal.get_roles().to_vec(),
            principal: CredentialPrincipal::Resolved(principal),
            api_key: unauthenticated.api_key.clone(),
            provider_key: unauthenticated.provider_key.clone(),
            attributes: unauthenticated.attributes.clone(),
            authenticated: true,
        }
    }

    /// Attaches a host attribute (builder pattern).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attaches an already resolved principal (builder pattern).
    ///
    /// The provider then skips resolution and only runs the validity checks.
    pub fn with_principal(mut self, principal: Arc<dyn Principal>) -> Self {
        self.principal = CredentialPrincipal::Resolved(principal);
        self
    }

    /// Returns the principal slot.
    pub fn get_principal(&self) -> &CredentialPrincipal {
        &self.principal
    }

    /// Returns the resolved principal, if any.
    pub fn get_user(&self) -> Option<&Arc<dyn Principal>> {
        match &self.principal {
            CredentialPrincipal::Resolved(principal) => Some(principal),
            CredentialPrincipal::Anonymous => None,
        }
    }

    /// Returns the principal name, `anon.` when unresolved.
    pub fn get_username(&self) -> &str {
        self.principal.get_username()
    }

    /// Returns the raw API key.
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the discriminator.
    pub fn get_discriminator(&self) -> Option<&str> {
        self.get_attribute(DISCRIMINATOR_ATTRIBUTE)
    }

    /// Returns the firewall this credential belongs to.
    pub fn get_provider_key(&self) -> &str {
        &self.provider_key
    }

    /// Returns the roles granted at authentication time.
    pub fn get_roles(&self) -> &[String] {
        &self.roles
    }

    /// Checks if the credential carries a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns all attributes.
    pub fn get_attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Returns one attribute.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the full authentication sequence succeeded.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let discriminator = match self.get_discriminator() {
            Some(d) => format!("{:?}", d),
            None => "null".to_string(),
        };
        write!(
            f,
            "ApiKeyUserToken(user=\"{}\", authenticated={}, discriminator={}, roles=\"{}\")",
            self.get_username(),
            self.authenticated,
            discriminator,
            self.roles.join(", ")
        )
    }
}

/// Progress of one authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Unattempted,
    Extracted,
    Resolving,
    Checking,
    Authenticated,
    Rejected,
}

impl AttemptState {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Authenticated | AttemptState::Rejected)
    }
}

/// A [`Credential`] together with how it was obtained.
#[derive(Debug, Clone)]
pub struct AuthenticationAttempt {
    credential: Credential,
    method: FetchType,
    check_value: String,
    state: AttemptState,
}

impl AuthenticationAttempt {
    /// Starts an attempt for a freshly extracted credential.
    pub fn new(credential: Credential, method: FetchType, check_value: impl Into<String>) -> Self {
        AuthenticationAttempt {
            credential,
            method,
            check_value: check_value.into(),
            state: AttemptState::Extracted,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn method(&self) -> FetchType {
        self.method
    }

    pub fn check_value(&self) -> &str {
        &self.check_value
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Moves to `state`; terminal states are final.
    pub(crate) fn advance(&mut self, state: AttemptState) {
        if !self.state.is_terminal() {
            self.state = state;
        }
    }
}
