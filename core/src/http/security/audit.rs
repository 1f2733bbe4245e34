//! Security audit events for API key authentication.
//!
//! The listener reports every step of an attempt as a [`SecurityEvent`] to an
//! injected [`AuditLogger`]. Handlers decide where events go: the
//! [`TracingHandler`] forwards them to `tracing`, the [`InMemoryEventStore`]
//! keeps them for tests.
//!
//! # Spring Security Equivalent
//! Similar to Spring Security's `AuthenticationEventPublisher`.
//!
//! # Example
//!
//! ```
//! use actix_apikey_core::http::security::audit::{AuditLogger, SecurityEvent, SecurityEventType};
//!
//! let audit_logger = AuditLogger::new().with_handler(|event| {
//!     println!("[AUDIT] {}", event.to_log_line());
//! });
//!
//! audit_logger.log(SecurityEvent::new(SecurityEventType::AuthenticationSuccess).username("svc"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use super::api_key::{Credential, FetchType};

/// Security event types for audit logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityEventType {
    /// A key was found in the request
    KeyExtracted,
    /// The key resolved to a valid principal
    AuthenticationSuccess,
    /// The key was rejected with a challenge
    AuthenticationFailure,
    /// Authentication aborted by a resolver, checker or configuration fault
    ServiceFailure,
    /// Custom security event
    Custom(String),
}

impl fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityEventType::KeyExtracted => write!(f, "KEY_EXTRACTED"),
            SecurityEventType::AuthenticationSuccess => write!(f, "AUTHENTICATION_SUCCESS"),
            SecurityEventType::AuthenticationFailure => write!(f, "AUTHENTICATION_FAILURE"),
            SecurityEventType::ServiceFailure => write!(f, "SERVICE_FAILURE"),
            SecurityEventType::Custom(name) => write!(f, "CUSTOM_{}", name.to_uppercase()),
        }
    }
}

/// Severity level of security events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SecurityEventSeverity {
    #[default]
    Info,
    Warning,
    Error,
}

impl fmt::Display for SecurityEventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityEventSeverity::Info => write!(f, "INFO"),
            SecurityEventSeverity::Warning => write!(f, "WARNING"),
            SecurityEventSeverity::Error => write!(f, "ERROR"),
        }
    }
}

impl SecurityEventType {
    /// Get the default severity for this event type.
    pub fn default_severity(&self) -> SecurityEventSeverity {
        match self {
            SecurityEventType::KeyExtracted
            | SecurityEventType::AuthenticationSuccess
            | SecurityEventType::Custom(_) => SecurityEventSeverity::Info,
            SecurityEventType::AuthenticationFailure => SecurityEventSeverity::Warning,
            SecurityEventType::ServiceFailure => SecurityEventSeverity::Error,
        }
    }
}

/// A security audit event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SecurityEvent {
    /// Unique event ID
    pub id: String,
    /// Event timestamp (Unix epoch milliseconds)
    pub timestamp: u64,
    #[serde(serialize_with = "display")]
    pub event_type: SecurityEventType,
    #[serde(serialize_with = "display")]
    pub severity: SecurityEventSeverity,
    /// Firewall the event belongs to
    pub provider_key: Option<String>,
    /// Resolved principal name
    pub username: Option<String>,
    /// Request path
    pub path: Option<String>,
    /// Extraction method that produced the key
    pub fetch_type: Option<String>,
    /// Configured value of the extraction method
    pub check_value: Option<String>,
    pub discriminator: Option<String>,
    /// Raw API key
    pub api_key: Option<String>,
    /// Additional details
    pub details: BTreeMap<String, String>,
    /// Error message (for failure events)
    pub error: Option<String>,
}

fn display<T: fmt::Display, S: serde::Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl SecurityEvent {
    /// Create a new security event.
    pub fn new(event_type: SecurityEventType) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            id: generate_event_id(),
            timestamp: now,
            severity: event_type.default_severity(),
            event_type,
            provider_key: None,
            username: None,
            path: None,
            fetch_type: None,
            check_value: None,
            discriminator: None,
            api_key: None,
            details: BTreeMap::new(),
            error: None,
        }
    }

    pub fn provider_key(mut self, provider_key: impl Into<String>) -> Self {
        self.provider_key = Some(provider_key.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the extraction method and its configured value.
    pub fn fetched_by(mut self, method: FetchType, check_value: impl Into<String>) -> Self {
        self.fetch_type = Some(method.to_string());
        self.check_value = Some(check_value.into());
        self
    }

    pub fn discriminator(mut self, discriminator: Option<&str>) -> Self {
        self.discriminator = discriminator.map(String::from);
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the severity (overrides default).
    pub fn severity(mut self, severity: SecurityEventSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Add a detail.
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Set the error message.
    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    // Convenience constructors

    /// Create an event describing `credential`, with its key, discriminator
    /// and provider key filled in.
    pub fn for_credential(event_type: SecurityEventType, credential: &Credential) -> Self {
        let event = Self::new(event_type)
            .provider_key(credential.get_provider_key())
            .discriminator(credential.get_discriminator());
        match credential.get_api_key() {
            Some(key) => event.api_key(key),
            None => event,
        }
    }

    /// Create an authentication success event.
    pub fn authentication_success(credential: &Credential) -> Self {
        Self::for_credential(SecurityEventType::AuthenticationSuccess, credential)
            .username(credential.get_username())
    }

    /// Create an authentication failure event.
    pub fn authentication_failure(credential: &Credential, reason: &str) -> Self {
        Self::for_credential(SecurityEventType::AuthenticationFailure, credential).error(reason)
    }

    /// Format the event as a log line.
    pub fn to_log_line(&self) -> String {
        let mut parts = vec![
            format!("[{}]", self.severity),
            format!("[{}]", self.event_type),
        ];

        if let Some(ref provider_key) = self.provider_key {
            parts.push(format!("provider={}", provider_key));
        }
        if let (Some(fetch_type), Some(check_value)) = (&self.fetch_type, &self.check_value) {
            parts.push(format!("via={}[{}]", fetch_type, check_value));
        }
        if let Some(ref discriminator) = self.discriminator {
            parts.push(format!("discriminator={}", discriminator));
        }
        if self.event_type == SecurityEventType::KeyExtracted {
            if let Some(ref api_key) = self.api_key {
                parts.push(format!("key={}", api_key));
            }
        }
        if let Some(ref username) = self.username {
            parts.push(format!("user={}", username));
        }
        if let Some(ref path) = self.path {
            parts.push(format!("path={}", path));
        }
        if let Some(ref error) = self.error {
            parts.push(format!("error=\"{}\"", error));
        }
        for (k, v) in &self.details {
            parts.push(format!("{}={}", k, v));
        }

        parts.join(" ")
    }

    /// Format the event as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_log_line())
    }
}

/// Generate a unique event ID.
fn generate_event_id() -> String {
    use rand::Rng;
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp, random)
}

/// Trait for handling security events.
pub trait SecurityEventHandler: Send + Sync {
    /// Handle a security event.
    fn handle(&self, event: &SecurityEvent);
}

/// Handler that forwards events to `tracing` under the `security::audit`
/// target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHandler {
    min_severity: SecurityEventSeverity,
}

impl TracingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum severity to log.
    pub fn min_severity(mut self, severity: SecurityEventSeverity) -> Self {
        self.min_severity = severity;
        self
    }
}

impl SecurityEventHandler for TracingHandler {
    fn handle(&self, event: &SecurityEvent) {
        if event.severity < self.min_severity {
            return;
        }

        let line = event.to_log_line();
        match event.severity {
            SecurityEventSeverity::Info => {
                tracing::info!(target: "security::audit", event_id = %event.id, "{}", line)
            }
            SecurityEventSeverity::Warning => {
                tracing::warn!(target: "security::audit", event_id = %event.id, "{}", line)
            }
            SecurityEventSeverity::Error => {
                tracing::error!(target: "security::audit", event_id = %event.id, "{}", line)
            }
        }
    }
}

/// Handler that calls a closure.
pub struct ClosureHandler<F>
where
    F: Fn(&SecurityEvent) + Send + Sync,
{
    handler: F,
}

impl<F> ClosureHandler<F>
where
    F: Fn(&SecurityEvent) + Send + Sync,
{
    /// Create a new closure handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> SecurityEventHandler for ClosureHandler<F>
where
    F: Fn(&SecurityEvent) + Send + Sync,
{
    fn handle(&self, event: &SecurityEvent) {
        (self.handler)(event);
    }
}

/// In-memory event store for testing and debugging.
///
/// Clones share the same storage, so a clone can be handed to an
/// [`AuditLogger`] and the original inspected afterwards.
#[derive(Clone)]
pub struct InMemoryEventStore {
    events: Arc<Mutex<Vec<SecurityEvent>>>,
    max_events: usize,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            max_events: 10000,
        }
    }

    /// Set maximum events to keep.
    pub fn max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Get all stored events.
    pub fn get_events(&self) -> Vec<SecurityEvent> {
        self.lock().clone()
    }

    /// Get events filtered by type.
    pub fn get_events_by_type(&self, event_type: &SecurityEventType) -> Vec<SecurityEvent> {
        self.lock()
            .iter()
            .filter(|e| &e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Get events for a specific user.
    pub fn get_events_by_user(&self, username: &str) -> Vec<SecurityEvent> {
        self.lock()
            .iter()
            .filter(|e| e.username.as_deref() == Some(username))
            .cloned()
            .collect()
    }

    /// Clear all events.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SecurityEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecurityEventHandler for InMemoryEventStore {
    fn handle(&self, event: &SecurityEvent) {
        let mut guard = self.lock();
        guard.push(event.clone());
        if guard.len() > self.max_events {
            guard.remove(0);
        }
    }
}

/// The main audit logger.
#[derive(Clone)]
pub struct AuditLogger {
    handlers: Arc<Vec<Arc<dyn SecurityEventHandler>>>,
    enabled: bool,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLogger")
            .field("handlers", &self.handlers.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AuditLogger {
    /// Create a new audit logger with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
            enabled: true,
        }
    }

    /// Create an audit logger forwarding to `tracing`.
    pub fn with_tracing() -> Self {
        Self::new().add_handler(TracingHandler::new())
    }

    /// Add an event handler.
    pub fn add_handler<H: SecurityEventHandler + 'static>(mut self, handler: H) -> Self {
        Arc::make_mut(&mut self.handlers).push(Arc::new(handler));
        self
    }

    /// Add a closure as event handler.
    pub fn with_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&SecurityEvent) + Send + Sync + 'static,
    {
        self.add_handler(ClosureHandler::new(handler))
    }

    /// Enable or disable the logger.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Log a security event.
    pub fn log(&self, event: SecurityEvent) {
        if !self.enabled {
            return;
        }

        for handler in self.handlers.iter() {
            handler.handle(&event);
        }
    }
}
