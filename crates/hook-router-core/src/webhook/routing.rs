//! Route table mapping event keys to handlers.
//!
//! An event key is either a bare event type (`issues`) or an event type and
//! action joined by a dot (`issues.opened`). Each key holds an ordered list of
//! handlers; registering the same handler twice means it runs twice.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::WebhookHandler;
use crate::error::ValidationError;

/// Separator between event type and action in a compound key.
pub const KEY_SEPARATOR: char = '.';

/// Validated event key.
///
/// # Examples
///
/// ```rust
/// use hook_router_core::webhook::EventKey;
///
/// let key: EventKey = "pull_request.opened".parse().unwrap();
/// assert_eq!(key.event_type(), "pull_request");
/// assert_eq!(key.action(), Some("opened"));
///
/// assert!("issues.opened.extra".parse::<EventKey>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey(String);

impl EventKey {
    /// Parse and validate a key.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFormat` for an empty key, an empty
    /// event or action segment, or more than one separator.
    pub fn parse(key: &str) -> Result<Self, ValidationError> {
        if key.is_empty() {
            return Err(invalid_key(key, "key cannot be empty"));
        }

        let mut segments = key.split(KEY_SEPARATOR);
        let event = segments.next().unwrap_or_default();
        let action = segments.next();

        if segments.next().is_some() {
            return Err(invalid_key(key, "more than one '.' separator"));
        }
        if event.is_empty() {
            return Err(invalid_key(key, "event type cannot be empty"));
        }
        if action == Some("") {
            return Err(invalid_key(key, "action cannot be empty"));
        }

        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The event type segment.
    pub fn event_type(&self) -> &str {
        self.0
            .split_once(KEY_SEPARATOR)
            .map_or(self.0.as_str(), |(event, _)| event)
    }

    /// The action segment, if this is a compound key.
    pub fn action(&self) -> Option<&str> {
        self.0.split_once(KEY_SEPARATOR).map(|(_, action)| action)
    }
}

fn invalid_key(key: &str, message: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "event_key".to_string(),
        message: format!("'{}': {}", key, message),
    }
}

impl FromStr for EventKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Registry of handlers per event key.
///
/// Registration may happen while requests are being served. Lookups return a
/// snapshot, so handlers are never invoked with the lock held.
#[derive(Default)]
pub struct RouteTable {
    routes: RwLock<HashMap<EventKey, Vec<Arc<dyn WebhookHandler>>>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the list for `key`, creating the list if needed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFormat` if `key` is not a valid
    /// event key. The table is unchanged in that case.
    pub fn register(
        &self,
        key: &str,
        handler: Arc<dyn WebhookHandler>,
    ) -> Result<(), ValidationError> {
        let key = EventKey::parse(key)?;
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        let handlers = routes.entry(key.clone()).or_default();
        handlers.push(handler);
        debug!(event_key = %key, handler_count = handlers.len(), "Registered webhook handler");
        Ok(())
    }

    /// Handlers registered for `key`, in registration order. Empty if none.
    pub fn lookup(&self, key: &str) -> Vec<Arc<dyn WebhookHandler>> {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        routes.get(key).cloned().unwrap_or_default()
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = routes.keys().map(|k| k.as_str().to_string()).collect();
        keys.sort();
        keys
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        let mut map = f.debug_map();
        for (key, handlers) in routes.iter() {
            map.entry(&key.as_str(), &handlers.len());
        }
        map.finish()
    }
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
