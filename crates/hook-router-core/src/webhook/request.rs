//! Inbound webhook delivery.

use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;

use crate::auth::InstallationId;
use crate::error::{PayloadAccessError, ValidationError};

/// Header naming the event type, e.g. `issues` or `pull_request`.
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying the HMAC-SHA1 signature of the body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Header carrying GitHub's unique delivery ID.
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// One webhook delivery: headers, the raw body exactly as received, and the
/// body parsed as a JSON object.
///
/// Header names are stored lowercased so lookups are case-insensitive.
/// The raw body is kept because the signature covers the exact bytes.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    headers: HashMap<String, String>,
    body: Bytes,
    payload: Value,
}

impl WebhookRequest {
    /// Build a request, parsing the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFormat` if the body is not a JSON
    /// object.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bytes::Bytes;
    /// use hook_router_core::webhook::WebhookRequest;
    /// use std::collections::HashMap;
    ///
    /// let headers = HashMap::from([("X-GitHub-Event".to_string(), "issues".to_string())]);
    /// let request = WebhookRequest::new(headers, Bytes::from_static(br#"{"action":"opened"}"#)).unwrap();
    ///
    /// assert_eq!(request.event_type(), Some("issues"));
    /// assert_eq!(request.action(), Some("opened"));
    /// ```
    pub fn new(headers: HashMap<String, String>, body: Bytes) -> Result<Self, ValidationError> {
        let payload: Value =
            serde_json::from_slice(&body).map_err(|e| ValidationError::InvalidFormat {
                field: "body".to_string(),
                message: format!("payload is not valid JSON: {}", e),
            })?;

        if !payload.is_object() {
            return Err(ValidationError::InvalidFormat {
                field: "body".to_string(),
                message: "payload must be a JSON object".to_string(),
            });
        }

        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        Ok(Self {
            headers,
            body,
            payload,
        })
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The `X-GitHub-Event` value; a blank header counts as absent.
    pub fn event_type(&self) -> Option<&str> {
        self.header(EVENT_HEADER).filter(|event| !event.trim().is_empty())
    }

    pub fn signature(&self) -> Option<&str> {
        self.header(SIGNATURE_HEADER)
    }

    pub fn delivery_id(&self) -> Option<&str> {
        self.header(DELIVERY_HEADER)
    }

    /// Raw body bytes, as signed by GitHub.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parsed JSON payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The payload's `action` field, if present and a string.
    pub fn action(&self) -> Option<&str> {
        self.payload.get("action").and_then(Value::as_str)
    }

    /// The installation this delivery belongs to, if any.
    pub fn installation_id(&self) -> Option<InstallationId> {
        self.payload
            .get("installation")
            .and_then(|installation| installation.get("id"))
            .and_then(Value::as_u64)
            .filter(|id| *id > 0)
            .map(InstallationId::new)
    }

    /// The payload, for handlers that must act on behalf of an installation.
    ///
    /// # Errors
    ///
    /// Returns `PayloadAccessError::NoInstallation` if the payload has no
    /// `installation` member, and `PayloadAccessError::InvalidInstallationId`
    /// if its `id` is not a positive integer.
    pub fn installation_payload(&self) -> Result<&Value, PayloadAccessError> {
        let installation = self
            .payload
            .get("installation")
            .ok_or(PayloadAccessError::NoInstallation)?;

        match installation.get("id").and_then(Value::as_u64) {
            Some(id) if id > 0 => Ok(&self.payload),
            _ => Err(PayloadAccessError::InvalidInstallationId {
                value: installation
                    .get("id")
                    .map(Value::to_string)
                    .unwrap_or_else(|| "<missing>".to_string()),
            }),
        }
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
