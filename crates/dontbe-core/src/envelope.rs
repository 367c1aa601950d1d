//! Uniform `{status, message, data}` response wrapper.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Every server reply is wrapped in this envelope.
///
/// `status` mirrors the HTTP status the server intended (201 for created,
/// 400 for a duplicate vote, ...) and is what action reconciliation keys on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    pub fn new(status: u16, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    /// Envelope with no payload.
    pub fn bare(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, message, None)
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl ResponseEnvelope<serde_json::Value> {
    /// Decode the untyped payload into a concrete type.
    ///
    /// A `null` payload decodes to `None`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<ResponseEnvelope<T>, serde_json::Error> {
        let data = match self.data {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(serde_json::from_value(value)?),
        };
        Ok(ResponseEnvelope {
            status: self.status,
            message: self.message,
            data,
        })
    }
}
