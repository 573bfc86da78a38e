use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BridgeError, BridgeResult};
use crate::messages::{BackendEvent, Command, EventMethod};

/// Wire form of every bridge message: `{"method": ..., "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub method: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn from_command(command: &Command) -> BridgeResult<Self> {
        let method = command.method();
        let data = command
            .payload()
            .map_err(|source| BridgeError::Encode {
                method: method.as_str(),
                source,
            })?;

        Ok(Self {
            method: method.as_str().to_string(),
            data,
        })
    }

    /// JSON text handed to the host channel.
    pub fn encode(&self) -> BridgeResult<String> {
        serde_json::to_string(self).map_err(|source| BridgeError::Encode {
            method: "envelope",
            source,
        })
    }

    pub fn decode(text: &str) -> BridgeResult<Self> {
        serde_json::from_str(text).map_err(|source| BridgeError::Decode {
            method: "envelope".to_string(),
            source,
        })
    }
}

/// Inbound `data` as the host delivers it: either structured already, or JSON text.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Text(String),
    Json(Value),
}

impl RawPayload {
    /// A JSON string value is JSON text too and gets parsed; a string that is
    /// not valid JSON is an error.
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            RawPayload::Text(text) | RawPayload::Json(Value::String(text)) => {
                serde_json::from_str(&text)
            }
            RawPayload::Json(value) => Ok(value),
        }
    }
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        RawPayload::Text(text.to_string())
    }
}

impl From<String> for RawPayload {
    fn from(text: String) -> Self {
        RawPayload::Text(text)
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        RawPayload::Json(value)
    }
}

/// Parses `raw` (if needed) and builds the typed event. Never panics.
pub fn decode_event(method: EventMethod, raw: RawPayload) -> BridgeResult<BackendEvent> {
    let decode_err = |source| BridgeError::Decode {
        method: method.as_str().to_string(),
        source,
    };
    let value = raw.into_value().map_err(decode_err)?;
    BackendEvent::from_value(method, value).map_err(decode_err)
}
