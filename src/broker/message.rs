//! Game-state messages broadcast from the game to agents.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A tagged payload sent by the game unit to agent slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StateMessage {
    /// Free-form text.
    Text(String),
    /// A single number.
    Number(f64),
    /// Opaque bytes.
    Bytes(Vec<u8>),
    /// A JSON document.
    Json(serde_json::Value),
}

impl StateMessage {
    /// Encode any serializable value as a JSON message.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// Decode a JSON message into `T`. Non-JSON messages yield `None`.
    #[must_use]
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        match self {
            Self::Json(value) => T::deserialize(value).ok(),
            _ => None,
        }
    }

    /// Text payload, if this is a text message.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric payload, if this is a number message.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for StateMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for StateMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for StateMessage {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Position {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_json_payload() {
        let msg = StateMessage::json(&Position { x: 3, y: -1 }).unwrap();
        assert_eq!(msg.decode::<Position>(), Some(Position { x: 3, y: -1 }));
        assert_eq!(msg.as_text(), None);
    }

    #[test]
    fn test_text_does_not_decode() {
        let msg = StateMessage::from("attack-incoming");
        assert_eq!(msg.as_text(), Some("attack-incoming"));
        assert_eq!(msg.decode::<Position>(), None);
    }

    #[test]
    fn test_wire_shape() {
        let encoded = serde_json::to_string(&StateMessage::Number(2.5)).unwrap();
        assert_eq!(encoded, r#"{"kind":"number","value":2.5}"#);
    }
}
