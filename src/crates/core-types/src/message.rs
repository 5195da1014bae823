use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UIRole {
    System,
    User,
    Assistant,
}

/// A part of a UI message.
///
/// Only text parts reach the model. Data parts carry client-side widgets (for
/// example the inline `compare-ui` picker) and are kept so the history
/// round-trips, while every other part kind the client echoes back (tool parts,
/// step markers, files) is preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum UIMessagePart {
    Text {
        text: String,
    },
    Reasoning {
        text: String,
    },
    /// `{"type":"data","data":{"kind":..}}` or the AI SDK `data-<kind>` form.
    Data {
        kind: String,
        payload: Value,
    },
    Other {
        part_type: String,
        raw: Value,
    },
}

impl UIMessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn data(kind: impl Into<String>, payload: Value) -> Self {
        Self::Data {
            kind: kind.into(),
            payload,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }

    fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(mut obj) = value else {
            return Err("message part must be an object".to_string());
        };
        let part_type = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| "message part is missing `type`".to_string())?
            .to_string();

        match part_type.as_str() {
            "text" | "reasoning" => {
                let text = match obj.remove("text") {
                    Some(Value::String(text)) => text,
                    Some(Value::Null) | None => String::new(),
                    Some(_) => return Err(format!("`{}` part text must be a string", part_type)),
                };
                if part_type == "text" {
                    Ok(Self::Text { text })
                } else {
                    Ok(Self::Reasoning { text })
                }
            }
            "data" => {
                let payload = obj.remove("data").unwrap_or(Value::Null);
                let kind = payload
                    .get("kind")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(Self::Data { kind, payload })
            }
            other if other.starts_with("data-") => Ok(Self::Data {
                kind: other.trim_start_matches("data-").to_string(),
                payload: obj.remove("data").unwrap_or(Value::Null),
            }),
            _ => Ok(Self::Other {
                part_type,
                raw: Value::Object(obj),
            }),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Text { text } => json!({ "type": "text", "text": text }),
            Self::Reasoning { text } => json!({ "type": "reasoning", "text": text }),
            Self::Data { kind, payload } => {
                let mut data = match payload {
                    Value::Object(map) => map.clone(),
                    Value::Null => Map::new(),
                    other => {
                        let mut map = Map::new();
                        map.insert("value".to_string(), other.clone());
                        map
                    }
                };
                data.entry("kind".to_string())
                    .or_insert_with(|| Value::String(kind.clone()));
                json!({ "type": "data", "data": Value::Object(data) })
            }
            Self::Other { raw, .. } => raw.clone(),
        }
    }
}

impl Serialize for UIMessagePart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UIMessagePart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

/// A UI message as sent by the chat client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIMessage {
    #[serde(default)]
    pub id: String,
    pub role: UIRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub parts: Vec<UIMessagePart>,
}

impl UIMessage {
    pub fn new(id: impl Into<String>, role: UIRole) -> Self {
        Self {
            id: id.into(),
            role,
            metadata: None,
            parts: Vec::new(),
        }
    }

    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, UIRole::User).with_part(UIMessagePart::text(text))
    }

    pub fn assistant(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, UIRole::Assistant).with_part(UIMessagePart::text(text))
    }

    #[must_use]
    pub fn with_part(mut self, part: UIMessagePart) -> Self {
        self.parts.push(part);
        self
    }

    /// All text parts concatenated without separators.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(UIMessagePart::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Inbound body of `POST /api/chat`.
///
/// AI SDK clients also send `id` and `trigger`; unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<UIMessage>,
}

/// Concatenated text of the most recent user message, if there is one.
pub fn latest_user_text(messages: &[UIMessage]) -> Option<String> {
    messages
        .iter()
        .rev()
        .find(|message| message.role == UIRole::User)
        .map(UIMessage::text_content)
}
