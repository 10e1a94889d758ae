use serde::Deserialize;
use serde::Serialize;

use crate::ConversationId;

/// A single "send" emitted by the question input.
///
/// Built fresh for every accepted send and handed to the host, which owns delivery. Optional
/// fields are omitted from the serialized form when absent; they are never empty strings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SendEvent {
    /// The composer text exactly as typed. Only the send gate looks at a trimmed copy.
    pub text: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::conversation_id::deserialize_optional"
    )]
    pub conversation_id: Option<ConversationId>,
    /// Attached image as a `data:<mime>;base64,<payload>` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_image: Option<String>,
}

impl SendEvent {
    pub fn has_image(&self) -> bool {
        self.encoded_image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted() {
        let event = SendEvent {
            text: "Hello".to_string(),
            conversation_id: None,
            encoded_image: None,
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value, json!({ "text": "Hello" }));
    }

    #[test]
    fn conversation_id_serializes_as_plain_string() {
        let event = SendEvent {
            text: "  spaced  ".to_string(),
            conversation_id: ConversationId::new("abc"),
            encoded_image: Some("data:image/png;base64,AAAA".to_string()),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(
            value,
            json!({
                "text": "  spaced  ",
                "conversation_id": "abc",
                "encoded_image": "data:image/png;base64,AAAA",
            })
        );
        assert!(event.has_image());
    }

    #[test]
    fn missing_optional_fields_deserialize_as_none() {
        let event: SendEvent = serde_json::from_str(r#"{"text":"Hi"}"#).expect("deserialize");
        assert_eq!(event.conversation_id, None);
        assert_eq!(event.encoded_image, None);
    }

    #[test]
    fn empty_conversation_id_deserializes_as_none() {
        let event: SendEvent = serde_json::from_str(r#"{"text":"Hi","conversation_id":""}"#)
            .expect("deserialize");
        assert_eq!(event.conversation_id, None);

        let event: SendEvent =
            serde_json::from_str(r#"{"text":"Hi","conversation_id":null}"#).expect("deserialize");
        assert_eq!(event.conversation_id, None);
    }
}
