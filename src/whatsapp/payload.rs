//! Inbound webhook payload
//!
//! Only the fields the dialogue consumes are modelled; everything else in the
//! Cloud API notification is ignored. Status callbacks carry no messages and
//! project to nothing.

use crate::state_machine::InboundMessage;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
struct Change {
    #[serde(default)]
    value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    from: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
struct TextBody {
    body: String,
}

impl WebhookPayload {
    /// Messages in delivery order. Non-text messages become
    /// [`crate::state_machine::InboundContent::Unsupported`].
    pub fn into_inbound(self) -> Vec<InboundMessage> {
        self.entry
            .into_iter()
            .flat_map(|e| e.changes)
            .flat_map(|c| c.value.messages)
            .filter_map(Message::into_inbound)
            .collect()
    }
}

impl Message {
    fn into_inbound(self) -> Option<InboundMessage> {
        if self.from.is_empty() {
            return None;
        }
        match (self.kind.as_str(), self.text) {
            ("text", Some(text)) => Some(InboundMessage::text(self.from, text.body)),
            ("", _) => Some(InboundMessage::unsupported(self.from, "unknown")),
            (kind, _) => {
                let kind = kind.to_string();
                Some(InboundMessage::unsupported(self.from, kind))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::InboundContent;
    use serde_json::json;

    fn notification(messages: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "1234",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": { "phone_number_id": "5678" },
                        "contacts": [{ "wa_id": "919876543210", "profile": { "name": "Ramesh" } }],
                        "messages": messages
                    }
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_text_message() {
        let payload = notification(json!([{
            "from": "919876543210",
            "id": "wamid.1",
            "timestamp": "1700000000",
            "type": "text",
            "text": { "body": "Hi" }
        }]));
        assert_eq!(
            payload.into_inbound(),
            vec![InboundMessage::text("919876543210", "Hi")]
        );
    }

    #[test]
    fn test_audio_message_is_unsupported() {
        let payload = notification(json!([{
            "from": "919876543210",
            "type": "audio",
            "audio": { "id": "media-1", "mime_type": "audio/ogg" }
        }]));
        let inbound = payload.into_inbound();
        assert_eq!(
            inbound[0].content,
            InboundContent::Unsupported("audio".to_string())
        );
    }

    #[test]
    fn test_status_callback_has_no_messages() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "statuses": [{ "id": "wamid.1", "status": "delivered" }]
                    }
                }]
            }]
        }))
        .unwrap();
        assert!(payload.into_inbound().is_empty());
    }

    #[test]
    fn test_empty_payload() {
        let payload: WebhookPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.into_inbound().is_empty());
    }
}
