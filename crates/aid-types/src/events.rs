use serde::{Deserialize, Serialize};

use crate::models::{ConversationId, Message};

/// Channel name the backend routes conversation messages through.
pub const MESSAGES_CHANNEL: &str = "MessagesChannel";

/// Identity of one push-channel subscription. The backend expects it
/// JSON-encoded inside the command envelope, not as a nested object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionIdentity {
    pub id: String,
    pub conversation_id: String,
    pub channel: String,
}

impl SubscriptionIdentity {
    pub fn messages(token: String, conversation_id: ConversationId) -> Self {
        Self {
            id: token,
            conversation_id: conversation_id.to_string(),
            channel: MESSAGES_CHANNEL.to_string(),
        }
    }

    pub fn encode(&self) -> String {
        // A struct of three strings cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Commands sent FROM client TO server over the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CableCommand {
    pub command: CommandKind,
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Subscribe,
    Unsubscribe,
}

impl CableCommand {
    pub fn subscribe(identity: &SubscriptionIdentity) -> Self {
        Self {
            command: CommandKind::Subscribe,
            identifier: identity.encode(),
        }
    }

    pub fn unsubscribe(identity: &SubscriptionIdentity) -> Self {
        Self {
            command: CommandKind::Unsubscribe,
            identifier: identity.encode(),
        }
    }
}

/// Protocol-level frames that carry no application data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlFrame {
    Welcome,
    Ping,
    ConfirmSubscription,
    RejectSubscription,
    Disconnect { reason: Option<String>, reconnect: bool },
    Other(String),
}

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum CableFrame {
    Control(ControlFrame),
    Message(Message),
    /// Well-formed JSON that is neither a control frame nor a message payload.
    Unrecognized(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    reconnect: Option<bool>,
}

impl CableFrame {
    /// Classify a text frame. Frames with a `type` discriminator are control
    /// frames regardless of any `message` field (pings carry a timestamp there).
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawFrame = serde_json::from_str(text)?;

        if let Some(kind) = raw.kind {
            let control = match kind.as_str() {
                "welcome" => ControlFrame::Welcome,
                "ping" => ControlFrame::Ping,
                "confirm_subscription" => ControlFrame::ConfirmSubscription,
                "reject_subscription" => ControlFrame::RejectSubscription,
                "disconnect" => ControlFrame::Disconnect {
                    reason: raw.reason,
                    reconnect: raw.reconnect.unwrap_or(true),
                },
                _ => ControlFrame::Other(kind),
            };
            return Ok(Self::Control(control));
        }

        match raw.message {
            Some(payload) => match serde_json::from_value::<Message>(payload.clone()) {
                Ok(message) => Ok(Self::Message(message)),
                Err(_) => Ok(Self::Unrecognized(payload)),
            },
            None => Ok(Self::Unrecognized(serde_json::Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_envelope_encodes_identifier_as_string() {
        let identity = SubscriptionIdentity::messages("abc123xyz0".into(), 17);
        let json = serde_json::to_value(CableCommand::subscribe(&identity)).unwrap();

        assert_eq!(json["command"], "subscribe");
        let identifier: SubscriptionIdentity =
            serde_json::from_str(json["identifier"].as_str().unwrap()).unwrap();
        assert_eq!(identifier, identity);
        assert_eq!(identifier.conversation_id, "17");
        assert_eq!(identifier.channel, MESSAGES_CHANNEL);
    }

    #[test]
    fn control_frames_are_classified() {
        assert_eq!(
            CableFrame::parse(r#"{"type":"welcome"}"#).unwrap(),
            CableFrame::Control(ControlFrame::Welcome)
        );
        assert_eq!(
            CableFrame::parse(r#"{"type":"ping","message":1714564800}"#).unwrap(),
            CableFrame::Control(ControlFrame::Ping)
        );
        assert_eq!(
            CableFrame::parse(r#"{"identifier":"{}","type":"confirm_subscription"}"#).unwrap(),
            CableFrame::Control(ControlFrame::ConfirmSubscription)
        );
        assert_eq!(
            CableFrame::parse(r#"{"type":"disconnect","reason":"unauthorized","reconnect":false}"#)
                .unwrap(),
            CableFrame::Control(ControlFrame::Disconnect {
                reason: Some("unauthorized".into()),
                reconnect: false,
            })
        );
    }

    #[test]
    fn application_frame_carries_message() {
        let text = r#"{
            "identifier": "{\"channel\":\"MessagesChannel\"}",
            "message": {
                "id": 5,
                "conversation_id": 3,
                "sender_id": 8,
                "body": "on my way",
                "created_at": "2024-05-01T12:00:00Z"
            }
        }"#;

        match CableFrame::parse(text).unwrap() {
            CableFrame::Message(message) => {
                assert_eq!(message.id, 5);
                assert_eq!(message.body, "on my way");
            }
            other => panic!("expected message frame, got {:?}", other),
        }
    }

    #[test]
    fn malformed_payload_is_unrecognized() {
        let frame = CableFrame::parse(r#"{"message":{"hello":"world"}}"#).unwrap();
        assert!(matches!(frame, CableFrame::Unrecognized(_)));
        assert!(CableFrame::parse("not json").is_err());
    }
}
