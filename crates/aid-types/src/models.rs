use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type UserId = i64;
pub type ConversationId = i64;
pub type HelpRequestId = i64;
pub type MessageId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self
                .email
                .clone()
                .unwrap_or_else(|| format!("user #{}", self.user_id)),
        }
    }
}

/// A single chat message. Immutable once the backend has created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Display order: `created_at` ascending, ties broken by `id`.
    pub fn chronological(a: &Message, b: &Message) -> Ordering {
        a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
    }
}

/// Messaging thread between a requester (`user_id`) and a helper (`sender_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub sender_id: UserId,
    pub help_request_id: HelpRequestId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub request_type: Option<RequestType>,
    #[serde(default)]
    pub last_message: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub completion_status: bool,
    /// Only present when the backend annotates the row with its own count.
    #[serde(default)]
    pub assigned_users_count: Option<u32>,
}

impl Conversation {
    /// The participant on the other side of the thread from `viewer`.
    pub fn counterpart(&self, viewer: UserId) -> UserId {
        if self.sender_id == viewer {
            self.user_id
        } else {
            self.sender_id
        }
    }

    pub fn is_owned_by(&self, viewer: UserId) -> bool {
        self.user_id == viewer
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestType {
    OneTimeTask,
    MaterialNeed,
    #[serde(other)]
    Unknown,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTimeTask => "one-time-task",
            Self::MaterialNeed => "material-need",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-time-task" => Ok(Self::OneTimeTask),
            "material-need" => Ok(Self::MaterialNeed),
            other => Err(format!(
                "unknown request type '{}' (expected one-time-task or material-need)",
                other
            )),
        }
    }
}

/// A posted need. The backend exposes its primary key as `request_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpRequest {
    #[serde(rename = "request_count", alias = "id")]
    pub id: HelpRequestId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "coordinate")]
    pub latitude: f64,
    #[serde(deserialize_with = "coordinate")]
    pub longitude: f64,
    pub request_type: RequestType,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub completion_status: bool,
    #[serde(default)]
    pub accepted_by_user: Option<UserId>,
}

/// Coordinates come back as JSON numbers or as decimal strings depending on
/// how the backend serialized its decimal columns.
fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
