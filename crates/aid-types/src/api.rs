use serde::{Deserialize, Serialize};

use crate::models::{ConversationId, HelpRequestId, RequestType, User, UserId};

// -- Auth --

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub user: Credentials,
}

#[derive(Debug, Deserialize)]
pub struct LoginStatus {
    pub code: u16,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a successful `POST /login`. The bearer token itself travels in the
/// `Authorization` response header, not in the body.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub status: LoginStatus,
    #[serde(default)]
    pub data: Option<User>,
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub photo: Option<std::path::PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub success: bool,
}

/// Error payload used by the backend for rejected requests.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

// -- Messages --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub user_id: UserId,
}

impl SendMessageRequest {
    /// The sender and the acting user are always the same person.
    pub fn new(body: String, conversation_id: ConversationId, user_id: UserId) -> Self {
        Self {
            body,
            conversation_id,
            sender_id: user_id,
            user_id,
        }
    }
}

// -- Help requests --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub completion_status: bool,
    pub visible: bool,
}

impl CompleteRequest {
    /// Completing a request also hides it from the counterpart.
    pub const COMPLETE: Self = Self {
        completion_status: true,
        visible: false,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepublishRequest {
    pub conversation_id: ConversationId,
    pub request_count: HelpRequestId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignFields {
    pub completion_status: bool,
    pub accepted_by_user: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
    pub help_request: AssignFields,
}

impl AssignRequest {
    pub fn to(user_id: UserId) -> Self {
        Self {
            help_request: AssignFields {
                completion_status: false,
                accepted_by_user: user_id,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignResponse {
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewHelpRequest {
    pub title: String,
    pub request_type: RequestType,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct SubmitHelpRequest {
    pub help_request: NewHelpRequest,
}

#[derive(Debug, Deserialize)]
pub struct CompletedCountResponse {
    pub count: u64,
}
