//! Seams between the REST API and the state that consumes it. The feed and
//! board controllers are generic over these so they can run against a fake
//! backend in tests.

use std::future::Future;

use aid_types::api::{NewHelpRequest, SendMessageRequest};
use aid_types::{Conversation, ConversationId, HelpRequest, HelpRequestId, Message, UserId};

use crate::error::ClientError;

pub trait MessageApi: Send + Sync + 'static {
    /// Full history of a conversation, newest first.
    fn fetch_messages(
        &self,
        conversation_id: ConversationId,
    ) -> impl Future<Output = Result<Vec<Message>, ClientError>> + Send;

    fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

pub trait ConversationApi: Send + Sync + 'static {
    fn list_conversations(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Conversation>, ClientError>> + Send;

    fn complete_help_request(
        &self,
        help_request_id: HelpRequestId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn republish_help_request(
        &self,
        help_request_id: HelpRequestId,
        conversation_id: ConversationId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

pub trait HelpRequestApi: Send + Sync + 'static {
    fn list_help_requests(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<HelpRequest>, ClientError>> + Send;

    /// Assign a help request to `user_id`. Returns the conversation opened
    /// for the assignment.
    fn assign_help_request(
        &self,
        token: &str,
        help_request_id: HelpRequestId,
        user_id: UserId,
    ) -> impl Future<Output = Result<ConversationId, ClientError>> + Send;

    fn submit_help_request(
        &self,
        token: &str,
        request: NewHelpRequest,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn completed_requests_count(&self) -> impl Future<Output = Result<u64, ClientError>> + Send;
}
