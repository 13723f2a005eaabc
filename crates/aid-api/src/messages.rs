use tracing::debug;

use aid_types::api::SendMessageRequest;
use aid_types::{ConversationId, Message};

use crate::client::{ApiClient, check, read_json};
use crate::directory::MessageApi;
use crate::error::ClientError;

impl MessageApi for ApiClient {
    async fn fetch_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ClientError> {
        let resp = self
            .get(&format!("/messages/{}", conversation_id))
            .send()
            .await?;
        let messages: Vec<Message> = read_json(check(resp).await?).await?;
        debug!("Fetched {} messages for conversation {}", messages.len(), conversation_id);
        Ok(messages)
    }

    async fn send_message(&self, request: SendMessageRequest) -> Result<(), ClientError> {
        let resp = self.post("/messages").json(&request).send().await?;
        check(resp).await?;
        debug!("Sent message to conversation {}", request.conversation_id);
        Ok(())
    }
}
