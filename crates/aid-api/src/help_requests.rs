use tracing::{debug, info};

use aid_types::api::{
    AssignRequest, AssignResponse, CompleteRequest, CompletedCountResponse, NewHelpRequest,
    RepublishRequest, SubmitHelpRequest,
};
use aid_types::{Conversation, ConversationId, HelpRequest, HelpRequestId, UserId};

use crate::client::{ApiClient, check, read_json};
use crate::directory::{ConversationApi, HelpRequestApi};
use crate::error::ClientError;

impl ConversationApi for ApiClient {
    async fn list_conversations(&self, user_id: UserId) -> Result<Vec<Conversation>, ClientError> {
        let resp = self
            .get("/conversations")
            .query(&[("user_id", user_id)])
            .send()
            .await?;
        let conversations: Vec<Conversation> = read_json(check(resp).await?).await?;
        debug!("Fetched {} conversations for user {}", conversations.len(), user_id);
        Ok(conversations)
    }

    async fn complete_help_request(
        &self,
        help_request_id: HelpRequestId,
    ) -> Result<(), ClientError> {
        let resp = self
            .patch(&format!("/help_requests/{}/complete", help_request_id))
            .json(&CompleteRequest::COMPLETE)
            .send()
            .await?;
        check(resp).await?;
        info!("Help request {} marked complete", help_request_id);
        Ok(())
    }

    async fn republish_help_request(
        &self,
        help_request_id: HelpRequestId,
        conversation_id: ConversationId,
    ) -> Result<(), ClientError> {
        let resp = self
            .patch(&format!("/help_requests/{}/republish", help_request_id))
            .json(&RepublishRequest {
                conversation_id,
                request_count: help_request_id,
            })
            .send()
            .await?;
        check(resp).await?;
        info!(
            "Help request {} republished (superseding conversation {})",
            help_request_id, conversation_id
        );
        Ok(())
    }
}

impl HelpRequestApi for ApiClient {
    async fn list_help_requests(&self, token: &str) -> Result<Vec<HelpRequest>, ClientError> {
        let resp = self.get("/help_requests").bearer_auth(token).send().await?;
        let requests: Vec<HelpRequest> = read_json(check(resp).await?).await?;
        debug!("Fetched {} help requests", requests.len());
        Ok(requests)
    }

    async fn assign_help_request(
        &self,
        token: &str,
        help_request_id: HelpRequestId,
        user_id: UserId,
    ) -> Result<ConversationId, ClientError> {
        let resp = self
            .patch(&format!("/help_requests/{}", help_request_id))
            .bearer_auth(token)
            .json(&AssignRequest::to(user_id))
            .send()
            .await?;
        let body: AssignResponse = read_json(check(resp).await?).await?;
        let conversation_id = body
            .conversation_id
            .ok_or(ClientError::MissingField("conversation_id"))?;
        info!(
            "Help request {} assigned to user {} (conversation {})",
            help_request_id, user_id, conversation_id
        );
        Ok(conversation_id)
    }

    async fn submit_help_request(
        &self,
        token: &str,
        request: NewHelpRequest,
    ) -> Result<(), ClientError> {
        let resp = self
            .post("/submit_request")
            .bearer_auth(token)
            .json(&SubmitHelpRequest {
                help_request: request,
            })
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn completed_requests_count(&self) -> Result<u64, ClientError> {
        let resp = self.get("/api/completed_requests_count").send().await?;
        let body: CompletedCountResponse = read_json(check(resp).await?).await?;
        Ok(body.count)
    }
}
