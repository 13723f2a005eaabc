use std::sync::Arc;

use tracing::{debug, info, warn};

use aid_api::ConversationApi;
use aid_types::{Conversation, ConversationId, UserId};

use crate::conversations::ConversationBoard;
use crate::error::BoardError;

/// The viewer's conversation list, backed by the REST API.
///
/// State changes only through `refresh`; the row actions issue their
/// transition and then re-fetch instead of patching local state.
pub struct ConversationList<A> {
    api: Arc<A>,
    viewer: Option<UserId>,
    board: Option<ConversationBoard>,
}

impl<A: ConversationApi> ConversationList<A> {
    pub fn new(api: Arc<A>, viewer: Option<UserId>) -> Self {
        Self {
            api,
            viewer,
            board: None,
        }
    }

    /// The last successfully fetched state, if any.
    pub fn board(&self) -> Option<&ConversationBoard> {
        self.board.as_ref()
    }

    /// Re-fetch the list. Returns whether new state was loaded; failures keep
    /// the previous state.
    pub async fn refresh(&mut self) -> bool {
        let Some(viewer) = self.viewer else {
            debug!("No signed-in user; conversation list not fetched");
            return false;
        };

        match self.api.list_conversations(viewer).await {
            Ok(conversations) => {
                debug!("Loaded {} conversations for user {}", conversations.len(), viewer);
                self.board = Some(ConversationBoard::from_conversations(viewer, conversations));
                true
            }
            Err(e) => {
                warn!("Failed to fetch conversations for user {}: {}", viewer, e);
                false
            }
        }
    }

    pub fn select(&self, conversation_id: ConversationId) -> Option<ConversationId> {
        self.board.as_ref()?.select(conversation_id)
    }

    pub async fn republish(&mut self, conversation_id: ConversationId) -> Result<(), BoardError> {
        let (board, conversation) = self.owned(conversation_id, "republish")?;
        if let Some(reason) = board.republish_blocker(conversation) {
            return Err(BoardError::NotAllowed {
                action: "republish",
                reason,
            });
        }
        let help_request_id = conversation.help_request_id;

        self.api
            .republish_help_request(help_request_id, conversation_id)
            .await?;
        info!(
            "Republished help request {} from conversation {}",
            help_request_id, conversation_id
        );

        self.refresh().await;
        Ok(())
    }

    pub async fn mark_complete(
        &mut self,
        conversation_id: ConversationId,
    ) -> Result<(), BoardError> {
        let (board, conversation) = self.owned(conversation_id, "complete")?;
        if !board.can_complete(conversation) {
            return Err(BoardError::NotAllowed {
                action: "complete",
                reason: "the request is already complete",
            });
        }
        let help_request_id = conversation.help_request_id;

        self.api.complete_help_request(help_request_id).await?;
        info!("Help request {} marked complete", help_request_id);

        self.refresh().await;
        Ok(())
    }

    fn owned(
        &self,
        conversation_id: ConversationId,
        action: &'static str,
    ) -> Result<(&ConversationBoard, &Conversation), BoardError> {
        let viewer = self.viewer.ok_or(BoardError::NotAuthenticated)?;
        let board = self
            .board
            .as_ref()
            .ok_or(BoardError::NotFound(conversation_id))?;
        let conversation = board
            .get(conversation_id)
            .ok_or(BoardError::NotFound(conversation_id))?;
        if !conversation.is_owned_by(viewer) {
            return Err(BoardError::NotOwner(action));
        }
        Ok((board, conversation))
    }
}
