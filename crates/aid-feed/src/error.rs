use thiserror::Error;

use aid_api::ClientError;
use aid_types::ConversationId;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("not logged in")]
    NotAuthenticated,

    #[error("conversation {0} is not in the list")]
    NotFound(ConversationId),

    #[error("only the requester can {0} this request")]
    NotOwner(&'static str),

    #[error("cannot {action}: {reason}")]
    NotAllowed {
        action: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Api(#[from] ClientError),
}
