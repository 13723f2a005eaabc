pub mod api;
pub mod events;
pub mod models;

pub use models::{
    Conversation, ConversationId, HelpRequest, HelpRequestId, Message, MessageId, RequestType,
    User, UserId,
};
