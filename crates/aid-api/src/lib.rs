pub mod auth;
pub mod client;
pub mod directory;
pub mod error;
pub mod help_requests;
pub mod messages;
pub mod session;

pub use client::ApiClient;
pub use directory::{ConversationApi, HelpRequestApi, MessageApi};
pub use error::ClientError;
pub use session::{Session, SessionStore};
