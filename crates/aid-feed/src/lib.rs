//! Client-side state for the messaging views: the per-conversation message
//! feed, the conversation list and the help-request board.

pub mod controller;
pub mod conversations;
pub mod error;
pub mod list;
pub mod notice;
pub mod reconciler;
pub mod requests;
pub mod stats;

pub use controller::{FeedConfig, FeedController};
pub use conversations::{AssignedCount, ConversationBoard, ConversationRow, REPUBLISH_THRESHOLD};
pub use error::BoardError;
pub use list::ConversationList;
pub use notice::{Notice, NoticeKind};
pub use reconciler::{Applied, FeedSnapshot, MessageFeed};
pub use requests::{HelpRequestBoard, HelpRequestForm};
