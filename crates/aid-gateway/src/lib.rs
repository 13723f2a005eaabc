//! Push-channel client: one websocket subscription per open conversation.

pub mod backoff;
pub mod connection;
pub mod error;
pub mod token;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use aid_types::{ConversationId, Message};

pub use backoff::Backoff;
pub use connection::{CableConfig, CableConnector};
pub use error::GatewayError;

/// Opens push subscriptions. Implemented by the websocket connector and by
/// in-memory fakes in tests.
pub trait PushConnector: Send + Sync + 'static {
    /// Start delivering application messages for `conversation_id`. The
    /// subscription lives until `shutdown` is cancelled or the receiver is
    /// dropped. A closed receiver means the connector gave up.
    fn subscribe(
        &self,
        conversation_id: ConversationId,
        shutdown: CancellationToken,
    ) -> mpsc::Receiver<Message>;
}
