use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use aid_types::events::{CableCommand, CableFrame, ControlFrame, SubscriptionIdentity};
use aid_types::{ConversationId, Message};

use crate::PushConnector;
use crate::backoff::Backoff;
use crate::error::GatewayError;
use crate::token::correlation_token;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The backend pings every 3 seconds; a socket silent for several pings is dead
/// even if TCP has not noticed yet.
const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct CableConfig {
    pub url: String,
    pub backoff: Backoff,
    pub stale_after: Duration,
    /// Pushed messages buffered between the socket task and the feed.
    pub buffer: usize,
}

impl CableConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            backoff: Backoff::default(),
            stale_after: DEFAULT_STALE_AFTER,
            buffer: 256,
        }
    }
}

/// Opens one websocket per subscription. Each subscription owns its socket,
/// so closing one conversation view never disturbs another.
#[derive(Debug, Clone)]
pub struct CableConnector {
    config: CableConfig,
}

impl CableConnector {
    pub fn new(config: CableConfig) -> Self {
        Self { config }
    }
}

impl PushConnector for CableConnector {
    fn subscribe(
        &self,
        conversation_id: ConversationId,
        shutdown: CancellationToken,
    ) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(self.config.buffer.max(1));
        let identity = SubscriptionIdentity::messages(correlation_token(), conversation_id);
        tokio::spawn(run_subscription(self.config.clone(), identity, tx, shutdown));
        rx
    }
}

/// How a live session ended without an error.
enum SessionEnd {
    Shutdown,
    ReceiverGone,
}

/// Keep one subscription alive until shutdown, reconnecting with backoff.
async fn run_subscription(
    config: CableConfig,
    identity: SubscriptionIdentity,
    tx: mpsc::Sender<Message>,
    shutdown: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let connected = tokio::select! {
            _ = shutdown.cancelled() => return,
            result = connect_async(config.url.as_str()) => result,
        };

        let error = match connected {
            Ok((socket, _)) => {
                debug!(
                    "Push channel connected for conversation {} ({})",
                    identity.conversation_id, identity.id
                );
                let mut confirmed = false;
                let session = drive(
                    socket,
                    &identity,
                    &tx,
                    &shutdown,
                    config.stale_after,
                    &mut confirmed,
                );
                match session.await {
                    Ok(SessionEnd::Shutdown) => {
                        info!(
                            "Push channel for conversation {} closed",
                            identity.conversation_id
                        );
                        return;
                    }
                    Ok(SessionEnd::ReceiverGone) => return,
                    Err(e) => {
                        if confirmed {
                            attempt = 0;
                        }
                        e
                    }
                }
            }
            Err(e) => GatewayError::Connect(e),
        };

        if !error.is_retryable() {
            warn!(
                "Push channel for conversation {} stopped: {}",
                identity.conversation_id, error
            );
            return;
        }

        attempt += 1;
        if config.backoff.exhausted(attempt) {
            warn!(
                "Push channel for conversation {} giving up after {} attempts: {}",
                identity.conversation_id,
                attempt - 1,
                error
            );
            return;
        }

        let delay = config.backoff.jittered(attempt);
        warn!(
            "Push channel for conversation {} lost ({}), reconnecting in {:?}",
            identity.conversation_id, error, delay
        );

        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Run one connected session: subscribe, then forward application messages
/// until the socket fails or shutdown is requested.
async fn drive(
    socket: Socket,
    identity: &SubscriptionIdentity,
    tx: &mpsc::Sender<Message>,
    shutdown: &CancellationToken,
    stale_after: Duration,
    confirmed: &mut bool,
) -> Result<SessionEnd, GatewayError> {
    let (mut sink, mut stream) = socket.split();

    sink.send(command_frame(&CableCommand::subscribe(identity))).await?;

    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => {
                // Best effort: the server drops the subscription with the socket anyway.
                let _ = sink.send(command_frame(&CableCommand::unsubscribe(identity))).await;
                let _ = sink.close().await;
                return Ok(SessionEnd::Shutdown);
            }
            next = tokio::time::timeout(stale_after, stream.next()) => next,
        };

        let msg = match next {
            Err(_) => return Err(GatewayError::Stale(stale_after)),
            Ok(None) => return Err(GatewayError::Closed),
            Ok(Some(Err(e))) => return Err(e.into()),
            Ok(Some(Ok(msg))) => msg,
        };

        let text = match msg {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => return Err(GatewayError::Closed),
            _ => continue,
        };

        match CableFrame::parse(text.as_str()) {
            Ok(CableFrame::Control(control)) => match control {
                ControlFrame::Welcome | ControlFrame::Ping => {
                    trace!("Push channel control frame: {:?}", control);
                }
                ControlFrame::ConfirmSubscription => {
                    *confirmed = true;
                    info!(
                        "Subscribed to conversation {} ({})",
                        identity.conversation_id, identity.id
                    );
                }
                ControlFrame::RejectSubscription => return Err(GatewayError::Rejected),
                ControlFrame::Disconnect { reason, reconnect } => {
                    return Err(GatewayError::Disconnected {
                        reason: reason.unwrap_or_else(|| "unspecified".to_string()),
                        reconnect,
                    });
                }
                ControlFrame::Other(kind) => debug!("Ignoring push frame of type '{}'", kind),
            },
            Ok(CableFrame::Message(message)) => {
                trace!("Push message {} for conversation {}", message.id, message.conversation_id);
                if tx.send(message).await.is_err() {
                    return Ok(SessionEnd::ReceiverGone);
                }
            }
            Ok(CableFrame::Unrecognized(payload)) => {
                debug!("Ignoring unrecognized push payload: {}", payload);
            }
            Err(e) => {
                let raw = text.as_str();
                warn!(
                    "Bad push frame: {} -- raw: {}",
                    e,
                    raw.chars().take(200).collect::<String>()
                );
            }
        }
    }
}

fn command_frame(command: &CableCommand) -> WsMessage {
    // CableCommand is plain strings and cannot fail to serialize.
    WsMessage::text(serde_json::to_string(command).unwrap_or_default())
}
