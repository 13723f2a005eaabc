use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use aid_api::{ClientError, MessageApi};
use aid_gateway::PushConnector;
use aid_types::api::SendMessageRequest;
use aid_types::{ConversationId, Message, UserId};

use crate::reconciler::{Applied, FeedSnapshot, MessageFeed};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub poll_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

enum Command {
    Submit(String),
    Refresh,
}

/// A finished history fetch, handed back to the loop to apply.
struct Fetched {
    seq: u64,
    result: Result<Vec<Message>, ClientError>,
}

/// Live message feed for one open conversation.
///
/// `activate` spawns a single task that owns the `MessageFeed` and
/// multiplexes polling, the push subscription, user submits and request
/// completions. Views read through `snapshots()`. Dropping the controller or
/// calling `deactivate` stops polling, closes the push subscription and
/// aborts in-flight fetches, so nothing is applied after the view goes away.
/// Sends are not aborted: a submitted message still reaches the backend.
pub struct FeedController {
    conversation_id: ConversationId,
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<FeedSnapshot>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl FeedController {
    pub fn activate<A, P>(
        api: Arc<A>,
        push: &P,
        conversation_id: ConversationId,
        user_id: Option<UserId>,
        config: FeedConfig,
    ) -> Self
    where
        A: MessageApi,
        P: PushConnector + ?Sized,
    {
        let shutdown = CancellationToken::new();
        let pushed = push.subscribe(conversation_id, shutdown.child_token());
        let (snapshot_tx, snapshots) = watch::channel(FeedSnapshot::default());
        let (commands, command_rx) = mpsc::unbounded_channel();

        let feed_loop = FeedLoop {
            api,
            conversation_id,
            user_id,
            feed: MessageFeed::new(conversation_id),
            pushed,
            commands: command_rx,
            snapshots: snapshot_tx,
            shutdown: shutdown.clone(),
            poll_interval: config.poll_interval,
            next_seq: 0,
        };
        let task = tokio::spawn(feed_loop.run());

        info!("Feed for conversation {} activated", conversation_id);

        Self {
            conversation_id,
            commands,
            snapshots,
            shutdown,
            task: Some(task),
        }
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Receiver that observes every published snapshot.
    pub fn snapshots(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.clone()
    }

    pub fn current(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Send the draft as a new message. The draft is emptied before this
    /// returns; it is not restored if the send later fails.
    pub fn submit(&self, draft: &mut String) {
        let body = std::mem::take(draft);
        if self.commands.send(Command::Submit(body)).is_err() {
            debug!("Feed for conversation {} is closed; submit dropped", self.conversation_id);
        }
    }

    /// Fetch the full history now instead of waiting for the next tick.
    pub fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the feed and wait for its task to exit, including any sends
    /// still in flight.
    pub async fn deactivate(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for FeedController {
    /// The loop task is detached rather than aborted so pending sends can
    /// finish in the background.
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct FeedLoop<A> {
    api: Arc<A>,
    conversation_id: ConversationId,
    user_id: Option<UserId>,
    feed: MessageFeed,
    pushed: mpsc::Receiver<Message>,
    commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<FeedSnapshot>,
    shutdown: CancellationToken,
    poll_interval: Duration,
    next_seq: u64,
}

impl<A: MessageApi> FeedLoop<A> {
    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Fetches are aborted on shutdown; sends are drained instead.
        let mut fetches: JoinSet<Fetched> = JoinSet::new();
        let mut sends: JoinSet<Result<(), ClientError>> = JoinSet::new();
        let mut push_open = true;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => break,

                // The first tick completes immediately, giving the initial fetch.
                _ = ticker.tick() => self.spawn_fetch(&mut fetches),

                pushed = self.pushed.recv(), if push_open => match pushed {
                    Some(message) => self.on_pushed(message),
                    None => {
                        push_open = false;
                        warn!(
                            "Push channel for conversation {} ended; continuing with polling only",
                            self.conversation_id
                        );
                    }
                },

                command = self.commands.recv() => match command {
                    Some(Command::Submit(body)) => self.spawn_send(body, &mut sends),
                    Some(Command::Refresh) => self.spawn_fetch(&mut fetches),
                    None => break,
                },

                Some(done) = fetches.join_next(), if !fetches.is_empty() => match done {
                    Ok(fetched) => self.on_fetched(fetched),
                    Err(e) if e.is_panic() => warn!("Feed fetch task panicked: {}", e),
                    Err(_) => {}
                },

                Some(done) = sends.join_next(), if !sends.is_empty() => {
                    if self.on_sent(done) {
                        self.spawn_fetch(&mut fetches);
                    }
                },
            }
        }

        fetches.abort_all();

        // Submits queued before shutdown still go out.
        while let Ok(command) = self.commands.try_recv() {
            if let Command::Submit(body) = command {
                self.spawn_send(body, &mut sends);
            }
        }
        while let Some(done) = sends.join_next().await {
            self.on_sent(done);
        }

        debug!("Feed for conversation {} deactivated", self.conversation_id);
    }

    fn spawn_fetch(&mut self, fetches: &mut JoinSet<Fetched>) {
        self.next_seq += 1;
        let seq = self.next_seq;
        let api = self.api.clone();
        let conversation_id = self.conversation_id;

        debug!("Fetching conversation {} (seq {})", conversation_id, seq);
        fetches.spawn(async move {
            let result = api.fetch_messages(conversation_id).await;
            Fetched { seq, result }
        });
    }

    fn spawn_send(&self, body: String, sends: &mut JoinSet<Result<(), ClientError>>) {
        let Some(user_id) = self.user_id else {
            warn!(
                "No signed-in user; message for conversation {} not sent",
                self.conversation_id
            );
            return;
        };
        let api = self.api.clone();
        let request = SendMessageRequest::new(body, self.conversation_id, user_id);

        sends.spawn(async move { api.send_message(request).await });
    }

    fn on_pushed(&mut self, message: Message) {
        let id = message.id;
        match self.feed.append_pushed(message) {
            Applied::Updated => {
                debug!("Pushed message {} appended", id);
                self.publish();
            }
            Applied::Foreign => {
                debug!("Ignoring pushed message {} for another conversation", id)
            }
            Applied::Duplicate | Applied::Stale => {}
        }
    }

    fn on_fetched(&mut self, Fetched { seq, result }: Fetched) {
        match result {
            Ok(history) => match self.feed.apply_history(seq, history) {
                Applied::Updated => self.publish(),
                _ => debug!(
                    "Dropping stale fetch {} for conversation {}",
                    seq, self.conversation_id
                ),
            },
            Err(e) => warn!(
                "Failed to fetch messages for conversation {}: {}",
                self.conversation_id, e
            ),
        }
    }

    /// Log a finished send. Returns whether it succeeded.
    fn on_sent(&self, done: Result<Result<(), ClientError>, JoinError>) -> bool {
        match done {
            Ok(Ok(())) => true,
            // TODO: hand the body back to the view so the draft can be restored.
            Ok(Err(e)) => {
                warn!(
                    "Failed to send message to conversation {}: {}",
                    self.conversation_id, e
                );
                false
            }
            Err(e) => {
                warn!("Feed send task failed: {}", e);
                false
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.feed.snapshot());
    }
}
