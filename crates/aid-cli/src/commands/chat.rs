use std::collections::HashSet;

use anyhow::bail;
use tokio::io::{AsyncBufReadExt, BufReader};

use aid_feed::{ConversationList, FeedConfig, FeedController};
use aid_gateway::{CableConfig, CableConnector};
use aid_types::{ConversationId, Message, MessageId, UserId};

use crate::App;

pub async fn run(app: &App, conversation_id: ConversationId) -> anyhow::Result<()> {
    let session = app.sessions.require()?;
    let me = session.user_id();

    let mut list = ConversationList::new(app.api.clone(), Some(me));
    list.refresh().await;
    if list.select(conversation_id).is_none() {
        bail!("conversation {} is not open", conversation_id);
    }

    let push = CableConnector::new(CableConfig::new(app.config.cable_url.clone()));
    let feed = FeedController::activate(
        app.api.clone(),
        &push,
        conversation_id,
        Some(me),
        FeedConfig {
            poll_interval: app.config.poll_interval,
        },
    );

    println!(
        "Chatting in conversation {}. Type a message and press enter; Ctrl-C leaves.",
        conversation_id
    );

    let mut snapshots = feed.snapshots();
    let mut shown: HashSet<MessageId> = HashSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                for message in snapshot.messages.iter().filter(|m| shown.insert(m.id)) {
                    print_message(message, me);
                }
            }
            line = lines.next_line() => match line? {
                Some(mut draft) => {
                    if !draft.trim().is_empty() {
                        feed.submit(&mut draft);
                    }
                }
                None => break,
            },
        }
    }

    feed.deactivate().await;
    Ok(())
}

fn print_message(message: &Message, me: UserId) {
    let who = if message.sender_id == me {
        "you".to_string()
    } else {
        format!("user {}", message.sender_id)
    };
    println!(
        "{}  {}: {}",
        message.created_at.format("%H:%M"),
        who,
        message.body
    );
}
