use std::collections::HashSet;

use aid_types::{ConversationId, Message, MessageId};

/// What the view renders. A new `revision` means the view changed and should
/// scroll to its newest message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub revision: u64,
    pub messages: Vec<Message>,
}

/// Outcome of feeding data into a `MessageFeed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// A fetch response older than one already applied.
    Stale,
    /// A pushed message that is already displayed.
    Duplicate,
    /// A pushed message for some other conversation.
    Foreign,
}

impl Applied {
    pub fn is_updated(self) -> bool {
        self == Self::Updated
    }
}

/// Ordered, deduplicated message sequence for one conversation.
///
/// Two writers feed it: full-history fetches, which replace the sequence, and
/// the push channel, which appends. Appends rely on the channel delivering a
/// conversation's messages in creation order and never re-sort.
#[derive(Debug)]
pub struct MessageFeed {
    conversation_id: ConversationId,
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
    revision: u64,
    last_fetch_seq: u64,
}

impl MessageFeed {
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            messages: Vec::new(),
            ids: HashSet::new(),
            revision: 0,
            last_fetch_seq: 0,
        }
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            revision: self.revision,
            messages: self.messages.clone(),
        }
    }

    /// Apply a full history fetch tagged with sequence number `seq` (issue
    /// order, starting at 1). The server returns newest first.
    ///
    /// Displayed messages missing from the history but newer than its newest
    /// entry are kept: they arrived by push after the server built the
    /// response, and dropping them would make them blink out until the next
    /// poll.
    pub fn apply_history(&mut self, seq: u64, newest_first: Vec<Message>) -> Applied {
        if seq <= self.last_fetch_seq {
            return Applied::Stale;
        }
        self.last_fetch_seq = seq;

        let mut history = newest_first;
        history.reverse();
        history.sort_by(Message::chronological);

        let mut ids = HashSet::with_capacity(history.len());
        history.retain(|m| ids.insert(m.id));

        let carried: Vec<Message> = match history.last() {
            Some(newest) => self
                .messages
                .iter()
                .filter(|m| !ids.contains(&m.id))
                .filter(|m| Message::chronological(m, newest).is_gt())
                .cloned()
                .collect(),
            None => self.messages.clone(),
        };
        for m in carried {
            ids.insert(m.id);
            history.push(m);
        }

        self.messages = history;
        self.ids = ids;
        self.revision += 1;
        Applied::Updated
    }

    /// Append a message delivered by the push channel.
    pub fn append_pushed(&mut self, message: Message) -> Applied {
        if message.conversation_id != self.conversation_id {
            return Applied::Foreign;
        }
        if !self.ids.insert(message.id) {
            return Applied::Duplicate;
        }

        self.messages.push(message);
        self.revision += 1;
        Applied::Updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap() + Duration::seconds(secs)
    }

    fn msg(id: MessageId, secs: i64) -> Message {
        Message {
            id,
            conversation_id: 1,
            sender_id: 7,
            body: format!("m{}", id),
            created_at: at(secs),
        }
    }

    fn ids(feed: &MessageFeed) -> Vec<MessageId> {
        feed.messages().iter().map(|m| m.id).collect()
    }

    #[test]
    fn history_is_displayed_oldest_first() {
        let mut feed = MessageFeed::new(1);
        let applied = feed.apply_history(1, vec![msg(3, 30), msg(2, 20), msg(1, 10)]);

        assert!(applied.is_updated());
        assert_eq!(ids(&feed), vec![1, 2, 3]);
        assert_eq!(feed.revision(), 1);
    }

    #[test]
    fn equal_timestamps_order_by_id() {
        let mut feed = MessageFeed::new(1);
        feed.apply_history(1, vec![msg(4, 10), msg(9, 10), msg(2, 10), msg(1, 5)]);
        assert_eq!(ids(&feed), vec![1, 2, 4, 9]);
    }

    #[test]
    fn duplicate_ids_in_history_collapse() {
        let mut feed = MessageFeed::new(1);
        feed.apply_history(1, vec![msg(2, 20), msg(2, 20), msg(1, 10)]);
        assert_eq!(ids(&feed), vec![1, 2]);
    }

    #[test]
    fn stale_fetch_is_dropped() {
        let mut feed = MessageFeed::new(1);
        feed.apply_history(2, vec![msg(2, 20), msg(1, 10)]);

        assert_eq!(feed.apply_history(1, vec![msg(1, 10)]), Applied::Stale);
        assert_eq!(feed.apply_history(2, vec![]), Applied::Stale);
        assert_eq!(ids(&feed), vec![1, 2]);
        assert_eq!(feed.revision(), 1);
    }

    #[test]
    fn push_appends_without_reordering() {
        let mut feed = MessageFeed::new(1);
        feed.apply_history(1, vec![msg(2, 20), msg(1, 10)]);

        // Even an out-of-order timestamp is appended, never sorted in.
        assert!(feed.append_pushed(msg(5, 15)).is_updated());
        assert!(feed.append_pushed(msg(6, 40)).is_updated());
        assert_eq!(ids(&feed), vec![1, 2, 5, 6]);
        assert_eq!(feed.revision(), 3);
    }

    #[test]
    fn push_is_idempotent_and_scoped() {
        let mut feed = MessageFeed::new(1);
        feed.apply_history(1, vec![msg(1, 10)]);

        assert_eq!(feed.append_pushed(msg(1, 10)), Applied::Duplicate);

        let mut other = msg(8, 50);
        other.conversation_id = 2;
        assert_eq!(feed.append_pushed(other), Applied::Foreign);

        assert_eq!(ids(&feed), vec![1]);
        assert_eq!(feed.revision(), 1);
    }

    #[test]
    fn fetch_racing_a_push_keeps_the_newer_pushed_message() {
        let mut feed = MessageFeed::new(1);
        feed.apply_history(1, vec![msg(1, 10)]);
        feed.append_pushed(msg(2, 20));

        // Response built before message 2 existed.
        feed.apply_history(2, vec![msg(1, 10)]);
        assert_eq!(ids(&feed), vec![1, 2]);

        // Once the server includes it, it appears exactly once.
        feed.apply_history(3, vec![msg(2, 20), msg(1, 10)]);
        assert_eq!(ids(&feed), vec![1, 2]);
    }

    #[test]
    fn fetch_replaces_older_entries_wholesale() {
        let mut feed = MessageFeed::new(1);
        feed.apply_history(1, vec![msg(3, 30), msg(1, 10)]);

        // Message 1 absent and older than the newest entry: replaced away.
        feed.apply_history(2, vec![msg(3, 30), msg(2, 20)]);
        assert_eq!(ids(&feed), vec![2, 3]);
    }
}
