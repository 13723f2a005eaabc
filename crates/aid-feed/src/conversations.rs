use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use aid_types::{Conversation, ConversationId, HelpRequestId, UserId};

/// Helpers a request needs before its requester may republish it.
pub const REPUBLISH_THRESHOLD: u32 = 5;

/// Number of helpers assigned to a help request, and where the number came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignedCount {
    /// Reported by the backend on the conversation rows.
    Explicit(u32),
    /// Counted from the conversation rows the viewer can see.
    Derived(u32),
}

impl AssignedCount {
    pub fn get(self) -> u32 {
        match self {
            Self::Explicit(n) | Self::Derived(n) => n,
        }
    }
}

/// Which row actions the viewer is offered, and whether each is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowActions {
    /// Only the requester (the conversation's `user_id`) gets actions.
    pub offered: bool,
    pub republish: bool,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRow {
    pub conversation_id: ConversationId,
    pub help_request_id: HelpRequestId,
    pub counterpart: UserId,
    pub title: Option<String>,
    pub last_message: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub republished: bool,
    pub completed: bool,
    pub selectable: bool,
    pub assigned: AssignedCount,
    pub actions: RowActions,
}

/// Derived state for one fetch of the conversation list. Rebuilt from scratch
/// on every fetch; nothing carries over between fetches.
#[derive(Debug, Clone)]
pub struct ConversationBoard {
    viewer: UserId,
    conversations: Vec<Conversation>,
    republished: HashSet<ConversationId>,
    assigned: HashMap<HelpRequestId, AssignedCount>,
}

impl ConversationBoard {
    pub fn empty(viewer: UserId) -> Self {
        Self::from_conversations(viewer, Vec::new())
    }

    pub fn from_conversations(viewer: UserId, conversations: Vec<Conversation>) -> Self {
        let republished = conversations
            .iter()
            .filter(|c| !c.visible)
            .map(|c| c.id)
            .collect();
        let assigned = aggregate_assigned(&conversations);

        Self {
            viewer,
            conversations,
            republished,
            assigned,
        }
    }

    pub fn viewer(&self) -> UserId {
        self.viewer
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, conversation_id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    pub fn is_republished(&self, conversation_id: ConversationId) -> bool {
        self.republished.contains(&conversation_id)
    }

    pub fn assigned_count(&self, help_request_id: HelpRequestId) -> AssignedCount {
        self.assigned
            .get(&help_request_id)
            .copied()
            .unwrap_or(AssignedCount::Derived(0))
    }

    /// Why republishing `conversation` is not allowed, if it is not.
    pub fn republish_blocker(&self, conversation: &Conversation) -> Option<&'static str> {
        if conversation.completion_status {
            Some("the request is already complete")
        } else if self.is_republished(conversation.id) {
            Some("the conversation is already republished")
        } else if self.assigned_count(conversation.help_request_id).get() < REPUBLISH_THRESHOLD {
            Some("fewer than 5 helpers are assigned")
        } else {
            None
        }
    }

    pub fn can_republish(&self, conversation: &Conversation) -> bool {
        self.republish_blocker(conversation).is_none()
    }

    pub fn can_complete(&self, conversation: &Conversation) -> bool {
        !conversation.completion_status
    }

    pub fn is_selectable(&self, conversation: &Conversation) -> bool {
        conversation.visible && !self.is_republished(conversation.id)
    }

    /// Navigation target for a tap on `conversation_id`, if it may be opened.
    pub fn select(&self, conversation_id: ConversationId) -> Option<ConversationId> {
        self.get(conversation_id)
            .filter(|c| self.is_selectable(c))
            .map(|c| c.id)
    }

    pub fn rows(&self) -> Vec<ConversationRow> {
        self.conversations.iter().map(|c| self.row(c)).collect()
    }

    fn row(&self, c: &Conversation) -> ConversationRow {
        let offered = c.is_owned_by(self.viewer);
        ConversationRow {
            conversation_id: c.id,
            help_request_id: c.help_request_id,
            counterpart: c.counterpart(self.viewer),
            title: c.title.clone(),
            last_message: c.last_message.clone(),
            updated_at: c.updated_at,
            republished: self.is_republished(c.id),
            completed: c.completion_status,
            selectable: self.is_selectable(c),
            assigned: self.assigned_count(c.help_request_id),
            actions: RowActions {
                offered,
                republish: offered && self.can_republish(c),
                complete: offered && self.can_complete(c),
            },
        }
    }
}

/// One count per help request. An explicit backend count wins over the row
/// count; if rows disagree on it, the largest is taken.
fn aggregate_assigned(conversations: &[Conversation]) -> HashMap<HelpRequestId, AssignedCount> {
    let mut rows: HashMap<HelpRequestId, u32> = HashMap::new();
    let mut explicit: HashMap<HelpRequestId, u32> = HashMap::new();

    for c in conversations {
        *rows.entry(c.help_request_id).or_default() += 1;
        if let Some(n) = c.assigned_users_count {
            explicit
                .entry(c.help_request_id)
                .and_modify(|current| *current = (*current).max(n))
                .or_insert(n);
        }
    }

    rows.into_iter()
        .map(|(id, count)| {
            let resolved = match explicit.get(&id) {
                Some(&n) => AssignedCount::Explicit(n),
                None => AssignedCount::Derived(count),
            };
            (id, resolved)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(id: ConversationId, help_request_id: HelpRequestId) -> Conversation {
        Conversation {
            id,
            user_id: 1,
            sender_id: 100 + id,
            help_request_id,
            title: Some("Groceries".into()),
            description: None,
            request_type: None,
            last_message: None,
            updated_at: "2024-05-01T12:00:00Z".parse().unwrap(),
            visible: true,
            completion_status: false,
            assigned_users_count: None,
        }
    }

    fn helpers(help_request_id: HelpRequestId, n: i64) -> Vec<Conversation> {
        (1..=n).map(|i| conversation(help_request_id * 10 + i, help_request_id)).collect()
    }

    #[test]
    fn explicit_count_overrides_row_count() {
        let mut rows = helpers(1, 3);
        rows[2].assigned_users_count = Some(7);

        let board = ConversationBoard::from_conversations(1, rows);
        assert_eq!(board.assigned_count(1), AssignedCount::Explicit(7));
    }

    #[test]
    fn disagreeing_explicit_counts_take_the_largest() {
        let mut rows = helpers(1, 2);
        rows[0].assigned_users_count = Some(6);
        rows[1].assigned_users_count = Some(4);

        let board = ConversationBoard::from_conversations(1, rows);
        assert_eq!(board.assigned_count(1), AssignedCount::Explicit(6));
    }

    #[test]
    fn derived_count_is_per_help_request() {
        let mut rows = helpers(1, 3);
        rows.extend(helpers(2, 5));

        let board = ConversationBoard::from_conversations(1, rows);
        assert_eq!(board.assigned_count(1), AssignedCount::Derived(3));
        assert_eq!(board.assigned_count(2), AssignedCount::Derived(5));
        assert_eq!(board.assigned_count(9), AssignedCount::Derived(0));
    }

    #[test]
    fn republish_needs_threshold_open_and_visible() {
        let board = ConversationBoard::from_conversations(1, helpers(1, 4));
        assert!(!board.can_republish(&board.conversations()[0]));

        let board = ConversationBoard::from_conversations(1, helpers(1, 5));
        assert!(board.can_republish(&board.conversations()[0]));

        let mut rows = helpers(1, 5);
        rows[0].completion_status = true;
        let board = ConversationBoard::from_conversations(1, rows);
        assert_eq!(
            board.republish_blocker(&board.conversations()[0]),
            Some("the request is already complete")
        );
        assert!(board.can_republish(&board.conversations()[1]));

        let mut rows = helpers(1, 5);
        rows[0].visible = false;
        let board = ConversationBoard::from_conversations(1, rows);
        assert!(board.is_republished(11));
        assert!(!board.can_republish(&board.conversations()[0]));
    }

    #[test]
    fn hidden_conversation_never_navigates() {
        let mut rows = helpers(1, 2);
        rows[0].visible = false;

        let board = ConversationBoard::from_conversations(1, rows);
        assert_eq!(board.select(11), None);
        assert_eq!(board.select(12), Some(12));
        assert_eq!(board.select(99), None);
    }

    #[test]
    fn complete_enabled_until_completed() {
        let mut rows = helpers(1, 2);
        rows[1].completion_status = true;

        let board = ConversationBoard::from_conversations(1, rows);
        assert!(board.can_complete(&board.conversations()[0]));
        assert!(!board.can_complete(&board.conversations()[1]));
    }

    #[test]
    fn rows_offer_actions_to_the_requester_only() {
        let rows = helpers(1, 5);

        let owner = ConversationBoard::from_conversations(1, rows.clone());
        let row = &owner.rows()[0];
        assert_eq!(row.counterpart, 111);
        assert!(row.actions.offered && row.actions.republish && row.actions.complete);

        let helper = ConversationBoard::from_conversations(111, rows);
        let row = &helper.rows()[0];
        assert_eq!(row.counterpart, 1);
        assert_eq!(
            row.actions,
            RowActions {
                offered: false,
                republish: false,
                complete: false
            }
        );
        assert!(row.selectable);
    }
}
