//! Conversation list, help-request board and completed counter against fakes.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use aid_api::{ClientError, ConversationApi, HelpRequestApi, Session};
use aid_feed::stats::watch_completed_count;
use aid_feed::{BoardError, ConversationList, HelpRequestBoard, HelpRequestForm, NoticeKind};
use aid_types::api::NewHelpRequest;
use aid_types::{
    Conversation, ConversationId, HelpRequest, HelpRequestId, RequestType, User, UserId,
};

const REQUESTER: UserId = 1;

fn conversation(id: ConversationId, help_request_id: HelpRequestId) -> Conversation {
    Conversation {
        id,
        user_id: REQUESTER,
        sender_id: 100 + id,
        help_request_id,
        title: None,
        description: None,
        request_type: Some(RequestType::MaterialNeed),
        last_message: Some("on my way".into()),
        updated_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        visible: true,
        completion_status: false,
        assigned_users_count: None,
    }
}

#[derive(Default)]
struct FakeConversations {
    rows: Mutex<Vec<Conversation>>,
    calls: Mutex<Vec<String>>,
    lists: AtomicUsize,
}

impl ConversationApi for FakeConversations {
    async fn list_conversations(&self, user_id: UserId) -> Result<Vec<Conversation>, ClientError> {
        assert_eq!(user_id, REQUESTER);
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn complete_help_request(
        &self,
        help_request_id: HelpRequestId,
    ) -> Result<(), ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("complete/{}", help_request_id));
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.help_request_id == help_request_id {
                row.completion_status = true;
                row.visible = false;
            }
        }
        Ok(())
    }

    async fn republish_help_request(
        &self,
        help_request_id: HelpRequestId,
        conversation_id: ConversationId,
    ) -> Result<(), ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("republish/{}/{}", help_request_id, conversation_id));
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.id == conversation_id {
                row.visible = false;
            }
        }
        Ok(())
    }
}

fn list_with(
    rows: Vec<Conversation>,
) -> (Arc<FakeConversations>, ConversationList<FakeConversations>) {
    let api = Arc::new(FakeConversations {
        rows: Mutex::new(rows),
        ..FakeConversations::default()
    });
    let list = ConversationList::new(api.clone(), Some(REQUESTER));
    (api, list)
}

#[tokio::test]
async fn refresh_without_user_is_a_no_op() {
    let api = Arc::new(FakeConversations::default());
    let mut list = ConversationList::new(api.clone(), None);

    assert!(!list.refresh().await);
    assert!(list.board().is_none());
    assert_eq!(api.lists.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn mark_complete_then_refetch_hides_conversation() {
    let (api, mut list) = list_with(vec![conversation(11, 42)]);
    list.refresh().await;
    assert_eq!(list.select(11), Some(11));

    list.mark_complete(11).await.unwrap();

    assert_eq!(api.calls.lock().unwrap().as_slice(), ["complete/42"]);
    assert_eq!(api.lists.load(Ordering::SeqCst), 2);
    let board = list.board().unwrap();
    assert!(board.is_republished(11));
    assert_eq!(list.select(11), None);

    let err = list.mark_complete(11).await.unwrap_err();
    assert!(matches!(err, BoardError::NotAllowed { action: "complete", .. }));
}

#[tokio::test]
async fn republish_is_gated_on_helper_count() {
    let rows: Vec<_> = (11..15).map(|id| conversation(id, 42)).collect();
    let (api, mut list) = list_with(rows);
    list.refresh().await;

    let err = list.republish(11).await.unwrap_err();
    assert!(matches!(err, BoardError::NotAllowed { action: "republish", .. }));
    assert!(api.calls.lock().unwrap().is_empty());

    api.rows.lock().unwrap().push(conversation(15, 42));
    list.refresh().await;
    list.republish(11).await.unwrap();

    assert_eq!(api.calls.lock().unwrap().as_slice(), ["republish/42/11"]);
    assert!(list.board().unwrap().is_republished(11));
    assert!(matches!(
        list.republish(11).await.unwrap_err(),
        BoardError::NotAllowed { .. }
    ));
}

#[tokio::test]
async fn actions_are_for_the_requester_only() {
    let mut row = conversation(11, 42);
    row.user_id = 5;
    let (api, mut list) = list_with(vec![row]);
    list.refresh().await;

    assert!(matches!(
        list.mark_complete(11).await.unwrap_err(),
        BoardError::NotOwner("complete")
    ));
    assert!(matches!(
        list.mark_complete(99).await.unwrap_err(),
        BoardError::NotFound(99)
    ));
    assert!(api.calls.lock().unwrap().is_empty());
}

fn help_request(id: HelpRequestId, visible: bool) -> HelpRequest {
    HelpRequest {
        id,
        title: format!("Request {}", id),
        description: String::new(),
        latitude: 40.44,
        longitude: -79.99,
        request_type: RequestType::OneTimeTask,
        visible,
        completion_status: false,
        accepted_by_user: None,
    }
}

#[derive(Default)]
struct FakeRequests {
    requests: Mutex<Vec<HelpRequest>>,
    submitted: Mutex<Vec<NewHelpRequest>>,
    count: AtomicU64,
}

impl HelpRequestApi for FakeRequests {
    async fn list_help_requests(&self, token: &str) -> Result<Vec<HelpRequest>, ClientError> {
        assert_eq!(token, "tok");
        Ok(self.requests.lock().unwrap().clone())
    }

    async fn assign_help_request(
        &self,
        token: &str,
        help_request_id: HelpRequestId,
        user_id: UserId,
    ) -> Result<ConversationId, ClientError> {
        assert_eq!(token, "tok");
        for r in self.requests.lock().unwrap().iter_mut() {
            if r.id == help_request_id {
                r.accepted_by_user = Some(user_id);
                r.visible = false;
            }
        }
        Ok(70 + help_request_id)
    }

    async fn submit_help_request(
        &self,
        token: &str,
        request: NewHelpRequest,
    ) -> Result<(), ClientError> {
        assert_eq!(token, "tok");
        if request.title == "fail" {
            return Err(ClientError::Rejected("Title has already been taken".into()));
        }
        self.submitted.lock().unwrap().push(request);
        Ok(())
    }

    async fn completed_requests_count(&self) -> Result<u64, ClientError> {
        Ok(self.count.load(Ordering::SeqCst))
    }
}

fn session() -> Session {
    Session {
        token: "tok".into(),
        user: User {
            user_id: 9,
            email: None,
            first_name: Some("Grace".into()),
            last_name: None,
        },
    }
}

#[tokio::test]
async fn board_lists_only_visible_requests_and_assigns() {
    let api = Arc::new(FakeRequests {
        requests: Mutex::new(vec![
            help_request(1, true),
            help_request(2, false),
            help_request(3, true),
        ]),
        ..FakeRequests::default()
    });
    let mut board = HelpRequestBoard::new(api.clone(), session());

    assert!(board.refresh().await);
    let ids: Vec<_> = board.requests().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);

    assert_eq!(board.assign(3).await.unwrap(), 73);
    let ids: Vec<_> = board.requests().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn submit_reports_outcome_as_notice() {
    let api = Arc::new(FakeRequests::default());
    let mut board = HelpRequestBoard::new(api.clone(), session());

    let mut form = HelpRequestForm {
        title: "Groceries".into(),
        request_type: "material-need".into(),
        description: "Milk and bread".into(),
        latitude: "40.44".into(),
        longitude: "-79.99".into(),
    };
    let notice = board.submit(&form).await;
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(api.submitted.lock().unwrap()[0].user_id, 9);

    form.latitude.clear();
    let notice = board.submit(&form).await;
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "Latitude must be a number");

    form.latitude = "40.44".into();
    form.title = "fail".into();
    let notice = board.submit(&form).await;
    assert_eq!(notice.text, "Title has already been taken");
    assert_eq!(api.submitted.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn completed_count_follows_backend() {
    let api = Arc::new(FakeRequests::default());
    api.count.store(12, Ordering::SeqCst);
    let shutdown = CancellationToken::new();

    let mut count = watch_completed_count(api.clone(), Duration::from_secs(5), shutdown.clone());
    assert_eq!(*count.borrow(), None);
    count.changed().await.unwrap();
    assert_eq!(*count.borrow_and_update(), Some(12));

    api.count.store(13, Ordering::SeqCst);
    count.changed().await.unwrap();
    assert_eq!(*count.borrow_and_update(), Some(13));

    shutdown.cancel();
    assert!(count.changed().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn completed_count_of_zero_is_published() {
    let api = Arc::new(FakeRequests::default());
    let shutdown = CancellationToken::new();

    let mut count = watch_completed_count(api.clone(), Duration::from_secs(5), shutdown.clone());
    assert_eq!(*count.borrow(), None);

    count.changed().await.unwrap();
    assert_eq!(*count.borrow_and_update(), Some(0));

    // An unchanged value is not republished.
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(!count.has_changed().unwrap());

    shutdown.cancel();
}
