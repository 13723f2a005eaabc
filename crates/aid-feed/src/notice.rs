use std::time::Duration;

use tokio::time::Instant;

/// How long a notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Inline feedback for login, signup and request submission. It hides itself
/// once `NOTICE_TTL` has passed.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    shown_at: Instant,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text)
    }

    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.shown_at.elapsed() < NOTICE_TTL
    }

    /// The text while the notice is still showing.
    pub fn visible_text(&self) -> Option<&str> {
        self.is_visible().then_some(self.text.as_str())
    }

    /// Resolves when the notice should be cleared.
    pub async fn expired(&self) {
        tokio::time::sleep_until(self.shown_at + NOTICE_TTL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn clears_after_three_seconds() {
        let notice = Notice::error("Title is required");
        assert_eq!(notice.visible_text(), Some("Title is required"));

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(notice.is_visible());

        notice.expired().await;
        assert!(!notice.is_visible());
        assert_eq!(notice.visible_text(), None);
    }
}
