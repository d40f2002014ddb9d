//! # Notice Board
//!
//! Transient messages shown after a command: one error slot and one success
//! slot. A notice disappears once its time-to-live has passed.
//!
//! ```text
//!   post(Success, "Bill saved successfully!", t0)
//!        │
//!        ▼
//!   ┌──────────────┬──────────────────────────────┐
//!   │ success slot │ "Bill saved…"  expires t0+7s │
//!   │ error slot   │ (empty)                      │
//!   └──────────────┴──────────────────────────────┘
//!        │
//!        ▼
//!   active(t0 + 8s) ──► []   (expired notices are dropped)
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default time-to-live for a notice.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(7);

/// Longest time-to-live a notice can have.
pub const MAX_NOTICE_TTL: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub posted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeBoard {
    #[serde(skip, default = "default_ttl")]
    ttl: Duration,
    #[serde(default)]
    error: Option<Notice>,
    #[serde(default)]
    success: Option<Notice>,
}

fn default_ttl() -> Duration {
    DEFAULT_NOTICE_TTL
}

impl Default for NoticeBoard {
    fn default() -> Self {
        NoticeBoard::new(DEFAULT_NOTICE_TTL)
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        NoticeBoard {
            ttl,
            error: None,
            success: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Changes the TTL for notices posted from now on.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Posts a notice, replacing any notice of the same kind.
    pub fn post(&mut self, kind: NoticeKind, message: impl Into<String>, now: DateTime<Utc>) {
        let ttl = chrono::Duration::from_std(self.ttl.min(MAX_NOTICE_TTL))
            .unwrap_or_else(|_| chrono::Duration::days(1));
        let notice = Notice {
            kind,
            message: message.into(),
            posted_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        match kind {
            NoticeKind::Error => self.error = Some(notice),
            NoticeKind::Success => self.success = Some(notice),
        }
    }

    /// Notices still visible at `now`, error first.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Notice> {
        [self.error.as_ref(), self.success.as_ref()]
            .into_iter()
            .flatten()
            .filter(|notice| !notice.is_expired(now))
            .collect()
    }

    /// Drops expired notices.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        if self.error.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.error = None;
        }
        if self.success.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.success = None;
        }
    }

    pub fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_notice_expires_after_ttl() {
        let mut board = NoticeBoard::default();
        board.post(NoticeKind::Success, "Bill saved successfully!", at(0));

        assert_eq!(board.active(at(6)).len(), 1);
        assert!(board.active(at(7)).is_empty());
    }

    #[test]
    fn test_one_slot_per_kind() {
        let mut board = NoticeBoard::new(Duration::from_secs(10));
        board.post(NoticeKind::Error, "first", at(0));
        board.post(NoticeKind::Error, "second", at(1));
        board.post(NoticeKind::Success, "done", at(2));

        let active = board.active(at(3));
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].message, "second");
        assert_eq!(active[1].kind, NoticeKind::Success);
    }

    #[test]
    fn test_prune_keeps_live_notices() {
        let mut board = NoticeBoard::new(Duration::from_secs(5));
        board.post(NoticeKind::Error, "old", at(0));
        board.post(NoticeKind::Success, "new", at(4));

        board.prune(at(6));
        let active = board.active(at(6));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "new");
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let mut board = NoticeBoard::new(Duration::from_secs(9_000_000_000_000));
        board.post(NoticeKind::Success, "Bill saved successfully!", at(0));

        let active = board.active(at(86_399));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].expires_at, at(86_400));
    }

    #[test]
    fn test_post_near_the_end_of_time_does_not_overflow() {
        let mut board = NoticeBoard::default();
        let late = DateTime::<Utc>::MAX_UTC - chrono::Duration::seconds(1);
        board.post(NoticeKind::Error, "late", late);

        assert_eq!(board.error.as_ref().unwrap().expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_ttl_is_not_persisted() {
        let mut board = NoticeBoard::new(Duration::from_secs(60));
        board.post(NoticeKind::Success, "kept", at(0));

        let json = serde_json::to_string(&board).unwrap();
        let restored: NoticeBoard = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.ttl(), DEFAULT_NOTICE_TTL);
        assert_eq!(restored.active(at(30)).len(), 1);
    }
}
