use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::Verdict;
use dashmap::DashMap;
use tracing::{error, info, warn};

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Extra classification a front end may render differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastTag {
    /// The backend flagged the submission as cheating.
    IntegrityViolation,
    /// The challenge had already been solved.
    AlreadySolved,
}

/// A user-visible notification.
///
/// Notifications sharing a `key` replace each other instead of stacking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub key: String,
    pub level: ToastLevel,
    pub title: String,
    pub description: Option<String>,
    pub tag: Option<ToastTag>,
}

impl Toast {
    pub fn new(key: impl Into<String>, level: ToastLevel, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            level,
            title: title.into(),
            description: None,
            tag: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tag(mut self, tag: ToastTag) -> Self {
        self.tag = Some(tag);
        self
    }
}

/// Sink for user-visible notifications.
pub trait Notifier: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, toast: Toast) {
        let description = toast.description.as_deref().unwrap_or_default();
        match toast.level {
            ToastLevel::Success | ToastLevel::Info => {
                info!(key = %toast.key, tag = ?toast.tag, "{}: {}", toast.title, description)
            }
            ToastLevel::Warning => {
                warn!(key = %toast.key, tag = ?toast.tag, "{}: {}", toast.title, description)
            }
            ToastLevel::Error => {
                error!(key = %toast.key, tag = ?toast.tag, "{}: {}", toast.title, description)
            }
        }
    }
}

/// A notification currently on the board.
#[derive(Debug, Clone)]
struct BoardEntry {
    toast: Toast,
    updated_at: DateTime<Utc>,
    /// How many times this key was shown, including replacements.
    deliveries: u32,
}

/// In-memory notifier keeping the latest toast per key.
#[derive(Debug, Default)]
pub struct NotificationBoard {
    entries: DashMap<String, BoardEntry>,
}

impl NotificationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Toast> {
        self.entries.get(key).map(|e| e.toast.clone())
    }

    pub fn deliveries(&self, key: &str) -> u32 {
        self.entries.get(key).map(|e| e.deliveries).unwrap_or(0)
    }

    pub fn dismiss(&self, key: &str) -> Option<Toast> {
        self.entries.remove(key).map(|(_, e)| e.toast)
    }

    /// Visible notifications, oldest first.
    pub fn toasts(&self) -> Vec<Toast> {
        let mut entries: Vec<BoardEntry> = self.entries.iter().map(|e| e.clone()).collect();
        entries.sort_by_key(|e| e.updated_at);
        entries.into_iter().map(|e| e.toast).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Notifier for NotificationBoard {
    fn show(&self, toast: Toast) {
        let now = Utc::now();
        self.entries
            .entry(toast.key.clone())
            .and_modify(|e| {
                e.toast = toast.clone();
                e.updated_at = now;
                e.deliveries += 1;
            })
            .or_insert_with(|| BoardEntry {
                toast,
                updated_at: now,
                deliveries: 1,
            });
    }
}

/// Notification key for a submission.
pub fn submission_key(submission_id: i64) -> String {
    format!("submission-{submission_id}")
}

/// Maps verdicts to keyed notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// The notification for a verdict. `Pending` has none.
    pub fn toast_for(submission_id: i64, verdict: Verdict) -> Option<Toast> {
        let key = submission_key(submission_id);
        let title = |label: &str| format!("#{submission_id} {label}");
        let toast = match verdict {
            Verdict::Pending => return None,
            Verdict::Correct => Toast::new(key, ToastLevel::Success, title("Correct"))
                .with_description("Congratulations, the flag is correct!"),
            Verdict::Incorrect => Toast::new(key, ToastLevel::Error, title("Incorrect"))
                .with_description("Check it again?"),
            Verdict::Cheat => Toast::new(key, ToastLevel::Error, title("Cheat"))
                .with_description("This submission looks like cheating and has been recorded.")
                .with_tag(ToastTag::IntegrityViolation),
            Verdict::Expired => Toast::new(key, ToastLevel::Info, title("Expired"))
                .with_description("Submitted after the deadline."),
            Verdict::Duplicate => Toast::new(key, ToastLevel::Success, title("Correct, again"))
                .with_description("You have already solved this challenge.")
                .with_tag(ToastTag::AlreadySolved),
        };
        Some(toast)
    }

    /// Show the notification for a verdict. Returns false for `Pending`.
    pub fn notify(&self, submission_id: i64, verdict: Verdict) -> bool {
        match Self::toast_for(submission_id, verdict) {
            Some(toast) => {
                self.notifier.show(toast);
                true
            }
            None => false,
        }
    }
}
