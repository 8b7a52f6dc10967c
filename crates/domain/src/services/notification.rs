//! Notification dispatcher interface.
//!
//! The booking engine emits typed events through the [`Notifier`] trait and
//! never depends on a concrete transport. Dispatch is fire-and-forget: a
//! delivery failure is logged by the implementation and must not roll back
//! the state transition that triggered it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of notification events the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewMemberRegistered,
    DelistApproved,
    DelistRejected,
    ActivityReminder,
    EmailVerificationRequested,
    PhoneVerificationRequested,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationKind::NewMemberRegistered => "new_member_registered",
            NotificationKind::DelistApproved => "delist_approved",
            NotificationKind::DelistRejected => "delist_rejected",
            NotificationKind::ActivityReminder => "activity_reminder",
            NotificationKind::EmailVerificationRequested => "email_verification_requested",
            NotificationKind::PhoneVerificationRequested => "phone_verification_requested",
        };
        write!(f, "{s}")
    }
}

/// Contact coordinates for the recipient member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Recipient {
    pub member_id: Uuid,
    pub fullname: String,
    pub email: String,
    /// Empty when the member has not provided a phone number.
    pub phone_number: String,
}

/// Activity summary carried in reminders and delist decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivitySummary {
    pub activity_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
}

/// A notification event with its payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    NewMemberRegistered {
        recipient: Recipient,
        registered_at: DateTime<Utc>,
    },
    DelistApproved {
        recipient: Recipient,
        activity: ActivitySummary,
    },
    DelistRejected {
        recipient: Recipient,
        activity: ActivitySummary,
        reject_reason: String,
    },
    ActivityReminder {
        recipient: Recipient,
        activity: ActivitySummary,
    },
    EmailVerificationRequested {
        recipient: Recipient,
        code: String,
    },
    PhoneVerificationRequested {
        recipient: Recipient,
        code: String,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::NewMemberRegistered { .. } => NotificationKind::NewMemberRegistered,
            NotificationEvent::DelistApproved { .. } => NotificationKind::DelistApproved,
            NotificationEvent::DelistRejected { .. } => NotificationKind::DelistRejected,
            NotificationEvent::ActivityReminder { .. } => NotificationKind::ActivityReminder,
            NotificationEvent::EmailVerificationRequested { .. } => {
                NotificationKind::EmailVerificationRequested
            }
            NotificationEvent::PhoneVerificationRequested { .. } => {
                NotificationKind::PhoneVerificationRequested
            }
        }
    }

    pub fn recipient(&self) -> &Recipient {
        match self {
            NotificationEvent::NewMemberRegistered { recipient, .. }
            | NotificationEvent::DelistApproved { recipient, .. }
            | NotificationEvent::DelistRejected { recipient, .. }
            | NotificationEvent::ActivityReminder { recipient, .. }
            | NotificationEvent::EmailVerificationRequested { recipient, .. }
            | NotificationEvent::PhoneVerificationRequested { recipient, .. } => recipient,
        }
    }
}

/// Result of a dispatch attempt.
#[derive(Debug, Clone)]
pub enum DispatchResult {
    Sent,
    /// The recipient has no usable address for the transport.
    NoRecipientAddress,
    /// Delivery failed; the triggering state change stays committed.
    Failed(String),
    /// The implementation chose not to send (e.g. disabled in config).
    Skipped,
}

/// Dispatcher interface consumed by the booking engine.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> DispatchResult;
}

/// In-memory notifier for tests: records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: std::sync::Mutex<Vec<NotificationEvent>>,
    simulate_failure: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose every dispatch reports failure.
    pub fn failing() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
            simulate_failure: true,
        }
    }

    /// Events recorded so far.
    pub fn recorded(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Kinds recorded so far, in dispatch order.
    pub fn recorded_kinds(&self) -> Vec<NotificationKind> {
        self.recorded().iter().map(|e| e.kind()).collect()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: NotificationEvent) -> DispatchResult {
        let kind = event.kind();
        self.events.lock().unwrap().push(event);

        if self.simulate_failure {
            tracing::warn!(kind = %kind, "Recording notifier simulating delivery failure");
            return DispatchResult::Failed("simulated failure".to_string());
        }

        DispatchResult::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Recipient {
        Recipient {
            member_id: Uuid::nil(),
            fullname: "Anna Andersson".into(),
            email: "anna@example.com".into(),
            phone_number: "+46701234567".into(),
        }
    }

    fn activity() -> ActivitySummary {
        ActivitySummary {
            activity_id: Uuid::nil(),
            name: "Flag marshal".into(),
            date: NaiveDate::from_ymd_opt(2026, 6, 13).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(13, 0, 0),
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            NotificationKind::DelistApproved.to_string(),
            "delist_approved"
        );
        assert_eq!(
            NotificationKind::EmailVerificationRequested.to_string(),
            "email_verification_requested"
        );
    }

    #[test]
    fn test_event_kind_mapping() {
        let event = NotificationEvent::DelistRejected {
            recipient: recipient(),
            activity: activity(),
            reject_reason: "Too close to the event".into(),
        };
        assert_eq!(event.kind(), NotificationKind::DelistRejected);
        assert_eq!(event.recipient().fullname, "Anna Andersson");
    }

    #[test]
    fn test_event_serialization_tags_kind() {
        let event = NotificationEvent::DelistApproved {
            recipient: recipient(),
            activity: activity(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""kind":"delist_approved""#));
        assert!(json.contains("Flag marshal"));
    }

    #[test]
    fn test_recording_notifier_records() {
        let notifier = RecordingNotifier::new();
        let result = tokio_test::block_on(notifier.notify(NotificationEvent::ActivityReminder {
            recipient: recipient(),
            activity: activity(),
        }));
        assert!(matches!(result, DispatchResult::Sent));
        assert_eq!(
            notifier.recorded_kinds(),
            vec![NotificationKind::ActivityReminder]
        );
    }

    #[test]
    fn test_failing_notifier_still_records() {
        let notifier = RecordingNotifier::failing();
        let result = tokio_test::block_on(notifier.notify(NotificationEvent::NewMemberRegistered {
            recipient: recipient(),
            registered_at: Utc::now(),
        }));
        assert!(matches!(result, DispatchResult::Failed(_)));
        assert_eq!(notifier.recorded().len(), 1);
    }
}
