//! Outbound notification delivery.
//!
//! Implements the domain [`Notifier`] trait over two transports: a console
//! notifier that only logs (the default, and the development setup), and a
//! webhook notifier that POSTs the event payload to the configured email
//! and SMS gateway URLs. Delivery is fire-and-forget for callers; failures
//! are logged and reported in the [`DispatchResult`], never propagated.

use std::sync::Arc;
use std::time::Duration;

use domain::services::notification::{
    DispatchResult, NotificationEvent, NotificationKind, Notifier,
};
use serde_json::json;

use crate::config::NotificationsConfig;

/// Selects the transport from configuration.
pub fn build_notifier(config: &NotificationsConfig) -> Arc<dyn Notifier> {
    if config.enabled {
        Arc::new(WebhookNotifier::new(config.clone()))
    } else {
        Arc::new(ConsoleNotifier)
    }
}

/// Logs every event instead of delivering it.
pub struct ConsoleNotifier;

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, event: NotificationEvent) -> DispatchResult {
        tracing::info!(
            kind = %event.kind(),
            member_id = %event.recipient().member_id,
            "Notification (console transport)"
        );
        DispatchResult::Skipped
    }
}

/// Which channel an event kind goes out on.
fn channel_for(kind: NotificationKind) -> Channel {
    match kind {
        NotificationKind::PhoneVerificationRequested => Channel::Sms,
        // Delist decisions go out on both channels, matching the portal's
        // member expectations for booking-affecting changes.
        NotificationKind::DelistApproved | NotificationKind::DelistRejected => Channel::Both,
        _ => Channel::Email,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Email,
    Sms,
    Both,
}

/// Delivers events as JSON webhooks to the configured gateway URLs.
pub struct WebhookNotifier {
    config: NotificationsConfig,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(config: NotificationsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    async fn post(&self, url: &str, event: &NotificationEvent) -> Result<(), String> {
        let payload = json!({
            "sender": self.config.sender_name,
            "event": event,
        });

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("gateway returned {}", response.status()))
        }
    }

    async fn deliver(&self, url: &str, address: &str, event: &NotificationEvent) -> DispatchResult {
        if url.is_empty() {
            return DispatchResult::Skipped;
        }
        if address.is_empty() {
            return DispatchResult::NoRecipientAddress;
        }
        match self.post(url, event).await {
            Ok(()) => DispatchResult::Sent,
            Err(e) => {
                tracing::warn!(kind = %event.kind(), error = %e, "Notification delivery failed");
                DispatchResult::Failed(e)
            }
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: NotificationEvent) -> DispatchResult {
        let recipient = event.recipient().clone();

        match channel_for(event.kind()) {
            Channel::Email => {
                self.deliver(&self.config.email_webhook_url, &recipient.email, &event)
                    .await
            }
            Channel::Sms => {
                self.deliver(&self.config.sms_webhook_url, &recipient.phone_number, &event)
                    .await
            }
            Channel::Both => {
                let email = self
                    .deliver(&self.config.email_webhook_url, &recipient.email, &event)
                    .await;
                let sms = self
                    .deliver(&self.config.sms_webhook_url, &recipient.phone_number, &event)
                    .await;
                // One successful channel counts as delivered.
                match (&email, &sms) {
                    (DispatchResult::Sent, _) | (_, DispatchResult::Sent) => DispatchResult::Sent,
                    (DispatchResult::Failed(e), _) => DispatchResult::Failed(e.clone()),
                    (_, DispatchResult::Failed(e)) => DispatchResult::Failed(e.clone()),
                    (DispatchResult::NoRecipientAddress, _) => DispatchResult::NoRecipientAddress,
                    _ => DispatchResult::Skipped,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::services::notification::Recipient;
    use uuid::Uuid;

    fn recipient() -> Recipient {
        Recipient {
            member_id: Uuid::new_v4(),
            fullname: "Anna Andersson".into(),
            email: "anna@example.com".into(),
            phone_number: "+46701234567".into(),
        }
    }

    #[test]
    fn test_channel_routing() {
        assert_eq!(
            channel_for(NotificationKind::PhoneVerificationRequested),
            Channel::Sms
        );
        assert_eq!(
            channel_for(NotificationKind::EmailVerificationRequested),
            Channel::Email
        );
        assert_eq!(channel_for(NotificationKind::DelistApproved), Channel::Both);
        assert_eq!(
            channel_for(NotificationKind::NewMemberRegistered),
            Channel::Email
        );
    }

    #[tokio::test]
    async fn test_console_notifier_skips() {
        let notifier = ConsoleNotifier;
        let result = notifier
            .notify(NotificationEvent::NewMemberRegistered {
                recipient: recipient(),
                registered_at: Utc::now(),
            })
            .await;
        assert!(matches!(result, DispatchResult::Skipped));
    }

    #[tokio::test]
    async fn test_webhook_notifier_without_urls_skips() {
        let notifier = WebhookNotifier::new(NotificationsConfig::default());
        let result = notifier
            .notify(NotificationEvent::EmailVerificationRequested {
                recipient: recipient(),
                code: "123456".into(),
            })
            .await;
        assert!(matches!(result, DispatchResult::Skipped));
    }

    #[tokio::test]
    async fn test_webhook_notifier_missing_address() {
        let config = NotificationsConfig {
            enabled: true,
            sms_webhook_url: "http://localhost:1/sms".into(),
            ..Default::default()
        };
        let notifier = WebhookNotifier::new(config);
        let mut bare = recipient();
        bare.phone_number = String::new();
        let result = notifier
            .notify(NotificationEvent::PhoneVerificationRequested {
                recipient: bare,
                code: "123456".into(),
            })
            .await;
        assert!(matches!(result, DispatchResult::NoRecipientAddress));
    }

    #[test]
    fn test_build_notifier_defaults_to_console() {
        let notifier = build_notifier(&NotificationsConfig::default());
        // Console transport when delivery is disabled.
        let _ = notifier;
    }
}
