//! Daily reminder job for next-day activities.

use std::sync::Arc;

use sqlx::PgPool;

use domain::services::notification::{
    ActivitySummary, DispatchResult, NotificationEvent, Notifier, Recipient,
};
use persistence::repositories::ReportRepository;

use super::scheduler::{Job, JobFrequency};

/// Sends reminders to assignees of tomorrow's unconfirmed activities and
/// flags slots nobody has booked.
pub struct ActivityReminderJob {
    pool: PgPool,
    notifier: Arc<dyn Notifier>,
}

impl ActivityReminderJob {
    pub fn new(pool: PgPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }
}

#[async_trait::async_trait]
impl Job for ActivityReminderJob {
    fn name(&self) -> &'static str {
        "activity-reminders"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    async fn execute(&self) -> Result<(), String> {
        let rows = ReportRepository::new(self.pool.clone())
            .next_day_activities()
            .await
            .map_err(|e| format!("loading next-day activities: {e}"))?;

        let mut sent = 0usize;
        let mut unassigned = 0usize;

        for row in rows {
            let activity = ActivitySummary {
                activity_id: row.activity_id,
                name: row.activity_name.clone(),
                date: row.date,
                start_time: row.start_time,
                end_time: row.end_time,
            };

            match (row.member_id, row.member_fullname) {
                (Some(member_id), Some(fullname)) => {
                    let event = NotificationEvent::ActivityReminder {
                        recipient: Recipient {
                            member_id,
                            fullname,
                            email: row.member_email.unwrap_or_default(),
                            phone_number: row.member_phone.unwrap_or_default(),
                        },
                        activity,
                    };

                    match self.notifier.notify(event).await {
                        DispatchResult::Sent => sent += 1,
                        DispatchResult::Failed(e) => {
                            tracing::warn!(
                                activity_id = %row.activity_id,
                                error = %e,
                                "Reminder delivery failed"
                            );
                        }
                        _ => {}
                    }
                }
                _ => {
                    unassigned += 1;
                    tracing::warn!(
                        activity_id = %row.activity_id,
                        activity = %row.activity_name,
                        date = %row.date,
                        "Next-day activity has no assignee"
                    );
                }
            }
        }

        tracing::info!(sent, unassigned, "Activity reminders dispatched");
        Ok(())
    }
}
