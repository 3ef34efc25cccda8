//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the event bus and turns each project
//! workflow event into an inbox row for its recipient. Delivery runs after
//! the originating transition has committed; a failed insert is retried a
//! bounded number of times and then dropped with an error log.

use std::time::Duration;

use netcrm_db::models::notification::{CreateNotification, Notification};
use netcrm_db::repositories::NotificationRepo;
use netcrm_db::DbPool;
use netcrm_events::{DomainEvent, ProjectNotice};
use serde_json::json;
use tokio::sync::broadcast;

/// Delay before the first retry; doubled on every further attempt.
const BASE_BACKOFF: Duration = Duration::from_millis(100);

pub struct NotificationRouter {
    pool: DbPool,
    max_attempts: u32,
}

impl NotificationRouter {
    pub fn new(pool: DbPool, max_attempts: u32) -> Self {
        Self {
            pool,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Run the routing loop until the [`EventBus`](netcrm_events::EventBus)
    /// is dropped and the channel closes.
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.handle_event(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Persist the notification an event calls for, if any.
    ///
    /// Returns the stored row, or `None` when the event carries no notice or
    /// every attempt failed.
    pub async fn handle_event(&self, event: &DomainEvent) -> Option<Notification> {
        let notice = ProjectNotice::from_event(event)?;
        let input = CreateNotification {
            user_id: notice.recipient_user_id,
            kind: notice.kind,
            project_id: notice.project_id,
            actor_user_id: notice.actor_user_id,
            message: notice.message(),
            payload: json!({
                "project_name": notice.project_name,
                "reason": notice.reason,
            }),
        };

        let mut backoff = BASE_BACKOFF;
        for attempt in 1..=self.max_attempts {
            match NotificationRepo::create(&self.pool, &input).await {
                Ok(row) => {
                    tracing::debug!(
                        notification_id = row.id,
                        user_id = row.user_id,
                        event_type = %event.event_type,
                        "Notification stored"
                    );
                    return Some(row);
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        event_type = %event.event_type,
                        "Notification insert failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        attempts = self.max_attempts,
                        event_type = %event.event_type,
                        user_id = input.user_id,
                        "Dropping notification after repeated failures"
                    );
                }
            }
        }
        None
    }
}
