//! In-app notification model.

use netcrm_core::status::NotificationKind;
use netcrm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    pub project_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub message: String,
    pub payload: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Input for persisting a notification produced by the event router.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub kind: NotificationKind,
    pub project_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub message: String,
    pub payload: serde_json::Value,
}
