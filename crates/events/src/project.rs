//! Project workflow events.
//!
//! The workflow publishes one of these after a status change commits. The
//! notification router decodes them with [`ProjectNotice::from_event`] and
//! stores an inbox entry for the recipient.

use netcrm_core::status::NotificationKind;
use netcrm_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::bus::DomainEvent;

pub const APPROVAL_REQUESTED: &str = "project.approval_requested";
pub const APPROVED: &str = "project.approved";
pub const REJECTED: &str = "project.rejected";

/// Entity type recorded on every project event.
pub const ENTITY_PROJECT: &str = "project";

/// Payload carried by project workflow events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEventPayload {
    pub recipient_user_id: DbId,
    pub project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn project_event(
    event_type: &str,
    project_id: DbId,
    actor_id: DbId,
    payload: ProjectEventPayload,
) -> DomainEvent {
    DomainEvent::new(event_type)
        .with_entity(ENTITY_PROJECT, project_id)
        .with_actor(actor_id)
        .with_payload(serde_json::to_value(payload).unwrap_or_default())
}

/// A project was submitted; tell the assigned manager.
pub fn approval_requested(
    project_id: DbId,
    project_name: &str,
    actor_id: DbId,
    manager_id: DbId,
) -> DomainEvent {
    project_event(
        APPROVAL_REQUESTED,
        project_id,
        actor_id,
        ProjectEventPayload {
            recipient_user_id: manager_id,
            project_name: project_name.to_string(),
            reason: None,
        },
    )
}

/// A project was approved; tell its creator.
pub fn approved(project_id: DbId, project_name: &str, actor_id: DbId, creator_id: DbId) -> DomainEvent {
    project_event(
        APPROVED,
        project_id,
        actor_id,
        ProjectEventPayload {
            recipient_user_id: creator_id,
            project_name: project_name.to_string(),
            reason: None,
        },
    )
}

/// A project was rejected; tell its creator, with the reason if one was given.
pub fn rejected(
    project_id: DbId,
    project_name: &str,
    actor_id: DbId,
    creator_id: DbId,
    reason: Option<&str>,
) -> DomainEvent {
    project_event(
        REJECTED,
        project_id,
        actor_id,
        ProjectEventPayload {
            recipient_user_id: creator_id,
            project_name: project_name.to_string(),
            reason: reason.map(str::to_string),
        },
    )
}

/// An inbox entry derived from a project workflow event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectNotice {
    pub recipient_user_id: DbId,
    pub kind: NotificationKind,
    pub project_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub project_name: String,
    pub reason: Option<String>,
}

impl ProjectNotice {
    /// Decode a project workflow event. Returns `None` for any other event
    /// or a payload that does not parse.
    pub fn from_event(event: &DomainEvent) -> Option<Self> {
        let kind = match event.event_type.as_str() {
            APPROVAL_REQUESTED => NotificationKind::ApprovalRequested,
            APPROVED => NotificationKind::Approved,
            REJECTED => NotificationKind::Rejected,
            _ => return None,
        };
        let payload: ProjectEventPayload = serde_json::from_value(event.payload.clone()).ok()?;
        Some(Self {
            recipient_user_id: payload.recipient_user_id,
            kind,
            project_id: event.entity_id,
            actor_user_id: event.actor_user_id,
            project_name: payload.project_name,
            reason: payload.reason,
        })
    }

    /// Human-readable inbox message.
    pub fn message(&self) -> String {
        let name = &self.project_name;
        match self.kind {
            NotificationKind::ApprovalRequested => {
                format!("Project \"{name}\" is waiting for your approval")
            }
            NotificationKind::Approved => format!("Project \"{name}\" has been approved"),
            NotificationKind::Rejected => match self.reason.as_deref().filter(|r| !r.is_empty()) {
                Some(reason) => format!("Project \"{name}\" was rejected: {reason}"),
                None => format!("Project \"{name}\" was rejected"),
            },
        }
    }
}
