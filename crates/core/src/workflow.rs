//! Project approval and service lifecycle state machines.
//!
//! ```text
//! pending ──start──▶ in_progress
//!    │                   │
//!    └──────submit───────┴──▶ waiting_approval ──approve──▶ approved ──complete──▶ completed
//!                                 ▲        │
//!                          submit │        └──reject──▶ rejected
//!                                 └──────────────────────┘
//! ```
//!
//! The repositories turn [`ProjectAction::allowed_from`] into a conditional
//! `UPDATE ... WHERE status = ANY(...)`, so the check and the write happen in
//! one statement.

use crate::error::CoreError;
use crate::status::{ProjectStatus, ServiceStatus};
use crate::types::DbId;

/// A workflow operation on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    Start,
    Submit,
    Approve,
    Reject,
    Complete,
}

impl ProjectAction {
    pub const ALL: &'static [ProjectAction] = &[
        ProjectAction::Start,
        ProjectAction::Submit,
        ProjectAction::Approve,
        ProjectAction::Reject,
        ProjectAction::Complete,
    ];

    /// Verb used in error messages and logs.
    pub fn verb(self) -> &'static str {
        match self {
            ProjectAction::Start => "start",
            ProjectAction::Submit => "submit for approval",
            ProjectAction::Approve => "approve",
            ProjectAction::Reject => "reject",
            ProjectAction::Complete => "complete",
        }
    }

    /// Statuses this action may be applied from.
    pub fn allowed_from(self) -> &'static [ProjectStatus] {
        match self {
            ProjectAction::Start => &[ProjectStatus::Pending],
            ProjectAction::Submit => &[
                ProjectStatus::Pending,
                ProjectStatus::InProgress,
                ProjectStatus::Rejected,
            ],
            ProjectAction::Approve | ProjectAction::Reject => &[ProjectStatus::WaitingApproval],
            ProjectAction::Complete => &[ProjectStatus::Approved],
        }
    }

    /// Status a successful action leads to.
    pub fn target(self) -> ProjectStatus {
        match self {
            ProjectAction::Start => ProjectStatus::InProgress,
            ProjectAction::Submit => ProjectStatus::WaitingApproval,
            ProjectAction::Approve => ProjectStatus::Approved,
            ProjectAction::Reject => ProjectStatus::Rejected,
            ProjectAction::Complete => ProjectStatus::Completed,
        }
    }
}

/// Next status for `action` taken from `from`, or `None` if not permitted.
pub fn next_status(from: ProjectStatus, action: ProjectAction) -> Option<ProjectStatus> {
    action
        .allowed_from()
        .contains(&from)
        .then(|| action.target())
}

/// Like [`next_status`] but produces the domain error for project `id`.
pub fn transition(
    id: DbId,
    from: ProjectStatus,
    action: ProjectAction,
) -> Result<ProjectStatus, CoreError> {
    next_status(from, action).ok_or_else(|| CoreError::InvalidTransition {
        entity: "Project",
        id,
        from: from.to_string(),
        action: action.verb(),
    })
}

/// Statuses in which plain field edits are accepted.
pub const EDITABLE_STATUSES: &[ProjectStatus] = &[
    ProjectStatus::Pending,
    ProjectStatus::InProgress,
    ProjectStatus::Rejected,
];

pub fn is_editable(status: ProjectStatus) -> bool {
    EDITABLE_STATUSES.contains(&status)
}

/// Statuses a project may be created in.
pub fn is_initial(status: ProjectStatus) -> bool {
    matches!(status, ProjectStatus::Pending | ProjectStatus::InProgress)
}

// ---------------------------------------------------------------------------
// Customer services
// ---------------------------------------------------------------------------

/// A lifecycle operation on a customer service subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Activate,
    Suspend,
    Terminate,
}

impl ServiceAction {
    pub fn verb(self) -> &'static str {
        match self {
            ServiceAction::Activate => "activate",
            ServiceAction::Suspend => "suspend",
            ServiceAction::Terminate => "terminate",
        }
    }

    pub fn allowed_from(self) -> &'static [ServiceStatus] {
        match self {
            ServiceAction::Activate => &[ServiceStatus::Suspended],
            ServiceAction::Suspend => &[ServiceStatus::Active],
            ServiceAction::Terminate => &[ServiceStatus::Active, ServiceStatus::Suspended],
        }
    }

    pub fn target(self) -> ServiceStatus {
        match self {
            ServiceAction::Activate => ServiceStatus::Active,
            ServiceAction::Suspend => ServiceStatus::Suspended,
            ServiceAction::Terminate => ServiceStatus::Terminated,
        }
    }
}

/// Validate a service lifecycle change for service `id`.
pub fn service_transition(
    id: DbId,
    from: ServiceStatus,
    action: ServiceAction,
) -> Result<ServiceStatus, CoreError> {
    if action.allowed_from().contains(&from) {
        Ok(action.target())
    } else {
        Err(CoreError::InvalidTransition {
            entity: "CustomerService",
            id,
            from: from.to_string(),
            action: action.verb(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ProjectAction as A;
    use ProjectStatus as S;

    /// Expected outcome of every (status, action) pair.
    fn expected(from: S, action: A) -> Option<S> {
        match (from, action) {
            (S::Pending, A::Start) => Some(S::InProgress),
            (S::Pending | S::InProgress | S::Rejected, A::Submit) => Some(S::WaitingApproval),
            (S::WaitingApproval, A::Approve) => Some(S::Approved),
            (S::WaitingApproval, A::Reject) => Some(S::Rejected),
            (S::Approved, A::Complete) => Some(S::Completed),
            _ => None,
        }
    }

    #[test]
    fn every_pair_transitions_or_fails() {
        for from in S::ALL {
            for action in A::ALL {
                let result = transition(1, *from, *action);
                match expected(*from, *action) {
                    Some(to) => assert_eq!(result.unwrap(), to, "{from} + {action:?}"),
                    None => assert_matches!(
                        result,
                        Err(CoreError::InvalidTransition { entity: "Project", .. }),
                        "{from} + {action:?} should fail"
                    ),
                }
            }
        }
    }

    #[test]
    fn approving_pending_project_names_current_status() {
        let err = transition(9, S::Pending, A::Approve).unwrap_err();
        assert_eq!(err.to_string(), "Cannot approve Project 9 while it is pending");
    }

    #[test]
    fn completed_is_terminal() {
        for action in A::ALL {
            assert!(next_status(S::Completed, *action).is_none());
        }
    }

    #[test]
    fn approved_is_reachable_only_from_waiting_approval() {
        for from in S::ALL {
            for action in A::ALL {
                if next_status(*from, *action) == Some(S::Approved) {
                    assert_eq!(*from, S::WaitingApproval);
                }
            }
        }
    }

    #[test]
    fn rejected_projects_can_be_resubmitted() {
        assert_eq!(next_status(S::Rejected, A::Submit), Some(S::WaitingApproval));
    }

    #[test]
    fn edits_locked_once_submitted() {
        assert!(is_editable(S::Pending));
        assert!(is_editable(S::Rejected));
        assert!(!is_editable(S::WaitingApproval));
        assert!(!is_editable(S::Approved));
        assert!(!is_editable(S::Completed));
    }

    #[test]
    fn only_pending_and_in_progress_are_initial() {
        let initial: Vec<_> = S::ALL.iter().copied().filter(|s| is_initial(*s)).collect();
        assert_eq!(initial, vec![S::Pending, S::InProgress]);
    }

    #[test]
    fn service_lifecycle() {
        use ServiceAction as SA;
        use ServiceStatus as SS;
        assert_eq!(service_transition(1, SS::Active, SA::Suspend).unwrap(), SS::Suspended);
        assert_eq!(service_transition(1, SS::Suspended, SA::Activate).unwrap(), SS::Active);
        assert_eq!(service_transition(1, SS::Suspended, SA::Terminate).unwrap(), SS::Terminated);
        assert_matches!(
            service_transition(1, SS::Active, SA::Activate),
            Err(CoreError::InvalidTransition { .. })
        );
        for action in [SA::Activate, SA::Suspend, SA::Terminate] {
            assert!(service_transition(1, SS::Terminated, action).is_err());
        }
    }
}
