//! The workflow transition table.
//!
//! Every legal status change is one row here; operations ask the table
//! instead of re-deriving guards inline, so the state machine stays
//! auditable in one place.

use crate::identity::Caller;
use crate::models::enums::WorkflowStatus;
use crate::models::quiz::Quiz;

use super::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Submit,
    Approve,
    Reject,
    Publish,
    Republish,
    Unsubmit,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Publish => "publish",
            Self::Republish => "republish",
            Self::Unsubmit => "unsubmit",
        }
    }
}

/// Who may perform a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The quiz owner only.
    Owner,
    /// Curator or admin.
    Privileged,
}

/// Target status and required capability for `action` from `status`, or
/// `None` if the state machine has no such edge.
pub fn transition(
    status: &WorkflowStatus,
    action: &WorkflowAction,
) -> Option<(WorkflowStatus, Requirement)> {
    use Requirement::{Owner, Privileged};
    use WorkflowAction as A;
    use WorkflowStatus as S;

    match (status, action) {
        (S::Draft | S::Rejected, A::Submit) => Some((S::Submitted, Owner)),
        (S::Submitted, A::Approve) => Some((S::Approved, Privileged)),
        (S::Submitted, A::Reject) => Some((S::Rejected, Privileged)),
        (S::Submitted, A::Unsubmit) => Some((S::Draft, Owner)),
        (S::Approved, A::Publish) => Some((S::Published, Privileged)),
        (S::Published, A::Republish) => Some((S::Published, Privileged)),
        _ => None,
    }
}

/// Resolve the target status for `caller` performing `action` on `quiz`.
///
/// A missing edge is `InvalidState`; an edge the caller lacks the
/// capability for is `Forbidden`. Order matters: the caller learns what
/// the state allows before what their role allows.
pub fn authorize(
    quiz: &Quiz,
    caller: &Caller,
    action: &WorkflowAction,
) -> Result<WorkflowStatus, WorkflowError> {
    let (target, requirement) =
        transition(&quiz.workflow_status, action).ok_or_else(|| {
            WorkflowError::InvalidState(format!(
                "cannot {} a {} quiz",
                action.as_str(),
                quiz.workflow_status.as_str()
            ))
        })?;

    let permitted = match requirement {
        Requirement::Owner => caller.owns(quiz),
        Requirement::Privileged => caller.is_privileged(),
    };
    if !permitted {
        return Err(WorkflowError::Forbidden(format!(
            "{} requires {}",
            action.as_str(),
            match requirement {
                Requirement::Owner => "quiz ownership",
                Requirement::Privileged => "curator or admin role",
            }
        )));
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn quiz_in(status: WorkflowStatus, owner_id: Uuid) -> Quiz {
        let now = chrono::Local::now().naive_local();
        Quiz {
            id: Uuid::new_v4(),
            title: "Transition quiz".into(),
            description: None,
            owner_id,
            workflow_status: status,
            submitted_at: None,
            submitted_by: None,
            reviewed_at: None,
            reviewed_by: None,
            review_message: None,
            published_at: None,
            published_by: None,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn submit_allowed_from_draft_and_rejected_only() {
        for status in [
            WorkflowStatus::Draft,
            WorkflowStatus::Submitted,
            WorkflowStatus::Approved,
            WorkflowStatus::Rejected,
            WorkflowStatus::Published,
        ] {
            let expected = matches!(status, WorkflowStatus::Draft | WorkflowStatus::Rejected);
            assert_eq!(
                transition(&status, &WorkflowAction::Submit).is_some(),
                expected,
                "submit from {}",
                status.as_str()
            );
        }
    }

    #[test]
    fn review_and_publish_edges() {
        assert_eq!(
            transition(&WorkflowStatus::Submitted, &WorkflowAction::Approve),
            Some((WorkflowStatus::Approved, Requirement::Privileged))
        );
        assert_eq!(
            transition(&WorkflowStatus::Submitted, &WorkflowAction::Reject),
            Some((WorkflowStatus::Rejected, Requirement::Privileged))
        );
        assert_eq!(
            transition(&WorkflowStatus::Approved, &WorkflowAction::Publish),
            Some((WorkflowStatus::Published, Requirement::Privileged))
        );
        assert!(transition(&WorkflowStatus::Draft, &WorkflowAction::Publish).is_none());
        assert!(transition(&WorkflowStatus::Published, &WorkflowAction::Approve).is_none());
    }

    #[test]
    fn authorize_checks_state_before_capability() {
        let owner = Caller::staff(Uuid::new_v4());
        let stranger = Caller::staff(Uuid::new_v4());
        let curator = Caller::curator(Uuid::new_v4());

        let draft = quiz_in(WorkflowStatus::Draft, owner.id);
        assert!(matches!(
            authorize(&draft, &owner, &WorkflowAction::Submit),
            Ok(WorkflowStatus::Submitted)
        ));
        assert!(matches!(
            authorize(&draft, &stranger, &WorkflowAction::Submit),
            Err(WorkflowError::Forbidden(_))
        ));
        // Curator privilege does not substitute for ownership on submit.
        assert!(matches!(
            authorize(&draft, &curator, &WorkflowAction::Submit),
            Err(WorkflowError::Forbidden(_))
        ));
        // No edge at all beats a capability complaint.
        let published = quiz_in(WorkflowStatus::Published, owner.id);
        assert!(matches!(
            authorize(&published, &stranger, &WorkflowAction::Submit),
            Err(WorkflowError::InvalidState(_))
        ));
    }

    #[test]
    fn owner_submitting_own_rejected_quiz_is_allowed() {
        let owner = Caller::staff(Uuid::new_v4());
        let rejected = quiz_in(WorkflowStatus::Rejected, owner.id);
        assert!(matches!(
            authorize(&rejected, &owner, &WorkflowAction::Submit),
            Ok(WorkflowStatus::Submitted)
        ));
    }
}
