//! Caller identity and capability checks.
//!
//! Credential resolution lives in an external identity collaborator; this
//! engine only consumes its resolved shape (id + roles) and derives the
//! ownership/privilege checks the workflow guards depend on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::quiz::Quiz;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Staff,
    Curator,
    Admin,
}

/// Resolved caller, as returned by the identity collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub id: Uuid,
    pub roles: Vec<Role>,
}

impl Caller {
    pub fn new(id: Uuid, roles: Vec<Role>) -> Self {
        Self { id, roles }
    }

    pub fn staff(id: Uuid) -> Self {
        Self::new(id, vec![Role::Staff])
    }

    pub fn curator(id: Uuid) -> Self {
        Self::new(id, vec![Role::Staff, Role::Curator])
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, vec![Role::Staff, Role::Admin])
    }

    /// Curator or admin: may review, publish, and edit beyond Draft.
    pub fn is_privileged(&self) -> bool {
        self.roles
            .iter()
            .any(|r| matches!(r, Role::Curator | Role::Admin))
    }

    pub fn owns(&self, quiz: &Quiz) -> bool {
        self.id == quiz.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_derives_from_roles() {
        let staff = Caller::staff(Uuid::new_v4());
        let curator = Caller::curator(Uuid::new_v4());
        let admin = Caller::admin(Uuid::new_v4());
        assert!(!staff.is_privileged());
        assert!(curator.is_privileged());
        assert!(admin.is_privileged());
    }
}
