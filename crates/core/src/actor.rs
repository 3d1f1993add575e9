//! The staff member on whose behalf a core operation runs.

use innkeep_shared::{Claims, Role, types::UserId};

/// Authenticated staff member performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Staff user ID.
    pub user_id: UserId,
    /// Role within the tenant.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Returns true when the actor may perform manager-only actions.
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.user_id(), claims.role)
    }
}
