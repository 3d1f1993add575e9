//! Authenticated principal: JWT claims and staff roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TenantId, UserId};

/// Staff role within a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Front-desk agent.
    FrontDesk,
    /// Night auditor.
    NightAuditor,
    /// Property manager.
    Manager,
    /// Tenant administrator.
    Admin,
}

impl Role {
    /// Returns true for roles allowed to void folios, override balances and
    /// change tenant settings.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }

    /// Returns true for roles allowed to trigger the night audit manually.
    #[must_use]
    pub const fn can_run_night_audit(self) -> bool {
        matches!(self, Self::NightAuditor | Self::Manager | Self::Admin)
    }

    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FrontDesk => "front_desk",
            Self::NightAuditor => "night_auditor",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front_desk" => Ok(Self::FrontDesk),
            "night_auditor" => Ok(Self::NightAuditor),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// JWT claims for access tokens.
///
/// A principal is bound to exactly one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: UserId,
    /// Tenant the principal acts for.
    pub tenant: TenantId,
    /// User's role in the tenant.
    pub role: Role,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: UserId, tenant_id: TenantId, role: Role, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            tenant: tenant_id,
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns the tenant ID from claims.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant
    }
}
