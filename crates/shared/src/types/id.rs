//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `RoomId` where a `StayId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(TenantId, "Unique identifier for a tenant (hotel property group).");
typed_id!(UserId, "Unique identifier for a staff user.");
typed_id!(RoomId, "Unique identifier for a room.");
typed_id!(RoomCategoryId, "Unique identifier for a room category (room type).");
typed_id!(RoomBlockId, "Unique identifier for a room block.");
typed_id!(StayId, "Unique identifier for a stay (reservation).");
typed_id!(FolioId, "Unique identifier for a folio.");
typed_id!(ChargeId, "Unique identifier for a folio charge.");
typed_id!(PaymentId, "Unique identifier for a folio payment.");
typed_id!(RatePlanId, "Unique identifier for a rate plan.");
typed_id!(DepositPolicyId, "Unique identifier for a deposit policy.");
typed_id!(DepositPaymentId, "Unique identifier for a deposit payment.");
typed_id!(OverbookingSettingId, "Unique identifier for an overbooking setting.");
typed_id!(OverbookingAlertId, "Unique identifier for an overbooking alert.");
typed_id!(ShiftId, "Unique identifier for a front-desk shift.");
typed_id!(SmartAlertId, "Unique identifier for a smart alert.");
typed_id!(NightAuditId, "Unique identifier for a night audit record.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = StayId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
    }

    #[test]
    fn test_typed_id_display_and_parse() {
        let id = FolioId::new();
        let parsed = FolioId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert!(FolioId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_typed_ids_are_time_ordered() {
        let first = StayId::new();
        let second = StayId::new();
        assert!(first.into_inner() <= second.into_inner());
    }

    #[test]
    fn test_serde_transparent() {
        let id = RoomId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
