//! # Identity Newtypes
//!
//! UUID-based identifiers for every record kind in the finance stack. Each
//! identifier is a distinct type, so a [`DisbursementId`] can never be passed
//! where a [`RequestId`] is expected. All of them serialize transparently as
//! UUID strings and are valid by construction.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Create a new random ", $what, " identifier.")]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a ", $what, " identifier from an existing UUID.")]
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
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

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a staff fund request.
    RequestId,
    "request"
);

uuid_id!(
    /// Identifier of a disbursement (payout) record.
    DisbursementId,
    "disbursement"
);

uuid_id!(
    /// Identifier of a ledger income/expense transaction.
    TransactionId,
    "transaction"
);

uuid_id!(
    /// Identifier of an audit log entry.
    AuditLogId,
    "audit log"
);
