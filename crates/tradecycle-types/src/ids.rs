//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Merchants, requesters, and trading sessions each get a distinct newtype so
//! that a session id can never be passed where a merchant id is expected. The
//! host world owns the real identities; the `new()` constructors exist for
//! tests and the sandbox host.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Stable identifier of a tradeable entity (villager, wandering trader).
    ///
    /// Cycle counters are keyed by this id, so it must survive chunk
    /// unloads and server restarts on the host side.
    EntityId
}

define_id! {
    /// Identifier of the player (or other actor) sending requests.
    RequesterId
}

define_id! {
    /// Identifier of one open trading session (an open merchant screen).
    SessionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let entity = EntityId::new();
        let session = SessionId::new();
        assert_ne!(entity.into_inner(), Uuid::nil());
        assert_ne!(session.into_inner(), Uuid::nil());
    }

    #[test]
    fn display_matches_inner_uuid() {
        let raw = Uuid::now_v7();
        let id = RequesterId::from(raw);
        assert_eq!(id.to_string(), raw.to_string());
    }

    #[test]
    fn serde_is_transparent_string() {
        let id = EntityId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.0));
    }
}
