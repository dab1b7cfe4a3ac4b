//! Type-safe team identifier.
//!
//! [`TeamId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that team
//! identifiers cannot be confused with other UUIDs flowing through the API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a registered team.
///
/// Wraps a UUID v4. Generated once at registration and immutable
/// thereafter. Used as the key in every team store, in ledger events, and
/// as the WebSocket subscription target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct TeamId(uuid::Uuid);

impl TeamId {
    /// Creates a new random `TeamId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `TeamId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for TeamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TeamId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<uuid::Uuid>().map(Self)
    }
}

impl From<uuid::Uuid> for TeamId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<TeamId> for uuid::Uuid {
    fn from(id: TeamId) -> Self {
        id.0
    }
}
