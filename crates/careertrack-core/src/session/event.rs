use serde::{Deserialize, Serialize};

use super::model::IdentityKey;

/// A session transition reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "identity", rename_all = "snake_case")]
pub enum SessionChange {
    /// A user is signed in.
    SignedIn(IdentityKey),
    /// Nobody is signed in.
    SignedOut,
}

impl From<Option<IdentityKey>> for SessionChange {
    fn from(value: Option<IdentityKey>) -> Self {
        value.map_or(Self::SignedOut, Self::SignedIn)
    }
}
