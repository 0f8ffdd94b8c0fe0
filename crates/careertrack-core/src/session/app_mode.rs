//! Identity mode state machine.

use serde::{Deserialize, Serialize};

use super::model::IdentityKey;

/// Which record set is active.
///
/// Allowed transitions:
/// - `None -> Guest`: only through a successful add
/// - any -> `Authenticated`: session observer reports a sign-in
/// - any -> `Guest` / `None`: session observer reports a sign-out, depending
///   on whether guest data is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "identity", rename_all = "snake_case")]
pub enum IdentityMode {
    /// No session and no guest data.
    #[default]
    None,
    /// Anonymous, records live in local storage only.
    Guest,
    /// Records live in the remote collection scoped to this identity.
    Authenticated(IdentityKey),
}

impl IdentityMode {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&IdentityKey> {
        match self {
            Self::Authenticated(key) => Some(key),
            _ => None,
        }
    }

    /// The mode after a successful local add.
    pub fn after_local_add(&self) -> Self {
        match self {
            Self::None => Self::Guest,
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_none_is_promoted_by_local_add() {
        assert_eq!(IdentityMode::None.after_local_add(), IdentityMode::Guest);
        assert_eq!(IdentityMode::Guest.after_local_add(), IdentityMode::Guest);
        let authed = IdentityMode::Authenticated(IdentityKey::from("u1"));
        assert_eq!(authed.after_local_add(), authed);
    }
}
