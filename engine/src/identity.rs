//! Caller identity and the resolver that tracks it.
//!
//! The identity is supplied by an external session provider. The resolver only
//! records where resolution stands and reports when the resolved id changes,
//! which is the signal to (re)load the booking collection.

use crate::{ProfileId, Role};
use serde::{Deserialize, Serialize};

/// The externally resolved `{id, role}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: ProfileId,
    pub role: Role,
}

impl Identity {
    pub fn new(id: impl Into<ProfileId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

/// Opaque bearer token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token. An empty (or all-whitespace) token is treated as absent.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// The raw token, for building the `Authorization` header.
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Where identity resolution stands for this session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdentityState {
    #[default]
    Unresolved,
    Loading,
    Resolved(Identity),
    /// Resolution failed or the caller signed out. Terminal for the session.
    Unauthenticated,
}

/// Emitted when the resolved identity's id differs from the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityChange {
    pub previous: Option<ProfileId>,
    pub current: Identity,
}

/// Tracks the caller's identity.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    state: IdentityState,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &IdentityState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, IdentityState::Loading)
    }

    /// The resolved identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            IdentityState::Resolved(identity) => Some(identity),
            _ => None,
        }
    }

    /// Mark resolution as started. Ignored once resolved or terminal.
    pub fn begin(&mut self) {
        if self.state == IdentityState::Unresolved {
            self.state = IdentityState::Loading;
        }
    }

    /// Record a resolved identity.
    ///
    /// Returns a change only when the id differs from the previously resolved
    /// one. Ignored after the session became unauthenticated.
    pub fn resolve(&mut self, identity: Identity) -> Option<IdentityChange> {
        let previous = match &self.state {
            IdentityState::Unauthenticated => return None,
            IdentityState::Resolved(current) => Some(current.id.clone()),
            IdentityState::Unresolved | IdentityState::Loading => None,
        };

        let changed = previous.as_deref() != Some(identity.id.as_str());
        self.state = IdentityState::Resolved(identity.clone());

        changed.then_some(IdentityChange {
            previous,
            current: identity,
        })
    }

    /// Resolution failed: the caller is unauthenticated for the session.
    pub fn fail(&mut self) {
        self.state = IdentityState::Unauthenticated;
    }

    /// End of session.
    pub fn sign_out(&mut self) {
        self.state = IdentityState::Unauthenticated;
    }
}
