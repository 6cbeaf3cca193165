//! Collection loader state machine.
//!
//! The loader never performs IO. [`CollectionLoader::begin`] hands out a
//! [`FetchTicket`] describing the request to issue; the shell performs the GET
//! and reports back through [`CollectionLoader::complete`]. Every ticket is
//! tagged with a generation and the identity it was issued for, so a slow
//! response can never overwrite the result of a later fetch.

use crate::{
    error::Result, Booking, CollectionSnapshot, Credential, Error, FetchError, Generation,
    Identity, ProfileId,
};

/// Loader lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoaderState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Last fetch failed. The previous snapshot, if any, is still visible.
    Failed(FetchError),
}

/// A fetch the shell should issue.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub generation: Generation,
    pub identity: Identity,
    pub credential: Credential,
}

/// What a completed fetch did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The snapshot was replaced.
    Applied { bookings: usize },
    /// The fetch failed; the previous snapshot was kept.
    Failed(FetchError),
    /// A later fetch or an identity change made this result obsolete.
    Superseded,
}

/// Owns the collection snapshot and the fetch lifecycle.
#[derive(Debug, Clone, Default)]
pub struct CollectionLoader {
    state: LoaderState,
    snapshot: CollectionSnapshot,
    latest: Generation,
    loading_for: Option<ProfileId>,
}

impl CollectionLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    pub fn snapshot(&self) -> &CollectionSnapshot {
        &self.snapshot
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoaderState::Loading
    }

    /// Generation of the most recently issued ticket.
    pub fn latest_generation(&self) -> Generation {
        self.latest
    }

    /// Start a fetch for `identity`.
    ///
    /// Without an identity or a credential no ticket is issued and the state
    /// is left untouched.
    pub fn begin(
        &mut self,
        identity: Option<&Identity>,
        credential: Option<&Credential>,
    ) -> Result<FetchTicket> {
        let (Some(identity), Some(credential)) = (identity, credential) else {
            return Err(Error::AuthMissing);
        };

        if self.is_loading() && self.loading_for.as_deref() == Some(identity.id.as_str()) {
            return Err(Error::LoadInFlight);
        }

        self.latest += 1;
        self.state = LoaderState::Loading;
        self.loading_for = Some(identity.id.clone());

        Ok(FetchTicket {
            generation: self.latest,
            identity: identity.clone(),
            credential: credential.clone(),
        })
    }

    /// Re-enter loading after a failure.
    pub fn retry(
        &mut self,
        identity: Option<&Identity>,
        credential: Option<&Credential>,
    ) -> Result<FetchTicket> {
        if !matches!(self.state, LoaderState::Failed(_)) {
            return Err(Error::RetryUnavailable);
        }
        self.begin(identity, credential)
    }

    /// Report the result of the fetch described by `ticket`.
    ///
    /// `current` is the identity at completion time; results for any other
    /// identity, or from any ticket but the latest, are discarded.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        current: Option<&Identity>,
        result: std::result::Result<Vec<Booking>, FetchError>,
    ) -> FetchOutcome {
        let same_identity = current.is_some_and(|identity| identity.id == ticket.identity.id);
        if ticket.generation != self.latest || !same_identity {
            return FetchOutcome::Superseded;
        }

        self.loading_for = None;
        match result {
            Ok(bookings) => {
                let count = bookings.len();
                self.snapshot =
                    CollectionSnapshot::new(bookings, ticket.identity.id, ticket.generation);
                self.state = LoaderState::Ready;
                FetchOutcome::Applied { bookings: count }
            }
            Err(failure) => {
                self.state = LoaderState::Failed(failure.clone());
                FetchOutcome::Failed(failure)
            }
        }
    }

    /// Drop the snapshot and invalidate every outstanding ticket.
    pub fn reset(&mut self) {
        self.latest += 1;
        self.state = LoaderState::Idle;
        self.snapshot = CollectionSnapshot::empty();
        self.loading_for = None;
    }
}
