//! Session - the context object for one signed-in session.
//!
//! A [`Session`] owns the engine [`Store`] and a [`RemoteService`]. It is
//! created at session start and passed to whatever needs booking or profile
//! state; there is no global. Async operations suspend only while the remote
//! call is pending. The store lock is taken before and after that call, never
//! across it, so every reader observes an optimistic apply or a rollback as
//! soon as it happens.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use clinic_engine::{
    error::Result, Booking, Credential, EditField, EditForm, Error, FetchOutcome, FetchTicket,
    LoaderState, MutationOutcome, MutationTicket, Profile, RemoteFailure, Store, StoreEvent,
};
use tokio::sync::broadcast;
use tracing::instrument;

use crate::remote::RemoteService;

/// Capacity of the event channel. Slow subscribers miss older events.
const EVENT_CAPACITY: usize = 256;

/// One caller session against the booking service.
pub struct Session<R> {
    remote: R,
    store: Mutex<Store>,
    events: broadcast::Sender<StoreEvent>,
}

impl<R: RemoteService> Session<R> {
    /// Start a session with an empty store.
    pub fn new(remote: R) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            remote,
            store: Mutex::new(Store::new()),
            events,
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Receive every store event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read from the store.
    pub fn read<T>(&self, f: impl FnOnce(&Store) -> T) -> T {
        f(&self.lock())
    }

    /// Write to the store and publish what changed.
    fn write<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        let (out, events) = {
            let mut store = self.lock();
            let out = f(&mut store);
            (out, store.drain_events())
        };
        for event in events {
            // No subscribers is fine.
            self.events.send(event).ok();
        }
        out
    }

    // --- identity ---------------------------------------------------------

    /// Drive identity resolution with the session provider's answer.
    ///
    /// `None` means the provider could not resolve the caller, who is then
    /// treated as unauthenticated. When the resolved id changed, the booking
    /// collection is loaded and the load outcome returned.
    pub async fn resolve_identity<F>(&self, resolution: F) -> Result<Option<FetchOutcome>>
    where
        F: Future<Output = Option<(Profile, Credential)>>,
    {
        self.write(Store::begin_identity_resolution);

        let Some((profile, credential)) = resolution.await else {
            tracing::warn!("Identity resolution failed; caller is unauthenticated");
            self.write(Store::fail_identity_resolution);
            return Ok(None);
        };

        match self.write(|store| store.resolve_identity(profile, credential)) {
            Some(change) => {
                tracing::info!(
                    identity = %change.current.id,
                    role = ?change.current.role,
                    "Identity changed, loading bookings"
                );
                self.load().await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// End the session. Anything still in flight is discarded on arrival.
    pub fn sign_out(&self) {
        tracing::info!("Signing out");
        self.write(Store::sign_out);
    }

    // --- collection -------------------------------------------------------

    /// Fetch the booking collection for the current identity.
    ///
    /// A result made obsolete by a later fetch or an identity change comes
    /// back as `FetchOutcome::Superseded` and leaves the store untouched.
    pub async fn load(&self) -> Result<FetchOutcome> {
        let ticket = self.write(Store::begin_load)?;
        self.fetch(ticket).await
    }

    /// Fetch again after a failed load.
    pub async fn retry(&self) -> Result<FetchOutcome> {
        let ticket = self.write(Store::retry_load)?;
        self.fetch(ticket).await
    }

    #[instrument(skip_all, fields(generation = ticket.generation, identity = %ticket.identity.id))]
    async fn fetch(&self, ticket: FetchTicket) -> Result<FetchOutcome> {
        let pending = Pending::new(self, ticket, cancel_load);
        let result = self
            .remote
            .list_bookings(&pending.ticket().credential)
            .await
            .map_err(|e| e.to_failure());

        match pending.settle(|store, ticket| store.complete_load(ticket.clone(), result)) {
            FetchOutcome::Failed(failure) => {
                tracing::warn!(error = %failure, "Booking fetch failed, keeping previous snapshot");
                Err(Error::Fetch(failure))
            }
            FetchOutcome::Superseded => {
                tracing::debug!("Discarding superseded booking fetch");
                Ok(FetchOutcome::Superseded)
            }
            applied => {
                tracing::debug!(outcome = ?applied, "Booking snapshot replaced");
                Ok(applied)
            }
        }
    }

    pub fn loader_state(&self) -> LoaderState {
        self.read(|store| store.loader_state().clone())
    }

    /// The caller's own booking (users only).
    pub fn own_booking(&self) -> Option<Booking> {
        self.read(|store| store.own_booking().cloned())
    }

    /// The whole collection (admins only).
    pub fn admin_bookings(&self) -> Vec<Booking> {
        self.read(|store| store.admin_bookings().to_vec())
    }

    // --- search -----------------------------------------------------------

    pub fn set_query(&self, raw: impl Into<String>) {
        self.write(|store| store.set_query(raw));
    }

    /// The admin list filtered by the current query.
    pub fn filtered_bookings(&self) -> Vec<Booking> {
        self.read(|store| store.filtered_bookings().into_iter().cloned().collect())
    }

    // --- profile ----------------------------------------------------------

    pub fn profile(&self) -> Option<Profile> {
        self.read(|store| store.profile().cloned())
    }

    pub fn edit_form(&self) -> Option<EditForm> {
        self.read(|store| store.edit_form().cloned())
    }

    pub fn begin_edit(&self) -> Result<EditForm> {
        self.write(Store::begin_edit)
    }

    pub fn set_field(&self, field: EditField, value: impl Into<String>) -> Result<()> {
        self.write(|store| store.set_field(field, value))
    }

    pub fn cancel_edit(&self) -> Result<()> {
        self.write(Store::cancel_edit)
    }

    /// Submit the edit form.
    ///
    /// The profile is updated before the request is sent. On failure it is
    /// restored and `Error::Mutation` returned, with the edit form left open.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<MutationOutcome> {
        let pending = Pending::new(self, self.write(Store::submit)?, cancel_mutation);
        let ticket = pending.ticket();
        let result = self
            .remote
            .update_profile(&ticket.credential, &ticket.profile_id, &ticket.patch)
            .await
            .map_err(|e| e.to_failure());
        let profile_id = ticket.profile_id.clone();

        match pending.settle(|store, ticket| store.complete_mutation(ticket, result)) {
            MutationOutcome::RolledBack { failure, .. } => {
                tracing::warn!(error = %failure, "Profile update failed, rolled back");
                Err(Error::Mutation(failure))
            }
            outcome @ MutationOutcome::Confirmed(_) => {
                tracing::info!(profile_id = %profile_id, "Profile updated");
                Ok(outcome)
            }
            MutationOutcome::Discarded => {
                tracing::debug!("Profile update finished after the session ended");
                Ok(MutationOutcome::Discarded)
            }
        }
    }
}

/// A ticket whose remote call has not come back yet.
///
/// If the future driving the call is dropped first, the guard reports the
/// call as failed so the store leaves `Loading` or rolls the optimistic
/// profile back.
struct Pending<'a, R: RemoteService, T> {
    session: &'a Session<R>,
    ticket: T,
    cancel: fn(&mut Store, &T),
    settled: bool,
}

impl<'a, R: RemoteService, T> Pending<'a, R, T> {
    fn new(session: &'a Session<R>, ticket: T, cancel: fn(&mut Store, &T)) -> Self {
        Self {
            session,
            ticket,
            cancel,
            settled: false,
        }
    }

    fn ticket(&self) -> &T {
        &self.ticket
    }

    /// Report the remote answer to the store.
    fn settle<O>(mut self, complete: impl FnOnce(&mut Store, &T) -> O) -> O {
        self.settled = true;
        let ticket = &self.ticket;
        self.session.write(|store| complete(store, ticket))
    }
}

impl<R: RemoteService, T> Drop for Pending<'_, R, T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::warn!("Remote call cancelled before it completed");
        let (cancel, ticket) = (self.cancel, &self.ticket);
        self.session.write(|store| cancel(store, ticket));
    }
}

fn cancelled() -> RemoteFailure {
    RemoteFailure::transport("request cancelled")
}

fn cancel_load(store: &mut Store, ticket: &FetchTicket) {
    store.complete_load(ticket.clone(), Err(cancelled()));
}

fn cancel_mutation(store: &mut Store, ticket: &MutationTicket) {
    store.complete_mutation(ticket, Err(cancelled()));
}
