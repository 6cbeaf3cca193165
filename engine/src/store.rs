//! Store - the session's single state container.
//!
//! The Store is the only writer of the collection snapshot and of the
//! canonical profile. Partitioned and filtered views are recomputed from those
//! two sources on every read, so an optimistic apply or a rollback is visible
//! to every reader as soon as the call that made it returns.
//!
//! Every state change is recorded as a [`StoreEvent`]; the shell drains them
//! with [`Store::drain_events`] and forwards them to observers. Callers that
//! never drain only keep the newest [`EVENT_BACKLOG`] events.

use std::collections::VecDeque;

use crate::{
    error::Result, filter, Booking, CollectionLoader, Credential, EditField, EditForm, Error,
    FetchError, FetchOutcome, FetchTicket, Generation, Identity, IdentityChange, IdentityResolver,
    IdentityState, LoaderState, MutationError, MutationOutcome, MutationPhase, MutationTicket,
    PartitionedView, Profile, ProfileEditor, ProfilePatch, SearchQuery,
};

/// Undrained events kept before the oldest are dropped.
pub const EVENT_BACKLOG: usize = 1024;

/// Something observers may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    IdentityResolved(Identity),
    IdentityFailed,
    SignedOut,
    LoadStarted { generation: Generation },
    SnapshotReplaced { generation: Generation, bookings: usize },
    LoadFailed(FetchError),
    LoadDiscarded { generation: Generation },
    /// The canonical profile changed (optimistic apply, confirmation or rollback).
    ProfilePublished(Profile),
    MutationConfirmed(Profile),
    MutationRolledBack(MutationError),
    QueryChanged(String),
}

/// The session store.
#[derive(Debug, Clone, Default)]
pub struct Store {
    resolver: IdentityResolver,
    credential: Option<Credential>,
    profile: Option<Profile>,
    loader: CollectionLoader,
    editor: ProfileEditor,
    query: SearchQuery,
    events: VecDeque<StoreEvent>,
    revision: u64,
}

impl Store {
    /// Empty store, as at session start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Take the events recorded since the last drain, oldest first.
    ///
    /// At most [`EVENT_BACKLOG`] events are kept between drains; `revision()`
    /// still counts every change.
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        self.events.drain(..).collect()
    }

    fn publish(&mut self, event: StoreEvent) {
        self.revision += 1;
        if self.events.len() == EVENT_BACKLOG {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    // --- identity ---------------------------------------------------------

    pub fn identity_state(&self) -> &IdentityState {
        self.resolver.state()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.resolver.identity()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn begin_identity_resolution(&mut self) {
        self.resolver.begin();
    }

    /// Record the caller's profile and credential from the session provider.
    ///
    /// On an id change everything derived from the previous identity is
    /// dropped and the change is returned so the caller can trigger a load.
    pub fn resolve_identity(
        &mut self,
        profile: Profile,
        credential: Credential,
    ) -> Option<IdentityChange> {
        let change = self.resolver.resolve(profile.identity());
        if self.resolver.identity().is_none() {
            return None;
        }
        self.credential = Some(credential);

        match &change {
            Some(change) => {
                self.loader.reset();
                self.editor.reset();
                self.query = SearchQuery::default();
                self.profile = Some(profile);
                self.publish(StoreEvent::IdentityResolved(change.current.clone()));
            }
            None if self.profile.is_none() => self.profile = Some(profile),
            None => {}
        }
        change
    }

    pub fn fail_identity_resolution(&mut self) {
        self.resolver.fail();
        self.publish(StoreEvent::IdentityFailed);
    }

    /// End the session: the snapshot, profile, query and edit state go away.
    pub fn sign_out(&mut self) {
        self.resolver.sign_out();
        self.credential = None;
        self.profile = None;
        self.loader.reset();
        self.editor.reset();
        self.query = SearchQuery::default();
        self.publish(StoreEvent::SignedOut);
    }

    // --- collection -------------------------------------------------------

    pub fn loader_state(&self) -> &LoaderState {
        self.loader.state()
    }

    pub fn snapshot(&self) -> &crate::CollectionSnapshot {
        self.loader.snapshot()
    }

    /// Issue a fetch for the current identity.
    pub fn begin_load(&mut self) -> Result<FetchTicket> {
        let ticket = self
            .loader
            .begin(self.resolver.identity(), self.credential.as_ref())?;
        self.publish(StoreEvent::LoadStarted {
            generation: ticket.generation,
        });
        Ok(ticket)
    }

    /// Issue a fetch after a failed one.
    pub fn retry_load(&mut self) -> Result<FetchTicket> {
        let ticket = self
            .loader
            .retry(self.resolver.identity(), self.credential.as_ref())?;
        self.publish(StoreEvent::LoadStarted {
            generation: ticket.generation,
        });
        Ok(ticket)
    }

    pub fn complete_load(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<Vec<Booking>, FetchError>,
    ) -> FetchOutcome {
        let generation = ticket.generation;
        let outcome = self
            .loader
            .complete(ticket, self.resolver.identity(), result);

        let event = match &outcome {
            FetchOutcome::Applied { bookings } => StoreEvent::SnapshotReplaced {
                generation,
                bookings: *bookings,
            },
            FetchOutcome::Failed(failure) => StoreEvent::LoadFailed(failure.clone()),
            FetchOutcome::Superseded => StoreEvent::LoadDiscarded { generation },
        };
        self.publish(event);
        outcome
    }

    /// Role partition of the snapshot, `None` without a resolved identity.
    pub fn partitioned_view(&self) -> Option<PartitionedView<'_>> {
        let identity = self.resolver.identity()?;
        Some(self.loader.snapshot().partition_for(identity))
    }

    pub fn own_booking(&self) -> Option<&Booking> {
        self.partitioned_view()?.own_booking()
    }

    pub fn admin_bookings(&self) -> &[Booking] {
        self.partitioned_view()
            .map(|view| view.admin_list())
            .unwrap_or_default()
    }

    // --- search -----------------------------------------------------------

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn set_query(&mut self, raw: impl Into<String>) {
        self.query = SearchQuery::new(raw);
        self.publish(StoreEvent::QueryChanged(self.query.raw().to_string()));
    }

    /// The admin list filtered by the current query.
    pub fn filtered_bookings(&self) -> Vec<&Booking> {
        filter(self.admin_bookings(), &self.query)
    }

    // --- profile ----------------------------------------------------------

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn edit_form(&self) -> Option<&EditForm> {
        self.editor.form()
    }

    pub fn mutation_phase(&self) -> MutationPhase {
        self.editor.phase()
    }

    pub fn begin_edit(&mut self) -> Result<EditForm> {
        let profile = self.profile.as_ref().ok_or(Error::ProfileNotLoaded)?;
        self.editor.begin_edit(profile).cloned()
    }

    pub fn set_field(&mut self, field: EditField, value: impl Into<String>) -> Result<()> {
        self.editor.set_field(field, value)
    }

    pub fn cancel_edit(&mut self) -> Result<()> {
        self.editor.cancel_edit()
    }

    /// Apply the edit form to the canonical profile and issue the update.
    pub fn submit(&mut self) -> Result<MutationTicket> {
        let profile = self.profile.as_mut().ok_or(Error::ProfileNotLoaded)?;
        let ticket = self.editor.submit(profile, self.credential.as_ref())?;
        let published = profile.clone();
        self.publish(StoreEvent::ProfilePublished(published));
        Ok(ticket)
    }

    pub fn complete_mutation(
        &mut self,
        ticket: &MutationTicket,
        result: std::result::Result<ProfilePatch, MutationError>,
    ) -> MutationOutcome {
        let outcome = self
            .editor
            .complete(ticket, self.profile.as_mut(), result);

        match &outcome {
            MutationOutcome::Confirmed(profile) => {
                self.publish(StoreEvent::ProfilePublished(profile.clone()));
                self.publish(StoreEvent::MutationConfirmed(profile.clone()));
            }
            MutationOutcome::RolledBack { restored, failure } => {
                self.publish(StoreEvent::ProfilePublished(restored.clone()));
                self.publish(StoreEvent::MutationRolledBack(failure.clone()));
            }
            MutationOutcome::Discarded => {}
        }
        outcome
    }
}
