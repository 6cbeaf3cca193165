//! # Clinic Engine
//!
//! A deterministic client-side sync core for a clinic booking application.
//!
//! This crate holds the state machines behind the booking screens: it tracks
//! the caller's identity, owns the fetched booking collection and partitions
//! it by role, filters the admin list by a live query, and applies profile
//! edits optimistically with an exact rollback on failure.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine hands out tickets describing requests; the shell
//!   performs them and reports the result back
//! - **Single writer**: the [`Store`] is the only owner of the snapshot and of
//!   the canonical profile; every view is recomputed from those sources
//! - **Stale results lose**: each fetch is tagged with a generation and the
//!   identity it was issued for
//!
//! ## Core Concepts
//!
//! ### Identity
//!
//! The [`IdentityResolver`] moves `Unresolved -> Loading -> Resolved`, or to
//! `Unauthenticated` on failure. A change of the resolved id is the signal to
//! reload the collection.
//!
//! ### Collection
//!
//! The [`CollectionLoader`] moves `Idle -> Loading -> {Ready | Failed}` and
//! replaces the [`CollectionSnapshot`] wholesale on success. A failure keeps
//! the previous snapshot. [`partition`] turns a snapshot into a
//! [`PartitionedView`]: the caller's own booking for [`Role::User`], the whole
//! list for [`Role::Admin`].
//!
//! ### Search
//!
//! [`filter`] derives the visible admin list from the full list and a
//! [`SearchQuery`], always from scratch.
//!
//! ### Optimistic mutation
//!
//! The [`ProfileEditor`] applies an [`EditForm`] to the profile immediately,
//! then either merges the server's answer or restores the exact pre-submit
//! value. A second submit while one is in flight fails with
//! [`Error::InProgress`].
//!
//! ## Quick Start
//!
//! ```rust
//! use clinic_engine::{
//!     Booking, BookingOwner, Credential, DentistRef, Profile, Role, Store,
//! };
//! use chrono::{TimeZone, Utc};
//!
//! let admin = Profile {
//!     id: "a-1".into(),
//!     name: "Admin".into(),
//!     email: "admin@clinic.test".into(),
//!     tel: String::new(),
//!     role: Role::Admin,
//! };
//!
//! let mut store = Store::new();
//! store.begin_identity_resolution();
//! store.resolve_identity(admin, Credential::new("token").unwrap());
//!
//! let ticket = store.begin_load().unwrap();
//! let bookings = vec![Booking {
//!     id: "b-1".into(),
//!     user: BookingOwner { id: "u-1".into(), name: "Alice".into() },
//!     dentist: Some(DentistRef { id: "d-1".into(), name: Some("Dr. X".into()) }),
//!     booking_date: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
//!     created_at: None,
//! }];
//! store.complete_load(ticket, Ok(bookings));
//!
//! store.set_query("dr. x");
//! assert_eq!(store.filtered_bookings().len(), 1);
//! ```

pub mod error;
pub mod identity;
pub mod loader;
pub mod mutation;
pub mod record;
pub mod search;
pub mod snapshot;
pub mod store;

// Re-export main types at crate root
pub use error::{Error, FetchError, MutationError, RemoteFailure};
pub use identity::{Credential, Identity, IdentityChange, IdentityResolver, IdentityState};
pub use loader::{CollectionLoader, FetchOutcome, FetchTicket, LoaderState};
pub use mutation::{
    EditField, EditForm, MutationOutcome, MutationPhase, MutationTicket, ProfileEditor,
};
pub use record::{Booking, BookingOwner, DentistRef, Profile, ProfilePatch, Role};
pub use search::{filter, SearchQuery};
pub use snapshot::{partition, CollectionSnapshot, PartitionedView};
pub use store::{Store, StoreEvent, EVENT_BACKLOG};

/// Type aliases for clarity
pub type ProfileId = String;
pub type BookingId = String;
pub type DentistId = String;
pub type Generation = u64;
pub type MutationId = u64;
