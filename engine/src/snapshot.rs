//! The collection snapshot and its role partition.
//!
//! A snapshot is the full ordered sequence of bookings as last fetched. It is
//! only ever replaced wholesale. The partitioned view is derived from it on
//! every read and never stored on its own.

use crate::{Booking, Generation, Identity, ProfileId, Role};

/// The most recently fetched booking collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSnapshot {
    bookings: Vec<Booking>,
    fetched_for: Option<ProfileId>,
    generation: Generation,
}

impl CollectionSnapshot {
    /// Empty snapshot, as at session start.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot of a successful fetch.
    pub fn new(bookings: Vec<Booking>, fetched_for: ProfileId, generation: Generation) -> Self {
        Self {
            bookings,
            fetched_for: Some(fetched_for),
            generation,
        }
    }

    /// All bookings, in service order.
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Identity id the snapshot was fetched for. `None` when never fetched.
    pub fn fetched_for(&self) -> Option<&str> {
        self.fetched_for.as_deref()
    }

    /// Generation of the fetch that produced this snapshot.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Partition for `identity`.
    ///
    /// Returns an empty view of the right shape when the snapshot belongs to a
    /// different identity, so data never leaks across identities.
    pub fn partition_for(&self, identity: &Identity) -> PartitionedView<'_> {
        if self.fetched_for() != Some(identity.id.as_str()) {
            return partition(identity.role, &identity.id, &[]);
        }
        partition(identity.role, &identity.id, &self.bookings)
    }
}

/// Role-derived view of a snapshot. Exactly one shape exists per role, so the
/// own-booking and the admin list can never both be populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionedView<'a> {
    /// The caller's own booking, or `None` when they have not booked yet.
    Own(Option<&'a Booking>),
    /// Every booking, in service order.
    All(&'a [Booking]),
}

impl<'a> PartitionedView<'a> {
    pub fn own_booking(&self) -> Option<&'a Booking> {
        match *self {
            PartitionedView::Own(booking) => booking,
            PartitionedView::All(_) => None,
        }
    }

    /// The admin list. Empty for the user partition.
    pub fn admin_list(&self) -> &'a [Booking] {
        match *self {
            PartitionedView::Own(_) => &[],
            PartitionedView::All(bookings) => bookings,
        }
    }
}

/// Partition `bookings` by role.
///
/// Users see the first booking they own; admins see everything.
pub fn partition<'a>(
    role: Role,
    identity_id: &str,
    bookings: &'a [Booking],
) -> PartitionedView<'a> {
    match role {
        Role::User => PartitionedView::Own(bookings.iter().find(|b| b.owner_id() == identity_id)),
        Role::Admin => PartitionedView::All(bookings),
    }
}
