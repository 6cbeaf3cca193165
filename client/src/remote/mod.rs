//! Access to the remote booking service.
//!
//! [`RemoteService`] is the seam between the session and the transport. The
//! HTTP implementation lives in [`HttpRemote`]; tests substitute scripted
//! implementations.

mod http;
mod protocol;

pub use http::HttpRemote;
pub use protocol::*;

use crate::error::Result;
use clinic_engine::{Booking, Credential, ProfilePatch};
use std::future::Future;

/// The two calls the session makes against the booking service.
pub trait RemoteService: Send + Sync {
    /// GET the full booking collection, in service order.
    fn list_bookings(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Booking>>> + Send;

    /// PUT `patch` to the caller's own profile and return the service's
    /// representation of the updated profile.
    fn update_profile(
        &self,
        credential: &Credential,
        profile_id: &str,
        patch: &ProfilePatch,
    ) -> impl Future<Output = Result<ProfilePatch>> + Send;
}
