//! Clinic Client - async session shell around `clinic-engine`.
//!
//! The engine decides what to request and how to reconcile answers; this crate
//! performs the requests against the booking service over HTTP and publishes
//! store changes to subscribers.

pub mod config;
pub mod error;
pub mod remote;
pub mod session;

pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use remote::{HttpRemote, RemoteService};
pub use session::Session;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a `tracing` subscriber filtered by `RUST_LOG`
/// (default `clinic_client=debug`).
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
