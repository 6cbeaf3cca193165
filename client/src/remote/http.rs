//! HTTP implementation of [`RemoteService`] on `reqwest`.

use std::sync::Arc;

use clinic_engine::{Booking, Credential, ProfilePatch};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::{Envelope, ErrorBody, RemoteService};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Booking service client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl HttpRemote {
    /// Create a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Unwrap a response: non-2xx statuses and unsuccessful envelopes both
    /// become errors carrying the service's message.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let reason = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(ErrorBody::reason);
            let message = reason.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<Envelope<T>>().await?.into_data()
    }
}

impl RemoteService for HttpRemote {
    #[instrument(skip_all)]
    async fn list_bookings(&self, credential: &Credential) -> Result<Vec<Booking>> {
        let url = self.config.bookings_url()?;

        let response = self
            .client
            .get(url)
            .bearer_auth(credential.token())
            .send()
            .await?;

        let bookings: Vec<Booking> = Self::decode(response).await?;
        tracing::debug!(count = bookings.len(), "Fetched bookings");
        Ok(bookings)
    }

    #[instrument(skip(self, credential, patch), fields(profile_id = %profile_id))]
    async fn update_profile(
        &self,
        credential: &Credential,
        profile_id: &str,
        patch: &ProfilePatch,
    ) -> Result<ProfilePatch> {
        let url = self.config.profile_url(profile_id)?;

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(credential.token())
            .json(patch)
            .send()
            .await?;

        let updated: ProfilePatch = Self::decode(response).await?;
        tracing::debug!("Profile update accepted");
        Ok(updated)
    }
}
