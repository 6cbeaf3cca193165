//! Record types exchanged with the booking service.

use crate::{BookingId, DentistId, Identity, ProfileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Role of the caller. Decides which partition of the collection is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "USER")]
    User,
    #[serde(alias = "ADMIN")]
    Admin,
}

/// The caller's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: ProfileId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub tel: String,
    pub role: Role,
}

impl Profile {
    /// The identity this profile belongs to.
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.role)
    }

    /// Apply every field present in `patch`. The id is never touched.
    pub fn merge(&mut self, patch: &ProfilePatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(tel) = &patch.tel {
            self.tel.clone_from(tel);
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }
}

/// Partial profile: the body of an update request and the shape of the
/// service's answer to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl ProfilePatch {
    /// Patch that only renames.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.tel.is_none() && self.role.is_none()
    }
}

/// Owner of a booking, as nested by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOwner {
    #[serde(rename = "_id")]
    pub id: ProfileId,
    pub name: String,
}

/// Dentist assigned to a booking. The name may be missing when the service
/// did not populate the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DentistRef {
    #[serde(rename = "_id")]
    pub id: DentistId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A booking as returned by the list endpoint. Read-only for this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: BookingId,
    pub user: BookingOwner,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "dentist_ref"
    )]
    pub dentist: Option<DentistRef>,
    pub booking_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Id of the profile that owns this booking.
    pub fn owner_id(&self) -> &str {
        &self.user.id
    }

    pub fn owner_name(&self) -> &str {
        &self.user.name
    }

    /// Name of the assigned dentist, if one is assigned and resolvable.
    pub fn dentist_name(&self) -> Option<&str> {
        self.dentist.as_ref()?.name.as_deref()
    }
}

/// The service sends the dentist either populated or as a bare id.
fn dentist_ref<'de, D>(deserializer: D) -> Result<Option<DentistRef>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Id(DentistId),
        Populated(DentistRef),
    }

    Ok(Option::<Wire>::deserialize(deserializer)?.map(|wire| match wire {
        Wire::Id(id) => DentistRef { id, name: None },
        Wire::Populated(dentist) => dentist,
    }))
}
