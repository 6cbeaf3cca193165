//! Optimistic profile mutation.
//!
//! Per attempt: `Idle -> OptimisticApplied -> {Confirmed | RolledBack}`.
//! [`ProfileEditor::submit`] merges the edit form into the canonical profile
//! before any network round-trip and remembers the exact value it replaced.
//! [`ProfileEditor::complete`] either merges the server's answer or restores
//! that value. Only one attempt may be in flight at a time.

use crate::{
    error::Result, Credential, Error, MutationError, MutationId, Profile, ProfileId, ProfilePatch,
};
use serde::{Deserialize, Serialize};

/// Editable profile field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    Name,
    Email,
    Tel,
}

/// Working copy of the editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditForm {
    pub name: String,
    pub email: String,
    pub tel: String,
}

impl EditForm {
    /// Seed the form from the current profile.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            tel: profile.tel.clone(),
        }
    }

    pub fn get(&self, field: EditField) -> &str {
        match field {
            EditField::Name => &self.name,
            EditField::Email => &self.email,
            EditField::Tel => &self.tel,
        }
    }

    pub fn set(&mut self, field: EditField, value: impl Into<String>) {
        let slot = match field {
            EditField::Name => &mut self.name,
            EditField::Email => &mut self.email,
            EditField::Tel => &mut self.tel,
        };
        *slot = value.into();
    }

    /// The update request body. The whole form is sent.
    pub fn to_patch(&self) -> ProfilePatch {
        ProfilePatch {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            tel: Some(self.tel.clone()),
            role: None,
        }
    }
}

/// Where the editor stands. `Confirmed` and `RolledBack` describe the last
/// finished attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationPhase {
    #[default]
    Idle,
    Editing,
    OptimisticApplied,
    Confirmed,
    RolledBack,
}

/// An update request the shell should issue.
#[derive(Debug, Clone)]
pub struct MutationTicket {
    pub id: MutationId,
    pub profile_id: ProfileId,
    pub patch: ProfilePatch,
    pub credential: Credential,
}

/// How a finished attempt was reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Server answer merged; edit mode closed.
    Confirmed(Profile),
    /// Pre-submit profile restored; edit mode left open.
    RolledBack {
        restored: Profile,
        failure: MutationError,
    },
    /// The ticket is no longer the one in flight (the session ended meanwhile).
    Discarded,
}

#[derive(Debug, Clone)]
struct InFlight {
    id: MutationId,
    previous: Profile,
}

/// The optimistic mutator for the caller's own profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileEditor {
    form: Option<EditForm>,
    in_flight: Option<InFlight>,
    phase: MutationPhase,
    next_id: MutationId,
}

impl ProfileEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    pub fn form(&self) -> Option<&EditForm> {
        self.form.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.form.is_some()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Open (or reopen) edit mode seeded from `profile`. The profile itself is
    /// not touched.
    pub fn begin_edit(&mut self, profile: &Profile) -> Result<&EditForm> {
        if self.in_flight() {
            return Err(Error::InProgress);
        }
        self.phase = MutationPhase::Editing;
        Ok(self.form.insert(EditForm::from_profile(profile)))
    }

    pub fn set_field(&mut self, field: EditField, value: impl Into<String>) -> Result<()> {
        if self.in_flight() {
            return Err(Error::InProgress);
        }
        let form = self.form.as_mut().ok_or(Error::NotEditing)?;
        form.set(field, value);
        Ok(())
    }

    /// Discard the working form. Only valid before submit.
    pub fn cancel_edit(&mut self) -> Result<()> {
        if self.in_flight() {
            return Err(Error::InProgress);
        }
        if self.form.take().is_none() {
            return Err(Error::NotEditing);
        }
        self.phase = MutationPhase::Idle;
        Ok(())
    }

    /// Optimistically apply the form to `profile` and hand out the request.
    pub fn submit(
        &mut self,
        profile: &mut Profile,
        credential: Option<&Credential>,
    ) -> Result<MutationTicket> {
        if self.in_flight() {
            return Err(Error::InProgress);
        }
        let form = self.form.as_ref().ok_or(Error::NotEditing)?;
        let credential = credential.ok_or(Error::AuthMissing)?;

        let patch = form.to_patch();
        let previous = profile.clone();
        profile.merge(&patch);

        self.next_id += 1;
        self.in_flight = Some(InFlight {
            id: self.next_id,
            previous,
        });
        self.phase = MutationPhase::OptimisticApplied;

        Ok(MutationTicket {
            id: self.next_id,
            profile_id: profile.id.clone(),
            patch,
            credential: credential.clone(),
        })
    }

    /// Reconcile the attempt described by `ticket` with the server's answer.
    pub fn complete(
        &mut self,
        ticket: &MutationTicket,
        profile: Option<&mut Profile>,
        result: std::result::Result<ProfilePatch, MutationError>,
    ) -> MutationOutcome {
        if self.in_flight.as_ref().map(|f| f.id) != Some(ticket.id) {
            return MutationOutcome::Discarded;
        }
        let Some(in_flight) = self.in_flight.take() else {
            return MutationOutcome::Discarded;
        };
        let Some(profile) = profile.filter(|p| p.id == ticket.profile_id) else {
            self.phase = MutationPhase::Idle;
            return MutationOutcome::Discarded;
        };

        match result {
            Ok(server) => {
                // The role belongs to the resolved identity, not to self-edits.
                profile.merge(&ProfilePatch {
                    role: None,
                    ..server
                });
                self.form = None;
                self.phase = MutationPhase::Confirmed;
                MutationOutcome::Confirmed(profile.clone())
            }
            Err(failure) => {
                *profile = in_flight.previous;
                self.phase = MutationPhase::RolledBack;
                MutationOutcome::RolledBack {
                    restored: profile.clone(),
                    failure,
                }
            }
        }
    }

    /// Forget everything, in-flight attempt included.
    pub fn reset(&mut self) {
        self.form = None;
        self.in_flight = None;
        self.phase = MutationPhase::Idle;
    }
}
