//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use clinic_client::error::{ClientError, Result};
use clinic_client::RemoteService;
use clinic_engine::{Booking, BookingOwner, Credential, DentistRef, Profile, ProfilePatch, Role};
use tokio::sync::oneshot;

pub fn profile(id: &str, name: &str, role: Role) -> Profile {
    Profile {
        id: id.into(),
        name: name.into(),
        email: format!("{}@clinic.test", id),
        tel: "0812345678".into(),
        role,
    }
}

pub fn credential(token: &str) -> Credential {
    Credential::new(token).unwrap()
}

pub fn booking(id: &str, owner_id: &str, owner: &str, dentist: Option<&str>) -> Booking {
    Booking {
        id: id.into(),
        user: BookingOwner {
            id: owner_id.into(),
            name: owner.into(),
        },
        dentist: dentist.map(|name| DentistRef {
            id: format!("dentist-{}", id),
            name: Some(name.into()),
        }),
        booking_date: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        created_at: None,
    }
}

/// Alice and Carol see "Dr. X"; Bob has no dentist yet.
pub fn three_bookings() -> Vec<Booking> {
    vec![
        booking("b-1", "u-alice", "Alice", Some("Dr. X")),
        booking("b-2", "u-bob", "Bob", None),
        booking("b-3", "u-carol", "Carol", Some("Dr. X")),
    ]
}

/// A scripted reply.
enum Reply<T> {
    Now(Result<T>),
    Gated {
        started: oneshot::Sender<()>,
        release: oneshot::Receiver<Result<T>>,
    },
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T> {
        match self {
            Reply::Now(result) => result,
            Reply::Gated { started, release } => {
                started.send(()).ok();
                release
                    .await
                    .unwrap_or_else(|_| Err(ClientError::Rejected("gate dropped".into())))
            }
        }
    }
}

/// Test-side handle of a gated reply.
pub struct Gate<T> {
    started: Option<oneshot::Receiver<()>>,
    release: oneshot::Sender<Result<T>>,
}

impl<T> Gate<T> {
    /// Wait until the request behind this gate has been issued.
    pub async fn started(&mut self) {
        if let Some(started) = self.started.take() {
            started.await.expect("request never issued");
        }
    }

    pub fn release(self, result: Result<T>) {
        assert!(self.release.send(result).is_ok(), "request was dropped");
    }
}

fn gate<T>() -> (Reply<T>, Gate<T>) {
    let (started_tx, started_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    (
        Reply::Gated {
            started: started_tx,
            release: release_rx,
        },
        Gate {
            started: Some(started_rx),
            release: release_tx,
        },
    )
}

/// In-process booking service with scripted replies.
///
/// Without a scripted reply, lists answer with the default bookings and
/// updates echo the submitted patch.
pub struct ScriptedRemote {
    bookings: Vec<Booking>,
    lists: Mutex<HashMap<String, VecDeque<Reply<Vec<Booking>>>>>,
    updates: Mutex<VecDeque<Reply<ProfilePatch>>>,
    list_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl ScriptedRemote {
    pub fn new(bookings: Vec<Booking>) -> Self {
        Self {
            bookings,
            lists: Mutex::new(HashMap::new()),
            updates: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    fn push_list(&self, token: &str, reply: Reply<Vec<Booking>>) {
        self.lists
            .lock()
            .unwrap()
            .entry(token.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn reply_list(&self, token: &str, result: Result<Vec<Booking>>) {
        self.push_list(token, Reply::Now(result));
    }

    pub fn gate_list(&self, token: &str) -> Gate<Vec<Booking>> {
        let (reply, gate) = gate();
        self.push_list(token, reply);
        gate
    }

    pub fn reply_update(&self, result: Result<ProfilePatch>) {
        self.updates.lock().unwrap().push_back(Reply::Now(result));
    }

    pub fn gate_update(&self) -> Gate<ProfilePatch> {
        let (reply, gate) = gate();
        self.updates.lock().unwrap().push_back(reply);
        gate
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

impl RemoteService for ScriptedRemote {
    async fn list_bookings(&self, credential: &Credential) -> Result<Vec<Booking>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .lists
            .lock()
            .unwrap()
            .get_mut(credential.token())
            .and_then(VecDeque::pop_front);

        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(self.bookings.clone()),
        }
    }

    async fn update_profile(
        &self,
        _credential: &Credential,
        _profile_id: &str,
        patch: &ProfilePatch,
    ) -> Result<ProfilePatch> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.updates.lock().unwrap().pop_front();

        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(patch.clone()),
        }
    }
}

pub fn server_error(status: u16, message: &str) -> ClientError {
    ClientError::Status {
        status,
        message: message.into(),
    }
}
