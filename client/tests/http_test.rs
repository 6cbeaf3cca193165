//! HTTP client tests against an in-process mock of the booking service.

mod common;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use clinic_client::remote::Envelope;
use clinic_client::{ClientConfig, ClientError, HttpRemote, RemoteService, Session};
use clinic_engine::{
    EditField, Error, FetchOutcome, Profile, ProfilePatch, RemoteFailure, Role,
};
use common::{credential, profile, three_bookings};
use dashmap::DashMap;
use serde_json::json;

const TOKEN: &str = "valid-token";

/// Mock service state.
struct MockService {
    bookings: Vec<clinic_engine::Booking>,
    profiles: DashMap<String, Profile>,
}

type Shared = Arc<MockService>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        == Some(TOKEN)
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

/// GET /api/v1/bookings
async fn list_bookings(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return failure(StatusCode::UNAUTHORIZED, "Not authorized to access this route");
    }
    let bookings = state.bookings.clone();
    let count = bookings.len();
    Json(Envelope::ok(bookings).with_count(count)).into_response()
}

/// PUT /api/v1/users/{id}
///
/// A name of "fail" simulates a database outage; an email without '@' is
/// refused inside a 200 envelope. Emails are stored lowercased.
async fn update_profile(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut patch): Json<ProfilePatch>,
) -> Response {
    if !authorized(&headers) {
        return failure(StatusCode::UNAUTHORIZED, "Not authorized to access this route");
    }
    if patch.name.as_deref() == Some("fail") {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    if let Some(email) = patch.email.as_mut() {
        if !email.contains('@') {
            return Json(Envelope::<ProfilePatch>::failure("Please add a valid email"))
                .into_response();
        }
        *email = email.to_lowercase();
    }

    let Some(mut stored) = state.profiles.get_mut(&id) else {
        return failure(StatusCode::NOT_FOUND, "Cannot find user");
    };
    stored.merge(&patch);

    Json(Envelope::ok(ProfilePatch {
        name: Some(stored.name.clone()),
        email: Some(stored.email.clone()),
        tel: Some(stored.tel.clone()),
        role: Some(stored.role),
    }))
    .into_response()
}

/// Start the mock service on an ephemeral port and return its base URL.
async fn spawn_service() -> (String, Shared) {
    let profiles = DashMap::new();
    for p in [
        profile("a-1", "Admin", Role::Admin),
        profile("u-bob", "Bob", Role::User),
    ] {
        profiles.insert(p.id.clone(), p);
    }
    let state = Arc::new(MockService {
        bookings: three_bookings(),
        profiles,
    });

    let app = Router::new()
        .route("/api/v1/bookings", get(list_bookings))
        .route("/api/v1/users/{id}", put(update_profile))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

fn remote(base_url: &str) -> HttpRemote {
    HttpRemote::new(ClientConfig::new(base_url).unwrap()).unwrap()
}

fn stored(state: &Shared, id: &str) -> Profile {
    state.profiles.get(id).unwrap().clone()
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn lists_bookings_in_service_order() {
    let (url, _) = spawn_service().await;

    let bookings = remote(&url).list_bookings(&credential(TOKEN)).await.unwrap();

    let ids: Vec<_> = bookings.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["b-1", "b-2", "b-3"]);
    assert_eq!(bookings[0].dentist_name(), Some("Dr. X"));
    assert!(bookings[1].dentist.is_none());
}

#[tokio::test]
async fn unauthorized_carries_status_and_message() {
    let (url, _) = spawn_service().await;

    let err = remote(&url)
        .list_bookings(&credential("expired"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Status { status: 401, ref message }
            if message == "Not authorized to access this route"
    ));
}

#[tokio::test]
async fn update_returns_service_representation() {
    let (url, state) = spawn_service().await;
    let patch = ProfilePatch {
        email: Some("BOB@Example.com".into()),
        ..ProfilePatch::name("Robert")
    };

    let answer = remote(&url)
        .update_profile(&credential(TOKEN), "u-bob", &patch)
        .await
        .unwrap();

    assert_eq!(answer.name.as_deref(), Some("Robert"));
    assert_eq!(answer.email.as_deref(), Some("bob@example.com"));
    assert_eq!(answer.role, Some(Role::User));
    assert_eq!(stored(&state, "u-bob").name, "Robert");
}

#[tokio::test]
async fn unsuccessful_envelope_is_rejected() {
    let (url, state) = spawn_service().await;
    let patch = ProfilePatch {
        email: Some("not-an-email".into()),
        ..Default::default()
    };

    let err = remote(&url)
        .update_profile(&credential(TOKEN), "u-bob", &patch)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref msg) if msg == "Please add a valid email"));
    assert_eq!(stored(&state, "u-bob").email, "u-bob@clinic.test");
}

#[tokio::test]
async fn unknown_profile_is_not_found() {
    let (url, _) = spawn_service().await;

    let err = remote(&url)
        .update_profile(&credential(TOKEN), "ghost", &ProfilePatch::name("Ghost"))
        .await
        .unwrap_err();

    assert_eq!(err.to_failure(), RemoteFailure::status(404, "Cannot find user"));
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn admin_session_loads_and_searches() {
    let (url, state) = spawn_service().await;
    let session = Session::new(remote(&url));
    let admin = stored(&state, "a-1");

    let outcome = session
        .resolve_identity(async { Some((admin, credential(TOKEN))) })
        .await
        .unwrap();

    assert_eq!(outcome, Some(FetchOutcome::Applied { bookings: 3 }));
    session.set_query("alice");
    let found = session.filtered_bookings();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].user.name, "Alice");
}

#[tokio::test]
async fn user_session_sees_own_booking() {
    let (url, state) = spawn_service().await;
    let session = Session::new(remote(&url));
    let bob = stored(&state, "u-bob");

    session
        .resolve_identity(async { Some((bob, credential(TOKEN))) })
        .await
        .unwrap();

    assert_eq!(session.own_booking().unwrap().id, "b-2");
    assert!(session.admin_bookings().is_empty());
}

#[tokio::test]
async fn profile_edit_confirms_through_service() {
    let (url, state) = spawn_service().await;
    let session = Session::new(remote(&url));
    let bob = stored(&state, "u-bob");
    session
        .resolve_identity(async { Some((bob, credential(TOKEN))) })
        .await
        .unwrap();

    session.begin_edit().unwrap();
    session.set_field(EditField::Email, "Bob@Clinic.Test").unwrap();
    session.submit().await.unwrap();

    assert_eq!(session.profile().unwrap().email, "bob@clinic.test");
    assert_eq!(stored(&state, "u-bob").email, "bob@clinic.test");
}

#[tokio::test]
async fn failed_edit_rolls_back_and_leaves_service_unchanged() {
    let (url, state) = spawn_service().await;
    let session = Session::new(remote(&url));
    let bob = stored(&state, "u-bob");
    session
        .resolve_identity(async { Some((bob.clone(), credential(TOKEN))) })
        .await
        .unwrap();

    session.begin_edit().unwrap();
    session.set_field(EditField::Name, "fail").unwrap();
    let err = session.submit().await.unwrap_err();

    assert_eq!(
        err,
        Error::Mutation(RemoteFailure::status(500, "Database unavailable"))
    );
    assert_eq!(session.profile().unwrap(), bob);
    assert_eq!(stored(&state, "u-bob"), bob);
    assert_eq!(session.edit_form().unwrap().name, "fail");
}

#[tokio::test]
async fn unreachable_service_fails_load_without_status() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let session = Session::new(remote(&url));
    let result = session
        .resolve_identity(async { Some((profile("a-1", "Admin", Role::Admin), credential(TOKEN))) })
        .await;

    match result {
        Err(Error::Fetch(failure)) => assert_eq!(failure.status, None),
        other => panic!("expected a transport failure, got {:?}", other),
    }
    assert!(session.admin_bookings().is_empty());
}
