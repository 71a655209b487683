//! End-to-end lifecycle tests: login, rotation, replay detection and
//! revocation, driven through the public engine API with a manual clock.

use std::sync::{Arc, Barrier};

use chrono::{Duration, Utc};

use learngate_auth::{AuthConfig, PasswordVerifier, Permission, Role, SigningSecret};
use learngate_core::{Clock, ManualClock, OrganizationId, UserId};
use learngate_engine::{
    AuthEngine, AuthError, CredentialStore, InMemoryCredentialStore, UserRecord,
};
use learngate_sessions::{InMemorySessionStore, SessionStore};

fn fast_passwords() -> PasswordVerifier {
    PasswordVerifier::with_params(64, 1, 1).unwrap()
}

fn engine_with_clock() -> (Arc<AuthEngine>, Arc<InMemoryCredentialStore>, Arc<ManualClock>) {
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let config = AuthConfig::new(SigningSecret::new(vec![0x7e; 32]).unwrap());
    let engine = AuthEngine::new(
        config,
        Arc::clone(&credentials) as Arc<dyn CredentialStore>,
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    )
    .with_password_verifier(fast_passwords());

    (Arc::new(engine), credentials, clock)
}

fn seed(credentials: &InMemoryCredentialStore, username: &str, password: &str, role: Role) {
    credentials.insert(UserRecord {
        id: UserId::new(),
        email: format!("{username}@school.example"),
        username: username.to_string(),
        password_hash: fast_passwords().hash(password).unwrap(),
        role,
        organization_id: Some(OrganizationId::new()),
        is_active: true,
        is_verified: true,
    });
}

#[test]
fn replayed_refresh_token_kills_the_whole_session() {
    let (engine, credentials, _clock) = engine_with_clock();
    seed(&credentials, "teacher1", "pw", Role::Teacher);

    // Login yields pair (A1, R1); refreshing with R1 yields (A2, R2).
    let pair1 = engine.login("teacher1", "pw").unwrap();
    let pair2 = engine.refresh(&pair1.refresh_token).unwrap();
    assert_ne!(pair1.access_token, pair2.access_token);
    assert_ne!(pair1.refresh_token, pair2.refresh_token);

    // A2 works; A1 died with the rotation.
    let read = Permission::new("lessons.read");
    assert!(engine.authorize_request(&pair2.access_token, &read).is_ok());
    assert_eq!(
        engine
            .authorize_request(&pair1.access_token, &read)
            .unwrap_err(),
        AuthError::SessionInvalid
    );

    // Replaying R1 is treated as theft: it fails and takes the session down.
    assert_eq!(
        engine.refresh(&pair1.refresh_token).unwrap_err(),
        AuthError::SessionInvalid
    );

    // Now nothing from that session works any more, R2 and A2 included.
    assert_eq!(
        engine.refresh(&pair2.refresh_token).unwrap_err(),
        AuthError::SessionInvalid
    );
    assert_eq!(
        engine
            .authorize_request(&pair2.access_token, &read)
            .unwrap_err(),
        AuthError::SessionInvalid
    );
}

#[test]
fn replay_from_an_older_generation_still_kills_the_session() {
    let (engine, credentials, _clock) = engine_with_clock();
    seed(&credentials, "teacher1", "pw", Role::Teacher);

    // Two legitimate rotations: R1 -> R2 -> R3.
    let pair1 = engine.login("teacher1", "pw").unwrap();
    let pair2 = engine.refresh(&pair1.refresh_token).unwrap();
    let pair3 = engine.refresh(&pair2.refresh_token).unwrap();

    // R1 was spent two generations ago; replaying it is still theft.
    assert_eq!(
        engine.refresh(&pair1.refresh_token).unwrap_err(),
        AuthError::SessionInvalid
    );

    // The revocation must stick: the current pair is dead too.
    assert_eq!(
        engine.refresh(&pair3.refresh_token).unwrap_err(),
        AuthError::SessionInvalid
    );
    assert_eq!(
        engine
            .authorize_request(&pair3.access_token, &Permission::new("lessons.read"))
            .unwrap_err(),
        AuthError::SessionInvalid
    );
}

#[test]
fn concurrent_refreshes_of_one_token_produce_exactly_one_pair() {
    let (engine, credentials, _clock) = engine_with_clock();
    seed(&credentials, "teacher1", "pw", Role::Teacher);

    let pair = engine.login("teacher1", "pw").unwrap();
    let refresh_token = Arc::new(pair.refresh_token);

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let mut handles = Vec::new();
    for _ in 0..threads {
        let engine = Arc::clone(&engine);
        let token = Arc::clone(&refresh_token);
        let barrier = Arc::clone(&barrier);
        handles.push(std::thread::spawn(move || {
            barrier.wait();
            engine.refresh(&token)
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    for failure in results.iter().filter(|r| r.is_err()) {
        // Losers see either the rotation race itself or, if they arrive
        // after the winner finished, the stale-token path. Both revoke.
        assert!(matches!(
            failure,
            Err(AuthError::Conflict) | Err(AuthError::SessionInvalid)
        ));
    }

    // Every loser revoked the session, so even the winner's pair is dead.
    let winner = results.into_iter().find_map(Result::ok).unwrap();
    assert_eq!(
        engine.refresh(&winner.refresh_token).unwrap_err(),
        AuthError::SessionInvalid
    );
}

#[test]
fn access_expires_on_schedule_and_refresh_restores_it() {
    let (engine, credentials, clock) = engine_with_clock();
    seed(&credentials, "student1", "pw", Role::Student);

    let pair = engine.login("student1", "pw").unwrap();
    let read = Permission::new("lessons.read");

    clock.advance(Duration::minutes(29));
    assert!(engine.authorize_request(&pair.access_token, &read).is_ok());

    clock.advance(Duration::minutes(2));
    assert_eq!(
        engine
            .authorize_request(&pair.access_token, &read)
            .unwrap_err(),
        AuthError::TokenExpired
    );

    // The refresh token is still good for another week minus 31 minutes.
    let pair2 = engine.refresh(&pair.refresh_token).unwrap();
    assert!(engine.authorize_request(&pair2.access_token, &read).is_ok());
}

#[test]
fn rotation_extends_the_session_past_its_original_expiry() {
    let (engine, credentials, clock) = engine_with_clock();
    seed(&credentials, "student1", "pw", Role::Student);

    let mut pair = engine.login("student1", "pw").unwrap();
    // Refresh every 6 days; after three hops we are well past the original
    // 7-day horizon and still alive, because rotation rolls expiry forward.
    for _ in 0..3 {
        clock.advance(Duration::days(6));
        pair = engine.refresh(&pair.refresh_token).unwrap();
    }
    assert!(engine
        .authorize_request(&pair.access_token, &Permission::new("lessons.read"))
        .is_ok());
}

#[test]
fn hierarchy_is_visible_through_the_request_boundary() {
    let (engine, credentials, _clock) = engine_with_clock();
    seed(&credentials, "admin1", "pw", Role::SchoolAdmin);
    seed(&credentials, "parent1", "pw", Role::Parent);

    let admin = engine.login("admin1", "pw").unwrap();
    let parent = engine.login("parent1", "pw").unwrap();

    // School admin inherits teacher, parent and student grants.
    for permission in ["lessons.create", "grades.read", "answers.create", "users.read"] {
        assert!(
            engine
                .authorize_request(&admin.access_token, &Permission::new(permission))
                .is_ok(),
            "school_admin should hold {permission}"
        );
    }

    // A parent holds read-side grants only.
    assert!(engine
        .authorize_request(&parent.access_token, &Permission::new("progress.read"))
        .is_ok());
    assert_eq!(
        engine
            .authorize_request(&parent.access_token, &Permission::new("lessons.create"))
            .unwrap_err(),
        AuthError::Forbidden("lessons.create".to_string())
    );
}

#[test]
fn logins_on_two_devices_are_independent_sessions() {
    let (engine, credentials, _clock) = engine_with_clock();
    seed(&credentials, "teacher1", "pw", Role::Teacher);

    let phone = engine.login("teacher1", "pw").unwrap();
    let laptop = engine.login("teacher1", "pw").unwrap();
    let read = Permission::new("lessons.read");

    // Refreshing one device does not disturb the other.
    let phone2 = engine.refresh(&phone.refresh_token).unwrap();
    assert!(engine.authorize_request(&laptop.access_token, &read).is_ok());

    // Nor does logging one out.
    engine.logout(&phone2.access_token).unwrap();
    assert!(engine.authorize_request(&laptop.access_token, &read).is_ok());
    assert_eq!(
        engine
            .authorize_request(&phone2.access_token, &read)
            .unwrap_err(),
        AuthError::SessionInvalid
    );
}

#[test]
fn reset_token_from_one_engine_is_garbage_to_another() {
    let (engine_a, credentials_a, _) = engine_with_clock();
    seed(&credentials_a, "teacher1", "pw", Role::Teacher);
    let token = engine_a.request_password_reset("teacher1").unwrap().unwrap();

    // Same user data, different signing secret.
    let credentials_b = Arc::new(InMemoryCredentialStore::new());
    seed(&credentials_b, "teacher1", "pw", Role::Teacher);
    let config = AuthConfig::new(SigningSecret::new(vec![0x11; 32]).unwrap());
    let engine_b = AuthEngine::new(
        config,
        Arc::clone(&credentials_b) as Arc<dyn CredentialStore>,
        Arc::new(InMemorySessionStore::new()) as Arc<dyn SessionStore>,
        Arc::new(ManualClock::new(Utc::now())) as Arc<dyn Clock>,
    )
    .with_password_verifier(fast_passwords());

    assert_eq!(
        engine_b.reset_password(&token, "new-pw").unwrap_err(),
        AuthError::TokenMalformed
    );
}
