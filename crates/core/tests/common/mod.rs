//! Shared fixtures for service-level tests: an in-memory store and a clock
//! the test can move forward.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use argon2::Params;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use gatehouse_core::auth::password::PasswordHasher;
use gatehouse_core::auth::service::AuthenticationService;
use gatehouse_core::auth::store::{NewSession, Session, SessionStore, StoreError, User};
use gatehouse_core::auth::token::{TokenCodec, TokenConfig};
use gatehouse_core::clock::Clock;
use gatehouse_core::types::{DbId, Timestamp};

pub const ACCESS_SECRET: &str = "service-test-access-secret";
pub const REFRESH_SECRET: &str = "service-test-refresh-secret";

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub struct ManualClock(Mutex<Timestamp>);

impl ManualClock {
    pub fn starting_at(t: Timestamp) -> Self {
        Self(Mutex::new(t))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.0.lock().unwrap()
    }
}

pub fn t0() -> Timestamp {
    DateTime::<Utc>::from_timestamp(1_750_000_000, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    sessions: Vec<Session>,
}

impl Inner {
    fn active_session(&self, user_id: DbId, now: Timestamp) -> Option<&Session> {
        self.sessions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active(now))
            .max_by_key(|s| s.id)
    }

    fn insert_session(&mut self, input: &NewSession) -> Session {
        let session = Session {
            id: self.sessions.len() as DbId + 1,
            user_id: input.user_id,
            token_hash: input.token_hash.clone(),
            expires_at: input.expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };
        self.sessions.push(session.clone());
        session
    }

    fn revoke(&mut self, id: DbId, now: Timestamp) {
        if let Some(row) = self.sessions.iter_mut().find(|s| s.id == id) {
            if row.revoked_at.is_none() {
                row.revoked_at = Some(now);
            }
        }
    }

    fn revoke_all(&mut self, user_id: DbId, now: Timestamp) -> u64 {
        let mut changed = 0;
        for row in self
            .sessions
            .iter_mut()
            .filter(|s| s.user_id == user_id && s.revoked_at.is_none())
        {
            row.revoked_at = Some(now);
            changed += 1;
        }
        changed
    }
}

/// In-memory [`SessionStore`]. `replace_active_session` runs under a single
/// lock, mirroring the transactional PostgreSQL store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn sessions_for(&self, user_id: DbId) -> Vec<Session> {
        let inner = self.inner.lock().unwrap();
        inner
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn active_count(&self, user_id: DbId, now: Timestamp) -> usize {
        self.sessions_for(user_id)
            .iter()
            .filter(|s| s.is_active(now))
            .count()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, email: &str, password_hash: &[u8]) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateUser);
        }
        let user = User {
            id: inner.users.len() as DbId + 1,
            email: email.to_string(),
            password_hash: password_hash.to_vec(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_active_session(
        &self,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.active_session(user_id, now).cloned())
    }

    async fn create_session(&self, input: &NewSession) -> Result<Session, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.insert_session(input))
    }

    async fn revoke(&self, session: &Session, now: Timestamp) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.revoke(session.id, now);
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: DbId, now: Timestamp) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.revoke_all(user_id, now))
    }

    async fn replace_active_session(
        &self,
        input: &NewSession,
        now: Timestamp,
    ) -> Result<Session, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.iter().any(|u| u.id == input.user_id) {
            return Err(StoreError::UnknownUser(input.user_id));
        }
        inner.revoke_all(input.user_id, now);
        Ok(inner.insert_session(input))
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(Params::new(1024, 1, 1, None).expect("valid params"))
}

pub fn test_codec() -> TokenCodec {
    TokenCodec::with_hasher(&TokenConfig::new(ACCESS_SECRET, REFRESH_SECRET), fast_hasher())
}

pub fn test_service() -> (AuthenticationService<MemoryStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_at(t0()));
    let service = AuthenticationService::with_clock(
        MemoryStore::default(),
        test_codec(),
        fast_hasher(),
        clock.clone(),
    );
    (service, clock)
}
