//! Session Store Module
//!
//! Holds the live authentication session and a durable side table of cached
//! user profiles. The live session is fed by the auth backend's event
//! stream: every notification overwrites it immediately, independent of any
//! in-flight request. Durable state is loaded once at startup and written
//! through on every change; reconciliation against the authoritative
//! backend is best-effort and never blocks startup.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{AuthBackend, AuthEvent, Backend, Credentials, Session};
use crate::cache::CacheTable;
use crate::entities::{Entity, EntityId, UserProfile};
use crate::error::Result;
use crate::session::Storage;

/// Storage key for the persisted session record.
const SESSION_KEY: &str = "session";
/// Storage key for the persisted profile side table.
const PROFILES_KEY: &str = "profiles";

// == Subscription Guard ==
/// Owns the single auth-event listener task for the process lifetime.
/// Dropping the guard aborts the task, so tearing the store down cannot
/// leave a listener behind, and a second listener is not constructible —
/// the only subscription site is [`SessionStore::open`].
#[derive(Debug)]
struct SubscriptionGuard {
    handle: JoinHandle<()>,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// == Session Store ==
/// Process-wide session state with durable persistence.
pub struct SessionStore {
    auth: Arc<dyn AuthBackend>,
    storage: Arc<dyn Storage>,
    session: Arc<RwLock<Option<Session>>>,
    profiles: Arc<RwLock<CacheTable<UserProfile>>>,
    _listener: SubscriptionGuard,
}

impl SessionStore {
    // == Open ==
    /// Builds the store from durable state and subscribes to auth events.
    ///
    /// The durable session and profile table are read synchronously; a
    /// corrupt or unreadable record is logged and treated as absent.
    /// Reconciliation against the authoritative backend is left to the
    /// background task so startup never blocks on the network. Must be
    /// called from within a tokio runtime.
    pub fn open(auth: Arc<dyn AuthBackend>, storage: Arc<dyn Storage>) -> Self {
        let session = Arc::new(RwLock::new(load_session(storage.as_ref())));
        let profiles = Arc::new(RwLock::new(load_profiles(storage.as_ref())));

        let listener = spawn_listener(
            auth.subscribe(),
            Arc::clone(&session),
            Arc::clone(&storage),
        );

        Self {
            auth,
            storage,
            session,
            profiles,
            _listener: SubscriptionGuard { handle: listener },
        }
    }

    // == Session Reads ==
    /// The live session, reflecting the latest auth event on every read.
    pub fn session(&self) -> Option<Session> {
        self.session.read().expect("session lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .expect("session lock poisoned")
            .is_some()
    }

    // == Sign In / Out ==
    /// Authenticates against the backend; on success the live session is
    /// replaced and persisted.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let session = self.auth.start_session(credentials).await?;
        info!(user = %session.user_id, "signed in");
        set_session(&self.session, self.storage.as_ref(), Some(session.clone()));
        Ok(session)
    }

    /// Ends the backend session; on success the live session is cleared and
    /// the cleared state persisted.
    pub async fn sign_out(&self) -> Result<()> {
        self.auth.end_session().await?;
        info!("signed out");
        set_session(&self.session, self.storage.as_ref(), None);
        Ok(())
    }

    // == Profile Side Table ==
    /// Cached profile lookup, referentially stable like any cache read.
    pub fn profile(&self, id: &EntityId) -> Option<Arc<UserProfile>> {
        self.profiles
            .read()
            .expect("profile table poisoned")
            .get(id)
    }

    /// Every cached profile.
    pub fn profiles(&self) -> Vec<Arc<UserProfile>> {
        self.profiles
            .read()
            .expect("profile table poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Merges a profile into the side table and writes the table through to
    /// durable storage. A storage failure is logged, not surfaced — the
    /// in-memory table is already current.
    pub fn cache_profile(&self, profile: UserProfile) -> Arc<UserProfile> {
        let entry = {
            let mut table = self.profiles.write().expect("profile table poisoned");
            let (entry, _) = table.insert(profile);
            entry
        };
        self.persist_profiles();
        entry
    }

    // == Reconcile ==
    /// Best-effort reconciliation against the authoritative source: refresh
    /// the live session, then re-fetch every cached profile. Individual
    /// profile failures are logged and skipped; the first session-level
    /// failure is returned so the background task can log it.
    pub async fn reconcile(&self, backend: &dyn Backend<UserProfile>) -> Result<()> {
        let authoritative = self.auth.current_session().await?;
        set_session(&self.session, self.storage.as_ref(), authoritative);

        let ids: Vec<EntityId> = {
            let table = self.profiles.read().expect("profile table poisoned");
            table.ids().cloned().collect()
        };

        let mut refreshed = 0usize;
        for id in ids {
            match backend.fetch(&id).await {
                Ok(profile) => {
                    let mut table = self.profiles.write().expect("profile table poisoned");
                    table.insert(profile);
                    refreshed += 1;
                }
                Err(err) => {
                    warn!(%id, "profile reconcile skipped: {err}");
                }
            }
        }

        if refreshed > 0 {
            self.persist_profiles();
        }
        debug!(refreshed, "session reconcile pass finished");
        Ok(())
    }

    fn persist_profiles(&self) {
        let mut profiles: Vec<UserProfile> = {
            let table = self.profiles.read().expect("profile table poisoned");
            table.values().map(|entry| (**entry).clone()).collect()
        };
        profiles.sort_by(|a, b| a.id().cmp(b.id()));

        match serde_json::to_string(&profiles) {
            Ok(serialized) => {
                if let Err(err) = self.storage.set(PROFILES_KEY, &serialized) {
                    warn!("persisting profile table failed: {err}");
                }
            }
            Err(err) => warn!("serializing profile table failed: {err}"),
        }
    }
}

// == Listener ==
/// Applies every auth event to the live session the moment it arrives.
fn spawn_listener(
    mut events: tokio::sync::broadcast::Receiver<AuthEvent>,
    session: Arc<RwLock<Option<Session>>>,
    storage: Arc<dyn Storage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedIn(new_session)) => {
                    info!(user = %new_session.user_id, "session replaced by auth notification");
                    set_session(&session, storage.as_ref(), Some(new_session));
                }
                Ok(AuthEvent::SignedOut) => {
                    info!("session cleared by auth notification");
                    set_session(&session, storage.as_ref(), None);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "auth event stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Replaces the live session and writes it through to durable storage.
/// A storage failure is logged; the live value is already updated.
fn set_session(
    session: &RwLock<Option<Session>>,
    storage: &dyn Storage,
    next: Option<Session>,
) {
    *session.write().expect("session lock poisoned") = next.clone();

    match serde_json::to_string(&next) {
        Ok(serialized) => {
            if let Err(err) = storage.set(SESSION_KEY, &serialized) {
                warn!("persisting session failed: {err}");
            }
        }
        Err(err) => warn!("serializing session failed: {err}"),
    }
}

fn load_session(storage: &dyn Storage) -> Option<Session> {
    let raw = match storage.get(SESSION_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("reading stored session failed: {err}");
            return None;
        }
    };

    match serde_json::from_str::<Option<Session>>(&raw) {
        Ok(session) => session,
        Err(err) => {
            warn!("stored session is corrupt, ignoring: {err}");
            None
        }
    }
}

fn load_profiles(storage: &dyn Storage) -> CacheTable<UserProfile> {
    let mut table = CacheTable::new();

    let raw = match storage.get(PROFILES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return table,
        Err(err) => {
            warn!("reading stored profiles failed: {err}");
            return table;
        }
    };

    match serde_json::from_str::<Vec<UserProfile>>(&raw) {
        Ok(profiles) => {
            for profile in profiles {
                table.insert(profile);
            }
        }
        Err(err) => warn!("stored profile table is corrupt, ignoring: {err}"),
    }

    table
}
