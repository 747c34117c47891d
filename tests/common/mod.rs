//! Shared fixtures for integration tests: an in-memory backend that behaves
//! like the real one (id assignment, revision bumping, not-found), an
//! in-memory storage, and a scriptable auth backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;

use realty_store::backend::{AuthBackend, AuthEvent, Backend, Credentials, Session};
use realty_store::entities::{
    Client, ClientPatch, Entity, EntityId, EntityKind, NewClient, Provenance,
};
use realty_store::error::{Result, StoreError};
use realty_store::session::Storage;

// == Fake Entity Backend ==
/// In-memory client backend with realistic write semantics: ids are
/// assigned on create, revisions bump on every write, updates against
/// unknown ids report not-found.
pub struct FakeBackend {
    clients: Mutex<HashMap<EntityId, Client>>,
    next_id: AtomicU64,
    pub fetch_calls: AtomicU64,
    pub fail_remote: AtomicBool,
    fetch_delay: Duration,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            fetch_calls: AtomicU64::new(0),
            fail_remote: AtomicBool::new(false),
            fetch_delay: Duration::from_millis(20),
        }
    }

    /// Seeds a client directly, bypassing the remote-call path.
    pub fn seed(&self, client: Client) {
        self.clients
            .lock()
            .unwrap()
            .insert(client.id().clone(), client);
    }

    fn check_up(&self) -> Result<()> {
        if self.fail_remote.load(Ordering::SeqCst) {
            return Err(StoreError::Remote("backend unreachable".into()));
        }
        Ok(())
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend<Client> for FakeBackend {
    async fn create(&self, payload: &NewClient) -> Result<Client> {
        self.check_up()?;

        let id = EntityId::from(format!(
            "C{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        let client = Client {
            id: id.clone(),
            name: payload.name.clone(),
            email: payload.email.clone(),
            phone: payload.phone.clone(),
            address: payload.address.clone(),
            notes: payload.notes.clone(),
            provenance: Provenance::new("U1"),
        };
        self.clients.lock().unwrap().insert(id, client.clone());
        Ok(client)
    }

    async fn fetch(&self, id: &EntityId) -> Result<Client> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.fetch_delay).await;
        self.check_up()?;

        self.clients
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(EntityKind::Client, id.clone()))
    }

    async fn update(&self, id: &EntityId, patch: &ClientPatch) -> Result<Client> {
        self.check_up()?;

        let mut clients = self.clients.lock().unwrap();
        let client = clients
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Client, id.clone()))?;

        client.apply_patch(patch);
        client.provenance.revision += 1;
        client.provenance.updated_by = Some(EntityId::from("U1"));
        client.provenance.updated_at = Some(Utc::now());
        Ok(client.clone())
    }
}

// == Memory Storage ==
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// == Fake Auth ==
/// Auth backend driven by the test: sessions open for any password except
/// "wrong", and arbitrary events can be fired at subscribers.
pub struct FakeAuth {
    pub events: broadcast::Sender<AuthEvent>,
    session: Mutex<Option<Session>>,
}

impl FakeAuth {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            events,
            session: Mutex::new(None),
        }
    }

    pub fn fire(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }
}

impl Default for FakeAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    async fn start_session(&self, credentials: &Credentials) -> Result<Session> {
        if credentials.password == "wrong" {
            return Err(StoreError::Remote("invalid credentials".into()));
        }
        let session = Session {
            user_id: EntityId::from("U1"),
            email: credentials.email.clone(),
            access_token: "tok-1".into(),
            expires_at: None,
        };
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn end_session(&self) -> Result<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

/// A cached client as the backend would have served it.
pub fn seeded_client(id: &str, name: &str) -> Client {
    Client {
        id: EntityId::from(id),
        name: name.into(),
        email: None,
        phone: None,
        address: None,
        notes: None,
        provenance: Provenance::new("U1"),
    }
}
