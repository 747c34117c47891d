//! Backend Module
//!
//! The remote-collaborator boundary. The cache consumes the backend through
//! these traits only; expected failures (not-found, rejection, network) come
//! back as `Err` values, never as panics. The HTTP implementation lives in
//! [`http`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::entities::{Entity, EntityId};
use crate::error::Result;

pub mod http;

pub use http::{HttpAuthBackend, HttpBackend};

// == Entity Backend ==
/// Remote CRUD verbs for one entity kind.
#[async_trait]
pub trait Backend<E: Entity>: Send + Sync {
    /// Creates a record; the backend assigns id and provenance and returns
    /// the full entity.
    async fn create(&self, payload: &E::Create) -> Result<E>;

    /// Fetches the latest known state of a record.
    async fn fetch(&self, id: &EntityId) -> Result<E>;

    /// Applies a partial update and returns the resulting entity.
    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E>;
}

// == Session ==
/// The authenticated principal. Exactly one value is live at a time,
/// shared read-only by every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: EntityId,
    pub email: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Sign-in credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// == Auth Events ==
/// Asynchronous auth-state notification.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

// == Auth Backend ==
/// Session verbs plus the auth-state subscription.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Authenticates and opens a session.
    async fn start_session(&self, credentials: &Credentials) -> Result<Session>;

    /// Ends the current session.
    async fn end_session(&self) -> Result<()>;

    /// Asks the backend for the currently valid session, if any.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Subscribes to auth-state changes. Events fire independently of any
    /// in-flight request; the receiver is dropped to unsubscribe.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
