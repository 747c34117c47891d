//! HTTP Backend
//!
//! JSON-over-HTTP implementation of the backend traits using reqwest.
//! Entity routes follow the collection layout `POST /clients`,
//! `GET /clients/{id}`, `PATCH /clients/{id}`; auth routes live under
//! `/auth/session`. Error bodies are `{"error": "..."}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::backend::{AuthBackend, AuthEvent, Backend, Credentials, Session};
use crate::config::Config;
use crate::entities::{Entity, EntityId, EntityKind};
use crate::error::{Result, StoreError};

/// Capacity of the auth-event channel; slow subscribers miss old events
/// rather than blocking the sender.
const AUTH_EVENT_CAPACITY: usize = 16;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

// == HTTP Entity Backend ==
/// Entity CRUD over HTTP. One instance serves every entity kind; the route
/// is derived from `E::KIND`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    /// Builds a backend from configuration, with the configured request
    /// timeout applied to every call.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self::new(client, config.backend_url.clone()))
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.base_url, kind.path())
    }

    fn item_url(&self, kind: EntityKind, id: &EntityId) -> String {
        format!("{}/{}/{}", self.base_url, kind.path(), id)
    }
}

/// Decodes a response into `T`, mapping expected failure statuses onto the
/// store error taxonomy. `id` is the fetch/update target, if there was one.
async fn decode<T: DeserializeOwned>(
    kind: EntityKind,
    id: Option<&EntityId>,
    response: Response,
) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(Into::into);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());

    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(StoreError::NotFound {
                kind,
                id: id.clone(),
            });
        }
    }

    debug!(%kind, %status, "backend rejected request: {message}");
    Err(StoreError::Remote(format!(
        "{kind} request failed: {message}"
    )))
}

#[async_trait]
impl<E: Entity> Backend<E> for HttpBackend {
    async fn create(&self, payload: &E::Create) -> Result<E> {
        let response = self
            .client
            .post(self.collection_url(E::KIND))
            .json(payload)
            .send()
            .await?;
        decode(E::KIND, None, response).await
    }

    async fn fetch(&self, id: &EntityId) -> Result<E> {
        let response = self.client.get(self.item_url(E::KIND, id)).send().await?;
        decode(E::KIND, Some(id), response).await
    }

    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E> {
        let response = self
            .client
            .patch(self.item_url(E::KIND, id))
            .json(patch)
            .send()
            .await?;
        decode(E::KIND, Some(id), response).await
    }
}

// == HTTP Auth Backend ==
/// Session verbs over HTTP. The backend broadcasts an [`AuthEvent`] after
/// each successful state transition it performs, so subscribers observe
/// sign-ins and sign-outs without polling.
#[derive(Debug)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    base_url: String,
    events: broadcast::Sender<AuthEvent>,
}

impl HttpAuthBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            client,
            base_url,
            events,
        }
    }

    /// Builds an auth backend from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self::new(client, config.backend_url.clone()))
    }

    fn session_url(&self) -> String {
        format!("{}/auth/session", self.base_url)
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn start_session(&self, credentials: &Credentials) -> Result<Session> {
        let response = self
            .client
            .post(self.session_url())
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(StoreError::Remote(format!("sign-in failed: {message}")));
        }

        let session = response.json::<Session>().await?;
        // No receivers is fine; the event is simply unobserved
        let _ = self.events.send(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn end_session(&self) -> Result<()> {
        let response = self.client.delete(self.session_url()).send().await?;
        if !response.status().is_success() {
            return Err(StoreError::Remote(format!(
                "sign-out failed: {}",
                response.status()
            )));
        }
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        let response = self.client.get(self.session_url()).send().await?;
        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                Ok(Some(response.json::<Session>().await?))
            }
            status => Err(StoreError::Remote(format!(
                "session lookup failed: {status}"
            ))),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
