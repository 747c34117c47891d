//! Application State Module
//!
//! Wires one entity cache per kind and the session store into a single
//! explicitly-constructed object. The store is built once at process start
//! and injected into consumers; nothing here is ambient global state, so
//! tests construct a fresh one per case.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::backend::{AuthBackend, HttpAuthBackend, HttpBackend};
use crate::cache::EntityCache;
use crate::config::Config;
use crate::entities::{Client, Contract, Property, Realtor, UserProfile};
use crate::error::Result;
use crate::session::{FileStorage, SessionStore, Storage};
use crate::tasks::spawn_reconcile_task;

// == App State ==
/// The process-wide entity store: one cache per entity kind plus session
/// state. Cheap to clone pieces out of — each cache is itself a shared
/// handle.
pub struct AppState {
    pub clients: EntityCache<Client>,
    pub properties: EntityCache<Property>,
    pub contracts: EntityCache<Contract>,
    pub realtors: EntityCache<Realtor>,
    pub profiles: EntityCache<UserProfile>,
    pub session: Arc<SessionStore>,
    backend: Arc<HttpBackend>,
    reconcile_interval: u64,
}

impl AppState {
    /// Builds the full store against an HTTP backend described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = Arc::new(HttpBackend::from_config(config)?);
        let auth: Arc<dyn AuthBackend> = Arc::new(HttpAuthBackend::from_config(config)?);
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage_dir));

        info!(backend = %config.backend_url, "entity store initialized");

        Ok(Self {
            clients: EntityCache::new(backend.clone()),
            properties: EntityCache::new(backend.clone()),
            contracts: EntityCache::new(backend.clone()),
            realtors: EntityCache::new(backend.clone()),
            profiles: EntityCache::new(backend.clone()),
            session: Arc::new(SessionStore::open(auth, storage)),
            backend,
            reconcile_interval: config.reconcile_interval,
        })
    }

    /// Starts the background session reconciliation. Call once after
    /// construction; abort the returned handle during shutdown.
    pub fn spawn_reconcile(&self) -> JoinHandle<()> {
        spawn_reconcile_task(
            Arc::clone(&self.session),
            self.backend.clone(),
            self.reconcile_interval,
        )
    }
}

// == Tracing Setup ==
/// Initializes the tracing subscriber for the embedding application.
///
/// Defaults to "info" level; override with the RUST_LOG env var.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realty_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_builds_empty_caches() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            storage_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let state = AppState::from_config(&config).unwrap();
        assert!(state.clients.is_empty());
        assert!(state.properties.is_empty());
        assert!(state.session.session().is_none());
    }
}
