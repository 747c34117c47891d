//! Session Reconcile Task
//!
//! Background task that periodically reconciles the durable session state
//! against the authoritative backend. Fire-and-forget: failures are logged
//! and the next tick tries again; application startup never waits on it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::entities::UserProfile;
use crate::session::SessionStore;

/// Spawns a background task that periodically reconciles the session store.
///
/// The first pass runs immediately, so a stale durable record is corrected
/// shortly after startup without blocking it. The task runs until aborted.
///
/// # Arguments
/// * `store` - Shared session store to reconcile
/// * `backend` - Authoritative source for user profiles
/// * `interval_secs` - Interval in seconds between reconcile passes
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it during
/// shutdown.
pub fn spawn_reconcile_task(
    store: Arc<SessionStore>,
    backend: Arc<dyn Backend<UserProfile>>,
    interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting session reconcile task with interval of {} seconds",
            interval_secs
        );

        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));

        loop {
            // First tick fires immediately
            ticker.tick().await;

            match store.reconcile(backend.as_ref()).await {
                Ok(()) => debug!("session reconcile pass succeeded"),
                Err(err) => warn!("session reconcile pass failed: {err}"),
            }
        }
    })
}
