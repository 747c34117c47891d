//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the store is alive.
//!
//! # Tasks
//! - Reconcile: refreshes the session and profile side table against the
//!   authoritative backend, best-effort.

mod reconcile;

pub use reconcile::spawn_reconcile_task;
