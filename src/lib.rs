//! Realty Store - Client-side entity cache for a real-estate backend
//!
//! Sanitizes and validates every outgoing write, caches every fetched or
//! mutated entity per kind with merge-by-id semantics and fetch
//! de-duplication, and tracks the authentication session durably.

pub mod app;
pub mod backend;
pub mod cache;
pub mod config;
pub mod entities;
pub mod error;
pub mod modal;
pub mod sanitize;
pub mod session;
pub mod tasks;

pub use app::{init_tracing, AppState};
pub use config::Config;
pub use error::{Result, StoreError};
pub use tasks::spawn_reconcile_task;
