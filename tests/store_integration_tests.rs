//! Integration Tests for the Entity Store
//!
//! Exercises the full write path (resolver → cache → backend → merge) and
//! the session lifecycle against in-memory collaborators.

mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use serde_json::json;

use realty_store::backend::{AuthEvent, Credentials, Session};
use realty_store::cache::EntityCache;
use realty_store::entities::{Client, ClientPatch, Entity, EntityId, NewClient};
use realty_store::error::StoreError;
use realty_store::modal::ModalStack;
use realty_store::sanitize::{Resolver, ValidationIssue};
use realty_store::session::{FileStorage, SessionStore, Storage};

use common::{seeded_client, FakeAuth, FakeBackend, MemoryStorage};

fn client_cache() -> (EntityCache<Client>, Arc<FakeBackend>) {
    let backend = Arc::new(FakeBackend::new());
    (EntityCache::new(backend.clone()), backend)
}

// == Write Path ==

#[tokio::test]
async fn test_form_submission_end_to_end() -> anyhow::Result<()> {
    let (cache, _) = client_cache();
    let resolver = Resolver::new(Client::create_schema());

    // The form leaves email blank and phone whitespace-only
    let payload: NewClient = resolver.resolve(json!({
        "name": "Ada Moreau",
        "email": "",
        "phone": "   ",
        "notes": "met at the open house"
    }))?;

    assert!(payload.email.is_none());
    assert!(payload.phone.is_none());

    let created = cache.create(payload).await?;
    assert_eq!(created.name, "Ada Moreau");
    assert_eq!(created.notes.as_deref(), Some("met at the open house"));

    // The new entity is readable through the selector right away
    let cached = cache
        .select_by_id(created.id())
        .expect("created client should be cached");
    assert!(Arc::ptr_eq(&created, &cached));
    Ok(())
}

#[tokio::test]
async fn test_validation_failure_blocks_the_write() {
    let (cache, _) = client_cache();
    let resolver = Resolver::new(Client::create_schema());

    let err = resolver
        .resolve::<NewClient>(json!({"name": "  ", "email": "x@example.com"}))
        .unwrap_err();

    match err {
        StoreError::Validation(errors) => {
            assert_eq!(errors.get("name"), Some(&ValidationIssue::Missing));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // Nothing reached the cache
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_failed_create_leaves_no_trace() {
    let (cache, backend) = client_cache();
    backend.fail_remote.store(true, Ordering::SeqCst);

    let result = cache
        .create(NewClient {
            name: "Ghost".into(),
            email: None,
            phone: None,
            address: None,
            notes: None,
        })
        .await;

    assert!(matches!(result, Err(StoreError::Remote(_))));
    assert!(cache.is_empty());
    // No speculative identifier is ever visible
    assert!(cache.select_by_id(&EntityId::from("C1")).is_none());
}

// == Fetch / Update ==

#[tokio::test]
async fn test_concurrent_fetches_issue_one_remote_call() -> anyhow::Result<()> {
    let (cache, backend) = client_cache();
    backend.seed(seeded_client("C1", "Ada"));
    let id = EntityId::from("C1");

    let (a, b) = tokio::join!(cache.fetch(&id), cache.fetch(&id));
    let (a, b) = (a?, b?);

    assert_eq!(backend.fetch_calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&a, &b));
    Ok(())
}

#[tokio::test]
async fn test_update_preserves_unmentioned_fields() -> anyhow::Result<()> {
    let (cache, _) = client_cache();

    let created = cache
        .create(NewClient {
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            phone: None,
            address: None,
            notes: None,
        })
        .await?;

    let updated = cache
        .update(
            created.id(),
            ClientPatch {
                notes: Some("prefers mornings".into()),
                ..ClientPatch::default()
            },
        )
        .await?;

    assert_eq!(updated.email.as_deref(), Some("ada@example.com"));
    assert_eq!(updated.notes.as_deref(), Some("prefers mornings"));
    assert_eq!(updated.provenance.revision, 2);
    Ok(())
}

#[tokio::test]
async fn test_update_unknown_id_reports_not_found() {
    let (cache, _) = client_cache();

    let err = cache
        .update(&EntityId::from("C404"), ClientPatch::default())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { .. }));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_soft_delete_roundtrip() -> anyhow::Result<()> {
    let (cache, _) = client_cache();
    let created = cache
        .create(NewClient {
            name: "Ada".into(),
            email: None,
            phone: None,
            address: None,
            notes: None,
        })
        .await?;
    let id = created.id().clone();

    let deleted = cache.soft_delete(&id).await?;
    assert!(deleted.provenance.deleted);
    assert!(cache.select_active().is_empty());
    // The identifier stays known
    assert!(cache.select_by_id(&id).is_some());

    let restored = cache.restore(&id).await?;
    assert!(!restored.provenance.deleted);
    assert_eq!(cache.select_active().len(), 1);
    Ok(())
}

// == Nested Create Flow ==

#[tokio::test]
async fn test_nested_create_flow_returns_id_to_parent_form() -> anyhow::Result<()> {
    let (cache, _) = client_cache();

    // The contract form needs a client that does not exist yet, so it
    // pushes a client-creation modal and waits for the new id.
    let mut modals: ModalStack<&str> = ModalStack::new();
    modals.push("contract-form");

    let chosen_client: Arc<Mutex<Option<EntityId>>> = Arc::new(Mutex::new(None));
    {
        let chosen_client = chosen_client.clone();
        modals.push_with(
            "client-form",
            Box::new(move |id| {
                *chosen_client.lock().unwrap() = Some(id);
            }),
        );
    }

    let created = cache
        .create(NewClient {
            name: "Walk-in".into(),
            email: None,
            phone: None,
            address: None,
            notes: None,
        })
        .await?;

    modals.complete(created.id().clone());

    assert_eq!(modals.top(), Some(&"contract-form"));
    assert_eq!(chosen_client.lock().unwrap().as_ref(), Some(created.id()));
    Ok(())
}

// == Session Lifecycle ==

#[tokio::test]
async fn test_sign_in_then_external_event_overrides() -> anyhow::Result<()> {
    let auth = Arc::new(FakeAuth::new());
    let store = SessionStore::open(auth.clone(), Arc::new(MemoryStorage::default()));

    store
        .sign_in(&Credentials {
            email: "jo@example.com".into(),
            password: "pw".into(),
        })
        .await?;
    assert_eq!(store.session().unwrap().email, "jo@example.com");

    // An external auth notification replaces the live session regardless of
    // what set it
    auth.fire(AuthEvent::SignedIn(Session {
        user_id: EntityId::from("U2"),
        email: "other@example.com".into(),
        access_token: "tok-2".into(),
        expires_at: None,
    }));
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    assert_eq!(store.session().unwrap().email, "other@example.com");
    Ok(())
}

#[tokio::test]
async fn test_session_survives_restart_via_file_storage() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(FileStorage::new(dir.path()));

    {
        let store = SessionStore::open(Arc::new(FakeAuth::new()), storage.clone());
        store
            .sign_in(&Credentials {
                email: "jo@example.com".into(),
                password: "pw".into(),
            })
            .await?;
    }

    // A fresh process start finds the durable record
    let reopened = SessionStore::open(Arc::new(FakeAuth::new()), storage);
    assert_eq!(reopened.session().unwrap().email, "jo@example.com");
    Ok(())
}

#[tokio::test]
async fn test_corrupt_session_file_is_not_fatal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(FileStorage::new(dir.path()));
    storage.set("session", "definitely not json")?;

    let store = SessionStore::open(Arc::new(FakeAuth::new()), storage);
    assert!(store.session().is_none());
    Ok(())
}
