//! Entities Module
//!
//! Domain records owned by the cache: identifier and provenance types, the
//! `Entity` trait binding a full record to its create/update payload
//! variants, and one module per entity kind.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

mod client;
mod contract;
mod profile;
mod property;
mod realtor;

// Re-export public types
pub use client::{Client, ClientPatch, NewClient};
pub use contract::{Contract, ContractKind, ContractPatch, NewContract};
pub use profile::{NewUserProfile, Role, UserProfile, UserProfilePatch};
pub use property::{NewProperty, Property, PropertyKind, PropertyPatch};
pub use realtor::{NewRealtor, Realtor, RealtorPatch};

// == Entity Id ==
/// Opaque identifier assigned by the backend, unique within an entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// == Entity Kind ==
/// The entity kinds the store manages, one cache instance each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Property,
    Contract,
    Realtor,
    UserProfile,
}

impl EntityKind {
    /// Stable lowercase name, used in logs and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Property => "property",
            Self::Contract => "contract",
            Self::Realtor => "realtor",
            Self::UserProfile => "user_profile",
        }
    }

    /// Collection segment of the backend route for this kind.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Client => "clients",
            Self::Property => "properties",
            Self::Contract => "contracts",
            Self::Realtor => "realtors",
            Self::UserProfile => "profiles",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Provenance ==
/// Creation/update bookkeeping carried by every entity, serialized flattened
/// into the entity record.
///
/// `revision` is a backend-assigned monotonic counter bumped on every write;
/// the cache uses it to discard completions that arrive after a newer write
/// has already landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub created_by: EntityId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-delete flag; deletion is a field flip, never removal
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub revision: u64,
}

impl Provenance {
    /// Fresh provenance for a record created by `author` now.
    pub fn new(author: impl Into<EntityId>) -> Self {
        Self {
            created_by: author.into(),
            created_at: Utc::now(),
            updated_by: None,
            updated_at: None,
            deleted: false,
            revision: 1,
        }
    }
}

// == Entity Trait ==
/// A domain record with identity and provenance, owned by the cache.
///
/// `Create` is the payload sent to the backend when making a new record
/// (no id or provenance; the backend assigns both). `Patch` is the partial
/// update payload: every field optional, an absent field meaning "leave
/// unchanged" — never "set to empty".
pub trait Entity:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Create: Clone + Send + Sync + Serialize + 'static;
    type Patch: Clone + Send + Sync + Serialize + 'static;

    const KIND: EntityKind;

    fn id(&self) -> &EntityId;
    fn provenance(&self) -> &Provenance;
    fn provenance_mut(&mut self) -> &mut Provenance;

    /// Shallow-merges a patch: only the fields present in `patch` overwrite
    /// the current values.
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// A patch that only flips the soft-delete flag.
    fn tombstone(deleted: bool) -> Self::Patch;

    fn revision(&self) -> u64 {
        self.provenance().revision
    }

    fn is_deleted(&self) -> bool {
        self.provenance().deleted
    }
}
