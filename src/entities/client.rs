//! Client entity
//!
//! A person buying, selling or renting through the agency.

use serde::{Deserialize, Serialize};

use crate::entities::{Entity, EntityId, EntityKind, Provenance};
use crate::sanitize::{FieldSpec, Schema};

// == Client ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Payload for creating a client; the backend assigns id and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl Client {
    /// Schema for the client creation form.
    pub fn create_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::text("name").required(),
            FieldSpec::text("email"),
            FieldSpec::text("phone"),
            FieldSpec::text("address"),
            FieldSpec::text("notes"),
        ])
    }

    /// Schema for the client edit form; nothing is required on update.
    pub fn update_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::text("name"),
            FieldSpec::text("email"),
            FieldSpec::text("phone"),
            FieldSpec::text("address"),
            FieldSpec::text("notes"),
            FieldSpec::bool("deleted"),
        ])
    }
}

impl Entity for Client {
    type Create = NewClient;
    type Patch = ClientPatch;

    const KIND: EntityKind = EntityKind::Client;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn provenance_mut(&mut self) -> &mut Provenance {
        &mut self.provenance
    }

    fn apply_patch(&mut self, patch: &ClientPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(address) = &patch.address {
            self.address = Some(address.clone());
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(deleted) = patch.deleted {
            self.provenance.deleted = deleted;
        }
    }

    fn tombstone(deleted: bool) -> ClientPatch {
        ClientPatch {
            deleted: Some(deleted),
            ..ClientPatch::default()
        }
    }
}
