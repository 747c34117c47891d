//! Realtor entity
//!
//! An agent handling listings and contracts.

use serde::{Deserialize, Serialize};

use crate::entities::{Entity, EntityId, EntityKind, Provenance};
use crate::sanitize::{FieldSpec, Schema};

// == Realtor ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Realtor {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Payload for registering a realtor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRealtor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl Realtor {
    /// Schema for the realtor registration form.
    pub fn create_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::text("name").required(),
            FieldSpec::text("email"),
            FieldSpec::text("phone"),
            FieldSpec::text("agency"),
        ])
    }

    /// Schema for the realtor edit form.
    pub fn update_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::text("name"),
            FieldSpec::text("email"),
            FieldSpec::text("phone"),
            FieldSpec::text("agency"),
            FieldSpec::bool("deleted"),
        ])
    }
}

impl Entity for Realtor {
    type Create = NewRealtor;
    type Patch = RealtorPatch;

    const KIND: EntityKind = EntityKind::Realtor;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn provenance_mut(&mut self) -> &mut Provenance {
        &mut self.provenance
    }

    fn apply_patch(&mut self, patch: &RealtorPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(agency) = &patch.agency {
            self.agency = Some(agency.clone());
        }
        if let Some(deleted) = patch.deleted {
            self.provenance.deleted = deleted;
        }
    }

    fn tombstone(deleted: bool) -> RealtorPatch {
        RealtorPatch {
            deleted: Some(deleted),
            ..RealtorPatch::default()
        }
    }
}
