//! Property entity
//!
//! A listed piece of real estate.

use serde::{Deserialize, Serialize};

use crate::entities::{Entity, EntityId, EntityKind, Provenance};
use crate::sanitize::{FieldSpec, Schema};

// == Property Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    House,
    Apartment,
    Office,
    Land,
}

// == Property ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: EntityId,
    pub address: String,
    /// Wire name kept as `type` to match the backend contract
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Living surface in square meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Payload for listing a new property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub address: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl Property {
    /// Schema for the property listing form.
    pub fn create_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::text("address").required(),
            FieldSpec::text("type").required(),
            FieldSpec::number("price"),
            FieldSpec::number("surface"),
            FieldSpec::number("rooms"),
            FieldSpec::text("description"),
            FieldSpec::tags("tags"),
        ])
    }

    /// Schema for the property edit form.
    pub fn update_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::text("address"),
            FieldSpec::text("type"),
            FieldSpec::number("price"),
            FieldSpec::number("surface"),
            FieldSpec::number("rooms"),
            FieldSpec::text("description"),
            FieldSpec::tags("tags"),
            FieldSpec::bool("deleted"),
        ])
    }
}

impl Entity for Property {
    type Create = NewProperty;
    type Patch = PropertyPatch;

    const KIND: EntityKind = EntityKind::Property;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn provenance_mut(&mut self) -> &mut Provenance {
        &mut self.provenance
    }

    fn apply_patch(&mut self, patch: &PropertyPatch) {
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        if let Some(surface) = patch.surface {
            self.surface = Some(surface);
        }
        if let Some(rooms) = patch.rooms {
            self.rooms = Some(rooms);
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(deleted) = patch.deleted {
            self.provenance.deleted = deleted;
        }
    }

    fn tombstone(deleted: bool) -> PropertyPatch {
        PropertyPatch {
            deleted: Some(deleted),
            ..PropertyPatch::default()
        }
    }
}
