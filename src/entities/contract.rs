//! Contract entity
//!
//! A sale or rental agreement tying a client, a property and a realtor
//! together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Entity, EntityId, EntityKind, Provenance};
use crate::sanitize::{FieldSpec, Schema};

// == Contract Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    Sale,
    Rental,
}

// == Contract ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: EntityId,
    pub client_id: EntityId,
    pub property_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtor_id: Option<EntityId>,
    pub kind: ContractKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Payload for drawing up a new contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContract {
    pub client_id: EntityId,
    pub property_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtor_id: Option<EntityId>,
    pub kind: ContractKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtor_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContractKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl Contract {
    /// Schema for the contract creation form. The referenced client and
    /// property must already exist; nested create flows go through the modal
    /// stack and hand their new id back to this form.
    pub fn create_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::relation("client_id").required(),
            FieldSpec::relation("property_id").required(),
            FieldSpec::relation("realtor_id"),
            FieldSpec::text("kind").required(),
            FieldSpec::number("price"),
            FieldSpec::datetime("signed_at"),
            FieldSpec::text("notes"),
        ])
    }

    /// Schema for the contract edit form.
    pub fn update_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::relation("client_id"),
            FieldSpec::relation("property_id"),
            FieldSpec::relation("realtor_id"),
            FieldSpec::text("kind"),
            FieldSpec::number("price"),
            FieldSpec::datetime("signed_at"),
            FieldSpec::text("notes"),
            FieldSpec::bool("deleted"),
        ])
    }
}

impl Entity for Contract {
    type Create = NewContract;
    type Patch = ContractPatch;

    const KIND: EntityKind = EntityKind::Contract;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn provenance_mut(&mut self) -> &mut Provenance {
        &mut self.provenance
    }

    fn apply_patch(&mut self, patch: &ContractPatch) {
        if let Some(client_id) = &patch.client_id {
            self.client_id = client_id.clone();
        }
        if let Some(property_id) = &patch.property_id {
            self.property_id = property_id.clone();
        }
        if let Some(realtor_id) = &patch.realtor_id {
            self.realtor_id = Some(realtor_id.clone());
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        if let Some(signed_at) = patch.signed_at {
            self.signed_at = Some(signed_at);
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(deleted) = patch.deleted {
            self.provenance.deleted = deleted;
        }
    }

    fn tombstone(deleted: bool) -> ContractPatch {
        ContractPatch {
            deleted: Some(deleted),
            ..ContractPatch::default()
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Contract {
        Contract {
            id: EntityId::from("K1"),
            client_id: EntityId::from("C1"),
            property_id: EntityId::from("P1"),
            realtor_id: None,
            kind: ContractKind::Sale,
            price: Some(420_000.0),
            signed_at: None,
            notes: None,
            provenance: Provenance::new("U1"),
        }
    }

    #[test]
    fn test_patch_keeps_relations_unless_overridden() {
        let mut contract = sample();
        contract.apply_patch(&ContractPatch {
            price: Some(415_000.0),
            ..ContractPatch::default()
        });

        assert_eq!(contract.client_id, EntityId::from("C1"));
        assert_eq!(contract.property_id, EntityId::from("P1"));
        assert_eq!(contract.price, Some(415_000.0));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["kind"], "sale");
    }
}
