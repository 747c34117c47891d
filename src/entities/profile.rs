//! User profile entity
//!
//! The application-side record for an authenticated user. Profiles are also
//! cached in the session store's durable side table so the UI can greet a
//! returning user before the backend answers.

use serde::{Deserialize, Serialize};

use crate::entities::{Entity, EntityId, EntityKind, Provenance};
use crate::sanitize::{FieldSpec, Schema};

// == Role ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Agent,
    Assistant,
}

// == User Profile ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: EntityId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: Role,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Payload for provisioning a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUserProfile {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: Role,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl UserProfile {
    /// Schema for the profile edit form.
    pub fn update_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::text("email"),
            FieldSpec::text("display_name"),
            FieldSpec::text("role"),
        ])
    }
}

impl Entity for UserProfile {
    type Create = NewUserProfile;
    type Patch = UserProfilePatch;

    const KIND: EntityKind = EntityKind::UserProfile;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn provenance_mut(&mut self) -> &mut Provenance {
        &mut self.provenance
    }

    fn apply_patch(&mut self, patch: &UserProfilePatch) {
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(display_name) = &patch.display_name {
            self.display_name = Some(display_name.clone());
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(deleted) = patch.deleted {
            self.provenance.deleted = deleted;
        }
    }

    fn tombstone(deleted: bool) -> UserProfilePatch {
        UserProfilePatch {
            deleted: Some(deleted),
            ..UserProfilePatch::default()
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        let json = serde_json::to_string(&Role::Agent).unwrap();
        assert_eq!(json, "\"agent\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Agent);
    }

    #[test]
    fn test_patch_changes_role_only() {
        let mut profile = UserProfile {
            id: EntityId::from("U1"),
            email: "jo@example.com".into(),
            display_name: Some("Jo".into()),
            role: Role::Assistant,
            provenance: Provenance::new("U0"),
        };

        profile.apply_patch(&UserProfilePatch {
            role: Some(Role::Agent),
            ..UserProfilePatch::default()
        });

        assert_eq!(profile.role, Role::Agent);
        assert_eq!(profile.display_name.as_deref(), Some("Jo"));
    }
}
