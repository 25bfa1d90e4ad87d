use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use timberline_core::{Entity, PropertyId, UserId};

/// A landowner's parcel.
///
/// Properties are never deleted while a project references them. Nothing in
/// this crate deletes properties, so the rule holds trivially here; a future
/// delete operation must check for referencing projects first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub owner_id: UserId,
    pub name: String,
    /// Authoritative acreage, derived from the drawn boundary by the mapping layer.
    pub acreage: f64,
    /// Serialized boundary polygon (opaque to the core).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Professionals granted read access through an accepted engagement.
    #[serde(default)]
    pub authorized_viewers: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Property {
    pub fn new(
        id: PropertyId,
        owner_id: UserId,
        name: impl Into<String>,
        acreage: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name: name.into(),
            acreage: if acreage.is_finite() && acreage > 0.0 { acreage } else { 0.0 },
            boundary: None,
            county: None,
            state: None,
            description: None,
            authorized_viewers: BTreeSet::new(),
            created_at,
        }
    }

    pub fn can_view(&self, user_id: UserId) -> bool {
        self.owner_id == user_id || self.authorized_viewers.contains(&user_id)
    }
}

impl Entity for Property {
    type Id = PropertyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
