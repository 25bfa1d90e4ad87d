use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use timberline_core::{DomainError, DomainResult, ValueObject};
use timberline_inventory::{Inventory, InventorySummary, aggregate};
use timberline_reports::{CruiseReport, summarize};

/// Sale terms written by the forester alongside the inventory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetails {
    #[serde(default)]
    pub sale_name: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acreage: Option<f64>,
    #[serde(default)]
    pub bid_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_deadline: Option<String>,
    /// Remaining free-text terms (access, SMZ notes, payment terms, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

/// Cruise payload owned by a project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CruiseData {
    #[serde(default)]
    pub details: SaleDetails,
    #[serde(default)]
    pub inventory: Inventory,
    /// Serialized map geometry drawn over the property (opaque to the core).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<JsonValue>,
}

impl ValueObject for CruiseData {}

impl CruiseData {
    /// Check required fields and normalize the inventory for storage.
    pub fn validated(mut self, property_acreage: Option<f64>) -> DomainResult<Self> {
        if self.details.sale_name.trim().is_empty() {
            return Err(DomainError::validation("cruise details require a sale name"));
        }
        self.inventory = self
            .inventory
            .normalized(property_acreage)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        if self.details.acreage.is_none() {
            self.details.acreage = property_acreage;
        }
        Ok(self)
    }

    pub fn summary(&self, property_acreage: Option<f64>) -> InventorySummary {
        aggregate(self.inventory.stands(), property_acreage.or(self.details.acreage))
    }

    pub fn report(&self, property_acreage: Option<f64>) -> CruiseReport {
        summarize(self.inventory.stands(), property_acreage.or(self.details.acreage))
    }
}

/// A price line within a rate set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub product: String,
    pub price: f64,
    #[serde(default)]
    pub per: String,
}

/// Named pricing schedule attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSet {
    pub name: String,
    #[serde(default)]
    pub rates: Vec<Rate>,
}
