use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use timberline_core::ValueObject;

use crate::numeric::{lenient_count, lenient_f64, sanitize};

/// Name of the pseudo-stand covering the whole property.
pub const ENTIRE_TRACT: &str = "Entire Tract";

/// Volume unit recorded on a DBH row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Units {
    /// Weight-based volume. The only unit that counts toward tonnage totals.
    #[default]
    Tons,
    /// Thousand board feet (Doyle). Never converted to tons at the row level.
    #[serde(rename = "MBF")]
    Mbf,
}

impl<'de> Deserialize<'de> for Units {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("mbf") => Units::Mbf,
            _ => Units::Tons,
        })
    }
}

/// One diameter-class line of a product breakdown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbhRow {
    #[serde(default)]
    pub dbh: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub trees: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: f64,
    #[serde(default)]
    pub units: Units,
}

impl ValueObject for DbhRow {}

impl DbhRow {
    pub fn new(dbh: impl Into<String>, trees: u64, volume: f64, units: Units) -> Self {
        Self {
            dbh: dbh.into(),
            trees,
            volume: sanitize(volume),
            units,
        }
    }

    pub fn tons(dbh: impl Into<String>, trees: u64, volume: f64) -> Self {
        Self::new(dbh, trees, volume, Units::Tons)
    }

    pub fn mbf(dbh: impl Into<String>, trees: u64, volume: f64) -> Self {
        Self::new(dbh, trees, volume, Units::Mbf)
    }

    /// A row with zero trees and zero volume carries no information.
    pub fn is_empty(&self) -> bool {
        self.trees == 0 && sanitize(self.volume) == 0.0
    }

    /// Volume that counts toward tonnage totals.
    pub fn tonnage(&self) -> f64 {
        match self.units {
            Units::Tons => sanitize(self.volume),
            Units::Mbf => 0.0,
        }
    }

    /// Volume recorded in board feet (kept separate from tonnage).
    pub fn board_feet(&self) -> f64 {
        match self.units {
            Units::Mbf => sanitize(self.volume),
            Units::Tons => 0.0,
        }
    }
}

/// A timber product (e.g. "Pine Sawtimber") within a stand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub dbh_breakdown: Vec<DbhRow>,
}

impl ValueObject for Product {}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            product: name.into(),
            dbh_breakdown: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: DbhRow) -> Self {
        self.dbh_breakdown.push(row);
        self
    }

    pub fn name(&self) -> &str {
        self.product.trim()
    }
}

/// A delineated sub-area of a property surveyed as one inventory unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stand {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub net_acres: f64,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ValueObject for Stand {}

impl Stand {
    pub fn new(name: impl Into<String>, net_acres: f64) -> Self {
        Self {
            name: name.into(),
            net_acres: sanitize(net_acres),
            products: Vec::new(),
        }
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    pub fn is_entire_tract(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case(ENTIRE_TRACT)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("the Entire Tract stand cannot coexist with discrete stands")]
    EntireTractWithStands,

    #[error("only one Entire Tract stand is allowed")]
    DuplicateEntireTract,

    #[error("stand selection is locked while in Entire Tract mode")]
    StandSelectorLocked,
}

/// How a cruise subdivides its property.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StandLayout {
    /// No stands recorded yet.
    Empty,
    /// Exactly one stand covering the whole property.
    EntireTract,
    /// One or more drawn harvest areas.
    Discrete(usize),
}

impl StandLayout {
    pub fn of(stands: &[Stand]) -> Result<Self, InventoryError> {
        let entire = stands.iter().filter(|s| s.is_entire_tract()).count();
        match (entire, stands.len()) {
            (0, 0) => Ok(StandLayout::Empty),
            (0, n) => Ok(StandLayout::Discrete(n)),
            (1, 1) => Ok(StandLayout::EntireTract),
            (1, _) => Err(InventoryError::EntireTractWithStands),
            _ => Err(InventoryError::DuplicateEntireTract),
        }
    }
}

/// Ordered list of stands making up a cruise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    stands: Vec<Stand>,
}

impl ValueObject for Inventory {}

impl Inventory {
    pub fn new(stands: Vec<Stand>) -> Self {
        Self { stands }
    }

    /// Build an Entire Tract cruise: one stand whose acreage is the property's.
    pub fn entire_tract(property_acreage: f64, products: Vec<Product>) -> Self {
        let mut stand = Stand::new(ENTIRE_TRACT, property_acreage);
        stand.products = products;
        Self { stands: vec![stand] }
    }

    pub fn stands(&self) -> &[Stand] {
        &self.stands
    }

    pub fn into_stands(self) -> Vec<Stand> {
        self.stands
    }

    pub fn is_empty(&self) -> bool {
        self.stands.is_empty()
    }

    pub fn layout(&self) -> Result<StandLayout, InventoryError> {
        StandLayout::of(&self.stands)
    }

    /// Add a discrete stand. Rejected once the cruise is in Entire Tract mode.
    pub fn add_stand(&mut self, stand: Stand) -> Result<(), InventoryError> {
        let layout = self.layout()?;
        match layout {
            StandLayout::EntireTract => Err(InventoryError::StandSelectorLocked),
            StandLayout::Discrete(_) if stand.is_entire_tract() => {
                Err(InventoryError::EntireTractWithStands)
            }
            StandLayout::Empty | StandLayout::Discrete(_) => {
                self.stands.push(stand);
                Ok(())
            }
        }
    }

    /// Validate the layout and enforce Entire Tract acreage.
    ///
    /// In Entire Tract mode the single stand's net acres always equal the
    /// property's acreage. Rows that carry no information are dropped.
    pub fn normalized(mut self, property_acreage: Option<f64>) -> Result<Self, InventoryError> {
        if self.layout()? == StandLayout::EntireTract {
            if let (Some(stand), Some(acres)) = (self.stands.first_mut(), property_acreage) {
                stand.net_acres = sanitize(acres);
            }
        }

        for stand in &mut self.stands {
            for product in &mut stand.products {
                product.dbh_breakdown.retain(|row| !row.is_empty());
            }
        }

        Ok(self)
    }
}
