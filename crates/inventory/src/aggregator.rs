//! Two-pass volume roll-up.
//!
//! Pass 1 sums DBH rows into per-product totals for each stand. Pass 2 folds
//! per-product tonnage into the five canonical buckets. The grand total is the
//! sum of the buckets, so a product that is not in the category table still
//! shows up in its stand's volume but never in the grand total.

use serde::{Deserialize, Serialize};

use crate::category::ProductCategory;
use crate::model::{Stand, StandLayout};
use crate::numeric::sanitize;

/// Totals of one product within one stand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTotals {
    pub product: String,
    pub category: Option<ProductCategory>,
    pub trees: u64,
    /// Sum of Tons-unit rows only.
    pub tons: f64,
    /// Sum of MBF-unit rows (reported, never folded into tonnage).
    pub mbf: f64,
    pub trees_per_acre: f64,
    pub tons_per_acre: f64,
}

/// Totals of one stand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandTotals {
    pub name: String,
    pub net_acres: f64,
    pub trees: u64,
    pub tons: f64,
    pub mbf: f64,
    pub trees_per_acre: f64,
    pub tons_per_acre: f64,
    pub products: Vec<ProductTotals>,
}

/// Tonnage per canonical bucket.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub pine_sawtimber: f64,
    pub pine_chip_n_saw: f64,
    pub pine_pulpwood: f64,
    pub hardwood_sawtimber: f64,
    pub hardwood_pulpwood: f64,
}

impl CategoryTotals {
    pub fn get(&self, category: ProductCategory) -> f64 {
        match category {
            ProductCategory::PineSawtimber => self.pine_sawtimber,
            ProductCategory::PineChipNSaw => self.pine_chip_n_saw,
            ProductCategory::PinePulpwood => self.pine_pulpwood,
            ProductCategory::HardwoodSawtimber => self.hardwood_sawtimber,
            ProductCategory::HardwoodPulpwood => self.hardwood_pulpwood,
        }
    }

    fn slot(&mut self, category: ProductCategory) -> &mut f64 {
        match category {
            ProductCategory::PineSawtimber => &mut self.pine_sawtimber,
            ProductCategory::PineChipNSaw => &mut self.pine_chip_n_saw,
            ProductCategory::PinePulpwood => &mut self.pine_pulpwood,
            ProductCategory::HardwoodSawtimber => &mut self.hardwood_sawtimber,
            ProductCategory::HardwoodPulpwood => &mut self.hardwood_pulpwood,
        }
    }

    pub fn add(&mut self, category: ProductCategory, tons: f64) {
        *self.slot(category) += sanitize(tons);
    }

    /// Sum of the five buckets.
    pub fn total(&self) -> f64 {
        ProductCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// Full aggregation result for a cruise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub stands: Vec<StandTotals>,
    pub categories: CategoryTotals,
    /// Sum of the five category buckets (unmapped products excluded).
    pub grand_total_tons: f64,
    /// Trees across every stand and product.
    pub total_trees: u64,
    /// Acreage used for tract-level per-acre figures.
    pub tract_acres: f64,
    pub grand_tons_per_acre: f64,
}

impl InventorySummary {
    /// Per-stand tonnage, including unmapped products.
    pub fn stand_tons(&self) -> f64 {
        self.stands.iter().map(|s| s.tons).sum()
    }
}

/// `value / acres`, or 0 when acreage is zero or unknown.
pub fn per_acre(value: f64, acres: f64) -> f64 {
    let acres = sanitize(acres);
    if acres > 0.0 { value / acres } else { 0.0 }
}

/// Aggregate a cruise.
///
/// `property_acreage` is the authoritative parcel acreage. It overrides the
/// stand's net acres in Entire Tract mode and is the denominator of the
/// tract-level per-acre figure; without it, the sum of stand acres is used.
pub fn aggregate(stands: &[Stand], property_acreage: Option<f64>) -> InventorySummary {
    let entire_tract = matches!(StandLayout::of(stands), Ok(StandLayout::EntireTract));

    let stand_totals: Vec<StandTotals> = stands
        .iter()
        .map(|stand| {
            let acres = match (entire_tract, property_acreage) {
                (true, Some(acres)) => sanitize(acres),
                _ => sanitize(stand.net_acres),
            };
            roll_up_stand(stand, acres)
        })
        .collect();

    let mut categories = CategoryTotals::default();
    for product in stand_totals.iter().flat_map(|s| s.products.iter()) {
        if let Some(category) = product.category {
            categories.add(category, product.tons);
        }
    }

    let grand_total_tons = categories.total();
    let tract_acres = property_acreage
        .map(sanitize)
        .unwrap_or_else(|| stand_totals.iter().map(|s| s.net_acres).sum());

    InventorySummary {
        total_trees: stand_totals.iter().fold(0u64, |acc, s| acc.saturating_add(s.trees)),
        grand_tons_per_acre: per_acre(grand_total_tons, tract_acres),
        stands: stand_totals,
        categories,
        grand_total_tons,
        tract_acres,
    }
}

fn roll_up_stand(stand: &Stand, acres: f64) -> StandTotals {
    // Group rows by product name, first occurrence wins the position.
    let mut products: Vec<ProductTotals> = Vec::new();
    for product in &stand.products {
        let name = product.name();
        let idx = match products.iter().position(|p| p.product == name) {
            Some(idx) => idx,
            None => {
                products.push(ProductTotals {
                    product: name.to_string(),
                    category: ProductCategory::classify(name),
                    trees: 0,
                    tons: 0.0,
                    mbf: 0.0,
                    trees_per_acre: 0.0,
                    tons_per_acre: 0.0,
                });
                products.len() - 1
            }
        };

        let totals = &mut products[idx];
        for row in &product.dbh_breakdown {
            totals.trees = totals.trees.saturating_add(row.trees);
            totals.tons += row.tonnage();
            totals.mbf += row.board_feet();
        }
    }

    for p in &mut products {
        p.trees_per_acre = per_acre(p.trees as f64, acres);
        p.tons_per_acre = per_acre(p.tons, acres);
    }

    // Tree counts saturate at u64::MAX.
    let trees = products.iter().fold(0u64, |acc, p| acc.saturating_add(p.trees));
    let tons: f64 = products.iter().map(|p| p.tons).sum();
    let mbf: f64 = products.iter().map(|p| p.mbf).sum();

    StandTotals {
        name: stand.name.clone(),
        net_acres: acres,
        trees,
        tons,
        mbf,
        trees_per_acre: per_acre(trees as f64, acres),
        tons_per_acre: per_acre(tons, acres),
        products,
    }
}
