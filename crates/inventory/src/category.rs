use serde::{Deserialize, Serialize};

/// The five canonical grand-total buckets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductCategory {
    PineSawtimber,
    PineChipNSaw,
    PinePulpwood,
    HardwoodSawtimber,
    HardwoodPulpwood,
}

/// Species-specific products folded into a canonical bucket.
const FOLDED_PRODUCTS: &[(&str, ProductCategory)] = &[
    ("Red Oak Sawtimber", ProductCategory::HardwoodSawtimber),
    ("White Oak Sawtimber", ProductCategory::HardwoodSawtimber),
    ("Gum Sawtimber", ProductCategory::HardwoodSawtimber),
    ("Ash Sawtimber", ProductCategory::HardwoodSawtimber),
    ("Hickory Sawtimber", ProductCategory::HardwoodSawtimber),
    ("Misc. Hardwood Sawtimber", ProductCategory::HardwoodSawtimber),
    ("Cypress Sawtimber", ProductCategory::HardwoodSawtimber),
    ("Pine Topwood", ProductCategory::PinePulpwood),
];

/// Product names offered when entering a cruise (canonical first, then species).
pub const PRODUCT_CATALOG: &[&str] = &[
    "Pine Sawtimber",
    "Pine Chip-n-Saw",
    "Pine Pulpwood",
    "Pine Topwood",
    "Hardwood Sawtimber",
    "Red Oak Sawtimber",
    "White Oak Sawtimber",
    "Gum Sawtimber",
    "Ash Sawtimber",
    "Hickory Sawtimber",
    "Misc. Hardwood Sawtimber",
    "Cypress Sawtimber",
    "Hardwood Pulpwood",
];

/// Fixed DBH class labels (inches). Rows may also carry free-text labels.
pub const DBH_CLASSES: &[&str] = &[
    "6", "8", "10", "12", "14", "16", "18", "20", "22", "24", "26", "28", "30+",
];

impl ProductCategory {
    pub const ALL: [ProductCategory; 5] = [
        ProductCategory::PineSawtimber,
        ProductCategory::PineChipNSaw,
        ProductCategory::PinePulpwood,
        ProductCategory::HardwoodSawtimber,
        ProductCategory::HardwoodPulpwood,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::PineSawtimber => "Pine Sawtimber",
            ProductCategory::PineChipNSaw => "Pine Chip-n-Saw",
            ProductCategory::PinePulpwood => "Pine Pulpwood",
            ProductCategory::HardwoodSawtimber => "Hardwood Sawtimber",
            ProductCategory::HardwoodPulpwood => "Hardwood Pulpwood",
        }
    }

    /// Bucket a product name, or `None` if it is neither canonical nor mapped.
    ///
    /// Matching ignores surrounding whitespace and ASCII case.
    pub fn classify(product_name: &str) -> Option<Self> {
        let name = product_name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(name))
            .or_else(|| {
                FOLDED_PRODUCTS
                    .iter()
                    .find(|(folded, _)| folded.eq_ignore_ascii_case(name))
                    .map(|(_, c)| *c)
            })
    }
}

impl core::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_map_to_themselves() {
        for c in ProductCategory::ALL {
            assert_eq!(ProductCategory::classify(c.label()), Some(c));
        }
    }

    #[test]
    fn species_fold_into_buckets() {
        assert_eq!(
            ProductCategory::classify("Red Oak Sawtimber"),
            Some(ProductCategory::HardwoodSawtimber)
        );
        assert_eq!(
            ProductCategory::classify(" cypress sawtimber "),
            Some(ProductCategory::HardwoodSawtimber)
        );
        assert_eq!(
            ProductCategory::classify("Pine Topwood"),
            Some(ProductCategory::PinePulpwood)
        );
    }

    #[test]
    fn unknown_products_are_unmapped() {
        assert_eq!(ProductCategory::classify("Poles"), None);
        assert_eq!(ProductCategory::classify(""), None);
    }

    #[test]
    fn catalog_entries_all_classify() {
        for name in PRODUCT_CATALOG {
            assert!(ProductCategory::classify(name).is_some(), "{name} unmapped");
        }
    }
}
