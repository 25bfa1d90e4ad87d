use serde::{Deserialize, Serialize};

use timberline_inventory::{Stand, aggregate, per_acre};

/// Doyle conversion divisor for pine sawtimber.
pub const PINE_TONS_PER_MBF: f64 = 8.0;

/// Doyle conversion divisor for every other (hardwood) sawtimber product.
pub const HARDWOOD_TONS_PER_MBF: f64 = 9.0;

/// Sawtimber is any product whose name contains "sawtimber" (any case).
pub fn is_sawtimber(product_name: &str) -> bool {
    product_name.to_ascii_lowercase().contains("sawtimber")
}

/// Tons per thousand board feet for a product, keyed by its original name.
pub fn tons_per_mbf(product_name: &str) -> f64 {
    if product_name.to_ascii_lowercase().contains("pine") {
        PINE_TONS_PER_MBF
    } else {
        HARDWOOD_TONS_PER_MBF
    }
}

pub fn tons_to_mbf(product_name: &str, tons: f64) -> f64 {
    tons / tons_per_mbf(product_name)
}

/// Per-product line of a stand detail table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub product: String,
    pub trees: u64,
    pub volume: f64,
    pub trees_per_acre: f64,
    pub volume_per_acre: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandDetail {
    pub name: String,
    pub net_acres: f64,
    pub rows: Vec<DetailRow>,
    pub total: DetailRow,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Sawtimber,
    Pulpwood,
}

/// One product line of the sawtimber or pulpwood table (summed across stands).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub product: String,
    pub tons: f64,
    pub tons_per_acre: f64,
    /// Board-foot equivalent; only present in the sawtimber table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbf: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTable {
    pub kind: TableKind,
    pub rows: Vec<SummaryRow>,
    pub total_tons: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_mbf: Option<f64>,
}

impl SummaryTable {
    fn empty(kind: TableKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
            total_tons: 0.0,
            total_mbf: match kind {
                TableKind::Sawtimber => Some(0.0),
                TableKind::Pulpwood => None,
            },
        }
    }

    fn add(&mut self, product: &str, tons: f64) {
        match self.rows.iter_mut().find(|r| r.product == product) {
            Some(row) => row.tons += tons,
            None => self.rows.push(SummaryRow {
                product: product.to_string(),
                tons,
                tons_per_acre: 0.0,
                mbf: None,
            }),
        }
    }

    fn finish(&mut self, tract_acres: f64) {
        for row in &mut self.rows {
            row.tons_per_acre = per_acre(row.tons, tract_acres);
            if self.kind == TableKind::Sawtimber {
                row.mbf = Some(tons_to_mbf(&row.product, row.tons));
            }
        }
        self.total_tons = self.rows.iter().map(|r| r.tons).sum();
        if self.kind == TableKind::Sawtimber {
            self.total_mbf = Some(self.rows.iter().filter_map(|r| r.mbf).sum());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrandTotal {
    pub tons: f64,
    pub tons_per_acre: f64,
    pub mbf: f64,
}

/// Read-only cruise report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CruiseReport {
    pub tract_acres: f64,
    pub stands: Vec<StandDetail>,
    pub sawtimber: SummaryTable,
    pub pulpwood: SummaryTable,
    pub grand_total: GrandTotal,
}

/// Build the report for a stored inventory.
///
/// Empty inventory produces empty tables with zero totals.
pub fn summarize(stands: &[Stand], property_acreage: Option<f64>) -> CruiseReport {
    let totals = aggregate(stands, property_acreage);

    let mut sawtimber = SummaryTable::empty(TableKind::Sawtimber);
    let mut pulpwood = SummaryTable::empty(TableKind::Pulpwood);

    let stands = totals
        .stands
        .iter()
        .map(|stand| {
            let rows: Vec<DetailRow> = stand
                .products
                .iter()
                .map(|p| {
                    if is_sawtimber(&p.product) {
                        sawtimber.add(&p.product, p.tons);
                    } else {
                        pulpwood.add(&p.product, p.tons);
                    }

                    DetailRow {
                        product: p.product.clone(),
                        trees: p.trees,
                        volume: p.tons,
                        trees_per_acre: p.trees_per_acre,
                        volume_per_acre: p.tons_per_acre,
                    }
                })
                .collect();

            StandDetail {
                name: stand.name.clone(),
                net_acres: stand.net_acres,
                total: DetailRow {
                    product: "Total".to_string(),
                    trees: stand.trees,
                    volume: stand.tons,
                    trees_per_acre: stand.trees_per_acre,
                    volume_per_acre: stand.tons_per_acre,
                },
                rows,
            }
        })
        .collect();

    sawtimber.finish(totals.tract_acres);
    pulpwood.finish(totals.tract_acres);

    let grand_tons = sawtimber.total_tons + pulpwood.total_tons;

    CruiseReport {
        tract_acres: totals.tract_acres,
        stands,
        grand_total: GrandTotal {
            tons: grand_tons,
            tons_per_acre: per_acre(grand_tons, totals.tract_acres),
            mbf: sawtimber.total_mbf.unwrap_or(0.0),
        },
        sawtimber,
        pulpwood,
    }
}
