//! Running per-band statistics for a single bus stop.

use serde::Serialize;

use crate::bands::BandConfig;

/// Final statistics for one (stop, band) cell. `mean_price` is `None` when
/// the band saw no records; a band with zero properties must not report a
/// zero average, which would be indistinguishable from a genuinely free
/// listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandStatistics {
    pub count: usize,
    pub mean_price: Option<f64>,
    pub mean_price_per_area: Option<f64>,
}

#[derive(Debug, Default, Clone)]
struct BandAccumulator {
    count: usize,
    price_sum: f64,
    price_per_area_sum: f64,
    price_per_area_count: usize,
}

/// Accumulates per-band count and price sums for one stop. One cell per
/// configured band, created up front so `finalize` always yields a full
/// band-ordered sequence.
#[derive(Debug, Clone)]
pub struct Aggregator {
    cells: Vec<BandAccumulator>,
    skipped: usize,
    unassigned: usize,
}

impl Aggregator {
    pub fn new(config: &BandConfig) -> Self {
        Self {
            cells: vec![BandAccumulator::default(); config.len()],
            skipped: 0,
            unassigned: 0,
        }
    }

    /// Records one property in `band_index`. Each call represents exactly one
    /// record; there is no deduplication.
    pub fn record(&mut self, band_index: usize, price: f64, price_per_area: Option<f64>) {
        let cell = &mut self.cells[band_index];
        cell.count += 1;
        cell.price_sum += price;
        if let Some(ppa) = price_per_area {
            cell.price_per_area_sum += ppa;
            cell.price_per_area_count += 1;
        }
    }

    /// Counts a record that fell outside every configured band.
    pub fn record_unassigned(&mut self) {
        self.unassigned += 1;
    }

    /// Counts a record excluded for invalid coordinates or missing price.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn unassigned(&self) -> usize {
        self.unassigned
    }

    /// Produces one [`BandStatistics`] per configured band, in band order.
    pub fn finalize(&self) -> Vec<BandStatistics> {
        self.cells
            .iter()
            .map(|cell| BandStatistics {
                count: cell.count,
                mean_price: if cell.count == 0 {
                    None
                } else {
                    Some(cell.price_sum / cell.count as f64)
                },
                mean_price_per_area: if cell.price_per_area_count == 0 {
                    None
                } else {
                    Some(cell.price_per_area_sum / cell.price_per_area_count as f64)
                },
            })
            .collect()
    }
}
