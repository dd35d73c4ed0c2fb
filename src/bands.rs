//! Distance bands and the classifier mapping a distance to a band index.
//!
//! Bands are half-open `[lower, upper)` intervals in meters, ordered and
//! non-overlapping. The final band may be unbounded above. A distance at an
//! exact boundary belongs to the upper band (lower-inclusive).

use crate::error::AnalysisError;

/// A single half-open distance interval. `upper == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceBand {
    pub lower: f64,
    pub upper: Option<f64>,
}

impl DistanceBand {
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.lower
            && match self.upper {
                Some(upper) => distance < upper,
                None => true,
            }
    }

    /// Human-readable label, e.g. `"0-500m"` or `"2000m+"`.
    pub fn label(&self) -> String {
        match self.upper {
            Some(upper) => format!("{}-{}m", self.lower, upper),
            None => format!("{}m+", self.lower),
        }
    }
}

/// Validated, ordered set of distance bands. Built once at startup from the
/// configured boundaries and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct BandConfig {
    bands: Vec<DistanceBand>,
}

impl BandConfig {
    /// Builds bands from ascending boundaries in meters: `[500, 1000, 2000]`
    /// yields `[0,500)`, `[500,1000)`, `[1000,2000)`. With `open_ended` an
    /// extra unbounded `[2000,∞)` band is appended.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] when boundaries are
    /// empty, non-positive, non-finite, or not strictly increasing.
    pub fn from_boundaries(boundaries: &[f64], open_ended: bool) -> Result<Self, AnalysisError> {
        if boundaries.is_empty() {
            return Err(AnalysisError::InvalidConfiguration(
                "at least one band boundary is required".to_string(),
            ));
        }

        let mut bands = Vec::with_capacity(boundaries.len() + 1);
        let mut lower = 0.0;

        for &upper in boundaries {
            if !upper.is_finite() || upper <= 0.0 {
                return Err(AnalysisError::InvalidConfiguration(format!(
                    "band boundary {upper} is not a positive finite number"
                )));
            }
            if upper <= lower {
                return Err(AnalysisError::InvalidConfiguration(format!(
                    "band boundaries must be strictly increasing ({upper} after {lower})"
                )));
            }
            bands.push(DistanceBand {
                lower,
                upper: Some(upper),
            });
            lower = upper;
        }

        if open_ended {
            bands.push(DistanceBand { lower, upper: None });
        }

        Ok(Self { bands })
    }

    /// Returns the index of the band containing `distance`, or `None` when it
    /// falls beyond the last bounded band. Bands are few, so a linear scan is
    /// adequate.
    pub fn classify(&self, distance: f64) -> Option<usize> {
        self.bands.iter().position(|b| b.contains(distance))
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn bands(&self) -> &[DistanceBand] {
        &self.bands
    }
}
