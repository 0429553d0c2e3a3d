//! Spatial partitioning of the map's north-south axis into weather bands.
//!
//! ```text
//! --- map_max ---
//!  band 0
//!  band 1
//!  ...
//!  band N-1
//! --- map_min ---
//! ```
//!
//! Every band is `band_height` tall and starts `step = (map_max - map_min) / N`
//! below the previous one. When `band_height` exceeds `step` adjacent bands
//! overlap, and when it is smaller they leave gaps. Both are part of the map
//! layout and are kept as-is; positions in a gap resolve to band 0.

use serde::{Deserialize, Serialize};
use tracing::debug;
use weathervane_types::Position;

use crate::error::WorldError;

/// A contiguous span of the map's `y` axis tied to one rotation slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (exclusive).
    pub max: f64,
}

impl Band {
    /// Whether `y` falls inside `[min, max)`.
    pub const fn contains(&self, y: f64) -> bool {
        y >= self.min && y < self.max
    }
}

/// The parameters a grid is generated from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of bands.
    pub divisions: u32,
    /// Southernmost map coordinate.
    pub map_min: f64,
    /// Northernmost map coordinate; band 0 ends here.
    pub map_max: f64,
    /// Height of every band.
    pub band_height: f64,
}

/// Lay out `divisions` bands from `map_max` downwards.
///
/// Band `i` spans `[map_max - band_height - i*step, map_max - i*step]`.
/// Returns an empty layout when `divisions` is zero.
pub fn generate_grid(divisions: u32, map_min: f64, map_max: f64, band_height: f64) -> Vec<Band> {
    if divisions == 0 {
        return Vec::new();
    }
    let step = (map_max - map_min) / f64::from(divisions);
    (0..divisions)
        .map(|i| {
            let top = step.mul_add(-f64::from(i), map_max);
            Band {
                min: top - band_height,
                max: top,
            }
        })
        .collect()
}

/// Index of the first band containing `y`, or `0` when none does.
pub fn resolve_band(y: f64, bands: &[Band]) -> usize {
    bands.iter().position(|band| band.contains(y)).unwrap_or(0)
}

/// A validated band layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    spec: GridSpec,
    bands: Vec<Band>,
}

impl Grid {
    /// Generate a grid after checking the parameters describe a real map.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGrid`] when there are no divisions, the
    /// bounds are inverted or non-finite, or the band height is not positive.
    pub fn new(spec: GridSpec) -> Result<Self, WorldError> {
        if spec.divisions == 0 {
            return Err(WorldError::InvalidGrid {
                reason: "divisions must be at least 1".to_owned(),
            });
        }
        if !spec.map_min.is_finite() || !spec.map_max.is_finite() || spec.map_max <= spec.map_min {
            return Err(WorldError::InvalidGrid {
                reason: format!(
                    "map bounds must be finite with max > min (min {}, max {})",
                    spec.map_min, spec.map_max
                ),
            });
        }
        if !spec.band_height.is_finite() || spec.band_height <= 0.0 {
            return Err(WorldError::InvalidGrid {
                reason: format!("band height must be positive (got {})", spec.band_height),
            });
        }

        let bands = generate_grid(spec.divisions, spec.map_min, spec.map_max, spec.band_height);
        debug!(
            divisions = spec.divisions,
            map_min = spec.map_min,
            map_max = spec.map_max,
            band_height = spec.band_height,
            "Weather grid generated"
        );
        Ok(Self { spec, bands })
    }

    /// The parameters this grid was generated from.
    pub const fn spec(&self) -> GridSpec {
        self.spec
    }

    /// All bands, top of the map first.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Always `false` for a validated grid.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Band for an entity, falling back to band 0 when the position is
    /// unknown or outside every band.
    pub fn resolve(&self, position: Option<&Position>) -> usize {
        position.map_or(0, |pos| resolve_band(pos.y, &self.bands))
    }
}
