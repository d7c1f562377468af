//! Chamber geometry and field

use glam::DVec3;

use crate::error::{Error, Result};

/// The bounded volume particles move through.
///
/// The chamber is immutable once built. Its dimensions are descriptive: they
/// give the scene a characteristic size but particles are never clamped to
/// them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chamber {
    dimensions: DVec3,
    magnetic_field: DVec3,
    friction: f64,
}

impl Chamber {
    /// Build a chamber, validating every input.
    ///
    /// `dimensions` must be finite and positive, `magnetic_field` finite and
    /// `friction` in `[0, 1)`.
    pub fn new(dimensions: DVec3, magnetic_field: DVec3, friction: f64) -> Result<Self> {
        if !dimensions.is_finite() || dimensions.min_element() <= 0.0 {
            return Err(Error::invalid(format!(
                "chamber dimensions must be finite and > 0, got {dimensions}"
            )));
        }
        if !magnetic_field.is_finite() {
            return Err(Error::invalid(format!(
                "magnetic field must be finite, got {magnetic_field}"
            )));
        }
        if !friction.is_finite() || !(0.0..1.0).contains(&friction) {
            return Err(Error::invalid(format!(
                "friction must be in [0, 1), got {friction}"
            )));
        }
        Ok(Self {
            dimensions,
            magnetic_field,
            friction,
        })
    }

    /// Same as [`Chamber::new`] from plain arrays
    pub fn from_arrays(
        dimensions: [f64; 3],
        magnetic_field: [f64; 3],
        friction: f64,
    ) -> Result<Self> {
        Self::new(
            DVec3::from_array(dimensions),
            DVec3::from_array(magnetic_field),
            friction,
        )
    }

    pub fn dimensions(&self) -> DVec3 {
        self.dimensions
    }

    pub fn magnetic_field(&self) -> DVec3 {
        self.magnetic_field
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Characteristic size of the chamber: its largest extent
    pub fn size(&self) -> f64 {
        self.dimensions.max_element()
    }
}
