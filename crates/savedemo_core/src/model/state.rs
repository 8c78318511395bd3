//! Persisted sphere state and its derived geometry.
//!
//! # Responsibility
//! - Define the per-document `(radius, height)` record.
//! - Derive the displayed sphere from that record.
//! - Repair out-of-band values arriving from persisted documents.
//!
//! # Invariants
//! - Values produced by UI interaction stay inside `[RADIUS_MIN, RADIUS_MAX]`.
//! - `derive_geometry` is pure: equal records yield equal spheres.

use serde::{Deserialize, Serialize};

/// Lower bound of the radius exposed by the panel controls.
pub const RADIUS_MIN: f64 = 1.0;
/// Upper bound of the radius exposed by the panel controls.
pub const RADIUS_MAX: f64 = 100.0;
/// Radius used for a fresh document.
pub const DEFAULT_RADIUS: f64 = 5.0;
/// Height (sphere center offset along Z) used for a fresh document.
pub const DEFAULT_HEIGHT: f64 = 10.0;

/// Point in document world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Sphere primitive added to the host document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point3,
    pub radius: f64,
}

/// Document-scoped plugin state.
///
/// Serialized by [`crate::codec`] into the document string table, so the
/// field names here are part of the persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Sphere radius. Accepts `Radius` for blobs written by older builds.
    #[serde(alias = "Radius")]
    pub radius: f64,
    /// Offset of the sphere center along the Z axis.
    #[serde(alias = "Height")]
    pub height: f64,
}

impl Default for StateRecord {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// What [`StateRecord::sanitized`] had to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Adjustments {
    pub radius_clamped: bool,
    pub radius_defaulted: bool,
    pub height_defaulted: bool,
}

impl Adjustments {
    pub fn any(self) -> bool {
        self.radius_clamped || self.radius_defaulted || self.height_defaulted
    }
}

impl StateRecord {
    pub fn new(radius: f64, height: f64) -> Self {
        Self { radius, height }
    }

    /// Builds the sphere displayed for this state.
    pub fn build_geometry(&self) -> Sphere {
        derive_geometry(self)
    }

    /// Returns a copy that is safe to display and edit.
    ///
    /// Non-finite fields fall back to their defaults and the radius is clamped
    /// into the control range. Used on every load from a document.
    pub fn sanitized(&self) -> (Self, Adjustments) {
        let mut adjustments = Adjustments::default();

        let radius = if !self.radius.is_finite() {
            adjustments.radius_defaulted = true;
            DEFAULT_RADIUS
        } else if self.radius < RADIUS_MIN || self.radius > RADIUS_MAX {
            adjustments.radius_clamped = true;
            clamp_radius(self.radius)
        } else {
            self.radius
        };

        let height = if self.height.is_finite() {
            self.height
        } else {
            adjustments.height_defaulted = true;
            DEFAULT_HEIGHT
        };

        (Self { radius, height }, adjustments)
    }
}

/// Derives the sphere for `state`: centered at `(0, 0, height)`.
///
/// Total for finite input. Rejecting NaN or negative radii is the caller's job.
pub fn derive_geometry(state: &StateRecord) -> Sphere {
    Sphere {
        center: Point3::new(0.0, 0.0, state.height),
        radius: state.radius,
    }
}

/// Clamps a finite radius into `[RADIUS_MIN, RADIUS_MAX]`.
pub fn clamp_radius(radius: f64) -> f64 {
    radius.clamp(RADIUS_MIN, RADIUS_MAX)
}

#[cfg(test)]
mod tests {
    use super::{derive_geometry, Point3, StateRecord, DEFAULT_HEIGHT, DEFAULT_RADIUS, RADIUS_MAX};

    #[test]
    fn default_matches_fresh_document_values() {
        let state = StateRecord::default();
        assert_eq!(state.radius, DEFAULT_RADIUS);
        assert_eq!(state.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn geometry_is_centered_on_height_axis() {
        let sphere = derive_geometry(&StateRecord::new(30.0, 10.0));
        assert_eq!(sphere.center, Point3::new(0.0, 0.0, 10.0));
        assert_eq!(sphere.radius, 30.0);
        assert_eq!(sphere, StateRecord::new(30.0, 10.0).build_geometry());
    }

    #[test]
    fn sanitized_keeps_in_range_values() {
        let (state, adjustments) = StateRecord::new(42.5, -3.0).sanitized();
        assert_eq!(state, StateRecord::new(42.5, -3.0));
        assert!(!adjustments.any());
    }

    #[test]
    fn sanitized_clamps_out_of_band_radius() {
        let (state, adjustments) = StateRecord::new(250.0, 10.0).sanitized();
        assert_eq!(state.radius, RADIUS_MAX);
        assert!(adjustments.radius_clamped);

        let (state, _) = StateRecord::new(-4.0, 10.0).sanitized();
        assert_eq!(state.radius, 1.0);
    }

    #[test]
    fn sanitized_replaces_non_finite_fields() {
        let (state, adjustments) = StateRecord::new(f64::NAN, f64::INFINITY).sanitized();
        assert_eq!(state, StateRecord::default());
        assert!(adjustments.radius_defaulted);
        assert!(adjustments.height_defaulted);
    }
}
