//! Fits newly loaded objects into a predictable frame: centered on the
//! origin in X/Z, resting on the ground plane, and sized to a fixed span.

use glam::Vec3;
use tracing::debug;

use crate::config::TARGET_SPAN;
use crate::object::SceneObject;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialNormalizer {
    pub target_span: f32,
}

impl SpatialNormalizer {
    pub fn new(target_span: f32) -> Self {
        let target_span = if target_span.is_finite() && target_span > 0.0 {
            target_span
        } else {
            TARGET_SPAN
        };
        Self { target_span }
    }

    /// Scale so the largest extent equals the target span, then recenter.
    /// Returns the base scale.
    pub fn align_initial(&self, object: &mut SceneObject) -> f32 {
        let extent = object.local_bounds().max_extent();
        let extent = if extent.is_finite() && extent > 0.0 {
            extent
        } else {
            1.0
        };
        let base_scale = self.target_span / extent;

        object.transform.translation = Vec3::ZERO;
        object.transform.scale = base_scale;
        self.recenter(object);

        debug!(
            "Aligned object {:?}: extent {:.3}, base scale {:.4}",
            object.id(),
            extent,
            base_scale
        );
        base_scale
    }

    /// Center X/Z on the origin and put the lowest point on y = 0.
    pub fn recenter(&self, object: &mut SceneObject) {
        let bounds = object.world_bounds();
        let center = bounds.center();
        let shift = Vec3::new(center.x, bounds.min.y, center.z);
        if shift.is_finite() {
            object.transform.translation -= shift;
        }
    }
}

impl Default for SpatialNormalizer {
    fn default() -> Self {
        Self::new(TARGET_SPAN)
    }
}
