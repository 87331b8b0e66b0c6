//! Scene placement settings.

use serde::{Deserialize, Serialize};

/// Largest side of a freshly installed object, in world units.
pub const TARGET_SPAN: f32 = 18.0;
pub const MIN_SCALE_MULTIPLIER: f32 = 0.01;
pub const MAX_SCALE_MULTIPLIER: f32 = 100.0;

/// Scene placement settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub target_span: f32,
    /// Length of each pose-marker axis in local units.
    pub marker_axis_length: f32,
    pub min_scale_multiplier: f32,
    pub max_scale_multiplier: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            target_span: TARGET_SPAN,
            marker_axis_length: 0.1,
            min_scale_multiplier: MIN_SCALE_MULTIPLIER,
            max_scale_multiplier: MAX_SCALE_MULTIPLIER,
        }
    }
}
