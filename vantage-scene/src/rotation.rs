//! Quarter-turn rotation and user scale for the active object.

use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SceneConfig;
use crate::normalizer::SpatialNormalizer;
use crate::object::SceneObject;

/// A local object axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(format!("unknown axis '{other}', expected x, y or z")),
        }
    }
}

/// Scale and rotation bookkeeping for the active object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelTransformState {
    pub base_scale: f32,
    pub user_scale_multiplier: f32,
    /// Quarter turns applied per axis, mod 4.
    pub quarter_turns: [u8; 3],
}

impl ModelTransformState {
    pub fn turns(&self, axis: Axis) -> u8 {
        self.quarter_turns[axis.index()]
    }

    pub fn rotation_radians(&self, axis: Axis) -> f32 {
        self.turns(axis) as f32 * FRAC_PI_2
    }

    pub fn rotation_degrees(&self, axis: Axis) -> f32 {
        self.turns(axis) as f32 * 90.0
    }

    pub fn effective_scale(&self) -> f32 {
        self.base_scale * self.user_scale_multiplier
    }
}

impl Default for ModelTransformState {
    fn default() -> Self {
        Self {
            base_scale: 1.0,
            user_scale_multiplier: 1.0,
            quarter_turns: [0; 3],
        }
    }
}

/// Applies user rotation and scale to the active object, keeping it grounded.
#[derive(Debug, Clone)]
pub struct ModelRotationController {
    normalizer: SpatialNormalizer,
    state: ModelTransformState,
    min_multiplier: f32,
    max_multiplier: f32,
}

impl ModelRotationController {
    pub fn new(config: &SceneConfig) -> Self {
        let min_multiplier = config.min_scale_multiplier.max(f32::MIN_POSITIVE);
        Self {
            normalizer: SpatialNormalizer::new(config.target_span),
            state: ModelTransformState::default(),
            min_multiplier,
            max_multiplier: config.max_scale_multiplier.max(min_multiplier),
        }
    }

    pub fn state(&self) -> &ModelTransformState {
        &self.state
    }

    pub fn normalizer(&self) -> &SpatialNormalizer {
        &self.normalizer
    }

    /// Start fresh bookkeeping for a newly installed object and fit it.
    pub fn install(&mut self, object: &mut SceneObject) {
        let base_scale = self.normalizer.align_initial(object);
        self.state = ModelTransformState {
            base_scale,
            ..ModelTransformState::default()
        };
    }

    /// Turn the object 90 degrees about its own local `axis`.
    pub fn rotate(&mut self, object: &mut SceneObject, axis: Axis) {
        let turn = Quat::from_axis_angle(axis.unit(), FRAC_PI_2);
        object.transform.rotation = (object.transform.rotation * turn).normalize();
        let turns = &mut self.state.quarter_turns[axis.index()];
        *turns = (*turns + 1) % 4;
        self.normalizer.recenter(object);
        debug!(
            "Rotated object {:?} about {}: {} deg",
            object.id(),
            axis,
            self.state.rotation_degrees(axis)
        );
    }

    /// Set the user scale multiplier. Non-finite values are ignored.
    pub fn set_scale_multiplier(&mut self, object: &mut SceneObject, multiplier: f32) {
        if !multiplier.is_finite() {
            return;
        }
        self.state.user_scale_multiplier = multiplier.clamp(self.min_multiplier, self.max_multiplier);
        object.transform.scale = self.state.effective_scale();
        self.normalizer.recenter(object);
    }

    /// Zero the rotation bookkeeping. The object's orientation is left alone.
    pub fn reset_bookkeeping(&mut self) {
        self.state.quarter_turns = [0; 3];
    }

    /// Forget the current object entirely.
    pub fn clear(&mut self) {
        self.state = ModelTransformState::default();
    }
}

impl Default for ModelRotationController {
    fn default() -> Self {
        Self::new(&SceneConfig::default())
    }
}
