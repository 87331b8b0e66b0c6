//! Free-flight camera simulation.
//!
//! All per-frame state lives in [`CameraState`]; [`advance`] is a pure step
//! from one state to the next. Nothing here fails: extreme input saturates
//! against the pitch limit, the zoom-distance clamp and the frame-time cap.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Tunables for the flight camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Radians per pixel of pointer drag.
    pub look_sensitivity: f32,
    pub pitch_limit: f32,
    /// Ground-plane speed in units per second.
    pub move_speed: f32,
    pub vertical_speed: f32,
    /// Velocity blend rate while a direction is held.
    pub acceleration: f32,
    /// Velocity blend rate once input is released.
    pub deceleration: f32,
    /// Units per wheel delta unit.
    pub zoom_speed: f32,
    pub min_zoom_distance: f32,
    pub max_zoom_distance: f32,
    pub default_position: Vec3,
    pub default_yaw: f32,
    pub default_pitch: f32,
    /// Longest frame step simulated at once, in seconds.
    pub max_frame_dt: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            look_sensitivity: 0.0025,
            pitch_limit: std::f32::consts::FRAC_PI_2 - 0.01,
            move_speed: 12.0,
            vertical_speed: 8.0,
            acceleration: 10.0,
            deceleration: 6.0,
            zoom_speed: 0.02,
            min_zoom_distance: 2.0,
            max_zoom_distance: 250.0,
            default_position: Vec3::new(0.0, 6.0, 28.0),
            default_yaw: 0.0,
            default_pitch: -0.2,
            max_frame_dt: 0.1,
        }
    }
}

/// A single movement channel bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Held movement keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MovementIntent {
    pub fn set(&mut self, movement: Movement, held: bool) {
        let flag = match movement {
            Movement::Forward => &mut self.forward,
            Movement::Backward => &mut self.backward,
            Movement::Left => &mut self.left,
            Movement::Right => &mut self.right,
            Movement::Up => &mut self.up,
            Movement::Down => &mut self.down,
        };
        *flag = held;
    }

    pub fn any(&self) -> bool {
        *self != Self::default()
    }

    /// Unit direction in camera-local XZ (-Z forward), or zero.
    pub fn planar_direction(&self) -> Vec3 {
        let x = axis(self.right, self.left);
        let z = axis(self.backward, self.forward);
        Vec3::new(x, 0.0, z).normalize_or_zero()
    }

    /// -1, 0 or 1 for the vertical channel.
    pub fn vertical_direction(&self) -> f32 {
        axis(self.up, self.down)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    (positive as i8 - negative as i8) as f32
}

/// Pointer drag tracking for look input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDrag {
    pub active: bool,
    pub last_x: f32,
    pub last_y: f32,
    pub pointer_id: u64,
}

impl PointerDrag {
    pub fn begin(&mut self, pointer_id: u64, x: f32, y: f32) {
        *self = Self {
            active: true,
            last_x: x,
            last_y: y,
            pointer_id,
        };
    }

    /// Movement since the last sample, if this pointer owns the drag.
    pub fn track(&mut self, pointer_id: u64, x: f32, y: f32) -> Option<Vec2> {
        if !self.active || self.pointer_id != pointer_id || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let delta = Vec2::new(x - self.last_x, y - self.last_y);
        self.last_x = x;
        self.last_y = y;
        Some(delta)
    }

    pub fn end(&mut self, pointer_id: u64) {
        if self.pointer_id == pointer_id {
            self.active = false;
        }
    }
}

/// Complete state of the flight camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Rotation around world Y, in radians.
    pub yaw: f32,
    /// Rotation around the yawed X axis, in radians.
    pub pitch: f32,
    pub velocity: Vec3,
    pub vertical_velocity: f32,
    pub movement: MovementIntent,
    pub drag: PointerDrag,
}

impl CameraState {
    /// Camera at the configured default pose, at rest.
    pub fn new(config: &FlightConfig) -> Self {
        Self {
            position: config.default_position,
            yaw: config.default_yaw,
            pitch: config
                .default_pitch
                .clamp(-config.pitch_limit, config.pitch_limit),
            velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            movement: MovementIntent::default(),
            drag: PointerDrag::default(),
        }
    }

    /// Yaw then pitch, no roll.
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    /// Apply a pointer-drag delta in pixels.
    pub fn look(&mut self, delta: Vec2, config: &FlightConfig) {
        if !delta.is_finite() {
            return;
        }
        self.yaw -= delta.x * config.look_sensitivity;
        self.pitch = (self.pitch - delta.y * config.look_sensitivity)
            .clamp(-config.pitch_limit, config.pitch_limit);
    }

    /// Move along the view ray, then clamp the distance from the origin.
    ///
    /// The clamp applies to the absolute distance, so starting off-center can
    /// make the camera jump onto the clamp sphere. Zooming in never carries the
    /// camera past its closest approach to the origin.
    pub fn zoom(&mut self, wheel_delta_y: f32, config: &FlightConfig) {
        if !wheel_delta_y.is_finite() || wheel_delta_y == 0.0 {
            return;
        }
        let forward = self.forward();
        let mut step = -wheel_delta_y * config.zoom_speed;
        if step > 0.0 {
            let closest = -self.position.dot(forward);
            if closest > 0.0 {
                step = step.min(closest);
            }
        }
        self.position += forward * step;

        let distance = self.position.length();
        if !distance.is_finite() || distance <= f32::EPSILON {
            self.position = -forward * config.min_zoom_distance;
            return;
        }
        let clamped = distance.clamp(config.min_zoom_distance, config.max_zoom_distance);
        if clamped != distance {
            self.position *= clamped / distance;
        }
    }

    /// Snap back to the default pose and stop all motion.
    pub fn reset(&mut self, config: &FlightConfig) {
        *self = Self::new(config);
    }
}

/// Input gathered between two frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub look_delta: Vec2,
    pub wheel_delta_y: f32,
    pub movement: MovementIntent,
}

fn blend_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).min(1.0)
}

/// Advance the camera by one frame.
pub fn advance(state: &CameraState, input: &FrameInput, config: &FlightConfig, dt: f32) -> CameraState {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, config.max_frame_dt)
    } else {
        0.0
    };
    let mut next = *state;
    next.movement = input.movement;

    next.look(input.look_delta, config);
    next.zoom(input.wheel_delta_y, config);

    let local = input.movement.planar_direction();
    let rate = if local != Vec3::ZERO {
        config.acceleration
    } else {
        config.deceleration
    };
    let target = Quat::from_rotation_y(next.yaw) * local * config.move_speed;
    next.velocity = next.velocity.lerp(target, blend_factor(rate, dt));

    let vertical = input.movement.vertical_direction();
    let vertical_rate = if vertical != 0.0 {
        config.acceleration
    } else {
        config.deceleration
    };
    let vertical_target = vertical * config.vertical_speed;
    next.vertical_velocity +=
        (vertical_target - next.vertical_velocity) * blend_factor(vertical_rate, dt);

    next.position += (next.velocity + Vec3::Y * next.vertical_velocity) * dt;
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(movement: MovementIntent) -> FrameInput {
        FrameInput {
            movement,
            ..FrameInput::default()
        }
    }

    #[test]
    fn test_pitch_clamped_for_huge_drags() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.look(Vec2::new(0.0, -1e9), &config);
        assert!(state.pitch <= config.pitch_limit);
        assert_eq!(state.pitch, config.pitch_limit);
        state.look(Vec2::new(0.0, 1e9), &config);
        assert_eq!(state.pitch, -config.pitch_limit);
        state.look(Vec2::new(f32::NAN, f32::INFINITY), &config);
        assert_eq!(state.pitch, -config.pitch_limit);
        assert!(state.yaw.is_finite());
    }

    #[test]
    fn test_look_signs() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.pitch = 0.0;
        state.look(Vec2::new(100.0, 40.0), &config);
        assert!((state.yaw - (-0.25)).abs() < 1e-6);
        assert!((state.pitch - (-0.1)).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_look_does_not_drift_horizontally() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.yaw = 0.7;
        let before = state.forward();
        state.look(Vec2::new(0.0, 200.0), &config);
        let after = state.forward();
        let heading = |v: Vec3| v.x.atan2(v.z);
        assert!((heading(before) - heading(after)).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_in_clamps_to_min_distance() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.zoom(-1e6, &config);
        assert!((state.position.length() - config.min_zoom_distance).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_in_stops_short_of_passing_origin() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.pitch = 0.0;
        state.position = Vec3::new(0.0, 0.0, 40.0);
        state.zoom(-1e6, &config);
        // Still behind the origin along the view ray, on the min sphere.
        assert!(state.position.dot(state.forward()) < 0.0);
        assert!((state.position - Vec3::new(0.0, 0.0, config.min_zoom_distance)).length() < 1e-4);
    }

    #[test]
    fn test_zoom_out_clamps_to_max_distance() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.zoom(1e6, &config);
        assert!((state.position.length() - config.max_zoom_distance).abs() < 1e-2);
    }

    #[test]
    fn test_small_zoom_moves_along_view_ray() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        let forward = state.forward();
        let start = state.position;
        state.zoom(-100.0, &config);
        let moved = state.position - start;
        assert!((moved - forward * 2.0).length() < 1e-4);
    }

    #[test]
    fn test_zoom_to_origin_is_placed_on_min_sphere() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.position = state.forward() * -1.0;
        state.zoom(-1.0 / config.zoom_speed, &config);
        assert!((state.position.length() - config.min_zoom_distance).abs() < 1e-4);
    }

    #[test]
    fn test_forward_moves_along_yaw_only() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.pitch = -1.0;
        let input = held(MovementIntent {
            forward: true,
            ..MovementIntent::default()
        });
        for _ in 0..60 {
            state = advance(&state, &input, &config, 1.0 / 60.0);
        }
        assert_eq!(state.velocity.y, 0.0);
        assert!(state.velocity.z < 0.0);
        assert!((state.position.y - config.default_position.y).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_approaches_target_speed() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        let input = held(MovementIntent {
            right: true,
            ..MovementIntent::default()
        });
        for _ in 0..600 {
            state = advance(&state, &input, &config, 1.0 / 60.0);
        }
        assert!((state.velocity.x - config.move_speed).abs() < 1e-3);
    }

    #[test]
    fn test_release_decelerates() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.velocity = Vec3::new(5.0, 0.0, 0.0);
        let next = advance(&state, &FrameInput::default(), &config, 0.05);
        let expected = 5.0 * (1.0 - config.deceleration * 0.05);
        assert!((next.velocity.x - expected).abs() < 1e-5);
    }

    #[test]
    fn test_huge_dt_saturates() {
        let config = FlightConfig::default();
        let state = CameraState::new(&config);
        let input = held(MovementIntent {
            up: true,
            ..MovementIntent::default()
        });
        let next = advance(&state, &input, &config, 1e9);
        assert!(next.position.is_finite());
        let rise = next.position.y - state.position.y;
        assert!(rise <= config.vertical_speed * config.max_frame_dt + 1e-4);

        let same = advance(&state, &input, &config, f32::NAN);
        assert_eq!(same.position, state.position);
    }

    #[test]
    fn test_vertical_channel_independent() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        let input = held(MovementIntent {
            down: true,
            ..MovementIntent::default()
        });
        state = advance(&state, &input, &config, 0.05);
        assert!(state.vertical_velocity < 0.0);
        assert_eq!(state.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_reset_restores_default_pose() {
        let config = FlightConfig::default();
        let mut state = CameraState::new(&config);
        state.position = Vec3::splat(40.0);
        state.velocity = Vec3::ONE;
        state.vertical_velocity = 3.0;
        state.movement.forward = true;
        state.drag.begin(1, 0.0, 0.0);
        state.reset(&config);
        assert_eq!(state, CameraState::new(&config));
    }

    #[test]
    fn test_pointer_drag_tracks_owner_only() {
        let mut drag = PointerDrag::default();
        assert_eq!(drag.track(1, 5.0, 5.0), None);
        drag.begin(1, 10.0, 10.0);
        assert_eq!(drag.track(2, 20.0, 20.0), None);
        assert_eq!(drag.track(1, 13.0, 6.0), Some(Vec2::new(3.0, -4.0)));
        drag.end(2);
        assert!(drag.active);
        drag.end(1);
        assert!(!drag.active);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let intent = MovementIntent {
            forward: true,
            backward: true,
            up: true,
            down: true,
            ..MovementIntent::default()
        };
        assert_eq!(intent.planar_direction(), Vec3::ZERO);
        assert_eq!(intent.vertical_direction(), 0.0);
        let diagonal = MovementIntent {
            forward: true,
            right: true,
            ..MovementIntent::default()
        };
        assert!((diagonal.planar_direction().length() - 1.0).abs() < 1e-6);
    }
}
