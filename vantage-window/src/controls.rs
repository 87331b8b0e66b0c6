use glam::Vec2;
use tracing::debug;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::camera::{CameraState, FlightConfig, FrameInput, Movement, advance};

/// Pointer id used for the mouse; touch ids come from the platform.
pub const MOUSE_POINTER_ID: u64 = u64::MAX;
/// Wheel delta per scrolled line, in browser-style pixels.
pub const PIXELS_PER_LINE: f32 = 100.0;

/// Map a physical key to the movement channel it drives.
pub fn movement_for_key(key: KeyCode) -> Option<Movement> {
    match key {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(Movement::Forward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(Movement::Backward),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(Movement::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(Movement::Right),
        KeyCode::Space | KeyCode::KeyE => Some(Movement::Up),
        KeyCode::ShiftLeft | KeyCode::ShiftRight | KeyCode::KeyQ => Some(Movement::Down),
        _ => None,
    }
}

/// Convert a winit scroll into a browser-style vertical wheel delta
/// (positive when scrolling toward the user, i.e. zooming out).
pub fn wheel_delta_y(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
    }
}

/// Owns the flight camera and turns window input into per-frame steps.
///
/// Input handlers only record into the pending [`FrameInput`]; nothing moves
/// until [`FlightControls::update`] runs on the frame tick.
#[derive(Debug)]
pub struct FlightControls {
    config: FlightConfig,
    state: CameraState,
    pending: FrameInput,
    cursor: Option<Vec2>,
    reset_requested: bool,
}

impl FlightControls {
    pub fn new(config: FlightConfig) -> Self {
        Self {
            state: CameraState::new(&config),
            config,
            pending: FrameInput::default(),
            cursor: None,
            reset_requested: false,
        }
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn pointer_down(&mut self, pointer_id: u64, x: f32, y: f32) {
        self.state.drag.begin(pointer_id, x, y);
    }

    pub fn pointer_move(&mut self, pointer_id: u64, x: f32, y: f32) {
        if let Some(delta) = self.state.drag.track(pointer_id, x, y) {
            self.pending.look_delta += delta;
        }
    }

    pub fn pointer_up(&mut self, pointer_id: u64) {
        self.state.drag.end(pointer_id);
    }

    /// Record a browser-style wheel delta.
    pub fn scroll(&mut self, wheel_delta_y: f32) {
        if wheel_delta_y.is_finite() {
            self.pending.wheel_delta_y += wheel_delta_y;
        }
    }

    pub fn set_movement(&mut self, movement: Movement, held: bool) {
        self.pending.movement.set(movement, held);
    }

    /// Snap the camera to its default pose and drop pending input.
    pub fn reset(&mut self) {
        self.state.reset(&self.config);
        self.pending = FrameInput::default();
        self.reset_requested = false;
    }

    /// Whether the reset key was pressed since the last call.
    pub fn take_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }

    /// Record a window event. Returns true if the event was consumed.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let current = Vec2::new(position.x as f32, position.y as f32);
                self.cursor = Some(current);
                self.pointer_move(MOUSE_POINTER_ID, current.x, current.y);
                self.state.drag.active && self.state.drag.pointer_id == MOUSE_POINTER_ID
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.pointer_up(MOUSE_POINTER_ID);
                false
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                match state {
                    ElementState::Pressed => {
                        if let Some(cursor) = self.cursor {
                            self.pointer_down(MOUSE_POINTER_ID, cursor.x, cursor.y);
                        }
                    }
                    ElementState::Released => self.pointer_up(MOUSE_POINTER_ID),
                }
                true
            }
            WindowEvent::Touch(touch) => {
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => self.pointer_down(touch.id, x, y),
                    TouchPhase::Moved => self.pointer_move(touch.id, x, y),
                    TouchPhase::Ended | TouchPhase::Cancelled => self.pointer_up(touch.id),
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll(wheel_delta_y(delta));
                true
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return false;
                };
                let pressed = event.state == ElementState::Pressed;
                if code == KeyCode::KeyR && pressed && !event.repeat {
                    debug!("Camera reset requested");
                    self.reset_requested = true;
                    return true;
                }
                match movement_for_key(code) {
                    Some(movement) => {
                        self.set_movement(movement, pressed);
                        true
                    }
                    None => false,
                }
            }
            WindowEvent::Focused(false) => {
                // Keys released while unfocused never arrive.
                self.pending.movement = Default::default();
                self.pointer_up(self.state.drag.pointer_id);
                false
            }
            _ => false,
        }
    }

    /// Advance one frame with the input recorded since the previous frame.
    pub fn update(&mut self, dt: f32) -> &CameraState {
        let input = self.pending;
        self.state = advance(&self.state, &input, &self.config, dt);
        self.pending.look_delta = Vec2::ZERO;
        self.pending.wheel_delta_y = 0.0;
        &self.state
    }
}

impl Default for FlightControls {
    fn default() -> Self {
        Self::new(FlightConfig::default())
    }
}
