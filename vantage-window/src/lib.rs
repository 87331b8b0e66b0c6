//! Free-flight navigation for the vantage viewer.
//!
//! [`camera`] holds the pure simulation; [`controls`] feeds it from winit
//! window events on the frame tick.

pub mod camera;
pub mod controls;

pub use camera::{
    CameraState, FlightConfig, FrameInput, Movement, MovementIntent, PointerDrag, advance,
};
pub use controls::{FlightControls, MOUSE_POINTER_ID, movement_for_key, wheel_delta_y};
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;
